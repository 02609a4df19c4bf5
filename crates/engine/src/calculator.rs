//! The calculator engine: a small state machine over the display string.
//!
//! Operators chain strictly left to right. Choosing a second operator before
//! `=` evaluates the pending pair immediately; there is no precedence and no
//! memory of the last operation once `=` has consumed it.

use crate::action::Action;
use crate::number::{format_number, parse_display};
use crate::types::CalculatorSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// A single decimal digit. Values outside 0–9 are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Digit {
    Zero = 0,
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("not a decimal digit: {0}")]
pub struct InvalidDigit(pub u8);

impl Digit {
    pub const ALL: [Digit; 10] = [
        Digit::Zero,
        Digit::One,
        Digit::Two,
        Digit::Three,
        Digit::Four,
        Digit::Five,
        Digit::Six,
        Digit::Seven,
        Digit::Eight,
        Digit::Nine,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn as_char(self) -> char {
        char::from(b'0' + self.value())
    }

    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(10)
            .and_then(|d| Self::ALL.get(d as usize))
            .copied()
    }
}

impl TryFrom<u8> for Digit {
    type Error = InvalidDigit;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(InvalidDigit(value))
    }
}

impl From<Digit> for u8 {
    fn from(d: Digit) -> u8 {
        d.value()
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One of the four binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not an operator: {0:?}")]
pub struct InvalidOperator(pub String);

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    /// Accepts the canonical symbols plus the usual keypad glyphs.
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' | '−' => Some(Operator::Subtract),
            '*' | 'x' | 'X' | '×' => Some(Operator::Multiply),
            '/' | '÷' => Some(Operator::Divide),
            _ => None,
        }
    }

    /// IEEE-754 semantics throughout; division by zero is not an error.
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Operator::Add => lhs + rhs,
            Operator::Subtract => lhs - rhs,
            Operator::Multiply => lhs * rhs,
            Operator::Divide => lhs / rhs,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Operator {
    type Err = InvalidOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_symbol(c).ok_or_else(|| InvalidOperator(s.to_string())),
            _ => Err(InvalidOperator(s.to_string())),
        }
    }
}

/// Coarse state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// No operator pending.
    Idle,
    /// An operator is chosen and waits for its right-hand operand.
    PendingOp,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

const RESET_DISPLAY: &str = "0";

#[derive(Debug, Clone, PartialEq)]
pub struct Calculator {
    display: String,
    pending_operand: Option<f64>,
    pending_operator: Option<Operator>,
    awaiting_fresh_operand: bool,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    pub fn new() -> Self {
        Self {
            display: RESET_DISPLAY.to_string(),
            pending_operand: None,
            pending_operator: None,
            awaiting_fresh_operand: false,
        }
    }

    /// The text to render, verbatim.
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn pending_operand(&self) -> Option<f64> {
        self.pending_operand
    }

    pub fn pending_operator(&self) -> Option<Operator> {
        self.pending_operator
    }

    pub fn is_awaiting_fresh_operand(&self) -> bool {
        self.awaiting_fresh_operand
    }

    pub fn mode(&self) -> Mode {
        if self.pending_operator.is_some() {
            Mode::PendingOp
        } else {
            Mode::Idle
        }
    }

    pub fn snapshot(&self) -> CalculatorSnapshot {
        CalculatorSnapshot {
            display: self.display.clone(),
            pending_operand: self.pending_operand.map(format_number),
            pending_operator: self.pending_operator,
            awaiting_fresh_operand: self.awaiting_fresh_operand,
            mode: self.mode(),
        }
    }

    /// Dispatch one named action to the matching operation.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Digit(d) => self.input_digit(d),
            Action::Decimal => self.input_decimal(),
            Action::Clear => self.clear(),
            Action::Percent => self.input_percent(),
            Action::Operator(op) => self.input_operator(op),
            Action::Equals => self.handle_equal(),
        }
    }

    pub fn input_digit(&mut self, digit: Digit) {
        if self.awaiting_fresh_operand {
            self.display = digit.as_char().to_string();
            self.awaiting_fresh_operand = false;
        } else if self.display == RESET_DISPLAY {
            self.display = digit.as_char().to_string();
        } else {
            // No length cap: the display grows as long as digits arrive.
            self.display.push(digit.as_char());
        }
        tracing::trace!(display = %self.display, "digit");
    }

    pub fn input_decimal(&mut self) {
        if self.awaiting_fresh_operand {
            self.display = "0.".to_string();
            self.awaiting_fresh_operand = false;
        } else if !self.display.contains('.') {
            self.display.push('.');
        }
        tracing::trace!(display = %self.display, "decimal");
    }

    pub fn clear(&mut self) {
        *self = Self::new();
        tracing::debug!("cleared");
    }

    /// Divide the displayed value by 100. Pending state is left alone.
    pub fn input_percent(&mut self) {
        let value = parse_display(&self.display);
        self.display = format_number(value / 100.0);
        tracing::trace!(display = %self.display, "percent");
    }

    pub fn input_operator(&mut self, op: Operator) {
        let value = parse_display(&self.display);

        match (self.pending_operand, self.pending_operator) {
            (None, _) => self.pending_operand = Some(value),
            (Some(_), Some(prev)) => {
                let result = self.perform_calculation();
                tracing::debug!(op = %prev, result, "chained evaluation");
                self.pending_operand = Some(result);
                self.display = format_number(result);
            }
            (Some(_), None) => {}
        }

        self.pending_operator = Some(op);
        self.awaiting_fresh_operand = true;
        tracing::debug!(op = %op, display = %self.display, "operator pending");
    }

    /// Apply the pending operator to the pending operand and the displayed
    /// value. With nothing pending this is the displayed value itself.
    pub fn perform_calculation(&self) -> f64 {
        let value = parse_display(&self.display);
        match (self.pending_operator, self.pending_operand) {
            (Some(op), Some(lhs)) => op.apply(lhs, value),
            _ => value,
        }
    }

    pub fn handle_equal(&mut self) {
        if self.pending_operator.is_none() {
            tracing::trace!("equals ignored: no pending operator");
            return;
        }

        let result = self.perform_calculation();
        self.display = format_number(result);
        self.pending_operand = None;
        self.pending_operator = None;
        self.awaiting_fresh_operand = true;
        tracing::debug!(display = %self.display, "evaluated");
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::parse_keys;
    use proptest::prelude::*;

    fn digit(d: u8) -> Digit {
        Digit::try_from(d).unwrap()
    }

    fn run(keys: &str) -> Calculator {
        let mut calc = Calculator::new();
        for action in parse_keys(keys).unwrap() {
            calc.apply(action);
        }
        calc
    }

    #[test]
    fn test_initial_state() {
        let calc = Calculator::new();
        assert_eq!(calc.display(), "0");
        assert_eq!(calc.pending_operand(), None);
        assert_eq!(calc.pending_operator(), None);
        assert!(!calc.is_awaiting_fresh_operand());
        assert_eq!(calc.mode(), Mode::Idle);
    }

    #[test]
    fn test_digit_try_from_rejects_out_of_range() {
        assert_eq!(Digit::try_from(9).unwrap(), Digit::Nine);
        assert_eq!(Digit::try_from(10), Err(InvalidDigit(10)));
        assert_eq!(Digit::from_char('7'), Some(Digit::Seven));
        assert_eq!(Digit::from_char('a'), None);
    }

    #[test]
    fn test_leading_zeros_suppressed() {
        let mut calc = Calculator::new();
        calc.input_digit(digit(0));
        calc.input_digit(digit(0));
        calc.input_digit(digit(5));
        assert_eq!(calc.display(), "5");
    }

    #[test]
    fn test_digits_concatenate() {
        assert_eq!(run("1234567890").display(), "1234567890");
    }

    #[test]
    fn test_display_is_never_truncated() {
        let keys = "9".repeat(40);
        assert_eq!(run(&keys).display(), keys);
    }

    #[test]
    fn test_decimal_only_once() {
        assert_eq!(run("..").display(), "0.");
        assert_eq!(run("1.2.3.").display(), "1.23");
        assert_eq!(run("1.2.3.").display().matches('.').count(), 1);
    }

    #[test]
    fn test_decimal_after_operator_starts_fresh() {
        let calc = run("7+.5");
        assert_eq!(calc.display(), "0.5");
        assert_eq!(run("7+.5=").display(), "7.5");
    }

    #[test]
    fn test_zero_then_decimal_keeps_zero() {
        assert_eq!(run("0.05").display(), "0.05");
    }

    #[test]
    fn test_clear_resets_every_field() {
        for keys in ["", "12.5", "5+", "5+3", "5+3=", "5/0=", "9%"] {
            let mut calc = run(keys);
            calc.clear();
            assert_eq!(calc, Calculator::new(), "after {:?}", keys);
        }
    }

    #[test]
    fn test_simple_operations() {
        assert_eq!(run("5+3=").display(), "8");
        assert_eq!(run("5-8=").display(), "-3");
        assert_eq!(run("6*7=").display(), "42");
        assert_eq!(run("1/4=").display(), "0.25");
    }

    #[test]
    fn test_chaining_left_to_right() {
        let mut calc = run("5+3+");
        assert_eq!(calc.display(), "8");
        assert_eq!(calc.pending_operand(), Some(8.0));
        calc.apply(Action::Digit(digit(2)));
        calc.handle_equal();
        assert_eq!(calc.display(), "10");

        // No precedence: 2 + 3 * 4 is (2 + 3) * 4.
        assert_eq!(run("2+3*4=").display(), "20");
    }

    #[test]
    fn test_repeated_operator_reuses_display() {
        let calc = run("5++");
        assert_eq!(calc.display(), "10");
        assert_eq!(calc.pending_operator(), Some(Operator::Add));
    }

    #[test]
    fn test_percent_of_display() {
        assert_eq!(run("50%").display(), "0.5");
        assert_eq!(run("0%").display(), "0");
    }

    #[test]
    fn test_percent_keeps_pending_operator() {
        let calc = run("5+50%");
        assert_eq!(calc.display(), "0.5");
        assert_eq!(calc.pending_operator(), Some(Operator::Add));
        assert_eq!(calc.pending_operand(), Some(5.0));
        assert_eq!(run("5+50%=").display(), "5.5");
    }

    #[test]
    fn test_percent_does_not_reset_fresh_operand_flag() {
        let mut calc = run("5+%");
        assert_eq!(calc.display(), "0.05");
        assert!(calc.is_awaiting_fresh_operand());
        calc.input_digit(digit(2));
        assert_eq!(calc.display(), "2");
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(run("5/0=").display(), "Infinity");
        assert_eq!(run("0-5=/0=").display(), "-Infinity");
        assert_eq!(run("0/0=").display(), "NaN");
    }

    #[test]
    fn test_non_finite_results_keep_flowing() {
        assert_eq!(run("5/0=+1=").display(), "Infinity");
        assert_eq!(run("0/0=*3=").display(), "NaN");
        // Digits after a result start a fresh number.
        assert_eq!(run("5/0=7").display(), "7");
    }

    #[test]
    fn test_equal_without_operator_is_noop() {
        let mut calc = run("42");
        let before = calc.clone();
        calc.handle_equal();
        assert_eq!(calc, before);
    }

    #[test]
    fn test_repeated_equal_is_idempotent() {
        let mut calc = run("5+3=");
        assert_eq!(calc.display(), "8");
        let before = calc.clone();
        calc.handle_equal();
        calc.handle_equal();
        assert_eq!(calc, before);
        assert_eq!(calc.display(), "8");
    }

    #[test]
    fn test_equal_starts_fresh_number() {
        let mut calc = run("5+3=");
        assert_eq!(calc.mode(), Mode::Idle);
        assert!(calc.is_awaiting_fresh_operand());
        calc.input_digit(digit(4));
        assert_eq!(calc.display(), "4");
    }

    #[test]
    fn test_result_feeds_next_operation() {
        assert_eq!(run("5+3=*2=").display(), "16");
    }

    #[test]
    fn test_perform_calculation_identity_when_idle() {
        let calc = run("12.5");
        assert_eq!(calc.perform_calculation(), 12.5);
    }

    #[test]
    fn test_mode_transitions() {
        let mut calc = Calculator::new();
        calc.input_digit(digit(1));
        assert_eq!(calc.mode(), Mode::Idle);
        calc.input_operator(Operator::Add);
        assert_eq!(calc.mode(), Mode::PendingOp);
        calc.input_digit(digit(2));
        calc.input_operator(Operator::Subtract);
        assert_eq!(calc.mode(), Mode::PendingOp);
        calc.handle_equal();
        assert_eq!(calc.mode(), Mode::Idle);
    }

    #[test]
    fn test_floating_point_results_shown_verbatim() {
        assert_eq!(run(".1+.2=").display(), "0.30000000000000004");
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let snap = run("5/0+").snapshot();
        assert_eq!(snap.display, "Infinity");
        assert_eq!(snap.pending_operand.as_deref(), Some("Infinity"));
        assert_eq!(snap.pending_operator, Some(Operator::Add));
        assert!(snap.awaiting_fresh_operand);
        assert_eq!(snap.mode, Mode::PendingOp);
    }

    #[test]
    fn test_operator_parsing() {
        assert_eq!("+".parse::<Operator>().unwrap(), Operator::Add);
        assert_eq!("×".parse::<Operator>().unwrap(), Operator::Multiply);
        assert_eq!("÷".parse::<Operator>().unwrap(), Operator::Divide);
        assert!("++".parse::<Operator>().is_err());
        assert!("%".parse::<Operator>().is_err());
    }

    // --- Property-based tests ---

    fn any_action() -> impl Strategy<Value = Action> {
        prop_oneof![
            4 => (0u8..=9).prop_map(|d| Action::Digit(digit(d))),
            1 => Just(Action::Decimal),
            1 => Just(Action::Clear),
            1 => Just(Action::Percent),
            2 => prop::sample::select(vec![
                Operator::Add,
                Operator::Subtract,
                Operator::Multiply,
                Operator::Divide,
            ])
            .prop_map(Action::Operator),
            1 => Just(Action::Equals),
        ]
    }

    fn apply_all(actions: &[Action]) -> Calculator {
        let mut calc = Calculator::new();
        for &action in actions {
            calc.apply(action);
        }
        calc
    }

    proptest! {
        #[test]
        fn prop_clear_always_resets(actions in prop::collection::vec(any_action(), 0..40)) {
            let mut calc = apply_all(&actions);
            calc.clear();
            prop_assert_eq!(calc, Calculator::new());
        }

        #[test]
        fn prop_digits_from_reset_strip_leading_zeros(digits in "[0-9]{1,30}") {
            let mut calc = Calculator::new();
            for c in digits.chars() {
                calc.input_digit(Digit::from_char(c).unwrap());
            }
            let trimmed = digits.trim_start_matches('0');
            let expected = if trimmed.is_empty() { "0" } else { trimmed };
            prop_assert_eq!(calc.display(), expected);
        }

        #[test]
        fn prop_display_has_at_most_one_decimal_point(
            actions in prop::collection::vec(any_action(), 0..40)
        ) {
            let calc = apply_all(&actions);
            prop_assert!(!calc.display().is_empty());
            prop_assert!(calc.display().matches('.').count() <= 1, "display {:?}", calc.display());
        }

        #[test]
        fn prop_second_equal_changes_nothing(actions in prop::collection::vec(any_action(), 0..40)) {
            let mut calc = apply_all(&actions);
            calc.handle_equal();
            let after_first = calc.clone();
            calc.handle_equal();
            prop_assert_eq!(calc, after_first);
        }
    }
}
