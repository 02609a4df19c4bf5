//! Named user actions and the key bindings that produce them.

use crate::calculator::{Digit, Operator};
use serde::{Deserialize, Serialize};

/// One discrete user action. Each maps to exactly one engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum Action {
    Digit(Digit),
    Decimal,
    Clear,
    Percent,
    Operator(Operator),
    Equals,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("unknown key: {0:?}")]
    UnknownKey(String),
}

impl Action {
    /// Map a key name (`"7"`, `"+"`, `"Enter"`, `"Escape"`, ...) to an action.
    pub fn from_key(key: &str) -> Option<Action> {
        match key.to_ascii_lowercase().as_str() {
            "enter" | "return" => return Some(Action::Equals),
            "escape" | "esc" | "clear" | "ac" => return Some(Action::Clear),
            _ => {}
        }

        let mut chars = key.chars();
        let c = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return None,
        };

        if let Some(d) = Digit::from_char(c) {
            return Some(Action::Digit(d));
        }
        if let Some(op) = Operator::from_symbol(c) {
            return Some(Action::Operator(op));
        }
        match c {
            '.' | ',' => Some(Action::Decimal),
            '=' => Some(Action::Equals),
            '%' => Some(Action::Percent),
            'c' | 'C' => Some(Action::Clear),
            _ => None,
        }
    }

    /// The key that produces this action, as shown on the keypad.
    pub fn key_label(&self) -> String {
        match self {
            Action::Digit(d) => d.to_string(),
            Action::Decimal => ".".to_string(),
            Action::Clear => "C".to_string(),
            Action::Percent => "%".to_string(),
            Action::Operator(op) => op.to_string(),
            Action::Equals => "=".to_string(),
        }
    }
}

/// Parse a key sequence such as `"12+3.5="` or `"12 + 3 Enter"`.
///
/// Whitespace separates tokens. A token naming a key maps whole; any other
/// token maps character by character.
pub fn parse_keys(input: &str) -> Result<Vec<Action>, KeyError> {
    let mut actions = Vec::new();
    for token in input.split_whitespace() {
        if let Some(action) = Action::from_key(token) {
            actions.push(action);
            continue;
        }
        for c in token.chars() {
            let key = c.to_string();
            let action = Action::from_key(&key).ok_or(KeyError::UnknownKey(key))?;
            actions.push(action);
        }
    }
    Ok(actions)
}
