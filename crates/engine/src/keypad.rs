//! Button layout of the calculator face.
//!
//! ```text
//! [ C ] [ % ] [ / ] [ * ]
//! [ 7 ] [ 8 ] [ 9 ] [ - ]
//! [ 4 ] [ 5 ] [ 6 ] [ + ]
//! [ 1 ] [ 2 ] [ 3 ] [ = ]
//! [    0    ] [ . ] [   ]
//! ```
//!
//! `=` spans two rows and `0` spans two columns. Front ends use this to
//! place buttons and to resolve a pressed label into an [`Action`].

use crate::action::Action;
use crate::calculator::{Digit, Operator};

/// Width of one rendered cell, brackets included.
const CELL_WIDTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeypadButton {
    pub label: String,
    pub action: Action,
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
}

impl KeypadButton {
    fn new(action: Action, row: usize, col: usize) -> Self {
        Self {
            label: action.key_label(),
            action,
            row,
            col,
            row_span: 1,
            col_span: 1,
        }
    }

    fn spanning(mut self, rows: usize, cols: usize) -> Self {
        self.row_span = rows;
        self.col_span = cols;
        self
    }

    fn covers(&self, row: usize, col: usize) -> bool {
        (self.row..self.row + self.row_span).contains(&row)
            && (self.col..self.col + self.col_span).contains(&col)
    }
}

#[derive(Debug, Clone)]
pub struct Keypad {
    buttons: Vec<KeypadButton>,
}

impl Default for Keypad {
    fn default() -> Self {
        Self::new()
    }
}

impl Keypad {
    pub const ROWS: usize = 5;
    pub const COLUMNS: usize = 4;

    pub fn new() -> Self {
        let digit = |d: Digit, row, col| KeypadButton::new(Action::Digit(d), row, col);
        let op = |o: Operator, row, col| KeypadButton::new(Action::Operator(o), row, col);

        let buttons = vec![
            KeypadButton::new(Action::Clear, 0, 0),
            KeypadButton::new(Action::Percent, 0, 1),
            op(Operator::Divide, 0, 2),
            op(Operator::Multiply, 0, 3),
            digit(Digit::Seven, 1, 0),
            digit(Digit::Eight, 1, 1),
            digit(Digit::Nine, 1, 2),
            op(Operator::Subtract, 1, 3),
            digit(Digit::Four, 2, 0),
            digit(Digit::Five, 2, 1),
            digit(Digit::Six, 2, 2),
            op(Operator::Add, 2, 3),
            digit(Digit::One, 3, 0),
            digit(Digit::Two, 3, 1),
            digit(Digit::Three, 3, 2),
            KeypadButton::new(Action::Equals, 3, 3).spanning(2, 1),
            digit(Digit::Zero, 4, 0).spanning(1, 2),
            KeypadButton::new(Action::Decimal, 4, 2),
        ];

        Self { buttons }
    }

    pub fn buttons(&self) -> &[KeypadButton] {
        &self.buttons
    }

    /// Find a button by its label (`"7"`, `"C"`, `"="`, ...).
    pub fn find(&self, label: &str) -> Option<&KeypadButton> {
        self.buttons.iter().find(|b| b.label == label)
    }

    /// The button covering a grid cell, honouring spans.
    pub fn button_at(&self, row: usize, col: usize) -> Option<&KeypadButton> {
        self.buttons.iter().find(|b| b.covers(row, col))
    }

    /// Render the grid as plain text, one line per row.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(Self::ROWS);
        for row in 0..Self::ROWS {
            let mut cells = Vec::new();
            for col in 0..Self::COLUMNS {
                match self.button_at(row, col) {
                    // Continuation of a column span was drawn by its origin.
                    Some(b) if b.col != col => {}
                    Some(b) => {
                        let width = CELL_WIDTH * b.col_span + (b.col_span - 1) - 2;
                        let label = if b.row == row { b.label.as_str() } else { "" };
                        cells.push(format!("[{:^width$}]", label, width = width));
                    }
                    None => cells.push(" ".repeat(CELL_WIDTH)),
                }
            }
            lines.push(cells.join(" ").trim_end().to_string());
        }
        lines.join("\n")
    }
}
