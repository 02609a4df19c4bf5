//! Engine crate – the calculator state machine and the command layer that
//! drives it.
//!
//! This crate holds all decision logic. It does NOT depend on any UI or
//! runtime types, so every front end (CLI, daemon, GUI shell) feeds it the
//! same named actions and renders the same display string.

pub mod action;
pub mod calculator;
pub mod commands;
pub mod context;
pub mod keypad;
pub mod number;
pub mod scenario;
pub mod types;

// Re-exports for convenience
pub use action::{parse_keys, Action, KeyError};
pub use calculator::{Calculator, Digit, Mode, Operator};
pub use commands::CommandRegistry;
pub use context::AppContext;
pub use keypad::Keypad;
pub use types::{CalculatorSnapshot, CommandResult, ErrorCode, ErrorInfo, Status};
