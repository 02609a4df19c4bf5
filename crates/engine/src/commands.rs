//! Command registry and built-in calculator commands.
//!
//! Commands are registered by name and invoked with JSON input/output.

use crate::action::{parse_keys, Action};
use crate::calculator::Calculator;
use crate::context::AppContext;
use crate::types::*;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;

/// Signature for all engine commands.
pub type CommandHandler = fn(Value, &AppContext) -> Result<Value, CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unknown session: {0}")]
    UnknownSession(String),
    #[error("{0}")]
    Other(String),
}

impl CommandError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            CommandError::InvalidInput(_) => ErrorCode::InvalidInput,
            CommandError::UnknownSession(_) => ErrorCode::NotFound,
            CommandError::Other(_) => ErrorCode::InternalError,
        }
    }
}

impl From<crate::action::KeyError> for CommandError {
    fn from(e: crate::action::KeyError) -> Self {
        CommandError::InvalidInput(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub struct CommandRegistry {
    handlers: HashMap<String, CommandHandler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut reg = Self {
            handlers: HashMap::new(),
        };
        // Register built-in commands
        reg.register("ping", cmd_ping);
        reg.register("session_open", cmd_session_open);
        reg.register("session_close", cmd_session_close);
        reg.register("press", cmd_press);
        reg.register("action", cmd_action);
        reg.register("display", cmd_display);
        reg.register("snapshot", cmd_snapshot);
        reg.register("clear", cmd_clear);
        reg
    }

    pub fn register(&mut self, name: &str, handler: CommandHandler) {
        self.handlers.insert(name.to_string(), handler);
    }

    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Execute a command by name and return a full CommandResult.
    pub fn execute(&self, name: &str, args: Value, ctx: &AppContext) -> CommandResult {
        let run_id = new_run_id();
        let start = Instant::now();

        let handler = match self.handlers.get(name) {
            Some(h) => h,
            None => {
                return result_err(
                    "call",
                    name,
                    &run_id,
                    elapsed_us(start),
                    ErrorCode::InvalidInput,
                    format!("unknown command: {}", name),
                );
            }
        };

        match handler(args, ctx) {
            Ok(data) => {
                let mut r = result_ok("call", name, &run_id, elapsed_us(start));
                r.data = Some(data);
                r
            }
            Err(e) => {
                tracing::debug!(command = name, error = %e, "command failed");
                result_err("call", name, &run_id, elapsed_us(start), e.error_code(), e.to_string())
            }
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn elapsed_us(start: Instant) -> u64 {
    start.elapsed().as_micros() as u64
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

fn str_arg<'a>(args: &'a Value, field: &str) -> Result<&'a str, CommandError> {
    args.get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| CommandError::InvalidInput(format!("missing '{}' string field", field)))
}

fn snapshot_value(calc: &Calculator) -> Result<Value, CommandError> {
    serde_json::to_value(calc.snapshot()).map_err(|e| CommandError::Other(e.to_string()))
}

/// Run `f` against the session named in `args`.
fn in_session<R>(
    args: &Value,
    ctx: &AppContext,
    f: impl FnOnce(&mut Calculator) -> R,
) -> Result<R, CommandError> {
    let id = str_arg(args, "session_id")?;
    ctx.with_session(id, f)
        .ok_or_else(|| CommandError::UnknownSession(id.to_string()))
}

// ===========================================================================
// Built-in commands
// ===========================================================================

/// `ping` – returns { "pong": true }. Proves wiring works.
fn cmd_ping(_args: Value, _ctx: &AppContext) -> Result<Value, CommandError> {
    Ok(serde_json::json!({ "pong": true }))
}

/// `session_open` – start a new engine in the reset state.
///
/// Returns: `{ "session_id": "...", "display": "0" }`
fn cmd_session_open(_args: Value, ctx: &AppContext) -> Result<Value, CommandError> {
    let id = ctx.open_session();
    let display = ctx
        .with_session(&id, |c| c.display().to_string())
        .ok_or_else(|| CommandError::UnknownSession(id.clone()))?;
    Ok(serde_json::json!({ "session_id": id, "display": display }))
}

/// `session_close` – discard a session's engine.
fn cmd_session_close(args: Value, ctx: &AppContext) -> Result<Value, CommandError> {
    let id = str_arg(&args, "session_id")?;
    if !ctx.close_session(id) {
        return Err(CommandError::UnknownSession(id.to_string()));
    }
    Ok(serde_json::json!({ "closed": true }))
}

/// `press` – feed a key sequence to an engine.
///
/// Args: `{ "keys": "5+3=", "session_id": "..." }`. Without a session id a
/// fresh engine evaluates the keys and is then discarded.
/// Returns: the resulting snapshot.
fn cmd_press(args: Value, ctx: &AppContext) -> Result<Value, CommandError> {
    let keys = str_arg(&args, "keys")?;
    let actions = parse_keys(keys)?;

    let press_all = |calc: &mut Calculator| {
        for action in &actions {
            calc.apply(*action);
        }
        snapshot_value(calc)
    };

    if args.get("session_id").is_some() {
        in_session(&args, ctx, press_all)?
    } else {
        press_all(&mut Calculator::new())
    }
}

/// `action` – apply one typed action to a session.
///
/// Args: `{ "session_id": "...", "action": { "action": "digit", "value": 5 } }`
fn cmd_action(args: Value, ctx: &AppContext) -> Result<Value, CommandError> {
    let raw = args
        .get("action")
        .cloned()
        .ok_or_else(|| CommandError::InvalidInput("missing 'action' field".into()))?;
    let action: Action = serde_json::from_value(raw)
        .map_err(|e| CommandError::InvalidInput(format!("bad action: {}", e)))?;

    in_session(&args, ctx, |calc| {
        calc.apply(action);
        snapshot_value(calc)
    })?
}

/// `display` – the text a front end should render.
fn cmd_display(args: Value, ctx: &AppContext) -> Result<Value, CommandError> {
    let display = in_session(&args, ctx, |calc| calc.display().to_string())?;
    Ok(serde_json::json!({ "display": display }))
}

fn cmd_snapshot(args: Value, ctx: &AppContext) -> Result<Value, CommandError> {
    in_session(&args, ctx, |calc| snapshot_value(calc))?
}

fn cmd_clear(args: Value, ctx: &AppContext) -> Result<Value, CommandError> {
    in_session(&args, ctx, |calc| {
        calc.clear();
        snapshot_value(calc)
    })?
}

// ===========================================================================
// Tests
// ===========================================================================
