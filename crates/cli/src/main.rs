//! `calcctl` – command-line front end for the calculator engine.
//!
//! Forwards key input to the engine and prints the display verbatim. Also
//! runs scripted scenarios and a socket daemon for other front ends.

mod config;
mod logging;
mod repl;
mod serve;

use calc_engine::types::*;
use calc_engine::{AppContext, CommandRegistry, CommandResult, Keypad};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

// ===========================================================================
// CLI definition
// ===========================================================================

#[derive(Parser)]
#[command(
    name = "calcctl",
    version,
    about = "Four-function calculator engine: keys in, display out"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a key sequence to a fresh engine and print the display.
    Press {
        /// Keys, e.g. "12+3=" or "5 * 2 Enter".
        keys: String,
        /// Output the full result as JSON.
        #[arg(long)]
        json: bool,
        /// Directory for artifacts output.
        #[arg(long)]
        artifacts: Option<PathBuf>,
    },

    /// Invoke an engine command by name with JSON args.
    Call {
        /// Command name (e.g. "ping", "press", "snapshot").
        cmd: String,
        /// JSON args to pass to the command.
        #[arg(long, default_value = "{}")]
        args: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Directory for artifacts output.
        #[arg(long)]
        artifacts: Option<PathBuf>,
    },

    /// Run a scripted scenario from a YAML file.
    RunScenario {
        /// Path to the scenario YAML file.
        file: PathBuf,
        /// Directory for artifacts output.
        #[arg(long)]
        artifacts: Option<PathBuf>,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Interactive session on one engine.
    Repl,

    /// Print the keypad layout.
    Keypad,

    /// Start daemon mode over a Unix socket.
    Serve {
        /// Path for the Unix domain socket (defaults to `daemon.socket_path`).
        #[arg(long)]
        socket: Option<PathBuf>,
    },
}

// ===========================================================================
// Main
// ===========================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let app_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: failed to load configuration: {}", e);
            std::process::exit(2);
        }
    };
    logging::init_logging(&app_config.logging);
    tracing::debug!(dev_env = %app_config.dev_env, "configuration loaded");

    let ctx = AppContext::new();
    let registry = CommandRegistry::new();

    let outcome = match cli.command {
        Commands::Press {
            keys,
            json,
            artifacts,
        } => {
            cmd_press(&keys, json, artifacts, &ctx, &registry);
            Ok(())
        }
        Commands::Call {
            cmd,
            args,
            json,
            artifacts,
        } => {
            cmd_call(&cmd, &args, json, artifacts, &ctx, &registry);
            Ok(())
        }
        Commands::RunScenario {
            file,
            artifacts,
            json,
        } => {
            cmd_run_scenario(&file, json, artifacts, &ctx, &registry);
            Ok(())
        }
        Commands::Repl => repl::run_repl(&app_config.repl),
        Commands::Keypad => {
            println!("{}", Keypad::new().render());
            Ok(())
        }
        Commands::Serve { socket } => {
            let socket = socket.unwrap_or_else(|| app_config.daemon.socket_path.clone());
            serve::run_daemon(socket, ctx, registry).await
        }
    };

    if let Err(e) = outcome {
        eprintln!("error: {:#}", e);
        std::process::exit(2);
    }
}

// ===========================================================================
// Subcommand implementations
// ===========================================================================

fn cmd_press(
    keys: &str,
    json: bool,
    artifacts: Option<PathBuf>,
    ctx: &AppContext,
    registry: &CommandRegistry,
) {
    let result = registry.execute("press", serde_json::json!({ "keys": keys }), ctx);
    if let Some(ref dir) = artifacts {
        write_artifacts(dir, &result);
    }

    let display = result
        .data
        .as_ref()
        .and_then(|d| d.get("display"))
        .and_then(|v| v.as_str());
    match display {
        // The display is the whole answer in human mode.
        Some(display) if !json => println!("{}", display),
        _ => output_result(&result, json),
    }
}

fn cmd_call(
    cmd: &str,
    args_str: &str,
    json: bool,
    artifacts: Option<PathBuf>,
    ctx: &AppContext,
    registry: &CommandRegistry,
) {
    let args: serde_json::Value = match serde_json::from_str(args_str) {
        Ok(v) => v,
        Err(e) => {
            let r = result_err(
                "call",
                cmd,
                &new_run_id(),
                0,
                ErrorCode::InvalidInput,
                format!("invalid JSON args: {}", e),
            );
            output_result(&r, json);
            return;
        }
    };

    let result = registry.execute(cmd, args, ctx);
    if let Some(ref dir) = artifacts {
        write_artifacts(dir, &result);
    }
    output_result(&result, json);
}

fn cmd_run_scenario(
    file: &Path,
    json: bool,
    artifacts: Option<PathBuf>,
    ctx: &AppContext,
    registry: &CommandRegistry,
) {
    let yaml = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            let r = result_err(
                "run-scenario",
                &file.display().to_string(),
                &new_run_id(),
                0,
                ErrorCode::IoError,
                format!("cannot read scenario file: {}", e),
            );
            output_result(&r, json);
            return;
        }
    };

    let scenario = match calc_engine::scenario::load_scenario(&yaml) {
        Ok(s) => s,
        Err(e) => {
            let r = result_err(
                "run-scenario",
                &file.display().to_string(),
                &new_run_id(),
                0,
                ErrorCode::InvalidInput,
                e,
            );
            output_result(&r, json);
            return;
        }
    };

    let scenario_result = calc_engine::scenario::run_scenario(&scenario, ctx, registry);

    if json {
        let j = serde_json::to_string_pretty(&scenario_result).unwrap_or_default();
        println!("{}", j);
    } else {
        println!(
            "Scenario: {}",
            scenario_result.name.as_deref().unwrap_or("<unnamed>")
        );
        println!("Overall: {:?}", scenario_result.overall_status);
        for (i, sr) in scenario_result.step_results.iter().enumerate() {
            let display = sr
                .data
                .as_ref()
                .and_then(|d| d.get("display"))
                .and_then(|v| v.as_str())
                .unwrap_or("-");
            println!(
                "  Step {}: {} -> {:?} [{}] ({}us)",
                i, sr.target, sr.status, display, sr.timing_us
            );
            if let Some(ref err) = sr.error {
                println!("    {} – {}", err.code, err.message);
            }
        }
    }

    if let Some(ref dir) = artifacts {
        let run_id = new_run_id();
        let art_dir = dir.join(&run_id);
        if let Err(e) = std::fs::create_dir_all(&art_dir) {
            tracing::warn!(dir = %art_dir.display(), error = %e, "failed to create artifacts dir");
        } else {
            let j = serde_json::to_string_pretty(&scenario_result).unwrap_or_default();
            let _ = std::fs::write(art_dir.join("result.json"), j);

            // Write per-step results as events.jsonl
            let mut lines = String::new();
            for sr in &scenario_result.step_results {
                if let Ok(line) = serde_json::to_string(sr) {
                    lines.push_str(&line);
                    lines.push('\n');
                }
            }
            let _ = std::fs::write(art_dir.join("events.jsonl"), lines);
        }
    }

    if scenario_result.overall_status == Status::Fail {
        std::process::exit(1);
    }
}

// ===========================================================================
// Output helpers
// ===========================================================================

fn output_result(result: &CommandResult, json: bool) {
    if json {
        let j = serde_json::to_string_pretty(result).unwrap_or_default();
        println!("{}", j);
    } else {
        print_human(result);
    }

    // Exit with non-zero status on error/fail
    match result.status {
        Status::Pass | Status::Skip => {}
        Status::Fail => std::process::exit(1),
        Status::Error => std::process::exit(2),
    }
}

fn print_human(r: &CommandResult) {
    let status_icon = match r.status {
        Status::Pass => "PASS",
        Status::Fail => "FAIL",
        Status::Skip => "SKIP",
        Status::Error => "ERROR",
    };

    println!("[{}] {} {}", status_icon, r.command, r.target);
    println!("  run_id: {}", r.run_id);
    println!("  timing: {}us", r.timing_us);

    if let Some(ref err) = r.error {
        println!("  error:  {} – {}", err.code, err.message);
    }

    if let Some(ref data) = r.data {
        if let Ok(s) = serde_json::to_string_pretty(data) {
            for line in s.lines() {
                println!("  {}", line);
            }
        }
    }
}

// ===========================================================================
// Artifact helpers
// ===========================================================================

fn write_artifacts(dir: &Path, result: &CommandResult) {
    let art_dir = dir.join(&result.run_id);
    if let Err(e) = std::fs::create_dir_all(&art_dir) {
        tracing::warn!(dir = %art_dir.display(), error = %e, "failed to create artifacts dir");
        return;
    }

    // result.json
    let j = serde_json::to_string_pretty(result).unwrap_or_default();
    let _ = std::fs::write(art_dir.join("result.json"), &j);

    // events.jsonl (single event for non-scenario)
    if let Ok(line) = serde_json::to_string(result) {
        let _ = std::fs::write(art_dir.join("events.jsonl"), format!("{}\n", line));
    }
}
