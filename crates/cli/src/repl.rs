//! Interactive mode – one engine, fed a line of keys at a time.

use crate::config::ReplConfig;
use calc_engine::{parse_keys, Calculator, KeyError, Keypad};
use dialoguer::Input;

#[derive(Debug, PartialEq, Eq)]
enum LineOutcome {
    Applied,
    Quit,
}

fn apply_line(calc: &mut Calculator, line: &str) -> Result<LineOutcome, KeyError> {
    let line = line.trim();
    if matches!(line, "quit" | "exit") {
        return Ok(LineOutcome::Quit);
    }
    // Parse the whole line first so a typo applies nothing.
    for action in parse_keys(line)? {
        calc.apply(action);
    }
    Ok(LineOutcome::Applied)
}

pub fn run_repl(config: &ReplConfig) -> anyhow::Result<()> {
    let mut calc = Calculator::new();

    println!("{}", Keypad::new().render());
    println!("Enter keys (e.g. `12+3=`, `Esc`), `quit` to leave.");

    loop {
        let line: String = Input::new()
            .with_prompt(format!("{} [{}]", config.prompt, calc.display()))
            .allow_empty(true)
            .interact_text()?;

        match apply_line(&mut calc, &line) {
            Ok(LineOutcome::Quit) => break,
            Ok(LineOutcome::Applied) => {
                println!("{}", calc.display());
                if config.show_state {
                    println!("  {}", serde_json::to_string(&calc.snapshot())?);
                }
            }
            Err(e) => eprintln!("error: {}", e),
        }
    }

    tracing::debug!(display = %calc.display(), "repl finished");
    Ok(())
}
