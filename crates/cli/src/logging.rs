use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

/// Pick the most verbose level enabled in config. `verbose` forces debug.
pub fn level_for(config: &LoggingConfig) -> &'static str {
    let levels = &config.levels;
    let mut level = "off";
    if levels.critical || levels.error {
        level = "error";
    }
    if levels.warning {
        level = "warn";
    }
    if levels.info {
        level = "info";
    }
    if levels.debug || config.verbose {
        level = "debug";
    }
    level
}

/// Install the global subscriber. Logs go to stderr; stdout carries results.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(config)));

    let show_file = config.format.location.show_file;
    let show_line = config.format.location.show_line;

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(show_file)
        .with_file(show_file)
        .with_line_number(show_line)
        .with_thread_ids(false);

    // Use Layer::boxed() to unify the types of the match arms
    let fmt_layer = match (config.format.json, config.format.show_time) {
        (true, true) => base.json().boxed(),
        (true, false) => base.json().without_time().boxed(),
        (false, true) => base.boxed(),
        (false, false) => base.without_time().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoggingFormatConfig, LoggingLevelsConfig, LoggingLocationConfig};

    fn logging(levels: [bool; 5], verbose: bool) -> LoggingConfig {
        let [debug, info, warning, error, critical] = levels;
        LoggingConfig {
            verbose,
            format: LoggingFormatConfig {
                show_time: false,
                json: false,
                location: LoggingLocationConfig {
                    show_file: false,
                    show_line: false,
                },
            },
            levels: LoggingLevelsConfig {
                debug,
                info,
                warning,
                error,
                critical,
            },
        }
    }

    #[test]
    fn test_most_verbose_level_wins() {
        assert_eq!(level_for(&logging([false, false, false, false, false], false)), "off");
        assert_eq!(level_for(&logging([false, false, false, false, true], false)), "error");
        assert_eq!(level_for(&logging([false, false, true, true, true], false)), "warn");
        assert_eq!(level_for(&logging([false, true, false, true, false], false)), "info");
        assert_eq!(level_for(&logging([true, false, false, false, false], false)), "debug");
    }

    #[test]
    fn test_verbose_forces_debug() {
        assert_eq!(level_for(&logging([false, false, true, true, true], true)), "debug");
    }
}
