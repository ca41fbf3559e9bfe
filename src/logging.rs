//! Diagnostics
//!
//! The log filter comes from the `CONTACTS_LOG` environment variable, then from the `log` key of
//! the config file, then from the number of `-v` flags. The command line logs to STDERR. The
//! browser owns the terminal, so it only logs to the file named by `CONTACTS_LOG_FILE`.

use {
    crate::config::Config,
    std::{env, fs::File, sync::Mutex},
    tracing::info,
    tracing_subscriber::EnvFilter,
};

const LOG_ENV: &str = "CONTACTS_LOG";
const LOG_FILE_ENV: &str = "CONTACTS_LOG_FILE";

/// Initializes logging to STDERR for command line use.
pub fn init_cli_logging(config: &Config, verbosity: u8) {
    let directive = filter_directive(env::var(LOG_ENV).ok(), config.log.as_deref(), verbosity);

    // ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&directive))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Initializes logging for the browser.
///
/// Does nothing unless `CONTACTS_LOG_FILE` is set.
pub fn init_browse_logging(config: &Config, verbosity: u8) {
    let Some(log_path) = env::var_os(LOG_FILE_ENV) else {
        return;
    };

    let log_file = match File::create(&log_path) {
        Ok(file) => file,
        Err(error) => {
            eprintln!("Warning: Could not create log file {log_path:?}: {error}");
            return;
        }
    };

    let directive = filter_directive(env::var(LOG_ENV).ok(), config.log.as_deref(), verbosity);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&directive))
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .try_init();

    info!("Browser logging initialized to {log_path:?}");
}

fn filter_directive(from_env: Option<String>, configured: Option<&str>, verbosity: u8) -> String {
    from_env
        .filter(|directive| !directive.trim().is_empty())
        .or_else(|| configured.map(str::to_owned))
        .unwrap_or_else(|| {
            match verbosity {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
            .to_owned()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_wins() {
        assert_eq!(
            filter_directive(Some("contacts=trace".to_owned()), Some("info"), 2),
            "contacts=trace"
        );
    }

    #[test]
    fn test_config_wins_over_verbosity() {
        assert_eq!(filter_directive(None, Some("info"), 3), "info");
        assert_eq!(filter_directive(Some("  ".to_owned()), Some("info"), 0), "info");
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(filter_directive(None, None, 0), "warn");
        assert_eq!(filter_directive(None, None, 1), "info");
        assert_eq!(filter_directive(None, None, 2), "debug");
        assert_eq!(filter_directive(None, None, 7), "trace");
    }
}
