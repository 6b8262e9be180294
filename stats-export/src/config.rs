use sentry::types::Dsn;
use std::{env::var, fmt, path::PathBuf};
use tracing::{error, warn};

#[derive(Clone, Debug)]
pub struct EnvVars {
    pub environment: Environment,
    pub export_path: Option<PathBuf>,
    pub mongodb_uri: String,
    pub sentry_dsn: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                warn!(
                    "ENVIRONMENT value '{}' is not valid. Defaulting to 'production'.",
                    other
                );
                Environment::Production
            }
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl EnvVars {
    pub fn new() -> Self {
        let Ok(mongodb_uri) = var("MONGODB_URI") else {
            error!("MONGODB_URI not set");
            panic!("MONGODB_URI required");
        };
        assert!(!mongodb_uri.is_empty(), "MONGODB_URI must not be empty");

        let sentry_dsn = match var("SENTRY_DSN") {
            Ok(dsn_string) => {
                assert!(
                    valid_sentry_dsn(&dsn_string),
                    "SENTRY_DSN is not valid DSN."
                );
                Some(dsn_string)
            }
            Err(_e) => {
                if cfg!(not(debug_assertions)) {
                    panic!("SENTRY_DSN is not allowed to be unset outside of a debug build");
                }
                warn!("SENTRY_DSN not set.");
                None
            }
        };

        let environment = match var("ENVIRONMENT") {
            Ok(v) => v.into(),
            Err(_e) => {
                warn!("ENVIRONMENT not set. Defaulting to 'production'.");
                Environment::Production
            }
        };

        let export_path = match var("EXPORT_PATH") {
            Ok(p) if !p.is_empty() => Some(PathBuf::from(p)),
            _ => None,
        };

        // Optional timeout (in seconds) for the export to finish.
        let timeout_secs = match var("TIMEOUT_SECS") {
            Ok(val) => match val.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(secs),
                Ok(_) => {
                    warn!("TIMEOUT_SECS provided but not > 0; ignoring");
                    None
                }
                Err(e) => {
                    warn!("Failed to parse TIMEOUT_SECS ('{val}'): {e}; ignoring");
                    None
                }
            },
            Err(_) => None,
        };

        Self {
            environment,
            export_path,
            mongodb_uri,
            sentry_dsn,
            timeout_secs,
        }
    }
}

fn valid_sentry_dsn(url: &str) -> bool {
    url.parse::<Dsn>().is_ok()
}
