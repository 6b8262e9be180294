use std::{env::var, fmt, sync::Arc};

use course_utils::{
    gate::VerificationGate, grading::PassingPolicy, resolver::CourseResolver,
    tracker::ProgressTracker,
};
use sentry::types::Dsn;
use store::DocumentStore;
use tracing::{error, warn};

use crate::photos::PhotoStorage;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub photos: Arc<dyn PhotoStorage>,
    pub tracker: ProgressTracker,
    pub resolver: CourseResolver,
    pub gate: VerificationGate,
    pub env_vars: EnvVars,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        photos: Arc<dyn PhotoStorage>,
        env_vars: EnvVars,
    ) -> Self {
        AppState {
            tracker: ProgressTracker::new(store.clone(), env_vars.passing_policy),
            resolver: CourseResolver::new(store.clone()),
            gate: VerificationGate::new(store.clone()),
            store,
            photos,
            env_vars,
        }
    }
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
                warn!("ENVIRONMENT value '{other}' is not valid. Defaulting to 'production'.");
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

#[derive(Clone, Debug)]
pub struct EnvVars {
    pub bucket_name: String,
    pub environment: Environment,
    pub jwt_secret: String,
    pub mongodb_uri: String,
    pub passing_policy: PassingPolicy,
    pub port: u16,
    pub request_body_size_limit: usize,
    pub request_timeout_in_ms: u64,
    pub sentry_dsn: Option<String>,
}

impl EnvVars {
    pub fn new() -> Self {
        let Ok(mongodb_uri) = var("MONGODB_URI") else {
            error!("MONGODB_URI not set");
            panic!("MONGODB_URI required");
        };
        assert!(!mongodb_uri.is_empty(), "MONGODB_URI must not be empty");

        let Ok(jwt_secret) = var("JWT_SECRET") else {
            error!("JWT_SECRET not set");
            panic!("JWT_SECRET required");
        };
        assert!(!jwt_secret.is_empty(), "JWT_SECRET must not be empty");

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

        let default_bucket_name = "LEARN_VERIFICATION_PHOTOS".to_string();
        let bucket_name = match var("S3_BUCKET_NAME") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                warn!("S3_BUCKET_NAME not set. Defaulting to {default_bucket_name}");
                default_bucket_name
            }
        };

        let port = match var("PORT") {
            Ok(port_string) => port_string.parse().expect("PORT to be parseable as u16"),
            Err(_e) => {
                let default_port = 3002;
                warn!("PORT not set. Defaulting to {default_port}");
                default_port
            }
        };

        let request_timeout_in_ms = match var("REQUEST_TIMEOUT_IN_MS") {
            Ok(s) => s
                .parse()
                .expect("REQUEST_TIMEOUT_IN_MS to be valid unsigned integer"),
            Err(_e) => {
                let default_request_timeout = 30_000;
                warn!("REQUEST_TIMEOUT_IN_MS not set. Defaulting to {default_request_timeout}");
                default_request_timeout
            }
        };

        let request_body_size_limit = match var("REQUEST_BODY_SIZE_LIMIT") {
            Ok(s) => s
                .parse()
                .expect("REQUEST_BODY_SIZE_LIMIT to be valid unsigned integer"),
            Err(_e) => {
                let default_request_body_size_limit = 5 * 2usize.pow(20);
                warn!(
                    "REQUEST_BODY_SIZE_LIMIT not set. Defaulting to {default_request_body_size_limit}"
                );
                default_request_body_size_limit
            }
        };

        let passing_policy = match var("EXAM_PASSING_PERCENT") {
            Ok(s) => match parse_passing_policy(&s) {
                Ok(policy) => policy,
                Err(e) => panic!("EXAM_PASSING_PERCENT is invalid: {e}"),
            },
            Err(_e) => {
                warn!("EXAM_PASSING_PERCENT not set. Every answer must be correct to pass.");
                PassingPolicy::AllCorrect
            }
        };

        EnvVars {
            bucket_name,
            environment,
            jwt_secret,
            mongodb_uri,
            passing_policy,
            port,
            request_body_size_limit,
            request_timeout_in_ms,
            sentry_dsn,
        }
    }
}

fn parse_passing_policy(s: &str) -> Result<PassingPolicy, String> {
    let percent: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("{s:?} is not a number"))?;
    PassingPolicy::from_percent(percent).map_err(|e| e.to_string())
}

fn valid_sentry_dsn(url: &str) -> bool {
    url.parse::<Dsn>().is_ok()
}
