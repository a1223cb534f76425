//! E-log client configuration.

use std::time::Duration;

const DEFAULT_COMMAND: &str = "elog";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOGBOOK: &str = "operations";
const DEFAULT_AUTHOR: &str = "Checklist Entry";
const DEFAULT_MESSAGE_TYPE: &str = "Default Message Type";
const DEFAULT_STATUS: &str = "closed";
const DEFAULT_REPORTING_IP: &str = "127.0.0.1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection and attribute settings for the e-log command-line client.
///
/// Defaults come from `CHECKLIST_ELOG_*` environment variables via
/// [`ElogConfig::from_env`]; every field can be overridden in code. The
/// struct is passed down explicitly, never read from global state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElogConfig {
    /// Path or name of the e-log client executable.
    pub command: String,

    /// Logbook server host.
    pub host: String,

    /// Logbook server port.
    pub port: u16,

    /// Target logbook name.
    pub logbook: String,

    /// Login user, also recorded in the entry's `User` attribute.
    pub username: String,

    /// Login password.
    pub password: String,

    /// Value of the entry's `Author` attribute.
    pub author: String,

    /// Value of the entry's `Message Type` attribute.
    pub message_type: String,

    /// Value of the entry's `Status` attribute.
    pub status: String,

    /// Address recorded in the entry's `Rem_IP` attribute.
    pub reporting_ip: String,

    /// Bound on how long a submission may block before the client is
    /// killed and the call reports a timeout.
    pub timeout: Duration,
}

impl Default for ElogConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.into(),
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            logbook: DEFAULT_LOGBOOK.into(),
            username: String::new(),
            password: String::new(),
            author: DEFAULT_AUTHOR.into(),
            message_type: DEFAULT_MESSAGE_TYPE.into(),
            status: DEFAULT_STATUS.into(),
            reporting_ip: DEFAULT_REPORTING_IP.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ElogConfig {
    /// Builds a configuration from `CHECKLIST_ELOG_*` environment
    /// variables, falling back to the defaults for anything unset.
    ///
    /// A malformed port or timeout value logs a warning and keeps the
    /// default; configuration reading never fails.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            command: env_or("CHECKLIST_ELOG_COMMAND", defaults.command),
            host: env_or("CHECKLIST_ELOG_HOST", defaults.host),
            port: env_parsed("CHECKLIST_ELOG_PORT", defaults.port),
            logbook: env_or("CHECKLIST_ELOG_LOGBOOK", defaults.logbook),
            username: env_or("CHECKLIST_ELOG_USER", defaults.username),
            password: env_or("CHECKLIST_ELOG_PASSWORD", defaults.password),
            author: env_or("CHECKLIST_ELOG_AUTHOR", defaults.author),
            message_type: env_or("CHECKLIST_ELOG_MESSAGE_TYPE", defaults.message_type),
            status: env_or("CHECKLIST_ELOG_STATUS", defaults.status),
            reporting_ip: env_or("CHECKLIST_ELOG_IP", defaults.reporting_ip),
            timeout: Duration::from_secs(env_parsed(
                "CHECKLIST_ELOG_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
        }
    }
}

fn env_or(name: &str, default: String) -> String {
    std::env::var(name).unwrap_or(default)
}

fn env_parsed<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(variable = name, value = %raw, "malformed value, using default");
                default
            }
        },
        Err(_) => default,
    }
}
