//! E-log command-line client driver.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use checklist_core::{CollaboratorError, LogSubmitter};

use crate::ElogConfig;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Submits checklist reports by spawning the external e-log client.
#[derive(Debug)]
pub struct ElogClient {
    config: ElogConfig,
}

impl ElogClient {
    pub fn new(config: ElogConfig) -> Self {
        Self { config }
    }
}

impl LogSubmitter for ElogClient {
    /// Spawns the e-log client once per report.
    ///
    /// The wait is bounded by the configured timeout; a client that blocks
    /// past it is killed and the call reports
    /// `CollaboratorError::Timeout`. Child output is logged line by line
    /// after a normal exit.
    ///
    /// # Errors
    ///
    /// Returns `CollaboratorError` if:
    /// - The client executable cannot be spawned
    /// - The client exits with a non-zero status
    /// - The bounded wait expires
    fn submit_report(
        &mut self,
        report: &str,
        title: &str,
        affected_systems: &[String],
    ) -> Result<(), CollaboratorError> {
        let args = build_args(&self.config, report, title, affected_systems);

        tracing::info!(
            title,
            logbook = %self.config.logbook,
            host = %self.config.host,
            "submitting checklist report to the log"
        );

        let mut child = Command::new(&self.config.command)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CollaboratorError::Failed(format!("cannot spawn {}: {e}", self.config.command))
            })?;

        let status = wait_bounded(&mut child, self.config.timeout)?;
        log_child_output(&mut child);

        if status.success() {
            Ok(())
        } else {
            Err(CollaboratorError::Failed(format!(
                "log client exited with {status}"
            )))
        }
    }
}

/// Builds the full client argument list.
///
/// The report text is always the last argument; `System Affected` joins the
/// checklist's systems with `" | "` and falls back to `Other` when the
/// checklist names none.
fn build_args(
    config: &ElogConfig,
    report: &str,
    title: &str,
    affected_systems: &[String],
) -> Vec<String> {
    let systems = if affected_systems.is_empty() {
        "Other".to_string()
    } else {
        affected_systems.join(" | ")
    };

    vec![
        "-h".into(),
        config.host.clone(),
        "-p".into(),
        config.port.to_string(),
        "-l".into(),
        config.logbook.clone(),
        "-u".into(),
        config.username.clone(),
        config.password.clone(),
        "-a".into(),
        "valid=valid".into(),
        "-a".into(),
        format!("User={}", config.username),
        "-a".into(),
        format!("Rem_IP={}", config.reporting_ip),
        "-a".into(),
        format!("Author={}", config.author),
        "-a".into(),
        format!("Message Type={}", config.message_type),
        "-a".into(),
        format!("Status={}", config.status),
        "-a".into(),
        format!("Subject={title}"),
        "-a".into(),
        format!("System Affected={systems}"),
        report.to_string(),
    ]
}

fn wait_bounded(child: &mut Child, timeout: Duration) -> Result<ExitStatus, CollaboratorError> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    if let Err(e) = child.kill() {
                        tracing::warn!("failed to kill timed-out log client: {e}");
                    }
                    let _ = child.wait();
                    return Err(CollaboratorError::Timeout(timeout));
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                return Err(CollaboratorError::Failed(format!(
                    "cannot wait for log client: {e}"
                )))
            }
        }
    }
}

fn log_child_output(child: &mut Child) {
    if let Some(mut stdout) = child.stdout.take() {
        let mut buffer = String::new();
        if stdout.read_to_string(&mut buffer).is_ok() {
            for line in buffer.lines() {
                tracing::info!("log client: {line}");
            }
        }
    }
    if let Some(mut stderr) = child.stderr.take() {
        let mut buffer = String::new();
        if stderr.read_to_string(&mut buffer).is_ok() {
            for line in buffer.lines() {
                tracing::warn!("log client: {line}");
            }
        }
    }
}
