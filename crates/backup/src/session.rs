use mcup_core::{Error, Result, SCREEN_BINARY};
use std::io;
use std::process::Command;

/// Sends console lines to a long-running server session
pub trait SessionControl {
    /// Type `text` followed by a newline into `session`
    ///
    /// Returns `Error::ControlToolMissing` when the multiplexer itself is not
    /// installed and `Error::SessionNotRunning` when the session did not take
    /// the line.
    fn send_line(&self, session: &str, text: &str) -> Result<()>;
}

/// Session control through GNU `screen`
#[derive(Debug, Clone)]
pub struct ScreenSession {
    binary: String,
}

impl Default for ScreenSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenSession {
    pub fn new() -> Self {
        Self::with_binary(SCREEN_BINARY)
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl SessionControl for ScreenSession {
    fn send_line(&self, session: &str, text: &str) -> Result<()> {
        let missing = || Error::ControlToolMissing {
            tool: self.binary.clone(),
        };
        let screen = which::which(&self.binary).map_err(|_| missing())?;

        tracing::debug!(session, text, "sending session command");
        let output = Command::new(screen)
            .args(["-r", session, "-X", "stuff", &format!("{text}\n")])
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => missing(),
                _ => Error::SessionNotRunning {
                    session: session.to_string(),
                    message: format!("failed to run {}: {e}", self.binary),
                },
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = [stderr.trim(), stdout.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
            .map_or_else(|| output.status.to_string(), str::to_string);

        Err(Error::SessionNotRunning {
            session: session.to_string(),
            message: detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcup_core::ErrorKind;

    #[test]
    fn missing_binary_is_reported_as_missing_tool() {
        let session = ScreenSession::with_binary("mcup-definitely-not-a-real-multiplexer");

        let err = session.send_line("minecraft", "save-off").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ControlToolMissing);
        assert!(err.to_string().contains("mcup-definitely-not-a-real-multiplexer"));
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_is_reported_as_session_not_running() {
        // `false` ignores its arguments and exits non-zero, like screen does
        // when no session of that name exists
        let session = ScreenSession::with_binary("false");

        let err = session.send_line("minecraft", "save-off").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::SessionNotRunning);
    }
}
