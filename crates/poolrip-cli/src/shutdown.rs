use poolrip_core::CancelToken;
use tracing::warn;

/// Ctrl-C aware stop flag shared with running exports.
///
/// Every export token shares one flag, so cancelling any of them stops an
/// export in progress at its next block read.
pub struct ShutdownSignal {
    token: CancelToken,
}

impl ShutdownSignal {
    /// Create a new shutdown signal in the non-shutdown state.
    pub fn new() -> Self {
        Self {
            token: CancelToken::new(),
        }
    }

    /// Create a signal that is triggered by Ctrl-C.
    pub fn install() -> anyhow::Result<Self> {
        let signal = Self::new();
        let handler = signal.token.clone();
        ctrlc::set_handler(move || {
            warn!("Received Ctrl-C, stopping after the current block...");
            handler.cancel();
        })?;
        Ok(signal)
    }

    pub fn is_shutdown(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token for one export, expiring after `timeout` when given
    pub fn export_token(&self, timeout: Option<std::time::Duration>) -> CancelToken {
        match timeout {
            Some(timeout) => self.token.with_timeout(timeout),
            None => self.token.clone(),
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_initial_state() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutdown());
        assert!(signal.export_token(None).check().is_ok());
    }

    #[test]
    fn test_cancel_reaches_every_export_token() {
        let signal = ShutdownSignal::new();
        let token = signal.export_token(Some(Duration::from_secs(60)));

        signal.export_token(None).cancel();
        assert!(signal.is_shutdown());
        assert!(matches!(token.check(), Err(poolrip_core::Error::Cancelled)));
    }

    #[test]
    fn test_timeout_is_per_token() {
        let signal = ShutdownSignal::new();
        let expired = signal.export_token(Some(Duration::ZERO));

        assert!(matches!(
            expired.check(),
            Err(poolrip_core::Error::DeadlineExceeded)
        ));
        assert!(!signal.is_shutdown());
    }
}
