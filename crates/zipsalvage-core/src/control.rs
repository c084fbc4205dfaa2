//! Cancellation and pacing for long-running batches.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::ExtractionError;
use crate::Result;
use crate::config::Pacing;

/// Cooperative cancellation flag shared between a batch and its controller.
///
/// Clones share the same flag. The engines check it before every archive
/// and between members.
///
/// # Examples
///
/// ```
/// use zipsalvage_core::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
///
/// assert!(token.check().is_ok());
/// handle.cancel();
/// assert!(token.is_cancelled());
/// assert!(token.check().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns `Err(ExtractionError::Cancelled)` once cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Cancelled` if the token was cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ExtractionError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Rate limiting applied after each member operation.
pub trait Pacer: Send + Sync {
    /// Called once after every member, successful or not.
    fn pause(&self);
}

impl Pacer for Pacing {
    fn pause(&self) {
        match self {
            Self::None => {}
            Self::Fixed(delay) => std::thread::sleep(*delay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use std::time::Instant;

    #[test]
    fn test_token_starts_clear() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let other = token.clone();
        other.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(ExtractionError::Cancelled)));
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let token = CancellationToken::new();
        let remote = token.clone();
        std::thread::spawn(move || remote.cancel())
            .join()
            .unwrap_or_default();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_no_pacing_returns_immediately() {
        let start = Instant::now();
        Pacing::None.pause();
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_fixed_pacing_sleeps() {
        let start = Instant::now();
        Pacing::Fixed(Duration::from_millis(20)).pause();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
