use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared, write-once flag requesting that a traversal stop.
///
/// Clones observe the same flag. The walker polls it when a directory frame
/// is entered, right after the directory is opened, and before each sibling
/// is processed; in-flight filesystem calls are never interrupted.
///
/// # Examples
///
/// ```
/// use walk::CancellationToken;
///
/// let token = CancellationToken::new();
/// let observer = token.clone();
/// assert!(!observer.is_cancelled());
/// token.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Calling this more than once has no further effect.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Reports whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
