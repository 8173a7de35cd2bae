use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use super::BuildResult;

/// Shared flag used to cancel a request from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Bounds for one toolchain invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub timeout: Duration,
    pub cancel: CancellationToken,
}

impl Invocation {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// The host build toolchain.
///
/// Both operations block until the process exits, the timeout passes, or
/// the token is cancelled, and report the outcome as a [`BuildResult`].
pub trait Toolchain: Send + Sync {
    fn name(&self) -> &'static str;

    /// Compile without producing an artifact.
    fn check(&self, root: &Path, invocation: &Invocation) -> BuildResult;

    /// Compile and place the binary at `output` (relative paths resolve against `root`).
    fn build(&self, root: &Path, output: &Path, invocation: &Invocation) -> BuildResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_shared() {
        let token = CancellationToken::new();
        let invocation = Invocation::new(Duration::from_secs(1)).with_cancellation(token.clone());

        assert!(!invocation.cancel.is_cancelled());
        token.cancel();
        assert!(invocation.cancel.is_cancelled());
    }
}
