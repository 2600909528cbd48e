use std::{
    fmt::Debug,
    sync::{Arc, Mutex, OnceLock, PoisonError},
    thread::{self, sleep},
    time::Duration,
};

use futures::future::{FutureExt, Shared};
use futures_channel::oneshot;
use thiserror::Error;

/// Why a [CancelToken] fired
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    #[error("initialization was cancelled")]
    Cancelled,
    #[error("initialization deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation signal shared by every init hook of one initialization run
///
/// Cancellation is cooperative: hooks observe the token themselves, through
/// [CancelToken::is_cancelled] or by awaiting [CancelToken::cancelled].
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}
struct CancelInner {
    reason: OnceLock<CancelReason>,
    trigger: Mutex<Option<oneshot::Sender<()>>>,
    signal: Shared<oneshot::Receiver<()>>,
}
impl Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("reason", &self.reason())
            .finish()
    }
}
impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// A token which only fires when [CancelToken::cancel] is called
    pub fn new() -> Self {
        let (trigger, signal) = oneshot::channel();
        CancelToken {
            inner: Arc::new(CancelInner {
                reason: OnceLock::new(),
                trigger: Mutex::new(Some(trigger)),
                signal: signal.shared(),
            }),
        }
    }

    /// A token which fires once the timeout elapsed
    pub fn with_timeout(timeout: Duration) -> Self {
        let token = Self::new();

        // We don't join the thread - it will just die after the timeout
        let timer = Arc::downgrade(&token.inner);
        thread::spawn(move || {
            sleep(timeout);
            if let Some(inner) = timer.upgrade() {
                CancelToken { inner }.fire(CancelReason::DeadlineExceeded);
            }
        });

        token
    }

    /// Signals cancellation to every holder of the token
    pub fn cancel(&self) {
        self.fire(CancelReason::Cancelled);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.reason.get().is_some()
    }

    /// The reason of the first cancellation, `None` while the token has not fired
    pub fn reason(&self) -> Option<CancelReason> {
        self.inner.reason.get().copied()
    }

    /// Returns the cancellation reason as an error once the token fired
    pub fn check(&self) -> Result<(), CancelReason> {
        match self.reason() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// Resolves once the token fired
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }

        // The sender lives inside the token, so the signal can't be dropped while `self` is held
        let _ = self.inner.signal.clone().await;
    }

    fn fire(&self, reason: CancelReason) {
        // First reason wins
        if self.inner.reason.set(reason).is_err() {
            return;
        }
        tracing::debug!("Cancellation token fired: {}", reason);

        let trigger = self
            .inner
            .trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(trigger) = trigger {
            let _ = trigger.send(());
        }
    }
}
