//! Async submission tracking.
//!
//! [`AsyncAction`] wraps one kind of side effect (a quote submission, a
//! sign-in) and tracks `{data, error, is_loading}` for it. Guarantees:
//!
//! - `is_loading` is back to `false` before `on_success` / `on_error` run.
//! - At most one of the two callbacks fires per invocation.
//! - Once [`AsyncAction::unmount`] has been called, a late result writes no
//!   state and fires no callback or notice. The underlying future is still
//!   driven to completion; it is not aborted.
//! - A second `execute` while one is in flight is refused.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Raised, SiteError};
use crate::notice::{Notice, Notifier};

/// Default success notice text.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation completed successfully";

/// Error notice text used when the error carries no message.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

type SuccessHook<T> = Box<dyn Fn(&T) + Send + Sync>;
type ErrorHook = Box<dyn Fn(&SiteError) + Send + Sync>;

/// Behavior knobs for an [`AsyncAction`].
pub struct ActionOptions<T> {
    pub on_success: Option<SuccessHook<T>>,
    pub on_error: Option<ErrorHook>,
    pub show_error_notice: bool,
    pub show_success_notice: bool,
    /// Title of the success notice.
    pub success_title: String,
    pub success_message: String,
}

impl<T> Default for ActionOptions<T> {
    fn default() -> Self {
        Self {
            on_success: None,
            on_error: None,
            show_error_notice: true,
            show_success_notice: false,
            success_title: "Success".to_owned(),
            success_message: DEFAULT_SUCCESS_MESSAGE.to_owned(),
        }
    }
}

impl<T> ActionOptions<T> {
    #[must_use]
    pub fn on_success(mut self, hook: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_error(mut self, hook: impl Fn(&SiteError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    /// Emit a success notice with the given title and text.
    #[must_use]
    pub fn success_notice(mut self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.show_success_notice = true;
        self.success_title = title.into();
        self.success_message = message.into();
        self
    }

    #[must_use]
    pub fn quiet_errors(mut self) -> Self {
        self.show_error_notice = false;
        self
    }
}

impl<T> std::fmt::Debug for ActionOptions<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionOptions")
            .field("show_error_notice", &self.show_error_notice)
            .field("show_success_notice", &self.show_success_notice)
            .field("success_message", &self.success_message)
            .finish_non_exhaustive()
    }
}

/// Snapshot of an action's state.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionState<T> {
    pub data: Option<T>,
    pub error: Option<SiteError>,
    pub is_loading: bool,
}

impl<T> Default for ActionState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
        }
    }
}

/// Tracks one asynchronous side effect.
pub struct AsyncAction<T> {
    state: RwLock<ActionState<T>>,
    mounted: Arc<AtomicBool>,
    notifier: Arc<dyn Notifier>,
    options: ActionOptions<T>,
}

impl<T> std::fmt::Debug for AsyncAction<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncAction")
            .field("mounted", &self.is_mounted())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<T> AsyncAction<T> {
    /// Stop all further state writes, callbacks and notices.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }
}

impl<T: Clone + Send + Sync> AsyncAction<T> {
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>, options: ActionOptions<T>) -> Self {
        Self {
            state: RwLock::new(ActionState::default()),
            mounted: Arc::new(AtomicBool::new(true)),
            notifier,
            options,
        }
    }

    /// Run `task`, recording its outcome.
    ///
    /// Returns the produced value on success. Returns `None` on failure, when
    /// another invocation is still in flight, or when the action was unmounted
    /// before `task` resolved.
    pub async fn execute<F, Fut, E>(&self, task: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Raised>,
    {
        {
            let mut state = self.state.write().await;
            if state.is_loading {
                debug!("action already in flight, ignoring");
                return None;
            }
            state.is_loading = true;
            state.error = None;
        }

        let outcome = task().await;

        if !self.is_mounted() {
            debug!("action settled after unmount, discarding result");
            return None;
        }

        match outcome {
            Ok(value) => {
                {
                    let mut state = self.state.write().await;
                    state.data = Some(value.clone());
                    state.is_loading = false;
                }

                if self.options.show_success_notice {
                    self.notifier.notify(Notice::info(
                        self.options.success_title.clone(),
                        self.options.success_message.clone(),
                    ));
                }
                if let Some(hook) = &self.options.on_success {
                    hook(&value);
                }
                Some(value)
            }
            Err(raised) => {
                let error = raised.into().normalize();
                {
                    let mut state = self.state.write().await;
                    state.error = Some(error.clone());
                    state.is_loading = false;
                }

                if self.options.show_error_notice {
                    let description = if error.message().is_empty() {
                        DEFAULT_FAILURE_MESSAGE
                    } else {
                        error.message()
                    };
                    self.notifier.notify(Notice::destructive("Error", description));
                }
                if let Some(hook) = &self.options.on_error {
                    hook(&error);
                }
                None
            }
        }
    }

    /// Clear data, error and the loading flag.
    pub async fn reset(&self) {
        *self.state.write().await = ActionState::default();
    }

    pub async fn snapshot(&self) -> ActionState<T> {
        self.state.read().await.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    pub async fn data(&self) -> Option<T> {
        self.state.read().await.data.clone()
    }

    pub async fn error(&self) -> Option<SiteError> {
        self.state.read().await.error.clone()
    }
}
