//! User-visible notifications.
//!
//! The pipeline never renders anything itself; it hands [`Notice`]s to a
//! [`Notifier`]. The server collects them per request in a [`NoticeBuffer`]
//! and renders the list alongside the page.

use std::sync::{Arc, Mutex, PoisonError};

/// Visual weight of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoticeVariant {
    #[default]
    Default,
    Destructive,
}

impl NoticeVariant {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Destructive => "destructive",
        }
    }
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub variant: NoticeVariant,
    pub title: String,
    pub description: String,
}

impl Notice {
    #[must_use]
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: NoticeVariant::Default,
            title: title.into(),
            description: description.into(),
        }
    }

    #[must_use]
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: NoticeVariant::Destructive,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Receives notices emitted by the pipeline.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Collects notices in emission order. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct NoticeBuffer {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl NoticeBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every collected notice, leaving the buffer empty.
    #[must_use]
    pub fn drain(&self) -> Vec<Notice> {
        let mut notices = self.notices.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *notices)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NoticeBuffer {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}
