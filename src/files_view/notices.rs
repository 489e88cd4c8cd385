use time::OffsetDateTime;

use crate::remote::RemoteStatusError;

pub const NOTICE_TITLE: &str = "Error";
pub const LISTING_FAILED: &str = "Something went wrong getting files";
pub const ROW_NOT_FOUND: &str = "Something wrong browsing app";
pub const COMPARISON_FAILED: &str = "Something went wrong comparing branches";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    ListingFetchFailure,
    ComparisonFetchFailure,
    RowResolutionFailure,
}

/// A user-visible notification raised by the view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: &'static str,
    pub message: String,
    pub at: OffsetDateTime,
}

impl Notice {
    pub fn error(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: NOTICE_TITLE,
            message: message.into(),
            at: OffsetDateTime::now_utc(),
        }
    }
}

/// The message a failed request should show: the backend's own message when
/// it sent one, else the innermost cause.
pub(super) fn failure_message(err: &anyhow::Error) -> Option<String> {
    let msg = err
        .chain()
        .find_map(|e| e.downcast_ref::<RemoteStatusError>())
        .map(|e| e.message.clone())
        .unwrap_or_else(|| err.root_cause().to_string());
    let msg = msg.trim();
    if msg.is_empty() {
        None
    } else {
        Some(msg.to_string())
    }
}
