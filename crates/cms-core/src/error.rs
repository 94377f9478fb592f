//! Errors raised by CMS collaborators.

use std::fmt;

use crate::model::BlockId;

/// What kind of lookup failed to find a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// Lookup by route name (e.g. `"homepage"`).
    RouteName,
    /// Lookup by internal routing alias.
    InternalRoute,
    /// The requested snapshot does not exist.
    Snapshot,
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RouteName => "route name",
            Self::InternalRoute => "internal route",
            Self::Snapshot => "snapshot",
        })
    }
}

/// Error returned by a [`CmsManager`](crate::CmsManager).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CmsError {
    /// Content legitimately absent.
    #[error("Page not found by {lookup}: {key}")]
    PageNotFound {
        lookup: Lookup,
        key: String,
    },
    /// Backend failure unrelated to page existence.
    #[error("CMS backend error: {0}")]
    Backend(String),
}

impl CmsError {
    #[must_use]
    pub fn not_found(lookup: Lookup, key: impl Into<String>) -> Self {
        Self::PageNotFound {
            lookup,
            key: key.into(),
        }
    }

    /// True for lookups that found nothing, as opposed to backend failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PageNotFound { .. })
    }
}

/// Error returned by a [`BlockRenderer`](crate::BlockRenderer).
#[derive(Debug, thiserror::Error)]
#[error("Block {block_id} failed to render: {message}")]
pub struct BlockRenderError {
    pub block_id: BlockId,
    pub message: String,
}

impl BlockRenderError {
    #[must_use]
    pub fn new(block_id: BlockId, message: impl Into<String>) -> Self {
        Self {
            block_id,
            message: message.into(),
        }
    }
}
