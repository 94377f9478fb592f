//! Page model and collaborator contracts for CMS template helpers.
//!
//! Template helpers read pages, blocks and sites owned by a page-management
//! subsystem and call out to several services while rendering. This crate
//! models both sides so helpers can be written against traits:
//!
//! - [`Page`], [`Block`], [`Site`]: read-only views of CMS content
//! - [`RequestContext`]: routing info for URL generation
//! - [`Router`], [`CmsManager`], [`CmsManagerSelector`], [`SiteSelector`],
//!   [`BlockRenderer`]: the services a helper consumes
//! - [`MockCms`] for testing (behind the `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cms_core::{Block, ManagerKind, Page};
//!
//! let page = Arc::new(Page::new(42, "about").with_url("/about").snapshot());
//! let container = Block::container(1, "content", page);
//! assert_eq!(container.manager_kind(), ManagerKind::Snapshot);
//! ```

mod cms;
mod context;
mod error;
#[cfg(feature = "mock")]
mod mock;
mod model;

pub use cms::{
    BlockRenderer, CmsManager, CmsManagerSelector, FixedSiteSelector, Router, SiteSelector,
    StaticRouter,
};
pub use context::{DEFAULT_HTTP_PORT, DEFAULT_HTTPS_PORT, RequestContext, RequestContextError};
pub use error::{BlockRenderError, CmsError, Lookup};
#[cfg(feature = "mock")]
pub use mock::{MockCms, MockManager, RenderCall};
pub use model::{
    Block, BlockContext, BlockId, CONTAINER_BLOCK_TYPE, HOMEPAGE_ROUTE, ManagerKind, Page, PageId,
    PageVariant, Site,
};
