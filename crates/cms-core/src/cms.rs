//! Collaborator contracts consumed by template helpers.
//!
//! Page resolution, site resolution, routing and block rendering are owned
//! by other subsystems. These traits describe only what template helpers
//! need from them. All are `Send + Sync` so implementations can be shared
//! through `Arc` and captured by template-engine functions.

use std::sync::Arc;

use crate::context::RequestContext;
use crate::error::{BlockRenderError, CmsError};
use crate::model::{Block, BlockContext, Page, Site};

/// Source of the current request's routing context.
pub trait Router: Send + Sync {
    fn context(&self) -> RequestContext;
}

/// Page resolution for the active request.
pub trait CmsManager: Send + Sync {
    /// Page being rendered, if any.
    fn current_page(&self) -> Option<Arc<Page>>;

    /// Find a page by its route name.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::PageNotFound`] when no page has that route name.
    fn page_by_route_name(&self, site: Option<&Site>, route_name: &str)
    -> Result<Arc<Page>, CmsError>;

    /// Find a page by internal routing alias.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::PageNotFound`] when the alias is unknown or the
    /// snapshot for it does not exist.
    fn internal_route(&self, site: Option<&Site>, path: &str) -> Result<Arc<Page>, CmsError>;

    /// Container named `name` on `page`, if the page has one.
    fn find_container(&self, name: &str, page: &Page) -> Option<Arc<Block>>;
}

/// Picks the CMS manager for the request (live pages vs snapshots).
pub trait CmsManagerSelector: Send + Sync {
    fn retrieve(&self) -> Arc<dyn CmsManager>;
}

/// Resolves the site serving the request.
pub trait SiteSelector: Send + Sync {
    fn retrieve(&self) -> Option<Arc<Site>>;
}

/// Block-rendering subsystem.
///
/// Owns caching and failure handling for rendered blocks.
pub trait BlockRenderer: Send + Sync {
    fn render_block(
        &self,
        block: &Block,
        use_cache: bool,
        context: &BlockContext,
    ) -> Result<String, BlockRenderError>;
}

/// [`Router`] with a fixed context, for setups without a live request.
#[derive(Clone, Debug, Default)]
pub struct StaticRouter {
    context: RequestContext,
}

impl StaticRouter {
    #[must_use]
    pub fn new(context: RequestContext) -> Self {
        Self { context }
    }
}

impl Router for StaticRouter {
    fn context(&self) -> RequestContext {
        self.context.clone()
    }
}

/// [`SiteSelector`] that always returns the same site.
#[derive(Clone, Debug, Default)]
pub struct FixedSiteSelector {
    site: Option<Arc<Site>>,
}

impl FixedSiteSelector {
    #[must_use]
    pub fn new(site: Option<Arc<Site>>) -> Self {
        Self { site }
    }
}

impl SiteSelector for FixedSiteSelector {
    fn retrieve(&self) -> Option<Arc<Site>> {
        self.site.clone()
    }
}
