//! In-memory CMS for testing.
//!
//! Provides [`MockCms`], which implements every collaborator trait so
//! helpers can be exercised without a page-management backend.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::cms::{BlockRenderer, CmsManager, CmsManagerSelector, Router, SiteSelector};
use crate::context::RequestContext;
use crate::error::{BlockRenderError, CmsError, Lookup};
use crate::model::{Block, BlockContext, BlockId, Page, PageId, Site};

/// A recorded call to [`BlockRenderer::render_block`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderCall {
    pub block_id: BlockId,
    pub use_cache: bool,
    pub context: BlockContext,
}

/// Page lookups backing [`MockCms`].
#[derive(Debug, Default)]
pub struct MockManager {
    current: RwLock<Option<Arc<Page>>>,
    routes: RwLock<HashMap<String, Arc<Page>>>,
    internal_routes: RwLock<HashMap<String, Arc<Page>>>,
    containers: RwLock<HashMap<(PageId, String), Arc<Block>>>,
    backend_failure: RwLock<Option<String>>,
    route_lookups: RwLock<Vec<String>>,
}

impl MockManager {
    fn check_backend(&self) -> Result<(), CmsError> {
        match self.backend_failure.read().unwrap().as_ref() {
            Some(message) => Err(CmsError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

impl CmsManager for MockManager {
    fn current_page(&self) -> Option<Arc<Page>> {
        self.current.read().unwrap().clone()
    }

    fn page_by_route_name(
        &self,
        _site: Option<&Site>,
        route_name: &str,
    ) -> Result<Arc<Page>, CmsError> {
        self.route_lookups
            .write()
            .unwrap()
            .push(route_name.to_owned());
        self.check_backend()?;
        self.routes
            .read()
            .unwrap()
            .get(route_name)
            .cloned()
            .ok_or_else(|| CmsError::not_found(Lookup::RouteName, route_name))
    }

    fn internal_route(&self, _site: Option<&Site>, path: &str) -> Result<Arc<Page>, CmsError> {
        self.check_backend()?;
        self.internal_routes
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| CmsError::not_found(Lookup::InternalRoute, path))
    }

    fn find_container(&self, name: &str, page: &Page) -> Option<Arc<Block>> {
        self.containers
            .read()
            .unwrap()
            .get(&(page.id, name.to_owned()))
            .cloned()
    }
}

/// Mock CMS for testing.
///
/// Stores pages, containers and the routing context in memory and records
/// block-render calls. Use the builder methods to configure it.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use cms_core::{MockCms, Page};
///
/// let home = Arc::new(Page::new(1, "homepage").with_url("/"));
/// let cms = MockCms::new()
///     .with_route(Arc::clone(&home))
///     .with_current_page(home);
/// ```
#[derive(Debug, Default)]
pub struct MockCms {
    manager: Arc<MockManager>,
    site: Option<Arc<Site>>,
    context: RequestContext,
    render_failures: HashSet<BlockId>,
    render_calls: RwLock<Vec<RenderCall>>,
}

impl MockCms {
    /// Create an empty mock CMS.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page returned by `current_page`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_current_page(self, page: Arc<Page>) -> Self {
        *self.manager.current.write().unwrap() = Some(page);
        self
    }

    /// Register a page under its route name.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_route(self, page: Arc<Page>) -> Self {
        self.manager
            .routes
            .write()
            .unwrap()
            .insert(page.route_name.clone(), page);
        self
    }

    /// Register a page under an internal routing alias.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_internal_route(self, path: impl Into<String>, page: Arc<Page>) -> Self {
        self.manager
            .internal_routes
            .write()
            .unwrap()
            .insert(path.into(), page);
        self
    }

    /// Attach a container to its owning page under the container's name.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_container(self, container: Arc<Block>) -> Self {
        let key = (container.page.id, container.name.clone());
        self.manager
            .containers
            .write()
            .unwrap()
            .insert(key, container);
        self
    }

    #[must_use]
    pub fn with_site(mut self, site: Site) -> Self {
        self.site = Some(Arc::new(site));
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    /// Make every page lookup fail with [`CmsError::Backend`].
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_backend_failure(self, message: impl Into<String>) -> Self {
        *self.manager.backend_failure.write().unwrap() = Some(message.into());
        self
    }

    /// Make rendering of the given block fail.
    #[must_use]
    pub fn with_render_failure(mut self, block_id: BlockId) -> Self {
        self.render_failures.insert(block_id);
        self
    }

    /// Calls made to the block renderer, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn render_calls(&self) -> Vec<RenderCall> {
        self.render_calls.read().unwrap().clone()
    }

    /// Route names looked up through `page_by_route_name`, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn route_lookups(&self) -> Vec<String> {
        self.manager.route_lookups.read().unwrap().clone()
    }
}

impl CmsManagerSelector for MockCms {
    fn retrieve(&self) -> Arc<dyn CmsManager> {
        Arc::clone(&self.manager) as Arc<dyn CmsManager>
    }
}

impl SiteSelector for MockCms {
    fn retrieve(&self) -> Option<Arc<Site>> {
        self.site.clone()
    }
}

impl Router for MockCms {
    fn context(&self) -> RequestContext {
        self.context.clone()
    }
}

impl BlockRenderer for MockCms {
    /// Renders `<div class="cms-block" data-id=".." data-manager="..">`
    /// wrapping the rendered children.
    fn render_block(
        &self,
        block: &Block,
        use_cache: bool,
        context: &BlockContext,
    ) -> Result<String, BlockRenderError> {
        self.render_calls.write().unwrap().push(RenderCall {
            block_id: block.id,
            use_cache,
            context: *context,
        });

        if self.render_failures.contains(&block.id) {
            return Err(BlockRenderError::new(block.id, "mock render failure"));
        }

        let mut inner = String::new();
        for child in &block.children {
            inner.push_str(&self.render_block(child, use_cache, &BlockContext::for_block(child))?);
        }

        Ok(format!(
            "<div class=\"cms-block\" data-id=\"{}\" data-manager=\"{}\">{inner}</div>",
            block.id, context.manager
        ))
    }
}
