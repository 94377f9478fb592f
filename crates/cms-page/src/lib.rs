//! Page linking template functions for the CMS.
//!
//! This crate provides:
//! - [`PageLinkingHelper`]: page URLs, breadcrumbs, container and block rendering
//! - [`PageEnvironment`]: a minijinja environment with the helper's functions
//!   registered and a default breadcrumb template
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use cms_config::Config;
//! use cms_core::{
//!     Block, BlockContext, BlockRenderError, BlockRenderer, CmsError, CmsManager,
//!     CmsManagerSelector, Page, RequestContext, Router, Site, SiteSelector, StaticRouter,
//! };
//! use cms_page::{Collaborators, PageEnvironment, PageValue};
//! # struct Cms;
//! # impl CmsManager for Cms {
//! #     fn current_page(&self) -> Option<Arc<Page>> { None }
//! #     fn page_by_route_name(&self, _: Option<&Site>, r: &str) -> Result<Arc<Page>, CmsError> {
//! #         Err(CmsError::not_found(cms_core::Lookup::RouteName, r))
//! #     }
//! #     fn internal_route(&self, _: Option<&Site>, r: &str) -> Result<Arc<Page>, CmsError> {
//! #         Err(CmsError::not_found(cms_core::Lookup::InternalRoute, r))
//! #     }
//! #     fn find_container(&self, _: &str, _: &Page) -> Option<Arc<Block>> { None }
//! # }
//! # struct Services;
//! # impl CmsManagerSelector for Services {
//! #     fn retrieve(&self) -> Arc<dyn CmsManager> { Arc::new(Cms) }
//! # }
//! # impl SiteSelector for Services {
//! #     fn retrieve(&self) -> Option<Arc<Site>> { None }
//! # }
//! # impl BlockRenderer for Services {
//! #     fn render_block(&self, _: &Block, _: bool, _: &BlockContext) -> Result<String, BlockRenderError> {
//! #         Ok(String::new())
//! #     }
//! # }
//! # impl Router for Services {
//! #     fn context(&self) -> RequestContext { RequestContext::new() }
//! # }
//!
//! let config = Config::load(None, None)?;
//! let services = Arc::new(Services);
//! let collaborators = Collaborators {
//!     router: Arc::new(StaticRouter::new(config.routing.request_context())),
//!     ..Collaborators::shared(&services)
//! };
//! let env = PageEnvironment::build(&config.templating, collaborators);
//!
//! let page = Arc::new(Page::new(1, "about").with_url("/about"));
//! let html = env.render_str(
//!     "<a href=\"{{ page_url(page, true) }}\">About</a>{{ page_breadcrumb(page) }}",
//!     minijinja::context! { page => PageValue::wrap(&page) },
//! )?;
//! # Ok(())
//! # }
//! ```

mod environment;
mod functions;
mod helper;
mod options;
mod template;
mod url;
mod value;

pub use environment::{JinjaEngine, PageEnvironment};
pub use functions::{
    BREADCRUMB_FUNCTION, RENDER_BLOCK_FUNCTION, RENDER_CONTAINER_FUNCTION,
    SONATA_BREADCRUMB_FUNCTION, SONATA_RENDER_BLOCK_FUNCTION, SONATA_RENDER_CONTAINER_FUNCTION,
    SONATA_URL_FUNCTION, TemplateFunctionProvider, URL_FUNCTION,
};
pub use helper::{Collaborators, HelperError, HelperOptions, PageLinkingHelper, PageRef};
pub use options::{BreadcrumbOptions, DEFAULT_CONTAINER_CLASS, OptionsError};
pub use template::{CompiledTemplate, TemplateCache, TemplateEngine, TemplateError};
pub use url::UrlTarget;
pub use value::{BlockValue, PageValue};
