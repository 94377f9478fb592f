//! Page linking helper.
//!
//! [`PageLinkingHelper`] backs the page template functions. It resolves
//! pages through the CMS manager and site selector, builds URLs from the
//! router's context and hands block rendering to the block renderer.
//!
//! # Error policy
//!
//! - Content legitimately absent (a page, route or snapshot lookup that
//!   finds nothing) renders as an empty result.
//! - Linking a dynamic page is an error in debug mode and an empty URL
//!   otherwise.
//! - Everything else (backend failures, block renderer and template errors)
//!   propagates to the caller.

use std::collections::BTreeMap;
use std::sync::Arc;

use cms_config::TemplatingConfig;
use cms_core::{
    Block, BlockContext, BlockRenderError, BlockRenderer, CmsError, CmsManagerSelector,
    HOMEPAGE_ROUTE, Page, PageId, Router, SiteSelector,
};
use minijinja::Value;

use crate::options::{BreadcrumbOptions, OptionsError};
use crate::template::{TemplateCache, TemplateEngine, TemplateError};
use crate::url::{UrlTarget, build_url};
use crate::value::PageValue;

/// Error from a helper operation.
#[derive(Debug, thiserror::Error)]
pub enum HelperError {
    /// A URL was requested for a dynamic page in debug mode.
    #[error("Unable to generate path for dynamic page {page_id}")]
    DynamicPageUrl { page_id: PageId },
    /// CMS backend failure.
    #[error(transparent)]
    Cms(#[from] CmsError),
    /// Block renderer failure.
    #[error(transparent)]
    BlockRender(#[from] BlockRenderError),
    /// Template loading or rendering failure.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// Invalid breadcrumb options.
    #[error(transparent)]
    Options(#[from] OptionsError),
}

/// Services the helper consumes.
#[derive(Clone)]
pub struct Collaborators {
    pub router: Arc<dyn Router>,
    pub cms: Arc<dyn CmsManagerSelector>,
    pub sites: Arc<dyn SiteSelector>,
    pub blocks: Arc<dyn BlockRenderer>,
}

impl Collaborators {
    /// Use one service for every role.
    pub fn shared<T>(service: &Arc<T>) -> Self
    where
        T: Router + CmsManagerSelector + SiteSelector + BlockRenderer + 'static,
    {
        Self {
            router: Arc::clone(service) as Arc<dyn Router>,
            cms: Arc::clone(service) as Arc<dyn CmsManagerSelector>,
            sites: Arc::clone(service) as Arc<dyn SiteSelector>,
            blocks: Arc::clone(service) as Arc<dyn BlockRenderer>,
        }
    }
}

/// Helper behavior fixed at construction.
#[derive(Clone, Debug)]
pub struct HelperOptions {
    /// Report misuse (dynamic page URLs) as errors instead of empty strings.
    pub debug: bool,
    /// Template rendered by [`PageLinkingHelper::breadcrumb`].
    pub breadcrumb_template: String,
}

impl Default for HelperOptions {
    fn default() -> Self {
        Self::from(&TemplatingConfig::default())
    }
}

impl From<&TemplatingConfig> for HelperOptions {
    fn from(config: &TemplatingConfig) -> Self {
        Self {
            debug: config.debug,
            breadcrumb_template: config.breadcrumb_template.clone(),
        }
    }
}

/// Page a container is looked up on.
#[derive(Clone, Debug)]
pub enum PageRef {
    /// The page being rendered.
    Current,
    /// A page resolved by internal routing alias on the active site.
    InternalRoute(String),
    /// A page already at hand.
    Page(Arc<Page>),
}

impl From<Arc<Page>> for PageRef {
    fn from(page: Arc<Page>) -> Self {
        Self::Page(page)
    }
}

impl From<&str> for PageRef {
    fn from(path: &str) -> Self {
        Self::InternalRoute(path.to_owned())
    }
}

/// Page URLs, breadcrumbs, containers and blocks for templates.
pub struct PageLinkingHelper {
    router: Arc<dyn Router>,
    cms: Arc<dyn CmsManagerSelector>,
    sites: Arc<dyn SiteSelector>,
    blocks: Arc<dyn BlockRenderer>,
    templates: TemplateCache,
    options: HelperOptions,
}

impl PageLinkingHelper {
    #[must_use]
    pub fn new(
        collaborators: Collaborators,
        engine: Arc<dyn TemplateEngine>,
        options: HelperOptions,
    ) -> Self {
        Self {
            router: collaborators.router,
            cms: collaborators.cms,
            sites: collaborators.sites,
            blocks: collaborators.blocks,
            templates: TemplateCache::new(engine),
            options,
        }
    }

    pub fn options(&self) -> &HelperOptions {
        &self.options
    }

    /// URL for a page or path, prefixed with the base URL.
    ///
    /// With `absolute`, the result carries `scheme://host[:port]` when the
    /// router knows the host.
    ///
    /// # Errors
    ///
    /// Returns [`HelperError::DynamicPageUrl`] for dynamic pages in debug mode.
    pub fn url(&self, target: Option<UrlTarget<'_>>, absolute: bool) -> Result<String, HelperError> {
        let path = match target {
            None => return Ok(String::new()),
            Some(UrlTarget::Path(path)) if path.is_empty() => return Ok(String::new()),
            Some(UrlTarget::Path(path)) => path,
            Some(UrlTarget::Page(page)) if page.is_dynamic() => {
                if self.options.debug {
                    return Err(HelperError::DynamicPageUrl { page_id: page.id });
                }
                tracing::debug!(page_id = %page.id, "No URL for dynamic page");
                return Ok(String::new());
            }
            Some(UrlTarget::Page(page)) => page.effective_url(),
        };

        Ok(build_url(&self.router.context(), path, absolute))
    }

    /// Render the breadcrumb template for `page`, or the current page.
    ///
    /// The template receives `page` (possibly none), `breadcrumbs` (see
    /// [`Self::breadcrumb_trail`]) and `options`.
    pub fn breadcrumb(
        &self,
        page: Option<Arc<Page>>,
        options: &BreadcrumbOptions,
    ) -> Result<String, HelperError> {
        let page = page.or_else(|| self.cms.retrieve().current_page());
        let breadcrumbs = match &page {
            Some(page) => self.breadcrumb_trail(page, options)?,
            None => Vec::new(),
        };

        let params = BTreeMap::from([
            (
                "page",
                page.as_ref().map_or_else(|| Value::from(()), PageValue::wrap),
            ),
            (
                "breadcrumbs",
                Value::from(breadcrumbs.iter().map(PageValue::wrap).collect::<Vec<_>>()),
            ),
            ("options", Value::from_serialize(options)),
        ]);

        Ok(self
            .templates
            .render(&self.options.breadcrumb_template, Value::from(params))?)
    }

    /// Ancestors of `page`, root first, with the home page prepended when
    /// `force_view_home_page` is set and the chain does not start with it.
    ///
    /// A missing home page is left out silently.
    pub fn breadcrumb_trail(
        &self,
        page: &Page,
        options: &BreadcrumbOptions,
    ) -> Result<Vec<Arc<Page>>, HelperError> {
        let mut trail = page.parents.clone();
        let starts_at_home = trail.first().is_some_and(|first| first.is_homepage());

        if options.force_view_home_page
            && !starts_at_home
            && let Some(home) = self.homepage()?
        {
            trail.insert(0, home);
        }

        Ok(trail)
    }

    fn homepage(&self) -> Result<Option<Arc<Page>>, CmsError> {
        let site = self.sites.retrieve();
        match self
            .cms
            .retrieve()
            .page_by_route_name(site.as_deref(), HOMEPAGE_ROUTE)
        {
            Ok(home) => Ok(Some(home)),
            Err(e) if e.is_not_found() => {
                tracing::debug!(error = %e, "Breadcrumb rendered without home page");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Render the container `name` of the referenced page.
    ///
    /// Returns an empty string when the page cannot be resolved (including
    /// a missing snapshot) or has no such container.
    pub fn render_container(
        &self,
        name: &str,
        page: PageRef,
        use_cache: bool,
    ) -> Result<String, HelperError> {
        let cms = self.cms.retrieve();
        let resolved = match page {
            PageRef::Current => Ok(cms.current_page()),
            PageRef::InternalRoute(path) => {
                let site = self.sites.retrieve();
                cms.internal_route(site.as_deref(), &path).map(Some)
            }
            PageRef::Page(page) => Ok(Some(page)),
        };

        let target = match resolved {
            Ok(target) => target,
            Err(e) if e.is_not_found() => {
                tracing::debug!(container = name, error = %e, "Container page not found");
                None
            }
            Err(e) => return Err(e.into()),
        };

        let Some(target) = target else {
            return Ok(String::new());
        };
        let Some(container) = cms.find_container(name, &target) else {
            return Ok(String::new());
        };

        self.render_block(&container, use_cache)
    }

    /// Render `block` through the block renderer.
    ///
    /// The renderer is told which backend owns the block's page
    /// (`"page"` or `"snapshot"`) and the page's id.
    pub fn render_block(&self, block: &Block, use_cache: bool) -> Result<String, HelperError> {
        let context = BlockContext::for_block(block);
        Ok(self.blocks.render_block(block, use_cache, &context)?)
    }
}

#[cfg(test)]
mod tests {
    // Captured by template-engine functions, which must be Send + Sync
    static_assertions::assert_impl_all!(super::PageLinkingHelper: Send, Sync);

    use cms_core::{BlockId, ManagerKind, MockCms, RequestContext, Site};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::template::testing::InlineEngine;

    const TRAIL_TEMPLATE: &str = "{% if page %}{{ page.route_name }}{% else %}-{% endif %}:\
        {% for crumb in breadcrumbs %}{{ crumb.route_name }},{% endfor %}:\
        {{ options.separator }}";

    fn home() -> Arc<Page> {
        Arc::new(Page::new(1, HOMEPAGE_ROUTE).with_name("Home").with_url("/"))
    }

    fn helper_with(cms: MockCms, options: HelperOptions) -> (PageLinkingHelper, Arc<MockCms>) {
        let cms = Arc::new(cms);
        let engine =
            Arc::new(InlineEngine::default().with_template("page/breadcrumb.html", TRAIL_TEMPLATE));
        let helper = PageLinkingHelper::new(Collaborators::shared(&cms), engine, options);
        (helper, cms)
    }

    fn helper(cms: MockCms) -> (PageLinkingHelper, Arc<MockCms>) {
        helper_with(cms, HelperOptions::default())
    }

    fn debug_options() -> HelperOptions {
        HelperOptions {
            debug: true,
            ..HelperOptions::default()
        }
    }

    // ========================================================================
    // url
    // ========================================================================

    #[test]
    fn test_url_none_is_empty() {
        let (helper, _) = helper(MockCms::new().with_context(
            RequestContext::new().with_host("example.com"),
        ));

        assert_eq!(helper.url(None, false).unwrap(), "");
        assert_eq!(helper.url(None, true).unwrap(), "");
    }

    #[test]
    fn test_url_empty_path_is_empty() {
        let (helper, _) = helper(MockCms::new().with_context(
            RequestContext::new().with_base_url("/app"),
        ));

        assert_eq!(helper.url(Some(UrlTarget::Path("")), false).unwrap(), "");
    }

    #[test]
    fn test_url_custom_url_with_base_url() {
        let (helper, _) = helper(MockCms::new().with_context(
            RequestContext::new().with_base_url("/app"),
        ));
        let page = Page::new(2, "about")
            .with_url("/about")
            .with_custom_url("/company/about");

        assert_eq!(
            helper.url(Some(UrlTarget::Page(&page)), false).unwrap(),
            "/app/company/about"
        );
    }

    #[test]
    fn test_url_falls_back_to_canonical_url() {
        let (helper, _) = helper(MockCms::new());
        let page = Page::new(2, "about").with_url("/about");

        assert_eq!(helper.url(Some((&page).into()), false).unwrap(), "/about");
    }

    #[test]
    fn test_url_path_used_verbatim() {
        let (helper, _) = helper(MockCms::new().with_context(
            RequestContext::new().with_base_url("/app"),
        ));

        assert_eq!(
            helper.url(Some("/raw/path?x=1".into()), false).unwrap(),
            "/app/raw/path?x=1"
        );
    }

    #[test]
    fn test_url_absolute_default_http_port_omitted() {
        let (helper, _) = helper(MockCms::new().with_context(
            RequestContext::new()
                .with_host("example.com")
                .with_base_url("/app"),
        ));
        let page = Page::new(2, "about").with_url("/about");

        assert_eq!(
            helper.url(Some((&page).into()), true).unwrap(),
            "http://example.com/app/about"
        );
    }

    #[test]
    fn test_url_absolute_https_custom_port_included() {
        let (helper, _) = helper(MockCms::new().with_context(
            RequestContext::new()
                .with_host("example.com")
                .with_scheme("https")
                .with_https_port(8443),
        ));
        let page = Page::new(2, "about").with_url("/about");

        assert_eq!(
            helper.url(Some((&page).into()), true).unwrap(),
            "https://example.com:8443/about"
        );
    }

    #[test]
    fn test_url_absolute_without_host_is_relative() {
        let (helper, _) = helper(MockCms::new());
        let page = Page::new(2, "about").with_url("/about");

        assert_eq!(helper.url(Some((&page).into()), true).unwrap(), "/about");
    }

    #[test]
    fn test_url_dynamic_page_debug_is_error() {
        let (helper, _) = helper_with(MockCms::new(), debug_options());
        let page = Page::new(9, "search").with_url("/search").dynamic();

        let err = helper.url(Some((&page).into()), false).unwrap_err();

        assert!(matches!(
            err,
            HelperError::DynamicPageUrl { page_id: PageId(9) }
        ));
        assert_eq!(
            err.to_string(),
            "Unable to generate path for dynamic page 9"
        );
    }

    #[test]
    fn test_url_dynamic_page_production_is_empty() {
        let (helper, _) = helper(MockCms::new().with_context(
            RequestContext::new().with_host("example.com"),
        ));
        let page = Page::new(9, "search").with_url("/search").dynamic();

        assert_eq!(helper.url(Some((&page).into()), false).unwrap(), "");
        assert_eq!(helper.url(Some((&page).into()), true).unwrap(), "");
    }

    // ========================================================================
    // breadcrumb
    // ========================================================================

    #[test]
    fn test_breadcrumb_homepage_not_duplicated() {
        let home = home();
        let page = Arc::new(
            Page::new(3, "install").with_parents(vec![Arc::clone(&home), Arc::new(Page::new(2, "docs"))]),
        );
        let (helper, cms) = helper(MockCms::new().with_route(home));

        let out = helper
            .breadcrumb(Some(page), &BreadcrumbOptions::default())
            .unwrap();

        assert_eq!(out, "install:homepage,docs,:");
        assert!(cms.route_lookups().is_empty());
    }

    #[test]
    fn test_breadcrumb_prepends_missing_homepage_once() {
        let page = Arc::new(Page::new(3, "install").with_parents(vec![Arc::new(Page::new(2, "docs"))]));
        let (helper, cms) = helper(MockCms::new().with_route(home()));

        let out = helper
            .breadcrumb(Some(page), &BreadcrumbOptions::default())
            .unwrap();

        assert_eq!(out, "install:homepage,docs,:");
        assert_eq!(cms.route_lookups(), vec!["homepage".to_owned()]);
    }

    #[test]
    fn test_breadcrumb_prepends_homepage_to_empty_ancestors() {
        let page = Arc::new(Page::new(3, "about"));
        let (helper, _) = helper(MockCms::new().with_route(home()));

        let trail = helper
            .breadcrumb_trail(&page, &BreadcrumbOptions::default())
            .unwrap();

        let routes: Vec<&str> = trail.iter().map(|p| p.route_name.as_str()).collect();
        assert_eq!(routes, vec!["homepage"]);
    }

    #[test]
    fn test_breadcrumb_missing_homepage_renders_without_it() {
        let page = Arc::new(Page::new(3, "install").with_parents(vec![Arc::new(Page::new(2, "docs"))]));
        let (helper, _) = helper(MockCms::new());

        let out = helper
            .breadcrumb(Some(page), &BreadcrumbOptions::default())
            .unwrap();

        assert_eq!(out, "install:docs,:");
    }

    #[test]
    fn test_breadcrumb_force_view_home_page_disabled() {
        let page = Arc::new(Page::new(3, "install").with_parents(vec![Arc::new(Page::new(2, "docs"))]));
        let (helper, cms) = helper(MockCms::new().with_route(home()));
        let options = BreadcrumbOptions {
            force_view_home_page: false,
            separator: " > ".to_owned(),
            ..BreadcrumbOptions::default()
        };

        let out = helper.breadcrumb(Some(page), &options).unwrap();

        assert_eq!(out, "install:docs,: > ");
        assert!(cms.route_lookups().is_empty());
    }

    #[test]
    fn test_breadcrumb_defaults_to_current_page() {
        let current = Arc::new(Page::new(4, "contact"));
        let (helper, _) = helper(MockCms::new().with_route(home()).with_current_page(current));

        let out = helper.breadcrumb(None, &BreadcrumbOptions::default()).unwrap();

        assert_eq!(out, "contact:homepage,:");
    }

    #[test]
    fn test_breadcrumb_without_any_page_still_renders() {
        let (helper, cms) = helper(MockCms::new().with_route(home()));

        let out = helper.breadcrumb(None, &BreadcrumbOptions::default()).unwrap();

        assert_eq!(out, "-::");
        assert!(cms.route_lookups().is_empty());
    }

    #[test]
    fn test_breadcrumb_backend_failure_propagates() {
        let page = Arc::new(Page::new(3, "about"));
        let (helper, _) = helper(MockCms::new().with_backend_failure("database down"));

        let err = helper
            .breadcrumb(Some(page), &BreadcrumbOptions::default())
            .unwrap_err();

        assert!(matches!(err, HelperError::Cms(CmsError::Backend(_))));
    }

    #[test]
    fn test_breadcrumb_template_loaded_once() {
        let cms = Arc::new(MockCms::new().with_route(home()));
        let engine =
            Arc::new(InlineEngine::default().with_template("page/breadcrumb.html", TRAIL_TEMPLATE));
        let helper = PageLinkingHelper::new(
            Collaborators::shared(&cms),
            Arc::clone(&engine) as Arc<dyn TemplateEngine>,
            HelperOptions::default(),
        );
        let page = Arc::new(Page::new(3, "about"));

        helper
            .breadcrumb(Some(Arc::clone(&page)), &BreadcrumbOptions::default())
            .unwrap();
        helper
            .breadcrumb(Some(page), &BreadcrumbOptions::default())
            .unwrap();

        assert_eq!(engine.loads(), 1);
    }

    #[test]
    fn test_breadcrumb_missing_template_is_error() {
        let (helper, _) = helper_with(
            MockCms::new(),
            HelperOptions {
                breadcrumb_template: "missing.html".to_owned(),
                ..HelperOptions::default()
            },
        );

        let err = helper.breadcrumb(None, &BreadcrumbOptions::default()).unwrap_err();

        assert!(matches!(
            err,
            HelperError::Template(TemplateError::NotFound(_))
        ));
    }

    // ========================================================================
    // render_container / render_block
    // ========================================================================

    #[test]
    fn test_render_container_unknown_internal_route_is_empty() {
        let (helper, cms) = helper(MockCms::new());

        let out = helper
            .render_container("content", PageRef::from("global"), true)
            .unwrap();

        assert_eq!(out, "");
        assert!(cms.render_calls().is_empty());
    }

    #[test]
    fn test_render_container_missing_container_is_empty() {
        let page = Arc::new(Page::new(5, "about"));
        let (helper, cms) = helper(MockCms::new());

        let out = helper
            .render_container("sidebar", PageRef::Page(page), true)
            .unwrap();

        assert_eq!(out, "");
        assert!(cms.render_calls().is_empty());
    }

    #[test]
    fn test_render_container_of_given_page() {
        let page = Arc::new(Page::new(5, "about"));
        let container = Arc::new(Block::container(50, "content", Arc::clone(&page)));
        let (helper, cms) = helper(MockCms::new().with_container(container));

        let out = helper
            .render_container("content", PageRef::Page(page), true)
            .unwrap();

        assert_eq!(
            out,
            "<div class=\"cms-block\" data-id=\"50\" data-manager=\"page\"></div>"
        );
        let calls = cms.render_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].use_cache);
        assert_eq!(calls[0].context.page_id, PageId(5));
    }

    #[test]
    fn test_render_container_without_current_page_is_empty() {
        let (helper, _) = helper(MockCms::new());

        assert_eq!(
            helper.render_container("content", PageRef::Current, true).unwrap(),
            ""
        );
    }

    #[test]
    fn test_render_container_of_current_page() {
        let page = Arc::new(Page::new(5, "about"));
        let container = Arc::new(Block::container(50, "content", Arc::clone(&page)));
        let (helper, cms) = helper(
            MockCms::new()
                .with_current_page(page)
                .with_container(container),
        );

        let out = helper
            .render_container("content", PageRef::Current, false)
            .unwrap();

        assert_eq!(
            out,
            "<div class=\"cms-block\" data-id=\"50\" data-manager=\"page\"></div>"
        );
        let calls = cms.render_calls();
        assert_eq!(calls.len(), 1);
        assert!(!calls[0].use_cache);
    }

    #[test]
    fn test_render_container_via_internal_route() {
        let page = Arc::new(Page::new(6, "global").snapshot());
        let container = Arc::new(Block::container(60, "header", Arc::clone(&page)));
        let (helper, cms) = helper(
            MockCms::new()
                .with_site(Site::new(1, "main", "example.com"))
                .with_internal_route("global", page)
                .with_container(container),
        );

        let out = helper
            .render_container("header", PageRef::from("global"), true)
            .unwrap();

        assert!(out.contains("data-id=\"60\""));
        assert_eq!(cms.render_calls()[0].context.manager, ManagerKind::Snapshot);
    }

    #[test]
    fn test_render_container_backend_failure_propagates() {
        let (helper, _) = helper(MockCms::new().with_backend_failure("database down"));

        let err = helper
            .render_container("content", PageRef::from("global"), true)
            .unwrap_err();

        assert!(matches!(err, HelperError::Cms(_)));
    }

    #[test]
    fn test_render_block_snapshot_manager() {
        let page = Arc::new(Page::new(7, "published").snapshot());
        let block = Block::new(70, "text", page);
        let (helper, cms) = helper(MockCms::new());

        helper.render_block(&block, true).unwrap();

        let calls = cms.render_calls();
        assert_eq!(
            calls[0].context,
            BlockContext {
                manager: ManagerKind::Snapshot,
                page_id: PageId(7),
            }
        );
        assert!(calls[0].use_cache);
    }

    #[test]
    fn test_render_block_live_page_manager() {
        let page = Arc::new(Page::new(8, "draft"));
        let block = Block::new(80, "text", page);
        let (helper, cms) = helper(MockCms::new());

        helper.render_block(&block, true).unwrap();

        assert_eq!(cms.render_calls()[0].context.manager, ManagerKind::Page);
        assert_eq!(cms.render_calls()[0].context.page_id, PageId(8));
    }

    #[test]
    fn test_render_block_failure_propagates() {
        let page = Arc::new(Page::new(8, "draft"));
        let block = Block::new(81, "broken", page);
        let (helper, _) = helper(MockCms::new().with_render_failure(BlockId(81)));

        let err = helper.render_block(&block, true).unwrap_err();

        assert!(matches!(err, HelperError::BlockRender(_)));
    }
}
