//! Template function registration.
//!
//! Registered functions:
//!
//! | function                | arguments                               | returns      |
//! |-------------------------|-----------------------------------------|--------------|
//! | `page_url`              | `page=none, absolute=false`             | string       |
//! | `page_breadcrumb`       | `page=none, options={}`                 | safe HTML    |
//! | `page_render_container` | `name, page=none, use_cache=true`       | safe HTML    |
//! | `page_render_block`     | `block, use_cache=true`                 | safe HTML    |
//!
//! Each is also registered under its `sonata_` prefixed name
//! (`sonata_page_url` and so on) for existing Sonata page templates.
//!
//! `page` is a page object, a string (a path for `page_url`, an internal
//! route for `page_render_container`) or none for the current page. Any
//! other `page` given to `page_render_container` renders nothing.

use std::sync::Arc;

use minijinja::{Environment, Error, ErrorKind, Value};

use crate::helper::{HelperError, PageLinkingHelper, PageRef};
use crate::options::BreadcrumbOptions;
use crate::url::UrlTarget;
use crate::value::{BlockValue, PageValue};

pub const URL_FUNCTION: &str = "page_url";
pub const BREADCRUMB_FUNCTION: &str = "page_breadcrumb";
pub const RENDER_CONTAINER_FUNCTION: &str = "page_render_container";
pub const RENDER_BLOCK_FUNCTION: &str = "page_render_block";

// Aliases under the names Sonata page templates use.
pub const SONATA_URL_FUNCTION: &str = "sonata_page_url";
pub const SONATA_BREADCRUMB_FUNCTION: &str = "sonata_page_breadcrumb";
pub const SONATA_RENDER_CONTAINER_FUNCTION: &str = "sonata_page_render_container";
pub const SONATA_RENDER_BLOCK_FUNCTION: &str = "sonata_page_render_block";

/// Something that adds functions to a template environment.
pub trait TemplateFunctionProvider: Send + Sync + 'static {
    /// Provider name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Add this provider's functions to `env`.
    fn register(self: Arc<Self>, env: &mut Environment<'static>);
}

impl TemplateFunctionProvider for PageLinkingHelper {
    fn name(&self) -> &'static str {
        "page"
    }

    fn register(self: Arc<Self>, env: &mut Environment<'static>) {
        tracing::debug!(provider = self.name(), "Registering template functions");

        let helper = Arc::clone(&self);
        let url = move |page: Option<Value>, absolute: Option<bool>| -> Result<String, Error> {
            let target = match &page {
                Some(value) => url_target(value)?,
                None => None,
            };
            helper
                .url(target, absolute.unwrap_or(false))
                .map_err(into_template_error)
        };
        env.add_function(URL_FUNCTION, url.clone());
        env.add_function(SONATA_URL_FUNCTION, url);

        let helper = Arc::clone(&self);
        let breadcrumb =
            move |page: Option<Value>, options: Option<Value>| -> Result<Value, Error> {
                let page = match &page {
                    Some(value) => page_arg(value, BREADCRUMB_FUNCTION)?,
                    None => None,
                };
                let options = breadcrumb_options(options)?;
                helper
                    .breadcrumb(page, &options)
                    .map(Value::from_safe_string)
                    .map_err(into_template_error)
            };
        env.add_function(BREADCRUMB_FUNCTION, breadcrumb.clone());
        env.add_function(SONATA_BREADCRUMB_FUNCTION, breadcrumb);

        let helper = Arc::clone(&self);
        let render_container = move |name: String,
                                     page: Option<Value>,
                                     use_cache: Option<bool>|
              -> Result<Value, Error> {
            let page = match &page {
                Some(value) => container_page(value),
                None => Some(PageRef::Current),
            };
            let Some(page) = page else {
                return Ok(Value::from_safe_string(String::new()));
            };
            helper
                .render_container(&name, page, use_cache.unwrap_or(true))
                .map(Value::from_safe_string)
                .map_err(into_template_error)
        };
        env.add_function(RENDER_CONTAINER_FUNCTION, render_container.clone());
        env.add_function(SONATA_RENDER_CONTAINER_FUNCTION, render_container);

        let helper = self;
        let render_block = move |block: Value, use_cache: Option<bool>| -> Result<Value, Error> {
            let block = BlockValue::unwrap(&block)
                .ok_or_else(|| invalid_argument(RENDER_BLOCK_FUNCTION, "a block", &block))?;
            helper
                .render_block(&block, use_cache.unwrap_or(true))
                .map(Value::from_safe_string)
                .map_err(into_template_error)
        };
        env.add_function(RENDER_BLOCK_FUNCTION, render_block.clone());
        env.add_function(SONATA_RENDER_BLOCK_FUNCTION, render_block);
    }
}

fn is_absent(value: &Value) -> bool {
    value.is_none() || value.is_undefined()
}

fn invalid_argument(function: &str, expected: &str, value: &Value) -> Error {
    Error::new(
        ErrorKind::InvalidOperation,
        format!("{function} expects {expected}, got {}", value.kind()),
    )
}

fn into_template_error(err: HelperError) -> Error {
    Error::new(ErrorKind::InvalidOperation, err.to_string()).with_source(err)
}

fn url_target(value: &Value) -> Result<Option<UrlTarget<'_>>, Error> {
    if is_absent(value) {
        return Ok(None);
    }
    if let Some(page) = value.downcast_object_ref::<PageValue>() {
        return Ok(Some(UrlTarget::Page(page.page())));
    }
    match value.as_str() {
        Some(path) => Ok(Some(UrlTarget::Path(path))),
        None => Err(invalid_argument(URL_FUNCTION, "a page or a path", value)),
    }
}

fn page_arg(value: &Value, function: &str) -> Result<Option<Arc<cms_core::Page>>, Error> {
    if is_absent(value) {
        return Ok(None);
    }
    PageValue::unwrap(value)
        .map(Some)
        .ok_or_else(|| invalid_argument(function, "a page", value))
}

/// Page reference for a container lookup.
///
/// Values that are neither a page nor an internal route resolve to no page,
/// which renders as an empty container.
fn container_page(value: &Value) -> Option<PageRef> {
    if is_absent(value) {
        return Some(PageRef::Current);
    }
    if let Some(page) = PageValue::unwrap(value) {
        return Some(PageRef::Page(page));
    }
    if let Some(path) = value.as_str() {
        return Some(PageRef::InternalRoute(path.to_owned()));
    }
    tracing::debug!(kind = %value.kind(), "Container page argument is not a page");
    None
}

fn breadcrumb_options(options: Option<Value>) -> Result<BreadcrumbOptions, Error> {
    let Some(options) = options.filter(|value| !is_absent(value)) else {
        return Ok(BreadcrumbOptions::default());
    };
    let json = serde_json::to_value(&options).map_err(|e| {
        Error::new(ErrorKind::InvalidOperation, "breadcrumb options are not serializable")
            .with_source(e)
    })?;
    BreadcrumbOptions::from_json(json).map_err(|e| into_template_error(e.into()))
}
