//! URL building from a routing context.

use cms_core::{Page, RequestContext};

/// What to build a URL for.
#[derive(Clone, Copy, Debug)]
pub enum UrlTarget<'a> {
    /// A page; its custom URL wins over its canonical URL.
    Page(&'a Page),
    /// A path used verbatim.
    Path(&'a str),
}

impl<'a> From<&'a Page> for UrlTarget<'a> {
    fn from(page: &'a Page) -> Self {
        Self::Page(page)
    }
}

impl<'a> From<&'a str> for UrlTarget<'a> {
    fn from(path: &'a str) -> Self {
        Self::Path(path)
    }
}

/// Prefix `path` with the base URL and, for absolute URLs, the origin.
///
/// Absolute URLs fall back to relative ones when the context has no host.
pub(crate) fn build_url(context: &RequestContext, path: &str, absolute: bool) -> String {
    let url = format!("{}{path}", context.base_url);

    if absolute && let Some(origin) = context.origin() {
        return format!("{origin}{url}");
    }

    url
}
