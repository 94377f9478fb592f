//! Read-only page, block and site model.
//!
//! These are views into state owned by the page-management subsystem.
//! Template helpers never create, mutate or destroy them; they only read
//! them for the duration of a single render call.
//!
//! # Ancestors
//!
//! [`Page::parents`] is ordered root first, immediate parent last, exactly as
//! the page-management subsystem provides it.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Route name reserved for the site's home page.
pub const HOMEPAGE_ROUTE: &str = "homepage";

/// Block type used for page containers.
pub const CONTAINER_BLOCK_TYPE: &str = "cms.container";

/// Page identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PageId(pub u64);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Block identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which variant of a page a value represents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageVariant {
    /// Live, editable page.
    #[default]
    Live,
    /// Published, versioned read-only copy.
    Snapshot,
}

/// Content manager backend that owns a block's page.
///
/// Passed to the block renderer so it can pick the right backend and cache
/// partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagerKind {
    /// Live pages.
    Page,
    /// Published snapshots.
    Snapshot,
}

impl ManagerKind {
    /// Tag understood by block renderers.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for ManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in the site's navigation tree.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page {
    /// Page identifier.
    pub id: PageId,
    /// Display name used in navigation.
    pub name: String,
    /// Route name (e.g. `"homepage"`, `"page_slug"`).
    pub route_name: String,
    /// Canonical URL derived from the page tree.
    pub url: Option<String>,
    /// URL set explicitly by an editor; wins over `url`.
    pub custom_url: Option<String>,
    /// Content is generated per request and cannot be linked statically.
    pub dynamic: bool,
    /// Ancestors, root first.
    pub parents: Vec<Arc<Page>>,
    /// Live page or snapshot.
    pub variant: PageVariant,
}

impl Page {
    /// Create a live, static page with no URL and no ancestors.
    #[must_use]
    pub fn new(id: u64, route_name: impl Into<String>) -> Self {
        let route_name = route_name.into();
        Self {
            id: PageId(id),
            name: route_name.clone(),
            route_name,
            url: None,
            custom_url: None,
            dynamic: false,
            parents: Vec::new(),
            variant: PageVariant::Live,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_custom_url(mut self, url: impl Into<String>) -> Self {
        self.custom_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_parents(mut self, parents: Vec<Arc<Page>>) -> Self {
        self.parents = parents;
        self
    }

    #[must_use]
    pub fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }

    #[must_use]
    pub fn snapshot(mut self) -> Self {
        self.variant = PageVariant::Snapshot;
        self
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn is_snapshot(&self) -> bool {
        self.variant == PageVariant::Snapshot
    }

    pub fn is_homepage(&self) -> bool {
        self.route_name == HOMEPAGE_ROUTE
    }

    /// URL to link to: the custom URL if set, otherwise the canonical URL.
    ///
    /// Empty custom URLs count as unset.
    pub fn effective_url(&self) -> &str {
        self.custom_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .or(self.url.as_deref())
            .unwrap_or_default()
    }
}

/// A unit of renderable content attached to a page.
///
/// Containers are blocks of type [`CONTAINER_BLOCK_TYPE`] whose children are
/// the blocks placed into them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Block {
    pub id: BlockId,
    /// Block name; the container name for containers.
    pub name: String,
    #[serde(rename = "type")]
    pub block_type: String,
    pub settings: serde_json::Map<String, serde_json::Value>,
    /// Owning page (live or snapshot).
    pub page: Arc<Page>,
    pub children: Vec<Arc<Block>>,
}

impl Block {
    #[must_use]
    pub fn new(id: u64, block_type: impl Into<String>, page: Arc<Page>) -> Self {
        Self {
            id: BlockId(id),
            name: String::new(),
            block_type: block_type.into(),
            settings: serde_json::Map::new(),
            page,
            children: Vec::new(),
        }
    }

    /// Create a named container block on `page`.
    #[must_use]
    pub fn container(id: u64, name: impl Into<String>, page: Arc<Page>) -> Self {
        Self::new(id, CONTAINER_BLOCK_TYPE, page).with_name(name)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Arc<Block>) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_container(&self) -> bool {
        self.block_type == CONTAINER_BLOCK_TYPE
    }

    /// Backend owning this block's page.
    pub fn manager_kind(&self) -> ManagerKind {
        if self.page.is_snapshot() {
            ManagerKind::Snapshot
        } else {
            ManagerKind::Page
        }
    }
}

/// A site served by the CMS.
///
/// Opaque to template helpers: it is only handed back to the CMS manager.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Site {
    pub id: u64,
    pub name: String,
    pub host: String,
    /// Path prefix the site is mounted under (e.g. `"/fr"`).
    pub relative_path: Option<String>,
    pub is_default: bool,
}

impl Site {
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            host: host.into(),
            relative_path: None,
            is_default: false,
        }
    }
}

/// Render-time routing information handed to the block renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BlockContext {
    pub manager: ManagerKind,
    pub page_id: PageId,
}

impl BlockContext {
    /// Context for rendering `block` through its owning page's backend.
    #[must_use]
    pub fn for_block(block: &Block) -> Self {
        Self {
            manager: block.manager_kind(),
            page_id: block.page.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_effective_url_prefers_custom_url() {
        let page = Page::new(1, "about")
            .with_url("/about")
            .with_custom_url("/company");

        assert_eq!(page.effective_url(), "/company");
    }

    #[test]
    fn test_effective_url_ignores_empty_custom_url() {
        let page = Page::new(1, "about").with_url("/about").with_custom_url("");

        assert_eq!(page.effective_url(), "/about");
    }

    #[test]
    fn test_effective_url_without_any_url_is_empty() {
        assert_eq!(Page::new(1, "orphan").effective_url(), "");
    }

    #[test]
    fn test_block_manager_kind_follows_page_variant() {
        let live = Arc::new(Page::new(1, "live"));
        let snapshot = Arc::new(Page::new(2, "published").snapshot());

        assert_eq!(Block::new(10, "text", live).manager_kind(), ManagerKind::Page);
        assert_eq!(
            Block::new(11, "text", snapshot).manager_kind(),
            ManagerKind::Snapshot
        );
    }

    #[test]
    fn test_block_context_serializes_manager_tag() {
        let page = Arc::new(Page::new(42, "published").snapshot());
        let block = Block::container(7, "content", page);

        let json = serde_json::to_value(BlockContext::for_block(&block)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"manager": "snapshot", "page_id": 42})
        );
    }

    #[test]
    fn test_page_serializes_parents_root_first() {
        let root = Arc::new(Page::new(1, HOMEPAGE_ROUTE).with_url("/"));
        let section = Arc::new(
            Page::new(2, "docs")
                .with_url("/docs")
                .with_parents(vec![Arc::clone(&root)]),
        );
        let page = Page::new(3, "install").with_parents(vec![root, section]);

        let json = serde_json::to_value(&page).unwrap();
        let routes: Vec<&str> = json["parents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["route_name"].as_str().unwrap())
            .collect();

        assert_eq!(routes, vec!["homepage", "docs"]);
        assert_eq!(json["variant"], "live");
    }

    #[test]
    fn test_container_block_is_container() {
        let page = Arc::new(Page::new(1, "home"));
        let block = Block::container(1, "header", Arc::clone(&page));

        assert!(block.is_container());
        assert_eq!(block.name, "header");
        assert!(!Block::new(2, "text", page).is_container());
    }
}
