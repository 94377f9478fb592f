//! Pages and blocks as template values.
//!
//! Pages and blocks enter templates as objects rather than serialized maps,
//! so that passing one back to a template function hands the helper the
//! original value instead of a copy of its fields.

use std::sync::Arc;

use cms_core::{Block, Page};
use minijinja::Value;
use minijinja::value::{Enumerator, Object};

/// Template-side view of a [`Page`].
#[derive(Debug)]
pub struct PageValue(Arc<Page>);

impl PageValue {
    /// Wrap `page` as a template value.
    #[must_use]
    pub fn wrap(page: &Arc<Page>) -> Value {
        Value::from_object(Self(Arc::clone(page)))
    }

    pub fn page(&self) -> &Arc<Page> {
        &self.0
    }

    /// The page behind `value`, if it is a page object.
    pub fn unwrap(value: &Value) -> Option<Arc<Page>> {
        value
            .downcast_object_ref::<Self>()
            .map(|page| Arc::clone(&page.0))
    }
}

fn optional_str(value: Option<&str>) -> Value {
    value.map_or_else(|| Value::from(()), Value::from)
}

impl Object for PageValue {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let page = &self.0;
        let value = match key.as_str()? {
            "id" => Value::from(page.id.0),
            "name" => Value::from(page.name.as_str()),
            "route_name" => Value::from(page.route_name.as_str()),
            "url" => optional_str(page.url.as_deref()),
            "custom_url" => optional_str(page.custom_url.as_deref()),
            "dynamic" => Value::from(page.dynamic),
            "snapshot" => Value::from(page.is_snapshot()),
            "parents" => Value::from(
                page.parents
                    .iter()
                    .map(PageValue::wrap)
                    .collect::<Vec<_>>(),
            ),
            _ => return None,
        };
        Some(value)
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(&[
            "id",
            "name",
            "route_name",
            "url",
            "custom_url",
            "dynamic",
            "snapshot",
            "parents",
        ])
    }
}

/// Template-side view of a [`Block`].
#[derive(Debug)]
pub struct BlockValue(Arc<Block>);

impl BlockValue {
    /// Wrap `block` as a template value.
    #[must_use]
    pub fn wrap(block: &Arc<Block>) -> Value {
        Value::from_object(Self(Arc::clone(block)))
    }

    pub fn block(&self) -> &Arc<Block> {
        &self.0
    }

    /// The block behind `value`, if it is a block object.
    pub fn unwrap(value: &Value) -> Option<Arc<Block>> {
        value
            .downcast_object_ref::<Self>()
            .map(|block| Arc::clone(&block.0))
    }
}

impl Object for BlockValue {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let block = &self.0;
        let value = match key.as_str()? {
            "id" => Value::from(block.id.0),
            "name" => Value::from(block.name.as_str()),
            "type" => Value::from(block.block_type.as_str()),
            "settings" => Value::from_serialize(&block.settings),
            "page" => PageValue::wrap(&block.page),
            "children" => Value::from(
                block
                    .children
                    .iter()
                    .map(BlockValue::wrap)
                    .collect::<Vec<_>>(),
            ),
            _ => return None,
        };
        Some(value)
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(&["id", "name", "type", "settings", "page", "children"])
    }
}

#[cfg(test)]
mod tests {
    use minijinja::{Environment, context};

    use super::*;

    #[test]
    fn test_page_round_trips_through_value() {
        let page = Arc::new(Page::new(7, "about"));

        let value = PageValue::wrap(&page);

        assert!(Arc::ptr_eq(&PageValue::unwrap(&value).unwrap(), &page));
        assert!(BlockValue::unwrap(&value).is_none());
        assert!(PageValue::unwrap(&Value::from("about")).is_none());
    }

    #[test]
    fn test_page_fields_visible_in_template() {
        let home = Arc::new(Page::new(1, "homepage").with_name("Home"));
        let page = Arc::new(
            Page::new(2, "about")
                .with_name("About us")
                .with_url("/about")
                .with_parents(vec![home]),
        );
        let env = Environment::new();

        let out = env
            .render_str(
                "{{ page.id }}|{{ page.name }}|{{ page.url }}|{{ page.custom_url is none }}|{{ page.parents[0].name }}|{{ page.snapshot }}",
                context! { page => PageValue::wrap(&page) },
            )
            .unwrap();

        assert_eq!(out, "2|About us|/about|True|Home|False");
    }

    #[test]
    fn test_block_fields_visible_in_template() {
        let page = Arc::new(Page::new(3, "contact").snapshot());
        let child = Arc::new(Block::new(5, "text", Arc::clone(&page)));
        let block = Arc::new(
            Block::container(4, "content", page)
                .with_setting("code", serde_json::json!("main"))
                .with_child(child),
        );
        let env = Environment::new();

        let out = env
            .render_str(
                "{{ block.type }}|{{ block.name }}|{{ block.settings.code }}|{{ block.page.snapshot }}|{{ block.children|length }}",
                context! { block => BlockValue::wrap(&block) },
            )
            .unwrap();

        assert_eq!(out, "cms.container|content|main|True|1");
    }
}
