//! Template loading and memoization.
//!
//! [`TemplateCache`] loads each template once through a [`TemplateEngine`]
//! and keeps it for the lifetime of the helper. There is no eviction and no
//! expiry: entries are written once per name and never invalidated.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use minijinja::Value;

/// Template loading or rendering error.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// No template with that name.
    #[error("Template not found: {0}")]
    NotFound(String),
    /// The environment owning the template was dropped.
    #[error("Template environment is no longer available")]
    EnvironmentDropped,
    /// Engine error (syntax or render failure).
    #[error("Template error: {0}")]
    Engine(#[from] minijinja::Error),
}

/// A loaded template ready to render.
pub trait CompiledTemplate: Send + Sync {
    fn render(&self, params: Value) -> Result<String, TemplateError>;
}

/// Loads templates by name.
pub trait TemplateEngine: Send + Sync {
    fn load_template(&self, name: &str) -> Result<Arc<dyn CompiledTemplate>, TemplateError>;
}

/// Name-keyed memo of loaded templates.
pub struct TemplateCache {
    engine: Arc<dyn TemplateEngine>,
    loaded: RwLock<HashMap<String, Arc<dyn CompiledTemplate>>>,
}

impl TemplateCache {
    #[must_use]
    pub fn new(engine: Arc<dyn TemplateEngine>) -> Self {
        Self {
            engine,
            loaded: RwLock::new(HashMap::new()),
        }
    }

    /// Template `name`, loading it on first use.
    ///
    /// Failed loads are not remembered.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn get(&self, name: &str) -> Result<Arc<dyn CompiledTemplate>, TemplateError> {
        if let Some(template) = self.loaded.read().unwrap().get(name) {
            return Ok(Arc::clone(template));
        }

        tracing::trace!(template = name, "Loading template");
        let template = self.engine.load_template(name)?;

        let mut loaded = self.loaded.write().unwrap();
        let entry = loaded
            .entry(name.to_owned())
            .or_insert_with(|| Arc::clone(&template));
        Ok(Arc::clone(entry))
    }

    /// Render template `name` with `params`.
    pub fn render(&self, name: &str, params: Value) -> Result<String, TemplateError> {
        self.get(name)?.render(params)
    }

    /// Number of templates loaded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn len(&self) -> usize {
        self.loaded.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
