//! Template environment with page functions registered.
//!
//! [`PageEnvironment`] owns a minijinja environment with the page
//! functions installed. Templates are looked up in the configured template
//! directory first, then among the built-in templates, so a project can
//! override the default breadcrumb markup by shipping its own
//! `page/breadcrumb.html`.
//!
//! The helper renders its own templates (breadcrumbs) through the same
//! environment, so functions are available inside them too. It holds only a
//! weak reference to the environment.

use std::path::PathBuf;
use std::sync::{Arc, Weak};

use cms_config::{DEFAULT_BREADCRUMB_TEMPLATE, TemplatingConfig};
use minijinja::{AutoEscape, Environment, ErrorKind, Value};

use crate::functions::TemplateFunctionProvider;
use crate::helper::{Collaborators, HelperOptions, PageLinkingHelper};
use crate::template::{CompiledTemplate, TemplateEngine, TemplateError};

/// Built-in breadcrumb markup.
const BREADCRUMB_TEMPLATE: &str = include_str!("../templates/breadcrumb.html");

fn builtin_template(name: &str) -> Option<&'static str> {
    match name {
        DEFAULT_BREADCRUMB_TEMPLATE => Some(BREADCRUMB_TEMPLATE),
        _ => None,
    }
}

type Loader = dyn Fn(&str) -> Result<Option<String>, minijinja::Error> + Send + Sync;

/// Escape mode by template name.
///
/// The breadcrumb template's output is handed back to callers as safe HTML,
/// so it is always HTML-escaped whatever its extension. Other templates keep
/// minijinja's extension-based default.
fn auto_escape_for(
    breadcrumb_template: String,
) -> impl Fn(&str) -> AutoEscape + Send + Sync + 'static {
    move |name| {
        if name == breadcrumb_template {
            AutoEscape::Html
        } else {
            minijinja::default_auto_escape_callback(name)
        }
    }
}

/// Loader reading `template_dir` first, falling back to built-in templates.
fn template_loader(
    template_dir: Option<PathBuf>,
) -> impl Fn(&str) -> Result<Option<String>, minijinja::Error> + Send + Sync + 'static {
    let from_dir: Option<Box<Loader>> =
        template_dir.map(|dir| Box::new(minijinja::path_loader(dir)) as Box<Loader>);

    move |name| {
        if let Some(load) = &from_dir
            && let Some(source) = load(name)?
        {
            return Ok(Some(source));
        }
        Ok(builtin_template(name).map(str::to_owned))
    }
}

/// [`TemplateEngine`] backed by a minijinja environment.
pub struct JinjaEngine {
    env: Weak<Environment<'static>>,
}

impl JinjaEngine {
    #[must_use]
    pub fn new(env: Weak<Environment<'static>>) -> Self {
        Self { env }
    }
}

impl TemplateEngine for JinjaEngine {
    fn load_template(&self, name: &str) -> Result<Arc<dyn CompiledTemplate>, TemplateError> {
        let env = self.env.upgrade().ok_or(TemplateError::EnvironmentDropped)?;
        match env.get_template(name) {
            Ok(_) => Ok(Arc::new(JinjaTemplate {
                env: Weak::clone(&self.env),
                name: name.to_owned(),
            })),
            Err(e) if e.kind() == ErrorKind::TemplateNotFound => {
                Err(TemplateError::NotFound(name.to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// A template known to exist in a minijinja environment.
struct JinjaTemplate {
    env: Weak<Environment<'static>>,
    name: String,
}

impl CompiledTemplate for JinjaTemplate {
    fn render(&self, params: Value) -> Result<String, TemplateError> {
        let env = self.env.upgrade().ok_or(TemplateError::EnvironmentDropped)?;
        Ok(env.get_template(&self.name)?.render(params)?)
    }
}

/// Template environment with the page functions registered.
pub struct PageEnvironment {
    env: Arc<Environment<'static>>,
}

impl PageEnvironment {
    /// Build an environment rendering pages for `collaborators`.
    #[must_use]
    pub fn build(config: &TemplatingConfig, collaborators: Collaborators) -> Self {
        let options = HelperOptions::from(config);
        let template_dir = config.template_dir.clone();
        let breadcrumb_template = config.breadcrumb_template.clone();

        let env = Arc::new_cyclic(|weak: &Weak<Environment<'static>>| {
            let mut env = Environment::new();
            env.set_loader(template_loader(template_dir));
            env.set_auto_escape_callback(auto_escape_for(breadcrumb_template));

            let engine = Arc::new(JinjaEngine::new(Weak::clone(weak)));
            let helper = Arc::new(PageLinkingHelper::new(collaborators, engine, options));
            helper.register(&mut env);
            env
        });

        Self { env }
    }

    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Render the named template.
    pub fn render(&self, name: &str, context: Value) -> Result<String, TemplateError> {
        Ok(self.env.get_template(name)?.render(context)?)
    }

    /// Render a template given as source text.
    pub fn render_str(&self, source: &str, context: Value) -> Result<String, TemplateError> {
        Ok(self.env.render_str(source, context)?)
    }
}
