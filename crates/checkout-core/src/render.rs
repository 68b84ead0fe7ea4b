//! Template Rendering
//!
//! Clients hand final markup generation to a [`Renderer`], addressed by a
//! template path taken from configuration.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CheckoutError, Result};
use crate::view::CheckoutView;

/// Turns a view into markup using a named template
pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, view: &CheckoutView) -> Result<String>;
}

/// A compiled-in template
pub type TemplateFn = Arc<dyn Fn(&CheckoutView) -> String + Send + Sync>;

/// Renderer backed by templates registered as functions
#[derive(Clone, Default)]
pub struct TemplateRenderer {
    templates: HashMap<String, TemplateFn>,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, path: impl Into<String>, template: F)
    where
        F: Fn(&CheckoutView) -> String + Send + Sync + 'static,
    {
        self.templates.insert(path.into(), Arc::new(template));
    }

    pub fn with_template<F>(mut self, path: impl Into<String>, template: F) -> Self
    where
        F: Fn(&CheckoutView) -> String + Send + Sync + 'static,
    {
        self.register(path, template);
        self
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, template: &str, view: &CheckoutView) -> Result<String> {
        let tpl = self
            .templates
            .get(template)
            .ok_or_else(|| CheckoutError::Render(format!("Template not found: {template}")))?;
        Ok(tpl(view))
    }
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}
