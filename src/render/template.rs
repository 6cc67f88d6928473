//! Listing rendering with Tera

use clap::ValueEnum;
use miette::Diagnostic;
use rust_embed::Embed;
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::path::Path;
use tera::{Tera, Value};
use thiserror::Error;

use crate::core::category::CategoryListing;
use crate::core::entity::Entity;
use crate::core::normalize::TypeIndex;
use crate::render::links::{anchor, format_link_text, wiki_link};

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

/// Which listing to produce
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    /// Entities grouped into display categories (wiki markup)
    #[default]
    Directory,
    /// Entities grouped by raw type (HTML)
    Depot,
}

impl Layout {
    /// Embedded template used when no custom template is given
    pub fn template_name(self) -> &'static str {
        match self {
            Layout::Directory => "directory.wiki.tera",
            Layout::Depot => "depot.html.tera",
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    #[diagnostic(code(drd::template::not_found))]
    NotFound(String),

    #[error("Template rendering error: {0}")]
    #[diagnostic(code(drd::template::render))]
    RenderError(String),
}

impl From<tera::Error> for TemplateError {
    fn from(err: tera::Error) -> Self {
        // Tera keeps the useful part of the message in the source chain
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        TemplateError::RenderError(message)
    }
}

/// A labelled entity list as seen by templates
#[derive(Debug, Serialize)]
struct Group<'a> {
    name: &'a str,
    entities: &'a [Entity],
}

/// Template renderer using Tera
pub struct TemplateRenderer {
    tera: Tera,
    custom: Option<String>,
}

impl TemplateRenderer {
    /// Create a renderer with the embedded templates and link filters
    pub fn new(wiki_base_url: &str) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html.tera", ".html", ".htm"]);

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    tera.add_raw_template(filename, template_str)?;
                }
            }
        }

        register_filters(&mut tera, wiki_base_url);
        Ok(Self { tera, custom: None })
    }

    /// Render every layout with the template at `path` instead
    ///
    /// Autoescaping follows the file's extension, as for embedded templates.
    pub fn with_template_file(mut self, path: &Path) -> Result<Self, TemplateError> {
        if !path.is_file() {
            return Err(TemplateError::NotFound(path.display().to_string()));
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = format!("custom/{file_name}");
        self.tera.add_template_file(path, Some(name.as_str()))?;
        self.custom = Some(name);
        Ok(self)
    }

    /// Render the categorized directory listing
    pub fn render_directory(&self, listing: &CategoryListing) -> Result<String, TemplateError> {
        let categories: Vec<Group<'_>> = listing
            .groups()
            .iter()
            .map(|g| Group {
                name: &g.name,
                entities: &g.entities,
            })
            .collect();

        let mut context = tera::Context::new();
        context.insert("categories", &categories);
        context.insert("data", listing);
        self.render(Layout::Directory, &context)
    }

    /// Render the by-type depot listing
    pub fn render_depot(&self, index: &TypeIndex) -> Result<String, TemplateError> {
        let types: Vec<Group<'_>> = index
            .iter()
            .map(|(name, entities)| Group { name, entities })
            .collect();

        let mut context = tera::Context::new();
        context.insert("types", &types);
        context.insert("data", index);
        self.render(Layout::Depot, &context)
    }

    fn render(&self, layout: Layout, context: &tera::Context) -> Result<String, TemplateError> {
        let name = self.custom.as_deref().unwrap_or(layout.template_name());
        if !self.tera.get_template_names().any(|n| n == name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }
        Ok(self.tera.render(name, context)?)
    }
}

fn register_filters(tera: &mut Tera, wiki_base_url: &str) {
    tera.register_filter(
        "link_text",
        |value: &Value, _: &HashMap<String, Value>| -> tera::Result<Value> {
            Ok(Value::String(format_link_text(string_value("link_text", value)?)))
        },
    );
    tera.register_filter(
        "anchor",
        |value: &Value, _: &HashMap<String, Value>| -> tera::Result<Value> {
            Ok(Value::String(anchor(string_value("anchor", value)?)))
        },
    );

    let default_base = wiki_base_url.to_string();
    tera.register_filter(
        "wiki_link",
        move |value: &Value, args: &HashMap<String, Value>| -> tera::Result<Value> {
            let text = string_value("wiki_link", value)?;
            let base = match args.get("base") {
                Some(base) => string_value("wiki_link", base)?,
                None => default_base.as_str(),
            };
            Ok(Value::String(wiki_link(text, base)))
        },
    );
}

fn string_value<'a>(filter: &str, value: &'a Value) -> tera::Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("Filter `{filter}` expects a string, got {value}")))
}
