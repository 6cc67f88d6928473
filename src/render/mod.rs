//! Rendering - Tera templates and the link helpers they use

pub mod links;
pub mod template;

pub use links::{anchor, format_link_text, wiki_link};
pub use template::{Layout, TemplateError, TemplateRenderer};
