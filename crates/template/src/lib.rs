//! Template-driven shaping of path-query results into JSON.
//!
//! A template is a JSON value mirroring the desired output. String leaves are
//! path expressions evaluated against a document through a [`PathEvaluator`];
//! `[basePath, itemTemplate]` maps the item template over every node the base
//! path selects. The engine is independent of any XML or XPath library.

pub mod builder;
pub mod classify;
pub mod error;
pub mod evaluator;
mod expander;
pub mod template;
mod walker;

#[cfg(test)]
mod testing;

pub use builder::{ObjectBuilder, Scalar};
pub use classify::{ReturnType, classify};
pub use error::TemplateError;
pub use evaluator::PathEvaluator;
pub use template::{ArrayTemplate, Leaf, Template};
pub use walker::TemplateEngine;
