//! Shapes XML documents into JSON with declarative path templates.
//!
//! ```
//! let xml = r#"<items><item id="a"/><item id="b"/></items>"#;
//! let output = xmlshape::transform(xml, r#"{"ids": ["//item", "@id"], "n": "count(//item)"}"#).unwrap();
//! assert_eq!(output, serde_json::json!({"ids": ["a", "b"], "n": 2}));
//! ```

pub mod document;
pub mod dump;
pub mod error;
pub mod pretty;
pub mod transform;

pub use document::{XPathEvaluator, XmlDocument, XmlNode};
pub use dump::to_json;
pub use error::{PrettyPrintError, TransformError};
pub use pretty::{PrettyPrintOptions, pretty_print};
pub use transform::{apply, transform, transform_value};

// Re-export the template layer for callers that parse once and apply many times
pub use xmlshape_template::{Template, TemplateError};
