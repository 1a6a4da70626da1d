//! The transform entry points.

use crate::document::{XPathEvaluator, XmlDocument};
use crate::error::TransformError;
use log::{debug, warn};
use serde_json::{Map, Value};
use xmlshape_template::{Template, TemplateEngine};

/// Shapes `xml` into JSON following the template in `template`.
///
/// The template is validated first: a malformed template is an error even
/// when the document is malformed too. A document that fails to parse
/// yields `{}`.
pub fn transform(xml: &str, template: &str) -> Result<Value, TransformError> {
    let template = Template::parse(template)?;
    Ok(apply(xml, &template))
}

/// Like [`transform`], for a template that is already a JSON value.
pub fn transform_value(xml: &str, template: &Value) -> Result<Value, TransformError> {
    let template = Template::from_value(template)?;
    Ok(apply(xml, &template))
}

/// Applies a parsed template, so one template can serve many documents.
pub fn apply(xml: &str, template: &Template) -> Value {
    let document = match XmlDocument::parse(xml) {
        Ok(document) => document,
        Err(e) => {
            warn!("Failed to parse XML document, returning an empty object: {}", e);
            return Value::Object(Map::new());
        }
    };
    debug!("Applying {} template", template.kind());
    let evaluator = XPathEvaluator::new(&document);
    TemplateEngine::new(&evaluator).apply(template, evaluator.root())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unparsable_document_yields_empty_object() {
        assert_eq!(transform("<not-closed", r#"{"a": "//a"}"#).unwrap(), json!({}));
        assert_eq!(transform("", r#"["//a", "."]"#).unwrap(), json!({}));
    }

    #[test]
    fn test_template_errors_win_over_document_errors() {
        assert!(matches!(
            transform("<not-closed", r#"{"a": 1}"#),
            Err(TransformError::Template(_))
        ));
    }

    #[test]
    fn test_parsed_template_is_reusable() {
        let template = Template::parse(r#"{"n": "count(//i)"}"#).unwrap();
        assert_eq!(apply("<r><i/></r>", &template), json!({"n": 1}));
        assert_eq!(apply("<r><i/><i/></r>", &template), json!({"n": 2}));
    }
}
