//! The template model.
//!
//! A template is JSON whose string leaves are path expressions. Parsing
//! turns it into a closed tree of [`Template`] nodes up front so that every
//! malformed construct is reported before any document is touched.

use crate::error::TemplateError;
use serde_json::Value;

/// Marks a leaf whose remainder is copied to the output verbatim.
pub const LITERAL_PREFIX: char = '#';

#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    /// Keys in template order.
    Object(Vec<(String, Template)>),
    /// `None` is the literal `[]`.
    Array(Option<Box<ArrayTemplate>>),
    Leaf(Leaf),
}

/// The `[basePath, itemTemplate]` form.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayTemplate {
    pub base_path: String,
    pub item: Template,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    Empty,
    Literal(String),
    Path(String),
}

impl Leaf {
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            Leaf::Empty
        } else if let Some(literal) = text.strip_prefix(LITERAL_PREFIX) {
            Leaf::Literal(literal.to_string())
        } else {
            Leaf::Path(text.to_string())
        }
    }
}

impl Template {
    /// Parses template text. The root must be an object or an array.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, TemplateError> {
        match value {
            Value::Object(_) | Value::Array(_) => build(value, &mut String::new()),
            other => Err(TemplateError::InvalidRoot(kind_of(other))),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Template::Object(_) => "object",
            Template::Array(None) => "empty array",
            Template::Array(Some(_)) => "array",
            Template::Leaf(_) => "leaf",
        }
    }
}

/// `path` is a JSON-pointer style location used only in error messages.
fn build(value: &Value, path: &mut String) -> Result<Template, TemplateError> {
    match value {
        Value::String(text) => Ok(Template::Leaf(Leaf::parse(text))),
        Value::Object(map) => {
            let mut fields = Vec::with_capacity(map.len());
            for (key, child) in map {
                let mark = path.len();
                path.push('/');
                path.push_str(key);
                fields.push((key.clone(), build(child, path)?));
                path.truncate(mark);
            }
            Ok(Template::Object(fields))
        }
        Value::Array(items) => match items.as_slice() {
            [] => Ok(Template::Array(None)),
            [Value::String(base_path), item] => {
                let mark = path.len();
                path.push_str("/1");
                let item = build(item, path)?;
                path.truncate(mark);
                Ok(Template::Array(Some(Box::new(ArrayTemplate {
                    base_path: base_path.clone(),
                    item,
                }))))
            }
            [first, _] => Err(TemplateError::InvalidArray {
                path: location(path),
                message: format!("base path must be a string, got {}", kind_of(first)),
            }),
            _ => Err(TemplateError::InvalidArray {
                path: location(path),
                message: format!("expected [] or [basePath, itemTemplate], got {} elements", items.len()),
            }),
        },
        other => Err(TemplateError::UnsupportedValue {
            path: location(path),
            kind: kind_of(other),
        }),
    }
}

fn location(path: &str) -> String {
    if path.is_empty() { "/".to_string() } else { path.to_string() }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(p: &str) -> Template {
        Template::Leaf(Leaf::Path(p.to_string()))
    }

    #[test]
    fn test_leaf_kinds() {
        assert_eq!(Leaf::parse(""), Leaf::Empty);
        assert_eq!(Leaf::parse("#fixed"), Leaf::Literal("fixed".into()));
        assert_eq!(Leaf::parse("#"), Leaf::Literal(String::new()));
        assert_eq!(Leaf::parse("a#b"), Leaf::Path("a#b".into()));
        assert_eq!(Leaf::parse(" #x"), Leaf::Path(" #x".into()));
    }

    #[test]
    fn test_object_keys_keep_template_order() {
        let template = Template::parse(r##"{"z": "//z", "a": "", "m": {"k": "#v"}}"##).unwrap();
        assert_eq!(
            template,
            Template::Object(vec![
                ("z".into(), path("//z")),
                ("a".into(), Template::Leaf(Leaf::Empty)),
                (
                    "m".into(),
                    Template::Object(vec![("k".into(), Template::Leaf(Leaf::Literal("v".into())))])
                ),
            ])
        );
    }

    #[test]
    fn test_array_forms() {
        assert_eq!(Template::parse("[]").unwrap(), Template::Array(None));
        let template = Template::parse(r#"["//item", {"id": "@id"}]"#).unwrap();
        let Template::Array(Some(array)) = template else {
            panic!("Expected array template");
        };
        assert_eq!(array.base_path, "//item");
        assert_eq!(array.item, Template::Object(vec![("id".into(), path("@id"))]));

        // Nested array item templates parse; the engine skips them.
        let nested = Template::from_value(&json!(["//a", ["//b", "."]])).unwrap();
        assert_eq!(nested.kind(), "array");
    }

    #[test]
    fn test_rejects_non_string_leaves() {
        let err = Template::from_value(&json!({"a": {"b": 1}})).unwrap_err();
        match err {
            TemplateError::UnsupportedValue { path, kind } => {
                assert_eq!(path, "/a/b");
                assert_eq!(kind, "number");
            }
            other => panic!("Unexpected error: {other}"),
        }
        assert!(Template::from_value(&json!({"a": null})).is_err());
        assert!(Template::from_value(&json!({"a": ["//x", true]})).is_err());
    }

    #[test]
    fn test_rejects_malformed_arrays() {
        for bad in [json!({"a": ["//x"]}), json!({"a": ["//x", "", ""]}), json!({"a": [1, "."]})] {
            assert!(
                matches!(Template::from_value(&bad), Err(TemplateError::InvalidArray { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_root_must_be_object_or_array() {
        assert!(matches!(
            Template::parse(r#""//a""#),
            Err(TemplateError::InvalidRoot("string"))
        ));
        assert!(matches!(Template::parse("{"), Err(TemplateError::JsonParse(_))));
    }
}
