//! A template-free dump of every element and its attributes.

use crate::document::{XmlDocument, attribute_prefix, qualified_name};
use log::{trace, warn};
use roxmltree::Node;
use serde_json::{Map, Value};

/// Key under which an element's attributes are stored.
pub const ATTRIBUTES_KEY: &str = "$";

/// Lists every element of `xml` by qualified name, in document order.
///
/// The result is one flat object: each element name maps to a one-entry
/// array holding the attributes of its last occurrence under `"$"` (or `{}`
/// when it has none). A name keeps the position of its first occurrence.
/// Unparsable input yields `{}`. A per-element outline is logged at trace level.
pub fn to_json(xml: &str) -> Value {
    let document = match XmlDocument::parse(xml) {
        Ok(document) => document,
        Err(e) => {
            warn!("Failed to parse XML document, returning an empty object: {}", e);
            return Value::Object(Map::new());
        }
    };
    let mut out = Map::new();
    if let Some(root) = document.root_node().inner() {
        for element in root.children().filter(|n| n.is_element()) {
            visit(element, 0, &mut out);
        }
    }
    Value::Object(out)
}

fn visit(node: Node<'_, '_>, depth: usize, out: &mut Map<String, Value>) {
    let indent = "  ".repeat(depth);

    let mut attributes = Map::new();
    for attr in node.attributes() {
        let name = match attribute_prefix(node, &attr) {
            Some(prefix) => format!("{}:{}", prefix, attr.name()),
            None => attr.name().to_string(),
        };
        trace!("{}{}={}", indent, name, attr.value());
        attributes.insert(name, Value::String(attr.value().to_string()));
    }

    for child in node.children() {
        if child.is_element() {
            trace!("{}{}=", indent, qualified_name(child));
        } else {
            trace!("{}={}", indent, child.text().unwrap_or_default());
        }
    }

    let mut entry = Map::new();
    if !attributes.is_empty() {
        entry.insert(ATTRIBUTES_KEY.to_string(), Value::Object(attributes));
    }
    out.insert(qualified_name(node), Value::Array(vec![Value::Object(entry)]));

    for child in node.children().filter(|n| n.is_element()) {
        visit(child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_last_occurrence_wins() {
        let xml = r#"<list><item id="1"/><group><item id="2" kind="x"/></group></list>"#;
        let dump = to_json(xml);
        assert_eq!(
            dump,
            json!({
                "list": [{}],
                "item": [{"$": {"id": "2", "kind": "x"}}],
                "group": [{}]
            })
        );
        let keys: Vec<&String> = dump.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["list", "item", "group"]);
        assert_eq!(to_json(r#"<a><b x="1"/><b x="2"/></a>"#)["b"], json!([{"$": {"x": "2"}}]));
        assert_eq!(to_json(r#"<a><b x="1"/><b/></a>"#)["b"], json!([{}]));
    }

    #[test]
    fn test_prefixed_names() {
        let xml = r#"<s:root xmlns:s="urn:s"><s:a s:flag="on" plain="p"/></s:root>"#;
        assert_eq!(
            to_json(xml),
            json!({
                "s:root": [{}],
                "s:a": [{"$": {"s:flag": "on", "plain": "p"}}]
            })
        );
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(to_json("<a><b></a>"), json!({}));
        assert_eq!(to_json("not xml"), json!({}));
    }
}
