//! Re-indents an XML document.

use crate::document::{XmlDocument, attribute_prefix, qualified_name};
use crate::error::PrettyPrintError;
use log::warn;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use roxmltree::Node;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrettyPrintOptions {
    /// Spaces per nesting level.
    pub indent_size: usize,
}

impl Default for PrettyPrintOptions {
    fn default() -> Self {
        PrettyPrintOptions { indent_size: 2 }
    }
}

/// Serializes `xml` again with one element per line.
///
/// Comments, processing instructions, the XML declaration and
/// whitespace-only text are dropped. Childless elements are self-closed and
/// text-only elements stay on one line. Unparsable input yields `""`.
pub fn pretty_print(xml: &str, options: &PrettyPrintOptions) -> Result<String, PrettyPrintError> {
    let document = match XmlDocument::parse(xml) {
        Ok(document) => document,
        Err(e) => {
            warn!("Failed to parse XML document, returning an empty string: {}", e);
            return Ok(String::new());
        }
    };
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', options.indent_size);
    if let Some(root) = document.root_node().inner() {
        for element in root.children().filter(|n| n.is_element()) {
            write_element(&mut writer, element)?;
        }
    }
    let mut out = String::from_utf8(writer.into_inner())?;
    out.push('\n');
    Ok(out)
}

fn write_element<W: Write>(writer: &mut Writer<W>, node: Node<'_, '_>) -> io::Result<()> {
    let name = qualified_name(node);
    let mut start = BytesStart::new(name.as_str());
    for (prefix, uri) in declared_namespaces(node) {
        let key = match prefix {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        start.push_attribute((key.as_str(), uri));
    }
    for attr in node.attributes() {
        let key = match attribute_prefix(node, &attr) {
            Some(prefix) => format!("{}:{}", prefix, attr.name()),
            None => attr.name().to_string(),
        };
        start.push_attribute((key.as_str(), attr.value()));
    }

    let content: Vec<Node> = node
        .children()
        .filter(|c| c.is_element() || (c.is_text() && !c.text().unwrap_or_default().trim().is_empty()))
        .collect();
    if content.is_empty() {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    for child in content {
        match child.text() {
            Some(text) if child.is_text() => writer.write_event(Event::Text(BytesText::new(text)))?,
            _ => write_element(writer, child)?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name.as_str())))
}

/// Namespaces bound on `node` but not on its parent element. The implicit
/// `xml` prefix is never written.
fn declared_namespaces<'a, 'input: 'a>(node: Node<'a, 'input>) -> Vec<(Option<&'a str>, &'a str)> {
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|parent| parent.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    node.namespaces()
        .map(|ns| (ns.name(), ns.uri()))
        .filter(|(prefix, _)| *prefix != Some("xml"))
        .filter(|binding| !inherited.contains(binding))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pretty(xml: &str) -> String {
        pretty_print(xml, &PrettyPrintOptions::default()).unwrap()
    }

    #[test]
    fn test_reindents_and_drops_noise() {
        let xml = r#"<?xml version="1.0"?>
<!-- header --><root a="1 &amp; 2">
        <child>text</child><?skip me?>
   <empty/><nested><x>1</x></nested></root>"#;
        assert_eq!(
            pretty(xml),
            "<root a=\"1 &amp; 2\">\n  <child>text</child>\n  <empty/>\n  <nested>\n    <x>1</x>\n  </nested>\n</root>\n"
        );
    }

    #[test]
    fn test_indent_size() {
        let options = PrettyPrintOptions { indent_size: 4 };
        assert_eq!(
            pretty_print("<a><b/></a>", &options).unwrap(),
            "<a>\n    <b/>\n</a>\n"
        );
    }

    #[test]
    fn test_namespace_declarations_are_written_once() {
        assert_eq!(
            pretty(r#"<s:a xmlns:s="urn:s"><s:b s:k="v"/></s:a>"#),
            "<s:a xmlns:s=\"urn:s\">\n  <s:b s:k=\"v\"/>\n</s:a>\n"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(pretty("<a>x &lt; y</a>"), "<a>x &lt; y</a>\n");
    }

    #[test]
    fn test_malformed_input_yields_empty_string() {
        assert_eq!(pretty("<a>"), "");
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: PrettyPrintOptions = serde_json::from_str(r#"{"indentSize": 3}"#).unwrap();
        assert_eq!(options.indent_size, 3);
        let options: PrettyPrintOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, PrettyPrintOptions::default());
    }
}
