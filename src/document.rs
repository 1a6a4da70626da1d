// roxmltree adapter for the XPath evaluator
use log::debug;
use roxmltree::Node;
use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use xmlshape_template::PathEvaluator;
use xmlshape_xpath1::{DocumentNode, Expression, NodeType, QName, XPathError, parse_expression};

/// A parsed XML document. DTDs are accepted; entity expansion is bounded by roxmltree.
pub struct XmlDocument<'input> {
    doc: roxmltree::Document<'input>,
}

impl<'input> XmlDocument<'input> {
    pub fn parse(text: &'input str) -> Result<Self, roxmltree::Error> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };
        let doc = roxmltree::Document::parse_with_options(text, options)?;
        Ok(Self { doc })
    }

    pub fn root_node(&self) -> XmlNode<'_, 'input> {
        XmlNode::Element(self.doc.root())
    }
}

/// The name as written in the source: `prefix:local`, or just `local` for
/// unprefixed and default-namespace elements.
pub fn qualified_name(node: Node<'_, '_>) -> String {
    let tag = node.tag_name();
    match element_prefix(node) {
        Some(prefix) => format!("{}:{}", prefix, tag.name()),
        None => tag.name().to_string(),
    }
}

fn element_prefix<'a, 'input: 'a>(node: Node<'a, 'input>) -> Option<&'a str> {
    let uri = node.tag_name().namespace()?;
    node.lookup_prefix(uri).filter(|prefix| !prefix.is_empty())
}

/// Attributes without a namespace are never prefixed, even under a default namespace.
pub fn attribute_prefix<'a, 'input: 'a>(
    element: Node<'a, 'input>,
    attr: &roxmltree::Attribute<'a, 'input>,
) -> Option<&'a str> {
    let uri = attr.namespace()?;
    element.lookup_prefix(uri).filter(|prefix| !prefix.is_empty())
}

/// Either a tree node or an attribute. roxmltree stores attributes as data
/// on their element, so an attribute is addressed by element and index.
#[derive(Debug, Clone, Copy)]
pub enum XmlNode<'a, 'input> {
    /// Root, element, text, comment or processing instruction.
    Element(Node<'a, 'input>),
    Attribute {
        parent: Node<'a, 'input>,
        index: usize,
    },
}

impl<'a, 'input> XmlNode<'a, 'input> {
    pub fn inner(&self) -> Option<Node<'a, 'input>> {
        match self {
            XmlNode::Element(node) => Some(*node),
            XmlNode::Attribute { .. } => None,
        }
    }

    fn attribute(&self) -> Option<roxmltree::Attribute<'a, 'input>> {
        match self {
            XmlNode::Attribute { parent, index } => parent.attributes().nth(*index),
            XmlNode::Element(_) => None,
        }
    }

    /// Document-order key: the owning tree node, then 0 for the node itself
    /// or 1 + index for its attributes.
    fn order_key(&self) -> (u32, usize) {
        match self {
            XmlNode::Element(node) => (node.id().get(), 0),
            XmlNode::Attribute { parent, index } => (parent.id().get(), index + 1),
        }
    }
}

impl PartialEq for XmlNode<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        self.order_key() == other.order_key()
    }
}

impl Eq for XmlNode<'_, '_> {}

impl PartialOrd for XmlNode<'_, '_> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// roxmltree ids are assigned in document order.
impl Ord for XmlNode<'_, '_> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl Hash for XmlNode<'_, '_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.order_key().hash(state);
    }
}

impl<'a> DocumentNode<'a> for XmlNode<'a, 'a> {
    fn node_type(&self) -> NodeType {
        match self {
            XmlNode::Element(node) => match node.node_type() {
                roxmltree::NodeType::Root => NodeType::Root,
                roxmltree::NodeType::Element => NodeType::Element,
                roxmltree::NodeType::Text => NodeType::Text,
                roxmltree::NodeType::Comment => NodeType::Comment,
                roxmltree::NodeType::PI => NodeType::ProcessingInstruction,
            },
            XmlNode::Attribute { .. } => NodeType::Attribute,
        }
    }

    fn name(&self) -> Option<QName<'a>> {
        match self {
            XmlNode::Element(node) if node.is_element() => Some(QName {
                prefix: element_prefix(*node),
                local_part: node.tag_name().name(),
            }),
            XmlNode::Element(node) => node.pi().map(|pi| QName::local(pi.target)),
            XmlNode::Attribute { parent, .. } => self.attribute().map(|attr| QName {
                prefix: attribute_prefix(*parent, &attr),
                local_part: attr.name(),
            }),
        }
    }

    fn string_value(&self) -> String {
        match self {
            XmlNode::Element(node) if node.is_element() || node.is_root() => node
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect(),
            XmlNode::Element(node) if node.is_pi() => node
                .pi()
                .and_then(|pi| pi.value)
                .unwrap_or_default()
                .to_string(),
            XmlNode::Element(node) => node.text().unwrap_or_default().to_string(),
            XmlNode::Attribute { .. } => self
                .attribute()
                .map(|attr| attr.value().to_string())
                .unwrap_or_default(),
        }
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Element(node) if node.is_element() => {
                let parent = *node;
                let count = node.attributes().len();
                Box::new((0..count).map(move |index| XmlNode::Attribute { parent, index }))
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Element(node) => Box::new(node.children().map(XmlNode::Element)),
            XmlNode::Attribute { .. } => Box::new(std::iter::empty()),
        }
    }

    fn parent(&self) -> Option<Self> {
        match self {
            XmlNode::Element(node) => node.parent().map(XmlNode::Element),
            XmlNode::Attribute { parent, .. } => Some(XmlNode::Element(*parent)),
        }
    }

    fn namespace_uri(&self) -> Option<&'a str> {
        match self {
            XmlNode::Element(node) => node.tag_name().namespace(),
            XmlNode::Attribute { .. } => self.attribute().and_then(|attr| attr.namespace()),
        }
    }
}

/// Evaluates template paths with the XPath 1.0 engine.
///
/// Parsed expressions are cached by source text for the lifetime of the
/// evaluator, so an item template's paths are parsed once rather than once
/// per match.
pub struct XPathEvaluator<'d> {
    document: &'d XmlDocument<'d>,
    cache: RefCell<HashMap<String, Rc<Expression>>>,
}

impl<'d> XPathEvaluator<'d> {
    pub fn new(document: &'d XmlDocument<'d>) -> Self {
        XPathEvaluator {
            document,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> XmlNode<'d, 'd> {
        self.document.root_node()
    }

    fn compile(&self, path: &str) -> Result<Rc<Expression>, XPathError> {
        if let Some(expr) = self.cache.borrow().get(path) {
            return Ok(Rc::clone(expr));
        }
        debug!("Compiling XPath '{}'", path);
        let expr = Rc::new(parse_expression(path)?);
        self.cache
            .borrow_mut()
            .insert(path.to_string(), Rc::clone(&expr));
        Ok(expr)
    }
}

impl<'d> PathEvaluator for XPathEvaluator<'d> {
    type Node = XmlNode<'d, 'd>;
    type Error = XPathError;

    fn eval_string(&self, path: &str, context: Self::Node) -> Result<String, XPathError> {
        xmlshape_xpath1::evaluate_string(&*self.compile(path)?, context)
    }

    fn eval_number(&self, path: &str, context: Self::Node) -> Result<f64, XPathError> {
        xmlshape_xpath1::evaluate_number(&*self.compile(path)?, context)
    }

    fn eval_boolean(&self, path: &str, context: Self::Node) -> Result<bool, XPathError> {
        xmlshape_xpath1::evaluate_boolean(&*self.compile(path)?, context)
    }

    fn eval_node_set(&self, path: &str, context: Self::Node) -> Result<Vec<Self::Node>, XPathError> {
        xmlshape_xpath1::evaluate_node_set(&*self.compile(path)?, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child<'a>(node: XmlNode<'a, 'a>, name: &str) -> XmlNode<'a, 'a> {
        node.children()
            .find(|n| n.name().is_some_and(|q| q.to_string() == name))
            .unwrap()
    }

    #[test]
    fn test_xml_node_attributes() {
        let xml = r#"<root><item id="123" status="active">Text</item></root>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let item = child(child(doc.root_node(), "root"), "item");

        let attrs: Vec<_> = item.attributes().collect();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].node_type(), NodeType::Attribute);
        assert_eq!(attrs[0].name().unwrap().local_part, "id");
        assert_eq!(attrs[1].string_value(), "active");
        assert_eq!(attrs[0].parent(), Some(item));
        assert!(attrs[0] > item && attrs[1] > attrs[0]);
        assert!(item.children().all(|c| c > attrs[1]));
    }

    #[test]
    fn test_prefixed_names_keep_their_prefix() {
        let xml = r#"<s:Envelope xmlns:s="urn:soap" xmlns="urn:default"><Body s:mustUnderstand="1" plain="x"/></s:Envelope>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let envelope = child(doc.root_node(), "s:Envelope");
        assert_eq!(envelope.namespace_uri(), Some("urn:soap"));
        let body = child(envelope, "Body");
        assert_eq!(body.namespace_uri(), Some("urn:default"));
        let names: Vec<String> = body
            .attributes()
            .map(|a| a.name().unwrap().to_string())
            .collect();
        assert_eq!(names, ["s:mustUnderstand", "plain"]);
        assert_eq!(qualified_name(envelope.inner().unwrap()), "s:Envelope");
    }

    #[test]
    fn test_string_values() {
        let xml = "<a>one<!-- c --><b>two</b><?pi data?></a>";
        let doc = XmlDocument::parse(xml).unwrap();
        let a = child(doc.root_node(), "a");
        assert_eq!(a.string_value(), "onetwo");
        let kinds: Vec<NodeType> = a.children().map(|c| c.node_type()).collect();
        assert_eq!(
            kinds,
            [NodeType::Text, NodeType::Comment, NodeType::Element, NodeType::ProcessingInstruction]
        );
        let pi = a.children().last().unwrap();
        assert_eq!(pi.name().unwrap().local_part, "pi");
        assert_eq!(pi.string_value(), "data");
    }

    #[test]
    fn test_evaluator_reuses_compiled_paths() {
        let doc = XmlDocument::parse("<r><i/><i/></r>").unwrap();
        let evaluator = XPathEvaluator::new(&doc);
        let root = evaluator.root();
        assert_eq!(evaluator.eval_number("count(//i)", root).unwrap(), 2.0);
        assert_eq!(evaluator.eval_number("count(//i)", root).unwrap(), 2.0);
        assert_eq!(evaluator.cache.borrow().len(), 1);
        assert!(evaluator.eval_string("//[", root).is_err());
        assert_eq!(evaluator.cache.borrow().len(), 1);
    }
}
