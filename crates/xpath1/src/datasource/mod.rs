//! The read-only document model the evaluator navigates.
use std::fmt;
use std::hash::Hash;

/// A qualified name as written in the document: optional prefix plus local part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName<'a> {
    pub prefix: Option<&'a str>,
    pub local_part: &'a str,
}

impl<'a> QName<'a> {
    pub fn local(local_part: &'a str) -> Self {
        QName {
            prefix: None,
            local_part,
        }
    }

    /// Splits `prefix:local` at the first colon.
    pub fn parse(qualified: &'a str) -> Self {
        match qualified.split_once(':') {
            Some((prefix, local_part)) => QName {
                prefix: Some(prefix),
                local_part,
            },
            None => QName::local(qualified),
        }
    }
}

impl fmt::Display for QName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local_part),
            None => f.write_str(self.local_part),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
}

/// A handle to one node of a parsed document.
///
/// The evaluator is written only against this trait, so any tree (roxmltree,
/// an in-memory fixture, ...) can be queried once it implements it.
///
/// `Ord` must be document order: a node sorts after its ancestors, an
/// element's attributes sort after the element and before its children.
/// Every node-set the evaluator returns is sorted with it.
///
/// `'a` is the lifetime of the underlying document.
pub trait DocumentNode<'a>: fmt::Debug + Clone + Copy + Eq + Hash + Ord {
    fn node_type(&self) -> NodeType;

    /// Element and attribute names, and processing-instruction targets.
    fn name(&self) -> Option<QName<'a>>;

    /// The XPath string-value: concatenated descendant text for roots and
    /// elements, the value itself for every other node kind.
    fn string_value(&self) -> String;

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// `None` only for the root. An attribute's parent is its element.
    fn parent(&self) -> Option<Self>;

    fn namespace_uri(&self) -> Option<&'a str> {
        None
    }
}

/// Walks up from `node` to the root of its document.
pub fn document_root<'a, N: DocumentNode<'a>>(node: N) -> N {
    let mut current = node;
    while let Some(parent) = current.parent() {
        current = parent;
    }
    current
}

// Public so that downstream crates can reuse the fixture in their own tests.
pub mod tests {
    use super::*;

    #[derive(Debug)]
    struct MockNodeData {
        node_type: NodeType,
        name: Option<QName<'static>>,
        value: String,
        parent: Option<usize>,
        children: Vec<usize>,
        attributes: Vec<usize>,
    }

    /// An arena-backed tree for unit tests. Node ids are handed out in
    /// creation order, so building the tree top to bottom yields ids in
    /// document order.
    #[derive(Debug)]
    pub struct MockTree {
        nodes: Vec<MockNodeData>,
    }

    #[derive(Debug, Clone, Copy)]
    pub struct MockNode<'a> {
        pub id: usize,
        pub tree: &'a MockTree,
    }

    impl PartialEq for MockNode<'_> {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }
    impl Eq for MockNode<'_> {}

    impl PartialOrd for MockNode<'_> {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            Some(self.cmp(other))
        }
    }
    impl Ord for MockNode<'_> {
        fn cmp(&self, other: &Self) -> std::cmp::Ordering {
            self.id.cmp(&other.id)
        }
    }

    impl Hash for MockNode<'_> {
        fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
            self.id.hash(state);
        }
    }

    impl Default for MockTree {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockTree {
        pub fn new() -> Self {
            MockTree {
                nodes: vec![MockNodeData {
                    node_type: NodeType::Root,
                    name: None,
                    value: String::new(),
                    parent: None,
                    children: vec![],
                    attributes: vec![],
                }],
            }
        }

        fn push(
            &mut self,
            parent: usize,
            node_type: NodeType,
            name: Option<&'static str>,
            value: &str,
        ) -> usize {
            let id = self.nodes.len();
            self.nodes.push(MockNodeData {
                node_type,
                name: name.map(QName::parse),
                value: value.to_string(),
                parent: Some(parent),
                children: vec![],
                attributes: vec![],
            });
            if node_type == NodeType::Attribute {
                self.nodes[parent].attributes.push(id);
            } else {
                self.nodes[parent].children.push(id);
            }
            id
        }

        pub fn element(&mut self, parent: usize, name: &'static str) -> usize {
            self.push(parent, NodeType::Element, Some(name), "")
        }

        pub fn attribute(&mut self, element: usize, name: &'static str, value: &str) -> usize {
            self.push(element, NodeType::Attribute, Some(name), value)
        }

        pub fn text(&mut self, parent: usize, value: &str) -> usize {
            self.push(parent, NodeType::Text, None, value)
        }

        pub fn comment(&mut self, parent: usize, value: &str) -> usize {
            self.push(parent, NodeType::Comment, None, value)
        }

        pub fn root(&self) -> MockNode<'_> {
            self.node(0)
        }

        pub fn node(&self, id: usize) -> MockNode<'_> {
            MockNode { id, tree: self }
        }
    }

    impl<'a> DocumentNode<'a> for MockNode<'a> {
        fn node_type(&self) -> NodeType {
            self.tree.nodes[self.id].node_type
        }

        fn name(&self) -> Option<QName<'a>> {
            self.tree.nodes[self.id].name
        }

        fn string_value(&self) -> String {
            match self.node_type() {
                NodeType::Root | NodeType::Element => self
                    .children()
                    .map(|child| match child.node_type() {
                        NodeType::Text | NodeType::Element => child.string_value(),
                        _ => String::new(),
                    })
                    .collect(),
                _ => self.tree.nodes[self.id].value.clone(),
            }
        }

        fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            Box::new(
                tree.nodes[self.id]
                    .attributes
                    .iter()
                    .map(move |&id| MockNode { id, tree }),
            )
        }

        fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            Box::new(
                tree.nodes[self.id]
                    .children
                    .iter()
                    .map(move |&id| MockNode { id, tree }),
            )
        }

        fn parent(&self) -> Option<Self> {
            let tree = self.tree;
            tree.nodes[self.id].parent.map(|id| MockNode { id, tree })
        }
    }

    /// Node ids of [`catalog_tree`], in document order.
    pub mod ids {
        pub const ROOT: usize = 0;
        pub const CATALOG: usize = 1;
        pub const BOOK1: usize = 2;
        pub const BOOK1_ID: usize = 3;
        pub const BOOK1_LANG: usize = 4;
        pub const TITLE1: usize = 5;
        pub const TITLE1_TEXT: usize = 6;
        pub const PRICE1: usize = 7;
        pub const PRICE1_TEXT: usize = 8;
        pub const COMMENT: usize = 9;
        pub const BOOK2: usize = 10;
        pub const BOOK2_ID: usize = 11;
        pub const TITLE2: usize = 12;
        pub const TITLE2_TEXT: usize = 13;
        pub const PRICE2: usize = 14;
        pub const PRICE2_TEXT: usize = 15;
        pub const EXTRA: usize = 16;
        pub const EXTRA_TEXT: usize = 17;
    }

    /// Builds:
    ///
    /// ```xml
    /// <catalog>
    ///   <book id="b1" xml:lang="en"><title>Rust</title><price>30</price></book>
    ///   <!-- sale -->
    ///   <book id="b2"><title>XML</title><price>12.5</price></book>
    ///   <ns:extra>x</ns:extra>
    /// </catalog>
    /// ```
    pub fn catalog_tree() -> MockTree {
        let mut tree = MockTree::new();
        let catalog = tree.element(ids::ROOT, "catalog");

        let book1 = tree.element(catalog, "book");
        tree.attribute(book1, "id", "b1");
        tree.attribute(book1, "xml:lang", "en");
        let title1 = tree.element(book1, "title");
        tree.text(title1, "Rust");
        let price1 = tree.element(book1, "price");
        tree.text(price1, "30");

        tree.comment(catalog, " sale ");

        let book2 = tree.element(catalog, "book");
        tree.attribute(book2, "id", "b2");
        let title2 = tree.element(book2, "title");
        tree.text(title2, "XML");
        let price2 = tree.element(book2, "price");
        tree.text(price2, "12.5");

        let extra = tree.element(catalog, "ns:extra");
        tree.text(extra, "x");
        tree
    }

    #[test]
    fn catalog_ids_follow_document_order() {
        let tree = catalog_tree();
        assert_eq!(tree.node(ids::BOOK1_LANG).name().unwrap().prefix, Some("xml"));
        assert_eq!(tree.node(ids::PRICE2_TEXT).string_value(), "12.5");
        assert_eq!(tree.node(ids::EXTRA).name().unwrap().to_string(), "ns:extra");
        assert_eq!(tree.node(ids::BOOK1).string_value(), "Rust30");
        assert_eq!(document_root(tree.node(ids::TITLE2_TEXT)), tree.root());
    }
}
