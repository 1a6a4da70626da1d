//! Abstract syntax tree for XPath 1.0 expressions.

/// A parsed expression, ready to be evaluated against any context node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(String),
    Number(f64),
    LocationPath(LocationPath),
    /// A primary expression narrowed by predicates, e.g. `(//item)[1]`.
    Filter {
        expr: Box<Expression>,
        predicates: Vec<Expression>,
    },
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    Negate(Box<Expression>),
}

impl Expression {
    pub fn is_location_path(&self) -> bool {
        matches!(self, Expression::LocationPath(_))
    }

    pub fn is_binary_op(&self) -> bool {
        matches!(self, Expression::BinaryOp { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
    And,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Union,
}

/// A location path such as `/catalog/book`, `@id` or `(//a)/b`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    /// Expression whose node-set the steps start from, for paths like `id('x')/title`.
    /// When `None` the path starts at the context node, or at the root if `is_absolute`.
    pub start_point: Option<Box<Expression>>,
    pub is_absolute: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub node_test: NodeTest,
    pub predicates: Vec<Expression>,
}

impl Step {
    /// The implicit `descendant-or-self::node()` step that `//` expands to.
    pub fn descendant_or_self() -> Self {
        Step {
            axis: Axis::DescendantOrSelf,
            node_test: NodeTest::NodeType(NodeTypeTest::Node),
            predicates: vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Attribute,
    Parent,
    Ancestor,
    AncestorOrSelf,
    SelfAxis,
    FollowingSibling,
    PrecedingSibling,
    Following,
    Preceding,
}

impl Axis {
    /// Reverse axes number their nodes nearest-first, which matters for positional predicates.
    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            Axis::Ancestor | Axis::AncestorOrSelf | Axis::PrecedingSibling | Axis::Preceding
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// A name test, qualified (`soap:Body`) or not (`item`).
    Name(String),
    /// `*`
    Wildcard,
    /// `prefix:*`
    PrefixWildcard(String),
    NodeType(NodeTypeTest),
    /// `processing-instruction('target')`
    ProcessingInstructionTarget(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTypeTest {
    Text,
    Node,
    Comment,
    ProcessingInstruction,
}
