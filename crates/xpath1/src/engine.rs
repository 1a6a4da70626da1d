//! Evaluates a parsed expression against any [`DocumentNode`] tree.

use crate::ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, NodeTypeTest, Step};
use crate::datasource::{DocumentNode, NodeType, QName, document_root};
use crate::error::XPathError;
use crate::{axes, functions, operators};
use std::fmt;

/// The four XPath 1.0 result types.
#[derive(Debug, Clone, PartialEq)]
pub enum XPathValue<N> {
    /// Always in document order, without duplicates.
    NodeSet(Vec<N>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<'a, N: DocumentNode<'a>> XPathValue<N> {
    pub fn to_bool(&self) -> bool {
        match self {
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
            XPathValue::String(s) => !s.is_empty(),
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::Boolean(b) => *b,
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            XPathValue::Number(n) => *n,
            XPathValue::Boolean(b) => f64::from(u8::from(*b)),
            XPathValue::String(s) => string_to_number(s),
            XPathValue::NodeSet(_) => string_to_number(&self.to_string()),
        }
    }
}

impl<'a, N: DocumentNode<'a>> fmt::Display for XPathValue<N> {
    /// The XPath `string()` conversion. A node-set converts through its first node.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XPathValue::NodeSet(nodes) => match nodes.first() {
                Some(node) => f.write_str(&node.string_value()),
                None => Ok(()),
            },
            XPathValue::String(s) => f.write_str(s),
            XPathValue::Number(n) => f.write_str(&number_to_string(*n)),
            XPathValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// XPath number-to-string: no exponent, no trailing `.0`, `NaN`/`Infinity` spelled out.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

/// XPath string-to-number. Only `-?digits(.digits)?` surrounded by whitespace
/// is a number; everything else (including `1e3`, `+1`, `inf`) is NaN.
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    let unsigned = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let mut seen_digit = false;
    let mut seen_dot = false;
    for c in unsigned.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return f64::NAN,
        }
    }
    if !seen_digit {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// Sorts into document order and drops duplicates.
pub fn into_document_order<N: Ord>(mut nodes: Vec<N>) -> Vec<N> {
    nodes.sort();
    nodes.dedup();
    nodes
}

/// The dynamic context of one evaluation: where we are and, inside a
/// predicate, our position within the nodes being filtered.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<N> {
    pub context_node: N,
    pub root_node: N,
    /// 1-based.
    pub position: usize,
    pub size: usize,
}

impl<'a, N: DocumentNode<'a>> EvaluationContext<N> {
    pub fn new(context_node: N) -> Self {
        EvaluationContext {
            context_node,
            root_node: document_root(context_node),
            position: 1,
            size: 1,
        }
    }

    fn focus(&self, node: N, position: usize, size: usize) -> Self {
        EvaluationContext {
            context_node: node,
            root_node: self.root_node,
            position,
            size,
        }
    }
}

pub fn evaluate<'a, N>(expr: &Expression, ctx: &EvaluationContext<N>) -> Result<XPathValue<N>, XPathError>
where
    N: DocumentNode<'a> + 'a,
{
    match expr {
        Expression::Literal(s) => Ok(XPathValue::String(s.clone())),
        Expression::Number(n) => Ok(XPathValue::Number(*n)),
        Expression::LocationPath(path) => Ok(XPathValue::NodeSet(evaluate_location_path(path, ctx)?)),
        Expression::Filter { expr, predicates } => {
            let nodes = expect_node_set(evaluate(expr, ctx)?, "filter expression")?;
            Ok(XPathValue::NodeSet(apply_predicates(nodes, predicates, ctx)?))
        }
        Expression::FunctionCall { name, args } => {
            let evaluated = args
                .iter()
                .map(|arg| evaluate(arg, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            functions::call(name, evaluated, ctx)
        }
        // `and` and `or` short-circuit, so the right side may never be evaluated.
        Expression::BinaryOp {
            left,
            op: BinaryOperator::And,
            right,
        } => Ok(XPathValue::Boolean(
            evaluate(left, ctx)?.to_bool() && evaluate(right, ctx)?.to_bool(),
        )),
        Expression::BinaryOp {
            left,
            op: BinaryOperator::Or,
            right,
        } => Ok(XPathValue::Boolean(
            evaluate(left, ctx)?.to_bool() || evaluate(right, ctx)?.to_bool(),
        )),
        Expression::BinaryOp { left, op, right } => {
            let left = evaluate(left, ctx)?;
            let right = evaluate(right, ctx)?;
            operators::apply(*op, left, right)
        }
        Expression::Negate(inner) => Ok(XPathValue::Number(-evaluate(inner, ctx)?.to_number())),
    }
}

// --- Typed entry points, one per result type a caller can ask for ---

pub fn evaluate_string<'a, N: DocumentNode<'a> + 'a>(expr: &Expression, node: N) -> Result<String, XPathError> {
    Ok(evaluate(expr, &EvaluationContext::new(node))?.to_string())
}

pub fn evaluate_number<'a, N: DocumentNode<'a> + 'a>(expr: &Expression, node: N) -> Result<f64, XPathError> {
    Ok(evaluate(expr, &EvaluationContext::new(node))?.to_number())
}

pub fn evaluate_boolean<'a, N: DocumentNode<'a> + 'a>(expr: &Expression, node: N) -> Result<bool, XPathError> {
    Ok(evaluate(expr, &EvaluationContext::new(node))?.to_bool())
}

/// Fails with a type error when the expression does not produce a node-set.
pub fn evaluate_node_set<'a, N: DocumentNode<'a> + 'a>(expr: &Expression, node: N) -> Result<Vec<N>, XPathError> {
    expect_node_set(evaluate(expr, &EvaluationContext::new(node))?, "expression")
}

fn expect_node_set<N: fmt::Debug>(value: XPathValue<N>, what: &str) -> Result<Vec<N>, XPathError> {
    match value {
        XPathValue::NodeSet(nodes) => Ok(nodes),
        other => Err(XPathError::TypeError(format!(
            "{} must evaluate to a node-set, got {:?}",
            what, other
        ))),
    }
}

fn evaluate_location_path<'a, N>(path: &LocationPath, ctx: &EvaluationContext<N>) -> Result<Vec<N>, XPathError>
where
    N: DocumentNode<'a> + 'a,
{
    let mut nodes = match &path.start_point {
        Some(start) => expect_node_set(evaluate(start, ctx)?, "path start")?,
        None if path.is_absolute => vec![ctx.root_node],
        None => vec![ctx.context_node],
    };
    for step in &path.steps {
        nodes = evaluate_step(step, &nodes, ctx)?;
    }
    Ok(nodes)
}

fn evaluate_step<'a, N>(step: &Step, context_nodes: &[N], ctx: &EvaluationContext<N>) -> Result<Vec<N>, XPathError>
where
    N: DocumentNode<'a> + 'a,
{
    let mut selected = Vec::new();
    for &node in context_nodes {
        let candidates: Vec<N> = axes::collect(step.axis, node)
            .into_iter()
            .filter(|candidate| matches_node_test(*candidate, &step.node_test, step.axis))
            .collect();
        // Positions count along the axis, so predicates run before re-sorting.
        selected.extend(apply_predicates(candidates, &step.predicates, ctx)?);
    }
    if context_nodes.len() == 1 && !step.axis.is_reverse() {
        Ok(selected)
    } else {
        Ok(into_document_order(selected))
    }
}

fn matches_node_test<'a, N: DocumentNode<'a>>(node: N, test: &NodeTest, axis: Axis) -> bool {
    let principal = match axis {
        Axis::Attribute => NodeType::Attribute,
        _ => NodeType::Element,
    };
    match test {
        NodeTest::Wildcard => node.node_type() == principal,
        NodeTest::Name(expected) => {
            node.node_type() == principal && node.name() == Some(QName::parse(expected))
        }
        NodeTest::PrefixWildcard(prefix) => {
            node.node_type() == principal
                && node.name().is_some_and(|name| name.prefix == Some(prefix.as_str()))
        }
        NodeTest::NodeType(NodeTypeTest::Node) => true,
        NodeTest::NodeType(NodeTypeTest::Text) => node.node_type() == NodeType::Text,
        NodeTest::NodeType(NodeTypeTest::Comment) => node.node_type() == NodeType::Comment,
        NodeTest::NodeType(NodeTypeTest::ProcessingInstruction) => {
            node.node_type() == NodeType::ProcessingInstruction
        }
        NodeTest::ProcessingInstructionTarget(target) => {
            node.node_type() == NodeType::ProcessingInstruction
                && node.name().is_some_and(|name| name.local_part == target.as_str())
        }
    }
}

fn apply_predicates<'a, N>(
    mut nodes: Vec<N>,
    predicates: &[Expression],
    ctx: &EvaluationContext<N>,
) -> Result<Vec<N>, XPathError>
where
    N: DocumentNode<'a> + 'a,
{
    for predicate in predicates {
        let size = nodes.len();
        let mut kept = Vec::with_capacity(size);
        for (index, node) in nodes.into_iter().enumerate() {
            let position = index + 1;
            let keep = match evaluate(predicate, &ctx.focus(node, position, size))? {
                XPathValue::Number(n) => n == position as f64,
                other => other.to_bool(),
            };
            if keep {
                kept.push(node);
            }
        }
        nodes = kept;
    }
    Ok(nodes)
}
