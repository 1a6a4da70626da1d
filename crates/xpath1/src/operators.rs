//! Arithmetic, comparison and union operators.

use crate::ast::BinaryOperator;
use crate::datasource::DocumentNode;
use crate::engine::{XPathValue, into_document_order};
use crate::error::XPathError;

/// Applies `op` to two already-evaluated operands. The engine short-circuits
/// `and`/`or` itself; they are handled here too for direct callers.
pub fn apply<'a, N: DocumentNode<'a>>(
    op: BinaryOperator,
    left: XPathValue<N>,
    right: XPathValue<N>,
) -> Result<XPathValue<N>, XPathError> {
    use BinaryOperator::*;
    match op {
        Or => Ok(XPathValue::Boolean(left.to_bool() || right.to_bool())),
        And => Ok(XPathValue::Boolean(left.to_bool() && right.to_bool())),
        Plus | Minus | Multiply | Divide | Modulo => {
            let (a, b) = (left.to_number(), right.to_number());
            let result = match op {
                Plus => a + b,
                Minus => a - b,
                Multiply => a * b,
                Divide => a / b,
                // Truncating remainder, sign of the dividend, as XPath requires.
                _ => a % b,
            };
            Ok(XPathValue::Number(result))
        }
        Equals | NotEquals | LessThan | LessThanOrEqual | GreaterThan | GreaterThanOrEqual => {
            Ok(XPathValue::Boolean(compare(op, &left, &right)))
        }
        Union => match (left, right) {
            (XPathValue::NodeSet(mut l), XPathValue::NodeSet(r)) => {
                l.extend(r);
                Ok(XPathValue::NodeSet(into_document_order(l)))
            }
            (l, r) => Err(XPathError::TypeError(format!(
                "'|' needs two node-sets, got {:?} and {:?}",
                l, r
            ))),
        },
    }
}

/// Comparisons involving a node-set are existential: true if any member satisfies them.
fn compare<'a, N: DocumentNode<'a>>(op: BinaryOperator, left: &XPathValue<N>, right: &XPathValue<N>) -> bool {
    match (left, right) {
        (XPathValue::NodeSet(l), XPathValue::NodeSet(r)) => {
            let right_values: Vec<XPathValue<N>> =
                r.iter().map(|n| XPathValue::String(n.string_value())).collect();
            l.iter().any(|a| {
                let a = XPathValue::String(a.string_value());
                right_values.iter().any(|b| compare_atomic(op, &a, b))
            })
        }
        (XPathValue::NodeSet(nodes), XPathValue::Boolean(b)) => {
            compare_atomic(op, &XPathValue::<N>::Boolean(!nodes.is_empty()), &XPathValue::<N>::Boolean(*b))
        }
        (XPathValue::Boolean(b), XPathValue::NodeSet(nodes)) => {
            compare_atomic(op, &XPathValue::<N>::Boolean(*b), &XPathValue::<N>::Boolean(!nodes.is_empty()))
        }
        (XPathValue::NodeSet(nodes), other) => nodes
            .iter()
            .any(|n| compare_atomic(op, &XPathValue::String(n.string_value()), other)),
        (other, XPathValue::NodeSet(nodes)) => nodes
            .iter()
            .any(|n| compare_atomic(op, other, &XPathValue::String(n.string_value()))),
        (l, r) => compare_atomic(op, l, r),
    }
}

fn compare_atomic<'a, N: DocumentNode<'a>>(op: BinaryOperator, left: &XPathValue<N>, right: &XPathValue<N>) -> bool {
    let is_bool = |v: &XPathValue<N>| matches!(v, XPathValue::Boolean(_));
    let is_number = |v: &XPathValue<N>| matches!(v, XPathValue::Number(_));
    match op {
        BinaryOperator::Equals | BinaryOperator::NotEquals => {
            let equal = if is_bool(left) || is_bool(right) {
                left.to_bool() == right.to_bool()
            } else if is_number(left) || is_number(right) {
                left.to_number() == right.to_number()
            } else {
                left.to_string() == right.to_string()
            };
            (op == BinaryOperator::Equals) == equal
        }
        _ => {
            let (a, b) = (left.to_number(), right.to_number());
            match op {
                BinaryOperator::LessThan => a < b,
                BinaryOperator::LessThanOrEqual => a <= b,
                BinaryOperator::GreaterThan => a > b,
                _ => a >= b,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::tests::{MockNode, catalog_tree, ids};

    type Value<'t> = XPathValue<MockNode<'t>>;

    fn boolean(value: Value<'_>) -> bool {
        match value {
            XPathValue::Boolean(b) => b,
            other => panic!("Expected a boolean, got {other:?}"),
        }
    }

    #[test]
    fn test_arithmetic() {
        let six = || Value::Number(6.0);
        let apply_num = |op, a: Value<'static>, b: Value<'static>| apply(op, a, b).unwrap().to_number();
        assert_eq!(apply_num(BinaryOperator::Plus, six(), Value::String(" 4 ".into())), 10.0);
        assert_eq!(apply_num(BinaryOperator::Modulo, Value::Number(-5.0), Value::Number(2.0)), -1.0);
        assert!(apply_num(BinaryOperator::Multiply, six(), Value::String("x".into())).is_nan());
        assert_eq!(apply_num(BinaryOperator::Divide, six(), Value::Number(0.0)), f64::INFINITY);
    }

    #[test]
    fn test_node_set_comparisons_are_existential() {
        let tree = catalog_tree();
        let prices = || Value::NodeSet(vec![tree.node(ids::PRICE1), tree.node(ids::PRICE2)]);
        assert!(boolean(apply(BinaryOperator::Equals, prices(), Value::Number(12.5)).unwrap()));
        assert!(boolean(apply(BinaryOperator::NotEquals, prices(), Value::Number(12.5)).unwrap()));
        assert!(boolean(apply(BinaryOperator::LessThan, Value::Number(20.0), prices()).unwrap()));
        assert!(!boolean(apply(BinaryOperator::GreaterThan, prices(), Value::Number(40.0)).unwrap()));
        assert!(boolean(apply(BinaryOperator::Equals, prices(), Value::String("30".into())).unwrap()));
    }

    #[test]
    fn test_empty_node_set_compares_false_except_against_booleans() {
        let empty = || Value::NodeSet(vec![]);
        assert!(!boolean(apply(BinaryOperator::Equals, empty(), Value::String("".into())).unwrap()));
        assert!(!boolean(apply(BinaryOperator::NotEquals, empty(), Value::String("".into())).unwrap()));
        assert!(boolean(apply(BinaryOperator::Equals, empty(), Value::Boolean(false)).unwrap()));
    }

    #[test]
    fn test_scalar_equality_picks_the_strongest_type() {
        assert!(boolean(
            apply(BinaryOperator::Equals, Value::String("1.0".into()), Value::Number(1.0)).unwrap()
        ));
        assert!(!boolean(
            apply(BinaryOperator::Equals, Value::String("1.0".into()), Value::String("1".into())).unwrap()
        ));
        assert!(boolean(
            apply(BinaryOperator::Equals, Value::String("no".into()), Value::Boolean(true)).unwrap()
        ));
    }

    #[test]
    fn test_union_merges_in_document_order() {
        let tree = catalog_tree();
        let result = apply(
            BinaryOperator::Union,
            Value::NodeSet(vec![tree.node(ids::BOOK2), tree.node(ids::BOOK1)]),
            Value::NodeSet(vec![tree.node(ids::BOOK1), tree.node(ids::CATALOG)]),
        )
        .unwrap();
        assert_eq!(
            result,
            Value::NodeSet(vec![tree.node(ids::CATALOG), tree.node(ids::BOOK1), tree.node(ids::BOOK2)])
        );
        assert!(apply(BinaryOperator::Union, Value::Number(1.0), Value::NodeSet(vec![])).is_err());
    }
}
