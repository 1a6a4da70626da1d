//! Node collection along each axis.
//!
//! Every function returns nodes in axis order: document order for forward
//! axes, nearest-first for reverse axes. Positional predicates rely on it.

use crate::ast::Axis;
use crate::datasource::{DocumentNode, NodeType};

pub fn collect<'a, N: DocumentNode<'a>>(axis: Axis, node: N) -> Vec<N> {
    match axis {
        Axis::Child => node.children().collect(),
        Axis::Attribute => node.attributes().collect(),
        Axis::SelfAxis => vec![node],
        Axis::Parent => node.parent().into_iter().collect(),
        Axis::Descendant => descendants(node),
        Axis::DescendantOrSelf => {
            let mut nodes = vec![node];
            nodes.extend(descendants(node));
            nodes
        }
        Axis::Ancestor => ancestors(node),
        Axis::AncestorOrSelf => {
            let mut nodes = vec![node];
            nodes.extend(ancestors(node));
            nodes
        }
        Axis::FollowingSibling => following_siblings(node),
        Axis::PrecedingSibling => preceding_siblings(node),
        Axis::Following => following(node),
        Axis::Preceding => preceding(node),
    }
}

/// Pre-order walk, which is document order.
pub fn descendants<'a, N: DocumentNode<'a>>(node: N) -> Vec<N> {
    let mut result = Vec::new();
    let mut stack: Vec<N> = node.children().collect();
    stack.reverse();
    while let Some(current) = stack.pop() {
        result.push(current);
        let children: Vec<N> = current.children().collect();
        stack.extend(children.into_iter().rev());
    }
    result
}

pub fn ancestors<'a, N: DocumentNode<'a>>(node: N) -> Vec<N> {
    std::iter::successors(node.parent(), |n| n.parent()).collect()
}

/// Attributes have no siblings, so both sibling axes are empty for them.
fn siblings<'a, N: DocumentNode<'a>>(node: N) -> Option<(Vec<N>, usize)> {
    if node.node_type() == NodeType::Attribute {
        return None;
    }
    let all: Vec<N> = node.parent()?.children().collect();
    let position = all.iter().position(|&sibling| sibling == node)?;
    Some((all, position))
}

pub fn following_siblings<'a, N: DocumentNode<'a>>(node: N) -> Vec<N> {
    siblings(node)
        .map(|(all, position)| all[position + 1..].to_vec())
        .unwrap_or_default()
}

pub fn preceding_siblings<'a, N: DocumentNode<'a>>(node: N) -> Vec<N> {
    siblings(node)
        .map(|(all, position)| all[..position].iter().rev().copied().collect())
        .unwrap_or_default()
}

pub fn following<'a, N: DocumentNode<'a>>(node: N) -> Vec<N> {
    let mut result = Vec::new();
    let mut current = node;
    if node.node_type() == NodeType::Attribute {
        // An attribute is followed by the content of its own element.
        if let Some(element) = node.parent() {
            result.extend(descendants(element));
            current = element;
        }
    }
    loop {
        for sibling in following_siblings(current) {
            result.push(sibling);
            result.extend(descendants(sibling));
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    result
}

pub fn preceding<'a, N: DocumentNode<'a>>(node: N) -> Vec<N> {
    let mut current = match node.node_type() {
        NodeType::Attribute => match node.parent() {
            Some(element) => element,
            None => return vec![],
        },
        _ => node,
    };
    // Collected nearest-first: each preceding sibling's subtree reversed, level by level upwards.
    let mut result = Vec::new();
    loop {
        for sibling in preceding_siblings(current) {
            result.extend(descendants(sibling).into_iter().rev());
            result.push(sibling);
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    result
}
