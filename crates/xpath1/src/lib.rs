//! An XPath 1.0 parser and evaluator over any tree implementing [`DocumentNode`].
//!
//! ```ignore
//! let expr = parse_expression("count(//book[price > 20])")?;
//! let n = evaluate_number(&expr, root)?;
//! ```

pub mod ast;
pub mod axes;
pub mod datasource;
pub mod engine;
pub mod error;
pub mod functions;
pub mod operators;
pub mod parser;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, Step};
pub use datasource::{DocumentNode, NodeType, QName, document_root};
pub use engine::{
    EvaluationContext, XPathValue, evaluate, evaluate_boolean, evaluate_node_set, evaluate_number,
    evaluate_string,
};

// Re-export test utilities for integration testing in downstream crates
pub use datasource::tests;
pub use error::XPathError;
pub use parser::parse_expression;
