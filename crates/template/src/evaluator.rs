use std::fmt;

/// Evaluates path expressions against nodes of some parsed document.
///
/// The engine calls exactly one method per path leaf, chosen by
/// [`classify`](fn@crate::classify). An `Err` is never fatal: the engine logs it
/// and substitutes the neutral value of the requested type.
pub trait PathEvaluator {
    type Node: Copy;
    type Error: fmt::Display;

    fn eval_string(&self, path: &str, context: Self::Node) -> Result<String, Self::Error>;

    fn eval_number(&self, path: &str, context: Self::Node) -> Result<f64, Self::Error>;

    fn eval_boolean(&self, path: &str, context: Self::Node) -> Result<bool, Self::Error>;

    /// Matching nodes in document order.
    fn eval_node_set(&self, path: &str, context: Self::Node) -> Result<Vec<Self::Node>, Self::Error>;
}
