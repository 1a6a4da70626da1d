//! Expansion of `[basePath, itemTemplate]` sections.

use crate::evaluator::PathEvaluator;
use crate::template::{ArrayTemplate, Template};
use crate::walker::{TemplateEngine, neutral};
use log::debug;
use serde_json::Value;

impl<E: PathEvaluator> TemplateEngine<'_, E> {
    /// Maps the item template over every node `base_path` selects, in
    /// document order. `None` (the literal `[]`) yields an empty array
    /// without evaluating anything.
    pub fn expand(&self, context: E::Node, array: Option<&ArrayTemplate>) -> Vec<Value> {
        let Some(array) = array else {
            return Vec::new();
        };
        let matches = self
            .evaluator
            .eval_node_set(&array.base_path, context)
            .unwrap_or_else(|e| neutral(&array.base_path, e, Vec::new()));
        debug!("'{}' matched {} node(s)", array.base_path, matches.len());

        match &array.item {
            Template::Object(fields) => matches
                .into_iter()
                .map(|node| self.walk_object(node, fields))
                .collect(),
            Template::Leaf(leaf) => matches
                .into_iter()
                .map(|node| Value::from(self.scalar(node, leaf)))
                .collect(),
            Template::Array(_) => {
                if !matches.is_empty() {
                    debug!(
                        "Skipping {} match(es) of '{}': array item templates cannot be arrays",
                        matches.len(),
                        array.base_path
                    );
                }
                Vec::new()
            }
        }
    }
}
