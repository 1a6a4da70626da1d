//! The recursive walk that mirrors a template's shape into output.

use crate::builder::{ObjectBuilder, Scalar};
use crate::classify::{ReturnType, classify};
use crate::evaluator::PathEvaluator;
use crate::template::{Leaf, Template};
use log::warn;
use serde_json::Value;

/// Applies parsed templates through a [`PathEvaluator`].
///
/// The engine holds no per-document state, so one engine can serve many
/// documents as long as they share the evaluator's node type.
pub struct TemplateEngine<'e, E: PathEvaluator> {
    pub(crate) evaluator: &'e E,
}

impl<'e, E: PathEvaluator> TemplateEngine<'e, E> {
    pub fn new(evaluator: &'e E) -> Self {
        TemplateEngine { evaluator }
    }

    /// Produces the output for `template` with `root` as the initial context.
    ///
    /// An array template yields the expanded array itself rather than an
    /// object wrapping it.
    pub fn apply(&self, template: &Template, root: E::Node) -> Value {
        self.value_of(template, root)
    }

    /// Walks one template node and records its output under `key`.
    pub fn walk(&self, context: E::Node, template: &Template, key: &str, out: &mut ObjectBuilder) {
        out.set(key, self.value_of(template, context));
    }

    fn value_of(&self, template: &Template, context: E::Node) -> Value {
        match template {
            Template::Array(array) => Value::Array(self.expand(context, array.as_deref())),
            Template::Object(fields) => self.walk_object(context, fields),
            Template::Leaf(leaf) => self.scalar(context, leaf).into(),
        }
    }

    /// Every field is walked against the same context.
    pub(crate) fn walk_object(&self, context: E::Node, fields: &[(String, Template)]) -> Value {
        let mut out = ObjectBuilder::new();
        for (key, template) in fields {
            self.walk(context, template, key, &mut out);
        }
        out.finish()
    }

    /// Empty and literal leaves never reach the evaluator.
    pub fn scalar(&self, context: E::Node, leaf: &Leaf) -> Scalar {
        match leaf {
            Leaf::Empty => Scalar::String(String::new()),
            Leaf::Literal(text) => Scalar::String(text.clone()),
            Leaf::Path(path) => self.evaluate(path, context),
        }
    }

    fn evaluate(&self, path: &str, context: E::Node) -> Scalar {
        let evaluator = self.evaluator;
        match classify(path) {
            ReturnType::Number => Scalar::Number(
                evaluator
                    .eval_number(path, context)
                    .unwrap_or_else(|e| neutral(path, e, 0.0)),
            ),
            ReturnType::Boolean => Scalar::Boolean(
                evaluator
                    .eval_boolean(path, context)
                    .unwrap_or_else(|e| neutral(path, e, false)),
            ),
            ReturnType::String => Scalar::String(
                evaluator
                    .eval_string(path, context)
                    .unwrap_or_else(|e| neutral(path, e, String::new())),
            ),
        }
    }
}

pub(crate) fn neutral<T, D: std::fmt::Display>(path: &str, error: D, fallback: T) -> T {
    warn!("Failed to evaluate '{}': {}", path, error);
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeEvaluator, Reply, init_logs};
    use serde_json::json;

    fn run(evaluator: &FakeEvaluator, template: serde_json::Value) -> Value {
        let template = Template::from_value(&template).unwrap();
        TemplateEngine::new(evaluator).apply(&template, 0)
    }

    #[test]
    fn test_object_shape_and_order_follow_the_template() {
        init_logs();
        let evaluator = FakeEvaluator::new()
            .on("//name", 0, Reply::Text("Ada"))
            .on("count(//a)", 0, Reply::Number(3.0))
            .on("boolean(//b)", 0, Reply::Boolean(true));
        let output = run(
            &evaluator,
            json!({"name": "//name", "meta": {"n": "count(//a)", "has": "boolean(//b)"}, "kind": "#person"}),
        );
        assert_eq!(
            output,
            json!({"name": "Ada", "meta": {"n": 3, "has": true}, "kind": "person"})
        );
        let keys: Vec<&String> = output.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["name", "meta", "kind"]);
    }

    #[test]
    fn test_empty_and_literal_leaves_skip_the_evaluator() {
        let evaluator = FakeEvaluator::new();
        let output = run(&evaluator, json!({"a": "", "b": "#", "c": "#//not-a-path"}));
        assert_eq!(output, json!({"a": "", "b": "", "c": "//not-a-path"}));
        assert!(evaluator.calls().is_empty());
    }

    #[test]
    fn test_each_path_leaf_is_evaluated_once_in_its_mode() {
        let evaluator = FakeEvaluator::new()
            .on("sum(//p)", 0, Reply::Number(1.5))
            .on("title", 0, Reply::Text("T"));
        run(&evaluator, json!({"total": "sum(//p)", "title": "title"}));
        assert_eq!(evaluator.calls(), ["number sum(//p)", "string title"]);
    }

    #[test]
    fn test_evaluation_failures_degrade_to_neutral_values() {
        init_logs();
        let evaluator = FakeEvaluator::new().on("//ok", 0, Reply::Text("fine"));
        let output = run(
            &evaluator,
            json!({"s": "//bad", "n": "count(//bad)", "b": "boolean(//bad)", "ok": "//ok"}),
        );
        assert_eq!(output, json!({"s": "", "n": 0, "b": false, "ok": "fine"}));
    }

    #[test]
    fn test_nan_becomes_null() {
        let evaluator = FakeEvaluator::new().on("number(x)", 0, Reply::Number(f64::NAN));
        assert_eq!(run(&evaluator, json!({"n": "number(x)"})), json!({"n": null}));
    }
}
