//! A scripted evaluator for unit tests.

use crate::evaluator::PathEvaluator;
use std::cell::RefCell;
use std::collections::HashMap;

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone)]
pub enum Reply {
    Text(&'static str),
    Number(f64),
    Boolean(bool),
    Nodes(Vec<usize>),
}

/// Answers `(path, context)` pairs registered with [`FakeEvaluator::on`];
/// anything else fails. Every call is recorded as `"<mode> <path>"`.
#[derive(Default)]
pub struct FakeEvaluator {
    replies: HashMap<(String, usize), Reply>,
    calls: RefCell<Vec<String>>,
}

impl FakeEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, path: &str, context: usize, reply: Reply) -> Self {
        self.replies.insert((path.to_string(), context), reply);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn reply(&self, mode: &str, path: &str, context: usize) -> Result<Reply, String> {
        self.calls.borrow_mut().push(format!("{} {}", mode, path));
        self.replies
            .get(&(path.to_string(), context))
            .cloned()
            .ok_or_else(|| format!("no reply scripted for '{}' at node {}", path, context))
    }
}

impl PathEvaluator for FakeEvaluator {
    type Node = usize;
    type Error = String;

    fn eval_string(&self, path: &str, context: usize) -> Result<String, String> {
        match self.reply("string", path, context)? {
            Reply::Text(s) => Ok(s.to_string()),
            other => Err(format!("{:?} is not a string", other)),
        }
    }

    fn eval_number(&self, path: &str, context: usize) -> Result<f64, String> {
        match self.reply("number", path, context)? {
            Reply::Number(n) => Ok(n),
            other => Err(format!("{:?} is not a number", other)),
        }
    }

    fn eval_boolean(&self, path: &str, context: usize) -> Result<bool, String> {
        match self.reply("boolean", path, context)? {
            Reply::Boolean(b) => Ok(b),
            other => Err(format!("{:?} is not a boolean", other)),
        }
    }

    fn eval_node_set(&self, path: &str, context: usize) -> Result<Vec<usize>, String> {
        match self.reply("node-set", path, context)? {
            Reply::Nodes(nodes) => Ok(nodes),
            other => Err(format!("{:?} is not a node-set", other)),
        }
    }
}
