//! Output assembly.

use serde_json::{Map, Number, Value};

/// The typed result of one path leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::String(s) => Value::String(s),
            Scalar::Boolean(b) => Value::Bool(b),
            Scalar::Number(n) => number_value(n),
        }
    }
}

/// Whole numbers become JSON integers so that `count()` reads as `3`, not `3.0`.
/// JSON has no NaN or infinity, so those become `null`.
fn number_value(n: f64) -> Value {
    // i64::MAX as f64 rounds up to 2^63, hence the strict bound.
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// An insertion-ordered object under construction. Setting a key twice keeps
/// its first position and the last value.
#[derive(Debug, Default)]
pub struct ObjectBuilder {
    entries: Map<String, Value>,
}

impl ObjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn finish(self) -> Value {
        Value::Object(self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_conversion() {
        assert_eq!(Value::from(Scalar::Number(3.0)), json!(3));
        assert_eq!(Value::from(Scalar::Number(-0.0)), json!(0));
        assert_eq!(Value::from(Scalar::Number(12.5)), json!(12.5));
        assert_eq!(Value::from(Scalar::Number(f64::NAN)), Value::Null);
        assert_eq!(Value::from(Scalar::Number(f64::INFINITY)), Value::Null);
        assert_eq!(Value::from(Scalar::Number(1e300)), json!(1e300));
        assert!(Value::from(Scalar::Number(3.0)).is_i64());
    }

    #[test]
    fn test_builder_preserves_insertion_order() {
        let mut builder = ObjectBuilder::new();
        builder.set("z", Scalar::String("last".into()));
        builder.set("a", Scalar::Boolean(true));
        builder.set("z", Scalar::String("again".into()));
        let value = builder.finish();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["z", "a"]);
        assert_eq!(value["z"], json!("again"));
    }
}
