//! Picks the evaluation mode of a path from its leading function name.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    Number,
    String,
    Boolean,
}

/// Prefixes grouped by first byte. Matching is purely lexical: the
/// expression is never parsed here and leading whitespace is significant.
fn candidates(first: u8) -> &'static [(&'static str, ReturnType)] {
    use ReturnType::*;
    match first {
        b'b' => &[("boolean(", Boolean)],
        b'c' => &[("count(", Number), ("ceiling(", Number)],
        b'f' => &[("floor(", Number)],
        b'n' => &[("number(", Number)],
        b'r' => &[("round(", Number)],
        b's' => &[("sum(", Number)],
        _ => &[],
    }
}

pub fn classify(path: &str) -> ReturnType {
    let Some(&first) = path.as_bytes().first() else {
        return ReturnType::String;
    };
    candidates(first)
        .iter()
        .find(|(prefix, _)| path.starts_with(*prefix))
        .map(|&(_, mode)| mode)
        .unwrap_or(ReturnType::String)
}
