//! The XPath 1.0 core function library.

use crate::datasource::{DocumentNode, NodeType};
use crate::engine::{EvaluationContext, XPathValue, into_document_order};
use crate::error::XPathError;
use std::collections::HashSet;
use std::ops::RangeInclusive;

type Args<N> = Vec<XPathValue<N>>;

/// Dispatches a call by name. Arguments are already evaluated, left to right.
pub fn call<'a, N: DocumentNode<'a> + 'a>(
    name: &str,
    args: Args<N>,
    ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    match name {
        // Node-set
        "last" => arity(name, &args, 0..=0).map(|_| XPathValue::Number(ctx.size as f64)),
        "position" => arity(name, &args, 0..=0).map(|_| XPathValue::Number(ctx.position as f64)),
        "count" => {
            arity(name, &args, 1..=1)?;
            Ok(XPathValue::Number(node_set_arg(name, args)?.len() as f64))
        }
        "id" => func_id(args, ctx),
        "local-name" => {
            let node = optional_node_arg(name, args, ctx)?;
            Ok(XPathValue::String(
                node.and_then(|n| n.name()).map(|q| q.local_part.to_string()).unwrap_or_default(),
            ))
        }
        "name" => {
            let node = optional_node_arg(name, args, ctx)?;
            Ok(XPathValue::String(
                node.and_then(|n| n.name()).map(|q| q.to_string()).unwrap_or_default(),
            ))
        }
        "namespace-uri" => {
            let node = optional_node_arg(name, args, ctx)?;
            Ok(XPathValue::String(
                node.and_then(|n| n.namespace_uri()).unwrap_or_default().to_string(),
            ))
        }

        // String
        "string" => {
            arity(name, &args, 0..=1)?;
            Ok(XPathValue::String(string_or_context(args, ctx)))
        }
        "concat" => {
            arity(name, &args, 2..=usize::MAX)?;
            Ok(XPathValue::String(args.iter().map(|v| v.to_string()).collect()))
        }
        "starts-with" => two_strings(name, args).map(|(s, prefix)| XPathValue::Boolean(s.starts_with(&prefix))),
        "contains" => two_strings(name, args).map(|(s, needle)| XPathValue::Boolean(s.contains(&needle))),
        "substring-before" => two_strings(name, args).map(|(s, needle)| {
            XPathValue::String(s.find(&needle).map(|i| s[..i].to_string()).unwrap_or_default())
        }),
        "substring-after" => two_strings(name, args).map(|(s, needle)| {
            XPathValue::String(
                s.find(&needle)
                    .map(|i| s[i + needle.len()..].to_string())
                    .unwrap_or_default(),
            )
        }),
        "substring" => func_substring(args),
        "string-length" => {
            arity(name, &args, 0..=1)?;
            Ok(XPathValue::Number(string_or_context(args, ctx).chars().count() as f64))
        }
        "normalize-space" => {
            arity(name, &args, 0..=1)?;
            let s = string_or_context(args, ctx);
            let words: Vec<&str> = s.split(is_xml_space).filter(|w| !w.is_empty()).collect();
            Ok(XPathValue::String(words.join(" ")))
        }
        "translate" => func_translate(args),

        // Boolean
        "boolean" => {
            arity(name, &args, 1..=1)?;
            Ok(XPathValue::Boolean(args[0].to_bool()))
        }
        "not" => {
            arity(name, &args, 1..=1)?;
            Ok(XPathValue::Boolean(!args[0].to_bool()))
        }
        "true" => arity(name, &args, 0..=0).map(|_| XPathValue::Boolean(true)),
        "false" => arity(name, &args, 0..=0).map(|_| XPathValue::Boolean(false)),
        "lang" => func_lang(args, ctx),

        // Number
        "number" => {
            arity(name, &args, 0..=1)?;
            let n = match args.first() {
                Some(arg) => arg.to_number(),
                None => XPathValue::NodeSet(vec![ctx.context_node]).to_number(),
            };
            Ok(XPathValue::Number(n))
        }
        "sum" => {
            arity(name, &args, 1..=1)?;
            let total = node_set_arg(name, args)?
                .iter()
                .map(|n| XPathValue::<N>::String(n.string_value()).to_number())
                .sum::<f64>();
            Ok(XPathValue::Number(total))
        }
        "floor" => one_number(name, args).map(|n| XPathValue::Number(n.floor())),
        "ceiling" => one_number(name, args).map(|n| XPathValue::Number(n.ceil())),
        "round" => one_number(name, args).map(|n| XPathValue::Number(round_half_up(n))),

        _ => Err(XPathError::function(name, "unknown function")),
    }
}

fn arity<N>(name: &str, args: &Args<N>, expected: RangeInclusive<usize>) -> Result<(), XPathError> {
    if expected.contains(&args.len()) {
        return Ok(());
    }
    let (min, max) = (*expected.start(), *expected.end());
    let message = if min == max {
        format!("expected {} argument(s), got {}", min, args.len())
    } else if max == usize::MAX {
        format!("expected at least {} arguments, got {}", min, args.len())
    } else {
        format!("expected {} to {} arguments, got {}", min, max, args.len())
    };
    Err(XPathError::function(name, message))
}

fn node_set_arg<N: std::fmt::Debug>(name: &str, mut args: Args<N>) -> Result<Vec<N>, XPathError> {
    match args.remove(0) {
        XPathValue::NodeSet(nodes) => Ok(nodes),
        other => Err(XPathError::TypeError(format!(
            "{}() expects a node-set, got {:?}",
            name, other
        ))),
    }
}

/// The first node of the argument, or the context node when called without one.
fn optional_node_arg<'a, N: DocumentNode<'a>>(
    name: &str,
    args: Args<N>,
    ctx: &EvaluationContext<N>,
) -> Result<Option<N>, XPathError> {
    arity(name, &args, 0..=1)?;
    if args.is_empty() {
        return Ok(Some(ctx.context_node));
    }
    Ok(node_set_arg(name, args)?.first().copied())
}

fn string_or_context<'a, N: DocumentNode<'a>>(args: Args<N>, ctx: &EvaluationContext<N>) -> String {
    match args.first() {
        Some(arg) => arg.to_string(),
        None => ctx.context_node.string_value(),
    }
}

fn two_strings<'a, N: DocumentNode<'a>>(name: &str, args: Args<N>) -> Result<(String, String), XPathError> {
    arity(name, &args, 2..=2)?;
    Ok((args[0].to_string(), args[1].to_string()))
}

fn one_number<'a, N: DocumentNode<'a>>(name: &str, args: Args<N>) -> Result<f64, XPathError> {
    arity(name, &args, 1..=1)?;
    Ok(args[0].to_number())
}

/// XPath rounds halves towards positive infinity; NaN, infinities and zeros pass through.
/// XML whitespace only: other Unicode spaces are ordinary characters.
fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Ties round toward positive infinity; results in [-0.5, 0) keep their sign as -0.
fn round_half_up(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() || n == 0.0 {
        return n;
    }
    let floor = n.floor();
    let rounded = if n - floor >= 0.5 { floor + 1.0 } else { floor };
    if rounded == 0.0 { 0.0_f64.copysign(n) } else { rounded }
}

fn func_substring<'a, N: DocumentNode<'a>>(args: Args<N>) -> Result<XPathValue<N>, XPathError> {
    arity("substring", &args, 2..=3)?;
    let s = args[0].to_string();
    let first = round_half_up(args[1].to_number());
    let end = match args.get(2) {
        Some(length) => first + round_half_up(length.to_number()),
        None => f64::INFINITY,
    };
    // Comparisons with NaN are false, which yields "" as required.
    let result = s
        .chars()
        .enumerate()
        .filter(|(i, _)| {
            let position = (*i + 1) as f64;
            position >= first && position < end
        })
        .map(|(_, c)| c)
        .collect();
    Ok(XPathValue::String(result))
}

fn func_translate<'a, N: DocumentNode<'a>>(args: Args<N>) -> Result<XPathValue<N>, XPathError> {
    arity("translate", &args, 3..=3)?;
    let from: Vec<char> = args[1].to_string().chars().collect();
    let to: Vec<char> = args[2].to_string().chars().collect();
    let result = args[0]
        .to_string()
        .chars()
        .filter_map(|c| match from.iter().position(|&f| f == c) {
            Some(index) => to.get(index).copied(),
            None => Some(c),
        })
        .collect();
    Ok(XPathValue::String(result))
}

/// Elements whose `id` (or `xml:id`) attribute matches one of the whitespace-separated tokens.
fn func_id<'a, N: DocumentNode<'a> + 'a>(
    args: Args<N>,
    ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    arity("id", &args, 1..=1)?;
    let tokens: String = match &args[0] {
        XPathValue::NodeSet(nodes) => nodes
            .iter()
            .map(|n| n.string_value())
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    };
    let wanted: HashSet<&str> = tokens.split_whitespace().collect();
    if wanted.is_empty() {
        return Ok(XPathValue::NodeSet(vec![]));
    }
    let matches = crate::axes::descendants(ctx.root_node)
        .into_iter()
        .filter(|n| n.node_type() == NodeType::Element)
        .filter(|n| {
            n.attributes().any(|attr| {
                attr.name().is_some_and(|q| {
                    q.local_part == "id" && matches!(q.prefix, None | Some("xml"))
                }) && wanted.contains(attr.string_value().as_str())
            })
        })
        .collect();
    Ok(XPathValue::NodeSet(into_document_order(matches)))
}

/// True when the nearest `xml:lang` in scope equals the argument or is a sub-language of it.
fn func_lang<'a, N: DocumentNode<'a>>(
    args: Args<N>,
    ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    arity("lang", &args, 1..=1)?;
    let wanted = args[0].to_string().to_lowercase();
    let mut current = Some(ctx.context_node);
    while let Some(node) = current {
        let declared = node.attributes().find(|attr| {
            attr.name()
                .is_some_and(|q| q.prefix == Some("xml") && q.local_part == "lang")
        });
        if let Some(attr) = declared {
            let lang = attr.string_value().to_lowercase();
            let matched = lang == wanted || lang.starts_with(&format!("{}-", wanted));
            return Ok(XPathValue::Boolean(matched));
        }
        current = node.parent();
    }
    Ok(XPathValue::Boolean(false))
}
