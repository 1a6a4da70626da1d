//! A `nom`-based parser for the XPath 1.0 expression language.

use super::ast::*;
use crate::error::XPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0, satisfy},
    combinator::{map, map_res, not, opt, peek, recognize, value},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated},
};

type PResult<'a, O> = IResult<&'a str, O>;

pub fn parse_expression(input: &str) -> Result<Expression, XPathError> {
    match expression(input.trim()) {
        Ok(("", expr)) => Ok(expr),
        Ok((rest, _)) => Err(XPathError::XPathParse(
            input.to_string(),
            format!("unexpected input at '{}'", rest),
        )),
        Err(e) => Err(XPathError::XPathParse(input.to_string(), e.to_string())),
    }
}

// --- Helpers ---

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

/// An operator name such as `and` or `div`, which must not run into a following name.
fn keyword<'a>(word: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    terminated(tag(word), not(satisfy(is_name_char)))
}

/// Folds `operand (op operand)*` into a left-associative tree.
fn left_assoc<'a>(
    input: &'a str,
    operand: fn(&'a str) -> PResult<'a, Expression>,
    operator: fn(&'a str) -> PResult<'a, BinaryOperator>,
) -> PResult<'a, Expression> {
    let (input, first) = operand(input)?;
    let (input, rest) = many0(pair(ws(operator), operand)).parse(input)?;
    let expr = rest
        .into_iter()
        .fold(first, |left, (op, right)| Expression::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        });
    Ok((input, expr))
}

// --- Operators, lowest precedence first ---

fn expression(input: &str) -> PResult<'_, Expression> {
    or_expr(input)
}

fn or_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, and_expr, |i| {
        value(BinaryOperator::Or, keyword("or")).parse(i)
    })
}

fn and_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, equality_expr, |i| {
        value(BinaryOperator::And, keyword("and")).parse(i)
    })
}

fn equality_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, relational_expr, |i| {
        alt((
            value(BinaryOperator::NotEquals, tag("!=")),
            value(BinaryOperator::Equals, tag("=")),
        ))
        .parse(i)
    })
}

fn relational_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, additive_expr, |i| {
        alt((
            value(BinaryOperator::LessThanOrEqual, tag("<=")),
            value(BinaryOperator::GreaterThanOrEqual, tag(">=")),
            value(BinaryOperator::LessThan, tag("<")),
            value(BinaryOperator::GreaterThan, tag(">")),
        ))
        .parse(i)
    })
}

fn additive_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, multiplicative_expr, |i| {
        alt((
            value(BinaryOperator::Plus, char('+')),
            value(BinaryOperator::Minus, char('-')),
        ))
        .parse(i)
    })
}

fn multiplicative_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, unary_expr, |i| {
        alt((
            value(BinaryOperator::Multiply, char('*')),
            value(BinaryOperator::Divide, keyword("div")),
            value(BinaryOperator::Modulo, keyword("mod")),
        ))
        .parse(i)
    })
}

fn unary_expr(input: &str) -> PResult<'_, Expression> {
    let (input, _) = multispace0(input)?;
    if let Ok((rest, _)) = char::<&str, nom::error::Error<&str>>('-')(input) {
        let (rest, operand) = unary_expr(rest)?;
        return Ok((rest, Expression::Negate(Box::new(operand))));
    }
    union_expr(input)
}

fn union_expr(input: &str) -> PResult<'_, Expression> {
    left_assoc(input, path_expr, |i| {
        value(BinaryOperator::Union, char('|')).parse(i)
    })
}

// --- Paths ---

/// A location path, or a filter expression optionally continued by `/step`s.
///
/// Primary expressions are tried first so that `name()` is read as a call
/// and not as a step named `name`.
fn path_expr(input: &str) -> PResult<'_, Expression> {
    let (i, start) = alt((filter_expr, map(location_path, Expression::LocationPath))).parse(input)?;
    let (i, tail) = many0(pair(alt((tag("//"), tag("/"))), step)).parse(i)?;
    let (i, _) = multispace0(i)?;

    if tail.is_empty() {
        return Ok((i, start));
    }

    let (start_point, is_absolute, mut steps) = match start {
        Expression::LocationPath(lp) => (lp.start_point, lp.is_absolute, lp.steps),
        other => (Some(Box::new(other)), false, vec![]),
    };
    append_steps(&mut steps, tail);

    Ok((
        i,
        Expression::LocationPath(LocationPath {
            start_point,
            is_absolute,
            steps,
        }),
    ))
}

fn append_steps(steps: &mut Vec<Step>, tail: Vec<(&str, Step)>) {
    for (separator, next) in tail {
        if separator == "//" {
            steps.push(Step::descendant_or_self());
        }
        steps.push(next);
    }
}

fn filter_expr(input: &str) -> PResult<'_, Expression> {
    let (i, primary) = primary_expr(input)?;
    let (i, predicates) = many0(predicate).parse(i)?;
    if predicates.is_empty() {
        Ok((i, primary))
    } else {
        Ok((
            i,
            Expression::Filter {
                expr: Box::new(primary),
                predicates,
            },
        ))
    }
}

fn primary_expr(input: &str) -> PResult<'_, Expression> {
    ws(alt((
        map(number_literal, Expression::Number),
        map(string_literal, Expression::Literal),
        function_call,
        delimited(char('('), expression, ws(char(')'))),
    )))
    .parse(input)
}

fn location_path(input: &str) -> PResult<'_, LocationPath> {
    let (i, is_absolute, mut steps) = if let Ok((rest, _)) = tag::<&str, &str, nom::error::Error<&str>>("//")(input) {
        let (rest, first) = step(rest)?;
        (rest, true, vec![Step::descendant_or_self(), first])
    } else if let Ok((rest, _)) = char::<&str, nom::error::Error<&str>>('/')(input) {
        match step(rest) {
            Ok((rest, first)) => (rest, true, vec![first]),
            // A lone `/` selects the root.
            Err(_) => (rest, true, vec![]),
        }
    } else {
        let (rest, first) = step(input)?;
        (rest, false, vec![first])
    };

    let (i, tail) = many0(pair(alt((tag("//"), tag("/"))), step)).parse(i)?;
    append_steps(&mut steps, tail);

    Ok((
        i,
        LocationPath {
            start_point: None,
            is_absolute,
            steps,
        },
    ))
}

fn step(input: &str) -> PResult<'_, Step> {
    let (i, (axis, node_test)) = alt((
        value((Axis::Parent, NodeTest::NodeType(NodeTypeTest::Node)), tag("..")),
        value((Axis::SelfAxis, NodeTest::NodeType(NodeTypeTest::Node)), tag(".")),
        map(preceded(char('@'), node_test), |nt| (Axis::Attribute, nt)),
        map(pair(opt(axis), node_test), |(ax, nt)| (ax.unwrap_or(Axis::Child), nt)),
    ))
    .parse(input)?;
    let (i, predicates) = many0(predicate).parse(i)?;
    Ok((
        i,
        Step {
            axis,
            node_test,
            predicates,
        },
    ))
}

fn axis(input: &str) -> PResult<'_, Axis> {
    terminated(
        alt((
            value(Axis::AncestorOrSelf, tag("ancestor-or-self")),
            value(Axis::Ancestor, tag("ancestor")),
            value(Axis::Attribute, tag("attribute")),
            value(Axis::Child, tag("child")),
            value(Axis::DescendantOrSelf, tag("descendant-or-self")),
            value(Axis::Descendant, tag("descendant")),
            value(Axis::FollowingSibling, tag("following-sibling")),
            value(Axis::Following, tag("following")),
            value(Axis::Parent, tag("parent")),
            value(Axis::PrecedingSibling, tag("preceding-sibling")),
            value(Axis::Preceding, tag("preceding")),
            value(Axis::SelfAxis, tag("self")),
        )),
        tag("::"),
    )
    .parse(input)
}

fn predicate(input: &str) -> PResult<'_, Expression> {
    delimited(ws(char('[')), expression, ws(char(']'))).parse(input)
}

fn node_test(input: &str) -> PResult<'_, NodeTest> {
    alt((
        value(NodeTest::Wildcard, char('*')),
        node_type_test,
        map(terminated(nc_name, tag(":*")), |prefix| NodeTest::PrefixWildcard(prefix.to_string())),
        map(q_name, NodeTest::Name),
    ))
    .parse(input)
}

fn node_type_test(input: &str) -> PResult<'_, NodeTest> {
    alt((pi_target_test, bare_node_type_test)).parse(input)
}

fn pi_target_test(input: &str) -> PResult<'_, NodeTest> {
    delimited(
        pair(tag("processing-instruction"), ws(char('('))),
        ws(string_literal),
        char(')'),
    )
    .map(NodeTest::ProcessingInstructionTarget)
    .parse(input)
}

fn bare_node_type_test(input: &str) -> PResult<'_, NodeTest> {
    terminated(
        alt((
            value(NodeTypeTest::Text, tag("text")),
            value(NodeTypeTest::Node, tag("node")),
            value(NodeTypeTest::Comment, tag("comment")),
            value(NodeTypeTest::ProcessingInstruction, tag("processing-instruction")),
        )),
        pair(ws(char('(')), char(')')),
    )
    .map(NodeTest::NodeType)
    .parse(input)
}

// --- Names and literals ---

fn nc_name(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(is_name_char),
    ))
    .parse(input)
}

fn q_name(input: &str) -> PResult<'_, String> {
    map(recognize(pair(nc_name, opt(pair(char(':'), nc_name)))), str::to_string).parse(input)
}

/// `Digits ('.' Digits?)?` or `'.' Digits`. No sign, no exponent.
fn number_literal(input: &str) -> PResult<'_, f64> {
    map_res(
        recognize(alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        ))),
        |digits: &str| digits.parse::<f64>(),
    )
    .parse(input)
}

fn string_literal(input: &str) -> PResult<'_, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        str::to_string,
    )
    .parse(input)
}

fn function_call(input: &str) -> PResult<'_, Expression> {
    let (i, name) = q_name(input)?;
    // Only a name directly followed by `(` is a call; `foo/bar` is a path.
    let (i, _) = peek(ws(char('('))).parse(i)?;
    if matches!(
        name.as_str(),
        "text" | "node" | "comment" | "processing-instruction"
    ) {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    let (i, args) = delimited(
        ws(char('(')),
        separated_list0(ws(char(',')), expression),
        ws(char(')')),
    )
    .parse(i)?;
    Ok((i, Expression::FunctionCall { name, args }))
}
