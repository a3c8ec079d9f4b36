//! A `nom`-based compiler for the `[?( ... )]` filter language.
//!
//! Every atomic predicate is canonicalized so that the `@`-relative path is its left
//! operand. `&&` binds tighter than `||`, and parentheses group.
use super::ast::{CompareOp, Operand, PathStep, Pattern, Predicate, RelativePath, SetOp};
use crate::config::EngineConfig;
use crate::error::JPathError;
use crate::parser::{is_token_char, parse_path, quoted, token, ws};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{
        char, digit0, digit1, multispace0, one_of, satisfy, u64 as nom_u64,
    },
    combinator::{map, map_opt, map_res, not, opt, recognize, value},
    multi::{many0, separated_list0},
    sequence::{delimited, preceded, terminated},
};
use serde_json::{Number, Value};

// --- Main Public Compiler ---

pub fn compile_filter(input: &str) -> Result<Predicate, JPathError> {
    compile_filter_with(input, &EngineConfig::default())
}

pub fn compile_filter_with(input: &str, config: &EngineConfig) -> Result<Predicate, JPathError> {
    if nesting_depth(input) > config.max_depth {
        return Err(JPathError::DepthLimitExceeded(config.max_depth));
    }
    match or_expr(input.trim()) {
        Ok(("", predicate)) => Ok(predicate),
        Ok((rem, _)) => Err(JPathError::ungrammatical(
            input,
            format!("no predicate matches '{}'", rem),
        )),
        Err(e) => Err(JPathError::ungrammatical(input, e.to_string())),
    }
}

/// Deepest bracket/parenthesis nesting outside quoted strings and regex literals.
fn nesting_depth(input: &str) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(_), '\\') => {
                chars.next();
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '/') => quote = Some(c),
            (None, '(' | '[') => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

// --- Connectives ---

fn build_connective_parser<'a, F>(
    sub_expr_parser: F,
    connective: &'static str,
    join: fn(Vec<Predicate>) -> Predicate,
) -> impl FnMut(&'a str) -> IResult<&'a str, Predicate>
where
    F: Parser<&'a str, Output = Predicate, Error = nom::error::Error<&'a str>> + Clone,
{
    move |input: &'a str| {
        let (input, first) = sub_expr_parser.clone().parse(input)?;
        let (input, mut rest) =
            many0(preceded(ws(tag(connective)), sub_expr_parser.clone())).parse(input)?;

        if rest.is_empty() {
            return Ok((input, first));
        }
        rest.insert(0, first);
        Ok((input, join(rest)))
    }
}

fn or_expr(input: &str) -> IResult<&str, Predicate> {
    build_connective_parser(and_expr, "||", Predicate::Or)(input)
}

fn and_expr(input: &str) -> IResult<&str, Predicate> {
    build_connective_parser(unary, "&&", Predicate::And)(input)
}

fn unary(input: &str) -> IResult<&str, Predicate> {
    ws(alt((
        map(preceded(char('!'), ws(group)), |p| Predicate::Not(Box::new(p))),
        map(preceded(char('!'), relative_path), |path| {
            Predicate::Not(Box::new(Predicate::Truthy(path)))
        }),
        group,
        atom,
    )))
    .parse(input)
}

fn group(input: &str) -> IResult<&str, Predicate> {
    delimited(char('('), or_expr, char(')')).parse(input)
}

// --- Atomic Predicates ---

fn atom(input: &str) -> IResult<&str, Predicate> {
    alt((path_first, operand_first)).parse(input)
}

/// `@<path>` optionally followed by an operator and its operand.
fn path_first(input: &str) -> IResult<&str, Predicate> {
    let (input, path) = relative_path(input)?;
    let (input, tail) = opt(preceded(multispace0, path_tail)).parse(input)?;
    let predicate = match tail {
        None => Predicate::Truthy(path),
        Some(Tail::Regex(pattern)) => Predicate::Regex { path, pattern },
        Some(Tail::Compare(op, operand)) => Predicate::Compare { path, op, operand },
        Some(Tail::Set(op, operand)) => Predicate::Set { path, op, operand },
        Some(Tail::Size(size)) => Predicate::SizeEquals { path, size },
        Some(Tail::Empty) => Predicate::Empty(path),
    };
    Ok((input, predicate))
}

/// `<operand> <op> @<path>`, canonicalized so the path ends up on the left.
fn operand_first(input: &str) -> IResult<&str, Predicate> {
    let (input, operand) = operand(input)?;
    let (input, op) = ws(alt((
        map(compare_op, SwappableOp::Compare),
        map(set_op, SwappableOp::Set),
    )))
    .parse(input)?;
    let (input, path) = relative_path(input)?;
    let predicate = match op {
        SwappableOp::Compare(op) => Predicate::Compare {
            path,
            op: op.mirrored(),
            operand,
        },
        SwappableOp::Set(op) => Predicate::Set {
            path,
            op: op.mirrored(),
            operand,
        },
    };
    Ok((input, predicate))
}

#[derive(Clone)]
enum Tail {
    Regex(Pattern),
    Compare(CompareOp, Operand),
    Set(SetOp, Operand),
    Size(usize),
    Empty,
}

enum SwappableOp {
    Compare(CompareOp),
    Set(SetOp),
}

fn path_tail(input: &str) -> IResult<&str, Tail> {
    alt((
        map(preceded(ws(tag("=~")), regex_literal), Tail::Regex),
        map((compare_op, ws(operand)), |(op, operand)| {
            Tail::Compare(op, operand)
        }),
        map((set_op, ws(operand)), |(op, operand)| Tail::Set(op, operand)),
        map(preceded(keyword("size"), ws(nom_u64)), |n| {
            Tail::Size(n as usize)
        }),
        value(Tail::Empty, keyword("empty")),
    ))
    .parse(input)
}

// --- Operators ---

fn compare_op(input: &str) -> IResult<&str, CompareOp> {
    alt((
        value(CompareOp::Equals, tag("==")),
        value(CompareOp::NotEquals, tag("!=")),
        value(CompareOp::GreaterThanOrEqual, tag(">=")),
        value(CompareOp::LessThanOrEqual, tag("<=")),
        value(CompareOp::GreaterThan, tag(">")),
        value(CompareOp::LessThan, tag("<")),
        value(CompareOp::Equals, terminated(tag("="), not(char('~')))),
    ))
    .parse(input)
}

fn set_op(input: &str) -> IResult<&str, SetOp> {
    alt((
        value(SetOp::SubsetOf, keyword("subsetof")),
        value(SetOp::AnyOf, keyword("anyof")),
        value(SetOp::NoneOf, keyword("noneof")),
        value(SetOp::NotIn, keyword("nin")),
        value(SetOp::In, keyword("in")),
    ))
    .parse(input)
}

/// A word operator that is not the prefix of a longer name.
fn keyword<'a>(
    word: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    terminated(tag(word), not(satisfy(is_token_char)))
}

// --- Paths ---

fn relative_path(input: &str) -> IResult<&str, RelativePath> {
    map(
        preceded(
            char('@'),
            many0(alt((
                map(preceded(char('.'), token), |key: &str| {
                    PathStep::Key(key.to_string())
                }),
                map(delimited(char('['), ws(quoted), char(']')), |key: &str| {
                    PathStep::Key(key.to_string())
                }),
                map(delimited(char('['), ws(nom_u64), char(']')), |i| {
                    PathStep::Index(i as usize)
                }),
            ))),
        ),
        RelativePath,
    )
    .parse(input)
}

// --- Operands ---

fn operand(input: &str) -> IResult<&str, Operand> {
    alt((
        map(literal, Operand::Literal),
        map_res(sub_query, |text| parse_path(text).map(Operand::Query)),
    ))
    .parse(input)
}

/// The text of an absolute sub-query, up to the first unnested delimiter or operator character.
fn sub_query(input: &str) -> IResult<&str, &str> {
    let (_, _) = char('$').parse(input)?;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut end = input.len();
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        match (quote, c) {
            (Some(_), '\\') => {
                chars.next();
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '/') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') if depth > 0 => depth -= 1,
            (None, c) if depth == 0 && ends_sub_query(c) => {
                end = i;
                break;
            }
            _ => {}
        }
    }
    Ok((&input[end..], &input[..end]))
}

fn ends_sub_query(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            ')' | ']' | ',' | '&' | '|' | '=' | '!' | '<' | '>' | '~'
        )
}

fn literal(input: &str) -> IResult<&str, Value> {
    alt((null, boolean, number, string_literal, array_literal)).parse(input)
}

fn null(input: &str) -> IResult<&str, Value> {
    value(Value::Null, keyword("null")).parse(input)
}

fn boolean(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Bool(true), keyword("true")),
        value(Value::Bool(false), keyword("false")),
    ))
    .parse(input)
}

/// Integers stay integers while they fit `i64` or `u64`; fractions, exponents and
/// anything wider become floats.
fn number(input: &str) -> IResult<&str, Value> {
    map_opt(
        recognize((
            opt(char('-')),
            digit1,
            opt((char('.'), digit0)),
            opt((one_of("eE"), opt(one_of("+-")), digit1)),
        )),
        |text: &str| {
            let integer = if text.contains(['.', 'e', 'E']) {
                None
            } else {
                text.parse::<i64>()
                    .map(Value::from)
                    .or_else(|_| text.parse::<u64>().map(Value::from))
                    .ok()
            };
            integer.or_else(|| {
                text.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
            })
        },
    )
    .parse(input)
}

/// A single- or double-quoted string; a backslash takes the next character literally.
fn string_literal(input: &str) -> IResult<&str, Value> {
    let (body, quote) = one_of("'\"").parse(input)?;
    let mut text = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => text.push(escaped),
                None => break,
            },
            c if c == quote => return Ok((&body[i + 1..], Value::String(text))),
            c => text.push(c),
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn array_literal(input: &str) -> IResult<&str, Value> {
    map(
        delimited(
            char('['),
            separated_list0(char(','), ws(literal)),
            preceded(multispace0, char(']')),
        ),
        Value::Array,
    )
    .parse(input)
}

/// `/body/` or `/body/i`, compiled on the spot.
fn regex_literal(input: &str) -> IResult<&str, Pattern> {
    map_res(raw_regex, |(body, case_insensitive)| {
        Pattern::new(&body.replace("\\/", "/"), case_insensitive)
    })
    .parse(input)
}

fn raw_regex(input: &str) -> IResult<&str, (&str, bool)> {
    let (body, _) = char('/').parse(input)?;
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '/' => {
                let (rest, flag) = opt(char('i')).parse(&body[i + 1..])?;
                return Ok((rest, (&body[..i], flag.is_some())));
            }
            _ => {}
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}
