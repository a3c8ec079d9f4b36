//! A `nom`-based tokenizer that turns a JSONPath expression into an ordered list of segments.
//!
//! Segment grammars are tried in a fixed order against the remaining text: root, filter,
//! function call, bracket forms, recursive descent, dot access and finally a bare token.
use super::ast::Segment;
use crate::config::EngineConfig;
use crate::error::JPathError;
use crate::filter::compile_filter_with;
use crate::functions::Function;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, i64 as nom_i64, multispace0, u64 as nom_u64},
    combinator::{map, opt, value},
    multi::separated_list1,
    sequence::{delimited, preceded, separated_pair, terminated},
};

// --- Main Public Parser ---

pub fn parse_path(input: &str) -> Result<Vec<Segment>, JPathError> {
    parse_path_with(input, &EngineConfig::default())
}

/// Tokenizes the whole expression, compiling any filters it contains.
pub fn parse_path_with(input: &str, config: &EngineConfig) -> Result<Vec<Segment>, JPathError> {
    let mut remaining = input.trim();
    let mut segments = Vec::new();
    while !remaining.is_empty() {
        let (rest, segment) = next_segment(remaining, config)?;
        segments.push(segment);
        remaining = rest;
    }
    Ok(segments)
}

fn next_segment<'a>(
    input: &'a str,
    config: &EngineConfig,
) -> Result<(&'a str, Segment), JPathError> {
    if let Ok((rest, body)) = filter_body(input) {
        let predicate = compile_filter_with(body, config)?;
        return Ok((rest, Segment::Filter(predicate)));
    }
    if let Ok((rest, name)) = function_call(input) {
        let function = Function::from_name(name)
            .ok_or_else(|| JPathError::UnknownFunction(name.to_string()))?;
        return Ok((rest, Segment::Function(function)));
    }
    segment(input).map_err(|_| JPathError::UnrecognizedSegment(input.to_string()))
}

// --- Shared Lexical Helpers ---

pub(crate) fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// A property name, or the digits of a bare index.
pub(crate) fn token(input: &str) -> IResult<&str, &str> {
    take_while1(is_token_char).parse(input)
}

/// A non-empty single- or double-quoted key.
pub(crate) fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), take_while1(|c| c != '\''), char('\'')),
        delimited(char('"'), take_while1(|c| c != '"'), char('"')),
    ))
    .parse(input)
}

/// A combinator that takes a parser `inner` and produces a parser that consumes surrounding whitespace.
pub(crate) fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

// --- Segment Parsers ---

/// Recognizes `[?( ... )]` and yields the text between `[?(` and the `)]` that closes it.
/// Quoted strings, `/regex/` literals and nested brackets inside the body are skipped over.
fn filter_body(input: &str) -> IResult<&str, &str> {
    let (body, _) = tag("[?(").parse(input)?;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match (quote, c) {
            (Some(_), '\\') => {
                chars.next();
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '/') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')') if depth == 0 => {
                return match body[i + 1..].strip_prefix(']') {
                    Some(rest) => Ok((rest, &body[..i])),
                    None => Err(nom::Err::Error(nom::error::Error::new(
                        input,
                        nom::error::ErrorKind::Tag,
                    ))),
                };
            }
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Eof,
    )))
}

/// `name()` with an optional leading dot; yields the name.
fn function_call(input: &str) -> IResult<&str, &str> {
    preceded(opt(char('.')), terminated(token, tag("()"))).parse(input)
}

fn bracket_key(input: &str) -> IResult<&str, Segment> {
    map(delimited(char('['), ws(quoted), char(']')), |key: &str| {
        Segment::BracketKey(key.to_string())
    })
    .parse(input)
}

fn index_list(input: &str) -> IResult<&str, Segment> {
    map(
        delimited(
            char('['),
            separated_list1(char(','), ws(nom_u64)),
            char(']'),
        ),
        |indices| Segment::IndexList(indices.into_iter().map(|i| i as usize).collect()),
    )
    .parse(input)
}

fn wildcard_or_slice(input: &str) -> IResult<&str, Segment> {
    alt((
        value(Segment::Wildcard, tag("[*]")),
        map(
            delimited(
                char('['),
                separated_pair(opt(nom_i64), char(':'), opt(nom_i64)),
                char(']'),
            ),
            |(start, end)| Segment::Slice { start, end },
        ),
    ))
    .parse(input)
}

fn recursive_descent(input: &str) -> IResult<&str, Segment> {
    map(
        preceded(tag(".."), opt(alt((tag("[*]"), tag("*"))))),
        |suffix| Segment::RecursiveDescent {
            include_leaves: suffix.is_some(),
        },
    )
    .parse(input)
}

fn dot(input: &str) -> IResult<&str, Segment> {
    map(
        preceded(
            char('.'),
            opt(alt((
                value(Segment::DotWildcard, char('*')),
                map(token, |name: &str| {
                    if name.bytes().all(|b| b.is_ascii_digit()) {
                        Segment::BareToken(name.to_string())
                    } else {
                        Segment::DotKey(name.to_string())
                    }
                }),
            ))),
        ),
        |segment| segment.unwrap_or(Segment::Current),
    )
    .parse(input)
}

fn segment(input: &str) -> IResult<&str, Segment> {
    alt((
        value(Segment::Root, char('$')),
        bracket_key,
        index_list,
        wildcard_or_slice,
        recursive_descent,
        dot,
        map(token, |t: &str| Segment::BareToken(t.to_string())),
    ))
    .parse(input)
}
