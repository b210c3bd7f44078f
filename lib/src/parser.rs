//! A parser for the formula language, utilising nom.
//!
//! Grammar, from the loosest to the tightest binding connective:
//! ```text
//! statement  := classical [ "~>" classical ]
//! classical  := iff
//! iff        := implies { "<=>" implies }
//! implies    := or [ "=>" implies ]
//! or         := and { "||" and }
//! and        := unary { "&&" unary }
//! unary      := "!" unary | "(" classical ")" | atom
//! atom       := [A-Za-z0-9_]+
//! ```
//! The defeasible connective `~>` is only permitted once and only at the top level.
//! Its placement is validated before the classical sides are handed to the nom parsers,
//! so that misplaced `~>` is reported as [MalformedDefeasibleImplication][Error::MalformedDefeasibleImplication].

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::multispace0,
    combinator::{all_consuming, map, opt},
    multi::many0,
    sequence::{delimited, preceded, terminated},
    IResult,
};

use crate::{
    datatypes::Formula,
    error::{Error, Result},
};

const DEFEASIBLE: &str = "~>";

/// Parses a single statement (classical formula or defeasible implication).
pub fn parse_formula(input: &str) -> Result<Formula> {
    let trimmed = input.trim();
    match defeasible_marker(trimmed)? {
        None => parse_classical(trimmed, input),
        Some(pos) => {
            let antecedent = trimmed[..pos].trim();
            let consequent = trimmed[pos + DEFEASIBLE.len()..].trim();
            if antecedent.is_empty() {
                return Err(malformed_defeasible(input, "the antecedent is empty"));
            }
            if consequent.is_empty() {
                return Err(malformed_defeasible(input, "the consequent is empty"));
            }
            Ok(Formula::defeasible(
                parse_classical(antecedent, input)?,
                parse_classical(consequent, input)?,
            ))
        }
    }
}

/// Parses a formula and fails if it is not a defeasible implication.
pub fn parse_query(input: &str) -> Result<Formula> {
    let formula = parse_formula(input)?;
    if formula.is_defeasible() {
        Ok(formula)
    } else {
        Err(malformed_defeasible(
            input,
            "a query has to be a defeasible implication",
        ))
    }
}

/// Parses a knowledge base, given as one statement per line.
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_lines(input: &str) -> Result<Vec<Formula>> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(parse_formula)
        .collect()
}

fn malformed_defeasible(input: &str, reason: &str) -> Error {
    Error::MalformedDefeasibleImplication {
        formula: input.to_string(),
        reason: reason.to_string(),
    }
}

/// Locates the single top-level `~>`, if any.
fn defeasible_marker(input: &str) -> Result<Option<usize>> {
    let mut depth: i64 = 0;
    let mut found = None;
    let bytes = input.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'(' => depth += 1,
            b')' => depth -= 1,
            b'~' if bytes.get(idx + 1) == Some(&b'>') => {
                if depth != 0 {
                    return Err(malformed_defeasible(
                        input,
                        "`~>` may not be nested inside a formula",
                    ));
                }
                if found.is_some() {
                    return Err(malformed_defeasible(input, "`~>` may only occur once"));
                }
                found = Some(idx);
                idx += 1;
            }
            _ => {}
        }
        idx += 1;
    }
    Ok(found)
}

fn parse_classical(input: &str, original: &str) -> Result<Formula> {
    all_consuming(ws(classical))(input)
        .map(|(_, formula)| formula)
        .map_err(|e| Error::MalformedFormula {
            formula: original.to_string(),
            reason: match e {
                nom::Err::Error(err) | nom::Err::Failure(err) => {
                    if err.input.is_empty() {
                        "unexpected end of input".to_string()
                    } else {
                        format!("unexpected input at `{}`", err.input)
                    }
                }
                nom::Err::Incomplete(_) => "incomplete input".to_string(),
            },
        })
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn classical(input: &str) -> IResult<&str, Formula> {
    iff(input)
}

fn iff(input: &str) -> IResult<&str, Formula> {
    let (input, first) = implies(input)?;
    let (input, rest) = many0(preceded(ws(tag("<=>")), implies))(input)?;
    Ok((input, rest.into_iter().fold(first, Formula::iff)))
}

fn implies(input: &str) -> IResult<&str, Formula> {
    let (input, lhs) = or(input)?;
    let (input, rhs) = opt(preceded(ws(tag("=>")), implies))(input)?;
    Ok((
        input,
        match rhs {
            Some(rhs) => Formula::implies(lhs, rhs),
            None => lhs,
        },
    ))
}

fn or(input: &str) -> IResult<&str, Formula> {
    let (input, first) = and(input)?;
    let (input, rest) = many0(preceded(ws(tag("||")), and))(input)?;
    Ok((input, rest.into_iter().fold(first, Formula::or)))
}

fn and(input: &str) -> IResult<&str, Formula> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(preceded(ws(tag("&&")), unary))(input)?;
    Ok((input, rest.into_iter().fold(first, Formula::and)))
}

fn unary(input: &str) -> IResult<&str, Formula> {
    ws(alt((
        map(preceded(tag("!"), unary), Formula::not),
        delimited(tag("("), classical, terminated(tag(")"), multispace0)),
        atom,
    )))(input)
}

fn atom(input: &str) -> IResult<&str, Formula> {
    map(
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        Formula::atom,
    )(input)
}
