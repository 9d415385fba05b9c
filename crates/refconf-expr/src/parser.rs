//! Expression grammar
//!
//! ```text
//! expr           := or ( "?" expr ":" expr )?
//! or             := and ( ("||" | "or") and )*
//! and            := not ( ("&&" | "and") not )*
//! not            := ("!" | "not") not | comparison
//! comparison     := additive ( cmp_op additive )?
//! additive       := multiplicative ( ("+" | "-") multiplicative )*
//! multiplicative := unary ( ("*" | "//" | "/" | "%") unary )*
//! unary          := "-" unary | power
//! power          := postfix ( "**" unary )?
//! postfix        := primary ( "[" expr "]" | "." ident ( "(" args ")" )? )*
//! primary        := number | string | "true" | "false" | "null"
//!                 | list | map | ident "(" args ")" | ident | "(" expr ")"
//! ```

use std::cell::Cell;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{escaped_transform, tag},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, none_of, one_of, satisfy},
    combinator::{all_consuming, cut, map, not, opt, recognize, value, verify},
    error::{ErrorKind, ParseError, VerboseError, VerboseErrorKind},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
};
use serde_json::{Number, Value};

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{ExprError, Result};

type Res<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

const RESERVED: &[&str] = &["true", "false", "null", "and", "or", "not", "in"];

/// Deepest grouping (parentheses, brackets, calls, exponents) the parser
/// will recurse into.
const MAX_NESTING: usize = 32;
/// Most operators, prefixes or suffixes in one chain such as `a + b + c`.
const MAX_CHAIN: usize = 64;
/// Deepest syntax tree the evaluator is handed.
const MAX_DEPTH: usize = 256;

const TOO_DEEP: &str = "expression nested too deeply";

thread_local! {
    static NESTING: Cell<usize> = const { Cell::new(0) };
}

// ============================================================================
// Public API
// ============================================================================

/// Parse the text of one expression block.
///
/// # Errors
///
/// Returns [`ExprError::Syntax`] naming the offending text when the input is
/// not a single complete expression.
pub fn parse_expression(input: &str) -> Result<Expr> {
    match all_consuming(delimited(multispace0, expression, multispace0))(input) {
        Ok((_, expr)) if expr.depth() > MAX_DEPTH => Err(ExprError::Syntax {
            text: input.trim().to_string(),
            message: TOO_DEEP.to_string(),
        }),
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(ExprError::Syntax {
            text: input.trim().to_string(),
            message: if is_too_deep(&e) {
                TOO_DEEP.to_string()
            } else {
                describe(input, &e)
            },
        }),
        Err(nom::Err::Incomplete(_)) => Err(ExprError::Syntax {
            text: input.trim().to_string(),
            message: "incomplete input".to_string(),
        }),
    }
}

fn describe(input: &str, error: &VerboseError<&str>) -> String {
    let Some((rest, kind)) = error.errors.first() else {
        return "invalid expression".to_string();
    };
    let what = match kind {
        VerboseErrorKind::Char(c) => format!("expected '{}'", c),
        VerboseErrorKind::Context(ctx) => format!("expected {}", ctx),
        VerboseErrorKind::Nom(_) => "unexpected input".to_string(),
    };
    let near: String = rest.chars().take(16).collect();
    if near.trim().is_empty() {
        format!("{} at end of input", what)
    } else {
        format!("{} at offset {} near `{}`", what, input.len() - rest.len(), near)
    }
}

fn is_too_deep(error: &VerboseError<&str>) -> bool {
    error
        .errors
        .iter()
        .any(|(_, kind)| matches!(kind, VerboseErrorKind::Context(ctx) if *ctx == TOO_DEEP))
}

// ============================================================================
// Limits
// ============================================================================

fn too_deep(input: &str) -> nom::Err<VerboseError<&str>> {
    nom::Err::Failure(VerboseError {
        errors: vec![(input, VerboseErrorKind::Context(TOO_DEEP))],
    })
}

/// Run `rule` one grouping level deeper.
fn nested<'a, O>(input: &'a str, rule: fn(&'a str) -> Res<'a, O>) -> Res<'a, O> {
    let depth = NESTING.with(Cell::get);
    if depth >= MAX_NESTING {
        return Err(too_deep(input));
    }
    NESTING.with(|n| n.set(depth + 1));
    let result = rule(input);
    NESTING.with(|n| n.set(depth));
    result
}

fn limit_chain(input: &str, links: usize) -> std::result::Result<(), nom::Err<VerboseError<&str>>> {
    if links > MAX_CHAIN {
        Err(too_deep(input))
    } else {
        Ok(())
    }
}

// ============================================================================
// Tokens
// ============================================================================

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> Res<'a, O>
where
    F: FnMut(&'a str) -> Res<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn token<'a>(symbol: &'static str) -> impl FnMut(&'a str) -> Res<'a, &'a str> {
    ws(tag(symbol))
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> Res<'a, &'a str> {
    ws(terminated(tag(word), not(satisfy(is_ident_char))))
}

fn identifier(input: &str) -> Res<&str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn name(input: &str) -> Res<&str> {
    verify(identifier, |word: &str| !RESERVED.contains(&word))(input)
}

// ============================================================================
// Operators, loosest first
// ============================================================================

fn fold_binary(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    rest.into_iter().fold(first, |left, (op, right)| Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

fn expression(input: &str) -> Res<Expr> {
    nested(input, conditional)
}

fn conditional(input: &str) -> Res<Expr> {
    let (input, condition) = or_expr(input)?;
    let (input, branches) = opt(pair(
        preceded(token("?"), cut(expression)),
        preceded(cut(token(":")), cut(expression)),
    ))(input)?;

    let expr = match branches {
        Some((then, otherwise)) => Expr::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        },
        None => condition,
    };
    Ok((input, expr))
}

fn or_expr(input: &str) -> Res<Expr> {
    let (input, first) = and_expr(input)?;
    let (input, rest) = many0(pair(
        value(BinaryOp::Or, alt((token("||"), keyword("or")))),
        cut(and_expr),
    ))(input)?;
    limit_chain(input, rest.len())?;
    Ok((input, fold_binary(first, rest)))
}

fn and_expr(input: &str) -> Res<Expr> {
    let (input, first) = not_expr(input)?;
    let (input, rest) = many0(pair(
        value(BinaryOp::And, alt((token("&&"), keyword("and")))),
        cut(not_expr),
    ))(input)?;
    limit_chain(input, rest.len())?;
    Ok((input, fold_binary(first, rest)))
}

fn not_expr(input: &str) -> Res<Expr> {
    let (input, negations) = many0(alt((
        keyword("not"),
        terminated(token("!"), not(char('='))),
    )))(input)?;
    limit_chain(input, negations.len())?;
    let (input, operand) = if negations.is_empty() {
        comparison(input)?
    } else {
        cut(comparison)(input)?
    };
    let expr = negations.into_iter().fold(operand, |operand, _| Expr::Unary {
        op: UnaryOp::Not,
        operand: Box::new(operand),
    });
    Ok((input, expr))
}

fn comparison_op(input: &str) -> Res<BinaryOp> {
    alt((
        value(BinaryOp::Eq, token("==")),
        value(BinaryOp::Ne, token("!=")),
        value(BinaryOp::Le, token("<=")),
        value(BinaryOp::Ge, token(">=")),
        value(BinaryOp::Lt, token("<")),
        value(BinaryOp::Gt, token(">")),
        value(BinaryOp::In, keyword("in")),
    ))(input)
}

fn comparison(input: &str) -> Res<Expr> {
    let (input, left) = additive(input)?;
    let (input, right) = opt(pair(comparison_op, cut(additive)))(input)?;
    let expr = match right {
        Some((op, right)) => fold_binary(left, vec![(op, right)]),
        None => left,
    };
    Ok((input, expr))
}

fn additive(input: &str) -> Res<Expr> {
    let (input, first) = multiplicative(input)?;
    let (input, rest) = many0(pair(
        alt((
            value(BinaryOp::Add, token("+")),
            value(BinaryOp::Sub, token("-")),
        )),
        cut(multiplicative),
    ))(input)?;
    limit_chain(input, rest.len())?;
    Ok((input, fold_binary(first, rest)))
}

fn multiplicative(input: &str) -> Res<Expr> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(pair(
        alt((
            value(BinaryOp::Mul, ws(terminated(tag("*"), not(char('*'))))),
            value(BinaryOp::FloorDiv, token("//")),
            value(BinaryOp::Div, token("/")),
            value(BinaryOp::Mod, token("%")),
        )),
        cut(unary),
    ))(input)?;
    limit_chain(input, rest.len())?;
    Ok((input, fold_binary(first, rest)))
}

fn unary(input: &str) -> Res<Expr> {
    let (input, signs) = many0(token("-"))(input)?;
    limit_chain(input, signs.len())?;
    let (input, operand) = if signs.is_empty() {
        power(input)?
    } else {
        cut(power)(input)?
    };
    let expr = signs.into_iter().fold(operand, |operand, _| Expr::Unary {
        op: UnaryOp::Neg,
        operand: Box::new(operand),
    });
    Ok((input, expr))
}

fn power(input: &str) -> Res<Expr> {
    let (input, base) = postfix(input)?;
    let (input, exponent) = opt(preceded(token("**"), cut(raised)))(input)?;
    let expr = match exponent {
        Some(exponent) => fold_binary(base, vec![(BinaryOp::Pow, exponent)]),
        None => base,
    };
    Ok((input, expr))
}

/// Right operand of `**`. Right-associative chains recurse here.
fn raised(input: &str) -> Res<Expr> {
    nested(input, unary)
}

enum Suffix {
    Index(Expr),
    Member(String),
    Method(String, Vec<Expr>),
}

fn suffix(input: &str) -> Res<Suffix> {
    alt((
        map(
            delimited(token("["), cut(expression), cut(token("]"))),
            Suffix::Index,
        ),
        map(
            pair(
                preceded(token("."), identifier),
                opt(delimited(token("("), arguments, cut(token(")")))),
            ),
            |(name, args)| match args {
                Some(args) => Suffix::Method(name.to_string(), args),
                None => Suffix::Member(name.to_string()),
            },
        ),
    ))(input)
}

fn postfix(input: &str) -> Res<Expr> {
    let (input, base) = primary(input)?;
    let (input, suffixes) = many0(suffix)(input)?;
    limit_chain(input, suffixes.len())?;
    let expr = suffixes
        .into_iter()
        .fold(base, |target, suffix| match suffix {
            Suffix::Index(index) => Expr::Index {
                target: Box::new(target),
                index: Box::new(index),
            },
            Suffix::Member(name) => Expr::Member {
                target: Box::new(target),
                name,
            },
            Suffix::Method(function, args) => {
                let mut all = Vec::with_capacity(args.len() + 1);
                all.push(target);
                all.extend(args);
                Expr::Call {
                    function,
                    args: all,
                }
            }
        });
    Ok((input, expr))
}

// ============================================================================
// Primaries
// ============================================================================

fn primary(input: &str) -> Res<Expr> {
    ws(alt((
        number,
        map(string_literal, |s| Expr::Literal(Value::String(s))),
        value(Expr::Literal(Value::Bool(true)), keyword("true")),
        value(Expr::Literal(Value::Bool(false)), keyword("false")),
        value(Expr::Literal(Value::Null), keyword("null")),
        list_literal,
        map_literal,
        call,
        map(name, |n| Expr::Name(n.to_string())),
        delimited(char('('), ws(expression), cut(char(')'))),
    )))(input)
}

fn arguments(input: &str) -> Res<Vec<Expr>> {
    terminated(separated_list0(token(","), expression), opt(token(",")))(input)
}

fn call(input: &str) -> Res<Expr> {
    map(
        pair(
            name,
            delimited(token("("), arguments, cut(token(")"))),
        ),
        |(function, args)| Expr::Call {
            function: function.to_string(),
            args,
        },
    )(input)
}

fn list_literal(input: &str) -> Res<Expr> {
    map(
        delimited(char('['), ws(arguments), cut(char(']'))),
        Expr::List,
    )(input)
}

fn map_literal(input: &str) -> Res<Expr> {
    let entry = separated_pair(expression, cut(token(":")), cut(expression));
    map(
        delimited(
            char('{'),
            ws(terminated(separated_list0(token(","), entry), opt(token(",")))),
            cut(char('}')),
        ),
        Expr::Map,
    )(input)
}

fn number(input: &str) -> Res<Expr> {
    let (rest, text) = recognize(tuple((
        digit1,
        opt(pair(char('.'), digit1)),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)?;

    let is_float = text.contains(['.', 'e', 'E']);
    let parsed = if is_float {
        None
    } else {
        text.parse::<i64>().ok().map(Value::from)
    };
    let literal = match parsed {
        Some(value) => value,
        None => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| {
                nom::Err::Error(VerboseError::from_error_kind(input, ErrorKind::Float))
            })?,
    };
    Ok((rest, Expr::Literal(literal)))
}

fn escape(input: &str) -> Res<char> {
    alt((
        value('\n', char('n')),
        value('\r', char('r')),
        value('\t', char('t')),
        value('\\', char('\\')),
        value('/', char('/')),
        value('"', char('"')),
        value('\'', char('\'')),
    ))(input)
}

fn string_literal(input: &str) -> Res<String> {
    alt((
        delimited(
            char('"'),
            map(
                opt(escaped_transform(none_of("\"\\"), '\\', escape)),
                |s: Option<String>| s.unwrap_or_default(),
            ),
            char('"'),
        ),
        delimited(
            char('\''),
            map(
                opt(escaped_transform(none_of("'\\"), '\\', escape)),
                |s: Option<String>| s.unwrap_or_default(),
            ),
            char('\''),
        ),
    ))(input)
}
