use winnow::ascii::digit1;
use winnow::combinator::{alt, cut_err, not, opt, preceded, repeat, separated, terminated};
use winnow::error::{ContextError, ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_while};

use crate::{BinaryOp, Expr, Operand, OperandSymbol, RuleInfo, constant, group, operand, range};

/// A parsed rule: header identity plus condition, `None` meaning "always".
pub(super) type ParsedRule = (RuleInfo, Option<Expr>);

fn expected(what: &'static str) -> StrContext {
    StrContext::Expected(StrContextValue::Description(what))
}

// -- Whitespace & keywords --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., char::is_whitespace)
        .void()
        .parse_next(input)
}

fn keyword<'i>(word: &'static str) -> impl Parser<&'i str, &'i str, ErrMode<ContextError>> {
    terminated(word, not(one_of(|c: char| c.is_ascii_alphanumeric())))
}

// -- Header -----------------------------------------------------------------

#[derive(Clone, Copy)]
enum Key {
    RuleSet,
    Category,
    Culture,
    Case,
    Optional,
}

enum Field<'i> {
    Text(Key, &'i str),
    Optional(Option<bool>),
}

fn key(input: &mut &str) -> ModalResult<Key> {
    alt((
        "RuleSet".value(Key::RuleSet),
        "Category".value(Key::Category),
        "Culture".value(Key::Culture),
        "Case".value(Key::Case),
        "Optional".value(Key::Optional),
    ))
    .context(expected("header key"))
    .parse_next(input)
}

fn optional_flag(input: &mut &str) -> ModalResult<Option<bool>> {
    alt(("-1".value(None), "1".value(Some(true)), "0".value(Some(false))))
        .context(expected("optional flag (1, 0 or -1)"))
        .parse_next(input)
}

fn header_text<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_till(0.., [',', ']', '['])
        .map(str::trim)
        .parse_next(input)
}

fn field<'i>(input: &mut &'i str) -> ModalResult<Field<'i>> {
    ws.parse_next(input)?;
    let key = cut_err(key).parse_next(input)?;
    (ws, cut_err('=').context(expected("'='")), ws).parse_next(input)?;
    let field = match key {
        Key::Optional => Field::Optional(cut_err(optional_flag).parse_next(input)?),
        text_key => Field::Text(text_key, header_text.parse_next(input)?),
    };
    ws.parse_next(input)?;
    Ok(field)
}

fn header(input: &mut &str) -> ModalResult<RuleInfo> {
    '['.parse_next(input)?;
    let fields: Vec<Field<'_>> = separated(1.., field, ',').parse_next(input)?;
    cut_err(']').context(expected("']'")).parse_next(input)?;

    Ok(fields
        .into_iter()
        .fold(RuleInfo::new(), |info, field| match field {
            Field::Text(Key::RuleSet, text) => info.with_rule_set(text),
            Field::Text(Key::Category, text) => info.with_category(text),
            Field::Text(Key::Culture, text) => info.with_culture(text),
            Field::Text(Key::Case, text) => info.with_case(text),
            Field::Text(Key::Optional, _) => info,
            Field::Optional(flag) => info.with_optional(flag),
        }))
}

// -- Values -----------------------------------------------------------------

fn decimal(input: &mut &str) -> ModalResult<Operand> {
    (digit1, opt(('.', digit1)))
        .take()
        .try_map(|text: &str| text.parse::<Operand>())
        .context(expected("number"))
        .parse_next(input)
}

fn item(input: &mut &str) -> ModalResult<Expr> {
    let min = decimal.parse_next(input)?;
    let max = opt(preceded((ws, "..", ws), cut_err(decimal))).parse_next(input)?;
    Ok(match max {
        Some(max) => range(min, max),
        None => constant(min),
    })
}

/// A comma list with more than one item is a group.
fn value_list(input: &mut &str) -> ModalResult<Expr> {
    let mut items: Vec<Expr> = separated(1.., item, (ws, ',', ws)).parse_next(input)?;
    if items.len() == 1
        && let Some(single) = items.pop()
    {
        return Ok(single);
    }
    Ok(group(items))
}

// -- Conditions (precedence: or < and < relation) ----------------------------

fn symbol(input: &mut &str) -> ModalResult<OperandSymbol> {
    terminated(
        one_of(|c: char| c.is_ascii_alphabetic()).verify_map(OperandSymbol::from_char),
        not(one_of(|c: char| c.is_ascii_alphanumeric())),
    )
    .parse_next(input)
}

fn operand_expr(input: &mut &str) -> ModalResult<Expr> {
    let symbol = symbol.parse_next(input)?;
    let divisor = opt(preceded(
        (ws, alt(('%'.void(), keyword("mod").void())), ws),
        cut_err(decimal),
    ))
    .parse_next(input)?;
    Ok(match divisor {
        Some(divisor) => operand(symbol).modulo(divisor),
        None => operand(symbol),
    })
}

fn relation_op(input: &mut &str) -> ModalResult<BinaryOp> {
    alt((
        "!=".value(BinaryOp::NotEqual),
        "<=".value(BinaryOp::LessThanOrEqual),
        ">=".value(BinaryOp::GreaterThanOrEqual),
        "=".value(BinaryOp::Equal),
        "<".value(BinaryOp::LessThan),
        ">".value(BinaryOp::GreaterThan),
    ))
    .context(expected("relation operator"))
    .parse_next(input)
}

fn relation(input: &mut &str) -> ModalResult<Expr> {
    let left = operand_expr.parse_next(input)?;
    ws.parse_next(input)?;
    let op = cut_err(relation_op).parse_next(input)?;
    ws.parse_next(input)?;
    let right = cut_err(value_list).parse_next(input)?;
    Ok(Expr::binary(op, left, right))
}

fn and_condition(input: &mut &str) -> ModalResult<Expr> {
    let first = relation.parse_next(input)?;
    let rest: Vec<Expr> =
        repeat(0.., preceded((ws, keyword("and"), ws), cut_err(relation))).parse_next(input)?;
    Ok(rest.into_iter().fold(first, Expr::and))
}

fn or_condition(input: &mut &str) -> ModalResult<Expr> {
    let first = and_condition.parse_next(input)?;
    let rest: Vec<Expr> = repeat(
        0..,
        preceded((ws, keyword("or"), ws), cut_err(and_condition)),
    )
    .parse_next(input)?;
    Ok(rest.into_iter().fold(first, Expr::or))
}

fn condition(input: &mut &str) -> ModalResult<Option<Expr>> {
    alt((
        keyword("true").value(None),
        keyword("false").value(Some(constant(false))),
        or_condition.map(Some),
    ))
    .parse_next(input)
}

// -- Rules ------------------------------------------------------------------

/// Sample lists (`@integer 0, 2~16, …`) are informational only.
fn samples(input: &mut &str) -> ModalResult<()> {
    repeat(0.., ('@', take_till(0.., ['[', '@'])).void()).parse_next(input)
}

fn rule(input: &mut &str) -> ModalResult<ParsedRule> {
    let info = header.parse_next(input)?;
    ws.parse_next(input)?;
    let condition = opt(condition).parse_next(input)?.flatten();
    ws.parse_next(input)?;
    samples.parse_next(input)?;
    Ok((info, condition))
}

pub(super) fn parse_rules(input: &mut &str) -> ModalResult<Vec<ParsedRule>> {
    ws.parse_next(input)?;
    repeat(0.., terminated(rule, ws)).parse_next(input)
}
