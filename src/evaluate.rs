use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use crate::types::{EvalError, EvaluationReport, Position};
use crate::{BinaryOp, Expr, Operand, Rule, UnaryOp, Value};

/// Reduce a boolean sub-tree to `true` or `false` for one operand.
///
/// Node kinds with no boolean meaning evaluate to `false` rather than failing,
/// so a relation that cannot hold simply does not hold.
///
/// # Errors
///
/// Returns [`EvalError::UnsupportedOperation`] for a unary operator other than
/// `not`/`~`, or for a non-numeric node reached in numeric position.
/// Returns [`EvalError::InvalidOperation`] for a modulo divisor that is not a
/// positive integer.
pub fn evaluate_boolean(expr: &Expr, operand: &Operand) -> Result<bool, EvalError> {
    match expr {
        Expr::Constant(Value::Bool(value)) => Ok(*value),
        Expr::Parenthesis(inner) => evaluate_boolean(inner, operand),
        Expr::Unary { op, operand: inner } => match op {
            UnaryOp::Not | UnaryOp::OnesComplement => Ok(!evaluate_boolean(inner, operand)?),
            UnaryOp::Negate | UnaryOp::Plus => {
                Err(EvalError::unsupported(expr.kind_name(), Position::Boolean))
            }
        },
        Expr::Binary { op, left, right } => match op {
            BinaryOp::LogicalAnd => {
                let l = evaluate_boolean(left, operand)?;
                let r = evaluate_boolean(right, operand)?;
                Ok(l && r)
            }
            BinaryOp::LogicalOr => {
                let l = evaluate_boolean(left, operand)?;
                let r = evaluate_boolean(right, operand)?;
                Ok(l || r)
            }
            BinaryOp::Xor => {
                let l = evaluate_boolean(left, operand)?;
                let r = evaluate_boolean(right, operand)?;
                Ok(l ^ r)
            }
            BinaryOp::Equal => equals(left, right, operand),
            BinaryOp::NotEqual => not_equals(left, right, operand),
            op if op.is_relational() => relational(*op, left, right, operand),
            _ => Ok(false),
        },
        _ => Ok(false),
    }
}

/// Reduce a numeric sub-tree to an operand.
///
/// Operand references resolve to the matching component of `operand`; `v` and
/// `w` become integer-valued operands built from digit counts.
///
/// # Errors
///
/// Returns [`EvalError::UnsupportedOperation`] for any node other than a
/// parenthesis, modulo, operand reference or numeric constant, and
/// [`EvalError::InvalidOperation`] for a modulo divisor that is not a positive
/// integer fitting in 32 bits.
pub fn evaluate_number(expr: &Expr, operand: &Operand) -> Result<Operand, EvalError> {
    match expr {
        Expr::Parenthesis(inner) => evaluate_number(inner, operand),
        Expr::Binary {
            op: BinaryOp::Modulo,
            left,
            right,
        } => {
            let value = evaluate_number(left, operand)?;
            let divisor = evaluate_number(right, operand)?;
            modulo(&value, &divisor)
        }
        Expr::Operand(symbol) => Ok(operand.component(*symbol)),
        Expr::Constant(Value::Number(number)) => Ok(number.clone()),
        other => Err(EvalError::unsupported(other.kind_name(), Position::Numeric)),
    }
}

fn modulo(value: &Operand, divisor: &Operand) -> Result<Operand, EvalError> {
    let divisor = divisor.try_integer_value().map_err(|_| {
        EvalError::invalid(format!("modulo divisor {divisor} is not an integer"))
    })?;
    let divisor = i32::try_from(divisor)
        .map_err(|_| EvalError::invalid(format!("modulo divisor {divisor} is out of range")))?;
    value.modulo(divisor)
}

/// Looks through parentheses for a group or range on either side of a relation.
fn unwrap_parens(expr: &Expr) -> &Expr {
    match expr {
        Expr::Parenthesis(inner) => unwrap_parens(inner),
        other => other,
    }
}

fn as_range(expr: &Expr) -> Option<(&Expr, &Expr)> {
    match unwrap_parens(expr) {
        Expr::Range { min, max } => Some((min, max)),
        _ => None,
    }
}

fn as_group(expr: &Expr) -> Option<&[Expr]> {
    match unwrap_parens(expr) {
        Expr::Group(items) => Some(items),
        _ => None,
    }
}

/// The number on the other side of a range, or `None` if it has visible
/// non-zero fraction digits (ranges only contain integers).
fn integer_candidate(expr: &Expr, operand: &Operand) -> Result<Option<Operand>, EvalError> {
    let number = evaluate_number(expr, operand)?;
    Ok((number.w() == 0).then_some(number))
}

fn range_bounds(min: &Expr, max: &Expr, operand: &Operand) -> Result<(Operand, Operand), EvalError> {
    Ok((evaluate_number(min, operand)?, evaluate_number(max, operand)?))
}

/// `=`: true if any group member matches; a range matches integers within
/// its inclusive bounds.
fn equals(left: &Expr, right: &Expr, operand: &Operand) -> Result<bool, EvalError> {
    if let Some(items) = as_group(left) {
        for item in items {
            if equals(item, right, operand)? {
                return Ok(true);
            }
        }
        return Ok(false);
    }
    if let Some(items) = as_group(right) {
        for item in items {
            if equals(left, item, operand)? {
                return Ok(true);
            }
        }
        return Ok(false);
    }

    let range = as_range(left)
        .map(|bounds| (bounds, right))
        .or_else(|| as_range(right).map(|bounds| (bounds, left)));
    if let Some(((min, max), other)) = range {
        let Some(number) = integer_candidate(other, operand)? else {
            return Ok(false);
        };
        let (min, max) = range_bounds(min, max, operand)?;
        return Ok(min.cmp_value(&number) != Ordering::Greater
            && number.cmp_value(&max) != Ordering::Greater);
    }

    let l = evaluate_number(left, operand)?;
    let r = evaluate_number(right, operand)?;
    Ok(l.value_eq(&r))
}

/// `!=`: true only if no group member matches. This is not the negation of
/// [`equals`] when groups are involved.
fn not_equals(left: &Expr, right: &Expr, operand: &Operand) -> Result<bool, EvalError> {
    if let Some(items) = as_group(left) {
        for item in items {
            if !not_equals(item, right, operand)? {
                return Ok(false);
            }
        }
        return Ok(true);
    }
    if let Some(items) = as_group(right) {
        for item in items {
            if !not_equals(left, item, operand)? {
                return Ok(false);
            }
        }
        return Ok(true);
    }

    let range = as_range(left)
        .map(|bounds| (bounds, right))
        .or_else(|| as_range(right).map(|bounds| (bounds, left)));
    if let Some(((min, max), other)) = range {
        let Some(number) = integer_candidate(other, operand)? else {
            return Ok(true);
        };
        let (min, max) = range_bounds(min, max, operand)?;
        return Ok(number.cmp_value(&min) == Ordering::Less
            || number.cmp_value(&max) == Ordering::Greater);
    }

    let l = evaluate_number(left, operand)?;
    let r = evaluate_number(right, operand)?;
    Ok(!l.value_eq(&r))
}

fn compare(op: BinaryOp, left: &Operand, right: &Operand) -> bool {
    let ord = left.cmp_value(right);
    match op {
        BinaryOp::LessThan => ord == Ordering::Less,
        BinaryOp::LessThanOrEqual => ord != Ordering::Greater,
        BinaryOp::GreaterThan => ord == Ordering::Greater,
        BinaryOp::GreaterThanOrEqual => ord != Ordering::Less,
        _ => false,
    }
}

/// `<`, `<=`, `>`, `>=`. Against a range the number must satisfy the operator
/// against both endpoints.
fn relational(op: BinaryOp, left: &Expr, right: &Expr, operand: &Operand) -> Result<bool, EvalError> {
    if let Some((min, max)) = as_range(right) {
        let Some(number) = integer_candidate(left, operand)? else {
            return Ok(false);
        };
        let (min, max) = range_bounds(min, max, operand)?;
        return Ok(compare(op, &number, &min) && compare(op, &number, &max));
    }
    if let Some((min, max)) = as_range(left) {
        let Some(number) = integer_candidate(right, operand)? else {
            return Ok(false);
        };
        let (min, max) = range_bounds(min, max, operand)?;
        return Ok(compare(op, &min, &number) && compare(op, &max, &number));
    }

    let l = evaluate_number(left, operand)?;
    let r = evaluate_number(right, operand)?;
    Ok(compare(op, &l, &r))
}

/// Run the optional rules to build the match bitmask, then return the
/// precomputed permutation for the first required rule that holds.
pub(crate) fn evaluate_cases(
    rules: &[Rule],
    optional_count: usize,
    permutations: &[Box<[Arc<[Rule]>]>],
    operand: &Operand,
) -> Result<Option<Arc<[Rule]>>, EvalError> {
    let (mask, required) = select(rules, optional_count, operand)?;
    Ok(required.map(|index| Arc::clone(&permutations[index][mask])))
}

fn mask_of(rules: &[Rule], optional_count: usize, operand: &Operand) -> Result<usize, EvalError> {
    let mut mask = 0;
    for (bit, rule) in rules[..optional_count].iter().enumerate() {
        if rule.evaluate(operand)? {
            mask |= 1 << bit;
        }
    }
    Ok(mask)
}

/// Returns the optional-case bitmask and the index (among required rules) of
/// the first required rule that holds.
fn select(
    rules: &[Rule],
    optional_count: usize,
    operand: &Operand,
) -> Result<(usize, Option<usize>), EvalError> {
    let mask = mask_of(rules, optional_count, operand)?;
    for (index, rule) in rules[optional_count..].iter().enumerate() {
        if rule.evaluate(operand)? {
            return Ok((mask, Some(index)));
        }
    }
    Ok((mask, None))
}

pub(crate) fn evaluate_cases_detailed(
    rules: &[Rule],
    optional_count: usize,
    permutations: &[Box<[Arc<[Rule]>]>],
    operand: &Operand,
) -> Result<EvaluationReport, EvalError> {
    let start = Instant::now();
    let (mask, required) = select(rules, optional_count, operand)?;
    let cases = required.map(|index| Arc::clone(&permutations[index][mask]));
    let required = required.map(|index| rules[optional_count + index].clone());
    Ok(EvaluationReport::new(cases, mask, required, start.elapsed()))
}
