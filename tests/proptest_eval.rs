
use plurule::{
    Operand, OperandSymbol, constant, evaluate_boolean, evaluate_number, group, operand, range,
};
use proptest::prelude::*;
use strategies::{arb_condition, arb_group, arb_integer_operand, arb_item, arb_operand, arb_operand_expr};

proptest! {
    /// Evaluating the same tree twice gives the same answer.
    #[test]
    fn evaluation_is_deterministic(expr in arb_condition(3), value in arb_operand()) {
        let first = evaluate_boolean(&expr, &value).unwrap();
        for _ in 0..3 {
            prop_assert_eq!(first, evaluate_boolean(&expr, &value).unwrap());
        }
    }

    /// Generated trees are well formed, so evaluation never fails.
    #[test]
    fn well_formed_trees_never_error(expr in arb_condition(3), value in arb_operand()) {
        prop_assert!(evaluate_boolean(&expr, &value).is_ok());
    }

    /// `x = a,b,c` holds iff one of `x = a`, `x = b`, `x = c` holds.
    #[test]
    fn group_equals_is_or(left in arb_operand_expr(), items in arb_group(), value in arb_operand()) {
        let whole = evaluate_boolean(&left.clone().equals(group(items.clone())), &value).unwrap();
        let any = items
            .iter()
            .map(|item| evaluate_boolean(&left.clone().equals(item.clone()), &value).unwrap())
            .any(|b| b);
        prop_assert_eq!(whole, any);
    }

    /// `a,b,c = x` is the same as `x = a,b,c`.
    #[test]
    fn group_on_the_left(left in arb_operand_expr(), items in arb_group(), value in arb_operand()) {
        let right_side = evaluate_boolean(&left.clone().equals(group(items.clone())), &value).unwrap();
        let left_side = evaluate_boolean(&group(items).equals(left), &value).unwrap();
        prop_assert_eq!(right_side, left_side);
    }

    /// `x != a,b,c` holds iff every one of `x != a`, `x != b`, `x != c` holds.
    #[test]
    fn group_not_equals_is_and(left in arb_operand_expr(), items in arb_group(), value in arb_operand()) {
        let whole = evaluate_boolean(&left.clone().not_equals(group(items.clone())), &value).unwrap();
        let all = items
            .iter()
            .map(|item| evaluate_boolean(&left.clone().not_equals(item.clone()), &value).unwrap())
            .all(|b| b);
        prop_assert_eq!(whole, all);
    }

    /// For a single item, `!=` is the negation of `=` on integers.
    #[test]
    fn single_item_not_equals_negates(left in arb_operand_expr(), item in arb_item(), value in arb_integer_operand()) {
        let eq = evaluate_boolean(&left.clone().equals(item.clone()), &value).unwrap();
        let ne = evaluate_boolean(&left.not_equals(item), &value).unwrap();
        prop_assert_eq!(eq, !ne);
    }

    /// Integers are in `min..max` iff `min <= x <= max`.
    #[test]
    fn range_is_inclusive(min in 0_i64..50, len in 0_i64..20, x in 0_i64..100) {
        let expr = operand(OperandSymbol::N).equals(range(min, min + len));
        let held = evaluate_boolean(&expr, &Operand::from(x)).unwrap();
        prop_assert_eq!(held, (min..=min + len).contains(&x));
    }

    /// A visible non-zero fraction never falls in a range.
    #[test]
    fn fractions_never_in_range(integer in 0_u64..50, fraction in "[0-9]{0,2}[1-9]", min in 0_i64..50) {
        let value: Operand = format!("{integer}.{fraction}").parse().unwrap();
        let expr = operand(OperandSymbol::N).equals(range(min, min + 10));
        prop_assert!(!evaluate_boolean(&expr, &value).unwrap());
        let expr = operand(OperandSymbol::N).not_equals(range(min, min + 10));
        prop_assert!(evaluate_boolean(&expr, &value).unwrap());
    }

    /// `n % d` agrees with integer remainder.
    #[test]
    fn modulo_matches_integer_remainder(k in 0_i64..1_000_000, d in 1_i64..1_000) {
        let result = evaluate_number(&operand(OperandSymbol::N).modulo(d), &Operand::from(k)).unwrap();
        prop_assert_eq!(result.try_integer_value().unwrap(), k % d);
    }

    /// `not not x` is `x`.
    #[test]
    fn double_negation(expr in arb_condition(2), value in arb_operand()) {
        let single = evaluate_boolean(&expr, &value).unwrap();
        let double = evaluate_boolean(&!!expr, &value).unwrap();
        prop_assert_eq!(single, double);
    }

    /// `x and false` is false, `x or true` is true.
    #[test]
    fn connective_identities(expr in arb_condition(2), value in arb_operand()) {
        prop_assert!(!evaluate_boolean(&expr.clone().and(constant(false)), &value).unwrap());
        prop_assert!(evaluate_boolean(&expr.or(constant(true)), &value).unwrap());
    }
}
