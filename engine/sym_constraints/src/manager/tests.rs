use pretty_assertions::assert_eq;
use sym_expr::{INT32, INT8};

use super::*;

struct Vars {
    arena: ExprArena,
    x: ExprId,
    y: ExprId,
}

fn vars() -> Vars {
    crate::init_tracing();
    let mut arena = ExprArena::new();
    let x = arena.symbol("x", INT32);
    let y = arena.symbol("y", INT32);
    Vars { arena, x, y }
}

fn c(arena: &mut ExprArena, value: u128) -> ExprId {
    arena.constant(value, INT32)
}

fn assert_well_formed(manager: &ConstraintManager, arena: &ExprArena) {
    for constraint in manager {
        assert!(!arena.is_constant(constraint), "stored constant");
        assert!(arena.kind(constraint) != Kind::And, "stored conjunction");
        assert_eq!(arena.width(constraint), BOOL);
    }
}

// Insertion

#[test]
fn true_is_never_stored() {
    let mut arena = ExprArena::new();
    let truth = arena.true_expr();
    let mut manager = ConstraintManager::new();

    manager.add_constraint(&mut arena, truth);
    assert!(manager.is_empty());
}

#[test]
#[should_panic(expected = "attempt to add invalid (false) constraint")]
fn false_is_rejected() {
    let mut arena = ExprArena::new();
    let falsity = arena.false_expr();
    ConstraintManager::new().add_constraint(&mut arena, falsity);
}

#[test]
fn conjunctions_are_split_in_order() {
    let Vars { mut arena, x, y } = vars();
    let ten = c(&mut arena, 10);
    let twenty = c(&mut arena, 20);
    let three = c(&mut arena, 3);
    let a = arena.ult(x, ten);
    let b = arena.ult(y, twenty);
    let d = arena.ugt(y, three);
    let ab = arena.and(a, b);
    let abd = arena.and(ab, d);

    let mut manager = ConstraintManager::new();
    manager.add_constraint(&mut arena, abd);

    assert_eq!(manager.as_slice(), &[a, b, d]);
    assert_well_formed(&manager, &arena);
}

#[test]
fn new_constraint_is_simplified_by_known_equality() {
    let Vars { mut arena, x, y } = vars();
    let five = c(&mut arena, 5);
    let hundred = c(&mut arena, 100);
    let x_is_5 = arena.eq(x, five);
    let sum = arena.add(x, y);
    let bounded = arena.ult(sum, hundred);

    let mut manager = ConstraintManager::new();
    manager.add_constraint(&mut arena, x_is_5);
    manager.add_constraint(&mut arena, bounded);

    let new_sum = arena.add(five, y);
    let expected = arena.ult(new_sum, hundred);
    assert_eq!(manager.as_slice(), &[x_is_5, expected]);
}

#[test]
fn learned_equality_rewrites_prior_constraints() {
    let Vars { mut arena, x, y } = vars();
    let five = c(&mut arena, 5);
    let less = arena.ult(x, y);
    let x_is_5 = arena.eq(x, five);

    let mut manager = ConstraintManager::new();
    manager.add_constraint(&mut arena, less);
    manager.add_constraint(&mut arena, x_is_5);

    let expected = arena.ult(five, y);
    assert_eq!(manager.as_slice(), &[expected, x_is_5]);
}

#[test]
fn symbolic_equality_is_not_propagated() {
    let Vars { mut arena, x, y } = vars();
    let ten = c(&mut arena, 10);
    let x_small = arena.ult(x, ten);
    let same = arena.eq(x, y);

    let mut manager = ConstraintManager::new();
    manager.add_constraint(&mut arena, x_small);
    manager.add_constraint(&mut arena, same);

    assert_eq!(manager.as_slice(), &[x_small, same]);
}

#[test]
fn rewritten_conjunction_is_split() {
    let Vars { mut arena, x, y } = vars();
    let two = c(&mut arena, 2);
    let five = c(&mut arena, 5);
    let seven = c(&mut arena, 7);
    let ten = c(&mut arena, 10);
    let low = arena.ugt(y, two);
    let high = arena.ult(y, ten);
    let range = arena.and(low, high);
    let x_is_7 = arena.eq(x, seven);
    let either = arena.or(x_is_7, range);

    let mut manager = ConstraintManager::new();
    manager.add_constraint(&mut arena, either);
    assert_eq!(manager.as_slice(), &[either]);

    // x == 5 turns `x == 7 || range` into `range`
    let x_is_5 = arena.eq(x, five);
    manager.add_constraint(&mut arena, x_is_5);

    assert_eq!(manager.as_slice(), &[low, high, x_is_5]);
    assert_well_formed(&manager, &arena);
}

#[test]
fn rewritten_equality_cascades() {
    let Vars { mut arena, x, y } = vars();
    let five = c(&mut arena, 5);
    let twelve = c(&mut arena, 12);
    let fifty = c(&mut arena, 50);

    let five_plus_y = arena.add(five, y);
    let bounded = arena.ult(five_plus_y, fifty);
    let x_plus_y = arena.add(x, y);
    let sum_is_12 = arena.eq(x_plus_y, twelve);

    let mut manager = ConstraintManager::new();
    manager.add_constraint(&mut arena, bounded);
    manager.add_constraint(&mut arena, sum_is_12);
    assert_eq!(manager.len(), 2);

    // x == 5 rewrites the sum equality to `5 + y == 12`, whose insertion
    // in turn rewrites `5 + y < 50` to true.
    let x_is_5 = arena.eq(x, five);
    manager.add_constraint(&mut arena, x_is_5);

    let learned = arena.eq(five_plus_y, twelve);
    assert_eq!(manager.as_slice(), &[learned, x_is_5]);
    assert_well_formed(&manager, &arena);
}

#[test]
fn substitution_is_syntactic() {
    let Vars { mut arena, x, .. } = vars();
    let one = c(&mut arena, 1);
    let ten = c(&mut arena, 10);
    let hundred = c(&mut arena, 100);
    let bare = arena.ult(x, hundred);
    let x_plus_1 = arena.add(x, one);
    let sum_is_10 = arena.eq(x_plus_1, ten);

    let mut manager = ConstraintManager::new();
    manager.add_constraint(&mut arena, bare);
    manager.add_constraint(&mut arena, sum_is_10);

    assert_eq!(manager.as_slice(), &[bare, sum_is_10]);

    // `(x + 1) * 2 < x`: the learned sub-expression is replaced, bare `x`
    // in the same constraint is not.
    let two = c(&mut arena, 2);
    let doubled = arena.mul(x_plus_1, two);
    let mixed = arena.ult(doubled, x);
    manager.add_constraint(&mut arena, mixed);

    let twenty = c(&mut arena, 20);
    let expected = arena.ult(twenty, x);
    assert_eq!(manager.as_slice(), &[bare, sum_is_10, expected]);
}

// Simplification

#[test]
fn simplify_replaces_known_facts_with_true() {
    let Vars { mut arena, x, y } = vars();
    let ten = c(&mut arena, 10);
    let fact = arena.ult(x, ten);
    let chosen = arena.select(fact, x, y);

    let mut manager = ConstraintManager::new();
    manager.add_constraint(&mut arena, fact);

    assert_eq!(manager.simplify_expr(&mut arena, chosen), x);
    assert_eq!(manager.as_slice(), &[fact], "simplify does not store");
}

#[test]
fn simplify_substitutes_equalities() {
    let Vars { mut arena, x, y } = vars();
    let three = c(&mut arena, 3);
    let four = c(&mut arena, 4);
    let x_is_3 = arena.eq(x, three);
    let y_is_4 = arena.eq(y, four);
    let product = arena.mul(x, y);

    let mut manager = ConstraintManager::new();
    manager.add_constraint(&mut arena, x_is_3);
    manager.add_constraint(&mut arena, y_is_4);

    let simplified = manager.simplify_expr(&mut arena, product);
    assert_eq!(arena.as_constant(simplified).map(|k| k.value()), Some(12));
}

#[test]
fn simplify_is_idempotent() {
    let Vars { mut arena, x, y } = vars();
    let five = c(&mut arena, 5);
    let ten = c(&mut arena, 10);
    let x_is_5 = arena.eq(x, five);
    let y_small = arena.ult(y, ten);

    let mut manager = ConstraintManager::new();
    manager.add_constraint(&mut arena, x_is_5);
    manager.add_constraint(&mut arena, y_small);

    let sum = arena.add(x, y);
    let picked = arena.select(y_small, sum, y);
    let e = arena.ugt(picked, ten);

    let once = manager.simplify_expr(&mut arena, e);
    let twice = manager.simplify_expr(&mut arena, once);
    assert_eq!(once, twice);

    let expected_sum = arena.add(five, y);
    let expected = arena.ugt(expected_sum, ten);
    assert_eq!(once, expected);
}

#[test]
fn simplify_returns_constants_unchanged() {
    let mut arena = ExprArena::new();
    let seven = c(&mut arena, 7);
    assert_eq!(ConstraintManager::new().simplify_expr(&mut arena, seven), seven);
}

// Checked insertion

#[test]
fn failed_insertion_restores_constraints() {
    let Vars { mut arena, x, y } = vars();
    let seven = c(&mut arena, 7);
    let ten = c(&mut arena, 10);
    let twenty = c(&mut arena, 20);
    let y_small = arena.ult(y, seven);
    let x_small = arena.ult(x, ten);
    let x_is_20 = arena.eq(x, twenty);

    let mut manager = ConstraintManager::new();
    manager.add_constraint(&mut arena, y_small);
    manager.add_constraint(&mut arena, x_small);
    let before = manager.clone();

    // `x < 10` becomes `20 < 10` while `y < 7` has already been re-stored
    let result = manager.try_add_constraint(&mut arena, x_is_20);

    assert_eq!(result, Err(ConstraintError::FalseConstraint));
    assert_eq!(manager, before);
}

#[test]
fn non_boolean_constraints_are_rejected() {
    let Vars { mut arena, x, .. } = vars();
    let mut manager = ConstraintManager::new();

    let result = manager.try_add_constraint(&mut arena, x);
    assert_eq!(result, Err(ConstraintError::NotBoolean { width: INT32 }));

    let wide = arena.constant(1, INT32);
    let result = manager.try_add_constraint(&mut arena, wide);
    assert_eq!(result, Err(ConstraintError::NotBoolean { width: INT32 }));
    assert!(manager.is_empty());
}

#[test]
fn false_constant_is_an_error_in_checked_form() {
    let mut arena = ExprArena::new();
    let falsity = arena.false_expr();
    let result = ConstraintManager::new().try_add_constraint(&mut arena, falsity);
    assert_eq!(result, Err(ConstraintError::FalseConstraint));
}

#[test]
#[should_panic(expected = "attempt to add invalid (false) constraint")]
fn contradiction_found_by_simplification_panics() {
    let Vars { mut arena, x, .. } = vars();
    let five = c(&mut arena, 5);
    let six = c(&mut arena, 6);
    let x_is_5 = arena.eq(x, five);
    let x_is_6 = arena.eq(x, six);

    let mut manager = ConstraintManager::new();
    manager.add_constraint(&mut arena, x_is_5);
    manager.add_constraint(&mut arena, x_is_6);
}

// Disjunctions

#[test]
fn disjunction_is_a_chain_of_equalities() {
    let Vars { mut arena, x, .. } = vars();
    let mut manager = ConstraintManager::new();

    let added = manager.add_disjunction(&mut arena, x, &[1, 2, 3]);

    let one = c(&mut arena, 1);
    let two = c(&mut arena, 2);
    let three = c(&mut arena, 3);
    let is_1 = arena.eq(one, x);
    let is_2 = arena.eq(two, x);
    let is_3 = arena.eq(three, x);
    let tail = arena.or(is_2, is_3);
    let expected = arena.or(is_1, tail);
    assert_eq!(added, expected);
    assert_eq!(manager.as_slice(), &[expected]);
}

#[test]
fn single_value_disjunction_is_an_equality() {
    let Vars { mut arena, x, y } = vars();
    let less = arena.ult(x, y);
    let mut manager = ConstraintManager::new();
    manager.add_constraint(&mut arena, less);

    let added = manager.add_disjunction(&mut arena, x, &[9]);

    let nine = c(&mut arena, 9);
    let rewritten = arena.ult(nine, y);
    assert_eq!(manager.as_slice(), &[rewritten, added]);
}

#[test]
#[should_panic(expected = "disjunction value 256 does not fit in 8 bits")]
fn out_of_range_disjunction_value_panics() {
    let mut arena = ExprArena::new();
    let b = arena.symbol("b", INT8);
    ConstraintManager::new().add_disjunction(&mut arena, b, &[7, 256, 257]);
}

#[test]
fn disjunction_accepts_full_width_values() {
    let mut arena = ExprArena::new();
    let b = arena.symbol("b", INT8);
    let mut manager = ConstraintManager::new();

    let added = manager.add_disjunction(&mut arena, b, &[0, 255]);

    let zero = arena.constant(0, INT8);
    let max = arena.constant(255, INT8);
    let is_0 = arena.eq(zero, b);
    let is_max = arena.eq(max, b);
    let expected = arena.or(is_0, is_max);
    assert_eq!(added, expected);
}

#[test]
#[should_panic(expected = "disjunction over an empty set of values")]
fn empty_disjunction_panics() {
    let Vars { mut arena, x, .. } = vars();
    ConstraintManager::new().add_disjunction(&mut arena, x, &[]);
}

// Bulk rewriting

#[test]
fn rewrite_constraints_reinserts_changed_ones() {
    let Vars { mut arena, x, y } = vars();
    let two = c(&mut arena, 2);
    let four = c(&mut arena, 4);
    let less = arena.ult(x, y);
    let above = arena.ugt(y, two);

    let mut manager = ConstraintManager::new();
    manager.add_constraint(&mut arena, less);
    manager.add_constraint(&mut arena, above);

    let mut driver = RewriteDriver::new(ReplaceOne::new(y, four));
    assert_eq!(manager.rewrite_constraints(&mut arena, &mut driver), Ok(true));

    // `4 > 2` is true and disappears
    let expected = arena.ult(x, four);
    assert_eq!(manager.as_slice(), &[expected]);

    assert_eq!(manager.rewrite_constraints(&mut arena, &mut driver), Ok(false));
}

#[test]
fn failed_rewrite_restores_constraints() {
    let Vars { mut arena, x, y } = vars();
    let one = c(&mut arena, 1);
    let less = arena.ult(x, y);
    let above = arena.ugt(y, one);

    let mut manager = ConstraintManager::new();
    manager.add_constraint(&mut arena, less);
    manager.add_constraint(&mut arena, above);
    let before = manager.clone();

    let zero = c(&mut arena, 0);
    let mut driver = RewriteDriver::new(ReplaceOne::new(y, zero));
    let result = manager.rewrite_constraints(&mut arena, &mut driver);

    assert_eq!(result, Err(ConstraintError::FalseConstraint));
    assert_eq!(manager, before);
}

// Ownership

#[test]
fn forked_managers_evolve_independently() {
    let Vars { mut arena, x, y } = vars();
    let less = arena.ult(x, y);
    let mut parent = ConstraintManager::new();
    parent.add_constraint(&mut arena, less);

    let mut child = parent.clone();
    let five = c(&mut arena, 5);
    let x_is_5 = arena.eq(x, five);
    child.add_constraint(&mut arena, x_is_5);

    assert_eq!(parent.as_slice(), &[less]);
    assert_eq!(child.len(), 2);
}

#[test]
fn iteration_follows_insertion_order() {
    let Vars { mut arena, x, y } = vars();
    let ten = c(&mut arena, 10);
    let first = arena.ult(x, ten);
    let second = arena.ult(y, ten);
    let third = arena.ult(x, y);

    let mut manager = ConstraintManager::new();
    for constraint in [first, second, third] {
        manager.add_constraint(&mut arena, constraint);
    }

    let collected: Vec<_> = manager.iter().collect();
    assert_eq!(collected, vec![first, second, third]);
    assert_eq!((&manager).into_iter().count(), 3);
}

#[test]
fn shift_patterns_of_stored_constraint() {
    let Vars { mut arena, x, y } = vars();
    let two = c(&mut arena, 2);
    let limit = c(&mut arena, 0x100);
    let scaled = arena.shl(x, two);
    let address = arena.add(y, scaled);
    let in_bounds = arena.ult(address, limit);

    let mut manager = ConstraintManager::new();
    manager.add_constraint(&mut arena, in_bounds);

    let shifts = manager.shift_patterns(&arena, 0);
    assert_eq!(shifts.get(&two), Some(&x));
}

#[test]
#[should_panic(expected = "attempt to add invalid (false) constraint")]
fn contradiction_over_deeply_shared_expression_panics_promptly() {
    let Vars { mut arena, x, .. } = vars();
    let mut doubled = x;
    for _ in 0..30 {
        doubled = arena.add(doubled, doubled);
    }
    let five = c(&mut arena, 5);
    let fact = arena.ult(doubled, five);

    let mut manager = ConstraintManager::new();
    manager.add_constraint(&mut arena, fact);

    // simplifies to `false == true`
    let falsity = arena.false_expr();
    let denied = arena.eq(falsity, fact);
    manager.add_constraint(&mut arena, denied);
}
