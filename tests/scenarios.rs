//! The concrete scenarios from spec.md §8 (S1-S7), asserted against the
//! exact stdout each one specifies.

mod common;

use common::run_and_capture;
use vyra::error::VyraError;

#[test]
fn s1_hello_world() {
    let out = run_and_capture(r#"Display "Hello, World!"."#).unwrap();
    assert_eq!(out, "Hello, World!\n");
}

#[test]
fn s2_arithmetic_with_assign() {
    let out = run_and_capture("Set x to 5. Add 3 to x. Display x.").unwrap();
    assert_eq!(out, "8\n");
}

#[test]
fn s3_if_else_inline() {
    let out = run_and_capture(
        r#"Set x to 7. If x is greater than 10, display "big". Otherwise display "small"."#,
    )
    .unwrap();
    assert_eq!(out, "small\n");
}

// S4/S5 are written in spec.md §8 as flat prose for brevity, but spec.md
// §4.2 delimits a `:`-opened block by strictly greater indentation than its
// header — so the block bodies below use real indentation to mean the same
// thing the flat prose describes, matching how `parser::mod` tests the
// same constructs.

#[test]
fn s4_while_countdown() {
    let src = "Set i to 3.\nWhile i is greater than 0:\n    Display i.\n    Decrement i.\n";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "3\n2\n1\n");
}

#[test]
fn s5_function_call_with_return() {
    let src = "Create function add that takes a and b:\n    Add a and b and store the result in s.\n    Return s.\nCall add with 4 and 5 and store in r.\nDisplay r.\n";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "9\n");
}

#[test]
fn s6_list_append_vs_arithmetic_disambiguation() {
    let src = "Create a list called xs with values [1,2]. Add 3 to xs. Set n to 10. Add 5 to n. Display xs. Display n.";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "[1, 2, 3]\n15\n");
}

#[test]
fn s7_division_by_zero() {
    let err = run_and_capture("Set x to 1. Divide x by 0 and store in y.").unwrap_err();
    assert_eq!(err.exit_code(), 1);
    assert!(matches!(err, VyraError::DivisionByZero { .. }));
    assert!(format!("{}", err).contains("DivisionByZero"));
}
