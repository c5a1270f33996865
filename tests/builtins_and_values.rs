//! Built-in functions, arithmetic promotion, and stringification rules
//! (spec.md §4.5, §6), exercised end to end through the pipeline rather
//! than by calling `builtins::call` directly.

mod common;

use common::run_and_capture;
use vyra::error::VyraError;

#[test]
fn length_works_on_both_lists_and_text() {
    let src = "\
Create a list called xs with values [1, 2, 3].
Display length(xs).
Display length(\"hello\").
";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "3\n5\n");
}

#[test]
fn uppercase_lowercase_and_to_text_round_trip() {
    let src = "\
Display uppercase(\"shout\").
Display lowercase(\"WHISPER\").
Display to_text(42).
";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "SHOUT\nwhisper\n42\n");
}

#[test]
fn split_and_join_are_inverse_for_plain_separators() {
    let src = "\
Set parts to split(\"a,b,c\", \",\").
Display join(parts, \"-\").
";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "a-b-c\n");
}

#[test]
fn integer_arithmetic_stays_integer_until_division_is_inexact() {
    let src = "\
Display 6 / 3.
Display 7 / 2.
Display 7 % 2.
Display 2 ** 10.
";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "2\n3.5\n1\n1024\n");
}

#[test]
fn numeric_equality_coerces_int_and_float() {
    let src = "\
Display 3 == 3.0.
Display 3 == 3.5.
";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "true\nfalse\n");
}

#[test]
fn followed_by_stringifies_every_operand_type() {
    let src = r#"Display "count: " followed by 5."#;
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "count: 5\n");
}

#[test]
fn out_of_range_index_is_an_index_error() {
    let src = "Create a list called xs with values [1, 2]. Display xs[5].";
    let err = run_and_capture(src).unwrap_err();
    assert!(matches!(err, VyraError::Index { index: 5, len: 2, .. }));
}

#[test]
fn unary_minus_and_not_negate_their_operand() {
    let src = "\
Set n to 5.
Display -n.
Display not true.
";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "-5\nfalse\n");
}

#[test]
fn nested_list_display_quotes_strings_but_not_the_outer_value() {
    let src = "Create a list called xs with values [1, \"two\", 3]. Display xs.";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "[1, \"two\", 3]\n");
}
