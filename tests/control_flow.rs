//! Loops, branches, and `Break`/`Continue` across nested constructs
//! (spec.md §4.4, §9).

mod common;

use common::run_and_capture;

#[test]
fn repeat_runs_body_n_times() {
    let src = "Repeat 3 times:\n    Display \"tick\".\n";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "tick\ntick\ntick\n");
}

#[test]
fn for_each_over_a_list_binds_each_element() {
    let src = "Create a list called xs with values [1, 2, 3].\nFor each item in xs:\n    Display item.\n";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "1\n2\n3\n");
}

#[test]
fn for_each_over_a_string_iterates_characters() {
    // spec.md §9's resolved open question: strings iterate by character.
    let src = "Set word to \"hi\".\nFor each ch in word:\n    Display ch.\n";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "h\ni\n");
}

#[test]
fn break_exits_the_innermost_loop_only() {
    let src = "Set i to 0.\nWhile i is less than 10:\n    If i is equal to 3, stop the loop.\n    Display i.\n    Increment i.\n";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "0\n1\n2\n");
}

#[test]
fn continue_skips_the_rest_of_the_current_iteration() {
    let src = "Set i to 0.\nWhile i is less than 5:\n    Increment i.\n    If i is equal to 3, continue to next iteration.\n    Display i.\n";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "1\n2\n4\n5\n");
}

#[test]
fn nested_loops_break_only_the_inner_one() {
    let src = "\
Create an empty list called seen.
For each x in [1, 2]:
    For each y in [10, 20]:
        If y is equal to 20, stop the loop.
        Add x followed by y to seen.
Display seen.
";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "[\"110\", \"210\"]\n");
}

#[test]
fn if_elif_else_chooses_the_first_true_branch() {
    let src = "\
Set score to 72.
If score is greater than or equal to 90:
    Display \"A\".
Otherwise if score is greater than or equal to 70:
    Display \"B\".
Otherwise:
    Display \"C\".
";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "B\n");
}

#[test]
fn loop_variable_stays_in_scope_after_the_loop_ends() {
    // spec.md §9: block scope is the enclosing scope, so the loop's
    // variable is still readable once the loop has finished.
    let src = "For each x in [1, 2, 3]:\n    Display x.\nDisplay x.\n";
    let out = run_and_capture(src).unwrap();
    assert_eq!(out, "1\n2\n3\n3\n");
}

#[test]
fn a_runaway_loop_is_stopped_by_the_iteration_watchdog() {
    let src = "While true:\n    Display 1.\n";
    let mut io = common::BufferIo::default();
    let result = vyra::run_source(
        src,
        vyra::RunOptions { iteration_limit: Some(50), debug: false },
        &mut io,
    );
    assert!(matches!(
        result,
        Err(vyra::error::VyraError::IterationLimitExceeded { limit: 50, .. })
    ));
}
