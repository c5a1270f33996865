//! `Ask`/input statements and file I/O (spec.md §4.3, §4.5), exercised
//! against a buffered `Io` and a scratch `tempfile` directory rather than
//! the real terminal/filesystem.

mod common;

use common::{run_with_input, BufferIo};
use vyra::error::VyraError;
use vyra::interpreter::Io;
use vyra::{run_source, RunOptions};

#[test]
fn ask_for_text_reads_a_line_and_binds_it() {
    let src = "Ask the user for their name called n. Display n.";
    let out = run_with_input(src, vec!["Ada"]).unwrap();
    assert_eq!(out, "Ada\n");
}

#[test]
fn ask_with_an_explicit_prompt_writes_it_before_reading() {
    let src = r#"Ask the user "What is your name?" and store the answer in n. Display n."#;
    let mut io = BufferIo::with_input(["Grace"]);
    run_source(src, RunOptions::default(), &mut io).unwrap();
    assert_eq!(io.stdout(), "What is your name?Grace\n");
}

#[test]
fn get_a_number_parses_the_input_as_a_number() {
    let src = "Get a number from the user and store it in n. Display n + 1.";
    let out = run_with_input(src, vec!["41"]).unwrap();
    assert_eq!(out, "42\n");
}

#[test]
fn get_a_number_on_non_numeric_input_is_a_type_error() {
    let src = "Get a number from the user and store it in n. Display n.";
    let err = run_with_input(src, vec!["not-a-number"]).unwrap_err();
    assert!(matches!(err, VyraError::Type { .. }));
}

#[test]
fn write_file_then_read_file_round_trips_through_a_scratch_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt").display().to_string();

    let write_src = format!("Write \"hello from vyra\" to file \"{}\".", path);
    let mut io = BufferIo::default();
    run_source(&write_src, RunOptions::default(), &mut io).unwrap();

    let contents = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
    assert_eq!(contents, "hello from vyra");

    let read_src = format!("Read file \"{}\" into contents. Display contents.", path);
    let mut io = BufferIo::default();
    run_source(&read_src, RunOptions::default(), &mut io).unwrap();
    assert_eq!(io.stdout(), "hello from vyra\n");
}

#[test]
fn reading_a_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.txt").display().to_string();
    let src = format!("Read file \"{}\" into contents.", path);
    let mut io = BufferIo::default();
    let err = run_source(&src, RunOptions::default(), &mut io).unwrap_err();
    assert!(matches!(err, VyraError::Io { .. }));
    assert_eq!(err.exit_code(), 3);
}
