//! Stream tokenizer tests: logical-line splitting, quote handling, chunk
//! size independence, push-back, and end-of-stream behavior.

use dbcparser::{DbcError, LineTokenizer};
use std::io::{Cursor, Seek, SeekFrom, Write};

fn tokenize(input: &str) -> Vec<String> {
    let mut tokenizer = LineTokenizer::new(Cursor::new(input));
    tokenizer.lines().collect::<Result<_, _>>().expect("tokenize")
}

fn tokenize_chunked(input: &str, chunk_size: usize) -> Vec<String> {
    let mut tokenizer = LineTokenizer::with_chunk_size(Cursor::new(input), chunk_size);
    tokenizer.lines().collect::<Result<_, _>>().expect("tokenize")
}

// ==================== plain line splitting ====================

#[test]
fn simple_lines() {
    let lines = [
        "simple",
        "\"line starts\" with a string",
        "line with \"a string at the end\"",
        "line with a \"string\" in the middle",
        "line extends \"over\nmultiple\" lines",
        "this \"line\" has \"multiple\" strings",
        "last line has no newline char",
    ];
    assert_eq!(tokenize(&lines.join("\n")), lines);
}

#[test]
fn empty_stream_yields_no_lines() {
    assert_eq!(tokenize(""), Vec::<String>::new());
}

#[test]
fn no_quotes_equals_split_on_newline() {
    let input = "alpha\nbeta\ngamma\n";
    assert_eq!(tokenize(input), vec!["alpha", "beta", "gamma"]);
}

#[test]
fn empty_lines_are_yielded_as_empty_strings() {
    let lines = ["", "line 2", "", "line 4", ""];
    // Force a newline char at EOF.
    let input = lines.join("\n") + "\n";
    assert_eq!(tokenize(&input), lines);
}

#[test]
fn final_line_without_newline_is_yielded() {
    assert_eq!(tokenize("a\nb"), vec!["a", "b"]);
}

// ==================== quoted strings ====================

#[test]
fn newline_inside_string_does_not_split() {
    let input = "CM_ SG_ 1 X \"a\nb\";";
    assert_eq!(tokenize(input), vec![input]);
}

#[test]
fn unclosed_string_is_a_syntax_error() {
    let mut tokenizer = LineTokenizer::new(Cursor::new("foo \"bar"));
    let result: Result<Vec<String>, DbcError> = tokenizer.lines().collect();
    assert!(matches!(result, Err(DbcError::UnterminatedString)));
}

#[test]
fn unclosed_string_spanning_lines_is_a_syntax_error() {
    let mut tokenizer = LineTokenizer::new(Cursor::new("ok line\nbad \"one\ntwo"));
    assert_eq!(tokenizer.next_line().unwrap().as_deref(), Some("ok line"));
    let result: Result<Vec<String>, DbcError> = tokenizer.lines().collect();
    assert!(matches!(result, Err(DbcError::UnterminatedString)));
}

// ==================== chunk size independence ====================

#[test]
fn chunk_size_does_not_affect_output() {
    let input = "simple\n\"line starts\" with a string\nline with \"a string at the end\"\nmulti \"a\nb\" line\nlast";
    let expected = tokenize_chunked(input, 4096);
    for chunk_size in [1, 2, 3, 10] {
        assert_eq!(tokenize_chunked(input, chunk_size), expected, "chunk_size={}", chunk_size);
    }
}

// ==================== push-back ====================

#[test]
fn unread_lines_replay_fifo_before_stream_reads() {
    let mut tokenizer = LineTokenizer::new(Cursor::new("from stream\n"));
    tokenizer.unread("first".to_string());
    tokenizer.unread("second".to_string());
    assert_eq!(tokenizer.next_line().unwrap().as_deref(), Some("first"));
    assert_eq!(tokenizer.next_line().unwrap().as_deref(), Some("second"));
    assert_eq!(tokenizer.next_line().unwrap().as_deref(), Some("from stream"));
    assert_eq!(tokenizer.next_line().unwrap(), None);
}

// ==================== stream positioning ====================

#[test]
fn abandoning_iteration_leaves_stream_after_last_line() {
    let mut cursor = Cursor::new("one\ntwo\nthree\n");
    let mut tokenizer = LineTokenizer::with_chunk_size(&mut cursor, 4096);
    assert_eq!(tokenizer.next_line().unwrap().as_deref(), Some("one"));
    drop(tokenizer);
    assert_eq!(cursor.position(), 4);

    // A fresh tokenizer resumes exactly at the next line.
    let mut tokenizer = LineTokenizer::new(&mut cursor);
    assert_eq!(tokenizer.next_line().unwrap().as_deref(), Some("two"));
}

#[test]
fn rewinding_the_stream_restarts_the_sequence() {
    let mut cursor = Cursor::new("a\nb\n");
    let first: Vec<String> = LineTokenizer::new(&mut cursor)
        .lines()
        .collect::<Result<_, _>>()
        .unwrap();
    cursor.seek(SeekFrom::Start(0)).unwrap();
    let second: Vec<String> = LineTokenizer::new(&mut cursor)
        .lines()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(first, second);
}

// ==================== file-backed stream ====================

#[test]
fn tokenizes_a_real_file() {
    let mut file = tempfile::tempfile().expect("tempfile");
    write!(file, "BU_: ABC DEF\nBO_ 263 Batt107: 4 DCDC\n").expect("write");
    file.seek(SeekFrom::Start(0)).expect("seek");

    let mut tokenizer = LineTokenizer::new(file);
    let lines: Vec<String> = tokenizer.lines().collect::<Result<_, _>>().expect("tokenize");
    assert_eq!(lines, vec!["BU_: ABC DEF", "BO_ 263 Batt107: 4 DCDC"]);
}
