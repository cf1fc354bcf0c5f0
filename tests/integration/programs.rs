//! Whole-program tests with buffered input and output.
//!
//! Component: Program
//!
//! These tests verify:
//! - Complete programs produce byte-exact output
//! - Input instructions consume stdin the expected way
//! - Output written before an abort is kept
//! - Programs with parse errors are never built
//! - A program runs only once

#![cfg(test)]

use crate::common::*;

use spherehorn::*;

const COUNT: &str = include_str!("../../demos/count.spherehorn");
const HELLO: &str = include_str!("../../demos/hello_world.spherehorn");
const ECHO: &str = include_str!("../../demos/echo.spherehorn");

mod demos {
    use super::*;

    #[test]
    fn counting_loop() {
        let result = run(COUNT);
        assert_exit(&result);
        assert_output(&result, "012345678910111213141516171819");
    }

    #[test]
    fn hello_world() {
        let result = run(HELLO);
        assert_exit(&result);
        assert_output(&result, "Hello, World!\n");
    }

    #[test]
    fn echo_copies_until_eof() {
        let result = run_with_input(ECHO, "one\ntwo");
        assert_exit(&result);
        assert_output(&result, "one\ntwo");
    }
}

mod input {
    use super::*;

    #[test]
    fn read_line_and_echo() {
        let result = run_with_input("{ strin strout ^ }", "ping\nignored");
        assert_exit(&result);
        assert_output(&result, "ping");
    }

    #[test]
    fn sum_two_numbers() {
        // Arrange: two cells, one number each
        let code = "(0 0) { numin A m > numin + m < .a numout ^ }";

        // Act
        let result = run_with_input(code, "12 30\n");

        // Assert
        assert_exit(&result);
        assert_output(&result, "42");
    }

    #[test]
    fn char_input_at_eof_reads_zero() {
        let result = run_with_input("{ .7 chin break }", "");
        assert_exit(&result);
        assert_eq!(result.active_value(), 0);
    }
}

mod algorithms {
    use super::*;

    #[test]
    fn factorial() {
        let code = "
            # n, running product
            (5 1) {
                { A m = 0 break? > A m < * m > .a < A m -- .a }
                > numout ^
            }
        ";
        let result = run(code);
        assert_exit(&result);
        assert_output(&result, "120");
    }

    #[test]
    fn reverse_line() {
        // walk the line backwards from its last byte
        let code = "{ strin A m v < { chout < -- = 0 break? } ^ ^ }";
        let result = run_with_input(code, "abc\n");
        assert_exit(&result);
        assert_output(&result, "cba");
    }
}

mod failures {
    use super::*;

    #[test]
    fn output_before_abort_is_kept() {
        let result = run("{ . 'h' chout . 999 chout }");
        assert_abort(&result, AbortReason::InvalidCharacter { value: 999 });
        assert_output(&result, "h");
    }

    #[test]
    fn abort_location_points_at_instruction() {
        let result = run("{\n  ++\n  ++\n  / 0\n}");
        assert_eq!(result.status, Status::Abort);
        assert_eq!(result.program.abort().unwrap().location.line, 4);
    }

    #[test]
    fn parse_errors_are_all_reported() {
        let messages = parse_messages("{ frob ++ } { -- }");
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("frob"));
    }

    #[test]
    fn empty_block_never_builds() {
        assert!(!parse_messages("{ }").is_empty());
        assert!(!parse_messages("{ {} ++ }").is_empty());
    }

    #[test]
    fn second_run_is_rejected() {
        let mut program = build("{ break }");
        let mut io = IOContext::default();
        assert_eq!(program.run(&mut io).unwrap(), Status::Exit);

        let err = program.run(&mut io).unwrap_err();
        assert!(matches!(err, SpherehornError::AlreadyRun));
        assert_eq!(err.category(), ErrorCategory::Usage);
    }
}
