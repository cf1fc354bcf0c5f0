//! Integration tests for the executor, driven from source text.
//!
//! Component: VM
//!
//! These tests verify:
//! - Accumulator arithmetic and its abort conditions
//! - Condition register logic and comparisons
//! - Conditional execution and block loops
//! - Memory navigation and editing
//! - Structural assignment from literals
//! - Step limits

#![cfg(test)]

use crate::common::*;

use spherehorn::*;

// =============================================================================
// Arithmetic
// =============================================================================

mod arithmetic {
    use super::*;

    #[test]
    fn chained_arithmetic() {
        // Act: 7 + 5 = 12, * 2 = 24, 30 - 24 = 6
        let result = run("{ A 7 + 5 * 2 r- 30 break }");

        // Assert
        assert_exit(&result);
        assert_eq!(result.acc(), 6);
    }

    #[test]
    fn division_and_modulo_truncate() {
        assert_eq!(run("{ A 17 / 5 break }").acc(), 3);
        assert_eq!(run("{ A 17 % 5 break }").acc(), 2);
        assert_eq!(run("{ A 4 r/ 17 break }").acc(), 4);
        assert_eq!(run("{ A 4 r% 17 break }").acc(), 1);
    }

    #[test]
    fn subtracting_most_negative_value_aborts() {
        // Arrange: the active cell holds i64::MIN read from input
        let code = "{ numin - m .a numout ^ }";

        // Act
        let result = run_with_input(code, "-9223372036854775808");

        // Assert
        assert_abort(
            &result,
            AbortReason::NegativeDifference {
                minuend: 0,
                subtrahend: Num::MIN,
            },
        );
        assert_eq!(result.acc(), 0);
        assert_output(&result, "");
    }

    #[test]
    fn decrement_past_zero_aborts() {
        let result = run("{ -- }");
        assert_abort(&result, AbortReason::DecrementPastZero);
    }

    #[test]
    fn negative_difference_aborts_and_keeps_accumulator() {
        let result = run("{ A 10 - 11 }");
        assert_abort(
            &result,
            AbortReason::NegativeDifference {
                minuend: 10,
                subtrahend: 11,
            },
        );
        assert_eq!(result.acc(), 10);

        let result = run("{ A 2 r- 1 }");
        assert_abort(
            &result,
            AbortReason::NegativeDifference {
                minuend: 1,
                subtrahend: 2,
            },
        );
    }

    #[test]
    fn division_by_zero_aborts() {
        assert_abort(&run("{ A 3 / 0 }"), AbortReason::DivisionByZero { dividend: 3 });
        assert_abort(&run("{ A 0 r% 9 }"), AbortReason::ModuloByZero { dividend: 9 });
    }
}

// =============================================================================
// Conditions
// =============================================================================

mod conditions {
    use super::*;

    #[test]
    fn gated_instructions() {
        // Arrange: condition set, so only the `?` increment runs
        let result = run("{ C 1 ++? ++! ++? break }");

        // Assert
        assert_eq!(result.acc(), 2);
    }

    #[test]
    fn comparisons_set_condition() {
        assert!(run("{ A 5 >> 4 break }").cond());
        assert!(!run("{ A 5 << 4 break }").cond());
        assert!(run("{ A 4 <= 4 break }").cond());
        assert!(run("{ A 4 /= 3 break }").cond());
        assert!(!run("{ A 3 = 3 not break }").cond());
    }

    #[test]
    fn logic_uses_truthiness() {
        assert!(!run("{ C T and 0 break }").cond());
        assert!(run("{ or 'x' break }").cond());
        assert!(!run("{ C T xor 7 break }").cond());
    }

    #[test]
    fn register_seeds() {
        let result = run("c: T a: 3 { {? ++ break } {! A 99 break } break }");
        assert_eq!(result.acc(), 4);
    }
}

// =============================================================================
// Blocks
// =============================================================================

mod blocks {
    use super::*;

    #[test]
    fn inner_break_only_leaves_inner_block() {
        // Act: inner loop counts to 3, outer stores the count
        let result = run("{ { ++ >= 3 break? } .a break }");

        // Assert
        assert_exit(&result);
        assert_eq!(result.acc(), 3);
        assert_eq!(result.active_value(), 3);
    }

    #[test]
    fn exit_unwinds_every_block() {
        let result = run("{ { { ^ } } ++ }");
        assert_exit(&result);
        assert_eq!(result.acc(), 0);
    }

    #[test]
    fn abort_unwinds_every_block() {
        let result = run("{ { { v } } ++ }");
        assert_abort(&result, AbortReason::EmptyDescent { value: 0 });
        assert_eq!(result.acc(), 0);
    }

    #[test]
    fn step_limit_stops_runaway_loop() {
        let result = run_limited("{ ++ }", 100);
        assert_abort(&result, AbortReason::StepLimit { limit: 100 });
        assert_eq!(result.acc(), 100);
    }
}

// =============================================================================
// Memory Instructions
// =============================================================================

mod memory_instructions {
    use super::*;

    #[test]
    fn accumulator_and_cell_variables() {
        let result = run("{ .42 A m ++ .a break }");
        assert_eq!(result.acc(), 43);
        assert_eq!(result.active_value(), 43);
    }

    #[test]
    fn descend_and_climb() {
        // Arrange: the head starts on a cell of value 3
        let result = run("(3) { v . 9 ^ A m break }");

        // Assert: climbing stops on the cell of value 3, not the root
        assert_exit(&result);
        assert_eq!(result.acc(), 3);
    }

    #[test]
    fn climbing_out_of_the_root_exits() {
        let result = run("{ ^ ++ }");
        assert_exit(&result);
        assert_eq!(result.acc(), 0);
    }

    #[test]
    fn shifts_wrap_around_ring() {
        // > 6 lands two places on; back 7 is one place forward
        let result = run("(10 20 30 40) { > 6 numout A 7 < a numout break }");
        assert_output(&result, "3040");
    }

    #[test]
    fn rotate_moves_anchor() {
        let result = run("(1 2 3) { > > rot R numout break }");
        assert_output(&result, "3");
    }

    #[test]
    fn insert_after_grows_ring() {
        let result = run("(1 2 3) { > +> . 7 R numout > numout > numout > numout break }");
        assert_output(&result, "1273");
        assert_eq!(
            result.program.memory().value(result.program.memory_root()),
            4
        );
    }

    #[test]
    fn delete_before_moves_anchor_to_survivor() {
        let result = run("(1 2 3) { > <- R numout > numout break }");
        assert_output(&result, "32");
    }

    #[test]
    fn deleting_last_root_member_exits() {
        let result = run("(5) { <- ++ }");
        assert_exit(&result);
        assert_eq!(result.acc(), 0);
        assert_eq!(result.program.snapshot(), CellSnapshot::leaf(0));
    }

    #[test]
    fn deleting_last_nested_member_collapses_parent() {
        let result = run("a: 5 ((1)) { v <- A m break }");
        assert_exit(&result);
        assert_eq!(result.acc(), 0);
        assert_eq!(result.active_value(), 0);
    }

    #[test]
    fn set_memory_copies_literal() {
        let result = run(r#"{ . "hi" strout . (7 (1 2)) v > v > numout break }"#);
        assert_exit(&result);
        assert_output(&result, "hi2");
    }

    #[test]
    fn literal_survives_repeated_assignment() {
        // the literal is copied, so editing the copy never touches it
        let result = run("{ . (1 2) v + m . 50 ^ >= 2 ^? }");
        assert_exit(&result);
        assert_eq!(result.acc(), 2);
    }

    #[test]
    fn chout_rejects_wide_values() {
        let result = run("{ . 300 chout }");
        assert_abort(&result, AbortReason::InvalidCharacter { value: 300 });
        assert!(result.output.is_empty());
    }
}
