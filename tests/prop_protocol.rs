//! Property-based tests for the board encoding and move validation.
//!
//! Run with: cargo test --release prop_protocol

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rhai::{Array, Dynamic, INT};

use stackconquer::protocol::decode_move;
use stackconquer::{BoardSnapshot, ErrorKind, ProposedMove, validate_move};

/// A cell as the game writes it: marker, empty field or tower.
fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("-".to_string()),
        Just("#".to_string()),
        Just(String::new()),
        "[1-4]{1,6}",
    ]
}

fn array_of(values: &[INT]) -> Dynamic {
    Dynamic::from_array(values.iter().copied().map(Dynamic::from_int).collect::<Array>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Encoding the same board twice gives the same text, and the text
    /// decodes back to the board.
    #[test]
    fn prop_encode_deterministic(cells in prop::collection::vec(cell(), 0..300)) {
        let board = BoardSnapshot::new(cells);
        let first = board.encode();
        let second = board.clone().encode();

        prop_assert_eq!(&first, &second);
        prop_assert!(!first.contains(' '));
        prop_assert_eq!(BoardSnapshot::from_json(&first).unwrap(), board);
    }

    /// A three-integer move is accepted exactly when the range rule holds.
    #[test]
    fn prop_range_rule(
        from in -3i64..40,
        count in -3i64..10,
        to in -3i64..40,
        board_len in 1usize..32
    ) {
        let len = i64::try_from(board_len).unwrap();
        let expected = (from == -1 || (0..len).contains(&from))
            && count > 0
            && (0..len).contains(&to);

        match decode_move(array_of(&[from, count, to]), board_len) {
            Ok(mv) => {
                prop_assert!(expected);
                prop_assert_eq!(
                    mv,
                    ProposedMove::new(
                        i32::try_from(from).unwrap(),
                        i32::try_from(count).unwrap(),
                        i32::try_from(to).unwrap()
                    )
                );
            }
            Err(err) => {
                prop_assert!(!expected);
                prop_assert_eq!(err.kind(), ErrorKind::MoveRangeError);
            }
        }
    }

    /// Any integer array is either accepted or rejected with a move error;
    /// validation never panics.
    #[test]
    fn prop_validate_never_panics(
        values in prop::collection::vec(any::<i64>(), 0..6),
        board_len in 0usize..500
    ) {
        match validate_move(Ok(array_of(&values)), board_len) {
            Ok(mv) => {
                prop_assert_eq!(values.len(), 3);
                prop_assert!(mv.destination() < board_len);
            }
            Err(err) => {
                let expected = if values.len() == 3 {
                    ErrorKind::MoveRangeError
                } else {
                    ErrorKind::MoveShapeError
                };
                prop_assert_eq!(err.kind(), expected);
            }
        }
    }

    /// Floats are truncated toward zero before the range check.
    #[test]
    fn prop_float_elements_truncated(to in 0.0f64..15.99) {
        let value = Dynamic::from_array(vec![
            Dynamic::from_int(-1),
            Dynamic::from_float(1.0),
            Dynamic::from_float(to),
        ]);
        let mv = decode_move(value, 16).unwrap();
        prop_assert_eq!(f64::from(mv.to), to.trunc());
    }
}
