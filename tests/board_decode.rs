use checkers_client::{
    board::{
        BOARD_CELLS,
        BoardState,
        CODE_EMPTY,
        CODE_P1_MAN,
        CODE_P2_KING,
        decode_board,
    },
    clarity::ClarityValue,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

#[test]
fn decode_board__empty_mapping_is_all_zeros() {
    // given
    let entries = BTreeMap::new();

    // when
    let board = decode_board(&entries);

    // then
    assert_eq!(board, BoardState::empty());
    assert_eq!(board.cells().len(), BOARD_CELLS);
}

#[test]
fn decode_board__sparse_entries_land_on_their_positions() {
    // given
    let mut entries = BTreeMap::new();
    entries.insert(
        "p0".to_string(),
        ClarityValue::some(ClarityValue::Uint(CODE_P1_MAN as u128)),
    );
    entries.insert(
        "p63".to_string(),
        ClarityValue::some(ClarityValue::Uint(CODE_P2_KING as u128)),
    );

    // when
    let board = decode_board(&entries);

    // then
    assert_eq!(board.code_at(0), Some(CODE_P1_MAN));
    assert_eq!(board.code_at(63), Some(CODE_P2_KING));
    for position in 1..63 {
        assert_eq!(board.code_at(position), Some(CODE_EMPTY));
    }
}

#[test]
fn decode_board__explicit_none_reads_as_empty() {
    let mut entries = BTreeMap::new();
    entries.insert("p12".to_string(), ClarityValue::OptionalNone);
    let board = decode_board(&entries);
    assert_eq!(board.code_at(12), Some(CODE_EMPTY));
}

#[test]
fn decode_board__codes_outside_known_range_pass_through() {
    let mut entries = BTreeMap::new();
    entries.insert("p7".to_string(), ClarityValue::some(ClarityValue::Uint(9)));
    let board = decode_board(&entries);
    assert_eq!(board.code_at(7), Some(9));
}

#[test]
fn decode_board__ignores_labels_outside_canonical_range() {
    let mut entries = BTreeMap::new();
    entries.insert("p64".to_string(), ClarityValue::some(ClarityValue::Uint(1)));
    entries.insert("q3".to_string(), ClarityValue::some(ClarityValue::Uint(2)));
    let board = decode_board(&entries);
    assert_eq!(board, BoardState::empty());
}

#[test]
fn decode_board__code_wider_than_a_byte_saturates() {
    let mut entries = BTreeMap::new();
    entries.insert("p9".to_string(), ClarityValue::some(ClarityValue::Uint(300)));
    let board = decode_board(&entries);
    assert_eq!(board.code_at(9), Some(u8::MAX));
}

#[test]
fn decode_board__non_uint_payload_reads_as_empty() {
    let mut entries = BTreeMap::new();
    entries.insert(
        "p4".to_string(),
        ClarityValue::some(ClarityValue::Bool(true)),
    );
    let board = decode_board(&entries);
    assert_eq!(board.code_at(4), Some(CODE_EMPTY));
}

fn sparse_mapping() -> impl Strategy<Value = BTreeMap<String, ClarityValue>> {
    proptest::collection::btree_map(
        (0usize..64).prop_map(|i| format!("p{i}")),
        prop_oneof![
            Just(ClarityValue::OptionalNone),
            (0u128..16).prop_map(|code| ClarityValue::some(ClarityValue::Uint(code))),
        ],
        0..32,
    )
}

proptest! {
    #[test]
    fn decode_board__always_yields_64_cells(entries in sparse_mapping()) {
        let board = decode_board(&entries);
        prop_assert_eq!(board.cells().len(), BOARD_CELLS);
    }

    #[test]
    fn decode_board__is_idempotent_per_mapping(entries in sparse_mapping()) {
        prop_assert_eq!(decode_board(&entries), decode_board(&entries));
    }
}
