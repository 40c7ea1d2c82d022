use checkers_client::{
    clarity::{
        ClarityError,
        ClarityValue,
    },
    principal::{
        Principal,
        PrincipalError,
    },
};
use std::{
    collections::BTreeMap,
    str::FromStr,
};

#[test]
fn encode_hex__uint_matches_wire_envelope() {
    // tag 0x01 followed by a 16-byte big-endian value
    let value = ClarityValue::Uint(5);
    assert_eq!(
        value.encode_hex(),
        "0x0100000000000000000000000000000005"
    );
}

#[test]
fn decode_hex__uint_round_trips() {
    let decoded =
        ClarityValue::decode_hex("0x0100000000000000000000000000000005").unwrap();
    assert_eq!(decoded, ClarityValue::Uint(5));
}

#[test]
fn decode_hex__accepts_unframed_hex() {
    let decoded = ClarityValue::decode_hex("03").unwrap();
    assert_eq!(decoded, ClarityValue::Bool(true));
}

#[test]
fn decode_hex__game_record_shape_survives_round_trip() {
    // given a tuple shaped like a get-game result
    let player1 =
        Principal::from_str("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM").unwrap();
    let mut entries = BTreeMap::new();
    entries.insert("player1".to_string(), ClarityValue::Principal(player1));
    entries.insert("player2".to_string(), ClarityValue::OptionalNone);
    entries.insert("current-turn".to_string(), ClarityValue::Principal(player1));
    entries.insert("is-active".to_string(), ClarityValue::Bool(false));
    let value = ClarityValue::some(ClarityValue::Tuple(entries));

    // when
    let decoded = ClarityValue::decode_hex(&value.encode_hex()).unwrap();

    // then
    assert_eq!(decoded, value);
}

#[test]
fn decode_hex__unknown_tag_is_rejected() {
    let err = ClarityValue::decode_hex("0xff").unwrap_err();
    assert_eq!(err, ClarityError::UnknownTag(0xff));
}

#[test]
fn decode_hex__truncated_payload_is_rejected() {
    // uint tag with only two payload bytes
    let err = ClarityValue::decode_hex("0x010000").unwrap_err();
    assert!(matches!(err, ClarityError::Truncated(_)));
}

#[test]
fn decode_hex__trailing_bytes_are_rejected() {
    let err = ClarityValue::decode_hex("0x0300").unwrap_err();
    assert_eq!(err, ClarityError::TrailingBytes);
}

#[test]
fn into_response__err_payload_is_surfaced_not_swallowed() {
    let value = ClarityValue::ResponseErr(Box::new(ClarityValue::Uint(401)));
    assert!(value.into_response().is_err());
}

#[test]
fn into_optional__flattens_envelope_layers() {
    assert_eq!(ClarityValue::OptionalNone.into_optional(), None);
    assert_eq!(
        ClarityValue::some(ClarityValue::Uint(3)).into_optional(),
        Some(ClarityValue::Uint(3))
    );
    // a bare value counts as present
    assert_eq!(
        ClarityValue::Bool(true).into_optional(),
        Some(ClarityValue::Bool(true))
    );
}

#[test]
fn principal__parses_and_displays_the_deployment_address() {
    let text = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
    let principal = Principal::from_str(text).unwrap();
    assert_eq!(principal.to_string(), text);
    assert_eq!(principal.version(), 26);
}

#[test]
fn principal__known_hash160_vectors_round_trip() {
    let ones = Principal::new(26, [0x01; 20]);
    assert_eq!(ones.to_string(), "STG2081040G2081040G2081040G2081066TB8XK");
    assert_eq!(Principal::from_str(&ones.to_string()).unwrap(), ones);

    // leading zero byte exercises the '0'-digit padding path
    let mut hash160 = [0x02; 20];
    hash160[0] = 0x00;
    let zero_lead = Principal::new(26, hash160);
    assert_eq!(
        zero_lead.to_string(),
        "ST040G2081040G2081040G2081040G20AMC5V16"
    );
    assert_eq!(
        Principal::from_str(&zero_lead.to_string()).unwrap(),
        zero_lead
    );

    let mainnet = Principal::new(22, [0x01; 20]);
    assert_eq!(
        mainnet.to_string(),
        "SPG2081040G2081040G2081040G208107P280EP"
    );
}

#[test]
fn principal__rejects_corrupted_checksum() {
    let err =
        Principal::from_str("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGN").unwrap_err();
    assert!(matches!(
        err,
        PrincipalError::BadChecksum | PrincipalError::BadLength(_)
    ));
}

#[test]
fn principal__normalizes_lowercase_and_confusable_characters() {
    let canonical =
        Principal::from_str("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM").unwrap();
    let folded =
        Principal::from_str("st1pqhqkvOrjxzfy1dgx8mnsnyve3vgzjsrtpgzgm").unwrap();
    assert_eq!(canonical, folded);
}

#[test]
fn principal__serializes_through_the_value_envelope() {
    let principal =
        Principal::from_str("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM").unwrap();
    let value = ClarityValue::Principal(principal);
    let hex = value.encode_hex();
    // tag 0x05, version 0x1a, then the 20-byte hash
    assert!(hex.starts_with("0x051a"));
    assert_eq!(ClarityValue::decode_hex(&hex).unwrap(), value);
}
