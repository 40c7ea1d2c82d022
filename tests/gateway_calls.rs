use checkers_client::{
    clarity::ClarityValue,
    error::ClientError,
    gateway::{
        ContractGateway,
        OpKind,
        OpStatus,
    },
    test_helpers::{
        MockWallet,
        ScriptedChain,
        board_value,
        game_record_value,
        test_contract,
        test_principal,
    },
};
use std::sync::Arc;

fn gateway_with(
    wallet: MockWallet,
) -> (Arc<ContractGateway<MockWallet, ScriptedChain>>, Arc<MockWallet>) {
    let wallet = Arc::new(wallet);
    let gateway = Arc::new(ContractGateway::new(
        test_contract(),
        Arc::clone(&wallet),
        ScriptedChain::new(),
    ));
    (gateway, wallet)
}

#[tokio::test]
async fn create_game__packages_no_arguments() {
    // given
    let (gateway, wallet) = gateway_with(MockWallet::signed_in(test_principal(0x01)));

    // when
    let receipt = gateway.create_game().await.unwrap();

    // then
    assert!(!receipt.txid.is_empty());
    let calls = wallet.recorded_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function, "create-game");
    assert!(calls[0].args.is_empty());
    assert_eq!(calls[0].contract, test_contract());
}

#[tokio::test]
async fn submit_move__packages_game_id_and_positions_as_uints() {
    let (gateway, wallet) = gateway_with(MockWallet::signed_in(test_principal(0x01)));

    gateway.submit_move(5, 12, 21).await.unwrap();

    let calls = wallet.recorded_calls();
    assert_eq!(calls[0].function, "move");
    assert_eq!(
        calls[0].args,
        vec![
            ClarityValue::Uint(5),
            ClarityValue::Uint(12),
            ClarityValue::Uint(21),
        ]
    );
}

#[tokio::test]
async fn join_game__rejection_is_recoverable_without_retry() {
    // given a wallet that declines the prompt
    let wallet = MockWallet::signed_in(test_principal(0x01));
    wallet.reject_next_call();
    let (gateway, _wallet) = gateway_with(wallet);

    // when
    let first = gateway.join_game(3).await;

    // then the rejection surfaces and the in-flight slot is released
    assert!(matches!(first, Err(ClientError::UserRejected)));
    assert!(!gateway.is_busy());
    let second = gateway.join_game(3).await;
    assert!(second.is_ok());
}

#[tokio::test]
async fn join_game__transport_failure_maps_to_broadcast_failed() {
    let wallet = MockWallet::signed_in(test_principal(0x01));
    wallet.fail_next_call("connection reset");
    let (gateway, _wallet) = gateway_with(wallet);

    let result = gateway.join_game(3).await;

    assert!(matches!(result, Err(ClientError::BroadcastFailed(_))));
    assert!(!gateway.is_busy());
}

#[tokio::test]
async fn submit__same_kind_double_submission_is_rejected() {
    // given a wallet that holds the first call at the confirmation prompt
    let wallet = MockWallet::signed_in(test_principal(0x01)).with_manual_confirmation();
    let (gateway, wallet) = gateway_with(wallet);

    let first = tokio::spawn({
        let gateway = Arc::clone(&gateway);
        async move { gateway.submit_move(5, 12, 21).await }
    });
    tokio::task::yield_now().await;
    assert!(gateway.is_busy());

    // when a second move is fired while the first is at the prompt
    let second = gateway.submit_move(5, 12, 21).await;

    // then it is refused up front instead of double-submitting
    assert!(matches!(
        second,
        Err(ClientError::OperationInFlight(OpKind::Move))
    ));

    // and the original call still completes once approved
    wallet.approve_one();
    let first = first.await.unwrap();
    assert!(first.is_ok());
    assert_eq!(wallet.recorded_calls().len(), 1);
    assert!(!gateway.is_busy());
}

#[tokio::test]
async fn submit__different_kinds_may_interleave() {
    // the ledger arbitrates conflicts between different operations; only
    // same-kind duplicates are stopped locally
    let wallet = MockWallet::signed_in(test_principal(0x01)).with_manual_confirmation();
    let (gateway, wallet) = gateway_with(wallet);

    let join = tokio::spawn({
        let gateway = Arc::clone(&gateway);
        async move { gateway.join_game(5).await }
    });
    tokio::task::yield_now().await;

    let mv = tokio::spawn({
        let gateway = Arc::clone(&gateway);
        async move { gateway.submit_move(5, 12, 21).await }
    });
    tokio::task::yield_now().await;
    assert_eq!(gateway.pending_operations().len(), 2);

    wallet.approve_one();
    wallet.approve_one();
    assert!(join.await.unwrap().is_ok());
    assert!(mv.await.unwrap().is_ok());
}

#[tokio::test]
async fn submit__pending_operation_reports_the_wallet_stage() {
    // given a wallet holding the call at the confirmation prompt
    let wallet = MockWallet::signed_in(test_principal(0x01)).with_manual_confirmation();
    let (gateway, wallet) = gateway_with(wallet);

    let task = tokio::spawn({
        let gateway = Arc::clone(&gateway);
        async move { gateway.join_game(5).await }
    });
    tokio::task::yield_now().await;

    // then the table shows the suspension point the user is actually at
    let pending = gateway.pending_operations();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].kind, OpKind::JoinGame);
    assert_eq!(pending[0].status, OpStatus::AwaitingConfirmation);

    // and the entry is gone once the call resolves
    wallet.approve_one();
    assert!(task.await.unwrap().is_ok());
    assert!(gateway.pending_operations().is_empty());
}

#[tokio::test]
async fn get_game__decodes_the_record_wholesale() {
    let player1 = test_principal(0xA1);
    let player2 = test_principal(0xB2);
    let chain = ScriptedChain::new();
    chain.stage(
        "get-game",
        7,
        game_record_value(player1, Some(player2), player2, true),
    );
    let gateway = ContractGateway::new(
        test_contract(),
        Arc::new(MockWallet::signed_out()),
        chain,
    );

    let record = gateway.get_game(7).await.unwrap().unwrap();

    assert_eq!(record.player1, player1);
    assert_eq!(record.player2, Some(player2));
    assert_eq!(record.current_turn, player2);
    assert!(record.is_active);
}

#[tokio::test]
async fn get_game__turn_matching_neither_player_is_kept() {
    // the ledger owns turn alternation; an inconsistent record is reported
    // as-is rather than discarded
    let player1 = test_principal(0xA1);
    let stranger = test_principal(0xC3);
    let chain = ScriptedChain::new();
    chain.stage(
        "get-game",
        7,
        game_record_value(player1, Some(test_principal(0xB2)), stranger, true),
    );
    let gateway = ContractGateway::new(
        test_contract(),
        Arc::new(MockWallet::signed_out()),
        chain,
    );

    let record = gateway.get_game(7).await.unwrap().unwrap();

    assert_eq!(record.current_turn, stranger);
    assert_eq!(record.player1, player1);
}

#[tokio::test]
async fn get_game__unknown_game_reads_as_none() {
    let gateway = ContractGateway::new(
        test_contract(),
        Arc::new(MockWallet::signed_out()),
        ScriptedChain::new(),
    );
    assert_eq!(gateway.get_game(99).await.unwrap(), None);
}

#[tokio::test]
async fn get_game__missing_field_is_a_decode_anomaly() {
    let chain = ScriptedChain::new();
    // player2 entry dropped entirely
    let mut entries = std::collections::BTreeMap::new();
    entries.insert(
        "player1".to_string(),
        ClarityValue::Principal(test_principal(0xA1)),
    );
    entries.insert(
        "current-turn".to_string(),
        ClarityValue::Principal(test_principal(0xA1)),
    );
    entries.insert("is-active".to_string(), ClarityValue::Bool(true));
    chain.stage("get-game", 7, ClarityValue::some(ClarityValue::Tuple(entries)));
    let gateway = ContractGateway::new(
        test_contract(),
        Arc::new(MockWallet::signed_out()),
        chain,
    );

    let result = gateway.get_game(7).await;

    assert!(matches!(result, Err(ClientError::DecodeAnomaly(_))));
}

#[tokio::test]
async fn get_board__unknown_game_reads_as_empty_board() {
    let gateway = ContractGateway::new(
        test_contract(),
        Arc::new(MockWallet::signed_out()),
        ScriptedChain::new(),
    );
    let board = gateway.get_board(3).await.unwrap();
    assert!(board.cells().iter().all(|&code| code == 0));
}

#[tokio::test]
async fn get_board__sparse_payload_decodes_densely() {
    let chain = ScriptedChain::new();
    chain.stage("get-board", 3, board_value(&[(0, 1), (63, 4)]));
    let gateway = ContractGateway::new(
        test_contract(),
        Arc::new(MockWallet::signed_out()),
        chain,
    );

    let board = gateway.get_board(3).await.unwrap();

    assert_eq!(board.code_at(0), Some(1));
    assert_eq!(board.code_at(63), Some(4));
    assert_eq!(board.cells().iter().filter(|&&c| c != 0).count(), 2);
}

#[tokio::test]
async fn get_game__outage_surfaces_as_query_failed() {
    let chain = ScriptedChain::new();
    chain.set_failing(true);
    let gateway = ContractGateway::new(
        test_contract(),
        Arc::new(MockWallet::signed_out()),
        chain,
    );

    let result = gateway.get_game(7).await;

    assert!(matches!(result, Err(ClientError::QueryFailed(_))));
}
