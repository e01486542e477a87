//! WebSocket relay integration tests.
//!
//! Registration, message routing, typing indicators and disconnect cleanup
//! observed from real WebSocket clients.

mod fixtures;

use std::time::Duration;

use fixtures::{TestClient, TestServer};
use serde_json::json;

const SILENCE: Duration = Duration::from_millis(300);

#[tokio::test]
async fn test_customer_learns_availability_on_register() {
    // テスト項目: 顧客は登録直後に担当者の在席状況を受け取る
    // given (前提条件):
    let server = TestServer::start().await;
    let mut early = TestClient::connect(&server).await;

    // when (操作): 担当者不在で登録し、担当者の登録後にもう 1 人登録する
    early
        .emit(
            "user_connected",
            json!({"id": "cust-1", "name": "Early", "role": "customer"}),
        )
        .await;
    let first = early.next_event().await;
    let _bob = TestClient::register(&server, "agent-bob", "Bob", "agent").await;
    let mut late = TestClient::connect(&server).await;
    late.emit(
        "user_connected",
        json!({"id": "cust-2", "name": "Late", "role": "customer"}),
    )
    .await;
    let second = late.next_event().await;

    // then (期待する結果):
    assert_eq!(
        first,
        json!({"event": "agent_availability", "data": {"available": false}})
    );
    assert_eq!(
        second,
        json!({"event": "agent_availability", "data": {"available": true}})
    );
}

#[tokio::test]
async fn test_support_desk_scenario() {
    // テスト項目: 顧客のメッセージは全担当者へ、担当者の返信は顧客だけへ届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut bob = TestClient::register(&server, "agent-bob", "Bob", "agent").await;
    let mut carol = TestClient::register(&server, "agent-carol", "Carol", "agent").await;
    let mut alice = TestClient::register(&server, "cust-alice", "Alice", "customer").await;

    // when (操作): Alice が送信
    alice
        .emit(
            "customer_message",
            json!({
                "customerId": "cust-alice",
                "customerName": "Alice",
                "text": "hi",
                "timestamp": "2020-01-01T00:00:00Z"
            }),
        )
        .await;

    // then (期待する結果): Bob と Carol にサーバー時刻付きで届く
    for agent in [&mut bob, &mut carol] {
        let event = agent.next_event().await;
        assert_eq!(event["event"], "customer_message");
        assert_eq!(event["data"]["customerId"], "cust-alice");
        assert_eq!(event["data"]["customerName"], "Alice");
        assert_eq!(event["data"]["text"], "hi");
        assert!(event["data"]["timestamp"].is_i64());
    }
    alice.expect_silence(SILENCE).await;

    // when (操作): Bob が返信
    bob.emit(
        "agent_message",
        json!({
            "customerId": "cust-alice",
            "agentId": "agent-bob",
            "agentName": "Bob",
            "text": "hello"
        }),
    )
    .await;

    // then (期待する結果): Alice だけに届く
    let reply = alice.next_event().await;
    assert_eq!(reply["event"], "agent_message");
    assert_eq!(reply["data"]["agentId"], "agent-bob");
    assert_eq!(reply["data"]["agentName"], "Bob");
    assert_eq!(reply["data"]["text"], "hello");
    carol.expect_silence(SILENCE).await;
}

#[tokio::test]
async fn test_agent_message_to_offline_customer_is_dropped() {
    // テスト項目: 不在の顧客宛ての返信は誰にも届かず、エラーも返らない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut bob = TestClient::register(&server, "agent-bob", "Bob", "agent").await;
    let mut carol = TestClient::register(&server, "agent-carol", "Carol", "agent").await;

    // when (操作):
    bob.emit(
        "agent_message",
        json!({
            "customerId": "cust-gone",
            "agentId": "agent-bob",
            "agentName": "Bob",
            "text": "still there?"
        }),
    )
    .await;

    // then (期待する結果):
    assert!(bob.sync().await);
    carol.expect_silence(SILENCE).await;
}

#[tokio::test]
async fn test_typing_indicator_times_out() {
    // テスト項目: 入力停止シグナルがなくても無操作期間後に停止が通知される
    // given (前提条件):
    let server = TestServer::with_typing_timeout(Duration::from_millis(200)).await;
    let mut bob = TestClient::register(&server, "agent-bob", "Bob", "agent").await;
    let mut alice = TestClient::register(&server, "cust-alice", "Alice", "customer").await;

    // when (操作):
    alice
        .emit(
            "typing_start",
            json!({"userId": "cust-alice", "userName": "Alice", "userRole": "customer"}),
        )
        .await;

    // then (期待する結果):
    assert_eq!(
        bob.next_event().await,
        json!({
            "event": "user_typing",
            "data": {"userId": "cust-alice", "userName": "Alice", "userRole": "customer"}
        })
    );
    assert_eq!(
        bob.next_event().await,
        json!({"event": "user_stopped_typing", "data": {"userId": "cust-alice"}})
    );
    alice.expect_silence(SILENCE).await;
}

#[tokio::test]
async fn test_agent_typing_reaches_only_target_customer() {
    // テスト項目: 担当者の入力中表示は宛先の顧客だけに届き、明示的な停止で消える
    // given (前提条件):
    let server = TestServer::start().await;
    let mut bob = TestClient::register(&server, "agent-bob", "Bob", "agent").await;
    let mut carol = TestClient::register(&server, "agent-carol", "Carol", "agent").await;
    let mut alice = TestClient::register(&server, "cust-alice", "Alice", "customer").await;
    let mut dan = TestClient::register(&server, "cust-dan", "Dan", "customer").await;
    let typing = json!({
        "userId": "agent-bob",
        "userName": "Bob",
        "userRole": "agent",
        "targetId": "cust-alice"
    });

    // when (操作):
    bob.emit("typing_start", typing.clone()).await;
    bob.emit("typing_stop", typing).await;

    // then (期待する結果):
    assert_eq!(alice.next_event().await["event"], "user_typing");
    assert_eq!(alice.next_event().await["event"], "user_stopped_typing");
    carol.expect_silence(SILENCE).await;
    dan.expect_silence(SILENCE).await;
}

#[tokio::test]
async fn test_disconnect_while_typing_sends_no_stop() {
    // テスト項目: 入力中に切断しても入力停止は通知されず、在席情報から消える
    // given (前提条件):
    let server = TestServer::with_typing_timeout(Duration::from_millis(200)).await;
    let mut bob = TestClient::register(&server, "agent-bob", "Bob", "agent").await;
    let mut alice = TestClient::register(&server, "cust-alice", "Alice", "customer").await;
    alice
        .emit(
            "typing_start",
            json!({"userId": "cust-alice", "userName": "Alice", "userRole": "customer"}),
        )
        .await;
    assert_eq!(bob.next_event().await["event"], "user_typing");

    // when (操作):
    alice.close().await;

    // then (期待する結果): タイムアウトを過ぎても何も届かない
    bob.expect_silence(Duration::from_millis(600)).await;
    let presence = server.get_json("/api/presence").await;
    assert_eq!(presence["customers"], json!([]));
    assert_eq!(presence["typing"], json!([]));
}

#[tokio::test]
async fn test_legacy_events_broadcast_to_all_but_sender() {
    // テスト項目: 旧形式のイベントは未登録を含む送信者以外の全接続にそのまま届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut bob = TestClient::register(&server, "agent-bob", "Bob", "agent").await;
    let mut anonymous = TestClient::connect(&server).await;
    anonymous.sync().await;
    let mut sender = TestClient::connect(&server).await;

    // when (操作):
    sender
        .emit("chat message", json!({"text": "old client", "sender": "x"}))
        .await;

    // then (期待する結果):
    let expected = json!({"event": "chat message", "data": {"text": "old client", "sender": "x"}});
    assert_eq!(bob.next_event().await, expected);
    assert_eq!(anonymous.next_event().await, expected);
    sender.expect_silence(SILENCE).await;
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    // テスト項目: 不正なフレームは破棄され、接続は維持される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::register(&server, "cust-alice", "Alice", "customer").await;

    // when (操作):
    alice.send_raw("not json".to_string()).await;
    alice
        .emit("unknown_event", json!({"anything": true}))
        .await;
    alice
        .emit(
            "customer_message",
            json!({"customerId": "cust-alice", "customerName": "Alice"}),
        )
        .await;

    // then (期待する結果): 応答はなく、後続の問い合わせには答える
    assert!(!alice.sync().await);
}
