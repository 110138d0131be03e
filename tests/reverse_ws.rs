//! End-to-end tests over a real localhost WebSocket.
//!
//! Each test plays the OneBot client with `tokio-tungstenite`.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use onebot_bridge::{Bot, Error, Event, SessionState};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, StatusCode};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Helpers
// ============================================================================

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn start(endpoint: &str) -> (Bot, String) {
    init_logging();
    let bot = Bot::builder()
        .port(0)
        .endpoint(endpoint)
        .build()
        .expect("valid config");
    let server = bot.bind().await.expect("bind");
    let url = server.ws_url();
    tokio::spawn(server.run());
    (bot, url)
}

async fn connect(url: &str, role: &str) -> Result<Client, tungstenite::Error> {
    let mut request = url.into_client_request()?;
    let headers = request.headers_mut();
    headers.insert("X-Client-Role", HeaderValue::from_str(role).expect("header"));
    headers.insert("X-Self-ID", HeaderValue::from_static("10001"));
    connect_async(request).await.map(|(ws, _)| ws)
}

async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..300 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

async fn read_frame(client: &mut Client) -> Value {
    loop {
        match client.next().await {
            Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).expect("json"),
            Some(Ok(_)) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

async fn send_json(client: &mut Client, value: Value) {
    client
        .send(Message::Text(value.to_string().into()))
        .await
        .expect("client send");
}

fn refusal_status(result: Result<Client, tungstenite::Error>) -> StatusCode {
    match result {
        Err(tungstenite::Error::Http(response)) => response.status(),
        Err(other) => panic!("expected HTTP refusal, got {other}"),
        Ok(_) => panic!("expected HTTP refusal, connection was accepted"),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn send_msg_round_trip() {
    let (bot, url) = start("/ws/").await;
    let mut client = connect(&url, "Universal").await.expect("connect");
    wait_for(|| bot.is_connected()).await;

    let call = {
        let bot = bot.clone();
        tokio::spawn(async move {
            bot.call(
                "send_msg",
                json!({
                    "message_type": "group",
                    "group_id": 10,
                    "message": [{"type": "text", "data": {"text": "hi"}}]
                }),
                Duration::from_secs(3),
            )
            .await
        })
    };

    let request = read_frame(&mut client).await;
    assert_eq!(request["action"], "send_msg");
    assert_eq!(request["params"]["message"][0]["data"]["text"], "hi");
    assert!(request["echo"].as_u64().is_some_and(|echo| echo > 0));

    tokio::time::sleep(Duration::from_millis(50)).await;
    send_json(
        &mut client,
        json!({"status": "ok", "retcode": 0, "data": {"message_id": 42}, "echo": request["echo"]}),
    )
    .await;

    let data = call.await.expect("task").expect("call succeeds");
    assert_eq!(data, json!({"message_id": 42}));
    assert_eq!(bot.pending_count(), 0);
}

#[tokio::test]
async fn timeout_then_late_result_is_ignored() {
    let (bot, url) = start("/ws").await;
    let mut client = connect(&url, "universal").await.expect("connect");
    wait_for(|| bot.is_connected()).await;

    let call = {
        let bot = bot.clone();
        tokio::spawn(async move {
            bot.call("send_msg", json!({}), Duration::from_millis(300))
                .await
        })
    };
    let request = read_frame(&mut client).await;

    let err = call.await.expect("task").expect_err("should time out");
    assert!(matches!(err, Error::Timeout { .. }));
    assert_eq!(bot.pending_count(), 0);

    // Late arrival is dropped and the session keeps working.
    send_json(
        &mut client,
        json!({"status": "ok", "data": {"message_id": 1}, "echo": request["echo"]}),
    )
    .await;

    let next = {
        let bot = bot.clone();
        tokio::spawn(async move { bot.call("get_status", json!({}), Duration::from_secs(3)).await })
    };
    let request = read_frame(&mut client).await;
    send_json(
        &mut client,
        json!({"status": "ok", "data": {"online": true}, "echo": request["echo"]}),
    )
    .await;
    assert_eq!(
        next.await.expect("task").expect("call succeeds"),
        json!({"online": true})
    );
}

#[tokio::test]
async fn events_reach_every_handler() {
    let (bot, url) = start("/ws").await;
    let (tx, mut rx) = mpsc::unbounded_channel();

    for index in 0..2 {
        let tx = tx.clone();
        bot.on_event(move |event: Event| {
            let tx = tx.clone();
            async move {
                let _ = tx.send((index, event));
                Ok(())
            }
        });
    }

    let mut client = connect(&url, "universal").await.expect("connect");
    wait_for(|| bot.is_connected()).await;

    let payload = json!({
        "post_type": "message",
        "message_type": "group",
        "group_id": 10,
        "user_id": 2000,
        "message": [{"type": "text", "data": {"text": "hi"}}]
    });
    send_json(&mut client, payload.clone()).await;

    let mut seen = Vec::new();
    for _ in 0..2 {
        let (index, event) = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("handler ran")
            .expect("event");
        assert_eq!(*event.raw(), payload);
        seen.push(index);
    }
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1]);
}

#[tokio::test]
async fn second_connection_is_rejected_until_first_leaves() {
    let (bot, url) = start("/ws").await;
    let mut first = connect(&url, "universal").await.expect("connect");
    wait_for(|| bot.is_connected()).await;

    assert_eq!(
        refusal_status(connect(&url, "universal").await),
        StatusCode::CONFLICT
    );
    assert!(bot.is_connected());

    first.close(None).await.expect("close");
    wait_for(|| bot.session_state() == SessionState::Idle).await;

    let _second = connect(&url, "universal").await.expect("reconnect");
    wait_for(|| bot.is_connected()).await;
}

#[tokio::test]
async fn wrong_role_and_wrong_path_are_refused() {
    let (bot, url) = start("/ws/").await;

    assert_eq!(
        refusal_status(connect(&url, "event").await),
        StatusCode::FORBIDDEN
    );

    let without_slash = url.trim_end_matches('/').to_string();
    assert_eq!(
        refusal_status(connect(&without_slash, "universal").await),
        StatusCode::NOT_FOUND
    );

    assert_eq!(bot.session_state(), SessionState::Idle);
    assert!(!bot.is_connected());
}

#[tokio::test]
async fn disconnect_fails_pending_calls() {
    let (bot, url) = start("/ws").await;
    let mut client = connect(&url, "universal").await.expect("connect");
    wait_for(|| bot.is_connected()).await;

    let call = {
        let bot = bot.clone();
        tokio::spawn(async move { bot.call("get_status", json!({}), Duration::from_secs(10)).await })
    };
    let _request = read_frame(&mut client).await;
    drop(client);

    let err = call.await.expect("task").expect_err("session ended");
    assert!(matches!(err, Error::ConnectionClosed));
    assert_eq!(bot.pending_count(), 0);
    wait_for(|| bot.session_state() == SessionState::Idle).await;
}

#[tokio::test]
async fn shutdown_closes_session() {
    let (bot, url) = start("/ws").await;
    let mut client = connect(&url, "universal").await.expect("connect");
    wait_for(|| bot.is_connected()).await;

    bot.shutdown();

    let closed = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match client.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(closed.is_ok());
    wait_for(|| !bot.is_connected()).await;
}
