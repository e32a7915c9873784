//! Integration tests for the relay server using in-process servers and real websocket clients.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use hiroba_server::{ConnectionRegistry, Server};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
    task::JoinHandle,
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);
const SILENCE_WINDOW: Duration = Duration::from_millis(300);

/// Helper struct to manage an in-process server lifecycle
struct TestServer {
    addr: SocketAddr,
    registry: Arc<ConnectionRegistry>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server on an ephemeral port
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let registry = Arc::new(ConnectionRegistry::new());
        let server = Server::new(Arc::clone(&registry));
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            server
                .serve(listener, async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        TestServer {
            addr,
            registry,
            shutdown: Some(shutdown),
            handle,
        }
    }

    fn ws_url(&self) -> String {
        format!("ws://{}/", self.addr)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Connect a client and wait until the server has registered it
    async fn connect(&self) -> Client {
        let expected = self.registry.len() + 1;
        let (client, _response) = connect_async(self.ws_url()).await.unwrap();
        self.wait_for_connections(expected).await;
        client
    }

    async fn wait_for_connections(&self, expected: usize) {
        let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
        while self.registry.len() != expected {
            assert!(
                tokio::time::Instant::now() < deadline,
                "expected {} connections, registry has {}",
                expected,
                self.registry.len()
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.handle.abort();
    }
}

async fn send_text(client: &mut Client, frame: &str) {
    client.send(Message::Text(frame.into())).await.unwrap();
}

async fn recv_text(client: &mut Client) -> String {
    loop {
        let message = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = message {
            return text.as_str().to_string();
        }
    }
}

async fn assert_silent(client: &mut Client) {
    let result = tokio::time::timeout(SILENCE_WINDOW, client.next()).await;
    assert!(result.is_err(), "expected no frame, got {:?}", result);
}

async fn assert_closed(client: &mut Client) {
    let result = tokio::time::timeout(RECV_TIMEOUT, client.next())
        .await
        .expect("connection was not closed");
    assert!(
        matches!(result, None | Some(Err(_)) | Some(Ok(Message::Close(_)))),
        "expected the connection to be closed, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_message_reaches_other_client_but_not_sender() {
    // テスト項目: alice のメッセージが bob にそのまま届き、alice 自身には返らない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut bob = server.connect().await;
    let mut alice = server.connect().await;
    let frame = r#"{"sender":"alice","text":"hi"}"#;

    // when (操作):
    send_text(&mut alice, frame).await;

    // then (期待する結果):
    assert_eq!(recv_text(&mut bob).await, frame);
    assert_silent(&mut alice).await;
}

#[tokio::test]
async fn test_fan_out_reaches_all_other_clients() {
    // テスト項目: 3 クライアント接続時、送信者以外の 2 クライアントに届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    let mut charlie = server.connect().await;
    let frame = r#"{"sender":"alice","text":"hello all"}"#;

    // when (操作):
    send_text(&mut alice, frame).await;

    // then (期待する結果):
    assert_eq!(recv_text(&mut bob).await, frame);
    assert_eq!(recv_text(&mut charlie).await, frame);
    assert_silent(&mut alice).await;
}

#[tokio::test]
async fn test_extra_fields_are_passed_through() {
    // テスト項目: 追加フィールドを含むフレームが再エンコードされずに転送される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    let frame = r#"{"sender":"alice","text":"hi","color":"magenta"}"#;

    // when (操作):
    send_text(&mut alice, frame).await;

    // then (期待する結果):
    assert_eq!(recv_text(&mut bob).await, frame);
}

#[tokio::test]
async fn test_abrupt_disconnect_does_not_affect_others() {
    // テスト項目: bob が突然切断しても alice のメッセージは charlie に届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let bob = server.connect().await;
    let mut charlie = server.connect().await;
    let frame = r#"{"sender":"alice","text":"still there?"}"#;

    // when (操作):
    drop(bob);
    send_text(&mut alice, frame).await;

    // then (期待する結果):
    assert_eq!(recv_text(&mut charlie).await, frame);
    server.wait_for_connections(2).await;
    assert_silent(&mut alice).await;
}

#[tokio::test]
async fn test_malformed_frame_closes_only_that_connection() {
    // テスト項目: 不正なフレームを送った接続だけが閉じられ、他の接続は影響を受けない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut mallory = server.connect().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;

    // when (操作):
    send_text(&mut mallory, "this is not json").await;

    // then (期待する結果):
    assert_closed(&mut mallory).await;
    server.wait_for_connections(2).await;
    assert_silent(&mut bob).await;

    let frame = r#"{"sender":"alice","text":"after"}"#;
    send_text(&mut alice, frame).await;
    assert_eq!(recv_text(&mut bob).await, frame);
}

#[tokio::test]
async fn test_binary_frame_closes_only_that_connection() {
    // テスト項目: バイナリフレームを送った接続だけが閉じられ、他の接続は登録されたまま残る
    // given (前提条件):
    let server = TestServer::start().await;
    let mut mallory = server.connect().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;

    // when (操作):
    mallory
        .send(Message::Binary(vec![0x01, 0x02, 0x03].into()))
        .await
        .unwrap();

    // then (期待する結果):
    assert_closed(&mut mallory).await;
    server.wait_for_connections(2).await;
    assert_silent(&mut bob).await;

    let frame = r#"{"sender":"alice","text":"after"}"#;
    send_text(&mut alice, frame).await;
    assert_eq!(recv_text(&mut bob).await, frame);
}

#[tokio::test]
async fn test_json_array_frame_is_not_forwarded() {
    // テスト項目: JSON 配列のフレームは転送されず、送信した接続が閉じられる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut mallory = server.connect().await;
    let mut bob = server.connect().await;

    // when (操作):
    send_text(&mut mallory, r#"["mallory","hi"]"#).await;

    // then (期待する結果):
    assert_closed(&mut mallory).await;
    server.wait_for_connections(1).await;
    assert_silent(&mut bob).await;
}

#[tokio::test]
async fn test_clean_close_deregisters_connection() {
    // テスト項目: クライアントが正常にクローズすると登録が解除される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let _bob = server.connect().await;

    // when (操作):
    alice.close(None).await.unwrap();

    // then (期待する結果):
    server.wait_for_connections(1).await;
}

#[tokio::test]
async fn test_ws_path_is_also_accepted() {
    // テスト項目: /ws パスでも接続・中継できる
    // given (前提条件):
    let server = TestServer::start().await;
    let (mut alice, _) = connect_async(format!("ws://{}/ws", server.addr))
        .await
        .unwrap();
    server.wait_for_connections(1).await;
    let mut bob = server.connect().await;
    let frame = r#"{"sender":"alice","text":"via /ws"}"#;

    // when (操作):
    send_text(&mut alice, frame).await;

    // then (期待する結果):
    assert_eq!(recv_text(&mut bob).await, frame);
}

#[tokio::test]
async fn test_health_check_endpoint() {
    // テスト項目: ヘルスチェックエンドポイントが ok を返す
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let body: serde_json::Value = reqwest::get(server.http_url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn test_connection_count_endpoint() {
    // テスト項目: 接続数エンドポイントが現在の接続数を返す
    // given (前提条件):
    let server = TestServer::start().await;
    let _alice = server.connect().await;
    let _bob = server.connect().await;

    // when (操作):
    let body: serde_json::Value = reqwest::get(server.http_url("/api/connections"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(body, serde_json::json!({"connections": 2}));
}
