//! Stream shapes over real WebSockets against a localhost server.

use crate::common::*;
use futures_util::{SinkExt, StreamExt};
use mercury::{TungsteniteSocketFactory, EOF_MESSAGE};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as Frame;
use tokio_tungstenite::WebSocketStream;

type ServerSocket = WebSocketStream<tokio::net::TcpStream>;

/// Accept one WebSocket connection and hand it to `behaviour`.
async fn serve_once<F, Fut>(behaviour: F) -> (Client, JoinHandle<()>)
where
    F: FnOnce(ServerSocket) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        behaviour(ws).await;
    });

    let config = ClientConfig {
        base_path: format!("127.0.0.1:{}/api", port),
        use_tls: false,
        ..ClientConfig::default()
    };
    let client = Client::with_transports(
        config,
        Arc::new(RecordingHttpTransport::new()),
        Arc::new(TungsteniteSocketFactory::new()),
    );
    (client, server)
}

/// Read until the peer's close handshake completes.
async fn drain(ws: &mut ServerSocket) {
    while let Some(Ok(_)) = ws.next().await {}
}

#[tokio::test]
async fn test_dual_stream_echo() {
    let (client, server) = serve_once(|mut ws| async move {
        while let Some(Ok(frame)) = ws.next().await {
            if let Frame::Text(text) = frame {
                // Echo everything, including the end-of-stream sentinel
                ws.send(Frame::Text(text)).await.unwrap();
            }
        }
    })
    .await;

    let chat = client
        .start_dual_stream::<Value, Value>("Chat")
        .await
        .unwrap();
    for n in 1..=3 {
        chat.send(&json!({"n": n})).await.unwrap();
    }
    chat.close_send().await.unwrap();

    for n in 1..=3 {
        assert_eq!(chat.recv().await.unwrap(), json!({"n": n}));
    }
    assert_eq!(chat.recv().await.unwrap_err(), Error::Eof);

    chat.close_early(client.close_code(), "done").await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn test_server_stream_then_clean_close() {
    let (client, server) = serve_once(|mut ws| async move {
        let request = match ws.next().await {
            Some(Ok(Frame::Text(text))) => text,
            other => panic!("Expected request frame, got {:?}", other),
        };
        let request: Value = serde_json::from_str(&request).unwrap();
        let count = request["count"].as_u64().unwrap();
        for n in 0..count {
            ws.send(Frame::Text(json!({"item": n}).to_string()))
                .await
                .unwrap();
        }
        ws.close(None).await.unwrap();
        drain(&mut ws).await;
    })
    .await;

    let feed = client
        .start_server_stream::<Value, Value>("Feed", json!({"count": 2}))
        .await
        .unwrap();
    assert_eq!(feed.recv().await.unwrap(), json!({"item": 0}));
    assert_eq!(feed.recv().await.unwrap(), json!({"item": 1}));
    // Clean close without a sentinel is still a normal end of stream
    assert_eq!(feed.recv().await.unwrap_err(), Error::Eof);
    server.await.unwrap();
}

#[tokio::test]
async fn test_dropped_connection_after_data() {
    let (client, server) = serve_once(|mut ws| async move {
        let _ = ws.next().await;
        ws.send(Frame::Text("\"partial\"".to_string())).await.unwrap();
        // Drop the TCP stream without a close handshake
        drop(ws);
    })
    .await;

    let feed = client
        .start_server_stream::<Value, Value>("Feed", json!({}))
        .await
        .unwrap();
    assert_eq!(feed.recv().await.unwrap(), json!("partial"));
    assert!(matches!(
        feed.recv().await,
        Err(Error::Transport { .. })
    ));
    server.await.unwrap();
}

#[tokio::test]
async fn test_client_stream_sum() {
    let (client, server) = serve_once(|mut ws| async move {
        let mut total = 0;
        while let Some(Ok(Frame::Text(text))) = ws.next().await {
            if text == EOF_MESSAGE {
                break;
            }
            let value: Value = serde_json::from_str(&text).unwrap();
            total += value["n"].as_i64().unwrap();
        }
        ws.send(Frame::Text(json!({"total": total}).to_string()))
            .await
            .unwrap();
        ws.send(Frame::Text(EOF_MESSAGE.to_string())).await.unwrap();
        ws.close(None).await.unwrap();
        drain(&mut ws).await;
    })
    .await;

    let upload = client
        .start_client_stream::<Value, Value>("Sum")
        .await
        .unwrap();
    for n in [4, 5, 6] {
        upload.send(&json!({"n": n})).await.unwrap();
    }
    assert_eq!(upload.close_and_recv().await.unwrap(), json!({"total": 15}));
    server.await.unwrap();
}
