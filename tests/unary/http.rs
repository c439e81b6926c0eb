use crate::common::*;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

/// What the responder saw.
#[derive(Debug)]
struct Seen {
    request_line: String,
    body: String,
}

/// Serve exactly one request with `status` and `body`, reporting what arrived.
fn respond_once(status: &str, body: &str) -> (Client, mpsc::Receiver<Seen>) {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let status = status.to_string();
    let body = body.to_string();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        let mut content_length = 0usize;
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).unwrap();
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }
        let mut received = vec![0u8; content_length];
        reader.read_exact(&mut received).unwrap();

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
        .unwrap();
        stream.flush().unwrap();

        let _ = tx.send(Seen {
            request_line: request_line.trim_end().to_string(),
            body: String::from_utf8(received).unwrap(),
        });
    });

    let config = ClientConfig {
        base_path: format!("127.0.0.1:{}/api", port),
        use_tls: false,
        ..ClientConfig::default()
    };
    (Client::new(config), rx)
}

#[tokio::test]
async fn test_post_round_trip() {
    let (client, seen) = respond_once("200 OK", r#"{"text":"pong","sequence":"7"}"#);

    let request = Note {
        text: "ping".to_string(),
        ..Note::default()
    };
    let reply: Note = client
        .call("Echo", HttpMethod::Post, &request)
        .await
        .unwrap();
    assert_eq!(reply.text, "pong");
    assert_eq!(reply.sequence, 7);

    let seen = seen.recv().unwrap();
    assert_eq!(seen.request_line, "POST /api/Echo HTTP/1.1");
    let sent: Value = serde_json::from_str(&seen.body).unwrap();
    assert_eq!(sent, json!({"text": "ping"}));
}

#[tokio::test]
async fn test_get_sends_query() {
    let (client, seen) = respond_once("200 OK", "{}");

    let reply: Value = client
        .call("Lookup", HttpMethod::Get, &json!({"id": "abc"}))
        .await
        .unwrap();
    assert_eq!(reply, json!({}));

    let seen = seen.recv().unwrap();
    assert_eq!(seen.request_line, "GET /api/Lookup?id=abc HTTP/1.1");
    assert!(seen.body.is_empty());
}

#[tokio::test]
async fn test_empty_body_is_empty_message() {
    let (client, _seen) = respond_once("200 OK", "");
    let reply: Note = client
        .call("Touch", HttpMethod::Put, &Note::default())
        .await
        .unwrap();
    assert_eq!(reply, Note::default());
}

#[tokio::test]
async fn test_error_status() {
    let (client, _seen) = respond_once("404 Not Found", r#"{"error":"missing"}"#);
    let err = client
        .call::<Value, Value>("Missing", HttpMethod::Post, &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http { status: 404, .. }));
}

#[tokio::test]
async fn test_malformed_response() {
    let (client, _seen) = respond_once("200 OK", r#"{"sequence":"seven"}"#);
    let err = client
        .call::<Value, Note>("Echo", HttpMethod::Post, &json!({}))
        .await
        .unwrap_err();
    match err {
        Error::Decode { field, .. } => assert_eq!(field, "Note.sequence"),
        other => panic!("Expected decode error, got {:?}", other),
    }
}
