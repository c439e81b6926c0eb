//! Stream shapes over scripted sockets.

use crate::common::*;
use mercury::{ConnectionPhase, EOF_MESSAGE};
use std::time::Duration;

#[tokio::test]
async fn test_typed_server_stream() {
    let sockets = ScriptedSocketFactory::auto_open();
    let client = test_client(&RecordingHttpTransport::new(), &sockets);

    let request = Note {
        text: "subscribe".to_string(),
        ..Note::default()
    };
    let feed = client
        .start_server_stream::<Note, Note>("Notes", request)
        .await
        .unwrap();
    assert_eq!(sockets.sent(), vec![r#"{"text":"subscribe"}"#.to_string()]);

    sockets.message(r#"{"text":"one","mood":"HAPPY"}"#);
    sockets.message(r#"{"text":"two","sequence":"2"}"#);
    sockets.message(EOF_MESSAGE);

    let first = feed.recv().await.unwrap();
    assert_eq!(first.text, "one");
    assert_eq!(first.mood, Mood::Happy);
    assert_eq!(feed.recv().await.unwrap().sequence, 2);
    assert_eq!(feed.recv().await.unwrap_err(), Error::Eof);
}

#[tokio::test]
async fn test_bad_frame_does_not_end_stream() {
    let sockets = ScriptedSocketFactory::auto_open();
    let client = test_client(&RecordingHttpTransport::new(), &sockets);
    let chat = client.start_dual_stream::<Note, Note>("Chat").await.unwrap();

    sockets.message(r#"{"text":"fine"}"#);
    sockets.message(r#"{"text":5}"#);
    sockets.message(r#"{"text":"still fine"}"#);

    assert_eq!(chat.recv().await.unwrap().text, "fine");
    match chat.recv().await {
        Err(Error::Decode { field, .. }) => assert_eq!(field, "Note.text"),
        other => panic!("Expected Decode, got {:?}", other),
    }
    assert_eq!(chat.recv().await.unwrap().text, "still fine");
}

#[tokio::test]
async fn test_client_stream_upload() {
    let sockets = ScriptedSocketFactory::auto_open();
    let client = test_client(&RecordingHttpTransport::new(), &sockets);
    let upload = client
        .start_client_stream::<Value, Value>("Upload")
        .await
        .unwrap();

    for n in 0..3 {
        upload.send(&json!({"part": n})).await.unwrap();
    }
    sockets.message(r#"{"parts":3}"#);
    assert_eq!(upload.close_and_recv().await.unwrap(), json!({"parts": 3}));
    assert_eq!(sockets.sent().last().map(String::as_str), Some("EOF"));
    assert_eq!(
        upload.transport().phases().send,
        ConnectionPhase::SendClosed
    );
}

#[tokio::test]
async fn test_many_concurrent_senders_keep_frames_whole() {
    let sockets = ScriptedSocketFactory::auto_open();
    let client = test_client(&RecordingHttpTransport::new(), &sockets);
    let chat = client
        .start_dual_stream::<Value, Value>("Chat")
        .await
        .unwrap();

    let mut handles = Vec::new();
    for n in 0..50 {
        let chat = chat.clone();
        handles.push(tokio::spawn(async move { chat.send(&json!(n)).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    let mut sent: Vec<i64> = sockets
        .sent()
        .iter()
        .map(|frame| frame.parse().unwrap())
        .collect();
    sent.sort();
    assert_eq!(sent, (0..50).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_abort_unblocks_receiver() {
    let sockets = ScriptedSocketFactory::auto_open();
    let client = test_client(&RecordingHttpTransport::new(), &sockets);
    let chat = client
        .start_dual_stream::<Value, Value>("Chat")
        .await
        .unwrap();

    let receiver = chat.clone();
    let waiting = tokio::spawn(async move { receiver.recv().await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    chat.close_early(client.close_code(), "user cancelled")
        .await
        .unwrap();

    assert!(matches!(
        waiting.await.unwrap(),
        Err(Error::AlreadyClosed { .. })
    ));
    assert_eq!(sockets.closes(), vec![(1000, "user cancelled".to_string())]);
}
