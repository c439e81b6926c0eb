//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use chrono::{DateTime, Utc};
use mercury::wire::well_known::{
    decode_duration, decode_timestamp, encode_duration, encode_timestamp,
};
use mercury::wire::{
    decode_bytes, decode_enum, decode_f64, decode_i32, decode_i64, decode_map, decode_nested,
    decode_repeated, decode_string, decode_u64, encode_bytes, encode_enum, encode_f64, encode_i32,
    encode_i64, encode_map, encode_message, encode_repeated, encode_string, encode_u64, Field,
    Message, ProtoEnum,
};
pub use mercury::testing::{RecordingHttpTransport, ScriptedSocketFactory};
pub use mercury::{Client, ClientConfig, Error, HttpMethod, ProtoJson, Result, StreamTransport};
pub use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Once};

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Install a test-writer `tracing` subscriber once per test binary.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Client over in-memory transports, plain-text schemes, base `svc.test/api`.
pub fn test_client(http: &RecordingHttpTransport, sockets: &ScriptedSocketFactory) -> Client {
    init_tracing();
    let config = ClientConfig::from_toml_str("base_path = \"svc.test/api\"\nuse_tls = false")
        .expect("test config");
    Client::with_transports(config, Arc::new(http.clone()), Arc::new(sockets.clone()))
}

// ============================================================================
// Sample messages
// ============================================================================

/// Sample enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mood {
    #[default]
    Unknown,
    Happy,
    Sad,
}

impl ProtoEnum for Mood {
    const VALUES: &'static [(&'static str, i32)] =
        &[("MOOD_UNKNOWN", 0), ("HAPPY", 1), ("SAD", 2)];

    fn from_number(number: i32) -> Option<Self> {
        match number {
            0 => Some(Mood::Unknown),
            1 => Some(Mood::Happy),
            2 => Some(Mood::Sad),
            _ => None,
        }
    }

    fn number(self) -> i32 {
        match self {
            Mood::Unknown => 0,
            Mood::Happy => 1,
            Mood::Sad => 2,
        }
    }
}

/// Nested sample message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Author {
    pub user_id: i32,
    pub display_name: String,
}

impl Message for Author {
    const NAME: &'static str = "Author";
    const FIELDS: &'static [Field<Self>] = &[
        Field::new(
            "user_id",
            "userId",
            |m| (m.user_id != 0).then(|| encode_i32(&m.user_id)),
            |m, v| {
                m.user_id = decode_i32("user_id", v)?;
                Ok(())
            },
        ),
        Field::new(
            "display_name",
            "displayName",
            |m| (!m.display_name.is_empty()).then(|| encode_string(&m.display_name)),
            |m, v| {
                m.display_name = decode_string("display_name", v)?;
                Ok(())
            },
        ),
    ];
}

/// Sample message covering every field kind the suites exercise.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Note {
    pub text: String,
    pub mood: Mood,
    pub tags: Vec<String>,
    pub counts: BTreeMap<String, i64>,
    pub attachment: Vec<u8>,
    pub created: Option<DateTime<Utc>>,
    pub ttl_seconds: Option<f64>,
    pub author: Option<Author>,
    pub sequence: u64,
    pub score: f64,
}

impl Message for Note {
    const NAME: &'static str = "Note";
    const FIELDS: &'static [Field<Self>] = &[
        Field::new(
            "text",
            "text",
            |m| (!m.text.is_empty()).then(|| encode_string(&m.text)),
            |m, v| {
                m.text = decode_string("text", v)?;
                Ok(())
            },
        ),
        Field::new(
            "mood",
            "mood",
            |m| (m.mood != Mood::Unknown).then(|| encode_enum(&m.mood)),
            |m, v| {
                m.mood = decode_enum("mood", v)?;
                Ok(())
            },
        ),
        Field::new(
            "tags",
            "tags",
            |m| (!m.tags.is_empty()).then(|| encode_repeated(&m.tags, encode_string)),
            |m, v| {
                m.tags = decode_repeated("tags", v, decode_string)?;
                Ok(())
            },
        ),
        Field::new(
            "counts",
            "counts",
            |m| (!m.counts.is_empty()).then(|| encode_map(&m.counts, encode_i64)),
            |m, v| {
                m.counts = decode_map("counts", v, decode_i64)?;
                Ok(())
            },
        ),
        Field::new(
            "attachment",
            "attachment",
            |m| (!m.attachment.is_empty()).then(|| encode_bytes(&m.attachment)),
            |m, v| {
                m.attachment = decode_bytes("attachment", v)?;
                Ok(())
            },
        ),
        Field::new(
            "created",
            "created",
            |m| m.created.as_ref().map(encode_timestamp),
            |m, v| {
                m.created = Some(decode_timestamp("created", v)?);
                Ok(())
            },
        ),
        Field::new(
            "ttl_seconds",
            "ttlSeconds",
            |m| m.ttl_seconds.as_ref().map(encode_duration),
            |m, v| {
                m.ttl_seconds = Some(decode_duration("ttl_seconds", v)?);
                Ok(())
            },
        ),
        Field::new(
            "author",
            "author",
            |m| m.author.as_ref().map(encode_message),
            |m, v| {
                m.author = Some(decode_nested("author", v)?);
                Ok(())
            },
        ),
        Field::new(
            "sequence",
            "sequence",
            |m| (m.sequence != 0).then(|| encode_u64(&m.sequence)),
            |m, v| {
                m.sequence = decode_u64("sequence", v)?;
                Ok(())
            },
        ),
        Field::new(
            "score",
            "score",
            |m| (m.score != 0.0).then(|| encode_f64(&m.score)),
            |m, v| {
                m.score = decode_f64("score", v)?;
                Ok(())
            },
        ),
    ];
}

/// A note with every field set.
pub fn full_note() -> Note {
    use chrono::TimeZone;
    let mut counts = BTreeMap::new();
    counts.insert("views".to_string(), 9_007_199_254_740_993);
    counts.insert("likes".to_string(), -3);
    Note {
        text: "hello".to_string(),
        mood: Mood::Happy,
        tags: vec!["a".to_string(), "b".to_string()],
        counts,
        attachment: b"Test".to_vec(),
        created: Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).single(),
        ttl_seconds: Some(1.5),
        author: Some(Author {
            user_id: 42,
            display_name: "Ada".to_string(),
        }),
        sequence: u64::MAX,
        score: 0.25,
    }
}
