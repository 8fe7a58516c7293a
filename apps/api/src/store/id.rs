//! Identifier codecs: validate, parse, generate and render document ids.
//!
//! The store hands out ids through whichever codec it was built with, so the
//! id format can change without the resource services noticing.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

/// A document identifier in its canonical string form.
///
/// Only codecs (and stores reading back ids they wrote) construct these, so a
/// `DocumentId` is always well-formed for the codec that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    pub(in crate::store) fn from_stored(raw: String) -> Self {
        DocumentId(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait IdCodec: Send + Sync {
    /// Human-readable format name, used in error messages.
    fn name(&self) -> &'static str;

    fn generate(&self) -> DocumentId;

    /// Validates and canonicalizes `raw`; `None` when it is not a
    /// syntactically valid id.
    fn parse(&self, raw: &str) -> Option<DocumentId>;
}

/// 12-byte ids rendered as 24 lowercase hex digits:
/// 4-byte big-endian unix seconds, 5 bytes unique to this codec instance,
/// 3-byte wrapping counter.
pub struct ObjectIdCodec {
    process_unique: [u8; 5],
    counter: AtomicU32,
}

impl ObjectIdCodec {
    pub fn new() -> Self {
        let seed = Uuid::new_v4().into_bytes();
        let mut process_unique = [0u8; 5];
        process_unique.copy_from_slice(&seed[..5]);
        Self {
            process_unique,
            counter: AtomicU32::new(u32::from_be_bytes([0, seed[5], seed[6], seed[7]])),
        }
    }
}

impl Default for ObjectIdCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl IdCodec for ObjectIdCodec {
    fn name(&self) -> &'static str {
        "ObjectId"
    }

    fn generate(&self) -> DocumentId {
        let secs = Utc::now().timestamp() as u32;
        let count = self.counter.fetch_add(1, Ordering::Relaxed) & 0x00FF_FFFF;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&self.process_unique);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);

        DocumentId(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    fn parse(&self, raw: &str) -> Option<DocumentId> {
        if raw.len() == 24 && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(DocumentId(raw.to_ascii_lowercase()))
        } else {
            None
        }
    }
}

/// Random v4 UUIDs in hyphenated lowercase form.
pub struct UuidCodec;

impl IdCodec for UuidCodec {
    fn name(&self) -> &'static str {
        "UUID"
    }

    fn generate(&self) -> DocumentId {
        DocumentId(Uuid::new_v4().to_string())
    }

    fn parse(&self, raw: &str) -> Option<DocumentId> {
        Uuid::parse_str(raw).ok().map(|u| DocumentId(u.to_string()))
    }
}

/// Which codec new stores are built with. Selected by `ID_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdFormat {
    #[default]
    ObjectId,
    Uuid,
}

impl IdFormat {
    pub fn codec(self) -> Arc<dyn IdCodec> {
        match self {
            IdFormat::ObjectId => Arc::new(ObjectIdCodec::new()),
            IdFormat::Uuid => Arc::new(UuidCodec),
        }
    }
}

impl FromStr for IdFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "objectid" => Ok(IdFormat::ObjectId),
            "uuid" => Ok(IdFormat::Uuid),
            other => Err(format!("unknown id format '{other}' (expected objectid or uuid)")),
        }
    }
}
