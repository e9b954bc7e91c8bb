//! Structural encoding boundary.
//!
//! Every persisted enum travels as its `u8` index. Decoding clamps an index
//! that is out of range to the enum's first variant (for example
//! `Team::Unclaimed`), so one corrupted record degrades a load instead of
//! aborting it. Documents are wrapped in a versioned envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::template::Template;

/// Current envelope version
pub const FORMAT_VERSION: u32 = 1;

/// Declares a fieldless enum encoded as its `u8` index.
///
/// The first variant is the default and the clamp target for unknown indices.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(#[$first_meta:meta])*
            $first:ident,
            $( $(#[$variant_meta:meta])* $variant:ident, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(from = "crate::codec::WireIndex", into = "u8")]
        #[repr(u8)]
        pub enum $name {
            $(#[$first_meta])*
            #[default]
            $first,
            $( $(#[$variant_meta])* $variant, )*
        }

        impl $name {
            /// Every variant in encoding order
            pub const ALL: &'static [$name] = &[$name::$first, $($name::$variant,)*];

            /// Encoding index of this variant
            pub const fn index(self) -> usize {
                self as usize
            }
        }

        impl From<u8> for $name {
            fn from(value: u8) -> Self {
                Self::ALL.get(value as usize).copied().unwrap_or_default()
            }
        }

        impl From<crate::codec::WireIndex> for $name {
            fn from(value: crate::codec::WireIndex) -> Self {
                value.0.and_then(|i| Self::ALL.get(i)).copied().unwrap_or_default()
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }
    };
}

/// Any integer read where an enum index is expected; `None` when it cannot
/// index anything (negative or too large)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireIndex(pub Option<usize>);

impl<'de> Deserialize<'de> for WireIndex {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IndexVisitor;

        impl serde::de::Visitor<'_> for IndexVisitor {
            type Value = WireIndex;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("an integer enum index")
            }

            fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<WireIndex, E> {
                Ok(WireIndex(usize::try_from(value).ok()))
            }

            fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<WireIndex, E> {
                Ok(WireIndex(usize::try_from(value).ok()))
            }
        }

        deserializer.deserialize_i64(IndexVisitor)
    }
}

/// Errors raised while reading or writing persisted data
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported format version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    version: u32,
    payload: T,
}

/// Encode a value inside a versioned envelope
pub fn encode<T: Serialize>(value: &T) -> Result<String, CodecError> {
    let envelope = EnvelopeRef {
        version: FORMAT_VERSION,
        payload: value,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decode a value from a versioned envelope
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    let envelope: Envelope<T> = serde_json::from_str(text)?;
    if envelope.version != FORMAT_VERSION {
        return Err(CodecError::Version {
            found: envelope.version,
            expected: FORMAT_VERSION,
        });
    }
    Ok(envelope.payload)
}

/// Write a template to disk
pub fn save_template(path: impl AsRef<Path>, template: &Template) -> Result<(), CodecError> {
    std::fs::write(path, encode(template)?)?;
    Ok(())
}

/// Read a template from disk
pub fn load_template(path: impl AsRef<Path>) -> Result<Template, CodecError> {
    let text = std::fs::read_to_string(path)?;
    decode(&text)
}
