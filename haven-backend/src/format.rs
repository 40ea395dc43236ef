//! Value serialization formats.
//!
//! | Format | Size | Readable | Use Case |
//! |--------|------|----------|----------|
//! | [`Json`](ValueFormat::Json) | Larger | Yes | Default, debugging stored snapshots |
//! | [`Bincode`](ValueFormat::Bincode) | Compact | No | Durable logs, large bodies |

use bytes::Bytes;
use haven_core::Raw;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Error raised while encoding or decoding stored values.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error(transparent)]
    Serialize(Box<dyn std::error::Error + Send>),

    #[error(transparent)]
    Deserialize(Box<dyn std::error::Error + Send>),
}

/// Serialization format for values written to a backend.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueFormat {
    /// serde_json encoding.
    #[default]
    Json,
    /// bincode (standard configuration) encoding.
    Bincode,
}

impl ValueFormat {
    /// Encodes a value into raw bytes.
    pub fn encode<T>(&self, value: &T) -> Result<Raw, FormatError>
    where
        T: Serialize + ?Sized,
    {
        match self {
            ValueFormat::Json => serde_json::to_vec(value)
                .map(Bytes::from)
                .map_err(|err| FormatError::Serialize(Box::new(err))),
            ValueFormat::Bincode => bincode::serde::encode_to_vec(value, bincode::config::standard())
                .map(Bytes::from)
                .map_err(|err| FormatError::Serialize(Box::new(err))),
        }
    }

    /// Decodes raw bytes back into a value.
    pub fn decode<T>(&self, data: &[u8]) -> Result<T, FormatError>
    where
        T: DeserializeOwned,
    {
        match self {
            ValueFormat::Json => {
                serde_json::from_slice(data).map_err(|err| FormatError::Deserialize(Box::new(err)))
            }
            ValueFormat::Bincode => {
                bincode::serde::decode_from_slice(data, bincode::config::standard())
                    .map(|(value, _)| value)
                    .map_err(|err| FormatError::Deserialize(Box::new(err)))
            }
        }
    }
}
