use std::sync::Arc;

use bytesize::ByteSize;
use haven_backend::{Storage as StorageTrait, ValueFormat};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Where cache partitions live.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Storage {
    Moka(Moka),
}

impl Default for Storage {
    fn default() -> Self {
        Storage::Moka(Moka::default())
    }
}

/// In-memory partitions.
///
/// Partitions are unbounded unless `max_entries` or `max_bytes` is set. A
/// full partition refuses new responses; nothing already cached is evicted.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Moka {
    #[serde(default)]
    pub max_entries: Option<u64>,
    #[serde(default)]
    pub max_bytes: Option<ByteSize>,
    #[serde(default)]
    pub format: ValueFormat,
}

impl Storage {
    pub fn into_storage(self) -> Result<Arc<dyn StorageTrait>, ConfigError> {
        match self {
            #[cfg(feature = "moka")]
            Storage::Moka(config) => {
                use haven_moka::MokaStorage;

                let mut builder = MokaStorage::builder().value_format(config.format);
                match (config.max_entries, config.max_bytes) {
                    (Some(0), _) => {
                        return Err(ConfigError::Invalid {
                            field: "storage.max_entries",
                            reason: "must be greater than zero".to_owned(),
                        });
                    }
                    (Some(_), Some(_)) => {
                        return Err(ConfigError::Invalid {
                            field: "storage",
                            reason: "set max_entries or max_bytes, not both".to_owned(),
                        });
                    }
                    (Some(entries), None) => builder = builder.max_entries(entries),
                    (None, Some(bytes)) => builder = builder.max_bytes(bytes.as_u64()),
                    (None, None) => {}
                }
                Ok(Arc::new(builder.build()))
            }
            #[cfg(not(feature = "moka"))]
            Storage::Moka(_) => Err(ConfigError::BackendNotAvailable("Moka".to_owned())),
        }
    }
}
