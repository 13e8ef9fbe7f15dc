//! Version-tagged binary framing for persisted records.
//!
//! Every record this crate writes to disk (a `WordForm`, the store
//! `Metadata`, a detector save-file) is framed as `[version, ...fields]`
//! where `version` is a `u32` equal to the number of elements in that array,
//! counting the version slot itself — so a record with 5 data fields
//! declares version 6. [`Versioned::FIELD_COUNT`] is the single source of
//! truth for a type's version tag: `encode` writes it, `decode` checks the
//! decoded tag against it, so the two can never drift apart the way two
//! independently hardcoded constants could. Decoding an unexpected version
//! is a hard `Deserialization` error rather than a best-effort read of stale
//! bytes.

use crate::error::{CoreError, Result};
use serde::{de::DeserializeOwned, Serialize};

/// A record framed with a version tag equal to its own field count.
pub trait Versioned {
    /// Number of elements in this record's wire array, including the
    /// version slot itself.
    const FIELD_COUNT: u32;
}

/// Encode `payload` behind its declared version tag.
pub fn encode<T: Versioned + Serialize>(payload: &T) -> Result<Vec<u8>> {
    bincode::serialize(&(T::FIELD_COUNT, payload)).map_err(|e| CoreError::Internal(e.to_string()))
}

/// Decode a versioned payload, rejecting anything but `T::FIELD_COUNT`.
pub fn decode<T: Versioned + DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let (version, payload): (u32, T) = bincode::deserialize(bytes)
        .map_err(|e| CoreError::Deserialization(e.to_string()))?;
    if version != T::FIELD_COUNT {
        return Err(CoreError::Deserialization(format!(
            "unsupported record version {version}, expected {}",
            T::FIELD_COUNT
        )));
    }
    Ok(payload)
}

/// Write `bytes` atomically: write to a temp file in the same directory as
/// `path`, then rename over it. A crash mid-write leaves the previous file
/// untouched.
pub fn atomic_write_bytes(path: &std::path::Path, bytes: &[u8]) -> Result<()> {
    use std::io::Write;
    let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(CoreError::Io)?;
    tmp.write_all(bytes).map_err(CoreError::Io)?;
    tmp.persist(path).map_err(|e| CoreError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        a: u32,
        b: String,
    }

    impl Versioned for Sample {
        const FIELD_COUNT: u32 = 3;
    }

    #[test]
    fn roundtrip_identity() {
        let s = Sample {
            a: 7,
            b: "hello".into(),
        };
        let bytes = encode(&s).unwrap();
        let decoded: Sample = decode(&bytes).unwrap();
        assert_eq!(decoded, s);
    }

    #[test]
    fn unknown_version_fails() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct SampleV2 {
            a: u32,
            b: String,
        }
        impl Versioned for SampleV2 {
            const FIELD_COUNT: u32 = 4;
        }

        let s = Sample {
            a: 7,
            b: "hello".into(),
        };
        let bytes = encode(&s).unwrap();
        let err = decode::<SampleV2>(&bytes).unwrap_err();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }
}
