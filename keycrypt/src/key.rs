use std::{fmt, path::Path};

use base64::{Engine, engine::general_purpose::STANDARD};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::CryptoError;

pub const KEY_LEN: usize = 32;

/// A 256-bit AES key. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AesKey {
    bytes: [u8; KEY_LEN],
}

impl AesKey {
    /// Fresh random key. Only used by tests and tooling; production keys
    /// are provisioned on disk by whoever owns them.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        getrandom::getrandom(&mut bytes).expect("getrandom failed");
        Self { bytes }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::InvalidKeyLength(bytes.len()));
        }
        let mut buf = [0u8; KEY_LEN];
        buf.copy_from_slice(bytes);
        Ok(Self { bytes: buf })
    }

    /// Parse a key file. The file holds either exactly 32 raw bytes or
    /// the base64 text of 32 bytes; surrounding whitespace is ignored
    /// in the text form.
    pub fn from_file(path: &Path) -> Result<Self, CryptoError> {
        let raw = Zeroizing::new(std::fs::read(path)?);
        Self::parse(&raw)
    }

    pub fn parse(raw: &[u8]) -> Result<Self, CryptoError> {
        if raw.len() == KEY_LEN {
            return Self::from_bytes(raw);
        }
        let text = raw.trim_ascii();
        let decoded = STANDARD
            .decode(text)
            .map(Zeroizing::new)
            .map_err(|_| CryptoError::InvalidKeyLength(raw.len()))?;
        Self::from_bytes(&decoded)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.bytes)
    }
}

impl fmt::Debug for AesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AesKey(***)")
    }
}
