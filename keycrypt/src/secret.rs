//! Serialized shape of an encrypted payload.
//!
//! Current wire form is standard base64 of a JSON record:
//!
//! ```text
//! {"nonce": "<b64>", "algorithm": "aes256-gcm", "cipherText": "<b64 ct||tag>"}
//! ```
//!
//! Older producers handed out the JSON record itself, unwrapped, with
//! Go-style field names (`Nonce`, `Algorithm`, `CipherText`), and some
//! wrote the nonce under `iv` with the unused name present as `null`.
//! Input accepts either form, matches field names case-insensitively and
//! takes the nonce from whichever of `nonce`/`iv` is populated. Output
//! always uses the base64 form and `nonce`.

use std::{fmt, str::FromStr};

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CryptoError;

/// Cipher suites a secret can be sealed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// AES-256-GCM, 96-bit nonce, 128-bit tag appended to the ciphertext.
    Aes256Gcm,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Aes256Gcm => "aes256-gcm",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aes256-gcm" => Ok(Algorithm::Aes256Gcm),
            other => Err(CryptoError::UnsupportedAlgorithm(other.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct EncryptedSecret {
    /// The per-encryption nonce. Read from either `nonce` or `iv`.
    #[serde(serialize_with = "b64::serialize")]
    pub nonce: Vec<u8>,
    pub algorithm: String,
    #[serde(rename = "cipherText", serialize_with = "b64::serialize")]
    pub cipher_text: Vec<u8>,
}

/// Fields as found on the wire, before the nonce names are reconciled.
#[derive(Default)]
struct WireFields {
    nonce: Option<Vec<u8>>,
    iv: Option<Vec<u8>>,
    algorithm: Option<String>,
    cipher_text: Option<Vec<u8>>,
}

/// Store `value` into `slot`, refusing a second non-null value for the
/// same field (e.g. `Nonce` and `nonce` together).
fn set_once<T>(slot: &mut Option<T>, name: &str, value: Option<T>) -> Result<(), CryptoError> {
    if value.is_some() {
        if slot.is_some() {
            return Err(CryptoError::MalformedSecret(format!("duplicate field {name}")));
        }
        *slot = value;
    }
    Ok(())
}

impl TryFrom<Map<String, Value>> for EncryptedSecret {
    type Error = CryptoError;

    fn try_from(record: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut wire = WireFields::default();
        for (name, value) in record {
            match name.to_ascii_lowercase().as_str() {
                "nonce" => set_once(&mut wire.nonce, "nonce", b64::decode_value(&name, value)?)?,
                "iv" => set_once(&mut wire.iv, "iv", b64::decode_value(&name, value)?)?,
                "ciphertext" => set_once(
                    &mut wire.cipher_text,
                    "cipherText",
                    b64::decode_value(&name, value)?,
                )?,
                "algorithm" => {
                    let algorithm = match value {
                        Value::String(s) => Some(s),
                        Value::Null => None,
                        other => {
                            return Err(CryptoError::MalformedSecret(format!(
                                "algorithm must be a string, got {other}"
                            )));
                        }
                    };
                    set_once(&mut wire.algorithm, "algorithm", algorithm)?
                }
                _ => {}
            }
        }

        let nonce = wire.nonce.filter(|n| !n.is_empty());
        let iv = wire.iv.filter(|n| !n.is_empty());
        let nonce = match (nonce, iv) {
            (Some(n), None) => n,
            (None, Some(n)) => {
                log::debug!("secret carries its nonce under the legacy iv field");
                n
            }
            (Some(_), Some(_)) => {
                return Err(CryptoError::MalformedSecret(
                    "both nonce and iv are set".into(),
                ));
            }
            (None, None) => {
                return Err(CryptoError::MalformedSecret("missing nonce".into()));
            }
        };
        Ok(Self {
            nonce,
            algorithm: wire
                .algorithm
                .ok_or_else(|| CryptoError::MalformedSecret("missing algorithm".into()))?,
            cipher_text: wire
                .cipher_text
                .ok_or_else(|| CryptoError::MalformedSecret("missing cipherText".into()))?,
        })
    }
}

impl EncryptedSecret {
    pub fn algorithm(&self) -> Result<Algorithm, CryptoError> {
        self.algorithm.parse()
    }

    /// Encode as the string form handed back to callers.
    pub fn to_blob(&self) -> Result<String, CryptoError> {
        let json =
            serde_json::to_vec(self).map_err(|e| CryptoError::MalformedSecret(e.to_string()))?;
        Ok(STANDARD.encode(json))
    }

    /// Decode the string form produced by [`EncryptedSecret::to_blob`],
    /// or the bare JSON record older producers returned.
    pub fn from_blob(blob: &str) -> Result<Self, CryptoError> {
        let blob = blob.trim();
        let parsed = if blob.starts_with('{') {
            log::debug!("secret blob is bare JSON, not base64");
            serde_json::from_str(blob)
        } else {
            let json = STANDARD
                .decode(blob)
                .map_err(|e| CryptoError::MalformedSecret(format!("blob is not base64: {e}")))?;
            serde_json::from_slice(&json)
        };
        parsed.map_err(|e| CryptoError::MalformedSecret(e.to_string()))
    }
}

mod b64 {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::Serializer;
    use serde_json::Value;

    use crate::error::CryptoError;

    pub fn serialize<S, T>(bytes: &T, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<[u8]>,
    {
        s.serialize_str(&STANDARD.encode(bytes.as_ref()))
    }

    /// `null` reads as absent; anything else must be a base64 string.
    pub fn decode_value(name: &str, value: Value) -> Result<Option<Vec<u8>>, CryptoError> {
        match value {
            Value::Null => Ok(None),
            Value::String(text) => STANDARD
                .decode(text)
                .map(Some)
                .map_err(|e| CryptoError::MalformedSecret(format!("{name} is not base64: {e}"))),
            other => Err(CryptoError::MalformedSecret(format!(
                "{name} must be a base64 string, got {other}"
            ))),
        }
    }
}
