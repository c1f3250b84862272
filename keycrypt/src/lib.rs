//! Symmetric-key primitives used by the secrets backends.
//!
//! Keys are 256-bit AES keys read from disk. Secrets are sealed with
//! AES-256-GCM and carried around as a base64 string wrapping a small
//! JSON record (see [`secret::EncryptedSecret`]). Signatures are
//! HMAC-SHA256 over the message bytes.

pub mod aead;
pub mod error;
pub mod key;
pub mod secret;
pub mod sign;

pub use aead::{decrypt, encrypt, get_clear_text, get_encrypted_text};
pub use error::CryptoError;
pub use key::AesKey;
pub use secret::{Algorithm, EncryptedSecret};
pub use sign::{sign, verify_signature};
