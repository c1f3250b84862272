use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{error::CryptoError, key::AesKey};

type HmacSha256 = Hmac<Sha256>;

fn mac_for(key: &AesKey, message: &str) -> Result<HmacSha256, CryptoError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key.as_bytes())
        .map_err(|_| CryptoError::InvalidKeyLength(key.as_bytes().len()))?;
    mac.update(message.as_bytes());
    Ok(mac)
}

/// Base64 HMAC-SHA256 of `message` under `key`.
pub fn sign(key: &AesKey, message: &str) -> Result<String, CryptoError> {
    let tag = mac_for(key, message)?.finalize().into_bytes();
    Ok(STANDARD.encode(tag))
}

/// `Ok(false)` for a well-formed signature that does not match; `Err`
/// only when `signature` is not base64 at all.
pub fn verify_signature(key: &AesKey, signature: &str, message: &str) -> Result<bool, CryptoError> {
    let expected = STANDARD
        .decode(signature.trim())
        .map_err(|e| CryptoError::MalformedSignature(e.to_string()))?;
    Ok(mac_for(key, message)?.verify_slice(&expected).is_ok())
}
