use std::io;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("failed to read key file: {0}")]
    Io(#[from] io::Error),

    #[error("key must be exactly 32 bytes (raw or base64), got {0}")]
    InvalidKeyLength(usize),

    #[error("malformed secret: {0}")]
    MalformedSecret(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("encryption failed")]
    Encrypt,

    /// Tag mismatch, wrong key, or a nonce that does not belong to the
    /// ciphertext. These cases are not told apart.
    #[error("decryption failed")]
    Decrypt,

    #[error("decrypted text is not valid UTF-8")]
    InvalidUtf8,

    #[error("malformed signature: {0}")]
    MalformedSignature(String),
}
