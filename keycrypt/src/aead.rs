use aes_gcm::{Aes256Gcm, KeyInit, Nonce, aead::Aead};
use zeroize::Zeroizing;

use crate::{
    error::CryptoError,
    key::AesKey,
    secret::{Algorithm, EncryptedSecret},
};

pub const NONCE_LEN: usize = 12;

/// Seal `plaintext` under `key` with a fresh random nonce.
pub fn encrypt(
    key: &AesKey,
    plaintext: &[u8],
    algorithm: Algorithm,
) -> Result<EncryptedSecret, CryptoError> {
    let (nonce, cipher_text) = match algorithm {
        Algorithm::Aes256Gcm => {
            let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
                .map_err(|_| CryptoError::InvalidKeyLength(key.as_bytes().len()))?;
            let nonce = rand_nonce()?;
            let ciphertext = cipher
                .encrypt(Nonce::from_slice(&nonce), plaintext)
                .map_err(|_| CryptoError::Encrypt)?;
            (nonce, ciphertext)
        }
    };
    Ok(EncryptedSecret {
        nonce: nonce.to_vec(),
        algorithm: algorithm.as_str().to_owned(),
        cipher_text,
    })
}

/// Open a secret sealed by [`encrypt`]. Any tampering with the
/// ciphertext, nonce or algorithm tag fails here.
pub fn decrypt(key: &AesKey, secret: &EncryptedSecret) -> Result<Vec<u8>, CryptoError> {
    match secret.algorithm()? {
        Algorithm::Aes256Gcm => {
            if secret.nonce.len() != NONCE_LEN {
                return Err(CryptoError::Decrypt);
            }
            let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
                .map_err(|_| CryptoError::InvalidKeyLength(key.as_bytes().len()))?;
            cipher
                .decrypt(Nonce::from_slice(&secret.nonce), secret.cipher_text.as_slice())
                .map_err(|_| CryptoError::Decrypt)
        }
    }
}

/// Encrypt a text payload and return it in blob form.
pub fn get_encrypted_text(
    key: &AesKey,
    clear_text: &str,
    algorithm: Algorithm,
) -> Result<String, CryptoError> {
    encrypt(key, clear_text.as_bytes(), algorithm)?.to_blob()
}

/// Decode a blob and decrypt it back to text.
pub fn get_clear_text(key: &AesKey, secret_blob: &str) -> Result<String, CryptoError> {
    let secret = EncryptedSecret::from_blob(secret_blob)?;
    let plaintext = Zeroizing::new(decrypt(key, &secret)?);
    String::from_utf8(plaintext.to_vec()).map_err(|_| CryptoError::InvalidUtf8)
}

fn rand_nonce() -> Result<[u8; NONCE_LEN], CryptoError> {
    let mut n = [0u8; NONCE_LEN];
    getrandom::getrandom(&mut n).map_err(|_| CryptoError::Encrypt)?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let key = AesKey::generate();
        let blob = get_encrypted_text(&key, "hello", Algorithm::Aes256Gcm).unwrap();
        assert_eq!(get_clear_text(&key, &blob).unwrap(), "hello");
    }

    #[test]
    fn fresh_nonce_per_call() {
        let key = AesKey::generate();
        let a = encrypt(&key, b"same", Algorithm::Aes256Gcm).unwrap();
        let b = encrypt(&key, b"same", Algorithm::Aes256Gcm).unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.cipher_text, b.cipher_text);
    }

    #[test]
    fn wrong_key_fails() {
        let k1 = AesKey::generate();
        let k2 = AesKey::generate();
        let secret = encrypt(&k1, b"payload", Algorithm::Aes256Gcm).unwrap();
        assert!(matches!(decrypt(&k2, &secret), Err(CryptoError::Decrypt)));
    }

    #[test]
    fn every_bit_flip_detected() {
        let key = AesKey::generate();
        let secret = encrypt(&key, b"tamper me", Algorithm::Aes256Gcm).unwrap();

        for i in 0..secret.cipher_text.len() * 8 {
            let mut bad = secret.clone();
            bad.cipher_text[i / 8] ^= 1 << (i % 8);
            assert!(decrypt(&key, &bad).is_err(), "ciphertext bit {i}");
        }
        for i in 0..secret.nonce.len() * 8 {
            let mut bad = secret.clone();
            bad.nonce[i / 8] ^= 1 << (i % 8);
            assert!(decrypt(&key, &bad).is_err(), "nonce bit {i}");
        }
    }

    #[test]
    fn tampered_algorithm_rejected() {
        let key = AesKey::generate();
        let mut secret = encrypt(&key, b"x", Algorithm::Aes256Gcm).unwrap();
        secret.algorithm = "aes128-gcm".into();
        assert!(matches!(
            decrypt(&key, &secret),
            Err(CryptoError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn short_nonce_rejected() {
        let key = AesKey::generate();
        let mut secret = encrypt(&key, b"x", Algorithm::Aes256Gcm).unwrap();
        secret.nonce.truncate(8);
        assert!(decrypt(&key, &secret).is_err());
    }

    #[test]
    fn empty_clear_text() {
        let key = AesKey::generate();
        let blob = get_encrypted_text(&key, "", Algorithm::Aes256Gcm).unwrap();
        assert_eq!(get_clear_text(&key, &blob).unwrap(), "");
    }
}
