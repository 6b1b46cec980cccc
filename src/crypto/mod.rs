//! Secret sealing for the environment secrets API
//!
//! GitHub expects secret values sealed with a libsodium "sealed box" under the
//! environment's current X25519 public key: an ephemeral key pair is generated
//! per message, the sender stays anonymous, and only the holder of the
//! environment's private key can open the payload.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use crypto_box::{PublicKey, aead::OsRng};

use crate::{Error, Result};

/// Raw length of an X25519 public key
pub const KEY_LEN: usize = crypto_box::KEY_SIZE;

/// Seal `plaintext` under a base64 encoded public key and return the base64 ciphertext.
///
/// Keys that do not decode to exactly [`KEY_LEN`] bytes are rejected with
/// [`Error::InvalidKey`]; short keys are never zero-padded.
pub fn encrypt(public_key: &str, plaintext: &str) -> Result<String> {
    let key = decode_public_key(public_key)?;

    let sealed = key
        .seal(&mut OsRng, plaintext.as_bytes())
        .map_err(|e| Error::Encryption(e.to_string()))?;

    Ok(STANDARD.encode(sealed))
}

fn decode_public_key(public_key: &str) -> Result<PublicKey> {
    let bytes = STANDARD
        .decode(public_key.trim())
        .map_err(|e| Error::InvalidKey(format!("not valid base64: {e}")))?;

    let raw: [u8; KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
        Error::InvalidKey(format!("expected {KEY_LEN} bytes, got {}", bytes.len()))
    })?;

    Ok(PublicKey::from(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto_box::SecretKey;

    fn keypair() -> (SecretKey, String) {
        let secret = SecretKey::generate(&mut OsRng);
        let public = STANDARD.encode(secret.public_key().as_bytes());
        (secret, public)
    }

    fn open(secret: &SecretKey, sealed_b64: &str) -> String {
        let sealed = STANDARD.decode(sealed_b64).unwrap();
        String::from_utf8(secret.unseal(&sealed).unwrap()).unwrap()
    }

    #[test]
    fn test_encrypt_opens_with_matching_secret_key() {
        let (secret, public) = keypair();

        let sealed = encrypt(&public, "hunter2").expect("encrypt");

        assert_eq!(open(&secret, &sealed), "hunter2");
    }

    #[test]
    fn test_encrypt_is_randomized() {
        let (secret, public) = keypair();

        let first = encrypt(&public, "same value").unwrap();
        let second = encrypt(&public, "same value").unwrap();

        assert_ne!(first, second);
        assert_eq!(open(&secret, &first), "same value");
        assert_eq!(open(&secret, &second), "same value");
    }

    #[test]
    fn test_sealed_box_overhead() {
        let (_, public) = keypair();

        let sealed = STANDARD.decode(encrypt(&public, "abc").unwrap()).unwrap();

        // ephemeral public key + poly1305 tag
        assert_eq!(sealed.len(), 3 + 32 + 16);
    }

    #[test]
    fn test_short_key_is_rejected_not_padded() {
        let short = STANDARD.encode([7u8; 31]);

        let err = encrypt(&short, "value").unwrap_err();

        assert!(matches!(err, Error::InvalidKey(_)), "got {err:?}");
        assert!(err.to_string().contains("got 31"));
    }

    #[test]
    fn test_long_key_is_rejected() {
        let long = STANDARD.encode([7u8; 33]);
        assert!(matches!(encrypt(&long, "value"), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_non_base64_key_is_rejected() {
        assert!(matches!(
            encrypt("not*base64!", "value"),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_empty_plaintext_still_seals() {
        let (secret, public) = keypair();
        let sealed = encrypt(&public, "").unwrap();
        assert_eq!(open(&secret, &sealed), "");
    }
}
