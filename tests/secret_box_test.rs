use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use murmure::infrastructure::secrets::{SecretBox, SecretBoxError};

fn test_key() -> String {
    BASE64.encode([7u8; 32])
}

#[test]
fn given_valid_key_when_encrypting_and_decrypting_then_round_trips() {
    let secret_box = SecretBox::from_base64_key(&test_key()).unwrap();

    let (ciphertext, nonce) = secret_box.encrypt("sk-vendor-api-key").unwrap();
    let plaintext = secret_box.decrypt(&ciphertext, &nonce).unwrap();

    assert_eq!(plaintext, "sk-vendor-api-key");
    assert_ne!(ciphertext, "sk-vendor-api-key");
}

#[test]
fn given_two_encryptions_of_same_secret_then_nonces_differ() {
    let secret_box = SecretBox::from_base64_key(&test_key()).unwrap();

    let (_, nonce_a) = secret_box.encrypt("same").unwrap();
    let (_, nonce_b) = secret_box.encrypt("same").unwrap();

    assert_ne!(nonce_a, nonce_b);
}

#[test]
fn given_wrong_key_when_decrypting_then_fails() {
    let secret_box = SecretBox::from_base64_key(&test_key()).unwrap();
    let other_box = SecretBox::from_base64_key(&BASE64.encode([9u8; 32])).unwrap();

    let (ciphertext, nonce) = secret_box.encrypt("secret").unwrap();
    let result = other_box.decrypt(&ciphertext, &nonce);

    assert!(matches!(result, Err(SecretBoxError::DecryptionFailed)));
}

#[test]
fn given_short_key_when_constructing_then_rejects_it() {
    let short_key = BASE64.encode([1u8; 16]);

    let result = SecretBox::from_base64_key(&short_key);

    assert!(matches!(result, Err(SecretBoxError::InvalidKey(_))));
}

#[test]
fn given_garbage_nonce_when_decrypting_then_rejects_it() {
    let secret_box = SecretBox::from_base64_key(&test_key()).unwrap();
    let (ciphertext, _) = secret_box.encrypt("secret").unwrap();

    let result = secret_box.decrypt(&ciphertext, &BASE64.encode([0u8; 4]));

    assert!(matches!(result, Err(SecretBoxError::InvalidCiphertext(_))));
}
