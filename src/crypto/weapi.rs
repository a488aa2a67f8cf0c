//! Two-stage AES + textbook RSA parameter encryption.
//!
//! The remote service decrypts request bodies with this exact sequence:
//!
//! 1. AES-128-CBC the JSON payload with the fixed nonce key, base64 encode.
//! 2. AES-128-CBC that base64 text again with a per-request secret, base64 encode.
//! 3. Reverse the secret, read its ASCII bytes as a big-endian integer and
//!    raise it to the fixed public exponent modulo the fixed modulus.
//!
//! Any deviation (padding, byte order, hex case) makes the server reject the
//! request, so none of the steps may be "improved".

use aes::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use num_bigint::BigUint;
use rand::seq::IndexedRandom;
use serde::Serialize;
use thiserror::Error;

use crate::codec::base62::ALPHABET;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

const NONCE: &[u8; 16] = b"0CoJUm6Qyw8W8jud";
const IV: &[u8; 16] = b"0102030405060708";
const PUBLIC_EXPONENT: &str = "010001";
const MODULUS: &str = "00e0b509f6259df8642dbc35662901477df22677ec152b5ff68ace615bb7b725152b3ab17a876aea8a5aa76d2e417629ec4ee341f56135fccf695280104e0312ecbda92557c93870114af6c9d05c4f7f0c3685b7a46bee255932575cce10b424d813cfe4875d3e82047b97ddef52741d546b8e289dc6935b3ece0462db0a22b8e7";

/// Length of the per-request secret.
pub const SECRET_LENGTH: usize = 16;

/// Errors raised while encrypting request parameters.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The parameter object could not be serialized to JSON.
    #[error("Failed to serialize parameters: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The secret is not a valid AES-128 key.
    #[error("Secret must be 16 bytes, got {0}")]
    InvalidSecretLength(usize),
}

/// Form body expected by the weapi endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncryptedParams {
    /// Doubly AES-encrypted payload, base64
    pub params: String,
    /// RSA-encrypted secret, lowercase hex
    #[serde(rename = "encSecKey")]
    pub enc_sec_key: String,
}

/// Draws a fresh secret: 16 distinct symbols sampled uniformly from the base62 alphabet.
///
/// The sampler is the thread-local `rand` generator; the secret only obscures
/// the payload in transit and the server does not depend on its strength.
pub fn random_secret() -> String {
    let mut rng = rand::rng();
    ALPHABET
        .choose_multiple(&mut rng, SECRET_LENGTH)
        .map(|&b| char::from(b))
        .collect()
}

/// Serializes `params` to JSON and encrypts it with a freshly drawn secret.
pub fn encrypt_params<T: Serialize>(params: &T) -> Result<EncryptedParams, CodecError> {
    let payload = serde_json::to_string(params)?;
    encrypt_with_secret(&payload, &random_secret())
}

/// Encrypts an already-serialized payload with the given secret.
///
/// Deterministic for a fixed secret.
pub fn encrypt_with_secret(payload: &str, secret: &str) -> Result<EncryptedParams, CodecError> {
    if secret.len() != SECRET_LENGTH {
        return Err(CodecError::InvalidSecretLength(secret.len()));
    }
    let first = aes_encrypt(payload.as_bytes(), NONCE)?;
    let params = aes_encrypt(first.as_bytes(), secret.as_bytes())?;
    let enc_sec_key = rsa_encrypt(secret);
    Ok(EncryptedParams {
        params,
        enc_sec_key,
    })
}

fn aes_encrypt(plain: &[u8], key: &[u8]) -> Result<String, CodecError> {
    let cipher = Aes128CbcEnc::new_from_slices(key, IV)
        .map_err(|_| CodecError::InvalidSecretLength(key.len()))?;
    let encrypted = cipher.encrypt_padded_vec_mut::<Pkcs7>(plain);
    Ok(BASE64.encode(encrypted))
}

fn rsa_encrypt(secret: &str) -> String {
    let reversed: Vec<u8> = secret.bytes().rev().collect();
    let message = BigUint::from_bytes_be(&reversed);
    let exponent = parse_hex(PUBLIC_EXPONENT);
    let modulus = parse_hex(MODULUS);
    message.modpow(&exponent, &modulus).to_str_radix(16)
}

// Only called with the compile-time constants above.
fn parse_hex(hex: &str) -> BigUint {
    BigUint::parse_bytes(hex.as_bytes(), 16).unwrap_or_default()
}
