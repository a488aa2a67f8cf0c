//! Request parameter encryption for the remote "weapi" endpoints.

mod weapi;

pub use weapi::{
    encrypt_params, encrypt_with_secret, random_secret, CodecError, EncryptedParams, SECRET_LENGTH,
};
