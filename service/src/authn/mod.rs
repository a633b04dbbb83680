//! Token protection

pub mod token_cipher;
