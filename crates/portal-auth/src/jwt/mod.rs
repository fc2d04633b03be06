//! Signed credential decoding and fixture encoding.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::{DecodedClaims, TokenPayload};
pub use decoder::{DecodeError, TokenCodec};
pub use encoder::TokenEncoder;
