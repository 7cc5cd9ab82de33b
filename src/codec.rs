//! Codec contracts and salt readout
//!
//! The page codecs are implemented elsewhere. This module only declares what
//! the registry needs from them to answer `cipher_salt` queries.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Size of a write-cipher key salt
pub const SALT_SIZE: usize = 16;

/// Parameter name answered by [`codec_data`]
pub const CIPHER_SALT: &str = "cipher_salt";

/// Prefix requesting raw bytes instead of hex
pub const RAW_PREFIX: &str = "raw:";

/// A codec attached to one database schema
pub trait Codec: Send + Sync {
    fn is_encrypted(&self) -> bool;

    fn has_write_cipher(&self) -> bool;

    /// Salt of the write-side cipher, if one has been generated
    fn write_cipher_salt(&self) -> Option<[u8; SALT_SIZE]>;
}

/// Finds the codec attached to a schema of a connection
///
/// `schema_index` follows `PRAGMA database_list`: 0 is `main`, 1 is `temp`,
/// attached databases follow.
pub trait CodecLookup: Send + Sync {
    fn codec(&self, schema_index: usize) -> Option<Arc<dyn Codec>>;
}

/// Digit case used when rendering salts as hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HexCase {
    #[default]
    Lower,
    Upper,
}

impl HexCase {
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            HexCase::Lower => hex::encode(bytes),
            HexCase::Upper => hex::encode_upper(bytes),
        }
    }
}

/// Output form requested from [`codec_data`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaltFormat {
    Hex,
    Raw,
}

/// Parse a codec data name, returning the requested format
///
/// Only `cipher_salt` and `raw:cipher_salt` are known.
pub fn parse_codec_data_name(name: &str) -> Option<SaltFormat> {
    let (format, bare) = match name.get(..RAW_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(RAW_PREFIX) => {
            (SaltFormat::Raw, &name[RAW_PREFIX.len()..])
        }
        _ => (SaltFormat::Hex, name),
    };
    bare.eq_ignore_ascii_case(CIPHER_SALT).then_some(format)
}

/// Write-side salt of `codec`, if it encrypts and has a write cipher
pub fn write_salt(codec: &dyn Codec) -> Option<[u8; SALT_SIZE]> {
    if !codec.is_encrypted() || !codec.has_write_cipher() {
        return None;
    }
    codec.write_cipher_salt()
}

/// Render a salt in the requested format
///
/// Hex yields `2 * SALT_SIZE` digit bytes. Raw yields the salt followed by a
/// terminating zero byte.
pub fn format_salt(salt: &[u8; SALT_SIZE], format: SaltFormat, case: HexCase) -> Vec<u8> {
    match format {
        SaltFormat::Hex => case.encode(salt).into_bytes(),
        SaltFormat::Raw => {
            let mut out = Vec::with_capacity(SALT_SIZE + 1);
            out.extend_from_slice(salt);
            out.push(0);
            out
        }
    }
}

/// Answer a codec data query against an already located codec
pub fn codec_data(codec: Option<&dyn Codec>, name: &str, case: HexCase) -> Option<Vec<u8>> {
    let format = parse_codec_data_name(name)?;
    let salt = write_salt(codec?)?;
    Some(format_salt(&salt, format, case))
}
