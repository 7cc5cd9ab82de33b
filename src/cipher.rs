//! Cipher descriptors and the built-in parameter catalog
//!
//! A descriptor names a cipher and declares its parameter schema. The codec
//! implementations themselves live outside this crate; the registry only
//! needs the names and the bounds.
//!
//! The common scope `cipher` parameter selects a descriptor by its 1-based
//! position in [`CIPHERS`].

use crate::param::ParamSpec;

/// Highest SQLCipher major version the legacy switch understands
pub const SQLCIPHER_VERSION_MAX: i32 = 4;

/// Largest SQLite page size
pub const MAX_PAGE_SIZE: i32 = 65536;

/// Upper bound for iteration counts
pub const KDF_ITER_MAX: i32 = 0x7fff_ffff;

/// Name of the common `cipher` selector parameter
pub const CIPHER_PARAM: &str = "cipher";

/// Name of the common HMAC verification switch
pub const HMAC_CHECK_PARAM: &str = "hmac_check";

/// Name of the SQLCipher cipher scope
pub const SQLCIPHER: &str = "sqlcipher";

/// Name of the SQLCipher legacy version parameter
pub const LEGACY_PARAM: &str = "legacy";

/// Static record describing one cipher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherDescriptor {
    pub name: &'static str,
    pub params: &'static [ParamSpec],
}

/// 1-based position of `chacha20`, the cipher selected out of the box
pub const DEFAULT_CIPHER_INDEX: i32 = 3;

/// Built-in cipher descriptors, in selector order
pub const CIPHERS: &[CipherDescriptor] = &[
    CipherDescriptor {
        name: "aes128cbc",
        params: AES128CBC_PARAMS,
    },
    CipherDescriptor {
        name: "aes256cbc",
        params: AES256CBC_PARAMS,
    },
    CipherDescriptor {
        name: "chacha20",
        params: CHACHA20_PARAMS,
    },
    CipherDescriptor {
        name: SQLCIPHER,
        params: SQLCIPHER_PARAMS,
    },
    CipherDescriptor {
        name: "rc4",
        params: RC4_PARAMS,
    },
    CipherDescriptor {
        name: "ascon128",
        params: ASCON128_PARAMS,
    },
    CipherDescriptor {
        name: "aegis",
        params: AEGIS_PARAMS,
    },
];

/// Parameters shared by all ciphers
pub const COMMON_PARAMS: &[ParamSpec] = &[
    ParamSpec::new(CIPHER_PARAM, DEFAULT_CIPHER_INDEX, 1, CIPHERS.len() as i32),
    ParamSpec::pinned(HMAC_CHECK_PARAM, 1, 0, 1),
    ParamSpec::new("mc_legacy_wal", 0, 0, 1),
];

const AES128CBC_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("legacy", 0, 0, 1),
    ParamSpec::new("legacy_page_size", 0, 0, MAX_PAGE_SIZE),
];

const AES256CBC_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("legacy", 0, 0, 1),
    ParamSpec::new("legacy_page_size", 0, 0, MAX_PAGE_SIZE),
    ParamSpec::new("kdf_iter", 4001, 1, KDF_ITER_MAX),
];

const CHACHA20_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("legacy", 0, 0, 1),
    ParamSpec::new("legacy_page_size", 4096, 0, MAX_PAGE_SIZE),
    ParamSpec::new("kdf_iter", 64007, 1, KDF_ITER_MAX),
];

/// KDF / HMAC algorithm codes used by SQLCipher
pub mod sqlcipher_algorithm {
    pub const SHA1: i32 = 0;
    pub const SHA256: i32 = 1;
    pub const SHA512: i32 = 2;
}

const SQLCIPHER_PARAMS: &[ParamSpec] = &[
    ParamSpec::new(LEGACY_PARAM, 0, 0, SQLCIPHER_VERSION_MAX),
    ParamSpec::new("legacy_page_size", 4096, 0, MAX_PAGE_SIZE),
    ParamSpec::new("kdf_iter", 256000, 1, KDF_ITER_MAX),
    ParamSpec::new("fast_kdf_iter", 2, 1, KDF_ITER_MAX),
    ParamSpec::new("hmac_use", 1, 0, 1),
    ParamSpec::new("hmac_pgno", 1, 0, 2),
    ParamSpec::new("hmac_salt_mask", 0x3a, 0, 255),
    ParamSpec::new(
        "kdf_algorithm",
        sqlcipher_algorithm::SHA512,
        sqlcipher_algorithm::SHA1,
        sqlcipher_algorithm::SHA512,
    ),
    ParamSpec::new(
        "hmac_algorithm",
        sqlcipher_algorithm::SHA512,
        sqlcipher_algorithm::SHA1,
        sqlcipher_algorithm::SHA512,
    ),
    ParamSpec::new("plaintext_header_size", 0, 0, 100),
];

const RC4_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("legacy", 1, 1, 1),
    ParamSpec::new("legacy_page_size", 0, 0, MAX_PAGE_SIZE),
];

const ASCON128_PARAMS: &[ParamSpec] = &[ParamSpec::new("kdf_iter", 64007, 1, KDF_ITER_MAX)];

const AEGIS_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("tcost", 2, 1, KDF_ITER_MAX),
    ParamSpec::new("mcost", 19 * 1024, 1, KDF_ITER_MAX),
    ParamSpec::new("pcost", 1, 1, KDF_ITER_MAX),
    ParamSpec::new("algorithm", 4, 1, 6),
];

/// Common schema plus the descriptor list a registry is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Catalog {
    pub common: &'static [ParamSpec],
    pub ciphers: &'static [CipherDescriptor],
}

impl Catalog {
    pub const fn new(common: &'static [ParamSpec], ciphers: &'static [CipherDescriptor]) -> Self {
        Catalog { common, ciphers }
    }

    /// The catalog shipped with this crate
    pub const fn builtin() -> Self {
        Catalog::new(COMMON_PARAMS, CIPHERS)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::builtin()
    }
}
