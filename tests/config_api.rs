//! Programmatic API tests
//!
//! Exercises `config` / `config_cipher` / `codec_data` against registered
//! connections, unregistered connections and the global registry.

use codec_params::{
    codec_data, config, config_cipher, register, register_with, try_config, try_config_cipher,
    Codec,
    CodecLookup, CodecParamError, HexCase, RegisterOptions, Settings, SALT_SIZE,
};
use rusqlite::Connection;
use std::sync::Arc;

fn registered() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    register(&conn).unwrap();
    conn
}

struct SaltedCodec {
    encrypted: bool,
}

impl Codec for SaltedCodec {
    fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    fn has_write_cipher(&self) -> bool {
        true
    }

    fn write_cipher_salt(&self) -> Option<[u8; SALT_SIZE]> {
        let mut salt = [0u8; SALT_SIZE];
        for (i, b) in salt.iter_mut().enumerate() {
            *b = (i as u8) * 0x11;
        }
        Some(salt)
    }
}

/// `main` is encrypted, the first attached schema is not
struct TwoSchemas;

impl CodecLookup for TwoSchemas {
    fn codec(&self, schema_index: usize) -> Option<Arc<dyn Codec>> {
        match schema_index {
            0 => Some(Arc::new(SaltedCodec { encrypted: true })),
            2 => Some(Arc::new(SaltedCodec { encrypted: false })),
            _ => None,
        }
    }
}

#[test]
fn test_cipher_integer_set_get() {
    let conn = registered();

    assert_eq!(config_cipher(Some(&conn), Some("chacha20"), Some("kdf_iter"), 128000), 128000);
    assert_eq!(config_cipher(Some(&conn), Some("chacha20"), Some("kdf_iter"), -1), 128000);
    assert_eq!(config_cipher(Some(&conn), Some("chacha20"), Some("min:kdf_iter"), -1), 1);
    assert_eq!(config_cipher(Some(&conn), Some("chacha20"), Some("default:kdf_iter"), -1), 64007);
}

#[test]
fn test_out_of_range_write() {
    let conn = registered();

    // negative values read
    assert_eq!(config_cipher(Some(&conn), Some("sqlcipher"), Some("fast_kdf_iter"), -5), 2);
    assert_eq!(config_cipher(Some(&conn), Some("sqlcipher"), Some("fast_kdf_iter"), 0), -1);
    assert!(matches!(
        try_config_cipher(Some(&conn), Some("sqlcipher"), Some("fast_kdf_iter"), 0),
        Err(CodecParamError::OutOfRange {
            min: 1,
            max: 2147483647,
            ..
        })
    ));
    assert_eq!(config_cipher(Some(&conn), Some("sqlcipher"), Some("fast_kdf_iter"), -1), 2);
}

#[test]
fn test_common_views() {
    let conn = registered();

    assert_eq!(config(Some(&conn), Some("cipher"), -1), 3);
    assert_eq!(config(Some(&conn), Some("MIN:cipher"), -1), 1);
    assert_eq!(config(Some(&conn), Some("max:cipher"), -1), 7);
    assert_eq!(config(Some(&conn), Some("max:cipher"), 2), 7);
    assert_eq!(config(Some(&conn), Some("cipher"), 4), 4);
    assert_eq!(config(Some(&conn), Some("default:cipher"), -1), 3);
    assert_eq!(config(Some(&conn), Some("cipher"), 8), -1);
    assert_eq!(config(Some(&conn), Some("unknown"), -1), -1);
    assert_eq!(config(Some(&conn), Some("sqlcipher"), -1), -1);
}

#[test]
fn test_hmac_check_default_cannot_be_lowered() {
    let conn = registered();

    assert_eq!(config(Some(&conn), Some("default:hmac_check"), 0), 1);
    assert_eq!(config(Some(&conn), Some("hmac_check"), -1), 0);
    assert_eq!(config(Some(&conn), Some("default:hmac_check"), -1), 1);
}

#[test]
fn test_prefix_rejected_on_cipher_name() {
    let conn = registered();
    assert_eq!(config_cipher(Some(&conn), Some("default:sqlcipher"), Some("kdf_iter"), -1), -1);
}

#[test]
fn test_namespaces_do_not_alias() {
    let conn = registered();

    assert_eq!(config_cipher(Some(&conn), Some("sqlcipher"), Some("cipher"), -1), -1);
    config_cipher(Some(&conn), Some("sqlcipher"), Some("legacy_page_size"), 1024);
    assert_eq!(config_cipher(Some(&conn), Some("chacha20"), Some("legacy_page_size"), -1), 4096);
}

#[test]
fn test_legacy_version_through_api() {
    let conn = registered();

    assert_eq!(config_cipher(Some(&conn), Some("sqlcipher"), Some("default:legacy"), 4), 4);
    assert_eq!(config_cipher(Some(&conn), Some("sqlcipher"), Some("default:kdf_iter"), -1), 256000);
    assert_eq!(config_cipher(Some(&conn), Some("sqlcipher"), Some("legacy"), 3), 3);
    assert_eq!(config_cipher(Some(&conn), Some("sqlcipher"), Some("kdf_iter"), -1), 64000);
    assert_eq!(config_cipher(Some(&conn), Some("sqlcipher"), Some("hmac_algorithm"), -1), 0);
    assert_eq!(config_cipher(Some(&conn), Some("sqlcipher"), Some("legacy"), 5), -1);
}

#[test]
fn test_overlays_are_isolated() {
    let a = registered();
    let b = registered();

    config_cipher(Some(&a), Some("aes256cbc"), Some("kdf_iter"), 12345);
    assert_eq!(config_cipher(Some(&b), Some("aes256cbc"), Some("kdf_iter"), -1), 4001);
    assert_eq!(config_cipher(None, Some("aes256cbc"), Some("kdf_iter"), -1), 4001);
}

#[test]
fn test_unregistered_connection_reads_global() {
    let conn = Connection::open_in_memory().unwrap();

    assert_eq!(config_cipher(Some(&conn), Some("sqlcipher"), Some("kdf_iter"), -1), 256000);
    assert_eq!(config_cipher(Some(&conn), Some("sqlcipher"), Some("kdf_iter"), 1000), -1);
}

#[test]
fn test_unregistered_connection_cannot_write_global() {
    let conn = Connection::open_in_memory().unwrap();

    assert_eq!(config(Some(&conn), Some("hmac_check"), -1), 1);
    assert_eq!(config(Some(&conn), Some("hmac_check"), 0), -1);
    assert!(matches!(
        try_config(Some(&conn), Some("default:cipher"), 4),
        Err(CodecParamError::NotRegistered)
    ));

    assert_eq!(config(None, Some("hmac_check"), -1), 1);
    assert_eq!(config(None, Some("default:cipher"), -1), 3);
    let fresh = registered();
    assert_eq!(config(Some(&fresh), Some("hmac_check"), -1), 1);
}

#[test]
fn test_foreign_pointer_tag_falls_back_to_global() {
    let conn = registered();
    config_cipher(Some(&conn), Some("chacha20"), Some("kdf_iter"), 999);
    assert_eq!(config_cipher(Some(&conn), Some("chacha20"), Some("kdf_iter"), -1), 999);

    // Shadow the pointer function with one returning a plain integer
    conn.create_scalar_function(
        "sqlite3mc_config_table",
        0,
        rusqlite::functions::FunctionFlags::SQLITE_UTF8,
        |_| Ok(42i64),
    )
    .unwrap();

    assert_eq!(config_cipher(Some(&conn), Some("chacha20"), Some("kdf_iter"), -1), 64007);
}

#[test]
fn test_global_common_write() {
    // only test touching the global registry
    assert_eq!(config(None, Some("mc_legacy_wal"), -1), 0);
    assert_eq!(config(None, Some("mc_legacy_wal"), 1), 1);

    let conn = registered();
    assert_eq!(config(Some(&conn), Some("mc_legacy_wal"), -1), 1);

    assert_eq!(config(None, Some("mc_legacy_wal"), 0), 0);
    assert_eq!(config(Some(&conn), Some("mc_legacy_wal"), -1), 1);
}

#[test]
fn test_settings_seed_overlay() {
    let settings = Settings::from_toml_str(
        r#"
cipher = "aegis"

[ciphers.aegis]
tcost = 3
"#,
    )
    .unwrap();
    let conn = Connection::open_in_memory().unwrap();
    register_with(&conn, RegisterOptions::new().with_settings(settings)).unwrap();

    assert_eq!(config(Some(&conn), Some("cipher"), -1), 7);
    assert_eq!(config(Some(&conn), Some("default:cipher"), -1), 7);
    assert_eq!(config_cipher(Some(&conn), Some("aegis"), Some("default:tcost"), -1), 3);
}

#[test]
fn test_register_rejects_bad_settings() {
    let settings = Settings::from_toml_str("[common]\nmc_legacy_wal = 2\n").unwrap();
    let conn = Connection::open_in_memory().unwrap();
    assert!(register_with(&conn, RegisterOptions::new().with_settings(settings)).is_err());
}

#[test]
fn test_salt_readout() {
    let conn = Connection::open_in_memory().unwrap();
    register_with(&conn, RegisterOptions::new().with_codecs(Arc::new(TwoSchemas))).unwrap();

    let hex = codec_data(&conn, Some("main"), "cipher_salt").unwrap();
    assert_eq!(hex, b"00112233445566778899aabbccddeeff".to_vec());

    let raw = codec_data(&conn, None, "raw:cipher_salt").unwrap();
    assert_eq!(raw.len(), SALT_SIZE + 1);
    assert_eq!(raw[1], 0x11);
    assert_eq!(raw[SALT_SIZE], 0);

    assert_eq!(codec_data(&conn, Some("main"), "kdf_iter"), None);
    assert_eq!(codec_data(&conn, Some("nope"), "cipher_salt"), None);
}

#[test]
fn test_salt_readout_uppercase_and_plain_schema() {
    let settings = Settings {
        hex_case: HexCase::Upper,
        ..Settings::default()
    };
    let conn = Connection::open_in_memory().unwrap();
    register_with(
        &conn,
        RegisterOptions::new()
            .with_settings(settings)
            .with_codecs(Arc::new(TwoSchemas)),
    )
    .unwrap();
    conn.execute("ATTACH DATABASE ':memory:' AS plain", []).unwrap();

    let hex = codec_data(&conn, Some("main"), "cipher_salt").unwrap();
    assert_eq!(String::from_utf8(hex).unwrap(), "00112233445566778899AABBCCDDEEFF");
    assert_eq!(codec_data(&conn, Some("plain"), "cipher_salt"), None);
    assert_eq!(codec_data(&conn, Some("plain"), "raw:cipher_salt"), None);
}

#[test]
fn test_salt_readout_unregistered() {
    let conn = Connection::open_in_memory().unwrap();
    assert_eq!(codec_data(&conn, None, "cipher_salt"), None);
}
