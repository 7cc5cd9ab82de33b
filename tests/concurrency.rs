//! Concurrent access to overlays and the global registry
//!
//! Hammers one overlay from several threads and checks that every cell stays
//! within bounds and that overlays never leak into each other.

use codec_params::{config_cipher, register, CodecParams, Registry};
use rusqlite::Connection;
use std::sync::Arc;
use std::thread;

#[test]
fn test_shared_overlay_concurrent_writers() {
    let conn = Connection::open_in_memory().unwrap();
    let params: Arc<CodecParams> = register(&conn).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|thread_id| {
            let params = Arc::clone(&params);
            thread::spawn(move || {
                for i in 0..500i64 {
                    let mut registry = params.lock();
                    let value = 1000 + thread_id * 1000 + i;
                    let written = registry
                        .config_cipher("chacha20", "kdf_iter", value, None)
                        .unwrap();
                    assert_eq!(written as i64, value);
                    // out of range writes never land
                    assert!(registry.config_cipher("sqlcipher", "hmac_pgno", 3, None).is_err());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let last = config_cipher(Some(&conn), Some("chacha20"), Some("kdf_iter"), -1);
    assert!((1000..=8999 + 499).contains(&last), "unexpected value {}", last);
    assert_eq!(config_cipher(Some(&conn), Some("sqlcipher"), Some("hmac_pgno"), -1), 1);
}

#[test]
fn test_connections_on_threads_are_isolated() {
    let handles: Vec<_> = (0..8)
        .map(|thread_id| {
            thread::spawn(move || {
                let conn = Connection::open_in_memory().unwrap();
                register(&conn).unwrap();
                let value = 10_000 + thread_id;
                for _ in 0..100 {
                    config_cipher(Some(&conn), Some("aes256cbc"), Some("kdf_iter"), value);
                    assert_eq!(
                        config_cipher(Some(&conn), Some("aes256cbc"), Some("kdf_iter"), -1),
                        value
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(
        Registry::global()
            .lock()
            .config_cipher("aes256cbc", "kdf_iter", -1, None)
            .unwrap(),
        4001
    );
}
