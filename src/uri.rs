//! Configuration embedded in database URIs
//!
//! `file:app.db?cipher=sqlcipher&legacy=3&kdf_iter=64000` selects the cipher,
//! runs the SQLCipher version preset and then writes every cipher parameter
//! that appears as a query key. URIs without a `cipher` key are left alone.

use crate::cipher::{CIPHER_PARAM, HMAC_CHECK_PARAM, LEGACY_PARAM, SQLCIPHER, SQLCIPHER_VERSION_MAX};
use crate::connection::CodecParams;
use crate::error::{CodecParamError, Result};
use crate::resolve::View;
use libsqlite3_sys as ffi;
use rusqlite::Connection;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use tracing::{debug, error, warn};

/// Query parameters of a database filename
pub trait UriParameters {
    /// Raw value of `name`, if present
    fn parameter(&self, name: &str) -> Option<String>;

    /// `name` interpreted as a boolean, `default` when absent or unparseable
    fn boolean(&self, name: &str, default: bool) -> bool;

    /// `name` interpreted as a base-10 integer, `default` when absent
    fn int64(&self, name: &str, default: i64) -> i64;
}

/// Query parameters read through SQLite from a schema's filename
struct DbFilename {
    filename: *const c_char,
}

impl DbFilename {
    /// `None` for in-memory and temporary databases
    fn for_schema(conn: &Connection, schema: &str) -> Option<Self> {
        let schema = CString::new(schema).ok()?;
        let filename = unsafe { ffi::sqlite3_db_filename(conn.handle(), schema.as_ptr()) };
        if filename.is_null() || unsafe { *filename } == 0 {
            return None;
        }
        Some(DbFilename { filename })
    }
}

impl UriParameters for DbFilename {
    fn parameter(&self, name: &str) -> Option<String> {
        let name = CString::new(name).ok()?;
        unsafe {
            let value = ffi::sqlite3_uri_parameter(self.filename, name.as_ptr());
            if value.is_null() {
                return None;
            }
            Some(CStr::from_ptr(value).to_string_lossy().into_owned())
        }
    }

    fn boolean(&self, name: &str, default: bool) -> bool {
        let Ok(name) = CString::new(name) else {
            return default;
        };
        unsafe { ffi::sqlite3_uri_boolean(self.filename, name.as_ptr(), default as i32) != 0 }
    }

    fn int64(&self, name: &str, default: i64) -> i64 {
        let Ok(name) = CString::new(name) else {
            return default;
        };
        unsafe { ffi::sqlite3_uri_int64(self.filename, name.as_ptr(), default) }
    }
}

/// Apply the URI parameters of `schema` to the overlay
///
/// With `config_default` every value is also written as the default. An
/// unknown cipher name is an error; everything else that does not fit is
/// logged and skipped.
pub fn configure_from_uri(
    conn: &Connection,
    params: &CodecParams,
    schema: &str,
    config_default: bool,
) -> Result<()> {
    match DbFilename::for_schema(conn, schema) {
        Some(uri) => apply_uri(params, &uri, config_default),
        None => Ok(()),
    }
}

/// Apply already parsed URI parameters to the overlay
pub fn apply_uri(
    params: &CodecParams,
    uri: &impl UriParameters,
    config_default: bool,
) -> Result<()> {
    let Some(cipher) = uri.parameter(CIPHER_PARAM) else {
        return Ok(());
    };

    let view = if config_default { View::Default } else { View::Current };
    let mut registry = params.lock();

    let selected = match registry.select_cipher(&cipher, view) {
        Ok(name) => name,
        Err(err) => {
            error!("unknown cipher '{}'", cipher);
            return Err(match err {
                CodecParamError::UnknownCipher(_) => err,
                _ => CodecParamError::UnknownCipher(cipher),
            });
        }
    };

    if !uri.boolean(HMAC_CHECK_PARAM, true) {
        registry.config(HMAC_CHECK_PARAM, 0)?;
    }

    if selected == SQLCIPHER {
        let legacy = uri.int64(LEGACY_PARAM, 0);
        if (1..=SQLCIPHER_VERSION_MAX as i64).contains(&legacy) {
            params
                .legacy()
                .configure_legacy_version(&mut registry, config_default, legacy as i32);
        }
    }

    let names = match registry.cipher(selected) {
        Some(schema) => schema.names(),
        None => Vec::new(),
    };
    let mut applied = 0usize;
    for name in names {
        let value = uri.int64(name, -1);
        if value < 0 {
            continue;
        }
        if value > i32::MAX as i64 {
            warn!(cipher = selected, param = name, "URI value {} exceeds parameter width", value);
            continue;
        }

        let param = format!("{}{}", view.prefix(), name);
        // legacy preset already applied above
        match registry.config_cipher(selected, &param, value, None) {
            Ok(_) => applied += 1,
            Err(err) => warn!(cipher = selected, param = name, "URI parameter ignored: {}", err),
        }
    }

    debug!(cipher = selected, applied, config_default, "Applied URI codec parameters");
    Ok(())
}
