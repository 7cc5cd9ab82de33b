//! Per-connection overlays and the programmatic entry points
//!
//! Registering a connection clones the global registry into a
//! [`CodecParams`] overlay and installs three SQL functions:
//!
//! - `sqlite3mc_config_table()` returns a pointer to the overlay, tagged
//!   `sqlite3mc_codec_params`
//! - `sqlite3mc_config(...)` and `sqlite3mc_codec_data(...)`, see [`crate::sql`]
//!
//! The programmatic functions ([`config`], [`config_cipher`], [`codec_data`])
//! only receive a [`Connection`]; they find the overlay by querying
//! `sqlite3mc_config_table()` and reading the tagged pointer back. A missing
//! function or a foreign tag falls back to the global registry.

use crate::codec::{self, CodecLookup, HexCase};
use crate::error::{CodecParamError, Result};
use crate::legacy::{LegacyConfigurator, SqlCipherVersions};
use crate::registry::Registry;
use crate::settings::Settings;
use crate::{sql, uri};
use libsqlite3_sys as ffi;
use parking_lot::{Mutex, MutexGuard};
use rusqlite::{Connection, OpenFlags};
use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_void};
use std::ptr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Zero-argument function returning the overlay pointer
pub const CONFIG_TABLE_FUNCTION: &str = "sqlite3mc_config_table";

/// Pointer type tag of the overlay (NUL-terminated, static for SQLite)
const CODEC_PARAMS_TYPE: &[u8] = b"sqlite3mc_codec_params\0";

const CONFIG_TABLE_QUERY: &[u8] = b"SELECT sqlite3mc_config_table();\0";

/// Hooks and settings used when registering a connection
#[derive(Clone)]
pub struct RegisterOptions {
    pub settings: Settings,
    pub codecs: Option<Arc<dyn CodecLookup>>,
    pub legacy: Arc<dyn LegacyConfigurator>,
}

impl Default for RegisterOptions {
    fn default() -> Self {
        RegisterOptions {
            settings: Settings::default(),
            codecs: None,
            legacy: Arc::new(SqlCipherVersions),
        }
    }
}

impl RegisterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_codecs(mut self, codecs: Arc<dyn CodecLookup>) -> Self {
        self.codecs = Some(codecs);
        self
    }

    pub fn with_legacy(mut self, legacy: Arc<dyn LegacyConfigurator>) -> Self {
        self.legacy = legacy;
        self
    }
}

/// Parameter overlay owned by one connection
pub struct CodecParams {
    registry: Mutex<Registry>,
    hex_case: HexCase,
    codecs: Option<Arc<dyn CodecLookup>>,
    legacy: Arc<dyn LegacyConfigurator>,
}

impl CodecParams {
    pub fn new(registry: Registry, options: &RegisterOptions) -> Self {
        CodecParams {
            registry: Mutex::new(registry),
            hex_case: options.settings.hex_case,
            codecs: options.codecs.clone(),
            legacy: Arc::clone(&options.legacy),
        }
    }

    /// Lock the overlay; every cell read and write happens under this guard
    pub fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock()
    }

    pub fn hex_case(&self) -> HexCase {
        self.hex_case
    }

    pub fn codecs(&self) -> Option<&dyn CodecLookup> {
        self.codecs.as_deref()
    }

    pub fn legacy(&self) -> &dyn LegacyConfigurator {
        self.legacy.as_ref()
    }

    /// Find the overlay registered on `conn`
    pub fn for_connection(conn: &Connection) -> Option<Arc<CodecParams>> {
        unsafe {
            let db = conn.handle();
            let mut stmt: *mut ffi::sqlite3_stmt = ptr::null_mut();
            let rc = ffi::sqlite3_prepare_v2(
                db,
                CONFIG_TABLE_QUERY.as_ptr() as *const c_char,
                -1,
                &mut stmt,
                ptr::null_mut(),
            );
            if rc != ffi::SQLITE_OK || stmt.is_null() {
                return None;
            }

            let mut params = None;
            if ffi::sqlite3_step(stmt) == ffi::SQLITE_ROW {
                let value = ffi::sqlite3_column_value(stmt, 0);
                let raw =
                    ffi::sqlite3_value_pointer(value, CODEC_PARAMS_TYPE.as_ptr() as *const c_char);
                if !raw.is_null() {
                    params = Some(Arc::clone(&*(raw as *const Arc<CodecParams>)));
                }
            }
            ffi::sqlite3_finalize(stmt);
            params
        }
    }
}

/// Register an overlay with default options
pub fn register(conn: &Connection) -> Result<Arc<CodecParams>> {
    register_with(conn, RegisterOptions::default())
}

/// Register an overlay cloned from the global registry and install the SQL functions
///
/// Registering again replaces the previous overlay.
pub fn register_with(conn: &Connection, options: RegisterOptions) -> Result<Arc<CodecParams>> {
    let mut registry = Registry::global().lock().clone();
    options.settings.apply(&mut registry)?;

    let params = Arc::new(CodecParams::new(registry, &options));
    register_config_table(conn, &params)?;
    sql::register_functions(conn, &params)?;

    debug!(
        hex_case = ?params.hex_case(),
        codecs = params.codecs().is_some(),
        "Registered codec parameter overlay"
    );
    Ok(params)
}

fn register_config_table(conn: &Connection, params: &Arc<CodecParams>) -> Result<()> {
    let name = CString::new(CONFIG_TABLE_FUNCTION)
        .map_err(|_| CodecParamError::Registration(ffi::SQLITE_MISUSE))?;
    let user_data = Box::into_raw(Box::new(Arc::clone(params)));

    // SQLite runs the destructor itself if registration fails
    let rc = unsafe {
        ffi::sqlite3_create_function_v2(
            conn.handle(),
            name.as_ptr(),
            0,
            ffi::SQLITE_UTF8,
            user_data as *mut c_void,
            Some(config_table_func),
            None,
            None,
            Some(drop_codec_params),
        )
    };
    if rc != ffi::SQLITE_OK {
        return Err(CodecParamError::Registration(rc));
    }
    Ok(())
}

unsafe extern "C" fn config_table_func(
    ctx: *mut ffi::sqlite3_context,
    _argc: c_int,
    _argv: *mut *mut ffi::sqlite3_value,
) {
    let params = ffi::sqlite3_user_data(ctx);
    ffi::sqlite3_result_pointer(ctx, params, CODEC_PARAMS_TYPE.as_ptr() as *const c_char, None);
}

unsafe extern "C" fn drop_codec_params(data: *mut c_void) {
    if !data.is_null() {
        drop(Box::from_raw(data as *mut Arc<CodecParams>));
    }
}

/// Index of `schema` in `PRAGMA database_list` (`main` is 0)
pub(crate) fn schema_index(conn: &Connection, schema: &str) -> Option<usize> {
    let mut stmt = conn.prepare("PRAGMA database_list").ok()?;
    let mut rows = stmt.query([]).ok()?;
    while let Ok(Some(row)) = rows.next() {
        let name: String = row.get(1).ok()?;
        if name.eq_ignore_ascii_case(schema) {
            let seq: i64 = row.get(0).ok()?;
            return usize::try_from(seq).ok();
        }
    }
    None
}

/// Read or write a common parameter
///
/// With a connection the overlay is used, otherwise the global registry.
/// Negative values read. Writing the global registry is allowed for common
/// parameters only when no connection is given; new overlays start from it.
/// A connection without an overlay can read the global registry but not
/// write it.
pub fn try_config(db: Option<&Connection>, name: Option<&str>, value: i32) -> Result<i32> {
    let name = name.ok_or(CodecParamError::MissingName)?;

    match db {
        None => Registry::global().lock().config(name, value as i64),
        Some(conn) => match CodecParams::for_connection(conn) {
            Some(params) => params.lock().config(name, value as i64),
            None if value >= 0 => {
                warn!(name, "config: connection has no codec parameter table");
                Err(CodecParamError::NotRegistered)
            }
            None => Registry::global().lock().config(name, value as i64),
        },
    }
}

/// Read or write a parameter of one cipher
///
/// Without a connection (or overlay) only reads are allowed.
pub fn try_config_cipher(
    db: Option<&Connection>,
    cipher: Option<&str>,
    param: Option<&str>,
    value: i32,
) -> Result<i32> {
    let (cipher, param) = match (cipher, param) {
        (Some(cipher), Some(param)) => (cipher, param),
        _ => {
            warn!(
                "config_cipher: cipher name ('{}') or parameter ('{}') missing",
                cipher.unwrap_or(""),
                param.unwrap_or("")
            );
            return Err(CodecParamError::MissingName);
        }
    };

    match db.and_then(CodecParams::for_connection) {
        Some(params) => {
            let mut registry = params.lock();
            registry.config_cipher(cipher, param, value as i64, Some(params.legacy()))
        }
        None if value >= 0 => {
            warn!(
                cipher,
                param, "config_cipher: global change of parameter '{}' for cipher '{}' not supported",
                param,
                cipher
            );
            Err(CodecParamError::GlobalCipherChange {
                cipher: cipher.to_string(),
                param: param.to_string(),
            })
        }
        None => Registry::global()
            .lock()
            .config_cipher(cipher, param, value as i64, None),
    }
}

/// [`try_config`] with the `-1` sentinel for every failure
pub fn config(db: Option<&Connection>, name: Option<&str>, value: i32) -> i32 {
    try_config(db, name, value).unwrap_or(-1)
}

/// [`try_config_cipher`] with the `-1` sentinel for every failure
pub fn config_cipher(
    db: Option<&Connection>,
    cipher: Option<&str>,
    param: Option<&str>,
    value: i32,
) -> i32 {
    try_config_cipher(db, cipher, param, value).unwrap_or(-1)
}

/// Codec derived data of a schema (default `main`)
///
/// Only `cipher_salt` (32 hex digits) and `raw:cipher_salt` (16 bytes plus a
/// terminating zero) are answered. Nothing is returned for unencrypted
/// databases or unknown names.
pub fn codec_data(db: &Connection, schema: Option<&str>, name: &str) -> Option<Vec<u8>> {
    codec::parse_codec_data_name(name)?;
    let params = CodecParams::for_connection(db)?;
    let index = schema_index(db, schema.unwrap_or("main"))?;
    let found = params.codecs()?.codec(index);
    codec::codec_data(found.as_deref(), name, params.hex_case())
}

/// Open a database URI, register an overlay and apply its URI parameters
pub fn open(uri: &str) -> Result<Connection> {
    open_with(uri, RegisterOptions::default())
}

pub fn open_with(uri: &str, options: RegisterOptions) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        uri,
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    let params = register_with(&conn, options)?;
    uri::configure_from_uri(&conn, &params, "main", false)?;
    Ok(conn)
}

/// Attach a database URI as `schema` and apply its URI parameters
///
/// The attachment is rolled back when the URI names an unknown cipher.
pub fn attach(conn: &Connection, uri: &str, schema: &str) -> Result<()> {
    let params = CodecParams::for_connection(conn).ok_or(CodecParamError::NotRegistered)?;
    conn.execute("ATTACH DATABASE ?1 AS ?2", [uri, schema])?;

    if let Err(err) = uri::configure_from_uri(conn, &params, schema, false) {
        conn.execute("DETACH DATABASE ?1", [schema])?;
        return Err(err);
    }
    Ok(())
}
