//! # codec-params - Cipher Parameter Registry for SQLite
//!
//! `codec-params` keeps the tunable parameters of a family of page-level
//! database ciphers (key derivation rounds, HMAC settings, legacy page sizes
//! and so on) and exposes them through three surfaces with identical
//! semantics:
//!
//! - **Programmatic**: [`config`] and [`config_cipher`], with the `-1`
//!   sentinel on failure, or the [`try_config`] / [`try_config_cipher`]
//!   variants returning [`Result`]
//! - **SQL**: `sqlite3mc_config(...)` and `sqlite3mc_codec_data(...)`
//!   installed on a connection by [`register`]
//! - **URI**: `file:app.db?cipher=sqlcipher&legacy=4` applied by [`open`] and
//!   [`attach`]
//!
//! Every parameter cell holds four values: current, default, min and max.
//! Names select one of them with the `default:`, `min:` and `max:` prefixes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use codec_params::{config, config_cipher, register, Result};
//! use rusqlite::Connection;
//!
//! # fn main() -> Result<()> {
//! let conn = Connection::open_in_memory()?;
//! register(&conn)?;
//!
//! // Per-connection overlay; the global defaults stay untouched
//! config_cipher(Some(&conn), Some("sqlcipher"), Some("kdf_iter"), 64000);
//! assert_eq!(config(Some(&conn), Some("min:cipher"), -1), 1);
//!
//! let cipher: String =
//!     conn.query_row("SELECT sqlite3mc_config('cipher', 'sqlcipher')", [], |r| r.get(0))?;
//! assert_eq!(cipher, "sqlcipher");
//! # Ok(())
//! # }
//! ```
//!
//! ## Settings
//!
//! ```rust,no_run
//! use codec_params::{open_with, RegisterOptions, Settings, Result};
//!
//! # fn main() -> Result<()> {
//! let settings = Settings::load("codec.toml")?;
//! let _conn = open_with("file:app.db?cipher=aes256cbc", RegisterOptions::new().with_settings(settings))?;
//! # Ok(())
//! # }
//! ```

pub mod cipher;
pub mod codec;
pub mod connection;
pub mod error;
pub mod legacy;
pub mod param;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod settings;
pub mod sql;
pub mod uri;

pub use cipher::{
    sqlcipher_algorithm, Catalog, CipherDescriptor, CIPHERS, COMMON_PARAMS, DEFAULT_CIPHER_INDEX,
    SQLCIPHER_VERSION_MAX,
};
pub use codec::{Codec, CodecLookup, HexCase, SALT_SIZE};
pub use connection::{
    attach, codec_data, config, config_cipher, open, open_with, register, register_with,
    try_config, try_config_cipher, CodecParams, RegisterOptions,
};
pub use error::{CodecParamError, Result};
pub use legacy::{LegacyConfigurator, SqlCipherVersions};
pub use param::{Param, ParamSpec};
pub use registry::Registry;
pub use resolve::View;
pub use schema::ParamSchema;
pub use settings::Settings;
pub use uri::UriParameters;
