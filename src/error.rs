use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecParamError {
    /// No parameter or cipher name was supplied
    #[error("Parameter name missing")]
    MissingName,

    /// Name does not resolve in the common or cipher scope
    #[error("Unknown parameter: {0}")]
    NotFound(String),

    /// Write outside the inclusive bounds of the cell
    #[error("Value {value} for parameter '{name}' out of range [{min}..{max}]")]
    OutOfRange {
        name: String,
        value: i64,
        min: i32,
        max: i32,
    },

    /// Write through the `min:` or `max:` view
    #[error("Parameter '{0}' is read-only through the min:/max: views")]
    ReadOnlyView(String),

    /// Cipher parameter write without a connection
    #[error("Global change of parameter '{param}' for cipher '{cipher}' not supported")]
    GlobalCipherChange { cipher: String, param: String },

    /// Cipher name not in the descriptor list
    #[error("unknown cipher '{0}'")]
    UnknownCipher(String),

    /// Connection has no overlay (see `register`)
    #[error("Codec parameter table not registered on this connection")]
    NotRegistered,

    /// SQLite result code from function registration
    #[error("Function registration failed: {0}")]
    Registration(i32),

    /// Error from rusqlite
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Malformed settings file
    #[error("Settings error: {0}")]
    Settings(#[from] toml::de::Error),

    /// I/O error while loading settings
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CodecParamError>;
