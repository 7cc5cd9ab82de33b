//! Overlay settings
//!
//! Settings are read from TOML and applied to a connection overlay when it is
//! registered. Every value is written through the `default:` view, so it
//! becomes both the default and the current value of the cell.
//!
//! ```toml
//! hex_case = "upper"
//! cipher = "sqlcipher"
//!
//! [common]
//! hmac_check = 1
//!
//! [ciphers.sqlcipher]
//! kdf_iter = 64000
//! ```

use crate::codec::HexCase;
use crate::error::{CodecParamError, Result};
use crate::registry::Registry;
use crate::resolve::View;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Digit case for hex salts
    #[serde(default)]
    pub hex_case: HexCase,

    /// Cipher selected by default
    #[serde(default)]
    pub cipher: Option<String>,

    /// Common scope values by parameter name
    #[serde(default)]
    pub common: BTreeMap<String, i64>,

    /// Cipher scope values, keyed by cipher then parameter name
    #[serde(default)]
    pub ciphers: BTreeMap<String, BTreeMap<String, i64>>,
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Write every configured value into `registry` as a default
    ///
    /// Stops at the first unknown name or out-of-range value.
    pub fn apply(&self, registry: &mut Registry) -> Result<()> {
        if let Some(cipher) = &self.cipher {
            registry.select_cipher(cipher, View::Default)?;
        }

        for (name, &value) in &self.common {
            let param = registry
                .common_mut()
                .find_mut(name)
                .ok_or_else(|| CodecParamError::NotFound(name.clone()))?;
            param.apply(View::Default, value)?;
        }

        for (cipher, params) in &self.ciphers {
            let schema = registry
                .cipher_mut(cipher)
                .ok_or_else(|| CodecParamError::UnknownCipher(cipher.clone()))?;
            for (name, &value) in params {
                let param = schema
                    .find_mut(name)
                    .ok_or_else(|| CodecParamError::NotFound(name.clone()))?;
                param.apply(View::Default, value)?;
            }
        }

        Ok(())
    }
}
