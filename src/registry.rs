//! Two-level parameter registry
//!
//! The registry maps the common scope and every cipher scope to a
//! [`ParamSchema`]. Two kinds of instances exist:
//!
//! - the **global** registry ([`Registry::global`]), created on first use from
//!   the built-in [`Catalog`] and guarded by a process-wide mutex
//! - **per-connection overlays**, deep copies of the global registry taken when
//!   a connection registers its functions (see [`crate::connection`])
//!
//! Common parameter names and cipher names share one namespace for lookup
//! purposes: common names are searched first, see [`crate::resolve`].

use crate::cipher::{Catalog, CIPHER_PARAM, LEGACY_PARAM, SQLCIPHER, SQLCIPHER_VERSION_MAX};
use crate::error::{CodecParamError, Result};
use crate::legacy::LegacyConfigurator;
use crate::resolve::{split_view, View};
use crate::schema::ParamSchema;
use parking_lot::Mutex;
use std::sync::OnceLock;
use tracing::warn;

static GLOBAL_REGISTRY: OnceLock<Mutex<Registry>> = OnceLock::new();

/// Parameters of one cipher
#[derive(Debug, Clone, PartialEq, Eq)]
struct CipherScope {
    name: &'static str,
    schema: ParamSchema,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    common: ParamSchema,
    ciphers: Vec<CipherScope>,
}

impl Registry {
    /// Registry populated from the built-in catalog
    pub fn new() -> Self {
        Self::from_catalog(&Catalog::builtin())
    }

    pub fn from_catalog(catalog: &Catalog) -> Self {
        Registry {
            common: ParamSchema::from_specs(catalog.common),
            ciphers: catalog
                .ciphers
                .iter()
                .map(|c| CipherScope {
                    name: c.name,
                    schema: ParamSchema::from_specs(c.params),
                })
                .collect(),
        }
    }

    /// Process-wide registry holding the ecosystem defaults
    pub fn global() -> &'static Mutex<Registry> {
        GLOBAL_REGISTRY.get_or_init(|| Mutex::new(Registry::new()))
    }

    pub fn common(&self) -> &ParamSchema {
        &self.common
    }

    pub fn common_mut(&mut self) -> &mut ParamSchema {
        &mut self.common
    }

    /// 0-based position of the cipher scope called `name`
    pub fn cipher_position(&self, name: &str) -> Option<usize> {
        self.ciphers
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// 1-based selector value of the cipher called `name`
    pub fn cipher_index(&self, name: &str) -> Option<i32> {
        self.cipher_position(name).map(|i| i as i32 + 1)
    }

    pub fn cipher_name_at(&self, position: usize) -> Option<&'static str> {
        self.ciphers.get(position).map(|c| c.name)
    }

    /// Descriptor name for a 1-based selector value
    pub fn cipher_name(&self, index: i32) -> Option<&'static str> {
        if index < 1 {
            return None;
        }
        self.cipher_name_at(index as usize - 1)
    }

    pub fn cipher_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ciphers.iter().map(|c| c.name)
    }

    pub fn cipher(&self, name: &str) -> Option<&ParamSchema> {
        self.cipher_position(name).map(|i| &self.ciphers[i].schema)
    }

    pub fn cipher_mut(&mut self, name: &str) -> Option<&mut ParamSchema> {
        let index = self.cipher_position(name)?;
        Some(&mut self.ciphers[index].schema)
    }

    pub fn cipher_at(&self, position: usize) -> Option<&ParamSchema> {
        self.ciphers.get(position).map(|c| &c.schema)
    }

    pub fn cipher_at_mut(&mut self, position: usize) -> Option<&mut ParamSchema> {
        self.ciphers.get_mut(position).map(|c| &mut c.schema)
    }

    /// Comma-separated parameter names of a cipher scope, in declaration order
    ///
    /// `None` when the scope has no parameters.
    pub fn param_list(&self, position: usize) -> Option<String> {
        let schema = self.cipher_at(position)?;
        if schema.is_empty() {
            return None;
        }
        Some(schema.names().join(","))
    }

    /// Select the active cipher by name through `view`
    ///
    /// Returns the canonical descriptor name.
    pub fn select_cipher(&mut self, name: &str, view: View) -> Result<&'static str> {
        let index = self
            .cipher_index(name)
            .ok_or_else(|| CodecParamError::UnknownCipher(name.to_string()))?;
        let param = self
            .common
            .find_mut(CIPHER_PARAM)
            .ok_or_else(|| CodecParamError::NotFound(CIPHER_PARAM.to_string()))?;
        param.apply(view, index as i64)?;
        Ok(self.ciphers[index as usize - 1].name)
    }

    /// Read or write a common parameter
    ///
    /// `name` may carry a view prefix. A negative `value` or a `min:`/`max:`
    /// view reads without writing. Returns the post-operation value of the
    /// requested view.
    pub fn config(&mut self, name: &str, value: i64) -> Result<i32> {
        let (view, bare, _) = split_view(name);
        let param = self
            .common
            .find_mut(bare)
            .ok_or_else(|| CodecParamError::NotFound(name.to_string()))?;

        if value < 0 || view.is_bound() {
            return Ok(param.get(view));
        }
        param.apply(view, value)
    }

    /// Read or write a parameter of the cipher scope `cipher`
    ///
    /// Same read/write rules as [`Registry::config`]. Writing `legacy` of
    /// `sqlcipher` with a version in `1..=SQLCIPHER_VERSION_MAX` additionally
    /// runs `legacy` (when given) before the cell itself is written.
    pub fn config_cipher(
        &mut self,
        cipher: &str,
        param: &str,
        value: i64,
        legacy: Option<&dyn LegacyConfigurator>,
    ) -> Result<i32> {
        let Some(position) = self.cipher_position(cipher) else {
            warn!(cipher, param, "config_cipher: cipher '{}' not found", cipher);
            return Err(CodecParamError::UnknownCipher(cipher.to_string()));
        };
        let (view, bare, _) = split_view(param);

        if let Some(configurator) = legacy {
            if value >= 0 && !view.is_bound() && is_sqlcipher_legacy(cipher, bare) {
                if (1..=SQLCIPHER_VERSION_MAX as i64).contains(&value) {
                    configurator.configure_legacy_version(
                        self,
                        view == View::Default,
                        value as i32,
                    );
                } else {
                    warn!(
                        version = value,
                        "SQLCipher legacy version {} out of range [1..{}]",
                        value,
                        SQLCIPHER_VERSION_MAX
                    );
                }
            }
        }

        let cell = self.ciphers[position]
            .schema
            .find_mut(bare)
            .ok_or_else(|| CodecParamError::NotFound(param.to_string()))?;

        if value < 0 || view.is_bound() {
            return Ok(cell.get(view));
        }
        cell.apply(view, value).map_err(|err| {
            warn!(
                cipher,
                param = bare,
                "Value {} for parameter '{}' of cipher '{}' out of range [{}..{}]",
                value,
                bare,
                cipher,
                cell.min(),
                cell.max()
            );
            err
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

/// The cross-scope `sqlcipher` / `legacy` switch
fn is_sqlcipher_legacy(cipher: &str, param: &str) -> bool {
    cipher.eq_ignore_ascii_case(SQLCIPHER) && param.eq_ignore_ascii_case(LEGACY_PARAM)
}
