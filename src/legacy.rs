//! SQLCipher legacy version switch
//!
//! Writing `legacy` of the `sqlcipher` scope selects the on-disk format of an
//! older SQLCipher release. One write fans out to several cells, which is why
//! the registry delegates it to a [`LegacyConfigurator`] instead of treating it
//! as a plain cell update.

use crate::cipher::{sqlcipher_algorithm, SQLCIPHER, SQLCIPHER_VERSION_MAX};
use crate::registry::Registry;
use crate::resolve::View;
use tracing::{debug, warn};

/// Applies the parameter set belonging to a SQLCipher major version
///
/// Called with the registry already locked; implementations must not try to
/// lock it again.
pub trait LegacyConfigurator: Send + Sync {
    fn configure_legacy_version(&self, registry: &mut Registry, is_default: bool, version: i32);
}

/// Cells written for a legacy version, in this order
const VERSION_PARAM_NAMES: [&str; 5] = [
    "legacy_page_size",
    "kdf_iter",
    "hmac_use",
    "kdf_algorithm",
    "hmac_algorithm",
];

/// Values for [`VERSION_PARAM_NAMES`], one row per SQLCipher major version
const VERSION_PARAMS: [[i32; 5]; SQLCIPHER_VERSION_MAX as usize] = [
    [
        1024,
        4000,
        0,
        sqlcipher_algorithm::SHA1,
        sqlcipher_algorithm::SHA1,
    ],
    [
        1024,
        4000,
        1,
        sqlcipher_algorithm::SHA1,
        sqlcipher_algorithm::SHA1,
    ],
    [
        1024,
        64000,
        1,
        sqlcipher_algorithm::SHA1,
        sqlcipher_algorithm::SHA1,
    ],
    [
        4096,
        256000,
        1,
        sqlcipher_algorithm::SHA512,
        sqlcipher_algorithm::SHA512,
    ],
];

/// Built-in presets for SQLCipher 1 through 4
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlCipherVersions;

impl LegacyConfigurator for SqlCipherVersions {
    fn configure_legacy_version(&self, registry: &mut Registry, is_default: bool, version: i32) {
        if !(1..=SQLCIPHER_VERSION_MAX).contains(&version) {
            return;
        }
        let Some(schema) = registry.cipher_mut(SQLCIPHER) else {
            return;
        };

        let view = if is_default { View::Default } else { View::Current };
        let values = &VERSION_PARAMS[version as usize - 1];
        for (name, &value) in VERSION_PARAM_NAMES.iter().zip(values) {
            match schema.find_mut(name) {
                Some(param) => {
                    if let Err(err) = param.apply(view, value as i64) {
                        warn!(param = *name, "SQLCipher legacy preset rejected: {}", err);
                    }
                }
                None => warn!(param = *name, "SQLCipher schema lacks legacy preset parameter"),
            }
        }

        debug!(version, is_default, "Applied SQLCipher legacy preset");
    }
}
