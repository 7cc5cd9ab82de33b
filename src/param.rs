//! Parameter cells
//!
//! A cell holds four integers for one named parameter:
//!
//! - **current**: the value the codec uses for the next key derivation
//! - **default**: the value a freshly keyed database starts from
//! - **min** / **max**: inclusive bounds, fixed by the schema
//!
//! The bounds live in [`ParamSpec`], which is `Copy` and never mutated, so
//! `min <= current <= max` and `min <= default <= max` only need checking on
//! the write path in [`Param::apply`].

use crate::error::{CodecParamError, Result};
use crate::resolve::View;

/// Static description of a parameter: name, initial default and bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Short identifier, compared case-insensitively
    pub name: &'static str,

    /// Initial value of both `current` and `default`
    pub default: i32,

    /// Inclusive lower bound
    pub min: i32,

    /// Inclusive upper bound
    pub max: i32,

    /// When set, writes through the `default:` view leave `default` untouched
    /// and only update `current`
    pub pinned_default: bool,
}

impl ParamSpec {
    pub const fn new(name: &'static str, default: i32, min: i32, max: i32) -> Self {
        ParamSpec {
            name,
            default,
            min,
            max,
            pinned_default: false,
        }
    }

    /// Parameter whose default cannot be changed after process start
    pub const fn pinned(name: &'static str, default: i32, min: i32, max: i32) -> Self {
        ParamSpec {
            name,
            default,
            min,
            max,
            pinned_default: true,
        }
    }

    /// Check whether `value` lies within `[min, max]`
    pub fn contains(&self, value: i64) -> bool {
        value >= self.min as i64 && value <= self.max as i64
    }
}

/// A live parameter cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    spec: ParamSpec,
    current: i32,
    default: i32,
}

impl Param {
    /// Create a cell from its spec, clamping a misdeclared default into range
    pub fn new(spec: ParamSpec) -> Self {
        let initial = spec.default.clamp(spec.min, spec.max.max(spec.min));
        Param {
            spec,
            current: initial,
            default: initial,
        }
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn spec(&self) -> &ParamSpec {
        &self.spec
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn default_value(&self) -> i32 {
        self.default
    }

    pub fn min(&self) -> i32 {
        self.spec.min
    }

    pub fn max(&self) -> i32 {
        self.spec.max
    }

    /// Case-insensitive name comparison
    pub fn is_named(&self, name: &str) -> bool {
        self.spec.name.eq_ignore_ascii_case(name)
    }

    /// Read one of the four values
    pub fn get(&self, view: View) -> i32 {
        match view {
            View::Current => self.current,
            View::Default => self.default,
            View::Min => self.spec.min,
            View::Max => self.spec.max,
        }
    }

    /// Write `value` through `view` and return the post-write value of that view
    ///
    /// Write policy:
    /// - `Min` / `Max` views are read-only
    /// - values outside `[min, max]` are rejected
    /// - `Default` writes both `default` and `current`, except for pinned
    ///   parameters where only `current` changes
    /// - `Current` writes `current`
    pub fn apply(&mut self, view: View, value: i64) -> Result<i32> {
        if view.is_bound() {
            return Err(CodecParamError::ReadOnlyView(self.spec.name.to_string()));
        }
        if !self.spec.contains(value) {
            return Err(CodecParamError::OutOfRange {
                name: self.spec.name.to_string(),
                value,
                min: self.spec.min,
                max: self.spec.max,
            });
        }

        // In range, so the narrowing cannot truncate
        let value = value as i32;
        if view == View::Default && !self.spec.pinned_default {
            self.default = value;
        }
        self.current = value;

        Ok(self.get(view))
    }
}

impl From<ParamSpec> for Param {
    fn from(spec: ParamSpec) -> Self {
        Param::new(spec)
    }
}
