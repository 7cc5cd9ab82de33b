//! Name resolution
//!
//! Every surface (programmatic, SQL, URI) names parameters the same way:
//!
//! ```text
//! [default:][min:][max:]name   common scope parameter
//! cipherName                   cipher scope (no prefix allowed)
//! ```
//!
//! Prefixes are matched case-insensitively, in that order, each at most once.
//! They select a [`View`] of the cell instead of the cell itself.

use crate::registry::Registry;

/// Which of the four cell values a name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Current,
    Default,
    Min,
    Max,
}

impl View {
    /// `Min` and `Max` are fixed by the schema
    pub fn is_bound(self) -> bool {
        matches!(self, View::Min | View::Max)
    }

    /// Name prefix selecting this view
    pub fn prefix(self) -> &'static str {
        match self {
            View::Current => "",
            View::Default => "default:",
            View::Min => "min:",
            View::Max => "max:",
        }
    }
}

/// Strip a case-insensitive ASCII prefix
fn strip_prefix_ci<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let head = name.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&name[prefix.len()..])
    } else {
        None
    }
}

/// Split a user-supplied name into its view and bare parameter name
///
/// Returns whether any prefix was present as the third element. When more
/// than one prefix is given the bound views win (`min` over `max` over
/// `default`), keeping the name read-only.
pub fn split_view(name: &str) -> (View, &str, bool) {
    let mut rest = name;
    let mut has_default = false;
    let mut has_min = false;
    let mut has_max = false;

    if let Some(tail) = strip_prefix_ci(rest, View::Default.prefix()) {
        has_default = true;
        rest = tail;
    }
    if let Some(tail) = strip_prefix_ci(rest, View::Min.prefix()) {
        has_min = true;
        rest = tail;
    }
    if let Some(tail) = strip_prefix_ci(rest, View::Max.prefix()) {
        has_max = true;
        rest = tail;
    }

    let view = if has_min {
        View::Min
    } else if has_max {
        View::Max
    } else if has_default {
        View::Default
    } else {
        View::Current
    };

    (view, rest, has_default || has_min || has_max)
}

/// Outcome of resolving a name against a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// Cell `index` of the common schema, seen through `view`
    Common { index: usize, view: View },

    /// Cipher scope `index` (0-based position in the descriptor list)
    Cipher { index: usize },
}

/// Resolve a name: common parameters first, then cipher scopes
///
/// A prefixed name never resolves to a cipher scope.
pub fn resolve(registry: &Registry, name: &str) -> Option<Resolved> {
    let (view, bare, prefixed) = split_view(name);

    if let Some(index) = registry.common().position(bare) {
        return Some(Resolved::Common { index, view });
    }
    if prefixed {
        return None;
    }

    registry
        .cipher_position(bare)
        .map(|index| Resolved::Cipher { index })
}
