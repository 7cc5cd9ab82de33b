//! SQL surface of the registry
//!
//! `sqlite3mc_config` takes one to three arguments:
//!
//! | Arguments | Result |
//! |---|---|
//! | `(common)` | value of the view; the cipher name for `cipher` |
//! | `(cipher)` | comma-separated parameter names of the cipher |
//! | `(common, int)` | writes and returns the view value |
//! | `('cipher', text)` | selects a cipher by name and returns it |
//! | `(cipher, param)` | value of the view of a cipher parameter |
//! | `(cipher, param, int)` | writes and returns the view value |
//!
//! Anything that does not fit, including writes through `min:` / `max:`,
//! yields NULL. The two-argument cipher form never writes.
//!
//! `sqlite3mc_codec_data(name [, schema])` returns the write salt of an
//! encrypted schema as hex text (`cipher_salt`) or as a blob
//! (`raw:cipher_salt`).

use crate::cipher::CIPHER_PARAM;
use crate::codec::{self, SaltFormat};
use crate::connection::{schema_index, CodecParams};
use crate::error::Result;
use crate::registry::Registry;
use crate::resolve::{resolve, split_view, Resolved, View};
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::{Value, ValueRef};
use rusqlite::Connection;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

pub const CONFIG_FUNCTION: &str = "sqlite3mc_config";
pub const CODEC_DATA_FUNCTION: &str = "sqlite3mc_codec_data";

/// Install `sqlite3mc_config` and `sqlite3mc_codec_data` bound to `params`
pub(crate) fn register_functions(conn: &Connection, params: &Arc<CodecParams>) -> Result<()> {
    for n_arg in 1..=3 {
        let state = AssertUnwindSafe(Arc::clone(params));
        conn.create_scalar_function(CONFIG_FUNCTION, n_arg, FunctionFlags::SQLITE_UTF8, move |ctx| {
            Ok(config_function(&state, ctx))
        })?;
    }
    for n_arg in 1..=2 {
        let state = AssertUnwindSafe(Arc::clone(params));
        conn.create_scalar_function(
            CODEC_DATA_FUNCTION,
            n_arg,
            FunctionFlags::SQLITE_UTF8,
            move |ctx| Ok(codec_data_function(&state, ctx)),
        )?;
    }
    Ok(())
}

fn text_arg<'a>(value: ValueRef<'a>) -> Option<&'a str> {
    match value {
        ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok(),
        _ => None,
    }
}

fn int_arg(value: ValueRef<'_>) -> Option<i64> {
    match value {
        ValueRef::Integer(v) => Some(v),
        _ => None,
    }
}

/// NULL in either of the first two arguments short-circuits both functions
fn has_null_names(ctx: &Context<'_>) -> bool {
    ctx.get_raw(0) == ValueRef::Null || (ctx.len() > 1 && ctx.get_raw(1) == ValueRef::Null)
}

fn config_function(params: &CodecParams, ctx: &Context<'_>) -> Value {
    if has_null_names(ctx) {
        return Value::Null;
    }
    let Some(name) = text_arg(ctx.get_raw(0)) else {
        return Value::Null;
    };

    let mut registry = params.lock();
    let result = match resolve(&registry, name) {
        Some(Resolved::Common { index, view }) => common_call(&mut registry, index, view, ctx),
        Some(Resolved::Cipher { index }) => cipher_call(params, &mut registry, index, ctx),
        None => None,
    };
    result.unwrap_or(Value::Null)
}

fn common_call(
    registry: &mut Registry,
    index: usize,
    view: View,
    ctx: &Context<'_>,
) -> Option<Value> {
    let param = registry.common().get(index)?;
    let is_cipher = param.is_named(CIPHER_PARAM);

    match ctx.len() {
        1 => {
            let value = param.get(view);
            if is_cipher {
                registry
                    .cipher_name(value)
                    .map(|name| Value::Text(name.to_string()))
            } else {
                Some(Value::Integer(value as i64))
            }
        }
        2 if !view.is_bound() => {
            let arg = ctx.get_raw(1);
            if is_cipher {
                let name = text_arg(arg)?;
                let selected = registry.select_cipher(name, view).ok()?;
                Some(Value::Text(selected.to_string()))
            } else {
                let value = int_arg(arg)?;
                let param = registry.common_mut().get_mut(index)?;
                param
                    .apply(view, value)
                    .ok()
                    .map(|v| Value::Integer(v as i64))
            }
        }
        _ => None,
    }
}

fn cipher_call(
    params: &CodecParams,
    registry: &mut Registry,
    position: usize,
    ctx: &Context<'_>,
) -> Option<Value> {
    if ctx.len() == 1 {
        return registry.param_list(position).map(Value::Text);
    }

    let cipher = registry.cipher_name_at(position)?;
    let param_name = text_arg(ctx.get_raw(1))?;
    let (view, bare, _) = split_view(param_name);

    if ctx.len() == 2 {
        let param = registry.cipher_at(position)?.find(bare)?;
        return Some(Value::Integer(param.get(view) as i64));
    }

    if view.is_bound() {
        return None;
    }
    let value = int_arg(ctx.get_raw(2))?;
    if value < 0 {
        return None;
    }
    registry
        .config_cipher(cipher, param_name, value, Some(params.legacy()))
        .ok()
        .map(|v| Value::Integer(v as i64))
}

fn codec_data_function(params: &CodecParams, ctx: &Context<'_>) -> Value {
    if has_null_names(ctx) {
        return Value::Null;
    }
    codec_data_value(params, ctx).unwrap_or(Value::Null)
}

fn codec_data_value(params: &CodecParams, ctx: &Context<'_>) -> Option<Value> {
    let name = text_arg(ctx.get_raw(0))?;
    let format = codec::parse_codec_data_name(name)?;
    let schema = if ctx.len() > 1 {
        text_arg(ctx.get_raw(1))?
    } else {
        "main"
    };

    // Re-entrant use of the calling connection, only for PRAGMA database_list
    let conn = unsafe { ctx.get_connection() }.ok()?;
    let index = schema_index(&conn, schema)?;
    let found = params.codecs()?.codec(index)?;
    let salt = codec::write_salt(found.as_ref())?;

    Some(match format {
        SaltFormat::Hex => Value::Text(params.hex_case().encode(&salt)),
        SaltFormat::Raw => Value::Blob(salt.to_vec()),
    })
}
