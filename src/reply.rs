//! Reply-shape helpers shared by every module decoder.
//!
//! All helpers fail with [`Error::Decode`] when the reply does not have the
//! shape the caller asked for. Error replies never reach these helpers; the
//! dispatch step turns them into [`Error::Server`] first.

use crate::error::{Error, Result};
use crate::resp::RespValue;

/// Value of numeric info fields the server never reported.
pub const UNSET: i64 = -1;

/// `true` for an `OK` status reply.
pub fn is_ok(reply: &RespValue) -> bool {
    match reply {
        RespValue::SimpleString(s) => s == "OK",
        RespValue::BulkString(Some(b)) => b.as_slice() == b"OK",
        _ => false,
    }
}

/// Boolean outcome of a single-item add/exists style command.
pub fn as_bool(reply: &RespValue) -> Result<bool> {
    match reply {
        RespValue::Integer(n) => Ok(*n == 1),
        RespValue::SimpleString(s) => Ok(s == "1"),
        RespValue::BulkString(Some(b)) => Ok(b.as_slice() == b"1"),
        other => Err(Error::decode(format!(
            "expected integer flag, got {}",
            other.kind()
        ))),
    }
}

/// Per-element `1`/not-`1` outcome flags of a variadic command.
pub fn as_flags(reply: &RespValue) -> Result<Vec<bool>> {
    expect_array(reply, "flag list")?.iter().map(as_bool).collect()
}

pub fn as_i64(reply: &RespValue) -> Result<i64> {
    match reply {
        RespValue::Integer(n) => Ok(*n),
        RespValue::SimpleString(_) | RespValue::BulkString(Some(_)) => {
            let s = as_string(reply)?;
            s.parse::<i64>()
                .map_err(|_| Error::decode(format!("expected integer, got {:?}", s)))
        }
        other => Err(Error::decode(format!("expected integer, got {}", other.kind()))),
    }
}

/// Floating point value; accepts integers and textual doubles including
/// `inf`, `-inf` and `nan`.
pub fn as_f64(reply: &RespValue) -> Result<f64> {
    match reply {
        RespValue::Integer(n) => Ok(*n as f64),
        RespValue::SimpleString(_) | RespValue::BulkString(Some(_)) => {
            let s = as_string(reply)?;
            s.trim()
                .parse::<f64>()
                .map_err(|_| Error::decode(format!("expected double, got {:?}", s)))
        }
        other => Err(Error::decode(format!("expected double, got {}", other.kind()))),
    }
}

/// Integer info field; nil reads as [`UNSET`].
pub fn as_i64_or_unset(reply: &RespValue) -> Result<i64> {
    if reply.is_nil() {
        Ok(UNSET)
    } else {
        as_i64(reply)
    }
}

pub fn as_string(reply: &RespValue) -> Result<String> {
    match reply {
        RespValue::SimpleString(s) => Ok(s.clone()),
        RespValue::BulkString(Some(b)) => Ok(String::from_utf8_lossy(b).into_owned()),
        RespValue::Integer(n) => Ok(n.to_string()),
        other => Err(Error::decode(format!("expected string, got {}", other.kind()))),
    }
}

/// String or nil.
pub fn as_opt_string(reply: &RespValue) -> Result<Option<String>> {
    if reply.is_nil() {
        Ok(None)
    } else {
        as_string(reply).map(Some)
    }
}

/// Array elements, `None` for a nil array. An empty array is `Some(&[])`.
pub fn as_opt_array(reply: &RespValue) -> Result<Option<&[RespValue]>> {
    match reply {
        RespValue::Array(Some(items)) => Ok(Some(items)),
        RespValue::Array(None) | RespValue::BulkString(None) => Ok(None),
        other => Err(Error::decode(format!("expected array, got {}", other.kind()))),
    }
}

pub fn expect_array<'a>(reply: &'a RespValue, what: &str) -> Result<&'a [RespValue]> {
    match reply {
        RespValue::Array(Some(items)) => Ok(items),
        other => Err(Error::decode(format!(
            "expected array for {}, got {}",
            what,
            other.kind()
        ))),
    }
}

/// Array of exactly `n` elements.
pub fn expect_arity<'a>(reply: &'a RespValue, n: usize, what: &str) -> Result<&'a [RespValue]> {
    let items = expect_array(reply, what)?;
    if items.len() != n {
        return Err(Error::decode(format!(
            "{} must have {} elements, got {}",
            what,
            n,
            items.len()
        )));
    }
    Ok(items)
}

/// Flat alternating `label, value, label, value...` sequence.
pub fn pairs<'a>(reply: &'a RespValue, what: &str) -> Result<Vec<(String, &'a RespValue)>> {
    let items = expect_array(reply, what)?;
    if items.len() % 2 != 0 {
        return Err(Error::decode(format!(
            "{} has odd element count {}",
            what,
            items.len()
        )));
    }
    items
        .chunks_exact(2)
        .map(|pair| Ok((as_string(&pair[0])?, &pair[1])))
        .collect()
}

pub fn string_list(reply: &RespValue, what: &str) -> Result<Vec<String>> {
    expect_array(reply, what)?.iter().map(as_string).collect()
}

pub fn i64_list(reply: &RespValue, what: &str) -> Result<Vec<i64>> {
    expect_array(reply, what)?.iter().map(as_i64).collect()
}

pub fn f64_list(reply: &RespValue, what: &str) -> Result<Vec<f64>> {
    expect_array(reply, what)?.iter().map(as_f64).collect()
}

/// Surface the first per-element error reply inside an array.
pub fn check_element_errors(items: &[RespValue]) -> Result<()> {
    match items.iter().find_map(|item| match item {
        RespValue::Error(msg) => Some(msg),
        _ => None,
    }) {
        Some(msg) => Err(Error::Server(msg.clone())),
        None => Ok(()),
    }
}
