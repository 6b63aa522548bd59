//! RESP2 frame type, parser and encoder.
//!
//! Replies from the server arrive as a recursively nested `RespValue`; every
//! decoder in this crate works on that shape. Commands leave the client as a
//! RESP array of bulk strings built by [`Command::to_resp`](crate::command::Command::to_resp).

use crate::error::{Error, Result};
use bytes::{Buf, BytesMut};

#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(Option<Vec<u8>>),
    Array(Option<Vec<RespValue>>),
}

impl RespValue {
    #[inline]
    pub fn simple(s: &str) -> Self {
        RespValue::SimpleString(s.to_string())
    }

    #[inline]
    pub fn ok() -> Self {
        RespValue::SimpleString("OK".to_string())
    }

    #[inline]
    pub fn bulk(s: impl AsRef<[u8]>) -> Self {
        RespValue::BulkString(Some(s.as_ref().to_vec()))
    }

    #[inline]
    pub fn array(elements: Vec<RespValue>) -> Self {
        RespValue::Array(Some(elements))
    }

    #[inline]
    pub fn nil() -> Self {
        RespValue::BulkString(None)
    }

    #[inline]
    pub fn empty_array() -> Self {
        RespValue::Array(Some(Vec::new()))
    }

    /// Null bulk string or null array.
    pub fn is_nil(&self) -> bool {
        matches!(self, RespValue::BulkString(None) | RespValue::Array(None))
    }

    /// Short shape name used in decode error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RespValue::SimpleString(_) => "simple string",
            RespValue::Error(_) => "error",
            RespValue::Integer(_) => "integer",
            RespValue::BulkString(None) => "nil",
            RespValue::BulkString(Some(_)) => "bulk string",
            RespValue::Array(None) => "nil array",
            RespValue::Array(Some(_)) => "array",
        }
    }
}

pub struct RespParser;

impl RespParser {
    /// Parse one frame from the front of `input`.
    ///
    /// Returns `Ok(None)` when `input` holds an incomplete frame, otherwise
    /// the value and the number of bytes it occupied.
    pub fn parse(input: &[u8]) -> Result<Option<(RespValue, usize)>> {
        if input.is_empty() {
            return Ok(None);
        }

        match input[0] {
            b'+' => Ok(Self::parse_line(input)?
                .map(|(s, used)| (RespValue::SimpleString(s), used))),
            b'-' => Ok(Self::parse_line(input)?.map(|(s, used)| (RespValue::Error(s), used))),
            b':' => Self::parse_integer(input),
            b'$' => Self::parse_bulk_string(input),
            b'*' => Self::parse_array(input),
            other => Err(Error::Protocol(format!(
                "unknown RESP type byte: {:?}",
                other as char
            ))),
        }
    }

    /// Parse one frame out of `buf`, consuming it on success.
    pub fn decode(buf: &mut BytesMut) -> Result<Option<RespValue>> {
        match Self::parse(&buf[..])? {
            Some((value, consumed)) => {
                buf.advance(consumed);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn parse_line(input: &[u8]) -> Result<Option<(String, usize)>> {
        match Self::find_crlf(input) {
            Some(pos) => {
                let s = String::from_utf8_lossy(&input[1..pos]).to_string();
                Ok(Some((s, pos + 2)))
            }
            None => Ok(None),
        }
    }

    fn parse_length(input: &[u8], pos: usize) -> Result<i64> {
        let s = std::str::from_utf8(&input[1..pos])
            .map_err(|e| Error::Protocol(e.to_string()))?;
        s.parse::<i64>()
            .map_err(|e| Error::Protocol(format!("invalid length {:?}: {}", s, e)))
    }

    fn parse_integer(input: &[u8]) -> Result<Option<(RespValue, usize)>> {
        match Self::find_crlf(input) {
            Some(pos) => {
                let n = Self::parse_length(input, pos)?;
                Ok(Some((RespValue::Integer(n), pos + 2)))
            }
            None => Ok(None),
        }
    }

    fn parse_bulk_string(input: &[u8]) -> Result<Option<(RespValue, usize)>> {
        let Some(pos) = Self::find_crlf(input) else {
            return Ok(None);
        };
        let len = Self::parse_length(input, pos)?;
        if len == -1 {
            return Ok(Some((RespValue::BulkString(None), pos + 2)));
        }
        if len < 0 {
            return Err(Error::Protocol(format!("negative bulk length {}", len)));
        }

        let start = pos + 2;
        let end = usize::try_from(len)
            .ok()
            .and_then(|len| start.checked_add(len))
            .filter(|end| end.checked_add(2).is_some())
            .ok_or_else(|| Error::Protocol(format!("bulk length {} out of range", len)))?;
        if end + 2 > input.len() {
            return Ok(None);
        }
        if &input[end..end + 2] != b"\r\n" {
            return Err(Error::Protocol("bulk string not terminated by CRLF".to_string()));
        }

        Ok(Some((
            RespValue::BulkString(Some(input[start..end].to_vec())),
            end + 2,
        )))
    }

    fn parse_array(input: &[u8]) -> Result<Option<(RespValue, usize)>> {
        let Some(pos) = Self::find_crlf(input) else {
            return Ok(None);
        };
        let len = Self::parse_length(input, pos)?;
        if len == -1 {
            return Ok(Some((RespValue::Array(None), pos + 2)));
        }
        if len < 0 {
            return Err(Error::Protocol(format!("negative array length {}", len)));
        }

        let mut offset = pos + 2;
        // Every element takes at least one byte, so the buffered input bounds
        // the pre-allocation whatever the header claims.
        let hint = usize::try_from(len).unwrap_or(usize::MAX);
        let mut elements = Vec::with_capacity(hint.min(input.len() - offset));
        for _ in 0..len {
            match Self::parse(&input[offset..])? {
                Some((value, consumed)) => {
                    elements.push(value);
                    offset += consumed;
                }
                None => return Ok(None),
            }
        }

        Ok(Some((RespValue::Array(Some(elements)), offset)))
    }

    fn find_crlf(input: &[u8]) -> Option<usize> {
        memchr::memchr_iter(b'\r', input).find(|&i| input.get(i + 1) == Some(&b'\n'))
    }

    pub fn encode(value: &RespValue) -> Vec<u8> {
        let mut out = BytesMut::new();
        Self::encode_into(value, &mut out);
        out.to_vec()
    }

    pub fn encode_into(value: &RespValue, out: &mut BytesMut) {
        match value {
            RespValue::SimpleString(s) => out.extend_from_slice(format!("+{}\r\n", s).as_bytes()),
            RespValue::Error(s) => out.extend_from_slice(format!("-{}\r\n", s).as_bytes()),
            RespValue::Integer(n) => out.extend_from_slice(format!(":{}\r\n", n).as_bytes()),
            RespValue::BulkString(None) => out.extend_from_slice(b"$-1\r\n"),
            RespValue::BulkString(Some(data)) => {
                out.extend_from_slice(format!("${}\r\n", data.len()).as_bytes());
                out.extend_from_slice(data);
                out.extend_from_slice(b"\r\n");
            }
            RespValue::Array(None) => out.extend_from_slice(b"*-1\r\n"),
            RespValue::Array(Some(elements)) => {
                out.extend_from_slice(format!("*{}\r\n", elements.len()).as_bytes());
                for element in elements {
                    Self::encode_into(element, out);
                }
            }
        }
    }
}
