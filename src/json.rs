//! JSON document store (`JSON.*`).
//!
//! Documents travel as JSON text and are exposed as [`serde_json::Value`].
//! Paths starting with `$` select many nodes and get array replies; legacy
//! dotted paths get a single scalar. Decoders here accept both.

use crate::command::{require_non_empty, ArgList, Command, CommandName, Keyword};
use crate::error::{Error, Result};
use crate::reply;
use crate::resp::RespValue;
use crate::transport::{dispatch, Transport};
use serde_json::Value;

/// Root path.
pub const ROOT: &str = "$";

/// Write condition of `JSON.SET`. One enum so both cannot be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetCondition {
    /// Only create the path.
    Nx,
    /// Only overwrite an existing path.
    Xx,
}

impl SetCondition {
    fn keyword(&self) -> Keyword {
        match self {
            SetCondition::Nx => Keyword::Nx,
            SetCondition::Xx => Keyword::Xx,
        }
    }
}

/// Formatting and path options of `JSON.GET`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetParams {
    pub indent: Option<String>,
    pub newline: Option<String>,
    pub space: Option<String>,
    pub paths: Vec<String>,
}

impl GetParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indent(mut self, s: impl Into<String>) -> Self {
        self.indent = Some(s.into());
        self
    }

    pub fn newline(mut self, s: impl Into<String>) -> Self {
        self.newline = Some(s.into());
        self
    }

    pub fn space(mut self, s: impl Into<String>) -> Self {
        self.space = Some(s.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }
}

fn parse_document(text: &str) -> Result<Value> {
    serde_json::from_str(text)
        .map_err(|e| Error::decode(format!("reply is not valid JSON: {}", e)))
}

pub fn set(key: &str, path: &str, value: &Value, condition: Option<SetCondition>) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key).push(path).push(&value.to_string());
    if let Some(condition) = condition {
        args.keyword(condition.keyword());
    }
    Ok(args.into_command(CommandName::JsonSet))
}

/// `JSON.GET key [INDENT s] [NEWLINE s] [SPACE s] [path ...]`
pub fn get(key: &str, params: &GetParams) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key)
        .opt(Keyword::Indent, params.indent.as_deref())
        .opt(Keyword::Newline, params.newline.as_deref())
        .opt(Keyword::Space, params.space.as_deref())
        .extend(&params.paths);
    Ok(args.into_command(CommandName::JsonGet))
}

pub fn mget<S: AsRef<str>>(keys: &[S], path: &str) -> Result<Command> {
    require_non_empty("keys", keys)?;
    let mut args = ArgList::new();
    for key in keys {
        args.push(key.as_ref());
    }
    args.push(path);
    Ok(args.into_command(CommandName::JsonMGet))
}

pub fn del(key: &str, path: Option<&str>) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key);
    if let Some(path) = path {
        args.push(path);
    }
    Ok(args.into_command(CommandName::JsonDel))
}

pub fn json_type(key: &str, path: Option<&str>) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key);
    if let Some(path) = path {
        args.push(path);
    }
    Ok(args.into_command(CommandName::JsonType))
}

pub fn arr_append(key: &str, path: &str, values: &[Value]) -> Result<Command> {
    require_non_empty("values", values)?;
    let mut args = ArgList::new();
    args.push(key).push(path);
    for value in values {
        args.push(&value.to_string());
    }
    Ok(args.into_command(CommandName::JsonArrAppend))
}

/// `JSON.ARRINDEX key path value [start [stop]]`
pub fn arr_index(
    key: &str,
    path: &str,
    value: &Value,
    start: Option<i64>,
    stop: Option<i64>,
) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key).push(path).push(&value.to_string());
    match (start, stop) {
        (None, Some(_)) => {
            return Err(Error::construction("stop", "requires start"));
        }
        (Some(start), stop) => {
            args.push(&start);
            if let Some(stop) = stop {
                args.push(&stop);
            }
        }
        (None, None) => {}
    }
    Ok(args.into_command(CommandName::JsonArrIndex))
}

pub fn num_incr_by(key: &str, path: &str, by: f64) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key).push(path).push(&by);
    Ok(args.into_command(CommandName::JsonNumIncrBy))
}

/// JSON text reply, nil for a missing key.
pub fn decode_document(reply: &RespValue) -> Result<Option<Value>> {
    reply::as_opt_string(reply)?
        .map(|text| parse_document(&text))
        .transpose()
}

/// Integer reply of a legacy path or per-match integers of a `$` path.
/// Non-matching nodes come back nil.
pub fn decode_int_per_path(reply: &RespValue) -> Result<Vec<Option<i64>>> {
    match reply {
        RespValue::Array(Some(items)) => items
            .iter()
            .map(|item| {
                if item.is_nil() {
                    Ok(None)
                } else {
                    reply::as_i64(item).map(Some)
                }
            })
            .collect(),
        single => Ok(vec![Some(reply::as_i64(single)?)]),
    }
}

/// Type names, one per matched node. Nil (missing key) is empty.
pub fn decode_types(reply: &RespValue) -> Result<Vec<String>> {
    match reply {
        RespValue::Array(Some(items)) => items
            .iter()
            .filter(|item| !item.is_nil())
            .map(|item| match item {
                // RESP3-style servers nest one more level.
                RespValue::Array(Some(inner)) => inner
                    .first()
                    .map(reply::as_string)
                    .unwrap_or_else(|| Err(Error::decode("empty type entry"))),
                other => reply::as_string(other),
            })
            .collect(),
        single if single.is_nil() => Ok(Vec::new()),
        single => Ok(vec![reply::as_string(single)?]),
    }
}

/// JSON document commands over a transport.
#[derive(Debug, Clone)]
pub struct Json<T> {
    transport: T,
}

impl<T: Transport> Json<T> {
    pub fn new(transport: T) -> Self {
        Json { transport }
    }

    /// `false` when an `NX`/`XX` condition prevented the write.
    pub async fn set(
        &self,
        key: &str,
        path: &str,
        value: &Value,
        condition: Option<SetCondition>,
    ) -> Result<bool> {
        let reply = dispatch(&self.transport, set(key, path, value, condition)?).await?;
        Ok(reply::is_ok(&reply))
    }

    pub async fn get(&self, key: &str, params: &GetParams) -> Result<Option<Value>> {
        decode_document(&dispatch(&self.transport, get(key, params)?).await?)
    }

    pub async fn mget<S: AsRef<str>>(&self, keys: &[S], path: &str) -> Result<Vec<Option<Value>>> {
        let reply = dispatch(&self.transport, mget(keys, path)?).await?;
        reply::expect_array(&reply, "JSON.MGET reply")?
            .iter()
            .map(decode_document)
            .collect()
    }

    /// Number of paths deleted.
    pub async fn del(&self, key: &str, path: Option<&str>) -> Result<i64> {
        reply::as_i64(&dispatch(&self.transport, del(key, path)?).await?)
    }

    pub async fn json_type(&self, key: &str, path: Option<&str>) -> Result<Vec<String>> {
        decode_types(&dispatch(&self.transport, json_type(key, path)?).await?)
    }

    /// New array length per matched path.
    pub async fn arr_append(&self, key: &str, path: &str, values: &[Value]) -> Result<Vec<Option<i64>>> {
        decode_int_per_path(&dispatch(&self.transport, arr_append(key, path, values)?).await?)
    }

    /// Position of `value` per matched path, `-1` when absent.
    pub async fn arr_index(
        &self,
        key: &str,
        path: &str,
        value: &Value,
        start: Option<i64>,
        stop: Option<i64>,
    ) -> Result<Vec<Option<i64>>> {
        let command = arr_index(key, path, value, start, stop)?;
        decode_int_per_path(&dispatch(&self.transport, command).await?)
    }

    /// New value; an array of values for `$` paths.
    pub async fn num_incr_by(&self, key: &str, path: &str, by: f64) -> Result<Value> {
        let reply = dispatch(&self.transport, num_incr_by(key, path, by)?).await?;
        parse_document(&reply::as_string(&reply)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ScriptedTransport;
    use serde_json::json;

    #[test]
    fn test_set_serializes_value() {
        let cmd = set("doc", ROOT, &json!({"a": [1, 2]}), Some(SetCondition::Nx)).unwrap();
        assert_eq!(cmd.tokens(), vec!["JSON.SET", "doc", "$", r#"{"a":[1,2]}"#, "NX"]);
    }

    #[test]
    fn test_get_formatting_before_paths() {
        let params = GetParams::new().path("$.a").indent("\t").path("$.b");
        assert_eq!(
            get("doc", &params).unwrap().tokens(),
            vec!["JSON.GET", "doc", "INDENT", "\t", "$.a", "$.b"]
        );
    }

    #[test]
    fn test_arr_index_stop_requires_start() {
        assert_eq!(
            arr_index("doc", "$.a", &json!(3), None, Some(4)).unwrap_err().param(),
            Some("stop")
        );
        assert_eq!(
            arr_index("doc", "$.a", &json!("x"), Some(1), Some(4)).unwrap().tokens(),
            vec!["JSON.ARRINDEX", "doc", "$.a", "\"x\"", "1", "4"]
        );
    }

    #[test]
    fn test_mget_requires_keys() {
        let none: [&str; 0] = [];
        assert_eq!(mget(&none, "$").unwrap_err().param(), Some("keys"));
        assert_eq!(
            mget(&["a", "b"], "$.x").unwrap().tokens(),
            vec!["JSON.MGET", "a", "b", "$.x"]
        );
    }

    #[test]
    fn test_decode_shapes() {
        assert_eq!(decode_document(&RespValue::nil()).unwrap(), None);
        assert!(decode_document(&RespValue::bulk("{oops")).unwrap_err().is_decode());
        assert_eq!(
            decode_int_per_path(&RespValue::array(vec![
                RespValue::Integer(3),
                RespValue::nil()
            ]))
            .unwrap(),
            vec![Some(3), None]
        );
        assert_eq!(decode_int_per_path(&RespValue::Integer(2)).unwrap(), vec![Some(2)]);
        assert_eq!(
            decode_types(&RespValue::array(vec![RespValue::bulk("object")])).unwrap(),
            vec!["object".to_string()]
        );
        assert!(decode_types(&RespValue::nil()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_condition_failed_is_false() {
        let json = Json::new(ScriptedTransport::with_replies(vec![RespValue::nil()]));
        assert!(!json.set("doc", ROOT, &json!(1), Some(SetCondition::Xx)).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_document() {
        let json = Json::new(ScriptedTransport::with_replies(vec![RespValue::bulk(
            r#"[{"name":"x"}]"#,
        )]));
        let doc = json.get("doc", &GetParams::new().path("$")).await.unwrap();
        assert_eq!(doc, Some(json!([{"name": "x"}])));
    }
}
