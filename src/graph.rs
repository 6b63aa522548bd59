//! Property graph queries (`GRAPH.*`).
//!
//! Query parameters are sent inline as a `CYPHER name=value ...` prefix of
//! the query text. Replies are decoded from the verbose (non-compact) form.

use crate::command::{ArgList, Command, CommandName, Keyword};
use crate::error::{Error, Result};
use crate::reply;
use crate::resp::RespValue;
use crate::transport::{dispatch, Transport};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal bound to a `$name` placeholder of a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryParam {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<QueryParam>),
}

impl fmt::Display for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryParam::Null => f.write_str("null"),
            QueryParam::Bool(b) => write!(f, "{}", b),
            QueryParam::Int(n) => write!(f, "{}", n),
            // Debug keeps the fractional part, so 1.0 stays a float literal.
            QueryParam::Float(x) => write!(f, "{:?}", x),
            QueryParam::Str(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                f.write_str("\"")
            }
            QueryParam::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl QueryParam {
    /// Whether the value has a Cypher literal; NaN and infinities do not.
    pub fn is_representable(&self) -> bool {
        match self {
            QueryParam::Float(x) => x.is_finite(),
            QueryParam::List(items) => items.iter().all(QueryParam::is_representable),
            _ => true,
        }
    }
}

impl From<bool> for QueryParam {
    fn from(b: bool) -> Self {
        QueryParam::Bool(b)
    }
}

impl From<i64> for QueryParam {
    fn from(n: i64) -> Self {
        QueryParam::Int(n)
    }
}

impl From<f64> for QueryParam {
    fn from(x: f64) -> Self {
        QueryParam::Float(x)
    }
}

impl From<&str> for QueryParam {
    fn from(s: &str) -> Self {
        QueryParam::Str(s.to_string())
    }
}

impl From<String> for QueryParam {
    fn from(s: String) -> Self {
        QueryParam::Str(s)
    }
}

impl<T: Into<QueryParam>> From<Vec<T>> for QueryParam {
    fn from(items: Vec<T>) -> Self {
        QueryParam::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<QueryParam>> From<Option<T>> for QueryParam {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryParam::Null, Into::into)
    }
}

/// Query text with its parameters and an optional server-side timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub text: String,
    pub params: Vec<(String, QueryParam)>,
    pub timeout_ms: Option<u64>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Query {
            text: text.into(),
            params: Vec::new(),
            timeout_ms: None,
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<QueryParam>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    /// Query text as sent, with the `CYPHER` parameter prefix.
    pub fn render(&self) -> Result<String> {
        if self.text.trim().is_empty() {
            return Err(Error::construction("query", "query text is empty"));
        }
        if self.params.is_empty() {
            return Ok(self.text.clone());
        }
        let mut out = String::from(Keyword::Cypher.as_str());
        for (name, value) in &self.params {
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(Error::construction(
                    "params",
                    format!("invalid parameter name {:?}", name),
                ));
            }
            if !value.is_representable() {
                return Err(Error::construction(
                    "params",
                    format!("parameter {:?} is not a finite number", name),
                ));
            }
            out.push(' ');
            out.push_str(name);
            out.push('=');
            out.push_str(&value.to_string());
        }
        out.push(' ');
        out.push_str(&self.text);
        Ok(out)
    }
}

/// One result cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphValue {
    Null,
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<GraphValue>),
}

impl GraphValue {
    fn decode(reply: &RespValue) -> Result<Self> {
        match reply {
            RespValue::Integer(n) => Ok(GraphValue::Integer(*n)),
            RespValue::BulkString(None) | RespValue::Array(None) => Ok(GraphValue::Null),
            RespValue::SimpleString(s) => Ok(GraphValue::String(s.clone())),
            RespValue::BulkString(Some(_)) => {
                let s = reply::as_string(reply)?;
                Ok(match parse_float_literal(&s) {
                    Some(x) => GraphValue::Float(x),
                    None => GraphValue::String(s),
                })
            }
            RespValue::Array(Some(items)) => items
                .iter()
                .map(GraphValue::decode)
                .collect::<Result<Vec<_>>>()
                .map(GraphValue::List),
            RespValue::Error(msg) => Err(Error::Server(msg.clone())),
        }
    }
}

/// Verbose replies carry doubles as bulk text; anything with a fractional
/// part or exponent that parses is treated as one.
fn parse_float_literal(s: &str) -> Option<f64> {
    let looks_float = s.contains(['.', 'e', 'E']) || matches!(s, "inf" | "-inf" | "nan");
    if looks_float && !s.is_empty() && !s.contains(char::is_whitespace) {
        s.parse().ok()
    } else {
        None
    }
}

/// Execution statistics in reply order, e.g. `("Nodes created", 1.0)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryStats {
    pub entries: Vec<(String, f64)>,
}

impl QueryStats {
    fn decode(reply: &RespValue) -> Result<Self> {
        let entries = reply::string_list(reply, "graph statistics")?
            .into_iter()
            .map(|line| {
                let (label, rest) = line
                    .split_once(':')
                    .ok_or_else(|| Error::decode(format!("statistic {:?} has no value", line)))?;
                let number = rest.split_whitespace().next().unwrap_or_default();
                let value = number.parse::<f64>().map_err(|_| {
                    Error::decode(format!("statistic {:?} is not numeric", line))
                })?;
                Ok((label.trim().to_string(), value))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(QueryStats { entries })
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| *v)
    }

    pub fn execution_time_ms(&self) -> Option<f64> {
        self.get("Query internal execution time")
    }
}

/// Decoded result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphResult {
    pub header: Vec<String>,
    pub rows: Vec<Vec<GraphValue>>,
    pub stats: QueryStats,
}

impl GraphResult {
    /// `[stats]` for write-only queries, `[header, rows, stats]` otherwise.
    pub fn decode(reply: &RespValue) -> Result<Self> {
        let parts = reply::expect_array(reply, "GRAPH.QUERY reply")?;
        reply::check_element_errors(parts)?;
        match parts {
            [stats] => Ok(GraphResult {
                stats: QueryStats::decode(stats)?,
                ..GraphResult::default()
            }),
            [header, rows, stats] => Ok(GraphResult {
                header: decode_header(header)?,
                rows: reply::expect_array(rows, "graph rows")?
                    .iter()
                    .map(|row| {
                        reply::expect_array(row, "graph row")?
                            .iter()
                            .map(GraphValue::decode)
                            .collect::<Result<Vec<_>>>()
                    })
                    .collect::<Result<Vec<_>>>()?,
                stats: QueryStats::decode(stats)?,
            }),
            other => Err(Error::decode(format!(
                "GRAPH.QUERY reply must have 1 or 3 sections, got {}",
                other.len()
            ))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Column names; entries are either plain names or `[type, name]` pairs.
fn decode_header(reply: &RespValue) -> Result<Vec<String>> {
    reply::expect_array(reply, "graph header")?
        .iter()
        .map(|column| match column {
            RespValue::Array(Some(pair)) => pair
                .last()
                .map(reply::as_string)
                .unwrap_or_else(|| Err(Error::decode("empty header column"))),
            other => reply::as_string(other),
        })
        .collect()
}

fn query_command(name: CommandName, graph: &str, query: &Query) -> Result<Command> {
    let text = query.render()?;
    let mut args = ArgList::new();
    args.push(graph)
        .push(&text)
        .opt(Keyword::Timeout, query.timeout_ms);
    Ok(args.into_command(name))
}

pub fn query(graph: &str, query: &Query) -> Result<Command> {
    query_command(CommandName::GraphQuery, graph, query)
}

pub fn ro_query(graph: &str, query: &Query) -> Result<Command> {
    query_command(CommandName::GraphRoQuery, graph, query)
}

pub fn delete(graph: &str) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(graph);
    Ok(args.into_command(CommandName::GraphDelete))
}

pub fn list() -> Result<Command> {
    Ok(ArgList::new().into_command(CommandName::GraphList))
}

/// Graph commands over a transport.
#[derive(Debug, Clone)]
pub struct Graph<T> {
    transport: T,
}

impl<T: Transport> Graph<T> {
    pub fn new(transport: T) -> Self {
        Graph { transport }
    }

    pub async fn query(&self, graph: &str, q: &Query) -> Result<GraphResult> {
        GraphResult::decode(&dispatch(&self.transport, query(graph, q)?).await?)
    }

    pub async fn ro_query(&self, graph: &str, q: &Query) -> Result<GraphResult> {
        GraphResult::decode(&dispatch(&self.transport, ro_query(graph, q)?).await?)
    }

    /// Server status message.
    pub async fn delete(&self, graph: &str) -> Result<String> {
        reply::as_string(&dispatch(&self.transport, delete(graph)?).await?)
    }

    pub async fn list(&self) -> Result<Vec<String>> {
        reply::string_list(&dispatch(&self.transport, list()?).await?, "GRAPH.LIST reply")
    }
}
