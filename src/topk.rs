//! Top-K sketch (`TOPK.*`).

use crate::command::{require_non_empty, ArgList, Command, CommandName, Keyword, ToArg};
use crate::error::{Error, Result};
use crate::reply::{self, pairs, UNSET};
use crate::resp::RespValue;
use crate::transport::{dispatch, Transport};
use serde::{Deserialize, Serialize};

/// Sketch geometry of `TOPK.RESERVE`. The three values travel together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReserveParams {
    pub width: Option<u64>,
    pub depth: Option<u64>,
    pub decay: Option<f64>,
}

impl ReserveParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimensions(width: u64, depth: u64, decay: f64) -> Self {
        ReserveParams {
            width: Some(width),
            depth: Some(depth),
            decay: Some(decay),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let given = [
            ("width", self.width.is_some()),
            ("depth", self.depth.is_some()),
            ("decay", self.decay.is_some()),
        ];
        if given.iter().any(|(_, set)| *set) {
            if let Some((param, _)) = given.iter().find(|(_, set)| !*set) {
                return Err(Error::construction(
                    *param,
                    "width, depth and decay must be given together",
                ));
            }
        }
        if let Some(decay) = self.decay {
            if !(decay > 0.0 && decay <= 1.0) {
                return Err(Error::construction(
                    "decay",
                    format!("must be in (0, 1], got {}", decay),
                ));
            }
        }
        Ok(())
    }
}

/// One `TOPK.LIST` entry. `count` is only present with `WITHCOUNT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopKEntry {
    pub item: String,
    pub count: Option<i64>,
}

/// `TOPK.INFO` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopKInfo {
    pub k: i64,
    pub width: i64,
    pub depth: i64,
    pub decay: f64,
}

impl Default for TopKInfo {
    fn default() -> Self {
        TopKInfo {
            k: UNSET,
            width: UNSET,
            depth: UNSET,
            decay: f64::NAN,
        }
    }
}

impl TopKInfo {
    pub fn decode(reply: &RespValue) -> Result<Self> {
        let mut info = TopKInfo::default();
        for (label, value) in pairs(reply, "TOPK.INFO reply")? {
            match label.as_str() {
                "k" => info.k = reply::as_i64_or_unset(value)?,
                "width" => info.width = reply::as_i64_or_unset(value)?,
                "depth" => info.depth = reply::as_i64_or_unset(value)?,
                "decay" => info.decay = reply::as_f64(value)?,
                _ => {}
            }
        }
        Ok(info)
    }
}

pub fn reserve(key: &str, top_k: u64, params: &ReserveParams) -> Result<Command> {
    if top_k == 0 {
        return Err(Error::construction("top_k", "must be positive"));
    }
    params.validate()?;
    let mut args = ArgList::new();
    args.push(key).push(&top_k);
    if let (Some(width), Some(depth), Some(decay)) = (params.width, params.depth, params.decay) {
        args.push(&width).push(&depth).push(&decay);
    }
    Ok(args.into_command(CommandName::TopKReserve))
}

fn with_items<S: ToArg>(name: CommandName, key: &str, items: &[S]) -> Result<Command> {
    require_non_empty("items", items)?;
    let mut args = ArgList::new();
    args.push(key).extend(items);
    Ok(args.into_command(name))
}

pub fn add<S: ToArg>(key: &str, items: &[S]) -> Result<Command> {
    with_items(CommandName::TopKAdd, key, items)
}

/// `TOPK.INCRBY key item increment [item increment ...]`
pub fn incr_by<S: ToArg>(key: &str, increments: &[(S, u64)]) -> Result<Command> {
    require_non_empty("increments", increments)?;
    let mut args = ArgList::new();
    args.push(key);
    for (item, increment) in increments {
        args.push(item).push(increment);
    }
    Ok(args.into_command(CommandName::TopKIncrBy))
}

pub fn query<S: ToArg>(key: &str, items: &[S]) -> Result<Command> {
    with_items(CommandName::TopKQuery, key, items)
}

/// Deprecated by newer servers in favour of `TOPK.QUERY`, still answered.
pub fn count<S: ToArg>(key: &str, items: &[S]) -> Result<Command> {
    with_items(CommandName::TopKCount, key, items)
}

pub fn list(key: &str, with_count: bool) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key).flag(Keyword::WithCount, with_count);
    Ok(args.into_command(CommandName::TopKList))
}

pub fn info(key: &str) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key);
    Ok(args.into_command(CommandName::TopKInfo))
}

/// Item expelled from the sketch by each insertion, `None` when nothing was.
pub fn decode_dropped(reply: &RespValue) -> Result<Vec<Option<String>>> {
    reply::expect_array(reply, "TOPK add reply")?
        .iter()
        .map(reply::as_opt_string)
        .collect()
}

/// Plain item list, or flat `item, count` pairs when `with_count` was sent.
pub fn decode_list(reply: &RespValue, with_count: bool) -> Result<Vec<TopKEntry>> {
    if !with_count {
        return Ok(reply::string_list(reply, "TOPK.LIST reply")?
            .into_iter()
            .map(|item| TopKEntry { item, count: None })
            .collect());
    }
    pairs(reply, "TOPK.LIST WITHCOUNT reply")?
        .into_iter()
        .map(|(item, count)| {
            Ok(TopKEntry {
                item,
                count: Some(reply::as_i64(count)?),
            })
        })
        .collect()
}

/// Top-K commands over a transport.
#[derive(Debug, Clone)]
pub struct TopK<T> {
    transport: T,
}

impl<T: Transport> TopK<T> {
    pub fn new(transport: T) -> Self {
        TopK { transport }
    }

    pub async fn reserve(&self, key: &str, top_k: u64, params: &ReserveParams) -> Result<bool> {
        let reply = dispatch(&self.transport, reserve(key, top_k, params)?).await?;
        Ok(reply::is_ok(&reply))
    }

    pub async fn add<S: ToArg>(&self, key: &str, items: &[S]) -> Result<Vec<Option<String>>> {
        decode_dropped(&dispatch(&self.transport, add(key, items)?).await?)
    }

    pub async fn incr_by<S: ToArg>(
        &self,
        key: &str,
        increments: &[(S, u64)],
    ) -> Result<Vec<Option<String>>> {
        decode_dropped(&dispatch(&self.transport, incr_by(key, increments)?).await?)
    }

    pub async fn query<S: ToArg>(&self, key: &str, items: &[S]) -> Result<Vec<bool>> {
        reply::as_flags(&dispatch(&self.transport, query(key, items)?).await?)
    }

    pub async fn count<S: ToArg>(&self, key: &str, items: &[S]) -> Result<Vec<i64>> {
        let reply = dispatch(&self.transport, count(key, items)?).await?;
        reply::i64_list(&reply, "TOPK.COUNT reply")
    }

    pub async fn list(&self, key: &str, with_count: bool) -> Result<Vec<TopKEntry>> {
        decode_list(&dispatch(&self.transport, list(key, with_count)?).await?, with_count)
    }

    pub async fn info(&self, key: &str) -> Result<TopKInfo> {
        TopKInfo::decode(&dispatch(&self.transport, info(key)?).await?)
    }
}
