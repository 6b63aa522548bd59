//! Count-Min sketch (`CMS.*`).

use crate::command::{require_non_empty, ArgList, Command, CommandName, Keyword, ToArg};
use crate::error::{Error, Result};
use crate::reply::{self, pairs, UNSET};
use crate::resp::RespValue;
use crate::transport::{dispatch, Transport};
use serde::{Deserialize, Serialize};

/// `CMS.INFO` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmsInfo {
    pub width: i64,
    pub depth: i64,
    pub count: i64,
}

impl Default for CmsInfo {
    fn default() -> Self {
        CmsInfo {
            width: UNSET,
            depth: UNSET,
            count: UNSET,
        }
    }
}

impl CmsInfo {
    pub fn decode(reply: &RespValue) -> Result<Self> {
        let mut info = CmsInfo::default();
        for (label, value) in pairs(reply, "CMS.INFO reply")? {
            match label.as_str() {
                "width" => info.width = reply::as_i64_or_unset(value)?,
                "depth" => info.depth = reply::as_i64_or_unset(value)?,
                "count" => info.count = reply::as_i64_or_unset(value)?,
                _ => {}
            }
        }
        Ok(info)
    }
}

fn check_fraction(param: &'static str, value: f64) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(Error::construction(
            param,
            format!("must be strictly between 0 and 1, got {}", value),
        ));
    }
    Ok(())
}

pub fn init_by_dim(key: &str, width: u64, depth: u64) -> Result<Command> {
    if width == 0 {
        return Err(Error::construction("width", "must be positive"));
    }
    if depth == 0 {
        return Err(Error::construction("depth", "must be positive"));
    }
    let mut args = ArgList::new();
    args.push(key).push(&width).push(&depth);
    Ok(args.into_command(CommandName::CmsInitByDim))
}

pub fn init_by_prob(key: &str, error: f64, probability: f64) -> Result<Command> {
    check_fraction("error", error)?;
    check_fraction("probability", probability)?;
    let mut args = ArgList::new();
    args.push(key).push(&error).push(&probability);
    Ok(args.into_command(CommandName::CmsInitByProb))
}

/// `CMS.INCRBY key item increment [item increment ...]`
pub fn incr_by<S: ToArg>(key: &str, increments: &[(S, u64)]) -> Result<Command> {
    require_non_empty("increments", increments)?;
    let mut args = ArgList::new();
    args.push(key);
    for (item, increment) in increments {
        args.push(item).push(increment);
    }
    Ok(args.into_command(CommandName::CmsIncrBy))
}

pub fn query<S: ToArg>(key: &str, items: &[S]) -> Result<Command> {
    require_non_empty("items", items)?;
    let mut args = ArgList::new();
    args.push(key).extend(items);
    Ok(args.into_command(CommandName::CmsQuery))
}

/// `CMS.MERGE dest numKeys src... [WEIGHTS w...]`
pub fn merge<S: AsRef<str>>(dest: &str, sources: &[S], weights: Option<&[i64]>) -> Result<Command> {
    require_non_empty("sources", sources)?;
    let mut args = ArgList::new();
    args.push(dest).push(&sources.len());
    for source in sources {
        args.push(source.as_ref());
    }
    if let Some(weights) = weights {
        if weights.len() != sources.len() {
            return Err(Error::construction(
                "weights",
                format!(
                    "{} weights given for {} sources",
                    weights.len(),
                    sources.len()
                ),
            ));
        }
        args.keyword(Keyword::Weights).extend(weights);
    }
    Ok(args.into_command(CommandName::CmsMerge))
}

pub fn info(key: &str) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key);
    Ok(args.into_command(CommandName::CmsInfo))
}

/// Count-Min sketch commands over a transport.
#[derive(Debug, Clone)]
pub struct CountMinSketch<T> {
    transport: T,
}

impl<T: Transport> CountMinSketch<T> {
    pub fn new(transport: T) -> Self {
        CountMinSketch { transport }
    }

    pub async fn init_by_dim(&self, key: &str, width: u64, depth: u64) -> Result<bool> {
        let reply = dispatch(&self.transport, init_by_dim(key, width, depth)?).await?;
        Ok(reply::is_ok(&reply))
    }

    pub async fn init_by_prob(&self, key: &str, error: f64, probability: f64) -> Result<bool> {
        let reply = dispatch(&self.transport, init_by_prob(key, error, probability)?).await?;
        Ok(reply::is_ok(&reply))
    }

    /// Estimated count of each item after the increment.
    pub async fn incr_by<S: ToArg>(&self, key: &str, increments: &[(S, u64)]) -> Result<Vec<i64>> {
        let reply = dispatch(&self.transport, incr_by(key, increments)?).await?;
        let counts = reply::expect_array(&reply, "CMS.INCRBY reply")?;
        reply::check_element_errors(counts)?;
        counts.iter().map(reply::as_i64).collect()
    }

    pub async fn query<S: ToArg>(&self, key: &str, items: &[S]) -> Result<Vec<i64>> {
        let reply = dispatch(&self.transport, query(key, items)?).await?;
        reply::i64_list(&reply, "CMS.QUERY reply")
    }

    pub async fn merge<S: AsRef<str>>(
        &self,
        dest: &str,
        sources: &[S],
        weights: Option<&[i64]>,
    ) -> Result<bool> {
        let reply = dispatch(&self.transport, merge(dest, sources, weights)?).await?;
        Ok(reply::is_ok(&reply))
    }

    pub async fn info(&self, key: &str) -> Result<CmsInfo> {
        CmsInfo::decode(&dispatch(&self.transport, info(key)?).await?)
    }
}
