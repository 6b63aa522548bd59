//! t-digest sketch (`TDIGEST.*`).

use crate::command::{require_non_empty, ArgList, Command, CommandName, Keyword};
use crate::error::{Error, Result};
use crate::reply::{self, pairs, UNSET};
use crate::resp::RespValue;
use crate::transport::{dispatch, Transport};
use serde::{Deserialize, Serialize};

/// Options of `TDIGEST.MERGE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeParams {
    pub compression: Option<u64>,
    pub override_dest: bool,
}

impl MergeParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compression(mut self, compression: u64) -> Self {
        self.compression = Some(compression);
        self
    }

    /// Replace the destination instead of merging into it.
    pub fn override_dest(mut self) -> Self {
        self.override_dest = true;
        self
    }
}

/// `TDIGEST.INFO` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TDigestInfo {
    pub compression: i64,
    pub capacity: i64,
    pub merged_nodes: i64,
    pub unmerged_nodes: i64,
    pub merged_weight: i64,
    pub unmerged_weight: i64,
    pub observations: i64,
    pub total_compressions: i64,
    pub memory_usage: i64,
}

impl Default for TDigestInfo {
    fn default() -> Self {
        TDigestInfo {
            compression: UNSET,
            capacity: UNSET,
            merged_nodes: UNSET,
            unmerged_nodes: UNSET,
            merged_weight: UNSET,
            unmerged_weight: UNSET,
            observations: UNSET,
            total_compressions: UNSET,
            memory_usage: UNSET,
        }
    }
}

impl TDigestInfo {
    pub fn decode(reply: &RespValue) -> Result<Self> {
        let mut info = TDigestInfo::default();
        for (label, value) in pairs(reply, "TDIGEST.INFO reply")? {
            let field = match label.as_str() {
                "Compression" => &mut info.compression,
                "Capacity" => &mut info.capacity,
                "Merged nodes" => &mut info.merged_nodes,
                "Unmerged nodes" => &mut info.unmerged_nodes,
                "Merged weight" => &mut info.merged_weight,
                "Unmerged weight" => &mut info.unmerged_weight,
                "Observations" => &mut info.observations,
                "Total compressions" => &mut info.total_compressions,
                "Memory usage" => &mut info.memory_usage,
                _ => continue,
            };
            // Weights are reported as doubles by some server versions.
            *field = match reply::as_i64_or_unset(value) {
                Ok(n) => n,
                Err(_) => reply::as_f64(value)? as i64,
            };
        }
        Ok(info)
    }
}

fn key_only(name: CommandName, key: &str) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key);
    Ok(args.into_command(name))
}

fn with_values(name: CommandName, param: &'static str, key: &str, values: &[f64]) -> Result<Command> {
    require_non_empty(param, values)?;
    let mut args = ArgList::new();
    args.push(key).extend(values);
    Ok(args.into_command(name))
}

pub fn create(key: &str, compression: Option<u64>) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key).opt(Keyword::Compression, compression);
    Ok(args.into_command(CommandName::TDigestCreate))
}

pub fn reset(key: &str) -> Result<Command> {
    key_only(CommandName::TDigestReset, key)
}

pub fn add(key: &str, values: &[f64]) -> Result<Command> {
    with_values(CommandName::TDigestAdd, "values", key, values)
}

/// `TDIGEST.MERGE dest numKeys src... [COMPRESSION c] [OVERRIDE]`
pub fn merge<S: AsRef<str>>(dest: &str, sources: &[S], params: &MergeParams) -> Result<Command> {
    require_non_empty("sources", sources)?;
    let mut args = ArgList::new();
    args.push(dest).push(&sources.len());
    for source in sources {
        args.push(source.as_ref());
    }
    args.opt(Keyword::Compression, params.compression)
        .flag(Keyword::Override, params.override_dest);
    Ok(args.into_command(CommandName::TDigestMerge))
}

pub fn quantile(key: &str, quantiles: &[f64]) -> Result<Command> {
    if let Some(q) = quantiles.iter().find(|q| !(0.0..=1.0).contains(*q)) {
        return Err(Error::construction(
            "quantiles",
            format!("{} is outside [0, 1]", q),
        ));
    }
    with_values(CommandName::TDigestQuantile, "quantiles", key, quantiles)
}

pub fn cdf(key: &str, values: &[f64]) -> Result<Command> {
    with_values(CommandName::TDigestCdf, "values", key, values)
}

pub fn rank(key: &str, values: &[f64]) -> Result<Command> {
    with_values(CommandName::TDigestRank, "values", key, values)
}

pub fn rev_rank(key: &str, values: &[f64]) -> Result<Command> {
    with_values(CommandName::TDigestRevRank, "values", key, values)
}

fn by_rank_with(name: CommandName, key: &str, ranks: &[u64]) -> Result<Command> {
    require_non_empty("ranks", ranks)?;
    let mut args = ArgList::new();
    args.push(key).extend(ranks);
    Ok(args.into_command(name))
}

pub fn by_rank(key: &str, ranks: &[u64]) -> Result<Command> {
    by_rank_with(CommandName::TDigestByRank, key, ranks)
}

pub fn by_rev_rank(key: &str, ranks: &[u64]) -> Result<Command> {
    by_rank_with(CommandName::TDigestByRevRank, key, ranks)
}

pub fn min(key: &str) -> Result<Command> {
    key_only(CommandName::TDigestMin, key)
}

pub fn max(key: &str) -> Result<Command> {
    key_only(CommandName::TDigestMax, key)
}

/// `TDIGEST.TRIMMED_MEAN key low high` with `0 <= low < high <= 1`.
pub fn trimmed_mean(key: &str, low: f64, high: f64) -> Result<Command> {
    if !(0.0..=1.0).contains(&low) {
        return Err(Error::construction("low", format!("{} is outside [0, 1]", low)));
    }
    if !(0.0..=1.0).contains(&high) || high <= low {
        return Err(Error::construction(
            "high",
            format!("must be in ({}, 1], got {}", low, high),
        ));
    }
    let mut args = ArgList::new();
    args.push(key).push(&low).push(&high);
    Ok(args.into_command(CommandName::TDigestTrimmedMean))
}

pub fn info(key: &str) -> Result<Command> {
    key_only(CommandName::TDigestInfo, key)
}

/// t-digest commands over a transport.
#[derive(Debug, Clone)]
pub struct TDigest<T> {
    transport: T,
}

impl<T: Transport> TDigest<T> {
    pub fn new(transport: T) -> Self {
        TDigest { transport }
    }

    async fn ok(&self, command: Command) -> Result<bool> {
        Ok(reply::is_ok(&dispatch(&self.transport, command).await?))
    }

    async fn doubles(&self, command: Command) -> Result<Vec<f64>> {
        let what = command.name().as_str();
        reply::f64_list(&dispatch(&self.transport, command).await?, what)
    }

    async fn double(&self, command: Command) -> Result<f64> {
        reply::as_f64(&dispatch(&self.transport, command).await?)
    }

    pub async fn create(&self, key: &str, compression: Option<u64>) -> Result<bool> {
        self.ok(create(key, compression)?).await
    }

    pub async fn reset(&self, key: &str) -> Result<bool> {
        self.ok(reset(key)?).await
    }

    pub async fn add(&self, key: &str, values: &[f64]) -> Result<bool> {
        self.ok(add(key, values)?).await
    }

    pub async fn merge<S: AsRef<str>>(
        &self,
        dest: &str,
        sources: &[S],
        params: &MergeParams,
    ) -> Result<bool> {
        self.ok(merge(dest, sources, params)?).await
    }

    pub async fn quantile(&self, key: &str, quantiles: &[f64]) -> Result<Vec<f64>> {
        self.doubles(quantile(key, quantiles)?).await
    }

    pub async fn cdf(&self, key: &str, values: &[f64]) -> Result<Vec<f64>> {
        self.doubles(cdf(key, values)?).await
    }

    pub async fn rank(&self, key: &str, values: &[f64]) -> Result<Vec<i64>> {
        reply::i64_list(&dispatch(&self.transport, rank(key, values)?).await?, "TDIGEST.RANK reply")
    }

    pub async fn rev_rank(&self, key: &str, values: &[f64]) -> Result<Vec<i64>> {
        let reply = dispatch(&self.transport, rev_rank(key, values)?).await?;
        reply::i64_list(&reply, "TDIGEST.REVRANK reply")
    }

    pub async fn by_rank(&self, key: &str, ranks: &[u64]) -> Result<Vec<f64>> {
        self.doubles(by_rank(key, ranks)?).await
    }

    pub async fn by_rev_rank(&self, key: &str, ranks: &[u64]) -> Result<Vec<f64>> {
        self.doubles(by_rev_rank(key, ranks)?).await
    }

    /// `NaN` for an empty digest.
    pub async fn min(&self, key: &str) -> Result<f64> {
        self.double(min(key)?).await
    }

    /// `NaN` for an empty digest.
    pub async fn max(&self, key: &str) -> Result<f64> {
        self.double(max(key)?).await
    }

    pub async fn trimmed_mean(&self, key: &str, low: f64, high: f64) -> Result<f64> {
        self.double(trimmed_mean(key, low, high)?).await
    }

    pub async fn info(&self, key: &str) -> Result<TDigestInfo> {
        TDigestInfo::decode(&dispatch(&self.transport, info(key)?).await?)
    }
}
