//! Scalable Bloom filter (`BF.*`).

use crate::command::{require_non_empty, ArgList, Command, CommandName, Keyword, ToArg};
use crate::error::{Error, Result};
use crate::reply::{self, pairs, UNSET};
use crate::resp::RespValue;
use crate::transport::{dispatch, Transport};
use serde::{Deserialize, Serialize};

/// Options of `BF.RESERVE`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReserveParams {
    pub expansion: Option<u32>,
    pub non_scaling: bool,
}

impl ReserveParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expansion(mut self, factor: u32) -> Self {
        self.expansion = Some(factor);
        self
    }

    pub fn non_scaling(mut self) -> Self {
        self.non_scaling = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_scaling(self.expansion, self.non_scaling)
    }
}

/// Options of `BF.INSERT`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertParams {
    pub capacity: Option<u64>,
    pub error_rate: Option<f64>,
    pub expansion: Option<u32>,
    pub no_create: bool,
    pub non_scaling: bool,
}

impl InsertParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(mut self, capacity: u64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn error_rate(mut self, rate: f64) -> Self {
        self.error_rate = Some(rate);
        self
    }

    pub fn expansion(mut self, factor: u32) -> Self {
        self.expansion = Some(factor);
        self
    }

    pub fn no_create(mut self) -> Self {
        self.no_create = true;
        self
    }

    pub fn non_scaling(mut self) -> Self {
        self.non_scaling = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.no_create && (self.capacity.is_some() || self.error_rate.is_some()) {
            return Err(Error::construction(
                "no_create",
                "cannot be combined with capacity or error_rate",
            ));
        }
        if let Some(rate) = self.error_rate {
            check_error_rate(rate)?;
        }
        check_scaling(self.expansion, self.non_scaling)
    }
}

fn check_scaling(expansion: Option<u32>, non_scaling: bool) -> Result<()> {
    if expansion.is_some() && non_scaling {
        return Err(Error::construction(
            "non_scaling",
            "cannot be combined with expansion",
        ));
    }
    Ok(())
}

fn check_error_rate(rate: f64) -> Result<()> {
    if !(rate > 0.0 && rate < 1.0) {
        return Err(Error::construction(
            "error_rate",
            format!("must be strictly between 0 and 1, got {}", rate),
        ));
    }
    Ok(())
}

/// `BF.INFO` record. Fields absent from the reply hold [`UNSET`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloomInfo {
    pub capacity: i64,
    pub size: i64,
    pub number_of_filters: i64,
    pub number_of_items_inserted: i64,
    pub expansion_rate: i64,
}

impl Default for BloomInfo {
    fn default() -> Self {
        BloomInfo {
            capacity: UNSET,
            size: UNSET,
            number_of_filters: UNSET,
            number_of_items_inserted: UNSET,
            expansion_rate: UNSET,
        }
    }
}

impl BloomInfo {
    pub fn decode(reply: &RespValue) -> Result<Self> {
        let mut info = BloomInfo::default();
        for (label, value) in pairs(reply, "BF.INFO reply")? {
            let field = match label.as_str() {
                "Capacity" => &mut info.capacity,
                "Size" => &mut info.size,
                "Number of filters" => &mut info.number_of_filters,
                "Number of items inserted" => &mut info.number_of_items_inserted,
                // Nil for non-scaling filters.
                "Expansion rate" => &mut info.expansion_rate,
                _ => continue,
            };
            *field = reply::as_i64_or_unset(value)?;
        }
        Ok(info)
    }
}

pub fn reserve(key: &str, error_rate: f64, capacity: u64, params: &ReserveParams) -> Result<Command> {
    check_error_rate(error_rate)?;
    if capacity == 0 {
        return Err(Error::construction("capacity", "must be positive"));
    }
    params.validate()?;
    let mut args = ArgList::new();
    args.push(key)
        .push(&error_rate)
        .push(&capacity)
        .opt(Keyword::Expansion, params.expansion)
        .flag(Keyword::NonScaling, params.non_scaling);
    Ok(args.into_command(CommandName::BfReserve))
}

fn single(name: CommandName, key: &str, item: &(impl ToArg + ?Sized)) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key).push(item);
    Ok(args.into_command(name))
}

fn multi<S: ToArg>(name: CommandName, key: &str, items: &[S]) -> Result<Command> {
    require_non_empty("items", items)?;
    let mut args = ArgList::new();
    args.push(key).extend(items);
    Ok(args.into_command(name))
}

pub fn add(key: &str, item: &(impl ToArg + ?Sized)) -> Result<Command> {
    single(CommandName::BfAdd, key, item)
}

pub fn exists(key: &str, item: &(impl ToArg + ?Sized)) -> Result<Command> {
    single(CommandName::BfExists, key, item)
}

pub fn madd<S: ToArg>(key: &str, items: &[S]) -> Result<Command> {
    multi(CommandName::BfMAdd, key, items)
}

pub fn mexists<S: ToArg>(key: &str, items: &[S]) -> Result<Command> {
    multi(CommandName::BfMExists, key, items)
}

/// `BF.INSERT key [CAPACITY c] [ERROR e] [EXPANSION n] [NOCREATE] [NONSCALING] ITEMS item...`
pub fn insert<S: ToArg>(key: &str, items: &[S], params: &InsertParams) -> Result<Command> {
    params.validate()?;
    require_non_empty("items", items)?;
    let mut args = ArgList::new();
    args.push(key)
        .opt(Keyword::Capacity, params.capacity)
        .opt(Keyword::Error, params.error_rate)
        .opt(Keyword::Expansion, params.expansion)
        .flag(Keyword::NoCreate, params.no_create)
        .flag(Keyword::NonScaling, params.non_scaling)
        .keyword(Keyword::Items)
        .extend(items);
    Ok(args.into_command(CommandName::BfInsert))
}

pub fn info(key: &str) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key);
    Ok(args.into_command(CommandName::BfInfo))
}

/// Bloom filter commands over a transport.
#[derive(Debug, Clone)]
pub struct Bloom<T> {
    transport: T,
}

impl<T: Transport> Bloom<T> {
    pub fn new(transport: T) -> Self {
        Bloom { transport }
    }

    pub async fn reserve(
        &self,
        key: &str,
        error_rate: f64,
        capacity: u64,
        params: &ReserveParams,
    ) -> Result<bool> {
        let reply = dispatch(&self.transport, reserve(key, error_rate, capacity, params)?).await?;
        Ok(reply::is_ok(&reply))
    }

    /// `true` when the item was newly added.
    pub async fn add(&self, key: &str, item: &(impl ToArg + ?Sized)) -> Result<bool> {
        let reply = dispatch(&self.transport, add(key, item)?).await?;
        reply::as_bool(&reply)
    }

    pub async fn exists(&self, key: &str, item: &(impl ToArg + ?Sized)) -> Result<bool> {
        let reply = dispatch(&self.transport, exists(key, item)?).await?;
        reply::as_bool(&reply)
    }

    pub async fn madd<S: ToArg>(&self, key: &str, items: &[S]) -> Result<Vec<bool>> {
        let reply = dispatch(&self.transport, madd(key, items)?).await?;
        reply::as_flags(&reply)
    }

    pub async fn mexists<S: ToArg>(&self, key: &str, items: &[S]) -> Result<Vec<bool>> {
        let reply = dispatch(&self.transport, mexists(key, items)?).await?;
        reply::as_flags(&reply)
    }

    pub async fn insert<S: ToArg>(
        &self,
        key: &str,
        items: &[S],
        params: &InsertParams,
    ) -> Result<Vec<bool>> {
        let reply = dispatch(&self.transport, insert(key, items, params)?).await?;
        let flags = reply::expect_array(&reply, "BF.INSERT reply")?;
        reply::check_element_errors(flags)?;
        flags.iter().map(reply::as_bool).collect()
    }

    pub async fn info(&self, key: &str) -> Result<BloomInfo> {
        let reply = dispatch(&self.transport, info(key)?).await?;
        BloomInfo::decode(&reply)
    }
}
