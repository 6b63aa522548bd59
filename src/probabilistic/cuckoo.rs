//! Cuckoo filter (`CF.*`).

use crate::command::{require_non_empty, ArgList, Command, CommandName, Keyword, ToArg};
use crate::error::{Error, Result};
use crate::reply::{self, pairs, UNSET};
use crate::resp::RespValue;
use crate::transport::{dispatch, Transport};
use serde::{Deserialize, Serialize};

/// Options of `CF.RESERVE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReserveParams {
    pub bucket_size: Option<u32>,
    pub max_iterations: Option<u32>,
    pub expansion: Option<u32>,
}

impl ReserveParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket_size(mut self, size: u32) -> Self {
        self.bucket_size = Some(size);
        self
    }

    pub fn max_iterations(mut self, n: u32) -> Self {
        self.max_iterations = Some(n);
        self
    }

    pub fn expansion(mut self, factor: u32) -> Self {
        self.expansion = Some(factor);
        self
    }
}

/// Options of `CF.INSERT` / `CF.INSERTNX`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertParams {
    pub capacity: Option<u64>,
    pub no_create: bool,
}

impl InsertParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(mut self, capacity: u64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn no_create(mut self) -> Self {
        self.no_create = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.no_create && self.capacity.is_some() {
            return Err(Error::construction(
                "no_create",
                "cannot be combined with capacity",
            ));
        }
        Ok(())
    }
}

/// `CF.INFO` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuckooInfo {
    pub size: i64,
    pub number_of_buckets: i64,
    pub number_of_filters: i64,
    pub number_of_items_inserted: i64,
    pub number_of_items_deleted: i64,
    pub bucket_size: i64,
    pub expansion_rate: i64,
    pub max_iterations: i64,
}

impl Default for CuckooInfo {
    fn default() -> Self {
        CuckooInfo {
            size: UNSET,
            number_of_buckets: UNSET,
            number_of_filters: UNSET,
            number_of_items_inserted: UNSET,
            number_of_items_deleted: UNSET,
            bucket_size: UNSET,
            expansion_rate: UNSET,
            max_iterations: UNSET,
        }
    }
}

impl CuckooInfo {
    pub fn decode(reply: &RespValue) -> Result<Self> {
        let mut info = CuckooInfo::default();
        for (label, value) in pairs(reply, "CF.INFO reply")? {
            let field = match label.as_str() {
                "Size" => &mut info.size,
                "Number of buckets" => &mut info.number_of_buckets,
                "Number of filters" => &mut info.number_of_filters,
                "Number of items inserted" => &mut info.number_of_items_inserted,
                "Number of items deleted" => &mut info.number_of_items_deleted,
                "Bucket size" => &mut info.bucket_size,
                "Expansion rate" => &mut info.expansion_rate,
                "Max iterations" => &mut info.max_iterations,
                _ => continue,
            };
            *field = reply::as_i64_or_unset(value)?;
        }
        Ok(info)
    }
}

pub fn reserve(key: &str, capacity: u64, params: &ReserveParams) -> Result<Command> {
    if capacity == 0 {
        return Err(Error::construction("capacity", "must be positive"));
    }
    let mut args = ArgList::new();
    args.push(key)
        .push(&capacity)
        .opt(Keyword::BucketSize, params.bucket_size)
        .opt(Keyword::MaxIterations, params.max_iterations)
        .opt(Keyword::Expansion, params.expansion);
    Ok(args.into_command(CommandName::CfReserve))
}

fn single(name: CommandName, key: &str, item: &(impl ToArg + ?Sized)) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key).push(item);
    Ok(args.into_command(name))
}

pub fn add(key: &str, item: &(impl ToArg + ?Sized)) -> Result<Command> {
    single(CommandName::CfAdd, key, item)
}

pub fn add_nx(key: &str, item: &(impl ToArg + ?Sized)) -> Result<Command> {
    single(CommandName::CfAddNx, key, item)
}

pub fn exists(key: &str, item: &(impl ToArg + ?Sized)) -> Result<Command> {
    single(CommandName::CfExists, key, item)
}

pub fn del(key: &str, item: &(impl ToArg + ?Sized)) -> Result<Command> {
    single(CommandName::CfDel, key, item)
}

pub fn count(key: &str, item: &(impl ToArg + ?Sized)) -> Result<Command> {
    single(CommandName::CfCount, key, item)
}

pub fn mexists<S: ToArg>(key: &str, items: &[S]) -> Result<Command> {
    require_non_empty("items", items)?;
    let mut args = ArgList::new();
    args.push(key).extend(items);
    Ok(args.into_command(CommandName::CfMExists))
}

fn insert_with(name: CommandName, key: &str, items: &[impl ToArg], params: &InsertParams) -> Result<Command> {
    params.validate()?;
    require_non_empty("items", items)?;
    let mut args = ArgList::new();
    args.push(key)
        .opt(Keyword::Capacity, params.capacity)
        .flag(Keyword::NoCreate, params.no_create)
        .keyword(Keyword::Items)
        .extend(items);
    Ok(args.into_command(name))
}

/// `CF.INSERT key [CAPACITY c] [NOCREATE] ITEMS item...`
pub fn insert<S: ToArg>(key: &str, items: &[S], params: &InsertParams) -> Result<Command> {
    insert_with(CommandName::CfInsert, key, items, params)
}

pub fn insert_nx<S: ToArg>(key: &str, items: &[S], params: &InsertParams) -> Result<Command> {
    insert_with(CommandName::CfInsertNx, key, items, params)
}

pub fn info(key: &str) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key);
    Ok(args.into_command(CommandName::CfInfo))
}

/// Per-item insertion outcome. `CF.INSERTNX` answers `1` for added, `0`
/// for already present and `-1` for a full filter; only `1` counts.
fn insert_flags(reply: &RespValue) -> Result<Vec<bool>> {
    let items = reply::expect_array(reply, "CF.INSERT reply")?;
    reply::check_element_errors(items)?;
    items.iter().map(reply::as_bool).collect()
}

/// Cuckoo filter commands over a transport.
#[derive(Debug, Clone)]
pub struct Cuckoo<T> {
    transport: T,
}

impl<T: Transport> Cuckoo<T> {
    pub fn new(transport: T) -> Self {
        Cuckoo { transport }
    }

    pub async fn reserve(&self, key: &str, capacity: u64, params: &ReserveParams) -> Result<bool> {
        let reply = dispatch(&self.transport, reserve(key, capacity, params)?).await?;
        Ok(reply::is_ok(&reply))
    }

    pub async fn add(&self, key: &str, item: &(impl ToArg + ?Sized)) -> Result<bool> {
        reply::as_bool(&dispatch(&self.transport, add(key, item)?).await?)
    }

    /// `false` when the item may already be present.
    pub async fn add_nx(&self, key: &str, item: &(impl ToArg + ?Sized)) -> Result<bool> {
        reply::as_bool(&dispatch(&self.transport, add_nx(key, item)?).await?)
    }

    pub async fn exists(&self, key: &str, item: &(impl ToArg + ?Sized)) -> Result<bool> {
        reply::as_bool(&dispatch(&self.transport, exists(key, item)?).await?)
    }

    pub async fn del(&self, key: &str, item: &(impl ToArg + ?Sized)) -> Result<bool> {
        reply::as_bool(&dispatch(&self.transport, del(key, item)?).await?)
    }

    pub async fn count(&self, key: &str, item: &(impl ToArg + ?Sized)) -> Result<i64> {
        reply::as_i64(&dispatch(&self.transport, count(key, item)?).await?)
    }

    pub async fn mexists<S: ToArg>(&self, key: &str, items: &[S]) -> Result<Vec<bool>> {
        reply::as_flags(&dispatch(&self.transport, mexists(key, items)?).await?)
    }

    pub async fn insert<S: ToArg>(
        &self,
        key: &str,
        items: &[S],
        params: &InsertParams,
    ) -> Result<Vec<bool>> {
        insert_flags(&dispatch(&self.transport, insert(key, items, params)?).await?)
    }

    pub async fn insert_nx<S: ToArg>(
        &self,
        key: &str,
        items: &[S],
        params: &InsertParams,
    ) -> Result<Vec<bool>> {
        insert_flags(&dispatch(&self.transport, insert_nx(key, items, params)?).await?)
    }

    pub async fn info(&self, key: &str) -> Result<CuckooInfo> {
        CuckooInfo::decode(&dispatch(&self.transport, info(key)?).await?)
    }
}
