//! Time-series argument builders.
//!
//! One function per command. Each validates its parameter bundle, then
//! appends required positionals followed by the optional sections in the
//! order the server grammar fixes.

use super::params::{
    AddParams, AlterParams, CreateParams, IncrByParams, LabelSelection, MGetParams, MRangeParams,
    RangeParams,
};
use super::types::{Label, Rule, TimeStamp};
use crate::command::{require_non_empty, ArgList, Command, CommandName, Keyword};
use crate::error::Result;

fn push_labels(args: &mut ArgList, labels: &[Label]) {
    if labels.is_empty() {
        return;
    }
    args.keyword(Keyword::Labels);
    for label in labels {
        args.push(&label.key).push(&label.value);
    }
}

fn push_label_selection(args: &mut ArgList, selection: &LabelSelection) {
    match selection {
        LabelSelection::None => {}
        LabelSelection::All => {
            args.keyword(Keyword::WithLabels);
        }
        LabelSelection::Selected(labels) => {
            args.keyword(Keyword::SelectedLabels).extend(labels);
        }
    }
}

/// `from to [LATEST] [FILTER_BY_TS ts...] [FILTER_BY_VALUE min max]`
fn push_range_head(args: &mut ArgList, params: &RangeParams) {
    args.push(&params.from)
        .push(&params.to)
        .flag(Keyword::Latest, params.latest);
    if let Some(timestamps) = &params.filter_by_ts {
        args.keyword(Keyword::FilterByTs).extend(timestamps);
    }
    if let Some((min, max)) = params.filter_by_value {
        args.keyword(Keyword::FilterByValue).push(&min).push(&max);
    }
}

/// `[COUNT n] [ALIGN ts] [AGGREGATION kind bucket] [BUCKETTIMESTAMP mode] [EMPTY]`
fn push_range_tail(args: &mut ArgList, params: &RangeParams) {
    args.opt(Keyword::Count, params.count)
        .opt(Keyword::Align, params.align);
    if let (Some(kind), Some(bucket)) = (params.aggregation, params.bucket_duration) {
        args.keyword(Keyword::Aggregation).push(&kind).push(&bucket);
    }
    args.opt(Keyword::BucketTimestamp, params.bucket_timestamp)
        .flag(Keyword::Empty, params.empty);
}

fn push_filter(args: &mut ArgList, filter: &[String]) {
    args.keyword(Keyword::Filter).extend(filter);
}

pub fn create(key: &str, params: &CreateParams) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key)
        .opt(Keyword::Retention, params.retention)
        .opt(Keyword::ChunkSize, params.chunk_size)
        .opt(Keyword::Encoding, params.encoding)
        .opt(Keyword::DuplicatePolicy, params.duplicate_policy);
    push_labels(&mut args, &params.labels);
    Ok(args.into_command(CommandName::TsCreate))
}

pub fn alter(key: &str, params: &AlterParams) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key)
        .opt(Keyword::Retention, params.retention)
        .opt(Keyword::ChunkSize, params.chunk_size)
        .opt(Keyword::DuplicatePolicy, params.duplicate_policy);
    if let Some(labels) = &params.labels {
        args.keyword(Keyword::Labels);
        for label in labels {
            args.push(&label.key).push(&label.value);
        }
    }
    Ok(args.into_command(CommandName::TsAlter))
}

pub fn add(key: &str, timestamp: TimeStamp, value: f64, params: &AddParams) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key)
        .push(&timestamp)
        .push(&value)
        .opt(Keyword::Retention, params.retention)
        .opt(Keyword::ChunkSize, params.chunk_size)
        .opt(Keyword::Encoding, params.encoding);
    push_labels(&mut args, &params.labels);
    args.opt(Keyword::OnDuplicate, params.on_duplicate);
    Ok(args.into_command(CommandName::TsAdd))
}

/// `TS.MADD key ts value [key ts value ...]`
pub fn madd<K: AsRef<str>>(samples: &[(K, TimeStamp, f64)]) -> Result<Command> {
    require_non_empty("samples", samples)?;
    let mut args = ArgList::new();
    for (key, timestamp, value) in samples {
        args.push(key.as_ref()).push(timestamp).push(value);
    }
    Ok(args.into_command(CommandName::TsMAdd))
}

fn incr_decr(name: CommandName, key: &str, value: f64, params: &IncrByParams) -> Command {
    let mut args = ArgList::new();
    args.push(key)
        .push(&value)
        .opt(Keyword::Timestamp, params.timestamp)
        .opt(Keyword::Retention, params.retention)
        .opt(Keyword::Encoding, params.encoding)
        .opt(Keyword::ChunkSize, params.chunk_size);
    push_labels(&mut args, &params.labels);
    args.into_command(name)
}

pub fn incr_by(key: &str, value: f64, params: &IncrByParams) -> Result<Command> {
    Ok(incr_decr(CommandName::TsIncrBy, key, value, params))
}

pub fn decr_by(key: &str, value: f64, params: &IncrByParams) -> Result<Command> {
    Ok(incr_decr(CommandName::TsDecrBy, key, value, params))
}

pub fn del(key: &str, from: TimeStamp, to: TimeStamp) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key).push(&from).push(&to);
    Ok(args.into_command(CommandName::TsDel))
}

/// `TS.CREATERULE src dest AGGREGATION kind bucket [alignTimestamp]`
pub fn create_rule(source_key: &str, rule: &Rule, align_timestamp: Option<i64>) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(source_key)
        .push(&rule.dest_key)
        .keyword(Keyword::Aggregation)
        .push(&rule.aggregation)
        .push(&rule.bucket_duration);
    if let Some(align) = align_timestamp {
        args.push(&align);
    }
    Ok(args.into_command(CommandName::TsCreateRule))
}

pub fn delete_rule(source_key: &str, dest_key: &str) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(source_key).push(dest_key);
    Ok(args.into_command(CommandName::TsDeleteRule))
}

pub fn get(key: &str, latest: bool) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key).flag(Keyword::Latest, latest);
    Ok(args.into_command(CommandName::TsGet))
}

/// `TS.MGET [LATEST] [WITHLABELS | SELECTED_LABELS l...] FILTER expr...`
pub fn mget(params: &MGetParams) -> Result<Command> {
    params.validate()?;
    let mut args = ArgList::new();
    args.flag(Keyword::Latest, params.latest);
    push_label_selection(&mut args, &params.label_selection()?);
    push_filter(&mut args, &params.filter);
    Ok(args.into_command(CommandName::TsMGet))
}

fn single_range(name: CommandName, key: &str, params: &RangeParams) -> Result<Command> {
    params.validate()?;
    let mut args = ArgList::new();
    args.push(key);
    push_range_head(&mut args, params);
    push_range_tail(&mut args, params);
    Ok(args.into_command(name))
}

pub fn range(key: &str, params: &RangeParams) -> Result<Command> {
    single_range(CommandName::TsRange, key, params)
}

pub fn rev_range(key: &str, params: &RangeParams) -> Result<Command> {
    single_range(CommandName::TsRevRange, key, params)
}

fn multi_range(name: CommandName, params: &MRangeParams) -> Result<Command> {
    params.validate()?;
    let mut args = ArgList::new();
    push_range_head(&mut args, &params.range);
    push_label_selection(&mut args, &params.label_selection()?);
    push_range_tail(&mut args, &params.range);
    // FILTER is variadic and must stay last among variable-length sections.
    push_filter(&mut args, &params.filter);
    if let Some(group) = &params.group_by {
        args.keyword(Keyword::GroupBy)
            .push(&group.label)
            .keyword(Keyword::Reduce)
            .push(&group.reducer);
    }
    Ok(args.into_command(name))
}

pub fn mrange(params: &MRangeParams) -> Result<Command> {
    multi_range(CommandName::TsMRange, params)
}

pub fn mrev_range(params: &MRangeParams) -> Result<Command> {
    multi_range(CommandName::TsMRevRange, params)
}

pub fn query_index<S: AsRef<str>>(filter: &[S]) -> Result<Command> {
    require_non_empty("filter", filter)?;
    let mut args = ArgList::new();
    for expr in filter {
        args.push(expr.as_ref());
    }
    Ok(args.into_command(CommandName::TsQueryIndex))
}

pub fn info(key: &str, debug: bool) -> Result<Command> {
    let mut args = ArgList::new();
    args.push(key).flag(Keyword::Debug, debug);
    Ok(args.into_command(CommandName::TsInfo))
}
