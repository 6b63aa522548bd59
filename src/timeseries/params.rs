//! Request parameter bundles.
//!
//! Each bundle gathers the optional parameters of one command family behind
//! named setters, and owns the single `validate` that enforces dependent and
//! mutually exclusive options before any token is emitted.

use super::types::{
    Aggregation, BucketTimestamp, DuplicatePolicy, Encoding, Label, Reducer, TimeStamp,
};
use crate::error::{Error, Result};

/// Options of `TS.CREATE`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateParams {
    pub retention: Option<i64>,
    pub chunk_size: Option<i64>,
    pub encoding: Option<Encoding>,
    pub duplicate_policy: Option<DuplicatePolicy>,
    pub labels: Vec<Label>,
}

impl CreateParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retention(mut self, ms: i64) -> Self {
        self.retention = Some(ms);
        self
    }

    pub fn chunk_size(mut self, bytes: i64) -> Self {
        self.chunk_size = Some(bytes);
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = Some(policy);
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push(Label::new(key, value));
        self
    }

    pub fn labels(mut self, labels: impl IntoIterator<Item = Label>) -> Self {
        self.labels.extend(labels);
        self
    }
}

/// Options of `TS.ALTER`.
///
/// `labels: Some(vec![])` sends a bare `LABELS`, which removes every label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlterParams {
    pub retention: Option<i64>,
    pub chunk_size: Option<i64>,
    pub duplicate_policy: Option<DuplicatePolicy>,
    pub labels: Option<Vec<Label>>,
}

impl AlterParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retention(mut self, ms: i64) -> Self {
        self.retention = Some(ms);
        self
    }

    pub fn chunk_size(mut self, bytes: i64) -> Self {
        self.chunk_size = Some(bytes);
        self
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = Some(policy);
        self
    }

    pub fn labels(mut self, labels: impl IntoIterator<Item = Label>) -> Self {
        self.labels = Some(labels.into_iter().collect());
        self
    }

    pub fn clear_labels(mut self) -> Self {
        self.labels = Some(Vec::new());
        self
    }
}

/// Options of `TS.ADD`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddParams {
    pub retention: Option<i64>,
    pub chunk_size: Option<i64>,
    pub encoding: Option<Encoding>,
    pub labels: Vec<Label>,
    pub on_duplicate: Option<DuplicatePolicy>,
}

impl AddParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retention(mut self, ms: i64) -> Self {
        self.retention = Some(ms);
        self
    }

    pub fn chunk_size(mut self, bytes: i64) -> Self {
        self.chunk_size = Some(bytes);
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push(Label::new(key, value));
        self
    }

    pub fn on_duplicate(mut self, policy: DuplicatePolicy) -> Self {
        self.on_duplicate = Some(policy);
        self
    }
}

/// Options of `TS.INCRBY` / `TS.DECRBY`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncrByParams {
    pub timestamp: Option<TimeStamp>,
    pub retention: Option<i64>,
    pub encoding: Option<Encoding>,
    pub chunk_size: Option<i64>,
    pub labels: Vec<Label>,
}

impl IncrByParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timestamp(mut self, ts: impl Into<TimeStamp>) -> Self {
        self.timestamp = Some(ts.into());
        self
    }

    pub fn retention(mut self, ms: i64) -> Self {
        self.retention = Some(ms);
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn chunk_size(mut self, bytes: i64) -> Self {
        self.chunk_size = Some(bytes);
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push(Label::new(key, value));
        self
    }
}

/// Time window and aggregation options shared by single and multi-series
/// range queries.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeParams {
    pub from: TimeStamp,
    pub to: TimeStamp,
    pub latest: bool,
    pub filter_by_ts: Option<Vec<TimeStamp>>,
    pub filter_by_value: Option<(f64, f64)>,
    pub count: Option<u64>,
    pub align: Option<TimeStamp>,
    pub aggregation: Option<Aggregation>,
    pub bucket_duration: Option<i64>,
    pub bucket_timestamp: Option<BucketTimestamp>,
    pub empty: bool,
}

impl RangeParams {
    pub fn new(from: impl Into<TimeStamp>, to: impl Into<TimeStamp>) -> Self {
        RangeParams {
            from: from.into(),
            to: to.into(),
            latest: false,
            filter_by_ts: None,
            filter_by_value: None,
            count: None,
            align: None,
            aggregation: None,
            bucket_duration: None,
            bucket_timestamp: None,
            empty: false,
        }
    }

    /// Whole series, `-` to `+`.
    pub fn all() -> Self {
        Self::new(TimeStamp::Min, TimeStamp::Max)
    }

    pub fn latest(mut self) -> Self {
        self.latest = true;
        self
    }

    pub fn filter_by_ts(mut self, timestamps: impl IntoIterator<Item = TimeStamp>) -> Self {
        self.filter_by_ts = Some(timestamps.into_iter().collect());
        self
    }

    pub fn filter_by_value(mut self, min: f64, max: f64) -> Self {
        self.filter_by_value = Some((min, max));
        self
    }

    pub fn count(mut self, n: u64) -> Self {
        self.count = Some(n);
        self
    }

    pub fn align(mut self, ts: impl Into<TimeStamp>) -> Self {
        self.align = Some(ts.into());
        self
    }

    /// Aggregation kind together with its mandatory bucket duration.
    pub fn aggregation(mut self, kind: Aggregation, bucket_duration: i64) -> Self {
        self.aggregation = Some(kind);
        self.bucket_duration = Some(bucket_duration);
        self
    }

    pub fn bucket_timestamp(mut self, mode: BucketTimestamp) -> Self {
        self.bucket_timestamp = Some(mode);
        self
    }

    pub fn empty(mut self) -> Self {
        self.empty = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(timestamps) = &self.filter_by_ts {
            if timestamps.is_empty() {
                return Err(Error::construction(
                    "filter_by_ts",
                    "at least one timestamp is required",
                ));
            }
        }

        if self.aggregation.is_some() {
            if self.bucket_duration.is_none() {
                return Err(Error::construction(
                    "bucket_duration",
                    "required when an aggregation is set",
                ));
            }
            return Ok(());
        }

        let dependent = [
            ("bucket_duration", self.bucket_duration.is_some()),
            ("align", self.align.is_some()),
            ("bucket_timestamp", self.bucket_timestamp.is_some()),
            ("empty", self.empty),
        ];
        match dependent.iter().find(|(_, set)| *set) {
            Some((param, _)) => Err(Error::construction(
                *param,
                "only valid together with an aggregation",
            )),
            None => Ok(()),
        }
    }
}

impl Default for RangeParams {
    fn default() -> Self {
        Self::all()
    }
}

/// `GROUPBY label REDUCE reducer`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy {
    pub label: String,
    pub reducer: Reducer,
}

impl GroupBy {
    pub fn new(label: impl Into<String>, reducer: Reducer) -> Self {
        GroupBy {
            label: label.into(),
            reducer,
        }
    }
}

/// Which labels a multi-series reply should carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelSelection {
    None,
    All,
    Selected(Vec<String>),
}

fn label_selection(
    with_labels: bool,
    selected_labels: &Option<Vec<String>>,
) -> Result<LabelSelection> {
    match (with_labels, selected_labels) {
        (true, Some(_)) => Err(Error::construction(
            "selected_labels",
            "cannot be combined with with_labels",
        )),
        (_, Some(labels)) if labels.is_empty() => Err(Error::construction(
            "selected_labels",
            "at least one label name is required",
        )),
        (_, Some(labels)) => Ok(LabelSelection::Selected(labels.clone())),
        (true, None) => Ok(LabelSelection::All),
        (false, None) => Ok(LabelSelection::None),
    }
}

fn validate_filter(filter: &[String]) -> Result<()> {
    if filter.is_empty() {
        return Err(Error::construction(
            "filter",
            "at least one filter expression is required",
        ));
    }
    Ok(())
}

/// Options of `TS.MRANGE` / `TS.MREVRANGE`.
#[derive(Debug, Clone, PartialEq)]
pub struct MRangeParams {
    pub range: RangeParams,
    pub with_labels: bool,
    pub selected_labels: Option<Vec<String>>,
    pub filter: Vec<String>,
    pub group_by: Option<GroupBy>,
}

impl MRangeParams {
    pub fn new<I, S>(range: RangeParams, filter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MRangeParams {
            range,
            with_labels: false,
            selected_labels: None,
            filter: filter.into_iter().map(Into::into).collect(),
            group_by: None,
        }
    }

    pub fn with_labels(mut self) -> Self {
        self.with_labels = true;
        self
    }

    pub fn selected_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn group_by(mut self, label: impl Into<String>, reducer: Reducer) -> Self {
        self.group_by = Some(GroupBy::new(label, reducer));
        self
    }

    pub fn label_selection(&self) -> Result<LabelSelection> {
        label_selection(self.with_labels, &self.selected_labels)
    }

    pub fn validate(&self) -> Result<()> {
        self.range.validate()?;
        self.label_selection()?;
        validate_filter(&self.filter)
    }
}

/// Options of `TS.MGET`.
#[derive(Debug, Clone, PartialEq)]
pub struct MGetParams {
    pub latest: bool,
    pub with_labels: bool,
    pub selected_labels: Option<Vec<String>>,
    pub filter: Vec<String>,
}

impl MGetParams {
    pub fn new<I, S>(filter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MGetParams {
            latest: false,
            with_labels: false,
            selected_labels: None,
            filter: filter.into_iter().map(Into::into).collect(),
        }
    }

    pub fn latest(mut self) -> Self {
        self.latest = true;
        self
    }

    pub fn with_labels(mut self) -> Self {
        self.with_labels = true;
        self
    }

    pub fn selected_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn label_selection(&self) -> Result<LabelSelection> {
        label_selection(self.with_labels, &self.selected_labels)
    }

    pub fn validate(&self) -> Result<()> {
        self.label_selection()?;
        validate_filter(&self.filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_requires_bucket_duration() {
        let mut params = RangeParams::all();
        params.aggregation = Some(Aggregation::Avg);
        assert_eq!(params.validate().unwrap_err().param(), Some("bucket_duration"));
    }

    #[test]
    fn test_dependent_options_require_aggregation() {
        let cases = [
            (RangeParams::all().align(TimeStamp::Min), "align"),
            (
                RangeParams::all().bucket_timestamp(BucketTimestamp::Mid),
                "bucket_timestamp",
            ),
            (RangeParams::all().empty(), "empty"),
        ];
        for (params, param) in cases {
            let err = params.validate().unwrap_err();
            assert!(err.is_construction());
            assert_eq!(err.param(), Some(param));
        }

        let mut bucket_only = RangeParams::all();
        bucket_only.bucket_duration = Some(10);
        assert_eq!(bucket_only.validate().unwrap_err().param(), Some("bucket_duration"));
    }

    #[test]
    fn test_full_aggregation_bundle_is_valid() {
        let params = RangeParams::new(0i64, 100i64)
            .align(TimeStamp::Max)
            .aggregation(Aggregation::Min, 50)
            .bucket_timestamp(BucketTimestamp::High)
            .empty();
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_empty_filter_by_ts_rejected() {
        let params = RangeParams::all().filter_by_ts(Vec::new());
        assert_eq!(params.validate().unwrap_err().param(), Some("filter_by_ts"));
    }

    #[test]
    fn test_label_options_are_mutually_exclusive() {
        let params = MRangeParams::new(RangeParams::all(), ["a=1"])
            .with_labels()
            .selected_labels(["a"]);
        assert_eq!(params.validate().unwrap_err().param(), Some("selected_labels"));

        let mget = MGetParams::new(["a=1"]).with_labels().selected_labels(["a"]);
        assert_eq!(mget.validate().unwrap_err().param(), Some("selected_labels"));
    }

    #[test]
    fn test_filter_is_required() {
        let params = MRangeParams::new(RangeParams::all(), Vec::<String>::new());
        assert_eq!(params.validate().unwrap_err().param(), Some("filter"));
        assert_eq!(
            MGetParams::new(Vec::<String>::new()).validate().unwrap_err().param(),
            Some("filter")
        );
    }

    #[test]
    fn test_label_selection() {
        let params = MRangeParams::new(RangeParams::all(), ["a=1"]).selected_labels(["x", "y"]);
        assert_eq!(
            params.label_selection().unwrap(),
            LabelSelection::Selected(vec!["x".to_string(), "y".to_string()])
        );
        assert_eq!(
            MGetParams::new(["a=1"]).label_selection().unwrap(),
            LabelSelection::None
        );
    }
}
