//! Time-series reply decoders.
//!
//! Multi-series decoders take the [`LabelSelection`] and grouping of the
//! request that produced the reply: the reply alone does not say which label
//! shape the server used.

use super::params::{GroupBy, LabelSelection};
use super::types::{Label, Reducer, Sample, TimeStamp};
use crate::error::{Error, Result};
use crate::reply;
use crate::resp::RespValue;
use serde::{Deserialize, Serialize};

/// Synthetic label naming the reducer of a grouped series. The label keeps
/// the server's spelling; [`GroupInfo::reducer`] holds the parsed value.
pub const REDUCER_LABEL: &str = "__reducer__";
/// Synthetic label listing the comma-joined source keys of a grouped series.
pub const SOURCE_LABEL: &str = "__source__";

/// One series of a `TS.MGET` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSample {
    pub key: String,
    pub labels: Vec<Label>,
    pub sample: Option<Sample>,
}

/// One series (or one group) of a `TS.MRANGE` / `TS.MREVRANGE` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRange {
    pub key: String,
    pub labels: Vec<Label>,
    pub samples: Vec<Sample>,
    pub group: Option<GroupInfo>,
}

/// Reconstructed `GROUPBY` metadata of a grouped series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub field: String,
    pub value: String,
    pub reducer: Reducer,
    pub sources: Vec<String>,
}

pub fn timestamp(reply: &RespValue) -> Result<TimeStamp> {
    reply::as_i64(reply).map(TimeStamp::Milliseconds)
}

/// Per-entry timestamps of `TS.MADD`. An error entry fails the whole call.
pub fn timestamps(reply: &RespValue) -> Result<Vec<TimeStamp>> {
    let items = reply::expect_array(reply, "TS.MADD reply")?;
    reply::check_element_errors(items)?;
    items.iter().map(timestamp).collect()
}

/// `[ts, value]`, or `None` for an empty array or nil.
pub fn sample(reply: &RespValue) -> Result<Option<Sample>> {
    match reply::as_opt_array(reply)? {
        None | Some([]) => Ok(None),
        Some([ts, value]) => Ok(Some(Sample {
            time: timestamp(ts)?,
            value: reply::as_f64(value)?,
        })),
        Some(other) => Err(Error::decode(format!(
            "sample must have 2 elements, got {}",
            other.len()
        ))),
    }
}

pub fn samples(reply: &RespValue) -> Result<Vec<Sample>> {
    reply::expect_array(reply, "sample list")?
        .iter()
        .map(|item| {
            sample(item)?.ok_or_else(|| Error::decode("empty entry in sample list"))
        })
        .collect()
}

/// `[[key, value], ...]` shaped by the request's label selection.
pub fn labels(reply: &RespValue, selection: &LabelSelection) -> Result<Vec<Label>> {
    let Some(items) = reply::as_opt_array(reply)? else {
        return Ok(Vec::new());
    };
    let mut labels = Vec::with_capacity(items.len());
    for item in items {
        let pair = reply::expect_arity(item, 2, "label pair")?;
        let key = reply::as_string(&pair[0])?;
        match (reply::as_opt_string(&pair[1])?, selection) {
            (Some(value), _) => labels.push(Label::new(key, value)),
            // The series does not carry this selected label.
            (None, LabelSelection::Selected(_)) => {}
            (None, _) => {
                return Err(Error::decode(format!("label {:?} has no value", key)));
            }
        }
    }
    Ok(labels)
}

/// Split one `[key, labels, body]` series element.
fn series_element<'a>(item: &'a RespValue) -> Result<(String, &'a RespValue, &'a RespValue)> {
    let parts = reply::expect_arity(item, 3, "series entry")?;
    Ok((reply::as_string(&parts[0])?, &parts[1], &parts[2]))
}

pub fn mget(reply: &RespValue, selection: &LabelSelection) -> Result<Vec<SeriesSample>> {
    reply::expect_array(reply, "TS.MGET reply")?
        .iter()
        .map(|item| {
            let (key, raw_labels, body) = series_element(item)?;
            Ok(SeriesSample {
                key,
                labels: labels(raw_labels, selection)?,
                sample: sample(body)?,
            })
        })
        .collect()
}

pub fn mrange(
    reply: &RespValue,
    selection: &LabelSelection,
    group_by: Option<&GroupBy>,
) -> Result<Vec<SeriesRange>> {
    reply::expect_array(reply, "TS.MRANGE reply")?
        .iter()
        .map(|item| {
            let (key, raw_labels, body) = series_element(item)?;
            let samples = samples(body)?;
            match group_by {
                None => Ok(SeriesRange {
                    key,
                    labels: labels(raw_labels, selection)?,
                    samples,
                    group: None,
                }),
                Some(_) => grouped_series(key, raw_labels, samples),
            }
        })
        .collect()
}

/// Rebuild a grouped series. The server appends the reducer and source
/// entries after any other labels, so they are taken by position.
fn grouped_series(key: String, raw_labels: &RespValue, samples: Vec<Sample>) -> Result<SeriesRange> {
    let (field, value) = key
        .split_once('=')
        .map(|(f, v)| (f.to_string(), v.to_string()))
        .ok_or_else(|| Error::decode(format!("group key {:?} is not field=value", key)))?;

    // Labels missing from some of the grouped sources come back nil.
    let mut returned = labels(raw_labels, &LabelSelection::Selected(Vec::new()))?;
    if returned.len() < 2 {
        return Err(Error::decode(format!(
            "grouped series {:?} needs reducer and source labels, got {} labels",
            key,
            returned.len()
        )));
    }
    let source = returned.remove(returned.len() - 1);
    let reducer_label = returned.remove(returned.len() - 1);
    let reducer: Reducer = reducer_label.value.parse()?;
    let sources: Vec<String> = source
        .value
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let mut labels = Vec::with_capacity(returned.len() + 3);
    labels.push(Label::new(field.clone(), value.clone()));
    labels.push(Label::new(REDUCER_LABEL, reducer_label.value));
    labels.push(Label::new(SOURCE_LABEL, source.value));
    labels.extend(returned.into_iter().filter(|l| l.key != field));

    Ok(SeriesRange {
        key,
        labels,
        samples,
        group: Some(GroupInfo {
            field,
            value,
            reducer,
            sources,
        }),
    })
}

pub fn query_index(reply: &RespValue) -> Result<Vec<String>> {
    reply::string_list(reply, "TS.QUERYINDEX reply")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_sample(ts: i64, value: &str) -> RespValue {
        RespValue::array(vec![RespValue::Integer(ts), RespValue::bulk(value)])
    }

    fn raw_label(key: &str, value: Option<&str>) -> RespValue {
        RespValue::array(vec![
            RespValue::bulk(key),
            value.map(RespValue::bulk).unwrap_or_else(RespValue::nil),
        ])
    }

    fn series(key: &str, labels: Vec<RespValue>, body: RespValue) -> RespValue {
        RespValue::array(vec![RespValue::bulk(key), RespValue::array(labels), body])
    }

    #[test]
    fn test_get_empty_and_nil_are_absent() {
        assert_eq!(sample(&RespValue::empty_array()).unwrap(), None);
        assert_eq!(sample(&RespValue::nil()).unwrap(), None);
        assert_eq!(sample(&raw_sample(5, "0")).unwrap(), Some(Sample::new(5, 0.0)));
    }

    #[test]
    fn test_sample_arity_mismatch() {
        let bad = RespValue::array(vec![RespValue::Integer(1)]);
        assert!(sample(&bad).unwrap_err().is_decode());
    }

    #[test]
    fn test_samples_keep_order() {
        let reply = RespValue::array(vec![raw_sample(0, "1"), raw_sample(50, "3")]);
        assert_eq!(
            samples(&reply).unwrap(),
            vec![Sample::new(0, 1.0), Sample::new(50, 3.0)]
        );
        assert!(samples(&RespValue::empty_array()).unwrap().is_empty());
    }

    #[test]
    fn test_madd_element_error_surfaces_as_server_error() {
        let reply = RespValue::array(vec![
            RespValue::Integer(1),
            RespValue::Error("ERR TSDB: the key does not exist".to_string()),
        ]);
        match timestamps(&reply).unwrap_err() {
            Error::Server(msg) => assert_eq!(msg, "ERR TSDB: the key does not exist"),
            other => panic!("expected server error, got {:?}", other),
        }
    }

    #[test]
    fn test_label_shapes_follow_selection() {
        let raw = RespValue::array(vec![raw_label("unit", Some("c")), raw_label("site", None)]);
        let selected = LabelSelection::Selected(vec!["unit".into(), "site".into()]);
        assert_eq!(labels(&raw, &selected).unwrap(), vec![Label::new("unit", "c")]);
        assert!(labels(&raw, &LabelSelection::All).unwrap_err().is_decode());
    }

    #[test]
    fn test_mget_decodes_absent_samples() {
        let reply = RespValue::array(vec![
            series("a", vec![], raw_sample(10, "1.5")),
            series("b", vec![], RespValue::empty_array()),
        ]);
        let decoded = mget(&reply, &LabelSelection::None).unwrap();
        assert_eq!(decoded[0].sample, Some(Sample::new(10, 1.5)));
        assert_eq!(decoded[1].sample, None);
    }

    #[test]
    fn test_mrange_plain_series() {
        let reply = RespValue::array(vec![series(
            "temp:1",
            vec![raw_label("region", Some("eu"))],
            RespValue::array(vec![raw_sample(0, "1"), raw_sample(10, "2")]),
        )]);
        let decoded = mrange(&reply, &LabelSelection::All, None).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].key, "temp:1");
        assert_eq!(decoded[0].labels, vec![Label::new("region", "eu")]);
        assert_eq!(decoded[0].samples.len(), 2);
        assert_eq!(decoded[0].group, None);
    }

    #[test]
    fn test_mrange_grouped_label_positions() {
        let group = GroupBy::new("region", Reducer::Max);
        let reply = RespValue::array(vec![series(
            "region=eu",
            vec![
                raw_label("unit", Some("c")),
                raw_label("region", Some("eu")),
                raw_label("__reducer__", Some("max")),
                raw_label("__source__", Some("temp:1,temp:2")),
            ],
            RespValue::array(vec![raw_sample(0, "4")]),
        )]);
        let decoded = mrange(&reply, &LabelSelection::All, Some(&group)).unwrap();
        let labels = &decoded[0].labels;
        assert_eq!(labels[0], Label::new("region", "eu"));
        assert_eq!(labels[1], Label::new(REDUCER_LABEL, "max"));
        assert_eq!(decoded[0].group.as_ref().unwrap().reducer, Reducer::Max);
        assert_eq!(labels[2], Label::new(SOURCE_LABEL, "temp:1,temp:2"));
        assert_eq!(labels[3], Label::new("unit", "c"));
        assert_eq!(labels.len(), 4);
        assert_eq!(
            decoded[0].group,
            Some(GroupInfo {
                field: "region".into(),
                value: "eu".into(),
                reducer: Reducer::Max,
                sources: vec!["temp:1".into(), "temp:2".into()],
            })
        );
    }

    #[test]
    fn test_grouped_reply_without_synthetic_labels() {
        let group = GroupBy::new("region", Reducer::Sum);
        let reply = RespValue::array(vec![series(
            "region=eu",
            vec![raw_label("__reducer__", Some("sum"))],
            RespValue::empty_array(),
        )]);
        assert!(mrange(&reply, &LabelSelection::None, Some(&group))
            .unwrap_err()
            .is_decode());
    }

    #[test]
    fn test_series_entry_must_be_triple() {
        let reply = RespValue::array(vec![RespValue::array(vec![
            RespValue::bulk("a"),
            RespValue::empty_array(),
        ])]);
        assert!(mrange(&reply, &LabelSelection::None, None).unwrap_err().is_decode());
        assert!(mget(&reply, &LabelSelection::None).unwrap_err().is_decode());
    }
}
