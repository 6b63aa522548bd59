//! Time-Series Integration Tests
//!
//! Drives the `TimeSeries` facade through a scripted transport, verifying:
//! - Request tokens for every command family
//! - Range and multi-range reply decoding, including grouped replies
//! - Info decoding across server versions
//! - Validation failures never reaching the transport
//! - The blocking adapter

use redis_modules::timeseries::{
    AddParams, Aggregation, AlterParams, CreateParams, DuplicatePolicy, IncrByParams, Label,
    MGetParams, MRangeParams, RangeParams, Reducer, Rule, Sample, TimeSeries, TimeStamp,
    REDUCER_LABEL, SOURCE_LABEL,
};
use redis_modules::{Blocking, Error, RespValue, RoutingHint, ScriptedTransport};

fn sample(ts: i64, value: &str) -> RespValue {
    RespValue::array(vec![RespValue::Integer(ts), RespValue::bulk(value)])
}

fn label(key: &str, value: &str) -> RespValue {
    RespValue::array(vec![RespValue::bulk(key), RespValue::bulk(value)])
}

// ============================================================================
// Writes
// ============================================================================

#[tokio::test]
async fn test_create_and_add() {
    let transport = ScriptedTransport::with_replies(vec![RespValue::ok(), RespValue::Integer(1000)]);
    let ts = TimeSeries::new(&transport);

    let created = ts
        .create(
            "temp:1",
            &CreateParams::new()
                .retention(86_400_000)
                .duplicate_policy(DuplicatePolicy::Max)
                .label("room", "kitchen"),
        )
        .await
        .unwrap();
    assert!(created);

    let stamp = ts
        .add("temp:1", TimeStamp::Auto, 21.5, &AddParams::new())
        .await
        .unwrap();
    assert_eq!(stamp, TimeStamp::Milliseconds(1000));

    let sent = transport.sent();
    assert_eq!(
        sent[0].tokens(),
        vec![
            "TS.CREATE", "temp:1", "RETENTION", "86400000", "DUPLICATE_POLICY", "MAX", "LABELS",
            "room", "kitchen",
        ]
    );
    assert_eq!(sent[1].tokens(), vec!["TS.ADD", "temp:1", "*", "21.5"]);
}

#[tokio::test]
async fn test_madd_reports_per_entry_error() {
    let transport = ScriptedTransport::with_replies(vec![RespValue::array(vec![
        RespValue::Integer(10),
        RespValue::Error("ERR TSDB: the key does not exist".to_string()),
    ])]);
    let ts = TimeSeries::new(&transport);
    let err = ts
        .madd(&[
            ("a", TimeStamp::Milliseconds(10), 1.0),
            ("missing", TimeStamp::Milliseconds(10), 2.0),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Server(ref m) if m.contains("does not exist")));
}

#[tokio::test]
async fn test_alter_incr_and_rules() {
    let transport = ScriptedTransport::with_replies(vec![
        RespValue::ok(),
        RespValue::Integer(5),
        RespValue::ok(),
        RespValue::ok(),
        RespValue::Integer(2),
    ]);
    let ts = TimeSeries::new(&transport);

    assert!(ts.alter("c", &AlterParams::new().clear_labels()).await.unwrap());
    assert_eq!(
        ts.incr_by("c", 1.0, &IncrByParams::new().timestamp(5i64))
            .await
            .unwrap(),
        TimeStamp::Milliseconds(5)
    );
    let rule = Rule::new("c:sum", 60_000, Aggregation::Sum);
    assert!(ts.create_rule("c", &rule, None).await.unwrap());
    assert!(ts.delete_rule("c", "c:sum").await.unwrap());
    assert_eq!(ts.del("c", TimeStamp::Min, TimeStamp::Max).await.unwrap(), 2);

    let tokens: Vec<Vec<String>> = transport
        .sent()
        .iter()
        .map(|c| c.tokens().iter().map(|t| t.to_string()).collect())
        .collect();
    assert_eq!(tokens[0], vec!["TS.ALTER", "c", "LABELS"]);
    assert_eq!(tokens[1], vec!["TS.INCRBY", "c", "1", "TIMESTAMP", "5"]);
    assert_eq!(
        tokens[2],
        vec!["TS.CREATERULE", "c", "c:sum", "AGGREGATION", "SUM", "60000"]
    );
    assert_eq!(tokens[3], vec!["TS.DELETERULE", "c", "c:sum"]);
    assert_eq!(tokens[4], vec!["TS.DEL", "c", "-", "+"]);
}

// ============================================================================
// Single-series reads
// ============================================================================

#[tokio::test]
async fn test_range_filter_by_value_scenario() {
    let transport = ScriptedTransport::with_replies(vec![RespValue::array(vec![
        sample(0, "0"),
        sample(50, "1"),
        sample(100, "2"),
    ])]);
    let ts = TimeSeries::new(&transport);
    let samples = ts
        .range("k", &RangeParams::all().filter_by_value(0.0, 2.0))
        .await
        .unwrap();
    assert_eq!(
        samples,
        vec![Sample::new(0, 0.0), Sample::new(50, 1.0), Sample::new(100, 2.0)]
    );
    assert_eq!(
        transport.last_sent().unwrap().tokens(),
        vec!["TS.RANGE", "k", "-", "+", "FILTER_BY_VALUE", "0", "2"]
    );
}

#[tokio::test]
async fn test_get_on_empty_series_is_absent() {
    let transport = ScriptedTransport::with_replies(vec![RespValue::empty_array()]);
    let ts = TimeSeries::new(&transport);
    assert_eq!(ts.get("empty", false).await.unwrap(), None);
}

#[tokio::test]
async fn test_dependent_option_without_aggregation_is_rejected_locally() {
    let transport = ScriptedTransport::new();
    let ts = TimeSeries::new(&transport);
    for params in [
        RangeParams::all().align(0i64),
        RangeParams::all().empty(),
        RangeParams::all().bucket_timestamp(redis_modules::timeseries::BucketTimestamp::Low),
    ] {
        let err = ts.rev_range("k", &params).await.unwrap_err();
        assert!(err.is_construction());
    }
    assert!(transport.sent().is_empty());
}

// ============================================================================
// Multi-series reads
// ============================================================================

#[tokio::test]
async fn test_mrange_grouped_round_trip() {
    let transport = ScriptedTransport::with_replies(vec![RespValue::array(vec![
        RespValue::array(vec![
            RespValue::bulk("room=kitchen"),
            RespValue::array(vec![
                label("room", "kitchen"),
                label("__reducer__", "avg"),
                label("__source__", "temp:1,temp:2"),
            ]),
            RespValue::array(vec![sample(0, "20.5")]),
        ]),
        RespValue::array(vec![
            RespValue::bulk("room=hall"),
            RespValue::array(vec![
                label("unit", "c"),
                label("extra", "1"),
                label("room", "hall"),
                label("__reducer__", "avg"),
                label("__source__", "temp:3"),
            ]),
            RespValue::array(vec![sample(0, "18")]),
        ]),
    ])]);
    let ts = TimeSeries::new(&transport);
    let params = MRangeParams::new(
        RangeParams::all().aggregation(Aggregation::Avg, 60_000),
        ["type=temp"],
    )
    .with_labels()
    .group_by("room", Reducer::Avg);

    let series = ts.mrange(&params).await.unwrap();
    assert_eq!(series.len(), 2);
    for entry in &series {
        assert_eq!(entry.labels[1].key, REDUCER_LABEL);
        assert_eq!(entry.labels[2].key, SOURCE_LABEL);
    }
    assert_eq!(series[0].labels[2].value, "temp:1,temp:2");
    assert_eq!(
        series[1].labels,
        vec![
            Label::new("room", "hall"),
            Label::new(REDUCER_LABEL, "avg"),
            Label::new(SOURCE_LABEL, "temp:3"),
            Label::new("unit", "c"),
            Label::new("extra", "1"),
        ]
    );
    assert_eq!(series[1].samples, vec![Sample::new(0, 18.0)]);

    let sent = transport.last_sent().unwrap();
    assert_eq!(sent.routing(), Some(RoutingHint::AnyShard));
    let tokens = sent.tokens();
    let filter_at = tokens.iter().position(|t| *t == "FILTER").unwrap();
    assert_eq!(&tokens[filter_at..], &["FILTER", "type=temp", "GROUPBY", "room", "REDUCE", "AVG"]);
}

#[tokio::test]
async fn test_mget_selected_labels_skip_missing() {
    let transport = ScriptedTransport::with_replies(vec![RespValue::array(vec![RespValue::array(
        vec![
            RespValue::bulk("temp:1"),
            RespValue::array(vec![
                label("unit", "c"),
                RespValue::array(vec![RespValue::bulk("site"), RespValue::nil()]),
            ]),
            sample(7, "3"),
        ],
    )])]);
    let ts = TimeSeries::new(&transport);
    let series = ts
        .mget(&MGetParams::new(["type=temp"]).selected_labels(["unit", "site"]))
        .await
        .unwrap();
    assert_eq!(series[0].labels, vec![Label::new("unit", "c")]);
    assert_eq!(series[0].sample, Some(Sample::new(7, 3.0)));
}

#[tokio::test]
async fn test_query_index() {
    let transport = ScriptedTransport::with_replies(vec![RespValue::array(vec![
        RespValue::bulk("temp:1"),
        RespValue::bulk("temp:2"),
    ])]);
    let ts = TimeSeries::new(&transport);
    let keys = ts.query_index(&["type=temp"]).await.unwrap();
    assert_eq!(keys, vec!["temp:1", "temp:2"]);
    assert_eq!(transport.last_sent().unwrap().routing(), Some(RoutingHint::AnyShard));
}

// ============================================================================
// Info
// ============================================================================

#[tokio::test]
async fn test_info_legacy_chunk_field() {
    let transport = ScriptedTransport::with_replies(vec![RespValue::array(vec![
        RespValue::simple("totalSamples"),
        RespValue::Integer(3),
        RespValue::simple("maxSamplesPerChunk"),
        RespValue::Integer(8),
    ])]);
    let ts = TimeSeries::new(&transport);
    let info = ts.info("old", false).await.unwrap();
    assert_eq!(info.chunk_size, 128);
    assert_eq!(info.memory_usage, -1);
}

// ============================================================================
// Blocking adapter
// ============================================================================

#[test]
fn test_blocking_facade() {
    let transport = ScriptedTransport::with_replies(vec![RespValue::array(vec![sample(0, "1")])]);
    let blocking = Blocking::new(TimeSeries::new(transport)).unwrap();
    let params = RangeParams::new(0i64, 10i64);
    let samples = blocking.call(|ts| ts.range("k", &params)).unwrap();
    assert_eq!(samples, vec![Sample::new(0, 1.0)]);
    assert_eq!(blocking.inner().transport().sent().len(), 1);
}
