//! Module Facade Integration Tests
//!
//! Exercises the probabilistic, top-k, t-digest, JSON and graph facades
//! end to end over the scripted transport and over a RESP stream.

use redis_modules::graph::{GraphValue, Query};
use redis_modules::json::{GetParams, SetCondition, ROOT};
use redis_modules::probabilistic::{bloom, cuckoo};
use redis_modules::tdigest::MergeParams;
use redis_modules::topk::ReserveParams;
use redis_modules::{
    Bloom, ClientConfig, CountMinSketch, Cuckoo, Error, Graph, Json, RespConnection, RespValue,
    ScriptedTransport, TDigest, TopK,
};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Route dispatch and connection logs to the test output; `RUST_LOG=debug`
/// shows every command sent.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Probabilistic filters
// ============================================================================

#[tokio::test]
async fn test_bloom_lifecycle() {
    let transport = ScriptedTransport::with_replies(vec![
        RespValue::ok(),
        RespValue::array(vec![RespValue::Integer(1), RespValue::Integer(1)]),
        RespValue::array(vec![RespValue::Integer(1), RespValue::Integer(0)]),
    ]);
    let filter = Bloom::new(&transport);

    assert!(filter
        .reserve("seen", 0.001, 10_000, &bloom::ReserveParams::new().non_scaling())
        .await
        .unwrap());
    assert_eq!(
        filter
            .insert("seen", &["a", "b"], &bloom::InsertParams::new().no_create())
            .await
            .unwrap(),
        vec![true, true]
    );
    assert_eq!(
        filter.mexists("seen", &["a", "z"]).await.unwrap(),
        vec![true, false]
    );

    let sent = transport.sent();
    assert_eq!(
        sent[0].tokens(),
        vec!["BF.RESERVE", "seen", "0.001", "10000", "NONSCALING"]
    );
    assert_eq!(
        sent[1].tokens(),
        vec!["BF.INSERT", "seen", "NOCREATE", "ITEMS", "a", "b"]
    );
}

#[tokio::test]
async fn test_cuckoo_conflicting_insert_options_rejected() {
    let transport = ScriptedTransport::new();
    let cf = Cuckoo::new(&transport);
    let err = cf
        .insert(
            "cf",
            &["a"],
            &cuckoo::InsertParams::new().capacity(10).no_create(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.param(), Some("no_create"));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_cms_incr_and_info() {
    let transport = ScriptedTransport::with_replies(vec![
        RespValue::array(vec![RespValue::Integer(4), RespValue::Integer(1)]),
        RespValue::array(vec![
            RespValue::simple("width"),
            RespValue::Integer(100),
            RespValue::simple("depth"),
            RespValue::Integer(5),
            RespValue::simple("count"),
            RespValue::Integer(5),
        ]),
    ]);
    let cms = CountMinSketch::new(&transport);
    assert_eq!(
        cms.incr_by("visits", &[("home", 4), ("about", 1)]).await.unwrap(),
        vec![4, 1]
    );
    let info = cms.info("visits").await.unwrap();
    assert_eq!((info.width, info.depth, info.count), (100, 5, 5));
}

#[tokio::test]
async fn test_concurrent_counts_pair_with_replies() {
    let transport = ScriptedTransport::with_replies(vec![
        RespValue::Integer(3),
        RespValue::Integer(0),
    ]);
    let cf = Cuckoo::new(&transport);
    let counts = futures::future::join_all(vec![cf.count("cf", "a"), cf.count("cf", "b")]).await;
    let counts: Vec<i64> = counts.into_iter().map(|c| c.unwrap()).collect();
    assert_eq!(counts, vec![3, 0]);
    assert_eq!(transport.sent()[1].tokens(), vec!["CF.COUNT", "cf", "b"]);
}

// ============================================================================
// Top-K and t-digest
// ============================================================================

#[tokio::test]
async fn test_topk_reserve_and_list() {
    let transport = ScriptedTransport::with_replies(vec![
        RespValue::ok(),
        RespValue::array(vec![RespValue::bulk("x"), RespValue::Integer(9)]),
    ]);
    let topk = TopK::new(&transport);
    assert!(topk
        .reserve("tk", 10, &ReserveParams::dimensions(50, 4, 0.9))
        .await
        .unwrap());
    let entries = topk.list("tk", true).await.unwrap();
    assert_eq!(entries[0].item, "x");
    assert_eq!(entries[0].count, Some(9));
    assert_eq!(
        transport.last_sent().unwrap().tokens(),
        vec!["TOPK.LIST", "tk", "WITHCOUNT"]
    );
}

#[tokio::test]
async fn test_tdigest_merge_and_quantiles() {
    let transport = ScriptedTransport::with_replies(vec![
        RespValue::ok(),
        RespValue::array(vec![RespValue::bulk("1.5"), RespValue::bulk("9")]),
    ]);
    let digest = TDigest::new(&transport);
    assert!(digest
        .merge("all", &["a", "b", "c"], &MergeParams::new().override_dest())
        .await
        .unwrap());
    assert_eq!(
        digest.quantile("all", &[0.1, 0.9]).await.unwrap(),
        vec![1.5, 9.0]
    );
    assert_eq!(
        transport.sent()[0].tokens(),
        vec!["TDIGEST.MERGE", "all", "3", "a", "b", "c", "OVERRIDE"]
    );
}

// ============================================================================
// JSON and graph
// ============================================================================

#[tokio::test]
async fn test_json_set_get_mget() {
    let transport = ScriptedTransport::with_replies(vec![
        RespValue::ok(),
        RespValue::bulk(r#"[{"n":1}]"#),
        RespValue::array(vec![RespValue::bulk("[1]"), RespValue::nil()]),
    ]);
    let doc = Json::new(&transport);
    assert!(doc
        .set("d", ROOT, &json!({"n": 1}), Some(SetCondition::Nx))
        .await
        .unwrap());
    assert_eq!(
        doc.get("d", &GetParams::new().path(ROOT)).await.unwrap(),
        Some(json!([{"n": 1}]))
    );
    assert_eq!(
        doc.mget(&["d", "missing"], "$.n").await.unwrap(),
        vec![Some(json!([1])), None]
    );
}

#[tokio::test]
async fn test_graph_query_with_params() {
    let transport = ScriptedTransport::with_replies(vec![RespValue::array(vec![
        RespValue::array(vec![RespValue::bulk("p.age")]),
        RespValue::array(vec![RespValue::array(vec![RespValue::Integer(33)])]),
        RespValue::array(vec![RespValue::bulk(
            "Query internal execution time: 0.4 milliseconds",
        )]),
    ])]);
    let graph = Graph::new(&transport);
    let result = graph
        .ro_query(
            "social",
            &Query::new("MATCH (p:Person {name: $name}) RETURN p.age").param("name", "Ana"),
        )
        .await
        .unwrap();
    assert_eq!(result.header, vec!["p.age"]);
    assert_eq!(result.rows, vec![vec![GraphValue::Integer(33)]]);
    assert_eq!(result.stats.execution_time_ms(), Some(0.4));
    assert_eq!(
        transport.last_sent().unwrap().args()[1],
        r#"CYPHER name="Ana" MATCH (p:Person {name: $name}) RETURN p.age"#
    );
}

#[tokio::test]
async fn test_graph_runtime_error_inside_reply() {
    let transport = ScriptedTransport::with_replies(vec![RespValue::array(vec![
        RespValue::Error("Type mismatch: expected Integer".to_string()),
    ])]);
    let graph = Graph::new(&transport);
    let err = graph.query("g", &Query::new("RETURN 1 + 'a'")).await.unwrap_err();
    assert!(matches!(err, Error::Server(_)));
}

// ============================================================================
// RESP stream transport
// ============================================================================

#[tokio::test]
async fn test_facade_over_resp_stream() {
    init_tracing();
    let (client, mut server) = tokio::io::duplex(4096);
    let server_task = tokio::spawn(async move {
        let mut buf = vec![0u8; 256];
        let n = server.read(&mut buf).await.unwrap();
        server.write_all(b":1\r\n").await.unwrap();
        buf.truncate(n);
        buf
    });

    let connection = Arc::new(RespConnection::new(client, &ClientConfig::default()));
    let bloom = Bloom::new(connection.clone());
    assert!(bloom.add("seen", "item").await.unwrap());

    let request = server_task.await.unwrap();
    assert_eq!(
        request,
        b"*3\r\n$6\r\nBF.ADD\r\n$4\r\nseen\r\n$4\r\nitem\r\n".to_vec()
    );
}
