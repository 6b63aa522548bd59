//! `TS.INFO` reply record.

use super::types::{Aggregation, DuplicatePolicy, Label, Rule, TimeStamp};
use crate::error::{Error, Result};
use crate::reply::{self, pairs, UNSET};
use crate::resp::RespValue;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Samples per chunk implied by one legacy `maxSamplesPerChunk` unit.
const LEGACY_CHUNK_FACTOR: i64 = 16;

/// One chunk of a series, reported with `TS.INFO key DEBUG`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkInfo {
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub samples: i64,
    pub size: i64,
    pub bytes_per_sample: f64,
}

impl Default for ChunkInfo {
    fn default() -> Self {
        ChunkInfo {
            start_timestamp: UNSET,
            end_timestamp: UNSET,
            samples: UNSET,
            size: UNSET,
            bytes_per_sample: f64::NAN,
        }
    }
}

/// Read-only snapshot of a series. Numeric fields absent from the reply
/// hold [`UNSET`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesInfo {
    pub total_samples: i64,
    pub memory_usage: i64,
    pub first_timestamp: Option<TimeStamp>,
    pub last_timestamp: Option<TimeStamp>,
    pub retention_time: i64,
    pub chunk_count: i64,
    pub chunk_size: i64,
    pub chunk_type: Option<String>,
    pub duplicate_policy: Option<DuplicatePolicy>,
    pub labels: Vec<Label>,
    pub source_key: Option<String>,
    pub rules: Vec<Rule>,
    pub key_self_name: Option<String>,
    pub chunks: Vec<ChunkInfo>,
}

impl Default for SeriesInfo {
    fn default() -> Self {
        SeriesInfo {
            total_samples: UNSET,
            memory_usage: UNSET,
            first_timestamp: None,
            last_timestamp: None,
            retention_time: UNSET,
            chunk_count: UNSET,
            chunk_size: UNSET,
            chunk_type: None,
            duplicate_policy: None,
            labels: Vec::new(),
            source_key: None,
            rules: Vec::new(),
            key_self_name: None,
            chunks: Vec::new(),
        }
    }
}

impl SeriesInfo {
    /// Decode the flat label/value reply. Unknown labels are skipped.
    pub fn decode(reply: &RespValue) -> Result<Self> {
        let mut info = SeriesInfo::default();
        for (label, value) in pairs(reply, "TS.INFO reply")? {
            match label.as_str() {
                "totalSamples" => info.total_samples = reply::as_i64(value)?,
                "memoryUsage" => info.memory_usage = reply::as_i64(value)?,
                "firstTimestamp" => info.first_timestamp = Some(reply::as_i64(value)?.into()),
                "lastTimestamp" => info.last_timestamp = Some(reply::as_i64(value)?.into()),
                "retentionTime" => info.retention_time = reply::as_i64(value)?,
                "chunkCount" => info.chunk_count = reply::as_i64(value)?,
                "chunkSize" => info.chunk_size = reply::as_i64(value)?,
                // Pre-1.4 servers. Whichever of the two fields comes last wins.
                "maxSamplesPerChunk" => {
                    let legacy = reply::as_i64(value)?;
                    let chunk_size = legacy.checked_mul(LEGACY_CHUNK_FACTOR).ok_or_else(|| {
                        Error::decode(format!("maxSamplesPerChunk {} is out of range", legacy))
                    })?;
                    debug!(
                        "Normalizing legacy maxSamplesPerChunk={} to chunkSize={}",
                        legacy, chunk_size
                    );
                    info.chunk_size = chunk_size;
                }
                "chunkType" => info.chunk_type = reply::as_opt_string(value)?,
                "duplicatePolicy" => {
                    info.duplicate_policy = reply::as_opt_string(value)?
                        .map(|s| s.parse::<DuplicatePolicy>())
                        .transpose()?
                }
                "labels" => info.labels = decode_label_pairs(value)?,
                "sourceKey" => info.source_key = reply::as_opt_string(value)?,
                "rules" => info.rules = decode_rules(value)?,
                "keySelfName" => info.key_self_name = reply::as_opt_string(value)?,
                "Chunks" => info.chunks = decode_chunks(value)?,
                _ => {}
            }
        }
        Ok(info)
    }
}

/// `[[key, value], ...]` label list as `TS.INFO` reports it.
fn decode_label_pairs(value: &RespValue) -> Result<Vec<Label>> {
    let Some(items) = reply::as_opt_array(value)? else {
        return Ok(Vec::new());
    };
    items
        .iter()
        .map(|item| {
            let pair = reply::expect_arity(item, 2, "label pair")?;
            Ok(Label::new(
                reply::as_string(&pair[0])?,
                reply::as_string(&pair[1])?,
            ))
        })
        .collect()
}

/// `[[dest, bucket, aggregation(, align)], ...]`. The alignment column
/// added by newer servers is ignored.
fn decode_rules(value: &RespValue) -> Result<Vec<Rule>> {
    let Some(items) = reply::as_opt_array(value)? else {
        return Ok(Vec::new());
    };
    items
        .iter()
        .map(|item| {
            let fields = reply::expect_array(item, "compaction rule")?;
            if fields.len() < 3 {
                return Err(Error::decode(format!(
                    "compaction rule must have at least 3 elements, got {}",
                    fields.len()
                )));
            }
            Ok(Rule::new(
                reply::as_string(&fields[0])?,
                reply::as_i64(&fields[1])?,
                reply::as_string(&fields[2])?.parse::<Aggregation>()?,
            ))
        })
        .collect()
}

fn decode_chunks(value: &RespValue) -> Result<Vec<ChunkInfo>> {
    let Some(items) = reply::as_opt_array(value)? else {
        return Ok(Vec::new());
    };
    items
        .iter()
        .map(|item| {
            let mut chunk = ChunkInfo::default();
            for (label, value) in pairs(item, "chunk record")? {
                match label.as_str() {
                    "startTimestamp" => chunk.start_timestamp = reply::as_i64(value)?,
                    "endTimestamp" => chunk.end_timestamp = reply::as_i64(value)?,
                    "samples" => chunk.samples = reply::as_i64(value)?,
                    "size" => chunk.size = reply::as_i64(value)?,
                    "bytesPerSample" => chunk.bytes_per_sample = reply::as_f64(value)?,
                    _ => {}
                }
            }
            Ok(chunk)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, value: RespValue) -> [RespValue; 2] {
        [RespValue::simple(name), value]
    }

    fn info_reply(fields: Vec<[RespValue; 2]>) -> RespValue {
        RespValue::array(fields.into_iter().flatten().collect())
    }

    #[test]
    fn test_full_info_record() {
        let reply = info_reply(vec![
            field("totalSamples", RespValue::Integer(4)),
            field("memoryUsage", RespValue::Integer(4184)),
            field("firstTimestamp", RespValue::Integer(0)),
            field("lastTimestamp", RespValue::Integer(150)),
            field("retentionTime", RespValue::Integer(0)),
            field("chunkCount", RespValue::Integer(1)),
            field("chunkSize", RespValue::Integer(4096)),
            field("chunkType", RespValue::simple("compressed")),
            field("duplicatePolicy", RespValue::nil()),
            field(
                "labels",
                RespValue::array(vec![RespValue::array(vec![
                    RespValue::bulk("sensor"),
                    RespValue::bulk("7"),
                ])]),
            ),
            field("sourceKey", RespValue::nil()),
            field(
                "rules",
                RespValue::array(vec![RespValue::array(vec![
                    RespValue::bulk("temp:avg"),
                    RespValue::Integer(60000),
                    RespValue::simple("AVG"),
                    RespValue::Integer(0),
                ])]),
            ),
        ]);
        let info = SeriesInfo::decode(&reply).unwrap();
        assert_eq!(info.total_samples, 4);
        assert_eq!(info.first_timestamp, Some(TimeStamp::Milliseconds(0)));
        assert_eq!(info.last_timestamp, Some(TimeStamp::Milliseconds(150)));
        assert_eq!(info.chunk_size, 4096);
        assert_eq!(info.chunk_type.as_deref(), Some("compressed"));
        assert_eq!(info.duplicate_policy, None);
        assert_eq!(info.labels, vec![Label::new("sensor", "7")]);
        assert_eq!(info.source_key, None);
        assert_eq!(
            info.rules,
            vec![Rule::new("temp:avg", 60000, Aggregation::Avg)]
        );
    }

    #[test]
    fn test_unseen_numeric_fields_are_unset() {
        let reply = info_reply(vec![
            field("totalSamples", RespValue::Integer(0)),
            field("someFutureField", RespValue::bulk("whatever")),
        ]);
        let info = SeriesInfo::decode(&reply).unwrap();
        assert_eq!(info.total_samples, 0);
        assert_eq!(info.memory_usage, UNSET);
        assert_eq!(info.chunk_size, UNSET);
        assert_eq!(info.first_timestamp, None);
        assert!(info.rules.is_empty());
    }

    #[test]
    fn test_legacy_max_samples_per_chunk() {
        let reply = info_reply(vec![field("maxSamplesPerChunk", RespValue::Integer(8))]);
        assert_eq!(SeriesInfo::decode(&reply).unwrap().chunk_size, 128);
    }

    #[test]
    fn test_legacy_chunk_field_overflow_is_decode_error() {
        let reply = info_reply(vec![field(
            "maxSamplesPerChunk",
            RespValue::Integer(i64::MAX / 8),
        )]);
        assert!(SeriesInfo::decode(&reply).unwrap_err().is_decode());
    }

    #[test]
    fn test_legacy_and_modern_fields_last_seen_wins() {
        let modern_last = info_reply(vec![
            field("maxSamplesPerChunk", RespValue::Integer(8)),
            field("chunkSize", RespValue::Integer(4096)),
        ]);
        assert_eq!(SeriesInfo::decode(&modern_last).unwrap().chunk_size, 4096);

        let legacy_last = info_reply(vec![
            field("chunkSize", RespValue::Integer(4096)),
            field("maxSamplesPerChunk", RespValue::Integer(8)),
        ]);
        assert_eq!(SeriesInfo::decode(&legacy_last).unwrap().chunk_size, 128);
    }

    #[test]
    fn test_duplicate_policy_and_source_key() {
        let reply = info_reply(vec![
            field("duplicatePolicy", RespValue::bulk("block")),
            field("sourceKey", RespValue::bulk("raw")),
        ]);
        let info = SeriesInfo::decode(&reply).unwrap();
        assert_eq!(info.duplicate_policy, Some(DuplicatePolicy::Block));
        assert_eq!(info.source_key.as_deref(), Some("raw"));
    }

    #[test]
    fn test_debug_chunks() {
        let chunk = RespValue::array(vec![
            RespValue::simple("startTimestamp"),
            RespValue::Integer(0),
            RespValue::simple("endTimestamp"),
            RespValue::Integer(150),
            RespValue::simple("samples"),
            RespValue::Integer(4),
            RespValue::simple("size"),
            RespValue::Integer(4096),
            RespValue::simple("bytesPerSample"),
            RespValue::bulk("1024"),
        ]);
        let reply = info_reply(vec![
            field("keySelfName", RespValue::bulk("temp")),
            field("Chunks", RespValue::array(vec![chunk])),
        ]);
        let info = SeriesInfo::decode(&reply).unwrap();
        assert_eq!(info.key_self_name.as_deref(), Some("temp"));
        assert_eq!(info.chunks.len(), 1);
        assert_eq!(info.chunks[0].end_timestamp, 150);
        assert_eq!(info.chunks[0].bytes_per_sample, 1024.0);
    }

    #[test]
    fn test_shape_mismatches_are_decode_errors() {
        let odd = RespValue::array(vec![RespValue::simple("totalSamples")]);
        assert!(SeriesInfo::decode(&odd).unwrap_err().is_decode());

        let short_rule = info_reply(vec![field(
            "rules",
            RespValue::array(vec![RespValue::array(vec![
                RespValue::bulk("dest"),
                RespValue::Integer(10),
            ])]),
        )]);
        assert!(SeriesInfo::decode(&short_rule).unwrap_err().is_decode());
    }
}
