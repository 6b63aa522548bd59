//! Core time-series value types.

use crate::command::ToArg;
use crate::error::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A point in time as the server understands it.
///
/// Only `Milliseconds` carries a concrete instant; the symbolic variants are
/// resolved by the server (`-` earliest, `+` latest, `*` current server time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeStamp {
    Milliseconds(i64),
    Min,
    Max,
    Auto,
}

impl TimeStamp {
    pub fn is_symbolic(&self) -> bool {
        !matches!(self, TimeStamp::Milliseconds(_))
    }

    /// Unix milliseconds. Fails for the symbolic variants.
    pub fn as_millis(&self) -> Result<i64> {
        match self {
            TimeStamp::Milliseconds(ms) => Ok(*ms),
            other => Err(Error::construction(
                "timestamp",
                format!("symbolic timestamp {} has no numeric value", other),
            )),
        }
    }

    pub fn to_datetime(&self) -> Result<DateTime<Utc>> {
        let ms = self.as_millis()?;
        Utc.timestamp_millis_opt(ms).single().ok_or_else(|| {
            Error::construction("timestamp", format!("{} ms is out of calendar range", ms))
        })
    }
}

impl From<i64> for TimeStamp {
    fn from(ms: i64) -> Self {
        TimeStamp::Milliseconds(ms)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for TimeStamp {
    fn from(dt: DateTime<Tz>) -> Self {
        TimeStamp::Milliseconds(dt.timestamp_millis())
    }
}

impl TryFrom<TimeStamp> for i64 {
    type Error = Error;

    fn try_from(ts: TimeStamp) -> Result<i64> {
        ts.as_millis()
    }
}

impl FromStr for TimeStamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "-" => Ok(TimeStamp::Min),
            "+" => Ok(TimeStamp::Max),
            "*" => Ok(TimeStamp::Auto),
            _ => s.parse::<i64>().map(TimeStamp::Milliseconds).map_err(|_| {
                Error::construction(
                    "timestamp",
                    format!("{:?} is neither milliseconds nor one of \"-\", \"+\", \"*\"", s),
                )
            }),
        }
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeStamp::Milliseconds(ms) => write!(f, "{}", ms),
            TimeStamp::Min => f.write_str("-"),
            TimeStamp::Max => f.write_str("+"),
            TimeStamp::Auto => f.write_str("*"),
        }
    }
}

impl ToArg for TimeStamp {
    fn to_arg(&self) -> String {
        self.to_string()
    }
}

/// Metadata pair attached to a series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub key: String,
    pub value: String,
}

impl Label {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Label {
            key: key.into(),
            value: value.into(),
        }
    }

    /// `key=value` filter expression matching this label.
    pub fn filter(&self) -> String {
        format!("{}={}", self.key, self.value)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// One (timestamp, value) sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: TimeStamp,
    pub value: f64,
}

impl Sample {
    pub fn new(millis: i64, value: f64) -> Self {
        Sample {
            time: TimeStamp::Milliseconds(millis),
            value,
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.time, self.value)
    }
}

/// Standing compaction from a source series into `dest_key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub dest_key: String,
    pub bucket_duration: i64,
    pub aggregation: Aggregation,
}

impl Rule {
    pub fn new(dest_key: impl Into<String>, bucket_duration: i64, aggregation: Aggregation) -> Self {
        Rule {
            dest_key: dest_key.into(),
            bucket_duration,
            aggregation,
        }
    }
}

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $what:literal { $($variant:ident => $wire:literal,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ToArg for $name {
            fn to_arg(&self) -> String {
                self.as_str().to_string()
            }
        }

        /// Case-insensitive; servers report these in either case.
        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| Error::decode(format!("unknown {} {:?}", $what, s)))
            }
        }
    };
}

wire_enum! {
    /// Bucket aggregation applied by range queries and compaction rules.
    Aggregation, "aggregation" {
        Avg => "AVG",
        Sum => "SUM",
        Min => "MIN",
        Max => "MAX",
        Range => "RANGE",
        Count => "COUNT",
        First => "FIRST",
        Last => "LAST",
        StdP => "STD.P",
        StdS => "STD.S",
        VarP => "VAR.P",
        VarS => "VAR.S",
        Twa => "TWA",
    }
}

wire_enum! {
    /// Cross-series reducer for grouped multi-series queries.
    Reducer, "reducer" {
        Sum => "SUM",
        Min => "MIN",
        Max => "MAX",
        Avg => "AVG",
        Range => "RANGE",
        Count => "COUNT",
        StdP => "STD.P",
        StdS => "STD.S",
        VarP => "VAR.P",
        VarS => "VAR.S",
    }
}

wire_enum! {
    /// Policy for a sample whose timestamp already exists.
    DuplicatePolicy, "duplicate policy" {
        Block => "BLOCK",
        First => "FIRST",
        Last => "LAST",
        Min => "MIN",
        Max => "MAX",
        Sum => "SUM",
    }
}

wire_enum! {
    /// Chunk encoding of a series.
    Encoding, "encoding" {
        Compressed => "COMPRESSED",
        Uncompressed => "UNCOMPRESSED",
    }
}

wire_enum! {
    /// Which timestamp of an aggregation bucket is reported.
    BucketTimestamp, "bucket timestamp" {
        Low => "-",
        High => "+",
        Mid => "~",
    }
}
