//! Time-series module (`TS.*`)
//!
//! Layered the same way as every other module in the crate:
//! - `types`: value types and wire enums
//! - `params`: per-command parameter bundles with their validation
//! - `builder`: parameter bundle to [`Command`](crate::command::Command)
//! - `decoder` / `info`: raw reply to typed result
//! - `client`: the async [`TimeSeries`] facade tying the three together
//!
//! Builders and decoders are pure functions and can be used without a
//! transport, e.g. to feed a pipeline owned by another client.

pub mod builder;
mod client;
pub mod decoder;
mod info;
mod params;
mod types;

pub use client::TimeSeries;
pub use decoder::{GroupInfo, SeriesRange, SeriesSample, REDUCER_LABEL, SOURCE_LABEL};
pub use info::{ChunkInfo, SeriesInfo};
pub use params::{
    AddParams, AlterParams, CreateParams, GroupBy, IncrByParams, LabelSelection, MGetParams,
    MRangeParams, RangeParams,
};
pub use types::{
    Aggregation, BucketTimestamp, DuplicatePolicy, Encoding, Label, Reducer, Rule, Sample,
    TimeStamp,
};
