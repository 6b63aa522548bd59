use super::builder;
use super::decoder::{self, SeriesRange, SeriesSample};
use super::info::SeriesInfo;
use super::params::{
    AddParams, AlterParams, CreateParams, IncrByParams, LabelSelection, MGetParams, MRangeParams,
    RangeParams,
};
use super::types::{Rule, Sample, TimeStamp};
use crate::error::Result;
use crate::reply;
use crate::resp::RespValue;
use crate::transport::{dispatch, Transport};

/// Time-series commands over a transport.
#[derive(Debug, Clone)]
pub struct TimeSeries<T> {
    transport: T,
}

impl<T: Transport> TimeSeries<T> {
    pub fn new(transport: T) -> Self {
        TimeSeries { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn create(&self, key: &str, params: &CreateParams) -> Result<bool> {
        let reply = dispatch(&self.transport, builder::create(key, params)?).await?;
        Ok(reply::is_ok(&reply))
    }

    pub async fn alter(&self, key: &str, params: &AlterParams) -> Result<bool> {
        let reply = dispatch(&self.transport, builder::alter(key, params)?).await?;
        Ok(reply::is_ok(&reply))
    }

    pub async fn add(
        &self,
        key: &str,
        timestamp: impl Into<TimeStamp>,
        value: f64,
        params: &AddParams,
    ) -> Result<TimeStamp> {
        let command = builder::add(key, timestamp.into(), value, params)?;
        decoder::timestamp(&dispatch(&self.transport, command).await?)
    }

    pub async fn madd<K: AsRef<str>>(&self, samples: &[(K, TimeStamp, f64)]) -> Result<Vec<TimeStamp>> {
        let reply = dispatch(&self.transport, builder::madd(samples)?).await?;
        decoder::timestamps(&reply)
    }

    pub async fn incr_by(&self, key: &str, value: f64, params: &IncrByParams) -> Result<TimeStamp> {
        let reply = dispatch(&self.transport, builder::incr_by(key, value, params)?).await?;
        decoder::timestamp(&reply)
    }

    pub async fn decr_by(&self, key: &str, value: f64, params: &IncrByParams) -> Result<TimeStamp> {
        let reply = dispatch(&self.transport, builder::decr_by(key, value, params)?).await?;
        decoder::timestamp(&reply)
    }

    /// Number of samples removed.
    pub async fn del(
        &self,
        key: &str,
        from: impl Into<TimeStamp>,
        to: impl Into<TimeStamp>,
    ) -> Result<i64> {
        let reply = dispatch(&self.transport, builder::del(key, from.into(), to.into())?).await?;
        reply::as_i64(&reply)
    }

    pub async fn create_rule(
        &self,
        source_key: &str,
        rule: &Rule,
        align_timestamp: Option<i64>,
    ) -> Result<bool> {
        let command = builder::create_rule(source_key, rule, align_timestamp)?;
        Ok(reply::is_ok(&dispatch(&self.transport, command).await?))
    }

    pub async fn delete_rule(&self, source_key: &str, dest_key: &str) -> Result<bool> {
        let reply = dispatch(&self.transport, builder::delete_rule(source_key, dest_key)?).await?;
        Ok(reply::is_ok(&reply))
    }

    /// Last sample, `None` for an empty series.
    pub async fn get(&self, key: &str, latest: bool) -> Result<Option<Sample>> {
        let reply = dispatch(&self.transport, builder::get(key, latest)?).await?;
        decoder::sample(&reply)
    }

    pub async fn mget(&self, params: &MGetParams) -> Result<Vec<SeriesSample>> {
        let command = builder::mget(params)?;
        let reply = dispatch(&self.transport, command).await?;
        decoder::mget(&reply, &params.label_selection()?)
    }

    pub async fn range(&self, key: &str, params: &RangeParams) -> Result<Vec<Sample>> {
        let reply = dispatch(&self.transport, builder::range(key, params)?).await?;
        decoder::samples(&reply)
    }

    pub async fn rev_range(&self, key: &str, params: &RangeParams) -> Result<Vec<Sample>> {
        let reply = dispatch(&self.transport, builder::rev_range(key, params)?).await?;
        decoder::samples(&reply)
    }

    pub async fn mrange(&self, params: &MRangeParams) -> Result<Vec<SeriesRange>> {
        let reply = dispatch(&self.transport, builder::mrange(params)?).await?;
        decode_mrange(&reply, params)
    }

    pub async fn mrev_range(&self, params: &MRangeParams) -> Result<Vec<SeriesRange>> {
        let reply = dispatch(&self.transport, builder::mrev_range(params)?).await?;
        decode_mrange(&reply, params)
    }

    pub async fn query_index<S: AsRef<str>>(&self, filter: &[S]) -> Result<Vec<String>> {
        let reply = dispatch(&self.transport, builder::query_index(filter)?).await?;
        decoder::query_index(&reply)
    }

    pub async fn info(&self, key: &str, debug: bool) -> Result<SeriesInfo> {
        let reply = dispatch(&self.transport, builder::info(key, debug)?).await?;
        SeriesInfo::decode(&reply)
    }
}

fn decode_mrange(reply: &RespValue, params: &MRangeParams) -> Result<Vec<SeriesRange>> {
    let selection: LabelSelection = params.label_selection()?;
    decoder::mrange(reply, &selection, params.group_by.as_ref())
}
