pub mod command;
pub mod config;
pub mod error;
pub mod graph;
pub mod json;
pub mod probabilistic;
pub mod reply;
pub mod resp;
pub mod tdigest;
pub mod timeseries;
pub mod topk;
pub mod transport;

pub use command::{ArgList, Command, CommandName, Keyword, RoutingHint, ToArg};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use graph::Graph;
pub use json::Json;
pub use probabilistic::{Bloom, CountMinSketch, Cuckoo};
pub use resp::{RespParser, RespValue};
pub use tdigest::TDigest;
pub use timeseries::TimeSeries;
pub use topk::TopK;
pub use transport::{dispatch, Blocking, RespConnection, ScriptedTransport, Transport};
