//! Probabilistic filters and sketches
//!
//! Each submodule holds the builders, info decoder and async facade of one
//! structure. Builder functions are public so callers with their own
//! transport can still reuse the argument grammar.

pub mod bloom;
pub mod cms;
pub mod cuckoo;

pub use bloom::{Bloom, BloomInfo};
pub use cms::{CmsInfo, CountMinSketch};
pub use cuckoo::{Cuckoo, CuckooInfo};
