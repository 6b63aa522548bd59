//! Command values produced by the argument builders.
//!
//! A [`Command`] pairs a module command name with an optional routing hint
//! and the finished, ordered argument vector. Builders write arguments
//! through [`ArgList`], which only ever emits an option keyword together with
//! its value.

mod tokens;

pub use tokens::{CommandName, Keyword};

use crate::error::{Error, Result};
use crate::resp::RespValue;

/// Request-routing hint for sharded deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutingHint {
    /// Read-only command that may be served by any shard.
    AnyShard,
}

/// Conversion of a typed parameter into its wire token.
pub trait ToArg {
    fn to_arg(&self) -> String;
}

impl ToArg for str {
    fn to_arg(&self) -> String {
        self.to_string()
    }
}

impl ToArg for String {
    fn to_arg(&self) -> String {
        self.clone()
    }
}

impl ToArg for Keyword {
    fn to_arg(&self) -> String {
        self.as_str().to_string()
    }
}

impl<T: ToArg + ?Sized> ToArg for &T {
    fn to_arg(&self) -> String {
        (**self).to_arg()
    }
}

macro_rules! display_to_arg {
    ($($ty:ty),+) => {
        $(impl ToArg for $ty {
            fn to_arg(&self) -> String {
                self.to_string()
            }
        })+
    };
}

display_to_arg!(i32, i64, u32, u64, usize, f64);

/// Fail with a construction error naming `param` when a required variadic
/// list is empty.
pub(crate) fn require_non_empty<T>(param: &'static str, items: &[T]) -> Result<()> {
    if items.is_empty() {
        return Err(Error::construction(param, "at least one element is required"));
    }
    Ok(())
}

/// Append-only argument writer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgList {
    args: Vec<String>,
}

impl ArgList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<T: ToArg + ?Sized>(&mut self, value: &T) -> &mut Self {
        self.args.push(value.to_arg());
        self
    }

    pub fn keyword(&mut self, keyword: Keyword) -> &mut Self {
        self.args.push(keyword.as_str().to_string());
        self
    }

    /// Emit `keyword` only when `on` is set.
    pub fn flag(&mut self, keyword: Keyword, on: bool) -> &mut Self {
        if on {
            self.keyword(keyword);
        }
        self
    }

    /// Emit `keyword value` only when the value is present.
    pub fn opt<T: ToArg>(&mut self, keyword: Keyword, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.keyword(keyword);
            self.args.push(value.to_arg());
        }
        self
    }

    pub fn extend<I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        self.args.extend(values.into_iter().map(|v| v.to_arg()));
        self
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn into_command(self, name: CommandName) -> Command {
        Command::new(name, self)
    }
}

/// Immutable module command ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: CommandName,
    routing: Option<RoutingHint>,
    args: Vec<String>,
}

impl Command {
    /// Read-only multi-key commands get [`RoutingHint::AnyShard`]; all others
    /// route by key.
    pub fn new(name: CommandName, args: ArgList) -> Self {
        let routing = name
            .is_read_only_multi_key()
            .then_some(RoutingHint::AnyShard);
        Command {
            name,
            routing,
            args: args.args,
        }
    }

    pub fn name(&self) -> CommandName {
        self.name
    }

    pub fn routing(&self) -> Option<RoutingHint> {
        self.routing
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Command name followed by every argument.
    pub fn tokens(&self) -> Vec<&str> {
        std::iter::once(self.name.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    /// RESP request frame: an array of bulk strings, name first.
    pub fn to_resp(&self) -> RespValue {
        let mut frame = Vec::with_capacity(self.args.len() + 1);
        frame.push(RespValue::bulk(self.name.as_str()));
        frame.extend(self.args.iter().map(RespValue::bulk));
        RespValue::array(frame)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.tokens().join(" "))
    }
}
