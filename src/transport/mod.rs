//! Transport seam
//!
//! Module facades never talk to a socket directly. They hand a finished
//! [`Command`] to a [`Transport`] and decode whatever [`RespValue`] comes back.
//!
//! Implementations:
//! - `RespConnection`: one RESP stream (TCP or any tokio byte stream)
//! - `ScriptedTransport`: canned replies for unit and integration tests
//!
//! [`Blocking`] turns any async facade into a synchronous one by owning a
//! current-thread runtime and blocking on each call.

mod connection;
mod scripted;

pub use connection::RespConnection;
pub use scripted::ScriptedTransport;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::resp::RespValue;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

pub type TransportFuture<'a> = BoxFuture<'a, Result<RespValue>>;

/// Sends one command and yields its raw reply.
///
/// Error replies are returned as `RespValue::Error`; mapping them to
/// [`Error::Server`] is done by [`dispatch`].
pub trait Transport: Send + Sync {
    fn execute<'a>(&'a self, command: &'a Command) -> TransportFuture<'a>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute<'a>(&'a self, command: &'a Command) -> TransportFuture<'a> {
        (**self).execute(command)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute<'a>(&'a self, command: &'a Command) -> TransportFuture<'a> {
        (**self).execute(command)
    }
}

/// Send `command` and turn a top-level error reply into [`Error::Server`].
pub async fn dispatch<T: Transport + ?Sized>(transport: &T, command: Command) -> Result<RespValue> {
    debug!(
        command = %command.name(),
        args = command.args().len(),
        routing = ?command.routing(),
        "dispatching module command"
    );
    match transport.execute(&command).await? {
        RespValue::Error(msg) => Err(Error::Server(msg)),
        reply => Ok(reply),
    }
}

/// Synchronous adapter over an async facade.
pub struct Blocking<M> {
    inner: M,
    runtime: tokio::runtime::Runtime,
}

impl<M> Blocking<M> {
    pub fn new(inner: M) -> Result<Self> {
        Ok(Blocking {
            inner,
            runtime: Self::runtime()?,
        })
    }

    /// Build the facade inside the adapter's runtime, e.g. when it needs an
    /// async connect first.
    pub fn try_new_with<F, Fut>(make: F) -> Result<Self>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<M>>,
    {
        let runtime = Self::runtime()?;
        let inner = runtime.block_on(make())?;
        Ok(Blocking { inner, runtime })
    }

    fn runtime() -> Result<tokio::runtime::Runtime> {
        Ok(tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?)
    }

    /// Run one async facade operation to completion.
    pub fn call<'a, F, Fut, R>(&'a self, op: F) -> R
    where
        F: FnOnce(&'a M) -> Fut,
        Fut: Future<Output = R> + 'a,
    {
        self.runtime.block_on(op(&self.inner))
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}
