//! Single RESP stream transport.
//!
//! Writes one request frame, then reads until one complete reply frame is
//! buffered. Requests are serialized through a mutex so replies pair with
//! their requests.

use super::{Transport, TransportFuture};
use crate::command::Command;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::resp::{RespParser, RespValue};
use bytes::BytesMut;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, warn};

struct StreamState<S> {
    stream: S,
    buffer: BytesMut,
    /// Set while a request is outstanding and left set when its reply is
    /// abandoned, so bytes still in flight never pair with the next request.
    poisoned: bool,
}

pub struct RespConnection<S> {
    state: Mutex<StreamState<S>>,
    response_timeout: Option<Duration>,
}

impl RespConnection<TcpStream> {
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let stream = TcpStream::connect(&config.addr).await.map_err(|e| {
            warn!("Failed to connect to {}: {}", config.addr, e);
            e
        })?;
        stream.set_nodelay(true)?;
        debug!("Connected to {}", config.addr);
        Ok(Self::new(stream, config))
    }
}

impl<S> RespConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, config: &ClientConfig) -> Self {
        RespConnection {
            state: Mutex::new(StreamState {
                stream,
                buffer: BytesMut::with_capacity(config.read_buffer_capacity),
                poisoned: false,
            }),
            response_timeout: config.response_timeout_ms.map(Duration::from_millis),
        }
    }

    async fn round_trip(&self, command: &Command) -> Result<RespValue> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if state.poisoned {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "connection lost reply pairing after an earlier failed request",
            )));
        }

        state.poisoned = true;
        let result = Self::exchange(state, command, self.response_timeout).await;
        match &result {
            Ok(_) => state.poisoned = false,
            Err(e) => {
                warn!("Marking connection broken after failed {}: {}", command.name(), e);
                state.buffer.clear();
            }
        }
        result
    }

    async fn exchange(
        state: &mut StreamState<S>,
        command: &Command,
        response_timeout: Option<Duration>,
    ) -> Result<RespValue> {
        let mut out = BytesMut::new();
        RespParser::encode_into(&command.to_resp(), &mut out);
        state.stream.write_all(&out).await?;
        state.stream.flush().await?;

        match response_timeout {
            Some(limit) => tokio::time::timeout(limit, Self::read_reply(state))
                .await
                .unwrap_or_else(|_| {
                    warn!("Timed out waiting for {} reply", command.name());
                    Err(Error::Io(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        format!("no reply to {} within {:?}", command.name(), limit),
                    )))
                }),
            None => Self::read_reply(state).await,
        }
    }

    async fn read_reply(state: &mut StreamState<S>) -> Result<RespValue> {
        loop {
            if let Some(reply) = RespParser::decode(&mut state.buffer)? {
                return Ok(reply);
            }
            let n = state.stream.read_buf(&mut state.buffer).await?;
            if n == 0 {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed before a full reply arrived",
                )));
            }
        }
    }
}

impl<S> Transport for RespConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn execute<'a>(&'a self, command: &'a Command) -> TransportFuture<'a> {
        Box::pin(self.round_trip(command))
    }
}
