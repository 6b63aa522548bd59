//! In-memory transport answering from a queue of canned replies.

use super::{Transport, TransportFuture};
use crate::command::Command;
use crate::error::Error;
use crate::resp::RespValue;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Records every command it receives and pops one queued reply per call.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<RespValue>>,
    sent: Mutex<Vec<Command>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: impl IntoIterator<Item = RespValue>) -> Self {
        ScriptedTransport {
            replies: Mutex::new(replies.into_iter().collect()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn push_reply(&self, reply: RespValue) {
        self.replies.lock().push_back(reply);
    }

    /// Commands received so far, oldest first.
    pub fn sent(&self) -> Vec<Command> {
        self.sent.lock().clone()
    }

    pub fn last_sent(&self) -> Option<Command> {
        self.sent.lock().last().cloned()
    }

    pub fn pending_replies(&self) -> usize {
        self.replies.lock().len()
    }
}

impl Transport for ScriptedTransport {
    fn execute<'a>(&'a self, command: &'a Command) -> TransportFuture<'a> {
        self.sent.lock().push(command.clone());
        let reply = self.replies.lock().pop_front();
        Box::pin(async move {
            reply.ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("no scripted reply for {}", command.name()),
                ))
            })
        })
    }
}
