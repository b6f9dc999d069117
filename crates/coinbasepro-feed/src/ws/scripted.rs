//! In-memory transport replaying canned frames

use std::collections::VecDeque;

use async_trait::async_trait;

use super::connection::FeedTransport;
use crate::error::{FeedError, Result};

#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    inbound: VecDeque<String>,
    pub(crate) sent: Vec<String>,
    pub(crate) closed: bool,
}

impl ScriptedTransport {
    pub(crate) fn new<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = serde_json::Value>,
    {
        Self {
            inbound: frames.into_iter().map(|frame| frame.to_string()).collect(),
            ..Default::default()
        }
    }

    pub(crate) fn push_raw(&mut self, raw: &str) {
        self.inbound.push_back(raw.to_string());
    }

    pub(crate) fn remaining(&self) -> usize {
        self.inbound.len()
    }
}

#[async_trait]
impl FeedTransport for ScriptedTransport {
    async fn send_text(&mut self, text: String) -> Result<()> {
        if self.closed {
            return Err(FeedError::ConnectionClosed);
        }
        self.sent.push(text);
        Ok(())
    }

    async fn recv_text(&mut self) -> Result<String> {
        self.inbound.pop_front().ok_or(FeedError::ConnectionClosed)
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
