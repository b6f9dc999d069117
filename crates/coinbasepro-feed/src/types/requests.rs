/*
[INPUT]:  Channel names and product identifiers
[OUTPUT]: Outbound subscribe/unsubscribe payloads
[POS]:    Data layer - request types for feed communication
[UPDATE]: When request schema changes
*/

use serde::{Deserialize, Serialize};

use super::enums::RequestKind;

/// A named feed channel and the products it covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageChannel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub product_ids: Vec<String>,
}

impl MessageChannel {
    pub fn new<I, S>(name: impl Into<String>, product_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            product_ids: product_ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// Subscribe or unsubscribe request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub channels: Vec<MessageChannel>,
}

impl SubscribeRequest {
    pub fn subscribe(channels: Vec<MessageChannel>) -> Self {
        Self {
            kind: RequestKind::Subscribe,
            channels,
        }
    }

    pub fn unsubscribe(channels: Vec<MessageChannel>) -> Self {
        Self {
            kind: RequestKind::Unsubscribe,
            channels,
        }
    }

    /// Names of the requested channels, in request order
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|channel| channel.name.as_str()).collect()
    }
}
