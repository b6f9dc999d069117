/*
[INPUT]:  Scenario definition (channel, products, expected type, required fields)
[OUTPUT]: Report of the validated messages, or the first failed check
[POS]:    Scenario layer - parameterised subscribe/validate runner
[UPDATE]: When adding channels or changing follow-up handling
*/

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{FeedError, Result};
use crate::types::{Message, MessageChannel, SubscribeRequest};
use crate::validate::{MessageField, ensure_properties};
use crate::ws::{FeedConnection, FeedTransport, next_message, start_subscribe};

/// Product subscribed to by the built-in scenarios
pub const DEFAULT_PRODUCT_ID: &str = "BTC-USD";

/// Receives allowed for the level2 follow-up
pub const DEFAULT_FOLLOW_UP_LIMIT: usize = 10;

/// Built-in channel scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Heartbeat,
    Ticker,
    Level2,
    Status,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::Heartbeat,
        ScenarioKind::Ticker,
        ScenarioKind::Level2,
        ScenarioKind::Status,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioKind::Heartbeat => "heartbeat",
            ScenarioKind::Ticker => "ticker",
            ScenarioKind::Level2 => "level2",
            ScenarioKind::Status => "status",
        }
    }

    pub fn scenario(self) -> Scenario {
        match self {
            ScenarioKind::Heartbeat => Scenario::heartbeat(),
            ScenarioKind::Ticker => Scenario::ticker(),
            ScenarioKind::Level2 => Scenario::level2(),
            ScenarioKind::Status => Scenario::status(),
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioKind {
    type Err = FeedError;

    fn from_str(value: &str) -> Result<Self> {
        ScenarioKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| FeedError::Config(format!("unknown scenario: {value}")))
    }
}

/// Bounded wait for a later message of a given type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUp {
    pub expected_type: String,
    pub required_fields: Vec<MessageField>,
    pub max_messages: usize,
}

/// One subscribe-and-check run against a single channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub channel: String,
    pub product_ids: Vec<String>,
    pub expected_type: String,
    pub required_fields: Vec<MessageField>,
    pub follow_up: Option<FollowUp>,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        channel: impl Into<String>,
        product_ids: Vec<String>,
        expected_type: impl Into<String>,
        required_fields: Vec<MessageField>,
    ) -> Self {
        Self {
            name: name.into(),
            channel: channel.into(),
            product_ids,
            expected_type: expected_type.into(),
            required_fields,
            follow_up: None,
        }
    }

    // last_trade_id is left out: the sandbox reports it as zero.
    pub fn heartbeat() -> Self {
        Self::new(
            "heartbeat",
            "heartbeat",
            vec![DEFAULT_PRODUCT_ID.to_string()],
            "heartbeat",
            vec![
                MessageField::Type,
                MessageField::Sequence,
                MessageField::ProductId,
                MessageField::Time,
            ],
        )
    }

    pub fn ticker() -> Self {
        Self::new(
            "ticker",
            "ticker",
            vec![DEFAULT_PRODUCT_ID.to_string()],
            "ticker",
            vec![
                MessageField::Type,
                MessageField::Sequence,
                MessageField::ProductId,
                MessageField::BestBid,
                MessageField::BestAsk,
                MessageField::Price,
            ],
        )
    }

    /// Snapshot first, then an l2update within the follow-up bound
    pub fn level2() -> Self {
        Self::new(
            "level2",
            "level2",
            vec![DEFAULT_PRODUCT_ID.to_string()],
            "snapshot",
            vec![
                MessageField::ProductId,
                MessageField::Bids,
                MessageField::Asks,
            ],
        )
        .with_follow_up(FollowUp {
            expected_type: "l2update".to_string(),
            required_fields: vec![MessageField::ProductId, MessageField::Changes],
            max_messages: DEFAULT_FOLLOW_UP_LIMIT,
        })
    }

    pub fn status() -> Self {
        Self::new(
            "status",
            "status",
            Vec::new(),
            "status",
            vec![MessageField::Products, MessageField::Currencies],
        )
    }

    pub fn with_follow_up(mut self, follow_up: FollowUp) -> Self {
        self.follow_up = Some(follow_up);
        self
    }

    /// Replace the subscribed products. Channels without products are left alone.
    pub fn with_product_ids(mut self, product_ids: &[String]) -> Self {
        if !self.product_ids.is_empty() && !product_ids.is_empty() {
            self.product_ids = product_ids.to_vec();
        }
        self
    }

    pub fn with_follow_up_limit(mut self, max_messages: usize) -> Self {
        if let Some(follow_up) = self.follow_up.as_mut() {
            follow_up.max_messages = max_messages;
        }
        self
    }

    pub fn subscribe_request(&self) -> SubscribeRequest {
        SubscribeRequest::subscribe(vec![MessageChannel::new(
            self.channel.clone(),
            self.product_ids.iter().cloned(),
        )])
    }
}

/// Run-wide knobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Bound on the acknowledgement skip loop, unbounded when `None`
    pub subscribe_timeout: Option<Duration>,
}

/// Messages that passed a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    pub scenario: String,
    pub first: Message,
    pub follow_up: Option<Message>,
    /// Frames read while waiting for the follow-up
    pub follow_up_frames: usize,
}

/// Connect to `url`, run `scenario`, and close the connection
pub async fn run_scenario(
    url: &str,
    scenario: &Scenario,
    options: RunOptions,
) -> Result<ScenarioReport> {
    let mut connection = FeedConnection::connect(url).await?;
    debug!(scenario = %scenario.name, url = %connection.url(), "running scenario on feed");
    run_and_close(&mut connection, scenario, options).await
}

/// Run `scenario` on `transport`, closing it whatever the outcome
pub async fn run_and_close<T>(
    transport: &mut T,
    scenario: &Scenario,
    options: RunOptions,
) -> Result<ScenarioReport>
where
    T: FeedTransport + ?Sized,
{
    let outcome = run_on_transport(transport, scenario, options).await;
    if let Err(err) = transport.close().await {
        warn!(scenario = %scenario.name, error = %err, "failed to close feed connection");
    }
    outcome
}

/// Run `scenario` on an already open transport
pub async fn run_on_transport<T>(
    transport: &mut T,
    scenario: &Scenario,
    options: RunOptions,
) -> Result<ScenarioReport>
where
    T: FeedTransport + ?Sized,
{
    let request = scenario.subscribe_request();
    let first = start_subscribe(transport, &request, options.subscribe_timeout).await?;

    if !first.has_type(&scenario.expected_type) {
        return Err(FeedError::unexpected_type(
            scenario.expected_type.as_str(),
            first.message_type.as_str(),
        ));
    }
    ensure_properties(&first, &scenario.required_fields)?;

    let (follow_up, follow_up_frames) = match &scenario.follow_up {
        Some(follow_up) => {
            let (message, frames) = await_follow_up(transport, follow_up).await?;
            (Some(message), frames)
        }
        None => (None, 0),
    };

    info!(
        scenario = %scenario.name,
        message_type = %first.message_type,
        follow_up_frames,
        "scenario passed"
    );

    Ok(ScenarioReport {
        scenario: scenario.name.clone(),
        first,
        follow_up,
        follow_up_frames,
    })
}

async fn await_follow_up<T>(transport: &mut T, follow_up: &FollowUp) -> Result<(Message, usize)>
where
    T: FeedTransport + ?Sized,
{
    for read in 1..=follow_up.max_messages {
        let message = next_message(transport).await?;
        if message.has_type(&follow_up.expected_type) {
            ensure_properties(&message, &follow_up.required_fields)?;
            return Ok((message, read));
        }
        debug!(
            expected = %follow_up.expected_type,
            actual = %message.message_type,
            read,
            "skipping message while waiting for follow-up"
        );
    }

    Err(FeedError::FollowUpNotObserved {
        expected: follow_up.expected_type.clone(),
        within: follow_up.max_messages,
    })
}
