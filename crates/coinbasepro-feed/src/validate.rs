/*
[INPUT]:  Decoded feed message and an ordered list of required fields
[OUTPUT]: Ok when every field holds a non-zero value, error naming the first unset one
[POS]:    Validation layer - structural completeness of messages
[UPDATE]: When Message gains fields that scenarios need to check
*/

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FeedError, Result};
use crate::types::Message;

/// Field of [`Message`] that can be required by a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageField {
    Type,
    Sequence,
    ProductId,
    ProductIds,
    Products,
    Currencies,
    Channels,
    TradeId,
    LastTradeId,
    OrderId,
    MakerOrderId,
    TakerOrderId,
    Time,
    Side,
    Price,
    Size,
    LastSize,
    BestBid,
    BestAsk,
    #[serde(rename = "open_24h")]
    Open24h,
    #[serde(rename = "volume_24h")]
    Volume24h,
    #[serde(rename = "low_24h")]
    Low24h,
    #[serde(rename = "high_24h")]
    High24h,
    #[serde(rename = "volume_30d")]
    Volume30d,
    Bids,
    Asks,
    Changes,
    Message,
    Reason,
}

impl MessageField {
    /// Field identifier on [`Message`]
    pub fn name(self) -> &'static str {
        match self {
            MessageField::Type => "type",
            MessageField::Sequence => "sequence",
            MessageField::ProductId => "product_id",
            MessageField::ProductIds => "product_ids",
            MessageField::Products => "products",
            MessageField::Currencies => "currencies",
            MessageField::Channels => "channels",
            MessageField::TradeId => "trade_id",
            MessageField::LastTradeId => "last_trade_id",
            MessageField::OrderId => "order_id",
            MessageField::MakerOrderId => "maker_order_id",
            MessageField::TakerOrderId => "taker_order_id",
            MessageField::Time => "time",
            MessageField::Side => "side",
            MessageField::Price => "price",
            MessageField::Size => "size",
            MessageField::LastSize => "last_size",
            MessageField::BestBid => "best_bid",
            MessageField::BestAsk => "best_ask",
            MessageField::Open24h => "open_24h",
            MessageField::Volume24h => "volume_24h",
            MessageField::Low24h => "low_24h",
            MessageField::High24h => "high_24h",
            MessageField::Volume30d => "volume_30d",
            MessageField::Bids => "bids",
            MessageField::Asks => "asks",
            MessageField::Changes => "changes",
            MessageField::Message => "message",
            MessageField::Reason => "reason",
        }
    }

    /// Whether the field holds a non-zero value on `message`
    pub fn is_set(self, message: &Message) -> bool {
        match self {
            MessageField::Type => !message.message_type.is_empty(),
            MessageField::Sequence => message.sequence != 0,
            MessageField::ProductId => !message.product_id.is_empty(),
            MessageField::ProductIds => !message.product_ids.is_empty(),
            MessageField::Products => !message.products.is_empty(),
            MessageField::Currencies => !message.currencies.is_empty(),
            MessageField::Channels => !message.channels.is_empty(),
            MessageField::TradeId => message.trade_id != 0,
            MessageField::LastTradeId => message.last_trade_id != 0,
            MessageField::OrderId => !message.order_id.is_empty(),
            MessageField::MakerOrderId => !message.maker_order_id.is_empty(),
            MessageField::TakerOrderId => !message.taker_order_id.is_empty(),
            MessageField::Time => message.time.is_some(),
            MessageField::Side => message.side.is_some(),
            MessageField::Price => !message.price.is_zero(),
            MessageField::Size => !message.size.is_zero(),
            MessageField::LastSize => !message.last_size.is_zero(),
            MessageField::BestBid => !message.best_bid.is_zero(),
            MessageField::BestAsk => !message.best_ask.is_zero(),
            MessageField::Open24h => !message.open_24h.is_zero(),
            MessageField::Volume24h => !message.volume_24h.is_zero(),
            MessageField::Low24h => !message.low_24h.is_zero(),
            MessageField::High24h => !message.high_24h.is_zero(),
            MessageField::Volume30d => !message.volume_30d.is_zero(),
            MessageField::Bids => !message.bids.is_empty(),
            MessageField::Asks => !message.asks.is_empty(),
            MessageField::Changes => !message.changes.is_empty(),
            MessageField::Message => !message.message.is_empty(),
            MessageField::Reason => !message.reason.is_empty(),
        }
    }
}

impl fmt::Display for MessageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check that every field in `fields` is set on `message`, in order.
///
/// Fails on the first unset field. Only presence is checked, never the value.
pub fn ensure_properties(message: &Message, fields: &[MessageField]) -> Result<()> {
    match fields.iter().find(|field| !field.is_set(message)) {
        Some(field) => Err(FeedError::MissingField {
            field: *field,
            message_type: message.message_type.clone(),
        }),
        None => Ok(()),
    }
}
