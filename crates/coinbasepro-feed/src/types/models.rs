/*
[INPUT]:  Coinbase Pro feed schema and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - inbound message definitions
[UPDATE]: When feed schema changes or new types added
*/

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::Side;
use super::requests::MessageChannel;

/// Type tag of the server's subscription acknowledgement
pub const SUBSCRIPTIONS_TYPE: &str = "subscriptions";

/// One decoded feed frame.
///
/// Every field besides `type` is optional on the wire. Absent or null values
/// decode to the zero value of the field so the frame can later be checked
/// for structural completeness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub product_id: String,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub product_ids: Vec<String>,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub products: Vec<Product>,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub currencies: Vec<Currency>,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub channels: Vec<MessageChannel>,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub sequence: i64,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub trade_id: i64,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub last_trade_id: i64,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub order_id: String,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub maker_order_id: String,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub taker_order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub price: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub size: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub last_size: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub best_bid: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub best_ask: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub open_24h: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub volume_24h: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub low_24h: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub high_24h: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub volume_30d: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub bids: Vec<SnapshotEntry>,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub asks: Vec<SnapshotEntry>,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub changes: Vec<SnapshotChange>,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub reason: String,
}

impl Message {
    /// Whether this frame is the server's subscription acknowledgement
    pub fn is_subscriptions(&self) -> bool {
        self.message_type == SUBSCRIPTIONS_TYPE
    }

    pub fn has_type(&self, message_type: &str) -> bool {
        self.message_type == message_type
    }
}

/// Price level of a level2 snapshot, `[price, size]` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub size: Decimal,
}

/// Level2 book change, `[side, price, size]` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotChange {
    pub side: Side,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub size: Decimal,
}

/// Product entry of a status message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub base_currency: Option<String>,
    #[serde(default)]
    pub quote_currency: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub base_increment: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub quote_increment: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub min_market_funds: Option<Decimal>,
    #[serde(default)]
    pub post_only: bool,
    #[serde(default)]
    pub limit_only: bool,
    #[serde(default)]
    pub cancel_only: bool,
}

/// Currency entry of a status message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub min_size: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub max_precision: Option<Decimal>,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub convertible_to: Vec<String>,
}

mod serde_helpers {
    use super::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;
    use std::str::FromStr;

    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    pub fn deserialize_decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            return Ok(Decimal::ZERO);
        }

        if let Some(raw) = value.as_str() {
            if raw.trim().is_empty() {
                return Ok(Decimal::ZERO);
            }
            return Decimal::from_str(raw).map_err(serde::de::Error::custom);
        }

        if value.is_number() {
            return Decimal::from_str(&value.to_string()).map_err(serde::de::Error::custom);
        }

        Err(serde::de::Error::custom("invalid decimal value"))
    }

    pub fn serialize_decimal<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }
}
