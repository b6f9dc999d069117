/*
[INPUT]:  Feed endpoint URL and subscription requests
[OUTPUT]: Decoded feed messages read off one connection
[POS]:    WebSocket layer - transport and subscribe-and-wait
[UPDATE]: When adding new transport operations or changing the wait loop
*/

pub mod connection;
pub mod subscriber;

#[cfg(test)]
pub(crate) mod scripted;

pub use connection::{FeedConnection, FeedTransport, SANDBOX_FEED_URL};
pub use subscriber::{decode_message, next_message, send_request, start_subscribe};
