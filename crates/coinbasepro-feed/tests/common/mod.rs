/*
[INPUT]:  Canned feed frames
[OUTPUT]: Loopback WebSocket feed server and frame fixtures
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for coinbasepro-feed tests

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

/// Single-connection feed server on 127.0.0.1
pub struct FeedServer {
    pub url: String,
    handle: JoinHandle<Vec<String>>,
}

impl FeedServer {
    /// Wait for the connection to finish and return every text frame the client sent
    pub async fn received(self) -> Vec<String> {
        self.handle.await.expect("feed server task panicked")
    }
}

/// Start a server that waits for one request, then plays `frames` back.
///
/// A ping precedes the frames so clients must skip control frames.
/// With `close_after` set the server closes once the frames are sent.
pub async fn spawn_feed_server(frames: Vec<Value>, close_after: bool) -> FeedServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener address");

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept connection");
        let mut ws = accept_async(stream).await.expect("websocket handshake");
        let mut received = Vec::new();

        while let Some(Ok(message)) = ws.next().await {
            if let WsMessage::Text(text) = message {
                received.push(text.to_string());
                break;
            }
        }

        if ws.send(WsMessage::Ping(vec![1u8].into())).await.is_err() {
            return received;
        }
        for frame in frames {
            if ws.send(WsMessage::Text(frame.to_string().into())).await.is_err() {
                return received;
            }
        }

        if close_after {
            let _ = ws.close(None).await;
            return received;
        }

        while let Some(Ok(message)) = ws.next().await {
            match message {
                WsMessage::Text(text) => received.push(text.to_string()),
                WsMessage::Close(_) => break,
                _ => {}
            }
        }
        received
    });

    FeedServer {
        url: format!("ws://{addr}"),
        handle,
    }
}

pub fn subscriptions(channel: &str) -> Value {
    json!({
        "type": "subscriptions",
        "channels": [{"name": channel, "product_ids": ["BTC-USD"]}]
    })
}

pub fn heartbeat() -> Value {
    json!({
        "type": "heartbeat",
        "sequence": 90,
        "last_trade_id": 20,
        "product_id": "BTC-USD",
        "time": "2014-11-07T08:19:28.464459Z"
    })
}

pub fn ticker() -> Value {
    json!({
        "type": "ticker",
        "sequence": 5928281084_i64,
        "product_id": "BTC-USD",
        "price": "9425.00",
        "open_24h": "9311.11",
        "volume_24h": "12999.47",
        "low_24h": "9200.00",
        "high_24h": "9500.00",
        "volume_30d": "415229.41",
        "best_bid": "9424.99",
        "best_ask": "9425.00",
        "side": "sell",
        "time": "2020-04-27T20:43:12.412000Z",
        "trade_id": 89913244,
        "last_size": "0.00126000"
    })
}

pub fn snapshot() -> Value {
    json!({
        "type": "snapshot",
        "product_id": "BTC-USD",
        "bids": [["10101.10", "0.45054140"], ["10101.00", "1.00000000"]],
        "asks": [["10102.55", "0.57753524"]]
    })
}

pub fn l2update() -> Value {
    json!({
        "type": "l2update",
        "product_id": "BTC-USD",
        "time": "2019-08-14T20:42:27.265Z",
        "changes": [["buy", "10101.80000000", "0.162567"]]
    })
}

pub fn status() -> Value {
    json!({
        "type": "status",
        "products": [{
            "id": "BTC-USD",
            "base_currency": "BTC",
            "quote_currency": "USD",
            "base_increment": "0.00000001",
            "quote_increment": "0.01",
            "display_name": "BTC/USD",
            "status": "online",
            "status_message": null,
            "min_market_funds": "10",
            "post_only": false,
            "limit_only": false,
            "cancel_only": false
        }],
        "currencies": [{
            "id": "USD",
            "name": "United States Dollar",
            "min_size": "0.01000000",
            "status": "online",
            "status_message": null,
            "max_precision": "0.01",
            "convertible_to": ["USDC"]
        }]
    })
}
