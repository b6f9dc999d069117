/*
[INPUT]:  WebSocket URL
[OUTPUT]: Text frames sent to and received from the feed
[POS]:    WebSocket layer - connection handling
[UPDATE]: When changing connect/close behaviour or frame handling
*/

use std::fmt;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info};
use url::Url;

use crate::error::{FeedError, Result};

/// Public sandbox feed
pub const SANDBOX_FEED_URL: &str = "wss://ws-feed-public.sandbox.pro.coinbase.com";

/// Bidirectional text message connection to the feed
#[async_trait]
pub trait FeedTransport: Send {
    /// Send one text frame
    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Receive the next text payload. Control frames are skipped.
    async fn recv_text(&mut self) -> Result<String>;

    /// Close the connection
    async fn close(&mut self) -> Result<()>;
}

/// WebSocket connection to a feed endpoint
pub struct FeedConnection {
    url: Url,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl fmt::Debug for FeedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedConnection")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

impl FeedConnection {
    /// Connect to the feed at `url`
    pub async fn connect(url: &str) -> Result<Self> {
        let url = Url::parse(url)?;
        match url.scheme() {
            "ws" | "wss" => {}
            other => {
                return Err(FeedError::Config(format!(
                    "feed url must use ws or wss, got {other}"
                )));
            }
        }

        if url.scheme() == "wss" {
            install_crypto_provider();
        }

        debug!(url = %url, "connecting to feed");
        let (stream, response) = connect_async(url.as_str()).await?;
        info!(url = %url, status = %response.status(), "feed connected");

        Ok(Self { url, stream })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// rustls needs a process-level provider before the first TLS handshake.
/// A provider installed earlier is kept.
fn install_crypto_provider() {
    rustls::crypto::ring::default_provider().install_default().ok();
}

#[async_trait]
impl FeedTransport for FeedConnection {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.stream.send(WsMessage::Text(text.into())).await?;
        Ok(())
    }

    async fn recv_text(&mut self) -> Result<String> {
        loop {
            match self.stream.next().await {
                Some(Ok(WsMessage::Text(text))) => return Ok(text.to_string()),
                Some(Ok(WsMessage::Binary(bytes))) => {
                    return String::from_utf8(bytes.to_vec()).map_err(|err| {
                        FeedError::WebSocket(format!("binary frame is not utf-8: {err}"))
                    });
                }
                Some(Ok(WsMessage::Ping(_))) | Some(Ok(WsMessage::Pong(_))) => {}
                Some(Ok(WsMessage::Frame(_))) => {}
                Some(Ok(WsMessage::Close(frame))) => {
                    debug!(url = %self.url, ?frame, "feed sent close frame");
                    return Err(FeedError::ConnectionClosed);
                }
                Some(Err(err)) => return Err(err.into()),
                None => return Err(FeedError::ConnectionClosed),
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self.stream.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => {
                debug!(url = %self.url, "feed connection closed");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}
