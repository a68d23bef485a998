//! WebSocket transport for the Cilia control endpoint.
//!
//! [`WsConnector`] performs the `ws://` handshake and splits the stream:
//! the write half becomes the [`WsSink`] handed to the controller, the
//! read half is drained by a background task so pings are answered and a
//! peer close is noticed promptly.
//!
//! # Example
//!
//! ```rust,ignore
//! use cilia_api::transport::{endpoint_url, Connector, FrameSink};
//! use cilia_api::websocket::WsConnector;
//!
//! let url = endpoint_url("localhost", 1995)?;
//! let mut conn = WsConnector.connect(&url).await?;
//! conn.sink.send_text(r#"{"SetScent":[["Rose",255]]}"#.into()).await?;
//! conn.sink.close().await?;
//! ```

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::transport::{Connection, Connector, FrameSink};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ── WsConnector ──────────────────────────────────────────────────────

/// Opens WebSocket sessions with `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    type Sink = WsSink;

    async fn connect(&self, url: &Url) -> Result<Connection<WsSink>, Error> {
        tracing::debug!(url = %url, "Opening WebSocket");

        let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

        tracing::debug!(url = %url, "WebSocket handshake complete");

        let (write, read) = ws_stream.split();
        let closed = CancellationToken::new();
        tokio::spawn(drain_incoming(read, closed.clone()));

        Ok(Connection {
            sink: WsSink { write },
            closed,
        })
    }
}

// ── WsSink ───────────────────────────────────────────────────────────

/// Write half of a device WebSocket.
pub struct WsSink {
    write: SplitSink<WsStream, Message>,
}

impl FrameSink for WsSink {
    async fn send_text(&mut self, text: String) -> Result<(), Error> {
        self.write.send(Message::text(text)).await.map_err(|e| match e {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                Error::Closed
            }
            other => Error::Send(other.to_string()),
        })
    }

    async fn close(&mut self) -> Result<(), Error> {
        match self.write.close().await {
            Ok(())
            | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Ok(())
            }
            Err(e) => Err(Error::Send(e.to_string())),
        }
    }
}

// ── Read side ────────────────────────────────────────────────────────

/// Drain frames until the peer goes away or `closed` is cancelled.
///
/// The device does not send anything the client acts on; incoming text is
/// only logged. Always cancels `closed` on exit.
async fn drain_incoming(mut read: SplitStream<WsStream>, closed: CancellationToken) {
    loop {
        tokio::select! {
            biased;
            _ = closed.cancelled() => break,
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        tracing::trace!(len = text.len(), text = %text.as_str(), "device message");
                    }
                    Some(Ok(Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            tracing::info!(
                                code = %cf.code,
                                reason = %cf.reason,
                                "WebSocket close frame received"
                            );
                        } else {
                            tracing::info!("WebSocket close frame received (no payload)");
                        }
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "WebSocket read failed");
                        break;
                    }
                    None => {
                        tracing::info!("WebSocket stream ended");
                        break;
                    }
                    // Binary, Ping, Pong, Frame -- tungstenite answers pings itself
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    closed.cancel();
}
