//! Socket opening, abstracted so the channel can run over a fake in tests.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::ClientError;

/// An open text-frame connection.
#[async_trait]
pub trait Transport: Send {
    /// Next text frame. `None` once the peer has closed.
    async fn recv(&mut self) -> Option<Result<String, ClientError>>;
    async fn send(&mut self, text: String) -> Result<(), ClientError>;
    async fn close(&mut self);
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>, ClientError>;
}

/// Opens real WebSocket connections.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>, ClientError> {
        let (stream, response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        tracing::debug!(status = %response.status(), "websocket handshake complete");
        Ok(Box::new(WsTransport { stream }))
    }
}

struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn recv(&mut self) -> Option<Result<String, ClientError>> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Some(Ok(text.as_str().to_string())),
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(?frame, "websocket closed by server");
                    return None;
                }
                // Pings are answered by tungstenite itself.
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Some(Err(ClientError::Network(e.to_string()))),
                None => return None,
            }
        }
    }

    async fn send(&mut self, text: String) -> Result<(), ClientError> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| ClientError::Network(e.to_string()))
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            tracing::debug!(?e, "websocket close failed");
        }
    }
}
