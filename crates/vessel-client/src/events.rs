//! WebSocket stream of daemon events

use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use vessel_api::events::Event;

use crate::error::{ClientError, Result};

/// Client for the daemon's events WebSocket
#[derive(Debug)]
pub struct EventStream {
    #[allow(dead_code)]
    url: Url,
    receiver: mpsc::Receiver<Event>,
    _task_handle: tokio::task::JoinHandle<()>,
}

impl EventStream {
    /// Connect to the events endpoint, optionally filtering by event types.
    ///
    /// Automatically reconnects on connection loss with exponential backoff.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid.
    ///
    /// # Example
    /// ```no_run
    /// use vessel_client::EventStream;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut events =
    ///     EventStream::connect("wss://vessel-host:8443/events", Some(&["operation"])).await?;
    ///
    /// while let Some(event) = events.recv().await {
    ///     println!("{}: {}", event.timestamp, event.event_type);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::unused_async)]
    pub async fn connect(url: impl AsRef<str>, types: Option<&[&str]>) -> Result<Self> {
        let mut url = Url::parse(url.as_ref())?;
        if let Some(types) = types {
            url.query_pairs_mut().append_pair("type", &types.join(","));
        }
        let (tx, rx) = mpsc::channel(100);

        let task_url = url.clone();
        let task_handle = tokio::spawn(async move {
            Self::connection_loop(task_url, tx).await;
        });

        Ok(Self {
            url,
            receiver: rx,
            _task_handle: task_handle,
        })
    }

    /// Receive the next event from the stream
    ///
    /// Returns `None` when the connection is closed and cannot be reconnected.
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Connection loop with auto-reconnection
    async fn connection_loop(url: Url, tx: mpsc::Sender<Event>) {
        let mut backoff = Duration::from_secs(1);
        let max_backoff = Duration::from_secs(60);

        loop {
            match Self::connect_and_receive(&url, &tx).await {
                Ok(()) => {
                    tracing::info!("events connection closed");
                    break;
                }
                Err(e) => {
                    tracing::warn!("events error: {}, reconnecting in {:?}", e, backoff);
                    sleep(backoff).await;
                    backoff = (backoff * 2).min(max_backoff);
                }
            }
        }
    }

    /// Connect and receive messages
    async fn connect_and_receive(url: &Url, tx: &mpsc::Sender<Event>) -> Result<()> {
        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| ClientError::WebSocket(e.to_string()))?;

        tracing::debug!("events connected to {}", url);

        let (_write, mut read) = ws_stream.split();

        while let Some(msg) = read.next().await {
            let msg = msg.map_err(|e| ClientError::WebSocket(e.to_string()))?;

            match msg {
                Message::Text(text) => match serde_json::from_str::<Event>(&text) {
                    Ok(event) => {
                        if tx.send(event).await.is_err() {
                            // Receiver dropped, exit
                            return Ok(());
                        }
                    }
                    Err(e) => {
                        tracing::warn!("failed to parse event: {}", e);
                    }
                },
                Message::Close(_) => {
                    return Err(ClientError::WebSocket(
                        "server closed connection".into(),
                    ));
                }
                Message::Ping(_) | Message::Pong(_) | Message::Binary(_) | Message::Frame(_) => {
                    // Ping/pong handled automatically by tungstenite
                }
            }
        }

        Err(ClientError::WebSocket("stream ended".into()))
    }
}
