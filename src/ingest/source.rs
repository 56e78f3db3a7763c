//! Message sources for the ingestion loop.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::SourceError;

// == Message Source Trait ==
/// A pull-based stream of raw order payloads with at-least-once delivery.
///
/// `next_message` must be cancel safe: the loop drops a pending read when it
/// is asked to stop, and no message may be lost by that.
#[async_trait]
pub trait MessageSource: Send {
    /// Waits for the next payload.
    ///
    /// Returns [`SourceError::Transient`] for read failures worth retrying
    /// and [`SourceError::Closed`] once the stream has ended.
    async fn next_message(&mut self) -> Result<Vec<u8>, SourceError>;
}

// == Channel Source ==
/// [`MessageSource`] fed through an in-process channel.
///
/// Closes once every sender has been dropped and the buffer is drained.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<Vec<u8>>,
}

impl ChannelSource {
    /// Wraps an existing receiver.
    pub fn new(rx: mpsc::Receiver<Vec<u8>>) -> Self {
        Self { rx }
    }

    /// Creates a bounded channel and the source reading from it.
    pub fn channel(capacity: usize) -> (mpsc::Sender<Vec<u8>>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl MessageSource for ChannelSource {
    async fn next_message(&mut self) -> Result<Vec<u8>, SourceError> {
        self.rx.recv().await.ok_or(SourceError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_source_yields_then_closes() {
        let (tx, mut source) = ChannelSource::channel(4);
        tx.send(b"one".to_vec()).await.unwrap();
        tx.send(b"two".to_vec()).await.unwrap();
        drop(tx);

        assert_eq!(source.next_message().await.unwrap(), b"one".to_vec());
        assert_eq!(source.next_message().await.unwrap(), b"two".to_vec());
        assert!(matches!(source.next_message().await, Err(SourceError::Closed)));
    }
}
