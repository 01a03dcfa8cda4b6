use std::sync::Arc;

use bytes::Bytes;
use thingbuf::mpsc::{Receiver as ThingbufReceiver, Sender as ThingbufSender};

use crate::errors::PlayerError;

/// Caller-owned source of encoded video blobs.
#[async_trait::async_trait]
pub trait InputStream: Send + Sync {
    fn index(&self) -> u32;

    /// Next blob, or `None` once the stream has ended.
    async fn read(&self) -> Option<Bytes>;
}

/// In-memory push stream backed by a bounded channel.
pub struct ChannelStream {
    index: u32,
    rx: ThingbufReceiver<Bytes>,
}

pub struct StreamWriter {
    tx: ThingbufSender<Bytes>,
}

impl ChannelStream {
    /// A capacity of zero is treated as one.
    pub fn new(index: u32, capacity: usize) -> (Self, StreamWriter) {
        let (tx, rx) = thingbuf::mpsc::channel::<Bytes>(capacity.max(1));

        (Self { index, rx }, StreamWriter { tx })
    }
}

#[async_trait::async_trait]
impl InputStream for ChannelStream {
    fn index(&self) -> u32 {
        self.index
    }

    async fn read(&self) -> Option<Bytes> {
        self.rx.recv().await
    }
}

impl StreamWriter {
    pub async fn write(&self, blob: Bytes) -> Result<(), PlayerError> {
        self.tx
            .send(blob)
            .await
            .map_err(|_| PlayerError::StreamClosed)
    }
}

/// Adapts a stream into a `futures::Stream` of blobs. The returned stream
/// holds its own handle and does not keep the caller from closing the writer.
pub fn blobs(stream: Arc<dyn InputStream>) -> impl futures::Stream<Item = Bytes> + Send {
    futures::stream::unfold(stream, |stream| async move {
        let blob = stream.read().await?;
        Some((blob, stream))
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn reads_blobs_in_order_until_writer_drops() {
        let (stream, writer) = ChannelStream::new(3, 4);
        assert_eq!(stream.index(), 3);

        let writer_task = tokio::spawn(async move {
            for i in 0u8..10 {
                writer.write(Bytes::from(vec![i; 2])).await.unwrap();
            }
        });

        let mut received = Vec::new();
        while let Some(blob) = stream.read().await {
            received.push(blob[0]);
        }

        writer_task.await.unwrap();
        assert_eq!(received, (0u8..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn zero_capacity_still_carries_blobs() {
        let (stream, writer) = ChannelStream::new(0, 0);

        writer.write(Bytes::from_static(b"key")).await.unwrap();
        assert_eq!(stream.read().await, Some(Bytes::from_static(b"key")));

        drop(writer);
        assert_eq!(stream.read().await, None);
    }

    #[tokio::test]
    async fn write_fails_once_stream_is_dropped() {
        let (stream, writer) = ChannelStream::new(0, 1);
        drop(stream);

        let res = writer.write(Bytes::from_static(b"frame")).await;
        assert!(matches!(res, Err(PlayerError::StreamClosed)));
    }

    #[tokio::test]
    async fn blobs_adapter_yields_everything() {
        let (stream, writer) = ChannelStream::new(1, 8);
        let stream: Arc<dyn InputStream> = Arc::new(stream);

        writer.write(Bytes::from_static(b"a")).await.unwrap();
        writer.write(Bytes::from_static(b"bc")).await.unwrap();
        drop(writer);

        let collected: Vec<Bytes> = blobs(stream).collect().await;
        assert_eq!(
            collected,
            vec![Bytes::from_static(b"a"), Bytes::from_static(b"bc")]
        );
    }
}
