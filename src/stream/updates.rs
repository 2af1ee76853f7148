//! Broadcast-backed stream of color updates

use futures::{Stream, ready};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::warn;

use crate::sink::ColorUpdate;

pin_project! {
    /// Stream of [`ColorUpdate`]s from a [`ChannelSink`](crate::ChannelSink).
    ///
    /// A receiver that falls behind loses the oldest updates; the loss is
    /// logged and counted instead of ending the stream.
    pub struct UpdateStream {
        #[pin]
        inner: BroadcastStream<ColorUpdate>,
        missed: u64,
    }
}

impl UpdateStream {
    pub(crate) fn new(rx: broadcast::Receiver<ColorUpdate>) -> Self {
        Self { inner: BroadcastStream::new(rx), missed: 0 }
    }

    /// Updates dropped because this receiver lagged
    pub fn missed(&self) -> u64 {
        self.missed
    }
}

impl Stream for UpdateStream {
    type Item = ColorUpdate;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(update)) => return Poll::Ready(Some(update)),
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    *this.missed += skipped;
                    warn!(skipped, "Update receiver lagged, oldest updates dropped");
                }
                None => return Poll::Ready(None),
            }
        }
    }
}
