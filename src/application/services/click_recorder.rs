//! Non-blocking hand-off of redirect events to the click worker.

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, warn};

use crate::domain::entities::{Destination, RequestMetadata, Split};
use crate::domain::redirect_event::RedirectEvent;

/// Queues click events for asynchronous persistence.
///
/// The redirect path never waits on storage: [`ClickRecorder::record`] uses
/// `try_send`, and a full or closed queue drops the event after logging it.
/// Persistence itself (counter increment plus event append) happens in
/// [`crate::domain::click_worker::run_click_worker`].
#[derive(Clone)]
pub struct ClickRecorder {
    sender: mpsc::Sender<RedirectEvent>,
}

impl ClickRecorder {
    pub fn new(sender: mpsc::Sender<RedirectEvent>) -> Self {
        Self { sender }
    }

    /// Records a redirect of `split` to `destination`.
    ///
    /// Returns `false` when the event was dropped.
    pub fn record(
        &self,
        split: &Split,
        destination: &Destination,
        metadata: RequestMetadata,
    ) -> bool {
        let event = RedirectEvent::new(split, destination, metadata);

        match self.sender.try_send(event) {
            Ok(()) => {
                debug!(split_id = split.id, url = %destination.url, "Click queued");
                true
            }
            Err(TrySendError::Full(event)) => {
                warn!(
                    split_id = event.split_id,
                    slug = %event.slug,
                    "Click queue full, dropping event"
                );
                metrics::counter!("clicks_dropped_total", "reason" => "queue_full").increment(1);
                false
            }
            Err(TrySendError::Closed(event)) => {
                error!(
                    split_id = event.split_id,
                    slug = %event.slug,
                    "Click worker stopped, dropping event"
                );
                metrics::counter!("clicks_dropped_total", "reason" => "worker_closed")
                    .increment(1);
                false
            }
        }
    }

    /// True once the worker side of the queue is gone.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots left in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_split() -> Split {
        Split {
            id: 9,
            slug: "promo".to_string(),
            name: "Promo".to_string(),
            destinations: vec![
                Destination::new("https://a.example/", 1.0),
                Destination::new("https://b.example/", 1.0),
            ],
            total_clicks: 0,
            is_active: true,
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_record_queues_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let recorder = ClickRecorder::new(tx);
        let split = test_split();

        let metadata = RequestMetadata {
            ip: Some("10.0.0.1".to_string()),
            user_agent: Some("curl/8.0".to_string()),
            referer: None,
        };
        assert!(recorder.record(&split, &split.destinations[1], metadata.clone()));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.split_id, 9);
        assert_eq!(event.destination_url, "https://b.example/");
        assert_eq!(event.metadata, metadata);
    }

    #[tokio::test]
    async fn test_record_drops_when_full() {
        let (tx, _rx) = mpsc::channel(1);
        let recorder = ClickRecorder::new(tx);
        let split = test_split();
        let dest = &split.destinations[0];

        assert!(recorder.record(&split, dest, RequestMetadata::default()));
        assert_eq!(recorder.capacity(), 0);
        assert!(!recorder.record(&split, dest, RequestMetadata::default()));
    }

    #[tokio::test]
    async fn test_record_drops_when_worker_gone() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let recorder = ClickRecorder::new(tx);
        let split = test_split();

        assert!(recorder.is_closed());
        assert!(!recorder.record(&split, &split.destinations[0], RequestMetadata::default()));
    }
}
