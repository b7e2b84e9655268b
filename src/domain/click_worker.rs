//! Background worker that persists queued redirect events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

use crate::domain::entities::ClickEvent;
use crate::domain::redirect_event::RedirectEvent;
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Attempts after the first failed write.
const MAX_RETRIES: usize = 3;

/// Consumes redirect events until every sender is dropped.
///
/// At most `concurrency` writes are in flight. Events still in flight when the
/// channel closes are awaited before returning, so a graceful shutdown drains
/// the queue.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<RedirectEvent>,
    repository: Arc<dyn ClickRepository>,
    concurrency: usize,
) {
    let concurrency = concurrency.max(1);
    let mut in_flight = JoinSet::new();

    while let Some(event) = rx.recv().await {
        while in_flight.len() >= concurrency {
            in_flight.join_next().await;
        }

        let repository = repository.clone();
        in_flight.spawn(async move {
            // Failures are logged and counted inside persist_click
            let _ = persist_click(repository.as_ref(), event).await;
        });
    }

    while in_flight.join_next().await.is_some() {}

    info!("Click worker stopped");
}

/// Writes one event with exponential backoff on persistence failures.
///
/// Failures are logged and counted here; callers may ignore the result.
pub async fn persist_click(
    repository: &dyn ClickRepository,
    event: RedirectEvent,
) -> Result<ClickEvent, AppError> {
    let new_click = event.to_new_click();
    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_millis(500))
        .map(jitter)
        .take(MAX_RETRIES);

    let result = RetryIf::spawn(
        strategy,
        || repository.record_click(new_click.clone()),
        |e: &AppError| matches!(e, AppError::Persistence { .. }),
    )
    .await;

    match &result {
        Ok(click) => {
            debug!(
                split_id = click.split_id,
                slug = %event.slug,
                destination = %click.destination_url,
                "Click recorded"
            );
            metrics::counter!("clicks_recorded_total").increment(1);
        }
        Err(AppError::NotFound { .. }) => {
            warn!(
                split_id = event.split_id,
                slug = %event.slug,
                "Split vanished before its click was recorded"
            );
            metrics::counter!("clicks_failed_total").increment(1);
        }
        Err(e) => {
            error!(
                split_id = event.split_id,
                slug = %event.slug,
                destination = %event.destination_url,
                error = %e,
                "Failed to record click"
            );
            metrics::counter!("clicks_failed_total").increment(1);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{RequestMetadata, Split};
    use crate::domain::repositories::MockClickRepository;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_event() -> RedirectEvent {
        let split = Split {
            id: 9,
            slug: "promo".to_string(),
            name: "Promo".to_string(),
            destinations: vec![crate::domain::entities::Destination::new(
                "https://a.example/",
                1.0,
            )],
            total_clicks: 0,
            is_active: true,
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        RedirectEvent::new(&split, &split.destinations[0], RequestMetadata::default())
    }

    fn stored(split_id: i64, url: &str) -> ClickEvent {
        ClickEvent {
            id: 1,
            split_id,
            destination_url: url.to_string(),
            clicked_at: Utc::now(),
            ip: None,
            user_agent: None,
            referer: None,
        }
    }

    #[tokio::test]
    async fn test_persist_click_retries_persistence_failures() {
        let mut mock = MockClickRepository::new();
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();

        mock.expect_record_click().times(2).returning(move |c| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::persistence("down", json!({})))
            } else {
                Ok(stored(c.split_id, &c.destination_url))
            }
        });

        let result = persist_click(&mock, test_event()).await;

        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_persist_click_gives_up_after_retries() {
        let mut mock = MockClickRepository::new();
        mock.expect_record_click()
            .times(MAX_RETRIES + 1)
            .returning(|_| Err(AppError::persistence("down", json!({}))));

        let result = persist_click(&mock, test_event()).await;

        assert!(matches!(result, Err(AppError::Persistence { .. })));
    }

    #[tokio::test]
    async fn test_persist_click_does_not_retry_missing_split() {
        let mut mock = MockClickRepository::new();
        mock.expect_record_click()
            .times(1)
            .returning(|_| Err(AppError::not_found("gone", json!({}))));

        let result = persist_click(&mock, test_event()).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_worker_drains_queue_on_close() {
        let mut mock = MockClickRepository::new();
        mock.expect_record_click()
            .times(5)
            .returning(|c| Ok(stored(c.split_id, &c.destination_url)));

        let (tx, rx) = mpsc::channel(16);
        for _ in 0..5 {
            tx.send(test_event()).await.unwrap();
        }
        drop(tx);

        run_click_worker(rx, Arc::new(mock), 2).await;
    }
}
