//! Shared application state injected into every handler.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{ClickRecorder, SplitService, StatsService};
use crate::domain::redirect_event::RedirectEvent;
use crate::infrastructure::Storage;

/// Services and the click queue handle, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub split_service: Arc<SplitService>,
    pub stats_service: Arc<StatsService>,
    pub click_recorder: ClickRecorder,
    /// Read client IP from forwarding headers when recording clicks.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        storage: &Storage,
        click_sender: mpsc::Sender<RedirectEvent>,
        behind_proxy: bool,
    ) -> Self {
        Self {
            split_service: Arc::new(SplitService::new(storage.splits.clone())),
            stats_service: Arc::new(StatsService::new(
                storage.splits.clone(),
                storage.clicks.clone(),
            )),
            click_recorder: ClickRecorder::new(click_sender),
            behind_proxy,
        }
    }
}
