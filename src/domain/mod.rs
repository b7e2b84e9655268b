//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Splits, destinations and click events
//! - [`repositories`] - Storage trait definitions
//! - [`selector`] - Weighted random destination selection
//! - [`redirect_event`] - Queued redirect model
//! - [`click_worker`] - Asynchronous click persistence
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers; services in [`crate::application::services`] orchestrate it.
//!
//! # Click Processing Flow
//!
//! 1. Redirect handler resolves the split and calls [`selector::select`]
//! 2. A [`redirect_event::RedirectEvent`] is queued (non-blocking)
//! 3. [`click_worker::run_click_worker`] persists it with retry
//! 4. [`repositories::ClickRepository::record_click`] appends the event and
//!    bumps the counter in one transaction

pub mod click_worker;
pub mod entities;
pub mod redirect_event;
pub mod repositories;
pub mod selector;
