//! Core domain entities.
//!
//! Entities are plain data structures. Creation inputs live next to the
//! entity they produce:
//!
//! - [`Split`] / [`NewSplit`] / [`SplitPatch`] / [`SplitUpdate`]
//! - [`Destination`] - url + weight pair
//! - [`ClickEvent`] / [`NewClickEvent`] - the click log

pub mod click;
pub mod destination;
pub mod split;

pub use click::{ClickEvent, DestinationClicks, NewClickEvent, RequestMetadata};
pub use destination::{Destination, total_weight};
pub use split::{NewSplit, Split, SplitPatch, SplitRef, SplitUpdate};
