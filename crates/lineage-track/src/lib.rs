//! Provenance tracking for rewritten syntax trees.
//!
//! A transformation marks each replacement with a tracking annotation created
//! by an [`AnnotationStore`]. A [`Tracker`] then answers, for any node, token
//! or range of the rewritten tree, where it came from in the tree the
//! transformation started with.

mod config;
mod error;
pub mod locator;
mod remap;
mod store;
mod tracker;

pub use config::TrackerConfig;
pub use error::{Result, TrackingError};
pub use locator::{TokenMatch, find_node, find_node_where, find_token_at};
pub use remap::{Location, Remapped};
pub use store::AnnotationStore;
pub use tracker::{Trackable, Tracker};
