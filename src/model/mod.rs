//! Model module - Application state and data types
//!
//! - `catalog`: catalog records and related-set lookup
//! - `types`: presentation mode, drag and countdown state, UI state
//! - `playback`: playback session and the view snapshot
//! - `feed`: progressive reveal of catalog groups

mod catalog;
mod feed;
mod playback;
mod types;

pub use catalog::{Catalog, CatalogItem, CategoryGroup, MediaKind};
#[cfg(test)]
pub(crate) use catalog::fixtures;
pub use feed::FeedReveal;
pub use playback::{CountdownInfo, PlaybackSession, PlayerSnapshot};
pub use types::{CountdownState, DragState, PresentationMode, UiState};
