//! Domain model for the Zoolight animal catalog.
//!
//! - [`AnimalRecord`]: one loosely typed record from the dataset
//! - [`SearchController`]: query, filtered set and selection over the dataset
//! - [`AnimalDetail`]: text shown for the selected animal
//! - [`tree`]: the collapsible animal-kingdom classification
//! - [`image`]: per-URL image probing state with placeholders
//!
//! Nothing here performs I/O; the actors crate feeds results in.

pub mod detail;
pub mod image;
pub mod record;
pub mod search;
pub mod tree;

pub use detail::{AnimalDetail, DetailAction};
pub use record::{field, AnimalRecord, NOT_AVAILABLE};
pub use search::{LoadState, Panel, ResultsView, SearchController, NO_RESULTS};
pub use tree::{animal_kingdom, DisclosureNode, NodePath};
