//! `ems-routing` — road graph and shortest-path routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`graph`]   | `RoadGraph` (CSR), `RoadGraphBuilder`                       |
//! | [`router`]  | `Router` trait, `Route`, `DijkstraRouter`, `shortest_path`  |
//! | [`loader`]  | `load_segments_csv`, `load_segments_reader`                 |
//! | [`error`]   | `RoutingError`, `RoutingResult<T>`                          |
//!
//! # Per-query graphs
//!
//! The dispatch engine rebuilds the graph from the full segment list on every
//! query: city road tables are small and may change between calls, so no
//! index is kept between queries.

pub mod error;
pub mod graph;
pub mod loader;
pub mod router;

#[cfg(test)]
mod tests;

pub use error::{RoutingError, RoutingResult};
pub use graph::{RoadGraph, RoadGraphBuilder, validate_segment};
pub use loader::{load_segments_csv, load_segments_reader};
pub use router::{DijkstraRouter, Route, Router, shortest_path};
