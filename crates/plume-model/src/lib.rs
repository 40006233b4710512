//! `plume-model` defines the in-memory simulation state the formula layer reads.
//!
//! The crate is intentionally self-contained so it can be reused by:
//! - the formula engine (variable binding, `sum(...)` aggregate expansion)
//! - result snapshot import/export via `serde` (JSON-safe schema)

mod facet;
mod scene;

pub use facet::{Facet, FacetCounters};
pub use scene::{Scene, SceneError, SelectionGroup};
