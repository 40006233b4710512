use serde::{Deserialize, Serialize};

/// Monte-Carlo counters accumulated for one facet over a simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetCounters {
    /// Number of test particles that hit the facet.
    pub hits: u64,
    /// Number of test particles absorbed by the facet.
    pub absorptions: u64,
    /// Number of test particles desorbed from the facet.
    pub desorptions: u64,
}

/// A single facet of the simulated geometry.
///
/// Only the quantities the formula layer can reference are kept here; mesh
/// topology and per-cell textures live with the geometry kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    /// Facet surface area in cm^2.
    pub area: f64,
    pub counters: FacetCounters,
}

impl Facet {
    #[must_use]
    pub fn new(area: f64) -> Self {
        Self {
            area,
            counters: FacetCounters::default(),
        }
    }
}
