use plume_model::Scene;

/// Read-only view of the host's facet/selection state, consulted while
/// parsing `sum(...)` aggregates.
///
/// Implementations must not mutate underlying state; the parser may query the
/// same provider several times within one parse.
pub trait SelectionSource {
    /// Total number of facets in the scene, used to validate indices read
    /// from selection groups.
    fn facet_count(&self) -> usize;

    /// Number of saved selection groups.
    fn group_count(&self) -> usize;

    /// Member facet indices (0-based) of group `index`, in stored order.
    fn group_members(&self, index: usize) -> Vec<usize>;

    /// Currently selected facet indices (0-based), in selection order.
    fn selected_facets(&self) -> Vec<usize>;
}

/// Provider for hosts without a scene: no facets, no groups, no selection.
///
/// Formulas that avoid the selection forms of `sum(...)` parse normally.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSelection;

impl SelectionSource for NoSelection {
    fn facet_count(&self) -> usize {
        0
    }

    fn group_count(&self) -> usize {
        0
    }

    fn group_members(&self, _index: usize) -> Vec<usize> {
        Vec::new()
    }

    fn selected_facets(&self) -> Vec<usize> {
        Vec::new()
    }
}

impl SelectionSource for Scene {
    fn facet_count(&self) -> usize {
        Scene::facet_count(self)
    }

    fn group_count(&self) -> usize {
        Scene::group_count(self)
    }

    fn group_members(&self, index: usize) -> Vec<usize> {
        self.group(index)
            .map(|g| g.facets.clone())
            .unwrap_or_default()
    }

    fn selected_facets(&self) -> Vec<usize> {
        self.selection().to_vec()
    }
}
