use crate::facet::Facet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("facet index {facet} out of range (scene has {facet_count} facets)")]
    FacetOutOfRange { facet: usize, facet_count: usize },
}

/// A named, ordered set of facet indices saved by the user.
///
/// Member order is preserved exactly as stored; the formula layer expands
/// `sum(prefix, S<n>)` aggregates in this order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionGroup {
    pub name: String,
    /// 0-based facet indices.
    pub facets: Vec<usize>,
}

/// Simulated geometry state visible to the formula layer: facets with their
/// counters, saved selection groups, and the currently selected facets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    facets: Vec<Facet>,
    groups: Vec<SelectionGroup>,
    selection: Vec<usize>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene with `count` default facets.
    #[must_use]
    pub fn with_facets(count: usize) -> Self {
        Self {
            facets: vec![Facet::default(); count],
            groups: Vec::new(),
            selection: Vec::new(),
        }
    }

    #[must_use]
    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    #[must_use]
    pub fn facet(&self, index: usize) -> Option<&Facet> {
        self.facets.get(index)
    }

    pub fn facet_mut(&mut self, index: usize) -> Option<&mut Facet> {
        self.facets.get_mut(index)
    }

    /// Append a facet, returning its 0-based index.
    pub fn add_facet(&mut self, facet: Facet) -> usize {
        self.facets.push(facet);
        self.facets.len() - 1
    }

    #[must_use]
    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn group(&self, index: usize) -> Option<&SelectionGroup> {
        self.groups.get(index)
    }

    /// Save a selection group. Member indices must refer to existing facets.
    pub fn add_group(
        &mut self,
        name: impl Into<String>,
        facets: Vec<usize>,
    ) -> Result<usize, SceneError> {
        self.check_facets(&facets)?;
        self.groups.push(SelectionGroup {
            name: name.into(),
            facets,
        });
        Ok(self.groups.len() - 1)
    }

    /// Replace the current selection. Indices must refer to existing facets.
    pub fn set_selection(&mut self, facets: Vec<usize>) -> Result<(), SceneError> {
        self.check_facets(&facets)?;
        self.selection = facets;
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Currently selected facets, in selection order.
    #[must_use]
    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    fn check_facets(&self, facets: &[usize]) -> Result<(), SceneError> {
        for &facet in facets {
            if facet >= self.facets.len() {
                return Err(SceneError::FacetOutOfRange {
                    facet,
                    facet_count: self.facets.len(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_group_validates_members() {
        let mut scene = Scene::with_facets(3);
        assert_eq!(scene.add_group("walls", vec![0, 2]), Ok(0));
        assert_eq!(
            scene.add_group("bad", vec![3]),
            Err(SceneError::FacetOutOfRange {
                facet: 3,
                facet_count: 3,
            })
        );
        assert_eq!(scene.group_count(), 1);
        assert_eq!(scene.group(0).unwrap().facets, vec![0, 2]);
    }

    #[test]
    fn selection_preserves_order() {
        let mut scene = Scene::with_facets(5);
        scene.set_selection(vec![4, 1, 2]).unwrap();
        assert_eq!(scene.selection(), &[4, 1, 2]);

        assert!(scene.set_selection(vec![5]).is_err());
        // Failed updates leave the previous selection untouched.
        assert_eq!(scene.selection(), &[4, 1, 2]);

        scene.clear_selection();
        assert!(scene.selection().is_empty());
    }

    #[test]
    fn serde_round_trip() {
        let mut scene = Scene::with_facets(2);
        scene.facet_mut(0).unwrap().area = 1.5;
        scene.add_group("inlet", vec![1]).unwrap();
        scene.set_selection(vec![0]).unwrap();

        let json = serde_json::to_string(&scene).unwrap();
        let back: Scene = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scene);
    }
}
