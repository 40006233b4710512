//! Scene-to-formula variable binding.
//!
//! Formulas reference simulation quantities through conventionally named
//! variables: a counter prefix followed by a 1-based facet number, plus a few
//! scene-wide totals. This module is the host-side population loop: after a
//! successful parse it walks every discovered variable once and writes the
//! matching live value into the table.
//!
//! | pattern  | quantity                          |
//! |----------|-----------------------------------|
//! | `A<n>`   | absorptions on facet `n`          |
//! | `H<n>`   | hits on facet `n`                 |
//! | `D<n>`   | desorptions on facet `n`          |
//! | `AR<n>`  | area of facet `n`                 |
//! | `SUMABS` | absorptions summed over all facets|
//! | `SUMHIT` | hits summed over all facets       |
//! | `SUMDES` | desorptions summed over all facets|
//!
//! Names that match no pattern are left at their current value; they are
//! reported as unresolved rather than treated as an error, since a host may
//! bind them from another source afterwards.

use crate::expression::Expression;
use plume_model::Scene;

/// Write live scene values into every resolvable variable of `expression`.
///
/// Returns the number of variables populated. Unresolved names are logged
/// and skipped.
pub fn bind_scene(expression: &mut Expression, scene: &Scene) -> usize {
    let mut bound = 0;
    for index in 0..expression.variable_count() {
        let name = match expression.variable_at(index) {
            Some(variable) => variable.name.clone(),
            None => break,
        };
        match resolve(&name, scene) {
            Some(value) => {
                expression.set_variable(&name, value);
                bound += 1;
            }
            None => {
                log::warn!("unresolved formula variable `{name}`");
            }
        }
    }
    bound
}

/// Resolve one conventional variable name against the scene.
#[must_use]
pub fn resolve(name: &str, scene: &Scene) -> Option<f64> {
    if name.eq_ignore_ascii_case("sumabs") {
        return Some(scene.facets().iter().map(|f| f.counters.absorptions as f64).sum());
    }
    if name.eq_ignore_ascii_case("sumhit") {
        return Some(scene.facets().iter().map(|f| f.counters.hits as f64).sum());
    }
    if name.eq_ignore_ascii_case("sumdes") {
        return Some(scene.facets().iter().map(|f| f.counters.desorptions as f64).sum());
    }

    // Longest prefix first: `AR5` must not read as `A` + "R5".
    let (prefix, digits) = split_prefix(name)?;
    let number: usize = digits.parse().ok()?;
    let facet = scene.facet(number.checked_sub(1)?)?;

    if prefix.eq_ignore_ascii_case("ar") {
        Some(facet.area)
    } else if prefix.eq_ignore_ascii_case("a") {
        Some(facet.counters.absorptions as f64)
    } else if prefix.eq_ignore_ascii_case("h") {
        Some(facet.counters.hits as f64)
    } else if prefix.eq_ignore_ascii_case("d") {
        Some(facet.counters.desorptions as f64)
    } else {
        None
    }
}

fn split_prefix(name: &str) -> Option<(&str, &str)> {
    let digits_at = name.find(|c: char| c.is_ascii_digit())?;
    let (prefix, digits) = name.split_at(digits_at);
    if prefix.is_empty() || digits.chars().any(|c| !c.is_ascii_digit()) {
        return None;
    }
    Some((prefix, digits))
}
