use plume_engine::bind::bind_scene;
use plume_engine::{EvalError, Expression, NoSelection};
use plume_model::{Facet, FacetCounters, Scene};
use pretty_assertions::assert_eq;

fn names(expr: &Expression) -> Vec<String> {
    (0..expr.variable_count())
        .map(|i| expr.variable_at(i).unwrap().name.clone())
        .collect()
}

#[test]
fn text_round_trips_unchanged() {
    let text = "2*sin( PI/4 ) + sum(AR,1,3)";
    let mut expr = Expression::new("demo", text);
    expr.parse(&NoSelection).unwrap();
    assert_eq!(expr.text(), text);
    assert_eq!(expr.name(), "demo");
}

#[test]
fn reparsing_unchanged_text_yields_identical_tables() {
    let mut expr = Expression::new("", "sum(AR,1,3)/H2");
    expr.parse(&NoSelection).unwrap();
    let first = names(&expr);

    expr.parse(&NoSelection).unwrap();
    assert_eq!(names(&expr), first);
    assert_eq!(first, ["AR1", "AR2", "AR3", "H2"]);
}

#[test]
fn reparse_resets_variable_values() {
    let mut expr = Expression::new("", "X*2");
    expr.parse(&NoSelection).unwrap();
    expr.set_variable("X", 21.0);
    assert_eq!(expr.evaluate(), Ok(42.0));

    // The table is rebuilt from scratch; values return to the interning
    // default until the host populates them again.
    expr.parse(&NoSelection).unwrap();
    assert_eq!(expr.evaluate(), Ok(0.0));
}

#[test]
fn failed_parse_discards_previous_state() {
    let mut expr = Expression::new("", "A1+1");
    expr.parse(&NoSelection).unwrap();
    assert!(expr.is_parsed());
    assert_eq!(expr.variable_count(), 1);

    expr.set_text("A1+");
    let err = expr.parse(&NoSelection).unwrap_err();
    assert!(!expr.is_parsed());
    assert_eq!(expr.variable_count(), 0);
    assert_eq!(expr.error_message(), Some(err.message.as_str()));
    assert_eq!(expr.error_position(), Some(3));
    assert_eq!(expr.evaluate(), Err(EvalError::NotParsed));
}

#[test]
fn successful_parse_clears_the_stored_error() {
    let mut expr = Expression::new("", "1+");
    assert!(expr.parse(&NoSelection).is_err());
    assert!(expr.error_message().is_some());

    expr.set_text("1+1");
    expr.parse(&NoSelection).unwrap();
    assert_eq!(expr.error_message(), None);
    assert_eq!(expr.error_position(), None);
    assert_eq!(expr.evaluate(), Ok(2.0));
}

#[test]
fn stale_tree_survives_text_edits_until_reparse() {
    let mut expr = Expression::new("", "1+1");
    expr.parse(&NoSelection).unwrap();

    // Editing the text alone does not recompile.
    expr.set_text("2+2");
    assert_eq!(expr.evaluate(), Ok(2.0));

    expr.parse(&NoSelection).unwrap();
    assert_eq!(expr.evaluate(), Ok(4.0));
}

#[test]
fn set_variable_is_case_insensitive_and_ignores_unknowns() {
    let mut expr = Expression::new("", "Flux1*2");
    expr.parse(&NoSelection).unwrap();

    expr.set_variable("FLUX1", 3.0);
    assert_eq!(expr.evaluate(), Ok(6.0));

    // Names the formula never referenced are silently ignored.
    expr.set_variable("Flux2", 99.0);
    assert_eq!(expr.variable_count(), 1);
    assert_eq!(expr.evaluate(), Ok(6.0));
}

fn sample_scene() -> Scene {
    let mut scene = Scene::new();
    for i in 0..4u64 {
        scene.add_facet(Facet {
            area: 2.0,
            counters: FacetCounters {
                hits: 1000 * (i + 1),
                absorptions: 100 * (i + 1),
                desorptions: 10 * (i + 1),
            },
        });
    }
    scene
}

#[test]
fn bind_scene_populates_counter_variables() {
    let scene = sample_scene();

    let mut expr = Expression::new("sticking", "A2/H2");
    expr.parse(&scene).unwrap();
    assert_eq!(bind_scene(&mut expr, &scene), 2);
    assert_eq!(expr.evaluate(), Ok(0.1));
}

#[test]
fn bind_scene_skips_unresolved_names() {
    let scene = sample_scene();

    let mut expr = Expression::new("", "A1+CUSTOM");
    expr.parse(&scene).unwrap();
    assert_eq!(bind_scene(&mut expr, &scene), 1);

    // The unresolved slot keeps its current value.
    expr.set_variable("CUSTOM", 0.5);
    assert_eq!(expr.evaluate(), Ok(100.5));
}

#[test]
fn bind_scene_covers_aggregate_expansions() {
    let scene = sample_scene();

    let mut expr = Expression::new("", "sum(A,1,4)/SUMABS");
    expr.parse(&scene).unwrap();
    assert_eq!(bind_scene(&mut expr, &scene), 5);
    assert_eq!(expr.evaluate(), Ok(1.0));
}

#[test]
fn rename_does_not_touch_compiled_state() {
    let mut expr = Expression::new("old", "1+2");
    expr.parse(&NoSelection).unwrap();
    expr.set_name("new");
    assert_eq!(expr.name(), "new");
    assert_eq!(expr.evaluate(), Ok(3.0));
}
