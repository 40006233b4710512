use criterion::{criterion_group, criterion_main, Criterion};
use plume_engine::{parse_formula, Expression, NoSelection};
use std::hint::black_box;

fn bench_parse(c: &mut Criterion) {
    let formula = "2*sin(PI/4)+sqrt(A1*A1+H1*H1)/sum(AR,1,32)";
    c.bench_function("parse", |b| {
        b.iter(|| parse_formula(black_box(formula), &NoSelection))
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let mut expr = Expression::new("bench", "2*sin(PI/4)+sqrt(A1*A1+H1*H1)/sum(AR,1,32)");
    expr.parse(&NoSelection).unwrap();
    expr.set_variable("A1", 3.0);
    expr.set_variable("H1", 4.0);
    for i in 1..=32 {
        expr.set_variable(&format!("AR{i}"), 0.5);
    }
    c.bench_function("evaluate", |b| b.iter(|| black_box(&expr).evaluate()));
}

criterion_group!(benches, bench_parse, bench_evaluate);
criterion_main!(benches);
