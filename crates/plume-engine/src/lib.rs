#![forbid(unsafe_code)]
#![deny(unreachable_patterns)]

//! Formula engine for simulation-derived named quantities.
//!
//! A user types an algebraic expression referencing per-facet counters (e.g.
//! `A5/SUMABS` or `sum(AR,1,10)`); parsing compiles it to an expression tree
//! while discovering and registering the referenced variables, and the host
//! re-evaluates the tree whenever fresh counter values are available.
//!
//! The typical flow goes through [`Expression`]:
//!
//! ```
//! use plume_engine::{Expression, NoSelection};
//!
//! let mut formula = Expression::new("sticking", "A1/H1");
//! formula.parse(&NoSelection)?;
//! formula.set_variable("A1", 25.0);
//! formula.set_variable("H1", 100.0);
//! assert_eq!(formula.evaluate()?, 0.25);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The `sum(...)` aggregate expands at parse time over numeric ranges, saved
//! selection groups, or the current selection; the scene state behind the two
//! selection forms is read through [`SelectionSource`].

pub mod ast;
pub mod bind;
pub mod error;
pub mod eval;
pub mod expression;
pub mod functions;
pub mod parser;
pub mod selection;
pub mod variable;

pub use ast::{BinaryOp, Expr, ParseError, Span, UnaryOp, VarId};
pub use error::EvalError;
pub use expression::Expression;
pub use parser::{MAX_FORMULA_CHARS, MAX_VARIABLE_NAME_CHARS};
pub use selection::{NoSelection, SelectionSource};
pub use variable::{Variable, VariableTable};

/// Parse a formula into an expression tree plus its discovered variables.
///
/// Selection-dependent `sum(...)` forms are resolved against `selection` at
/// parse time; hosts without a scene can pass [`NoSelection`].
pub fn parse_formula(
    text: &str,
    selection: &dyn SelectionSource,
) -> Result<(Expr, VariableTable), ParseError> {
    parser::parse(text, selection)
}
