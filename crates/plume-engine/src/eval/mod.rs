//! Tree-walking evaluation.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::EvalError;
use crate::functions::math;
use crate::variable::VariableTable;

/// Evaluate `expr` against the current variable values.
///
/// Walks the tree post-order. The first failing node wins: once an operand
/// errors, no enclosing operation is applied and no partial numeric value is
/// ever surfaced to the caller.
pub fn evaluate(expr: &Expr, variables: &VariableTable) -> Result<f64, EvalError> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Variable(id) => Ok(variables.value(*id)),
        Expr::Unary { op, expr } => {
            let operand = evaluate(expr, variables)?;
            apply_unary(*op, operand)
        }
        Expr::Binary { op, left, right } => {
            let lhs = evaluate(left, variables)?;
            let rhs = evaluate(right, variables)?;
            apply_binary(*op, lhs, rhs)
        }
    }
}

fn apply_unary(op: UnaryOp, x: f64) -> Result<f64, EvalError> {
    match op {
        UnaryOp::Neg => Ok(-x),
        UnaryOp::Abs => Ok(x.abs()),
        UnaryOp::Sin => math::sin(x),
        UnaryOp::Cos => math::cos(x),
        UnaryOp::Tan => math::tan(x),
        UnaryOp::Asin => math::asin(x),
        UnaryOp::Acos => math::acos(x),
        UnaryOp::Atan => math::atan(x),
        UnaryOp::Sinh => math::sinh(x),
        UnaryOp::Cosh => math::cosh(x),
        UnaryOp::Tanh => math::tanh(x),
        UnaryOp::Exp => math::exp(x),
        UnaryOp::Ln => math::ln(x),
        UnaryOp::Log2 => math::log2(x),
        UnaryOp::Log10 => math::log10(x),
        UnaryOp::Inv => math::inv(x),
        UnaryOp::Sqrt => math::sqrt(x),
        UnaryOp::Fact => math::fact(x),
    }
}

fn apply_binary(op: BinaryOp, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
    match op {
        BinaryOp::Add => Ok(lhs + rhs),
        BinaryOp::Sub => Ok(lhs - rhs),
        BinaryOp::Mul => Ok(lhs * rhs),
        BinaryOp::Div => {
            if rhs == 0.0 {
                Err(EvalError::DivideByZero)
            } else {
                Ok(lhs / rhs)
            }
        }
        // Two opcodes, one kernel: `a^b` and `pow(a, b)` must never diverge.
        BinaryOp::Pow | BinaryOp::PowCall => math::power(lhs, rhs),
        BinaryOp::Ci95 => math::ci95(lhs, rhs),
    }
}
