//! Compile-time `int`/`uint` coercion.
//!
//! Initializers of integral declarations are folded to a number when every
//! leaf is a numeric literal or a unit constant, then reduced with the
//! ECMAScript ToInt32/ToUint32 conversions.

use crate::diagnostic::DiagnosticCode;
use crate::writer::Emitter;
use as_parser::{BinaryOp, Expr, ExprKind, Literal, NodeId, StaticType, UnaryOp};
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use thiserror::Error;

const TWO_POW_32: f64 = 4_294_967_296.0;

/// ECMAScript ToUint32.
pub fn to_uint32(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().rem_euclid(TWO_POW_32) as u32
}

/// ECMAScript ToInt32.
pub fn to_int32(value: f64) -> i32 {
    to_uint32(value) as i32
}

/// Parses a numeric literal as written: decimal, exponent or `0x` hex.
/// Hex literals of any width give the nearest double.
pub fn parse_number(raw: &str) -> Option<f64> {
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => parse_hex(hex),
        None => raw.parse::<f64>().ok(),
    }
}

fn parse_hex(digits: &str) -> Option<f64> {
    if let Ok(value) = u128::from_str_radix(digits, 16) {
        return Some(value as f64);
    }
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(16).map(|digit| acc * 16.0 + f64::from(digit))
    })
}

/// A value reduced to an integral type.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduced {
    /// Literal text to emit.
    pub text: String,
    /// True when the truncated value did not fit and was wrapped.
    pub overflow: bool,
}

/// Reduces `value` to `ty`. Returns `None` for non-integral types.
pub fn reduce(value: f64, ty: &StaticType) -> Option<Reduced> {
    let (wrapped, truncated) = match ty {
        StaticType::Int => (to_int32(value) as f64, value.trunc()),
        StaticType::Uint => (to_uint32(value) as f64, value.trunc()),
        _ => return None,
    };
    Some(Reduced {
        text: format!("{}", wrapped),
        overflow: truncated != wrapped,
    })
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FoldError {
    #[error("constant {name} depends on itself")]
    Cycle { name: SmolStr },
}

/// Evaluates `expr` if it is a compile-time number.
///
/// `visited` holds the constants currently being expanded; meeting one of
/// them again is a cycle.
pub fn fold(
    expr: &Expr,
    constants: &FxHashMap<NodeId, Expr>,
    visited: &mut FxHashSet<NodeId>,
) -> Result<Option<f64>, FoldError> {
    let value = match &expr.kind {
        ExprKind::Literal(Literal::Number(raw)) => parse_number(raw),
        ExprKind::Paren(inner) => fold(inner, constants, visited)?,
        ExprKind::Identifier(ident) => {
            fold_constant(&ident.name, ident.binding.constant(), constants, visited)?
        }
        ExprKind::Member { property, .. } => {
            fold_constant(&property.name, property.binding.constant(), constants, visited)?
        }
        ExprKind::Unary { op, operand } => {
            let Some(v) = fold(operand, constants, visited)? else {
                return Ok(None);
            };
            match op {
                UnaryOp::Neg => Some(-v),
                UnaryOp::Plus => Some(v),
                UnaryOp::BitNot => Some(!to_int32(v) as f64),
                _ => None,
            }
        }
        ExprKind::Binary {
            op,
            left,
            right: Some(right),
        } => {
            let Some(l) = fold(left, constants, visited)? else {
                return Ok(None);
            };
            let Some(r) = fold(right, constants, visited)? else {
                return Ok(None);
            };
            binary(*op, l, r)
        }
        _ => None,
    };
    Ok(value)
}

fn fold_constant(
    name: &SmolStr,
    constant: Option<NodeId>,
    constants: &FxHashMap<NodeId, Expr>,
    visited: &mut FxHashSet<NodeId>,
) -> Result<Option<f64>, FoldError> {
    let Some(id) = constant else {
        return Ok(None);
    };
    let Some(init) = constants.get(&id) else {
        return Ok(None);
    };
    if !visited.insert(id) {
        return Err(FoldError::Cycle { name: name.clone() });
    }
    let value = fold(init, constants, visited);
    visited.remove(&id);
    value
}

fn binary(op: BinaryOp, l: f64, r: f64) -> Option<f64> {
    let shift = to_uint32(r) & 31;
    let value = match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div => l / r,
        BinaryOp::Rem => l % r,
        BinaryOp::Shl => to_int32(l).wrapping_shl(shift) as f64,
        BinaryOp::Shr => (to_int32(l) >> shift) as f64,
        BinaryOp::UShr => (to_uint32(l) >> shift) as f64,
        BinaryOp::BitAnd => (to_int32(l) & to_int32(r)) as f64,
        BinaryOp::BitOr => (to_int32(l) | to_int32(r)) as f64,
        BinaryOp::BitXor => (to_int32(l) ^ to_int32(r)) as f64,
        _ => return None,
    };
    Some(value)
}

impl Emitter<'_> {
    /// Emits an initializer or assigned value for a declaration of type `ty`,
    /// reducing it at compile time when the type is `int` or `uint`.
    pub(crate) fn emit_value(&mut self, value: &Expr, ty: &StaticType) {
        if !ty.is_integral() {
            self.emit_expr(value);
            return;
        }

        let mut visited = FxHashSet::default();
        match fold(value, &self.unit.constants, &mut visited) {
            Ok(Some(number)) => {
                let Some(reduced) = reduce(number, ty) else {
                    self.emit_expr(value);
                    return;
                };
                if reduced.overflow {
                    self.report(
                        DiagnosticCode::CoercionOverflow,
                        format!(
                            "{} does not fit in {}; emitted {}",
                            number,
                            type_name(ty),
                            reduced.text
                        ),
                        &value.loc,
                    );
                }
                self.write_mapped(&reduced.text, &value.loc);
            }
            Ok(None) => self.emit_expr(value),
            Err(err) => {
                self.report(DiagnosticCode::ConstantCycle, err.to_string(), &value.loc);
                self.emit_expr(value);
            }
        }
    }
}

fn type_name(ty: &StaticType) -> &'static str {
    match ty {
        StaticType::Uint => "uint",
        _ => "int",
    }
}
