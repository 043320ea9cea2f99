//! Expression trees.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use bg_core::Real;

use crate::error::{SymbolicError, SymbolicResult};
use crate::symbol::Symbol;

/// Numeric values for symbols, used by [`Expr::eval`].
pub type Bindings = BTreeMap<Symbol, Real>;

/// Symbol replacements, used by [`Expr::substitute`].
pub type Substitution = BTreeMap<Symbol, Expr>;

/// A symbolic expression.
///
/// Build expressions with the arithmetic operators and the constructors
/// below rather than the variants directly; the constructors flatten nested
/// sums and products and drop identity terms so printed equations stay short.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(Real),
    Sym(Symbol),
    Neg(Box<Expr>),
    Sum(Vec<Expr>),
    Product(Vec<Expr>),
    Quotient(Box<Expr>, Box<Expr>),
    Tanh(Box<Expr>),
    /// Time derivative of a symbol, `d(x)/dt`. Left opaque: it is never
    /// substituted into and cannot be evaluated.
    Derivative(Symbol),
}

impl Expr {
    pub fn constant(value: Real) -> Self {
        Expr::Const(value)
    }

    pub fn zero() -> Self {
        Expr::Const(0.0)
    }

    pub fn one() -> Self {
        Expr::Const(1.0)
    }

    pub fn sym(symbol: &Symbol) -> Self {
        Expr::Sym(symbol.clone())
    }

    pub fn derivative(symbol: &Symbol) -> Self {
        Expr::Derivative(symbol.clone())
    }

    pub fn tanh(arg: Expr) -> Self {
        Expr::Tanh(Box::new(arg))
    }

    /// Sum of terms. Nested sums are flattened and zero constants dropped.
    pub fn sum(terms: impl IntoIterator<Item = Expr>) -> Self {
        let mut flat = Vec::new();
        for term in terms {
            match term {
                Expr::Sum(inner) => flat.extend(inner),
                Expr::Const(c) if c == 0.0 => {}
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Expr::zero(),
            1 => flat.pop().unwrap_or_else(Expr::zero),
            _ => Expr::Sum(flat),
        }
    }

    /// Product of factors. Nested products are flattened and unit constants dropped.
    pub fn product(factors: impl IntoIterator<Item = Expr>) -> Self {
        let mut flat = Vec::new();
        for factor in factors {
            match factor {
                Expr::Product(inner) => flat.extend(inner),
                Expr::Const(c) if c == 1.0 => {}
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Expr::one(),
            1 => flat.pop().unwrap_or_else(Expr::one),
            _ => Expr::Product(flat),
        }
    }

    pub fn quotient(num: Expr, den: Expr) -> Self {
        if den == Expr::one() {
            return num;
        }
        Expr::Quotient(Box::new(num), Box::new(den))
    }

    /// Replace every free occurrence of a mapped symbol.
    ///
    /// Replacement is simultaneous (a single pass); symbols introduced by a
    /// replacement are not themselves replaced.
    pub fn substitute(&self, map: &Substitution) -> Expr {
        match self {
            Expr::Const(c) => Expr::Const(*c),
            Expr::Sym(s) => map.get(s).cloned().unwrap_or_else(|| Expr::Sym(s.clone())),
            Expr::Neg(inner) => -inner.substitute(map),
            Expr::Sum(terms) => Expr::sum(terms.iter().map(|t| t.substitute(map))),
            Expr::Product(factors) => Expr::product(factors.iter().map(|f| f.substitute(map))),
            Expr::Quotient(num, den) => Expr::quotient(num.substitute(map), den.substitute(map)),
            Expr::Tanh(arg) => Expr::tanh(arg.substitute(map)),
            Expr::Derivative(s) => Expr::Derivative(s.clone()),
        }
    }

    /// Symbols appearing outside of derivative markers.
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<Symbol>) {
        match self {
            Expr::Const(_) | Expr::Derivative(_) => {}
            Expr::Sym(s) => {
                out.insert(s.clone());
            }
            Expr::Neg(inner) | Expr::Tanh(inner) => inner.collect_symbols(out),
            Expr::Sum(items) | Expr::Product(items) => {
                for item in items {
                    item.collect_symbols(out);
                }
            }
            Expr::Quotient(num, den) => {
                num.collect_symbols(out);
                den.collect_symbols(out);
            }
        }
    }

    /// Symbols appearing under a time-derivative marker.
    pub fn derivative_symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.collect_derivatives(&mut out);
        out
    }

    fn collect_derivatives(&self, out: &mut BTreeSet<Symbol>) {
        match self {
            Expr::Derivative(s) => {
                out.insert(s.clone());
            }
            Expr::Const(_) | Expr::Sym(_) => {}
            Expr::Neg(inner) | Expr::Tanh(inner) => inner.collect_derivatives(out),
            Expr::Sum(items) | Expr::Product(items) => {
                for item in items {
                    item.collect_derivatives(out);
                }
            }
            Expr::Quotient(num, den) => {
                num.collect_derivatives(out);
                den.collect_derivatives(out);
            }
        }
    }

    pub fn contains_symbol(&self, symbol: &Symbol) -> bool {
        match self {
            Expr::Sym(s) => s == symbol,
            Expr::Const(_) | Expr::Derivative(_) => false,
            Expr::Neg(inner) | Expr::Tanh(inner) => inner.contains_symbol(symbol),
            Expr::Sum(items) | Expr::Product(items) => {
                items.iter().any(|item| item.contains_symbol(symbol))
            }
            Expr::Quotient(num, den) => num.contains_symbol(symbol) || den.contains_symbol(symbol),
        }
    }

    /// Evaluate numerically. Every free symbol must be bound.
    pub fn eval(&self, bindings: &Bindings) -> SymbolicResult<Real> {
        let value = self.eval_inner(bindings)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(SymbolicError::NonFinite {
                expr: self.to_string(),
            })
        }
    }

    fn eval_inner(&self, bindings: &Bindings) -> SymbolicResult<Real> {
        Ok(match self {
            Expr::Const(c) => *c,
            Expr::Sym(s) => *bindings
                .get(s)
                .ok_or_else(|| SymbolicError::UnboundSymbol {
                    symbol: s.to_string(),
                })?,
            Expr::Neg(inner) => -inner.eval_inner(bindings)?,
            Expr::Sum(terms) => {
                let mut acc = 0.0;
                for term in terms {
                    acc += term.eval_inner(bindings)?;
                }
                acc
            }
            Expr::Product(factors) => {
                let mut acc = 1.0;
                for factor in factors {
                    acc *= factor.eval_inner(bindings)?;
                }
                acc
            }
            Expr::Quotient(num, den) => num.eval_inner(bindings)? / den.eval_inner(bindings)?,
            Expr::Tanh(arg) => arg.eval_inner(bindings)?.tanh(),
            Expr::Derivative(s) => {
                return Err(SymbolicError::Derivative {
                    symbol: s.to_string(),
                });
            }
        })
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Sum(_) => 1,
            Expr::Product(_) | Expr::Quotient(..) => 2,
            Expr::Neg(_) => 3,
            Expr::Const(c) if *c < 0.0 => 3,
            _ => 4,
        }
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Expr::Sym(symbol)
    }
}

impl From<&Symbol> for Expr {
    fn from(symbol: &Symbol) -> Self {
        Expr::Sym(symbol.clone())
    }
}

impl From<Real> for Expr {
    fn from(value: Real) -> Self {
        Expr::Const(value)
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::sum([self, rhs])
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::sum([self, -rhs])
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::product([self, rhs])
    }
}

impl Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        Expr::quotient(self, rhs)
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        match self {
            Expr::Neg(inner) => *inner,
            Expr::Const(c) => Expr::Const(-c),
            other => Expr::Neg(Box::new(other)),
        }
    }
}

fn write_child(f: &mut fmt::Formatter<'_>, child: &Expr, min_prec: u8) -> fmt::Result {
    if child.precedence() < min_prec {
        write!(f, "({child})")
    } else {
        write!(f, "{child}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(c) => write!(f, "{c}"),
            Expr::Sym(s) => write!(f, "{s}"),
            Expr::Neg(inner) => {
                f.write_str("-")?;
                write_child(f, inner, 4)
            }
            Expr::Sum(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    match term {
                        Expr::Neg(inner) if i > 0 => {
                            f.write_str(" - ")?;
                            write_child(f, inner, 2)?;
                        }
                        Expr::Const(c) if i > 0 && *c < 0.0 => write!(f, " - {}", -c)?,
                        _ => {
                            if i > 0 {
                                f.write_str(" + ")?;
                            }
                            write_child(f, term, 2)?;
                        }
                    }
                }
                Ok(())
            }
            Expr::Product(factors) => {
                for (i, factor) in factors.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" * ")?;
                    }
                    write_child(f, factor, 2)?;
                }
                Ok(())
            }
            Expr::Quotient(num, den) => {
                write_child(f, num, 2)?;
                f.write_str(" / ")?;
                write_child(f, den, 3)
            }
            Expr::Tanh(arg) => write!(f, "tanh({arg})"),
            Expr::Derivative(s) => write!(f, "d({s})/dt"),
        }
    }
}
