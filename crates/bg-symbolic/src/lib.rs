//! bg-symbolic: the symbolic expression layer used to state governing equations.
//!
//! Provides:
//! - `Symbol`: cheap, ordered, interned-by-name symbolic handles
//! - `Expr`: expression trees (sums, products, quotients, `tanh`, time derivatives)
//! - `Equation` / `StateEquation`: explicit equalities produced by elements
//! - substitution, free-symbol queries, and numeric evaluation against bindings
//!
//! The graph engine only builds and passes these values around; it never
//! looks inside an expression beyond substitution.
//!
//! # Example
//!
//! ```
//! use bg_symbolic::{Bindings, Expr, Symbol};
//!
//! let e = Symbol::new("e_1");
//! let r = Symbol::new("R_load");
//! let flow = Expr::from(&e) / Expr::from(&r);
//!
//! let mut bindings = Bindings::new();
//! bindings.insert(e, 10.0);
//! bindings.insert(r, 4.0);
//! assert_eq!(flow.eval(&bindings).unwrap(), 2.5);
//! ```

pub mod equation;
pub mod error;
pub mod expr;
pub mod symbol;

pub use equation::{Equation, StateEquation};
pub use error::{SymbolicError, SymbolicResult};
pub use expr::{Bindings, Expr, Substitution};
pub use symbol::Symbol;
