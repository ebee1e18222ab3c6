//! Row-predicate expression language for the filter stage.
//!
//! A filter expression is a single boolean expression over column values:
//!
//! ```text
//! clicks > 100 AND NOT contains(page, "/tag/")
//! ```
//!
//! Supported: comparison operators (`== != > >= < <=`), logical `AND`,
//! `OR`, `NOT` (case-insensitive, `&& || !` also accepted), parentheses,
//! string/number/boolean/null literals, bare column identifiers, and the
//! string predicates `contains`, `starts_with`, `ends_with`.
//!
//! Parsing and evaluation are separate steps: [`parse_predicate`] produces
//! an [`Expr`] tree, [`evaluate_predicate`] runs it against one row.

pub mod ast;
pub mod evaluator;
pub mod lexer;

pub use ast::{BinaryOperator, Expr};
pub use evaluator::{evaluate_predicate, parse_predicate};
