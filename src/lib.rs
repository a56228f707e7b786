//! Crate root: public surface for the VIPR certificate checker and
//! reorderer.
//!
//! A VIPR certificate is a whitespace-delimited, line-oblivious text file
//! that claims either that a mixed-integer program is infeasible, or that
//! its optimal value lies in some range, and backs the claim with a chain
//! of derivations built from the original constraints by nonnegative linear
//! combination, integer rounding, branch unsplitting, and primal cutoff.
//! [`checker::check`] replays that chain in exact rational arithmetic and
//! either returns a [`checker::Verdict`] or the first rule it violated.
//! [`reorder::reorder`] rewrites an already-valid certificate into
//! dependency order (or trims derivations nothing depends on) without
//! re-deriving the proof.
//!
//! ## Invariants
//!
//! - **Exact arithmetic.** Every numeric comparison in this crate is over
//!   [`rational::Rational`], an arbitrary-precision fraction; nothing here
//!   ever touches a float, so there is no tolerance or epsilon to tune.
//! - **Fail fast, fail precise.** A malformed token, an out-of-range index,
//!   a sign-discipline violation, or a use of a trashed constraint is a
//!   single terminal [`error::CheckerError`] naming exactly what was wrong;
//!   there is no partial verdict and no recovery.
//! - **Single pass, bounded memory.** The checker reads the certificate
//!   once, in order, and never holds more of the constraint table live than
//!   the certificate's own `max_ref_idx` annotations require — see
//!   [`constraint::Constraint::trash`].

#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms)]

/// Exact-arithmetic facade (`num-bigint` / `num-rational`).
pub mod rational;

/// Sparse rational vectors over variable indices.
pub mod svector;

/// Constraint values: sense, right-hand side, coefficients, assumptions.
pub mod constraint;

/// Whitespace-delimited tokenizer for the certificate grammar.
pub mod parser;

/// Crate-wide error taxonomy.
pub mod error;

/// Certificate verification: section parsers, derivation rules, verdicts.
pub mod checker;

/// Topological reorderer and trimmer for already-valid certificates.
pub mod reorder;

pub use checker::{Verdict, check, check_file};
pub use error::{CheckerError, ReorderError};
pub use reorder::{ReorderMode, reorder, reorder_file};
