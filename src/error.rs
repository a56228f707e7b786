//! Crate-wide error taxonomy.
//!
//! Every failure mode named by the certificate grammar and the derivation
//! rules gets its own variant here so that callers — and the `eprintln!`
//! diagnostics in the CLI binaries — can report the offending label, index,
//! or token without re-deriving it from a generic message string.
//!
//! Propagation policy: every error is fatal at the point of detection. There
//! is no local recovery and no partial output; a library function either
//! returns `Ok` or the single `Err` that ended the computation.

/// Errors raised while parsing or checking a VIPR certificate.
#[derive(Debug, thiserror::Error)]
pub enum CheckerError {
    /// A token did not match what the grammar expected at this point.
    #[error("{context}: expected {expected}, found {found:?}")]
    Parse {
        /// Section or construct being parsed (e.g. `"VAR section"`).
        context: String,
        /// Human-readable description of what was expected.
        expected: String,
        /// The offending token, or `None` at end of file.
        found: Option<String>,
    },

    /// A numeric token could not be parsed as an integer or rational.
    #[error("{context}: invalid number token {token:?}")]
    BadNumber {
        /// Section or construct being parsed.
        context: String,
        /// The offending token.
        token: String,
    },

    /// A variable or constraint index fell outside its declared range.
    #[error("{context}: index {index} out of bounds (0..{bound})")]
    IndexOutOfBounds {
        /// Section or construct being parsed.
        context: String,
        /// The offending index.
        index: usize,
        /// The exclusive upper bound that was violated.
        bound: usize,
    },

    /// The `VER` line named a format version this checker does not support.
    #[error("certificate format version {major}.{minor} is unsupported")]
    VersionUnsupported {
        /// Major version from the `VER` line.
        major: u32,
        /// Minor version from the `VER` line.
        minor: u32,
    },

    /// A declared solution violated integrality, an original constraint, or
    /// the stated objective bound.
    #[error("solution {label:?}: {reason}")]
    SolutionViolation {
        /// Label of the offending solution.
        label: String,
        /// Description of what was violated.
        reason: String,
    },

    /// A derivation's local check (dominance, sign discipline, rounding,
    /// unsplit predicate, or cutoff slack) failed.
    #[error("failed to derive {label:?}: {reason}")]
    DerivationInvalid {
        /// Label of the derivation that failed.
        label: String,
        /// Description of what failed.
        reason: String,
    },

    /// A derivation referenced a constraint whose `max_ref_idx` said it
    /// would never be needed again.
    #[error("use after trash: constraint {index} ({label:?}) was already released")]
    UseAfterTrash {
        /// Index of the trashed constraint.
        index: usize,
        /// Label of the trashed constraint.
        label: String,
    },

    /// The final derivation still depends on assumptions that were never
    /// discharged by a matching `uns` unsplit.
    #[error("final derivation has undischarged assumptions: {0:?}")]
    UndischargedAssumption(Vec<usize>),

    /// I/O failure reading the certificate file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CheckerError {
    pub(crate) fn parse(
        context: impl Into<String>,
        expected: impl Into<String>,
        found: Option<impl Into<String>>,
    ) -> Self {
        CheckerError::Parse {
            context: context.into(),
            expected: expected.into(),
            found: found.map(Into::into),
        }
    }
}

/// Errors specific to the topological reorderer / trimmer.
#[derive(Debug, thiserror::Error)]
pub enum ReorderError {
    /// The reference graph built from `lin`/`rnd`/`uns` edges is not a DAG.
    #[error("cycle detected in reference graph at derivation {0}")]
    Cycle(usize),

    /// Parsing the certificate failed (shared grammar with the checker).
    #[error(transparent)]
    Parse(#[from] CheckerError),

    /// I/O failure reading or writing a certificate file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
