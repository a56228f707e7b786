//! Constraint values: sense, right-hand side, sparse coefficients, and the
//! assumption set a derivation still depends on.
//!
//! A [`Constraint`] is either *live* (its coefficient vector and right-hand
//! side are present) or [`trash`](Constraint::trash)ed, in which case its
//! numeric content is gone and any further read is a programming error in
//! this crate (the certificate-level guard against reading a trashed
//! constraint is [`crate::error::CheckerError::UseAfterTrash`], raised
//! *before* a trashed constraint is ever handed to these methods).

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::rational::Rational;
use crate::svector::SparseVector;

/// The relational operator of a constraint, encoded as in the certificate
/// grammar: `L` (`<=`), `E` (`=`), `G` (`>=`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sense {
    /// `<=`
    Le,
    /// `=`
    Eq,
    /// `>=`
    Ge,
}

impl Sense {
    /// The `{-1, 0, +1}` encoding used by the sign-discipline arithmetic.
    pub fn code(self) -> i8 {
        match self {
            Sense::Le => -1,
            Sense::Eq => 0,
            Sense::Ge => 1,
        }
    }

    /// Inverse of [`Sense::code`]; `0` maps to `Eq`, negative to `Le`,
    /// positive to `Ge`.
    pub fn from_code(code: i8) -> Sense {
        match code.signum() {
            -1 => Sense::Le,
            1 => Sense::Ge,
            _ => Sense::Eq,
        }
    }

    /// Parse the single-character sense token from the certificate grammar.
    pub fn from_char(c: char) -> Option<Sense> {
        match c {
            'L' => Some(Sense::Le),
            'E' => Some(Sense::Eq),
            'G' => Some(Sense::Ge),
            _ => None,
        }
    }
}

/// The live numeric content of a constraint: a right-hand side and a
/// compacted sparse coefficient vector.
///
/// The coefficient vector is reference-counted so that a derivation naming
/// `OBJ` shares storage with the header's objective rather than cloning it;
/// equality between constraints is always by value (see
/// [`SparseVector::eq`]), so a shared `OBJ` reference and an independently
/// parsed copy of the same coefficients still compare equal.
#[derive(Clone, Debug)]
struct Live {
    rhs: Rational,
    coef: Rc<SparseVector>,
}

#[derive(Clone, Debug)]
enum Body {
    Live(Live),
    Trashed,
}

/// A single row of the constraint table: an original constraint, a
/// declared assumption, or a derived constraint.
#[derive(Clone, Debug)]
pub struct Constraint {
    label: String,
    sense: Sense,
    body: Body,
    assumptions: BTreeSet<usize>,
    max_ref_idx: Option<usize>,
}

impl Constraint {
    /// Build a live constraint with no assumptions and no forward-reference
    /// bound yet recorded.
    pub fn new(label: impl Into<String>, sense: Sense, rhs: Rational, coef: Rc<SparseVector>) -> Self {
        Constraint {
            label: label.into(),
            sense,
            body: Body::Live(Live { rhs, coef }),
            assumptions: BTreeSet::new(),
            max_ref_idx: None,
        }
    }

    /// Human-readable identifier, used only in diagnostics.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The constraint's relational operator.
    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// `true` once [`Constraint::trash`] has been called.
    pub fn is_trashed(&self) -> bool {
        matches!(self.body, Body::Trashed)
    }

    /// Right-hand side, or `None` if trashed.
    pub fn rhs(&self) -> Option<&Rational> {
        match &self.body {
            Body::Live(l) => Some(&l.rhs),
            Body::Trashed => None,
        }
    }

    /// Coefficient vector, or `None` if trashed.
    pub fn coef(&self) -> Option<&SparseVector> {
        match &self.body {
            Body::Live(l) => Some(&l.coef),
            Body::Trashed => None,
        }
    }

    /// Shared coefficient handle, or `None` if trashed. Used to detect the
    /// "points at the same `OBJ` storage" fast path in the unsplit check.
    pub fn coef_rc(&self) -> Option<&Rc<SparseVector>> {
        match &self.body {
            Body::Live(l) => Some(&l.coef),
            Body::Trashed => None,
        }
    }

    fn live(&self) -> &Live {
        match &self.body {
            Body::Live(l) => l,
            Body::Trashed => panic!("accessed trashed constraint {:?} past the use-after-trash guard", self.label),
        }
    }

    /// The assumption-constraint indices this constraint still depends on.
    pub fn assumptions(&self) -> &BTreeSet<usize> {
        &self.assumptions
    }

    /// Replace the assumption set wholesale (used once per derivation, after
    /// the reason handler has computed the union/merge).
    pub fn set_assumptions(&mut self, assumptions: BTreeSet<usize>) {
        self.assumptions = assumptions;
    }

    /// The certificate-declared index of the last derivation that will ever
    /// reference this constraint, if any.
    pub fn max_ref_idx(&self) -> Option<usize> {
        self.max_ref_idx
    }

    /// Record the `max_ref_idx` the certificate supplied for this
    /// constraint.
    pub fn set_max_ref_idx(&mut self, idx: Option<usize>) {
        self.max_ref_idx = idx;
    }

    /// Release the coefficient vector, right-hand side, and assumption set.
    /// Any subsequent numeric read of this constraint is a programming
    /// error (guarded upstream by `UseAfterTrash`).
    pub fn trash(&mut self) {
        self.body = Body::Trashed;
        self.assumptions.clear();
    }

    /// `true` iff the coefficients are empty and the right-hand side makes
    /// the constraint unconditionally false (e.g. `0 >= 1`).
    pub fn is_falsehood(&self) -> bool {
        let live = self.live();
        if !live.coef.is_empty() {
            return false;
        }
        match self.sense {
            Sense::Le => live.rhs < 0,
            Sense::Ge => live.rhs > 0,
            Sense::Eq => live.rhs.signum() != 0,
        }
    }

    /// `true` iff the coefficients are empty and the right-hand side makes
    /// the constraint unconditionally true (e.g. `0 <= 1`).
    pub fn is_tautology(&self) -> bool {
        let live = self.live();
        if !live.coef.is_empty() {
            return false;
        }
        match self.sense {
            Sense::Eq => live.rhs == 0,
            Sense::Le => live.rhs >= 0,
            Sense::Ge => live.rhs <= 0,
        }
    }

    /// `this ⇒ other`: a falsehood dominates anything; otherwise the
    /// coefficient vectors must be equal by value and the right-hand side
    /// must be at least as tight as `other`'s in the sense-appropriate
    /// direction.
    pub fn dominates(&self, other: &Constraint) -> bool {
        if self.is_falsehood() {
            return true;
        }
        let mine = self.live();
        let theirs = other.live();
        if *mine.coef != *theirs.coef {
            return false;
        }
        match (other.sense, self.sense) {
            (Sense::Ge, Sense::Ge) | (Sense::Ge, Sense::Eq) => mine.rhs >= theirs.rhs,
            (Sense::Le, Sense::Le) | (Sense::Le, Sense::Eq) => mine.rhs <= theirs.rhs,
            (Sense::Eq, Sense::Eq) => mine.rhs == theirs.rhs,
            _ => false,
        }
    }

    /// Round the right-hand side in the direction implied by `sense`,
    /// requiring every coefficient on an integer variable to already be an
    /// integer. `<=` rounds down, `>=` rounds up, `=` is left unchanged.
    pub fn round(&mut self, is_int: &[bool]) -> Result<(), &'static str> {
        let live = match &mut self.body {
            Body::Live(l) => l,
            Body::Trashed => panic!("rounding a trashed constraint"),
        };
        if !live.coef.is_integral_on(is_int) {
            return Err("coefficient of integer variable is not an integer");
        }
        live.rhs = match self.sense {
            Sense::Le => live.rhs.floor(),
            Sense::Ge => live.rhs.ceil(),
            Sense::Eq => live.rhs.clone(),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coef(pairs: &[(usize, i64)]) -> Rc<SparseVector> {
        let mut sv = SparseVector::new();
        for &(i, n) in pairs {
            sv.set(i, Rational::from_i64(n));
        }
        Rc::new(sv)
    }

    #[test]
    fn empty_support_with_bad_rhs_is_falsehood() {
        let c = Constraint::new("c", Sense::Ge, Rational::from_i64(1), coef(&[]));
        assert!(c.is_falsehood());
        let c2 = Constraint::new("c2", Sense::Le, Rational::from_i64(-1), coef(&[]));
        assert!(c2.is_falsehood());
        let eq = Constraint::new("e", Sense::Eq, Rational::from_i64(5), coef(&[]));
        assert!(eq.is_falsehood());
        let eq_neg = Constraint::new("n", Sense::Eq, Rational::from_i64(-5), coef(&[]));
        assert!(eq_neg.is_falsehood());
    }

    #[test]
    fn empty_support_with_ok_rhs_is_tautology() {
        let c = Constraint::new("c", Sense::Ge, Rational::from_i64(-1), coef(&[]));
        assert!(c.is_tautology());
        let eq = Constraint::new("e", Sense::Eq, Rational::zero(), coef(&[]));
        assert!(eq.is_tautology());
    }

    #[test]
    fn falsehood_dominates_anything() {
        let falsehood = Constraint::new("f", Sense::Ge, Rational::from_i64(1), coef(&[]));
        let other = Constraint::new("o", Sense::Eq, Rational::from_i64(42), coef(&[(0, 3)]));
        assert!(falsehood.dominates(&other));
    }

    #[test]
    fn dominates_requires_equal_coefficients_and_tighter_rhs() {
        let tighter = Constraint::new("a", Sense::Ge, Rational::from_i64(5), coef(&[(0, 1)]));
        let looser = Constraint::new("b", Sense::Ge, Rational::from_i64(3), coef(&[(0, 1)]));
        assert!(tighter.dominates(&looser));
        assert!(!looser.dominates(&tighter));

        let different_coef = Constraint::new("c", Sense::Ge, Rational::from_i64(5), coef(&[(1, 1)]));
        assert!(!different_coef.dominates(&looser));
    }

    #[test]
    fn round_requires_integer_coefficients_on_integer_variables() {
        let mut c = Constraint::new(
            "c",
            Sense::Le,
            Rational::from_token("t", "7/2").unwrap(),
            coef(&[(0, 1)]),
        );
        assert!(c.round(&[true]).is_ok());
        assert_eq!(*c.rhs().unwrap(), 3);

        let mut bad = Constraint::new("b", Sense::Ge, Rational::from_i64(1), {
            let mut sv = SparseVector::new();
            sv.set(0, Rational::from_token("t", "1/2").unwrap());
            Rc::new(sv)
        });
        assert!(bad.round(&[true]).is_err());
    }

    #[test]
    fn round_rounds_toward_tightening_direction() {
        let mut le = Constraint::new("l", Sense::Le, Rational::from_token("t", "7/2").unwrap(), coef(&[]));
        le.round(&[]).unwrap();
        assert_eq!(*le.rhs().unwrap(), 3);

        let mut ge = Constraint::new("g", Sense::Ge, Rational::from_token("t", "7/2").unwrap(), coef(&[]));
        ge.round(&[]).unwrap();
        assert_eq!(*ge.rhs().unwrap(), 4);

        let mut eq = Constraint::new("e", Sense::Eq, Rational::from_token("t", "7/2").unwrap(), coef(&[]));
        eq.round(&[]).unwrap();
        assert_eq!(*eq.rhs().unwrap(), Rational::from_token("t", "7/2").unwrap());
    }

    #[test]
    fn trash_makes_numeric_access_unavailable() {
        let mut c = Constraint::new("c", Sense::Eq, Rational::zero(), coef(&[]));
        c.set_assumptions(BTreeSet::from([1, 2]));
        c.trash();
        assert!(c.is_trashed());
        assert!(c.rhs().is_none());
        assert!(c.coef().is_none());
        assert!(c.assumptions().is_empty());
    }
}
