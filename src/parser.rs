//! Whitespace-delimited tokenizer for the certificate grammar.
//!
//! The grammar is line-oblivious: newlines are ordinary whitespace except
//! inside a `%` comment, and `%` comments are only recognized while still
//! looking for the `VER` line (`skip_preamble`). Every token-consuming method
//! here reports failure as a [`CheckerError::Parse`] rather than a panic;
//! nothing in this module ever guesses at recovery.

use std::io::Read;

use crate::error::CheckerError;
use crate::svector::SparseVector;

/// Either the literal keyword `OBJ` (reuse the objective's coefficients) or
/// an explicit list of `(index, value)` pairs.
#[derive(Clone, Debug)]
pub enum VectorLiteral {
    /// `OBJ` — caller substitutes the header's objective coefficients.
    Obj,
    /// An explicit, already-index-checked sparse vector.
    Explicit(SparseVector),
}

/// A rational bound that may instead be one of the `-inf` / `inf` sentinels
/// used in `RTP range <lower> <upper>`.
#[derive(Clone, Debug)]
pub enum Bound {
    /// `-inf`.
    NegInfinity,
    /// `inf`.
    PosInfinity,
    /// An ordinary rational literal.
    Finite(crate::rational::Rational),
}

/// A pull tokenizer over any byte source, tracking the byte offset of the
/// position just past the most recently returned token.
///
/// The offset is meaningful to a caller that later reopens the same
/// underlying file and seeks there (see `reorder`): it always lands at or
/// before the start of the next token, since only look-ahead whitespace is
/// ever buffered past it.
pub struct Tokenizer<R> {
    bytes: std::io::Bytes<R>,
    consumed: u64,
    pending: Option<u8>,
}

impl<R: Read> Tokenizer<R> {
    /// Wrap `reader`, starting at its current position.
    pub fn new(reader: R) -> Self {
        Tokenizer {
            bytes: reader.bytes(),
            consumed: 0,
            pending: None,
        }
    }

    fn read_raw(&mut self) -> Result<Option<u8>, CheckerError> {
        if let Some(b) = self.pending.take() {
            return Ok(Some(b));
        }
        match self.bytes.next() {
            Some(Ok(b)) => {
                self.consumed += 1;
                Ok(Some(b))
            }
            Some(Err(e)) => Err(CheckerError::Io(e)),
            None => Ok(None),
        }
    }

    fn unread(&mut self, b: u8) {
        self.pending = Some(b);
    }

    /// Byte offset immediately past the last token this tokenizer returned;
    /// unaffected by whitespace buffered ahead of that point.
    pub fn pos(&self) -> u64 {
        self.consumed - self.pending.is_some() as u64
    }

    /// Skip whitespace and, once inside a comment, everything up to and
    /// including the next newline. Only ever called before `VER` is seen:
    /// the grammar permits `%` comment lines there and nowhere else.
    pub fn skip_preamble(&mut self) -> Result<(), CheckerError> {
        loop {
            match self.read_raw()? {
                None => return Ok(()),
                Some(b) if b.is_ascii_whitespace() => continue,
                Some(b'%') => loop {
                    match self.read_raw()? {
                        None => return Ok(()),
                        Some(b'\n') => break,
                        Some(_) => continue,
                    }
                },
                Some(b) => {
                    self.unread(b);
                    return Ok(());
                }
            }
        }
    }

    /// Next whitespace-delimited token, or `None` at end of file.
    pub fn next_token(&mut self) -> Result<Option<String>, CheckerError> {
        loop {
            match self.read_raw()? {
                None => return Ok(None),
                Some(b) if b.is_ascii_whitespace() => continue,
                Some(b) => {
                    self.unread(b);
                    break;
                }
            }
        }
        let mut buf = Vec::new();
        loop {
            match self.read_raw()? {
                None => break,
                Some(b) if b.is_ascii_whitespace() => {
                    self.unread(b);
                    break;
                }
                Some(b) => buf.push(b),
            }
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Next token, or a [`CheckerError::Parse`] naming `expected` at EOF.
    pub fn expect_token(&mut self, context: &str, expected: &str) -> Result<String, CheckerError> {
        self.next_token()?
            .ok_or_else(|| CheckerError::parse(context, expected, None::<String>))
    }

    /// Next token, required to equal `keyword` exactly.
    pub fn expect_keyword(&mut self, context: &str, keyword: &str) -> Result<(), CheckerError> {
        let tok = self.expect_token(context, &format!("keyword {keyword:?}"))?;
        if tok != keyword {
            return Err(CheckerError::parse(context, format!("keyword {keyword:?}"), Some(tok)));
        }
        Ok(())
    }

    /// Next token as a nonnegative array length / index.
    pub fn expect_usize(&mut self, context: &str) -> Result<usize, CheckerError> {
        let tok = self.expect_token(context, "nonnegative integer")?;
        tok.parse::<usize>()
            .map_err(|_| CheckerError::parse(context, "nonnegative integer", Some(tok)))
    }

    /// Next token as a signed integer (used for `max_ref_idx`, where `-1` is
    /// the "unused" sentinel).
    pub fn expect_i64(&mut self, context: &str) -> Result<i64, CheckerError> {
        let tok = self.expect_token(context, "integer")?;
        tok.parse::<i64>()
            .map_err(|_| CheckerError::parse(context, "integer", Some(tok)))
    }

    /// Read an explicit (non-`OBJ`) sparse vector: `<k> <idx> <val> ...`.
    /// Used for the `OBJ` section itself, which cannot refer to itself.
    pub fn read_explicit_sparse_vector(&mut self, context: &str, num_var: usize) -> Result<SparseVector, CheckerError> {
        match self.read_sparse_vector(context, num_var)? {
            VectorLiteral::Explicit(sv) => Ok(sv),
            VectorLiteral::Obj => Err(CheckerError::parse(context, "explicit coefficient list", Some("OBJ"))),
        }
    }

    /// Next token as a rational via [`crate::rational::Rational::from_token`].
    pub fn expect_rational(&mut self, context: &str) -> Result<crate::rational::Rational, CheckerError> {
        let tok = self.expect_token(context, "rational number")?;
        crate::rational::Rational::from_token(context, &tok)
    }

    /// Next token as a rational bound, recognizing the `-inf` / `inf`
    /// sentinels used in `RTP range`.
    pub fn expect_bound(&mut self, context: &str) -> Result<Bound, CheckerError> {
        let tok = self.expect_token(context, "rational number, -inf, or inf")?;
        match tok.as_str() {
            "-inf" => Ok(Bound::NegInfinity),
            "inf" => Ok(Bound::PosInfinity),
            _ => crate::rational::Rational::from_token(context, &tok).map(Bound::Finite),
        }
    }

    /// Next token as a sense character (`E`, `L`, or `G`).
    pub fn expect_sense(&mut self, context: &str) -> Result<crate::constraint::Sense, CheckerError> {
        let tok = self.expect_token(context, "sense (E, L, or G)")?;
        let mut chars = tok.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return Err(CheckerError::parse(context, "single-character sense", Some(tok)));
        };
        crate::constraint::Sense::from_char(c)
            .ok_or_else(|| CheckerError::parse(context, "sense (E, L, or G)", Some(tok)))
    }

    /// Read a sparse vector literal: either `OBJ` or `<k> <idx> <val> ...`,
    /// rejecting any index outside `[0, num_var)`.
    pub fn read_sparse_vector(&mut self, context: &str, num_var: usize) -> Result<VectorLiteral, CheckerError> {
        let tok = self.expect_token(context, "OBJ or a coefficient count")?;
        if tok == "OBJ" {
            return Ok(VectorLiteral::Obj);
        }
        let k: usize = tok
            .parse()
            .map_err(|_| CheckerError::parse(context, "OBJ or a coefficient count", Some(tok)))?;
        let mut sv = SparseVector::new();
        for _ in 0..k {
            let idx = self.expect_usize(context)?;
            if idx >= num_var {
                return Err(CheckerError::IndexOutOfBounds {
                    context: context.to_string(),
                    index: idx,
                    bound: num_var,
                });
            }
            let val = self.expect_rational(context)?;
            sv.set(idx, val);
        }
        Ok(VectorLiteral::Explicit(sv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn skips_comment_lines_before_first_token() {
        let mut t = Tokenizer::new(Cursor::new(b"% a comment\n% another\nVER 1.0".as_slice()));
        t.skip_preamble().unwrap();
        assert_eq!(t.next_token().unwrap().as_deref(), Some("VER"));
    }

    #[test]
    fn pos_lands_after_token_content_not_trailing_whitespace() {
        let mut t = Tokenizer::new(Cursor::new(b"DER 5".as_slice()));
        let tok = t.next_token().unwrap().unwrap();
        assert_eq!(tok, "DER");
        assert_eq!(t.pos(), 3);
    }

    #[test]
    fn rejects_out_of_range_index() {
        let mut t = Tokenizer::new(Cursor::new(b"1 5 3".as_slice()));
        let err = t.read_sparse_vector("ctx", 3).unwrap_err();
        assert!(matches!(err, CheckerError::IndexOutOfBounds { index: 5, bound: 3, .. }));
    }

    #[test]
    fn reads_obj_literal_without_consuming_further_tokens() {
        let mut t = Tokenizer::new(Cursor::new(b"OBJ rest".as_slice()));
        let lit = t.read_sparse_vector("ctx", 3).unwrap();
        assert!(matches!(lit, VectorLiteral::Obj));
        assert_eq!(t.next_token().unwrap().as_deref(), Some("rest"));
    }

    #[test]
    fn expect_bound_recognizes_infinity_sentinels() {
        let mut t = Tokenizer::new(Cursor::new(b"-inf inf 3/2".as_slice()));
        assert!(matches!(t.expect_bound("ctx").unwrap(), Bound::NegInfinity));
        assert!(matches!(t.expect_bound("ctx").unwrap(), Bound::PosInfinity));
        assert!(matches!(t.expect_bound("ctx").unwrap(), Bound::Finite(_)));
    }
}
