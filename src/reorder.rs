//! Topological reorderer and trimmer for certificates already known to
//! parse.
//!
//! Both modes share a first pass: run the same section parsers the checker
//! uses up through `SOL` (nothing here re-derives correctness, it only needs
//! `num_var` and `num_con` and a byte-stable source), then scan the `DER`
//! section once, recording each derivation's starting offset and the
//! predecessor edges implied by its reason payload. A derivation with reason
//! `lin` or `rnd` has an edge from every combined index `>= numCon` with a
//! nonzero multiplier; `uns` has an edge from each of its four operands that
//! names a derivation rather than an original constraint.
//!
//! Tighten mode runs an iterative three-colour DFS from the final derivation
//! and keeps only what that DFS reaches, in dependency order. Trim mode
//! keeps the same reachable set but in the certificate's original relative
//! order — a reverse sweep marking "is this reachable from something kept"
//! is equivalent to walking backward and dropping successor-less
//! derivations, without needing to manage an explicit edge list.
//!
//! The second pass copies the header through the `DER` keyword verbatim,
//! then re-emits each surviving derivation by seeking to its recorded
//! offset, re-tokenizing just that row, and rewriting every derivation
//! reference as `newIdx[original - numCon] + numCon`. The survivor count and
//! each derivation's `max_ref_idx` are always freshly computed rather than
//! copied, since both are a function of the new order.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::checker;
use crate::error::{CheckerError, ReorderError};
use crate::parser::Tokenizer;
use crate::rational::Rational;

/// Which of the two output shapes to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReorderMode {
    /// Reorder into dependency order, dropping anything unreachable from the
    /// final derivation. Written to `<path>.tightened`.
    Tighten,
    /// Drop anything unreachable from the final derivation but otherwise
    /// preserve the original relative order. Written to `<path>.trimmed`.
    Trim,
}

struct DerivationRecord {
    offset: u64,
    preds: Vec<usize>,
}

/// Run [`reorder`] on the certificate at `path` and write the result next to
/// it, returning the output path.
pub fn reorder_file(path: &Path, mode: ReorderMode) -> Result<PathBuf, ReorderError> {
    let input = std::fs::read(path)?;
    let output = reorder(&input, mode)?;
    let suffix = match mode {
        ReorderMode::Tighten => "tightened",
        ReorderMode::Trim => "trimmed",
    };
    let out_path = PathBuf::from(format!("{}.{suffix}", path.display()));
    std::fs::write(&out_path, &output)?;
    Ok(out_path)
}

/// Reorder or trim a certificate held entirely in memory.
pub fn reorder(input: &[u8], mode: ReorderMode) -> Result<Vec<u8>, ReorderError> {
    let mut tok = Tokenizer::new(Cursor::new(input));

    let (major, minor) = checker::parse_ver(&mut tok)?;
    if major != 1 || minor > 1 {
        return Err(ReorderError::Parse(CheckerError::VersionUnsupported { major, minor }));
    }
    let (num_var, _var_names) = checker::parse_var(&mut tok)?;
    let is_int = checker::parse_int(&mut tok, num_var)?;
    let (is_min, obj_coef, _integral) = checker::parse_obj(&mut tok, num_var, &is_int)?;
    let obj_coef = Rc::new(obj_coef);
    let table = checker::parse_con(&mut tok, num_var, &obj_coef)?;
    let num_con = table.len();
    let rtp = checker::parse_rtp(&mut tok)?;
    let _best = checker::parse_sol(&mut tok, &table, &obj_coef, &is_int, is_min, &rtp)?;

    tok.expect_keyword("DER section", "DER")?;
    let copy_until = tok.pos() as usize;
    let num_der = tok.expect_usize("DER section")?;

    let mut records = Vec::with_capacity(num_der);
    for i in 0..num_der {
        let offset = tok.pos();
        let context = format!("DER section, derivation {i}");
        let _label = tok.expect_token(&context, "derivation label")?;
        let _sense = tok.expect_sense(&context)?;
        let _rhs = tok.expect_rational(&context)?;
        let _coef = tok.read_sparse_vector(&context, num_var)?;
        tok.expect_keyword(&context, "{")?;
        let kind = tok.expect_token(&context, "asm, lin, rnd, uns, or sol")?;

        let mut preds = Vec::new();
        match kind.as_str() {
            "asm" | "sol" => {
                tok.expect_keyword(&context, "}")?;
            }
            "lin" | "rnd" => {
                let k = tok.expect_usize(&context)?;
                for _ in 0..k {
                    let idx = tok.expect_usize(&context)?;
                    let val = tok.expect_rational(&context)?;
                    if val.is_zero() {
                        continue;
                    }
                    if let Some(local) = referenced_derivation(idx, num_con, i, &context)? {
                        preds.push(local);
                    }
                }
                tok.expect_keyword(&context, "}")?;
            }
            "uns" => {
                let con1 = tok.expect_usize(&context)?;
                let a1 = tok.expect_usize(&context)?;
                let con2 = tok.expect_usize(&context)?;
                let a2 = tok.expect_usize(&context)?;
                for idx in [con1, a1, con2, a2] {
                    if let Some(local) = referenced_derivation(idx, num_con, i, &context)? {
                        preds.push(local);
                    }
                }
                tok.expect_keyword(&context, "}")?;
            }
            other => {
                return Err(ReorderError::Parse(CheckerError::parse(
                    &context,
                    "asm, lin, rnd, uns, or sol",
                    Some(other.to_string()),
                )));
            }
        }
        let _max_ref_idx = tok.expect_i64(&context)?;

        // Left in the order the file names them: the DFS below visits
        // children in this order, so a derivation that lists its
        // dependencies out of declaration order is exactly what tighten mode
        // is for. A child already `Perm` when revisited is just skipped, so
        // a repeated reference costs nothing.
        records.push(DerivationRecord { offset, preds });
    }

    let order = match mode {
        ReorderMode::Tighten => topo_order(&records)?,
        ReorderMode::Trim => trim_order(&records),
    };

    let mut new_idx = vec![None; num_der];
    for (pos, &local) in order.iter().enumerate() {
        new_idx[local] = Some(pos);
    }

    let mut succs_of: Vec<Vec<usize>> = vec![Vec::new(); num_der];
    for (j, rec) in records.iter().enumerate() {
        if new_idx[j].is_some() {
            for &p in &rec.preds {
                succs_of[p].push(j);
            }
        }
    }

    let mut out = Vec::with_capacity(input.len());
    out.extend_from_slice(&input[..copy_until]);
    out.extend_from_slice(format!(" {}\n", order.len()).as_bytes());

    for &local in &order {
        emit_derivation(input, &records[local], num_con, &new_idx, &succs_of[local], &mut out)?;
    }

    Ok(out)
}

/// `Some(local index)` if `global_idx` names a derivation defined before
/// derivation `i`, `None` if it names an original constraint. A derivation
/// index that is out of range or forward-referencing is a malformed
/// reference graph, not something this pass can restructure around.
fn referenced_derivation(global_idx: usize, num_con: usize, i: usize, context: &str) -> Result<Option<usize>, ReorderError> {
    if global_idx < num_con {
        return Ok(None);
    }
    let local = global_idx - num_con;
    if local >= i {
        return Err(ReorderError::Parse(CheckerError::IndexOutOfBounds {
            context: context.to_string(),
            index: global_idx,
            bound: num_con + i,
        }));
    }
    Ok(Some(local))
}

/// Iterative DFS from the final derivation with three-colour marking.
/// Unreached derivations are silently dropped. A back-edge into a `Temp`
/// node would be a cycle, but `referenced_derivation` already guarantees
/// every edge points to a strictly earlier index, so that arm cannot fire
/// on input built from this module's own first pass; it stays as
/// defense-in-depth.
fn topo_order(records: &[DerivationRecord]) -> Result<Vec<usize>, ReorderError> {
    const NONE: u8 = 0;
    const TEMP: u8 = 1;
    const PERM: u8 = 2;

    let n = records.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let root = n - 1;
    let mut color = vec![NONE; n];
    let mut order = Vec::with_capacity(n);
    let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
    color[root] = TEMP;

    while let Some(&mut (node, ref mut next_child)) = stack.last_mut() {
        if *next_child < records[node].preds.len() {
            let child = records[node].preds[*next_child];
            *next_child += 1;
            match color[child] {
                NONE => {
                    color[child] = TEMP;
                    stack.push((child, 0));
                }
                // `referenced_derivation` only ever pushes a `preds` entry for
                // `local < i`, so every edge in this graph points to a
                // strictly smaller index than its source; a DFS following
                // such edges can never revisit a node still on its own stack.
                // This arm is defense-in-depth against that invariant ever
                // loosening, not a path reachable from today's callers.
                TEMP => return Err(ReorderError::Cycle(child)),
                PERM | _ => {}
            }
        } else {
            color[node] = PERM;
            order.push(node);
            stack.pop();
        }
    }
    Ok(order)
}

/// Same reachable set as [`topo_order`], but in original relative order.
/// Walking backward from the root, a derivation survives iff it is the root
/// or at least one already-processed later derivation that survives names
/// it as a predecessor.
fn trim_order(records: &[DerivationRecord]) -> Vec<usize> {
    let n = records.len();
    if n == 0 {
        return Vec::new();
    }
    let mut keep = vec![false; n];
    keep[n - 1] = true;
    for i in (0..n).rev() {
        if keep[i] {
            for &p in &records[i].preds {
                keep[p] = true;
            }
        }
    }
    (0..n).filter(|&i| keep[i]).collect()
}

fn remap(global_idx: usize, num_con: usize, new_idx: &[Option<usize>]) -> usize {
    if global_idx < num_con {
        global_idx
    } else {
        let local = global_idx - num_con;
        num_con + new_idx[local].expect("a surviving derivation's predecessors always survive")
    }
}

fn emit_derivation(
    input: &[u8],
    record: &DerivationRecord,
    num_con: usize,
    new_idx: &[Option<usize>],
    succs: &[usize],
    out: &mut Vec<u8>,
) -> Result<(), ReorderError> {
    let mut dtok = Tokenizer::new(Cursor::new(&input[record.offset as usize..]));
    let context = "DER section, rewritten derivation";

    let label = dtok.expect_token(context, "derivation label")?;
    let sense = dtok.expect_token(context, "sense")?;
    let rhs = dtok.expect_token(context, "right-hand side")?;
    out.extend_from_slice(format!(" {label} {sense} {rhs} ").as_bytes());

    let coef_head = dtok.expect_token(context, "OBJ or a coefficient count")?;
    if coef_head == "OBJ" {
        out.extend_from_slice(b"OBJ ");
    } else {
        let k: usize = coef_head
            .parse()
            .map_err(|_| ReorderError::Parse(CheckerError::parse(context, "OBJ or a coefficient count", Some(coef_head.clone()))))?;
        out.extend_from_slice(format!("{k} ").as_bytes());
        for _ in 0..k {
            let idx = dtok.expect_token(context, "variable index")?;
            let val = dtok.expect_token(context, "coefficient")?;
            out.extend_from_slice(format!("{idx} {val} ").as_bytes());
        }
    }

    dtok.expect_keyword(context, "{")?;
    let kind = dtok.expect_token(context, "asm, lin, rnd, uns, or sol")?;
    out.extend_from_slice(format!("{{ {kind} ").as_bytes());

    match kind.as_str() {
        "asm" | "sol" => {
            dtok.expect_keyword(context, "}")?;
        }
        "lin" | "rnd" => {
            let k = dtok.expect_usize(context)?;
            let mut kept = Vec::with_capacity(k);
            for _ in 0..k {
                let idx = dtok.expect_usize(context)?;
                let val_tok = dtok.expect_token(context, "multiplier")?;
                let val = Rational::from_token(context, &val_tok).map_err(ReorderError::Parse)?;
                if val.is_zero() {
                    continue;
                }
                kept.push((remap(idx, num_con, new_idx), val_tok));
            }
            out.extend_from_slice(format!("{} ", kept.len()).as_bytes());
            for (idx, val_tok) in kept {
                out.extend_from_slice(format!("{idx} {val_tok} ").as_bytes());
            }
            dtok.expect_keyword(context, "}")?;
        }
        "uns" => {
            let con1 = dtok.expect_usize(context)?;
            let a1 = dtok.expect_usize(context)?;
            let con2 = dtok.expect_usize(context)?;
            let a2 = dtok.expect_usize(context)?;
            let remapped = [con1, a1, con2, a2].map(|idx| remap(idx, num_con, new_idx));
            out.extend_from_slice(format!("{} {} {} {} ", remapped[0], remapped[1], remapped[2], remapped[3]).as_bytes());
            dtok.expect_keyword(context, "}")?;
        }
        other => {
            return Err(ReorderError::Parse(CheckerError::parse(
                context,
                "asm, lin, rnd, uns, or sol",
                Some(other.to_string()),
            )));
        }
    }
    out.extend_from_slice(b"} ");

    let _old_max_ref = dtok.expect_i64(context)?;
    let new_max_ref = succs.iter().filter_map(|&j| new_idx[j]).map(|p| p + num_con).max();
    match new_max_ref {
        Some(m) => out.extend_from_slice(format!("{m}\n").as_bytes()),
        None => out.extend_from_slice(b"-1\n"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor as StdCursor;

    fn reordered(src: &str, mode: ReorderMode) -> String {
        let out = reorder(src.as_bytes(), mode).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn checks_out(src: &str) -> crate::checker::Verdict {
        crate::checker::check(StdCursor::new(src.as_bytes())).unwrap()
    }

    const CHAIN: &str = "\
VER 1.0
VAR 1 x
INT 1 0
OBJ min 1 0 1
CON 2 0
 c1 G 1 1 0 2
 c2 L 1 1 0 2
RTP infeas
SOL 0
DER 3
 d1 G 1 1 0 1 { rnd 1 0 1/2 } -1
 d2 L 0 1 0 1 { rnd 1 1 1/2 } -1
 d3 G 1 0 { lin 2 2 1 3 -1 } -1
";

    #[test]
    fn topo_reorder_of_an_already_ordered_chain_still_checks_out() {
        let out = reordered(CHAIN, ReorderMode::Tighten);
        assert!(matches!(checks_out(&out), crate::checker::Verdict::Infeasible));
    }

    #[test]
    fn trim_drops_a_derivation_nothing_depends_on() {
        let with_orphan = "\
VER 1.0
VAR 1 x
INT 1 0
OBJ min 1 0 1
CON 2 0
 c1 G 1 1 0 2
 c2 L 1 1 0 2
RTP infeas
SOL 0
DER 4
 orphan G 1 1 0 1 { asm } -1
 d1 G 1 1 0 1 { rnd 1 0 1/2 } -1
 d2 L 0 1 0 1 { rnd 1 1 1/2 } -1
 d3 G 1 0 { lin 2 3 1 4 -1 } -1
";
        let out = reorder(with_orphan.as_bytes(), ReorderMode::Trim).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("DER 3\n"));
        assert!(!text.contains("orphan"));
        assert!(matches!(checks_out(&text), crate::checker::Verdict::Infeasible));
    }

    #[test]
    fn topo_reorders_when_the_final_derivation_lists_its_dependencies_out_of_order() {
        // d3 names d2 before d1 in its own multiplier list, even though d1
        // was declared first in the file. The DFS visits children in the
        // order a derivation lists them, so the survivors come back with d2
        // ahead of d1.
        let swapped = "\
VER 1.0
VAR 1 x
INT 1 0
OBJ min 1 0 1
CON 2 0
 c1 G 1 1 0 2
 c2 L 1 1 0 2
RTP infeas
SOL 0
DER 3
 d1 G 1 1 0 1 { rnd 1 0 1/2 } -1
 d2 L 0 1 0 1 { rnd 1 1 1/2 } -1
 d3 G 1 0 { lin 2 3 -1 2 1 } -1
";
        let out = reordered(swapped, ReorderMode::Tighten);
        let pos_d1 = out.find(" d1 ").expect("d1 present");
        let pos_d2 = out.find(" d2 ").expect("d2 present");
        assert!(pos_d2 < pos_d1, "expected d2 to be emitted before d1, got:\n{out}");
        assert!(matches!(checks_out(&out), crate::checker::Verdict::Infeasible));
    }

    #[test]
    fn self_referencing_derivation_is_rejected_by_the_forward_reference_guard() {
        // A derivation can't name itself or a later derivation as a
        // predecessor; `referenced_derivation` catches this before a
        // `DerivationRecord` is even built, as `IndexOutOfBounds`. This is
        // the only way a reference-graph malformation is actually observed
        // today — `topo_order`'s own `ReorderError::Cycle` arm is
        // unreachable as long as this guard holds, since every edge it lets
        // through already points backward.
        let cyclic = "\
VER 1.0
VAR 1 x
INT 0
OBJ min 1 0 1
CON 0 0
RTP infeas
SOL 0
DER 1
 d1 G 0 0 { lin 1 0 1 } -1
";
        let err = reorder(cyclic.as_bytes(), ReorderMode::Tighten).unwrap_err();
        assert!(matches!(err, ReorderError::Parse(CheckerError::IndexOutOfBounds { .. })));
    }
}
