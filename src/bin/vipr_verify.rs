//! CLI verifier: `vipr-verify <certificate>`
//!
//! Reads a VIPR certificate and checks it against its own declared claim
//! (infeasibility, or an optimal value range). Section-progress diagnostics
//! go to stdout as the checker works through the file; the final verdict is
//! printed on success, and any violated rule is reported to stderr with a
//! nonzero exit on failure.

#![forbid(unsafe_code)]

use std::env;
use std::path::Path;

use vipr_check::Verdict;

fn parse_flag(args: &[String], key: &str) -> Option<String> {
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a == key {
            return it.next().cloned();
        }
    }
    None
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    if parse_flag(&args, "--help").is_some() || args.len() < 2 {
        return Err(anyhow::anyhow!("usage: vipr-verify <certificate>"));
    }
    let path = Path::new(&args[1]);

    match vipr_check::check_file(path)? {
        Verdict::Infeasible => println!("Verifier result: infeasible"),
        Verdict::Range { best_objective: Some(v) } => {
            println!("Verifier result: ok (best objective seen: {v})");
        }
        Verdict::Range { best_objective: None } => {
            println!("Verifier result: ok (no solution declared)");
        }
    }
    Ok(())
}
