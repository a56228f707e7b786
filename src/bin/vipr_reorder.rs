//! CLI reorderer: `vipr-reorder [-t] <certificate>`
//!
//! Without `-t`, produces `<certificate>.tightened`: the same certificate
//! with derivations reordered so each appears before anything that
//! references it, and anything unreachable from the final derivation
//! dropped. With `-t`, produces `<certificate>.trimmed`: the same dropping,
//! but survivors keep their original relative order.

#![forbid(unsafe_code)]

use std::env;
use std::path::Path;

use vipr_check::ReorderMode;

fn parse_flag(args: &[String], key: &str) -> Option<String> {
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a == key {
            return it.next().cloned();
        }
    }
    None
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    if parse_flag(&args, "--help").is_some() {
        return Err(anyhow::anyhow!("usage: vipr-reorder [-t] <certificate>"));
    }

    let mode = if has_flag(&args, "-t") { ReorderMode::Trim } else { ReorderMode::Tighten };
    let path_arg = args
        .iter()
        .skip(1)
        .find(|a| a.as_str() != "-t")
        .ok_or_else(|| anyhow::anyhow!("usage: vipr-reorder [-t] <certificate>"))?;
    let path = Path::new(path_arg);

    println!("Reading certificate from {}...", path.display());
    let out_path = vipr_check::reorder_file(path, mode)?;
    println!("Wrote {}", out_path.display());
    Ok(())
}
