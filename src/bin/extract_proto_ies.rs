//! Regenerate the `Entropic` impls of protocol IE containers in a generated module.
//!
//! Usage:
//!   extract_proto_ies SPEC.asn TARGET.rs
//!
//! Scans SPEC.asn for `... S1AP-PROTOCOL-IES ::= { ... }` sets, removes the old impl of
//! each container from TARGET.rs and appends freshly generated ones. A malformed
//! field definition aborts before TARGET.rs is touched (exit code 1).

use anyhow::Context;
use proto_ies_gen::{patch_file, scan};
use std::path::Path;

fn usage() -> ! {
    eprintln!("usage: extract_proto_ies SPEC.asn TARGET.rs");
    std::process::exit(2);
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (spec_path, target_path) = match args.as_slice() {
        [spec, target] => (Path::new(spec), Path::new(target)),
        _ => usage(),
    };

    let spec = std::fs::read_to_string(spec_path)
        .with_context(|| format!("{}: read failed", spec_path.display()))?;
    let scanned = scan(&spec).with_context(|| format!("{}: invalid specification", spec_path.display()))?;
    tracing::debug!(containers = scanned.definitions.len(), "scanned specification");

    let patched = patch_file(target_path, &scanned.definitions)
        .with_context(|| format!("{}: patch failed", target_path.display()))?;

    let warnings = scanned.warnings.len() + patched.warnings.len();
    if warnings > 0 {
        eprintln!(
            "extract_proto_ies: {} container(s), {} replaced, {} warning(s)",
            scanned.definitions.len(),
            patched.replaced.len(),
            warnings
        );
    }
    Ok(())
}
