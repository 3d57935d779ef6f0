//! Replace stale `Entropic` impls in a generated source file.
//!
//! For each container, the first line containing its anchor starts the block to
//! remove; the block ends at the first following line that is exactly `}` (column
//! zero, ignoring the line terminator). A `}` line inside the old block therefore
//! ends it early, and only the first occurrence of an anchor is removed. Freshly
//! generated impls for every container are appended at the end of the text, even
//! when no old block was found, which then leaves two impls for that type.

use crate::ast::ContainerDefinition;
use crate::diagnostic::{Warning, WarningKind};
use crate::generate::generate;
use std::io::Write;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: impl for {container} is never closed by a '}}' line")]
    UnterminatedBlock { line: usize, container: String },
}

/// Inclusive range of 0-based line indices to delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEdit {
    pub first: usize,
    pub last: usize,
}

impl LineEdit {
    pub fn apply<'a>(&self, lines: &[&'a str]) -> Vec<&'a str> {
        lines[..self.first]
            .iter()
            .chain(lines[self.last + 1..].iter())
            .copied()
            .collect()
    }
}

/// Outcome of patching text in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    pub text: String,
    /// Type names whose old impl was removed.
    pub replaced: Vec<String>,
    pub warnings: Vec<Warning>,
}

/// Find the block opened by `anchor`. `Ok(None)` when the anchor does not occur.
pub fn locate_block(lines: &[&str], anchor: &str) -> Result<Option<LineEdit>, usize> {
    let first = match lines.iter().position(|l| l.contains(anchor)) {
        Some(i) => i,
        None => return Ok(None),
    };
    lines[first..]
        .iter()
        .position(|l| l.trim_end_matches(&['\n', '\r'][..]) == "}")
        .map(|offset| Some(LineEdit { first, last: first + offset }))
        .ok_or(first)
}

pub fn patch(existing: &str, definitions: &[ContainerDefinition]) -> Result<Patched, PatchError> {
    let mut lines: Vec<&str> = existing.split_inclusive('\n').collect();
    let mut replaced = Vec::new();
    let mut warnings = Vec::new();

    for def in definitions {
        tracing::info!("replacing {}...", def.type_name);
        let anchor = def.names().anchor();
        match locate_block(&lines, &anchor) {
            Ok(Some(edit)) => {
                tracing::debug!(first = edit.first + 1, last = edit.last + 1, "removing old impl");
                lines = edit.apply(&lines);
                replaced.push(def.type_name.clone());
            }
            Ok(None) => {
                let warning = Warning::new(
                    0,
                    WarningKind::AnchorNotFound,
                    format!("IE {:?} not found", anchor),
                );
                warning.emit();
                warnings.push(warning);
            }
            Err(first) => {
                return Err(PatchError::UnterminatedBlock {
                    line: first + 1,
                    container: def.names().container,
                })
            }
        }
    }

    let mut text = lines.concat();
    text.push_str(&generate(definitions));
    Ok(Patched {
        text,
        replaced,
        warnings,
    })
}

/// Patch a file in place. The new content is written to a temporary file next to
/// the target and renamed over it, so a failed write leaves the old file intact.
pub fn patch_file(path: &Path, definitions: &[ContainerDefinition]) -> Result<Patched, PatchError> {
    let existing = std::fs::read_to_string(path)?;
    let patched = patch(&existing, definitions)?;

    tracing::info!("Writing output...");
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(patched.text.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| PatchError::Io(e.error))?;
    tracing::info!("All done!");

    Ok(patched)
}
