//! Scan protocol specification text for IE container sets.
//!
//! The container structure is walked by hand with an explicit cursor: find the
//! `<Name>IEs <CLASS> ::= {` marker, recover the name from the start of its line, then
//! read `{ ... }` field blocks separated by `|` or `,` until the extension marker
//! `...`. Each field block is parsed with the PEST grammar in `grammar.pest`.
//!
//! Malformed field blocks abort the scan with a [`ScanError`]. A trailing `,` that is
//! not followed by `...` only produces a [`Warning`].

use crate::ast::{ContainerDefinition, FieldSpec, Presence};
use crate::diagnostic::{line_of, Warning, WarningKind};
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct FieldParser;

/// IE-set class scanned for when none is configured.
pub const DEFAULT_IE_CLASS: &str = "S1AP-PROTOCOL-IES";

/// Scanner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Information object class naming the IE sets, e.g. `S1AP-PROTOCOL-IES` or `NGAP-PROTOCOL-IES`.
    pub ie_class: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            ie_class: DEFAULT_IE_CLASS.to_string(),
        }
    }
}

impl ScanOptions {
    pub fn with_ie_class(ie_class: impl Into<String>) -> Self {
        ScanOptions {
            ie_class: ie_class.into(),
        }
    }

    /// Literal text that introduces a container declaration.
    pub fn marker(&self) -> String {
        format!(" {} ::= {{", self.ie_class)
    }
}

/// Fatal specification errors. Any of these aborts the whole scan.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("line {line}: missing field definition in {container}: expected '{{', found {found:?}")]
    MissingFieldBlock {
        line: usize,
        container: String,
        found: String,
    },
    #[error("line {line}: unterminated field definition in {container}")]
    UnterminatedField { line: usize, container: String },
    #[error("line {line}: malformed field definition in {container}: {reason}")]
    MalformedField {
        line: usize,
        container: String,
        reason: String,
    },
    #[error("line {line}: unknown presence value {literal:?} for {field} in {container}")]
    UnknownPresence {
        line: usize,
        container: String,
        field: String,
        literal: String,
    },
    #[error("line {line}: specification ends inside the body of {container}")]
    UnexpectedEnd { line: usize, container: String },
}

/// Result of a successful scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    /// Containers in the order their markers occur.
    pub definitions: Vec<ContainerDefinition>,
    pub warnings: Vec<Warning>,
}

/// Scan with the default S1AP IE class.
pub fn scan(text: &str) -> Result<Scan, ScanError> {
    scan_with(text, &ScanOptions::default())
}

pub fn scan_with(text: &str, options: &ScanOptions) -> Result<Scan, ScanError> {
    Scanner::new(text, options).run()
}

/// Cursor over the specification text.
pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    marker: String,
    warnings: Vec<Warning>,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str, options: &ScanOptions) -> Self {
        Scanner {
            text,
            pos: 0,
            marker: options.marker(),
            warnings: Vec::new(),
        }
    }

    pub fn run(mut self) -> Result<Scan, ScanError> {
        let mut definitions = Vec::new();
        while let Some(found) = self.text[self.pos..].find(&self.marker) {
            let marker_start = self.pos + found;
            self.pos = marker_start + self.marker.len();

            let line_start = self.text[..marker_start].rfind('\n').map_or(0, |i| i + 1);
            let type_name = normalize_type_name(&self.text[line_start..marker_start]);
            if !is_valid_type_name(&type_name) {
                self.warn(
                    marker_start,
                    WarningKind::InvalidTypeName,
                    format!("typename {:?} is not valid", type_name),
                );
                continue;
            }

            let fields = self.container_body(&type_name)?;
            tracing::debug!(container = %type_name, fields = fields.len(), "scanned IE container");
            definitions.push(ContainerDefinition { type_name, fields });
        }
        Ok(Scan {
            definitions,
            warnings: self.warnings,
        })
    }

    fn container_body(&mut self, container: &str) -> Result<Vec<FieldSpec>, ScanError> {
        let mut fields = Vec::new();
        loop {
            self.skip_whitespace();
            let c = self.peek().ok_or_else(|| ScanError::UnexpectedEnd {
                line: line_of(self.text, self.pos),
                container: container.to_string(),
            })?;
            match c {
                '|' => self.pos += 1,
                ',' => {
                    self.pos += 1;
                    self.skip_whitespace();
                    if self.rest().starts_with("...") {
                        self.pos += 3;
                    } else {
                        let found: String = self.rest().chars().take(20).collect();
                        self.warn(
                            self.pos,
                            WarningKind::MissingEllipsis,
                            format!(
                                "unexpected missing ' ...' from end of {} protocol IEs def: {:?}",
                                container, found
                            ),
                        );
                    }
                    return Ok(fields);
                }
                '-' if self.rest().starts_with("--") => self.skip_comment(),
                '{' => fields.push(self.field_block(container)?),
                _ => {
                    return Err(ScanError::MissingFieldBlock {
                        line: line_of(self.text, self.pos),
                        container: container.to_string(),
                        found: self.rest().chars().take(20).collect(),
                    })
                }
            }
        }
    }

    fn field_block(&mut self, container: &str) -> Result<FieldSpec, ScanError> {
        let start = self.pos;
        let line = line_of(self.text, start);
        let close = self.rest().find('}').ok_or_else(|| ScanError::UnterminatedField {
            line,
            container: container.to_string(),
        })?;
        let end = start + close + 1;
        self.pos = end;
        parse_field(&self.text[start..end]).map_err(|e| e.at(line, container))
    }

    fn warn(&mut self, offset: usize, kind: WarningKind, message: String) {
        let warning = Warning::new(line_of(self.text, offset), kind, message);
        warning.emit();
        self.warnings.push(warning);
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn skip_comment(&mut self) {
        self.pos = match self.rest().find('\n') {
            Some(i) => self.pos + i + 1,
            None => self.text.len(),
        };
    }
}

/// Field-level failure before container and line context are attached.
#[derive(Debug)]
enum FieldError {
    Grammar(String),
    UnknownPresence { field: String, literal: String },
}

impl FieldError {
    fn at(self, line: usize, container: &str) -> ScanError {
        let container = container.to_string();
        match self {
            FieldError::Grammar(reason) => ScanError::MalformedField { line, container, reason },
            FieldError::UnknownPresence { field, literal } => ScanError::UnknownPresence {
                line,
                container,
                field,
                literal,
            },
        }
    }
}

fn parse_field(block: &str) -> Result<FieldSpec, FieldError> {
    let pairs = FieldParser::parse(Rule::field, block).map_err(|e| {
        let e = e.renamed_rules(|rule| match rule {
            Rule::kw_id => "`ID`".to_string(),
            Rule::kw_criticality => "`CRITICALITY`".to_string(),
            Rule::kw_type => "`TYPE`".to_string(),
            Rule::kw_presence => "`PRESENCE`".to_string(),
            other => format!("{:?}", other),
        });
        FieldError::Grammar(e.variant.message().into_owned())
    })?;

    let mut identifier = None;
    let mut value_type = None;
    let mut presence = None;
    for pair in pairs.flatten() {
        match pair.as_rule() {
            Rule::ie_id => identifier = Some(normalize_identifier(pair.as_str())),
            Rule::value_type => value_type = Some(pair.as_str().trim().to_string()),
            Rule::presence => presence = Some(pair.as_str()),
            _ => {}
        }
    }
    let (identifier, value_type, literal) = match (identifier, value_type, presence) {
        (Some(i), Some(t), Some(p)) => (i, t, p),
        _ => return Err(FieldError::Grammar("incomplete field definition".to_string())),
    };
    let presence = Presence::from_literal(literal).ok_or_else(|| FieldError::UnknownPresence {
        field: identifier.clone(),
        literal: literal.to_string(),
    })?;
    Ok(FieldSpec {
        identifier,
        value_type,
        presence,
    })
}

/// Normalize the declared set name: `E-RABSetupRequestIEs` -> `E_RABSetupRequest`,
/// `Bearers-SubjectToStatusTransfer-ItemIEs` -> `Bearers_SubjectToStatusTransfer_Item`.
pub fn normalize_type_name(raw: &str) -> String {
    let raw = raw.trim();
    let raw = raw.strip_suffix("IEs").unwrap_or(raw);
    let name = raw.replace('-', "_");
    match name.strip_suffix('_') {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// Normalize an IE identifier: hyphens become underscores and a leading ASCII
/// lowercase letter is upper-cased (`id-MME-UE-S1AP-ID` -> `Id_MME_UE_S1AP_ID`).
pub fn normalize_identifier(raw: &str) -> String {
    let ident = raw.replace('-', "_");
    let mut chars = ident.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            let mut out = String::with_capacity(ident.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
            out
        }
        _ => ident,
    }
}

/// Names must be usable as a Rust identifier prefix.
pub fn is_valid_type_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
