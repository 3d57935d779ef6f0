//! # proto-ies-gen — protocol IE containers to structure-aware entropic codecs
//!
//! Reads an ASN.1 protocol module (S1AP by default), extracts every
//! `<Name>IEs S1AP-PROTOCOL-IES ::= { ... }` information-element set, and generates an
//! `entropic::Entropic` impl for each `<Name>ProtocolIEs` container so a fuzzer can
//! drive IE presence from raw bytes.
//!
//! ## Pipeline
//!
//! 1. [`scan`] the specification text into [`ContainerDefinition`]s (fatal errors are
//!    [`ScanError`], recoverable findings are [`Warning`]s).
//! 2. [`generate`] Rust source for all containers.
//! 3. [`patch`] / [`patch_file`] an existing generated module: old impls are located by
//!    anchor and removed, new ones appended.
//!
//! ## Presence scheme
//!
//! One entropy byte per declared IE, in declaration order:
//!
//! ```text
//! mandatory    absent  iff byte & 0x1F == 0x1F   encode: present 0x00, absent 0x1F
//! conditional  present iff byte & 0x03 == 0x03   encode: present 0x03, absent 0x00
//! optional     present iff byte & 0x0F == 0x0F   encode: present 0x0F, absent 0x00
//! ```
//!
//! [`ContainerCodec`] runs the same scheme directly from a definition.
//!
//! ## Example
//!
//! ```text
//! HandoverRequiredIEs S1AP-PROTOCOL-IES ::= {
//!     { ID id-MME-UE-S1AP-ID  CRITICALITY reject  TYPE MME-UE-S1AP-ID  PRESENCE mandatory } |
//!     { ID id-Direct-Forwarding-Path-Availability  CRITICALITY ignore
//!       TYPE Direct-Forwarding-Path-Availability  PRESENCE optional },
//!     ...
//! }
//! ```

pub mod ast;
pub mod codec;
pub mod diagnostic;
pub mod entropy;
pub mod generate;
pub mod patch;
pub mod scanner;

pub use ast::{ContainerDefinition, ContainerNames, FieldSpec, Presence};
pub use codec::{ByteValueCodec, Codec, ContainerCodec, Criticality, IeEntry, ValueCodec};
pub use diagnostic::{Warning, WarningKind};
pub use entropy::{EntropyError, EntropySink, EntropySource};
pub use generate::{generate, generate_container};
pub use patch::{patch, patch_file, LineEdit, PatchError, Patched};
pub use scanner::{scan, scan_with, Scan, ScanError, ScanOptions};
