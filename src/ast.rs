//! Container definitions extracted from a protocol specification.

use std::fmt;

/// One `<Name>IEs <CLASS> ::= { ... }` set found in the specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDefinition {
    /// Normalized type name, e.g. `E_RABSetupRequest` for `E-RABSetupRequestIEs`.
    pub type_name: String,
    /// IE slots in declaration order. The order fixes the entropy layout.
    pub fields: Vec<FieldSpec>,
}

/// One `{ ID ... TYPE ... PRESENCE ... }` slot of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub identifier: String,
    pub value_type: String,
    pub presence: Presence,
}

impl FieldSpec {
    pub fn new(identifier: impl Into<String>, value_type: impl Into<String>, presence: Presence) -> Self {
        FieldSpec {
            identifier: identifier.into(),
            value_type: value_type.into(),
            presence,
        }
    }
}

/// Declared presence of an IE, and the entropy sentinel scheme derived from it.
///
/// | Presence    | mask   | present byte | absent byte | chance           |
/// |-------------|--------|--------------|-------------|------------------|
/// | Mandatory   | `0x1F` | `0x00`       | `0x1F`      | 1/32 missing     |
/// | Conditional | `0x03` | `0x03`       | `0x00`      | 1/4 present      |
/// | Optional    | `0x0F` | `0x0F`       | `0x00`      | 1/16 present     |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Mandatory,
    Optional,
    Conditional,
}

impl Presence {
    /// Parse the literal used after `PRESENCE`. Only the three ASN.1 literals are accepted.
    pub fn from_literal(literal: &str) -> Option<Self> {
        match literal {
            "mandatory" => Some(Presence::Mandatory),
            "optional" => Some(Presence::Optional),
            "conditional" => Some(Presence::Conditional),
            _ => None,
        }
    }

    pub fn literal(self) -> &'static str {
        match self {
            Presence::Mandatory => "mandatory",
            Presence::Optional => "optional",
            Presence::Conditional => "conditional",
        }
    }

    /// Bits of the sentinel byte that decide presence.
    pub fn mask(self) -> u8 {
        match self {
            Presence::Mandatory => 0b_0001_1111,
            Presence::Conditional => 0b_0000_0011,
            Presence::Optional => 0b_0000_1111,
        }
    }

    /// Byte emitted before the value of a present IE.
    pub fn present_byte(self) -> u8 {
        match self {
            Presence::Mandatory => 0b_0000_0000,
            Presence::Conditional | Presence::Optional => self.mask(),
        }
    }

    /// Byte emitted for an absent IE.
    pub fn absent_byte(self) -> u8 {
        match self {
            Presence::Mandatory => self.mask(),
            Presence::Conditional | Presence::Optional => 0b_0000_0000,
        }
    }

    /// Decide presence from one consumed entropy byte.
    pub fn is_present(self, byte: u8) -> bool {
        let all_set = byte & self.mask() == self.mask();
        match self {
            // mandatory IEs go missing only when every masked bit is set
            Presence::Mandatory => !all_set,
            Presence::Conditional | Presence::Optional => all_set,
        }
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal())
    }
}

/// Names of the generated Rust items for one container type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerNames {
    pub container: String,
    pub entry: String,
    pub entry_value: String,
}

impl ContainerNames {
    pub fn for_type(type_name: &str) -> Self {
        let container = format!("{}ProtocolIEs", type_name);
        let entry = format!("{}_Entry", container);
        let entry_value = format!("{}Value", entry);
        ContainerNames {
            container,
            entry,
            entry_value,
        }
    }

    /// Text that opens this container's `Entropic` impl in a generated source file.
    pub fn anchor(&self) -> String {
        format!("impl entropic::Entropic for {} ", self.container)
    }
}

impl ContainerDefinition {
    pub fn names(&self) -> ContainerNames {
        ContainerNames::for_type(&self.type_name)
    }
}
