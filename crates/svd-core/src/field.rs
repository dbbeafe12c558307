use svd_xml::Node;
use tracing::trace;

use crate::bitrange::BitRange;
use crate::collect::{collect_plain, single};
use crate::dim::DimElement;
use crate::element::{Element, ElementKind, DERIVED_FROM};
use crate::enumeration::{EnumeratedValue, EnumeratedValues};
use crate::error::SvdError;
use crate::extract::{present, OptionExt, Reader};
use crate::properties::RegisterProperties;
use crate::vocab::{Access, EnumUsage, ModifiedWriteValues, ReadAction};

/// Bit field of a register.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Field {
    name: String,
    description: Option<String>,
    bit_range: BitRange,
    access: Option<Access>,
    modified_write_values: Option<ModifiedWriteValues>,
    write_constraint: Option<WriteConstraint>,
    read_action: Option<ReadAction>,
    derived_from: Option<String>,
    dim: Option<DimElement>,
    enumerated_values: Vec<EnumeratedValues>,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Result<&str, SvdError> {
        self.description
            .as_deref()
            .or_not_set(Self::KIND, "description")
    }

    pub fn bit_range(&self) -> BitRange {
        self.bit_range
    }

    /// Access of the field, falling back to the enclosing register.
    pub fn access(&self) -> Result<Access, SvdError> {
        self.access.or_not_set(Self::KIND, "access")
    }

    pub fn modified_write_values(&self) -> Result<ModifiedWriteValues, SvdError> {
        self.modified_write_values
            .or_not_set(Self::KIND, "modifiedWriteValues")
    }

    pub fn write_constraint(&self) -> Result<&WriteConstraint, SvdError> {
        self.write_constraint
            .as_ref()
            .or_not_set(Self::KIND, "writeConstraint")
    }

    pub fn read_action(&self) -> Result<ReadAction, SvdError> {
        self.read_action.or_not_set(Self::KIND, "readAction")
    }

    pub fn derived_from(&self) -> Result<&str, SvdError> {
        self.derived_from
            .as_deref()
            .or_not_set(Self::KIND, DERIVED_FROM)
    }

    pub fn dim(&self) -> Result<&DimElement, SvdError> {
        self.dim.as_ref().or_not_set(Self::KIND, "dim")
    }

    /// Value sets, at most one per usage.
    pub fn enumerated_values(&self) -> &[EnumeratedValues] {
        &self.enumerated_values
    }

    /// Value set describing reads (`usage` of read or read-write).
    pub fn read_values(&self) -> Option<&EnumeratedValues> {
        self.values_for(EnumUsage::Read)
    }

    pub fn write_values(&self) -> Option<&EnumeratedValues> {
        self.values_for(EnumUsage::Write)
    }

    /// Decode the field out of a raw register value and look it up in the
    /// read value set.
    pub fn describe(&self, raw: u64) -> Option<&EnumeratedValue> {
        let value = self.bit_range.extract(raw);
        self.read_values().and_then(|set| set.lookup(value))
    }

    fn values_for(&self, usage: EnumUsage) -> Option<&EnumeratedValues> {
        self.enumerated_values
            .iter()
            .find(|set| set.usage() == usage)
            .or_else(|| {
                self.enumerated_values
                    .iter()
                    .find(|set| set.usage() == EnumUsage::ReadWrite)
            })
    }
}

impl Element for Field {
    const KIND: ElementKind = ElementKind::Field;

    fn from_node(node: &Node, inherited: &RegisterProperties) -> Result<Self, SvdError> {
        Self::KIND.validate_shape(node)?;
        let reader = Reader::new(node, Self::KIND);
        let name: String = reader.required("name")?;
        let bit_range = BitRange::read(&reader)?;
        if let Ok(size) = inherited.size() {
            if !bit_range.fits(size) {
                return Err(SvdError::malformed(
                    Self::KIND,
                    format!(
                        "field {name} ends at bit {} of a {size}-bit register",
                        bit_range.msb()
                    ),
                ));
            }
        }

        let enumerated_values: Vec<EnumeratedValues> = collect_plain(node, None, inherited)?;
        check_usages(&enumerated_values)?;

        let field = Field {
            description: reader.optional("description")?,
            bit_range,
            access: reader
                .optional::<Access>("access")?
                .or(inherited.access().ok()),
            modified_write_values: reader.optional("modifiedWriteValues")?,
            write_constraint: single(node, inherited)?,
            read_action: reader.optional("readAction")?,
            derived_from: reader.optional_attr(DERIVED_FROM)?,
            dim: DimElement::read(&reader)?,
            enumerated_values,
            name,
        };
        trace!(
            name = %field.name,
            lsb = field.bit_range.lsb(),
            msb = field.bit_range.msb(),
            "built field"
        );
        Ok(field)
    }

    fn present_attributes(&self) -> Vec<&'static str> {
        present(&[
            ("description", self.description.is_some()),
            ("access", self.access.is_some()),
            ("modifiedWriteValues", self.modified_write_values.is_some()),
            ("writeConstraint", self.write_constraint.is_some()),
            ("readAction", self.read_action.is_some()),
            (DERIVED_FROM, self.derived_from.is_some()),
            ("dim", self.dim.is_some()),
        ])
    }
}

/// A field holds one value set, or one for reads and one for writes.
fn check_usages(sets: &[EnumeratedValues]) -> Result<(), SvdError> {
    match sets {
        [] | [_] => Ok(()),
        [a, b] if matches!(
            (a.usage(), b.usage()),
            (EnumUsage::Read, EnumUsage::Write) | (EnumUsage::Write, EnumUsage::Read)
        ) =>
        {
            Ok(())
        }
        [_, _] => Err(SvdError::malformed(
            ElementKind::Field,
            "two enumeratedValues sets must have usage read and write",
        )),
        _ => Err(SvdError::malformed(
            ElementKind::Field,
            format!("{} enumeratedValues sets, at most 2 allowed", sets.len()),
        )),
    }
}

/// Restriction on the values software may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum WriteConstraint {
    /// Only the last read value may be written back.
    WriteAsRead(bool),
    /// Only values listed in the enumerated values may be written.
    UseEnumeratedValues(bool),
    /// Values within an inclusive range.
    Range { minimum: u64, maximum: u64 },
}

impl WriteConstraint {
    /// Whether writing `value` is permitted by the constraint alone.
    pub fn permits(&self, value: u64) -> bool {
        match *self {
            WriteConstraint::Range { minimum, maximum } => (minimum..=maximum).contains(&value),
            _ => true,
        }
    }
}

impl Element for WriteConstraint {
    const KIND: ElementKind = ElementKind::WriteConstraint;

    fn from_node(node: &Node, _inherited: &RegisterProperties) -> Result<Self, SvdError> {
        Self::KIND.validate_shape(node)?;
        let reader = Reader::new(node, Self::KIND);
        let chosen = ["writeAsRead", "useEnumeratedValues", "range"]
            .iter()
            .filter(|tag| node.has_child(tag))
            .count();
        if chosen > 1 {
            return Err(SvdError::malformed(
                Self::KIND,
                "writeAsRead, useEnumeratedValues and range are mutually exclusive",
            ));
        }
        if let Some(flag) = reader.optional("writeAsRead")? {
            return Ok(WriteConstraint::WriteAsRead(flag));
        }
        if let Some(flag) = reader.optional("useEnumeratedValues")? {
            return Ok(WriteConstraint::UseEnumeratedValues(flag));
        }
        let range = node.child("range").ok_or(SvdError::MissingRequiredElement {
            element: Self::KIND,
            tag: "range",
        })?;
        let range = Reader::new(range, Self::KIND);
        let minimum: u64 = range.required("minimum")?;
        let maximum: u64 = range.required("maximum")?;
        if minimum > maximum {
            return Err(SvdError::malformed(
                Self::KIND,
                format!("range minimum {minimum} exceeds maximum {maximum}"),
            ));
        }
        Ok(WriteConstraint::Range { minimum, maximum })
    }

    fn present_attributes(&self) -> Vec<&'static str> {
        vec![match self {
            WriteConstraint::WriteAsRead(_) => "writeAsRead",
            WriteConstraint::UseEnumeratedValues(_) => "useEnumeratedValues",
            WriteConstraint::Range { .. } => "range",
        }]
    }
}
