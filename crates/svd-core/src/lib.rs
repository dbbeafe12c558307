//! CMSIS-SVD device model: typed, validated elements built from an
//! [`svd_xml::Node`] tree.
//!
//! Construction is a single depth-first pass starting at [`Device::from_root`].
//! Each element kind checks its mandatory content, decodes its values and
//! builds its children; the first violation aborts the whole parse with an
//! [`SvdError`]. Register properties flow from the device down to fields, and
//! `derivedFrom` references are resolved between siblings in document order.
//!
//! Optional attributes that were absent from the document are reported with
//! [`SvdError::AttributeNotSet`] by their accessors instead of a placeholder
//! value.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod bitrange;
mod cluster;
mod collect;
mod cpu;
mod derivation;
mod device;
mod dim;
mod element;
mod enumeration;
mod error;
mod extract;
mod field;
pub mod literal;
mod peripheral;
mod properties;
mod register;
mod sau;
pub mod vocab;

pub use bitrange::{BitRange, BitRangeError, BitRangeForm};
pub use cluster::Cluster;
pub use cpu::Cpu;
pub use device::Device;
pub use dim::{DimElement, DimInstance, MAX_DIM};
pub use element::{Element, ElementKind, Slot};
pub use enumeration::{EnumeratedValue, EnumeratedValues};
pub use error::SvdError;
pub use field::{Field, WriteConstraint};
pub use literal::{BitPattern, LiteralError};
pub use peripheral::{AddressBlock, Interrupt, Peripheral};
pub use properties::RegisterProperties;
pub use register::Register;
pub use sau::{SauRegion, SauRegionsConfig};
pub use vocab::{
    Access, AddressBlockUsage, CpuName, DataType, Endian, EnumUsage, ModifiedWriteValues,
    Protection, ReadAction, SauAccess, UnknownToken,
};
