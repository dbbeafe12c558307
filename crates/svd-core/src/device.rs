use std::collections::BTreeMap;

use svd_xml::Node;
use tracing::{debug, info};

use crate::collect::{collect, single};
use crate::cpu::Cpu;
use crate::element::{Element, ElementKind};
use crate::error::SvdError;
use crate::extract::{present, OptionExt, Reader};
use crate::peripheral::{Interrupt, Peripheral};
use crate::properties::RegisterProperties;

/// Root of a decoded SVD document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Device {
    schema_version: String,
    vendor: Option<String>,
    vendor_id: Option<String>,
    name: String,
    series: Option<String>,
    version: String,
    description: String,
    license_text: Option<String>,
    header_system_filename: Option<String>,
    header_definitions_prefix: Option<String>,
    address_unit_bits: u32,
    width: u32,
    properties: RegisterProperties,
    cpu: Option<Cpu>,
    peripherals: Vec<Peripheral>,
}

impl Device {
    /// Build the device model from the root `<device>` node.
    pub fn from_root(node: &Node) -> Result<Self, SvdError> {
        let device = Self::from_node(node, &RegisterProperties::default())?;
        info!(
            device = %device.name,
            peripherals = device.peripherals.len(),
            "device model ready"
        );
        Ok(device)
    }

    /// Value of the `schemaVersion` attribute.
    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    pub fn vendor(&self) -> Result<&str, SvdError> {
        self.vendor.as_deref().or_not_set(Self::KIND, "vendor")
    }

    pub fn vendor_id(&self) -> Result<&str, SvdError> {
        self.vendor_id.as_deref().or_not_set(Self::KIND, "vendorID")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn series(&self) -> Result<&str, SvdError> {
        self.series.as_deref().or_not_set(Self::KIND, "series")
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn license_text(&self) -> Result<&str, SvdError> {
        self.license_text
            .as_deref()
            .or_not_set(Self::KIND, "licenseText")
    }

    pub fn header_system_filename(&self) -> Result<&str, SvdError> {
        self.header_system_filename
            .as_deref()
            .or_not_set(Self::KIND, "headerSystemFilename")
    }

    pub fn header_definitions_prefix(&self) -> Result<&str, SvdError> {
        self.header_definitions_prefix
            .as_deref()
            .or_not_set(Self::KIND, "headerDefinitionsPrefix")
    }

    /// Bits per addressable unit, usually 8.
    pub fn address_unit_bits(&self) -> u32 {
        self.address_unit_bits
    }

    /// Width of the data bus in bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Device-wide register defaults.
    pub fn properties(&self) -> &RegisterProperties {
        &self.properties
    }

    pub fn cpu(&self) -> Result<&Cpu, SvdError> {
        self.cpu.as_ref().or_not_set(Self::KIND, "cpu")
    }

    pub fn peripherals(&self) -> &[Peripheral] {
        &self.peripherals
    }

    pub fn peripheral(&self, name: &str) -> Option<&Peripheral> {
        self.peripherals
            .iter()
            .find(|peripheral| peripheral.name() == name)
    }

    /// Interrupts of all peripherals, one per number, ordered by number.
    pub fn interrupts(&self) -> Vec<&Interrupt> {
        let mut by_value = BTreeMap::new();
        for interrupt in self.peripherals.iter().flat_map(Peripheral::interrupts) {
            by_value.entry(interrupt.value()).or_insert(interrupt);
        }
        by_value.into_values().collect()
    }
}

impl Element for Device {
    const KIND: ElementKind = ElementKind::Device;

    fn from_node(node: &Node, inherited: &RegisterProperties) -> Result<Self, SvdError> {
        Self::KIND.validate_shape(node)?;
        let reader = Reader::new(node, Self::KIND);
        let properties = RegisterProperties::read(&reader)?.inherit(inherited);
        let device = Device {
            schema_version: reader.required_attr("schemaVersion")?,
            vendor: reader.optional("vendor")?,
            vendor_id: reader.optional("vendorID")?,
            name: reader.required("name")?,
            series: reader.optional("series")?,
            version: reader.required("version")?,
            description: reader.required("description")?,
            license_text: reader.optional("licenseText")?,
            header_system_filename: reader.optional("headerSystemFilename")?,
            header_definitions_prefix: reader.optional("headerDefinitionsPrefix")?,
            address_unit_bits: reader.required("addressUnitBits")?,
            width: reader.required("width")?,
            properties,
            cpu: single(node, &properties)?,
            peripherals: collect(node, Some("peripherals"), &properties)?,
        };
        debug!(
            name = %device.name,
            schema = %device.schema_version,
            cpu = ?device.cpu.as_ref().map(Cpu::name),
            "built device"
        );
        Ok(device)
    }

    fn present_attributes(&self) -> Vec<&'static str> {
        let mut set = present(&[
            ("vendor", self.vendor.is_some()),
            ("vendorID", self.vendor_id.is_some()),
            ("series", self.series.is_some()),
            ("licenseText", self.license_text.is_some()),
            ("headerSystemFilename", self.header_system_filename.is_some()),
            (
                "headerDefinitionsPrefix",
                self.header_definitions_prefix.is_some(),
            ),
            ("cpu", self.cpu.is_some()),
        ]);
        set.extend(present(&self.properties.present()));
        set
    }
}
