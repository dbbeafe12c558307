use svd_xml::Node;
use tracing::debug;

use crate::cluster::Cluster;
use crate::collect::{collect, collect_plain};
use crate::dim::DimElement;
use crate::element::{Element, ElementKind, DERIVED_FROM};
use crate::error::SvdError;
use crate::extract::{present, OptionExt, Reader};
use crate::properties::RegisterProperties;
use crate::register::Register;
use crate::vocab::{AddressBlockUsage, Protection};

/// Memory-mapped hardware block of a device.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Peripheral {
    name: String,
    version: Option<String>,
    description: Option<String>,
    alternate_peripheral: Option<String>,
    group_name: Option<String>,
    prepend_to_name: Option<String>,
    append_to_name: Option<String>,
    header_struct_name: Option<String>,
    disable_condition: Option<String>,
    base_address: u64,
    properties: RegisterProperties,
    derived_from: Option<String>,
    dim: Option<DimElement>,
    address_blocks: Vec<AddressBlock>,
    interrupts: Vec<Interrupt>,
    registers: Vec<Register>,
    clusters: Vec<Cluster>,
}

impl Peripheral {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Result<&str, SvdError> {
        self.version.as_deref().or_not_set(Self::KIND, "version")
    }

    pub fn description(&self) -> Result<&str, SvdError> {
        self.description
            .as_deref()
            .or_not_set(Self::KIND, "description")
    }

    pub fn alternate_peripheral(&self) -> Result<&str, SvdError> {
        self.alternate_peripheral
            .as_deref()
            .or_not_set(Self::KIND, "alternatePeripheral")
    }

    pub fn group_name(&self) -> Result<&str, SvdError> {
        self.group_name
            .as_deref()
            .or_not_set(Self::KIND, "groupName")
    }

    pub fn prepend_to_name(&self) -> Result<&str, SvdError> {
        self.prepend_to_name
            .as_deref()
            .or_not_set(Self::KIND, "prependToName")
    }

    pub fn append_to_name(&self) -> Result<&str, SvdError> {
        self.append_to_name
            .as_deref()
            .or_not_set(Self::KIND, "appendToName")
    }

    pub fn header_struct_name(&self) -> Result<&str, SvdError> {
        self.header_struct_name
            .as_deref()
            .or_not_set(Self::KIND, "headerStructName")
    }

    pub fn disable_condition(&self) -> Result<&str, SvdError> {
        self.disable_condition
            .as_deref()
            .or_not_set(Self::KIND, "disableCondition")
    }

    /// Lowest address reserved or used by the peripheral.
    pub fn base_address(&self) -> u64 {
        self.base_address
    }

    /// Register properties in effect for this peripheral, device defaults
    /// included.
    pub fn properties(&self) -> &RegisterProperties {
        &self.properties
    }

    pub fn derived_from(&self) -> Result<&str, SvdError> {
        self.derived_from
            .as_deref()
            .or_not_set(Self::KIND, DERIVED_FROM)
    }

    pub fn dim(&self) -> Result<&DimElement, SvdError> {
        self.dim.as_ref().or_not_set(Self::KIND, "dim")
    }

    pub fn address_blocks(&self) -> &[AddressBlock] {
        &self.address_blocks
    }

    pub fn interrupts(&self) -> &[Interrupt] {
        &self.interrupts
    }

    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn register(&self, name: &str) -> Option<&Register> {
        self.registers.iter().find(|register| register.name() == name)
    }

    pub fn cluster(&self, name: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|cluster| cluster.name() == name)
    }

    /// Absolute address of a register declared directly in this peripheral,
    /// `None` if it lies past the end of the address space.
    pub fn register_address(&self, register: &Register) -> Option<u64> {
        self.base_address.checked_add(register.address_offset())
    }
}

impl Element for Peripheral {
    const KIND: ElementKind = ElementKind::Peripheral;

    fn from_node(node: &Node, inherited: &RegisterProperties) -> Result<Self, SvdError> {
        Self::KIND.validate_shape(node)?;
        let reader = Reader::new(node, Self::KIND);
        let properties = RegisterProperties::read(&reader)?.inherit(inherited);

        let peripheral = Peripheral {
            name: reader.required("name")?,
            version: reader.optional("version")?,
            description: reader.optional("description")?,
            alternate_peripheral: reader.optional("alternatePeripheral")?,
            group_name: reader.optional("groupName")?,
            prepend_to_name: reader.optional("prependToName")?,
            append_to_name: reader.optional("appendToName")?,
            header_struct_name: reader.optional("headerStructName")?,
            disable_condition: reader.optional("disableCondition")?,
            base_address: reader.required("baseAddress")?,
            properties,
            derived_from: reader.optional_attr(DERIVED_FROM)?,
            dim: DimElement::read(&reader)?,
            address_blocks: collect_plain(node, None, &properties)?,
            interrupts: collect_plain(node, None, &properties)?,
            registers: collect(node, Some("registers"), &properties)?,
            clusters: collect(node, Some("registers"), &properties)?,
        };
        debug!(
            name = %peripheral.name,
            base = peripheral.base_address,
            registers = peripheral.registers.len(),
            clusters = peripheral.clusters.len(),
            derived_from = ?peripheral.derived_from,
            "built peripheral"
        );
        Ok(peripheral)
    }

    fn present_attributes(&self) -> Vec<&'static str> {
        let mut set = present(&[
            ("version", self.version.is_some()),
            ("description", self.description.is_some()),
            ("alternatePeripheral", self.alternate_peripheral.is_some()),
            ("groupName", self.group_name.is_some()),
            ("prependToName", self.prepend_to_name.is_some()),
            ("appendToName", self.append_to_name.is_some()),
            ("headerStructName", self.header_struct_name.is_some()),
            ("disableCondition", self.disable_condition.is_some()),
            (DERIVED_FROM, self.derived_from.is_some()),
            ("dim", self.dim.is_some()),
        ]);
        set.extend(present(&self.properties.present()));
        set
    }
}

/// Address range occupied by a peripheral, relative to its base address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AddressBlock {
    offset: u64,
    size: u64,
    usage: AddressBlockUsage,
    protection: Option<Protection>,
}

impl AddressBlock {
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Size in address units.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn usage(&self) -> AddressBlockUsage {
        self.usage
    }

    pub fn protection(&self) -> Result<Protection, SvdError> {
        self.protection.or_not_set(Self::KIND, "protection")
    }
}

impl Element for AddressBlock {
    const KIND: ElementKind = ElementKind::AddressBlock;

    fn from_node(node: &Node, _inherited: &RegisterProperties) -> Result<Self, SvdError> {
        Self::KIND.validate_shape(node)?;
        let reader = Reader::new(node, Self::KIND);
        Ok(AddressBlock {
            offset: reader.required("offset")?,
            size: reader.required("size")?,
            usage: reader.required("usage")?,
            protection: reader.optional("protection")?,
        })
    }

    fn present_attributes(&self) -> Vec<&'static str> {
        present(&[("protection", self.protection.is_some())])
    }
}

/// Interrupt line raised by a peripheral.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Interrupt {
    name: String,
    description: Option<String>,
    value: u32,
}

impl Interrupt {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Result<&str, SvdError> {
        self.description
            .as_deref()
            .or_not_set(Self::KIND, "description")
    }

    /// Interrupt number.
    pub fn value(&self) -> u32 {
        self.value
    }
}

impl Element for Interrupt {
    const KIND: ElementKind = ElementKind::Interrupt;

    fn from_node(node: &Node, _inherited: &RegisterProperties) -> Result<Self, SvdError> {
        Self::KIND.validate_shape(node)?;
        let reader = Reader::new(node, Self::KIND);
        Ok(Interrupt {
            name: reader.required("name")?,
            description: reader.optional("description")?,
            value: reader.required("value")?,
        })
    }

    fn present_attributes(&self) -> Vec<&'static str> {
        present(&[("description", self.description.is_some())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::build;
    use crate::vocab::Access;

    const TIMER0: &str = r#"
        <peripheral>
            <name>TIMER0</name>
            <version>1.0</version>
            <description>32 Timer / Counter, counting up or down from different sources</description>
            <groupName>TIMER</groupName>
            <baseAddress>0x40010000</baseAddress>
            <size>32</size>
            <access>read-write</access>
            <addressBlock>
                <offset>0</offset>
                <size>0x100</size>
                <usage>registers</usage>
            </addressBlock>
            <interrupt>
                <name>TIMER0</name>
                <description>Timer 0 interrupt</description>
                <value>0</value>
            </interrupt>
            <registers>
                <register>
                    <name>CR</name>
                    <addressOffset>0x00</addressOffset>
                    <resetValue>0x00000000</resetValue>
                </register>
                <register derivedFrom="CR">
                    <name>SR</name>
                    <addressOffset>0x04</addressOffset>
                    <access>read-only</access>
                </register>
                <cluster>
                    <name>CH[%s]</name>
                    <dim>2</dim>
                    <dimIncrement>0x10</dimIncrement>
                    <addressOffset>0x20</addressOffset>
                    <register>
                        <name>CFG</name>
                        <addressOffset>0x0</addressOffset>
                    </register>
                </cluster>
            </registers>
        </peripheral>"#;

    #[test]
    fn empty_tags_are_malformed() {
        for result in [
            build::<AddressBlock>("<addressBlock/>").map(|_| ()),
            build::<Interrupt>("<interrupt/>").map(|_| ()),
            build::<Peripheral>("<peripheral/>").map(|_| ()),
        ] {
            assert!(matches!(result, Err(SvdError::MalformedElement { .. })));
        }
    }

    #[test]
    fn address_block() {
        let block: AddressBlock = build(
            r#"<addressBlock>
                <offset>0x0</offset>
                <size>0x400</size>
                <usage>registers</usage>
                <protection>s</protection>
            </addressBlock>"#,
        )
        .expect("address block");
        assert_eq!(block.offset(), 0);
        assert_eq!(block.size(), 0x400);
        assert_eq!(block.usage(), AddressBlockUsage::Registers);
        assert_eq!(block.protection(), Ok(Protection::Secure));
    }

    #[test]
    fn address_block_without_protection() {
        let block: AddressBlock = build(
            "<addressBlock><offset>0x100</offset><size>0x10</size><usage>buffer</usage></addressBlock>",
        )
        .expect("address block");
        assert_eq!(block.usage(), AddressBlockUsage::Buffer);
        assert!(block.present_attributes().is_empty());
        assert_eq!(
            block.protection(),
            Err(SvdError::AttributeNotSet {
                element: ElementKind::AddressBlock,
                attribute: "protection",
            })
        );
    }

    #[test]
    fn interrupt_without_description() {
        let interrupt: Interrupt =
            build("<interrupt><name>UART0</name><value>5</value></interrupt>").expect("interrupt");
        assert_eq!(interrupt.value(), 5);
        assert!(interrupt.present_attributes().is_empty());
        assert_eq!(
            interrupt.description(),
            Err(SvdError::AttributeNotSet {
                element: ElementKind::Interrupt,
                attribute: "description",
            })
        );
    }

    #[test]
    fn register_address_past_the_address_space() {
        let peripheral: Peripheral = build(
            r#"<peripheral>
                <name>TOP</name>
                <baseAddress>0xFFFFFFFFFFFFFFF0</baseAddress>
                <registers>
                    <register><name>LAST</name><addressOffset>0xC</addressOffset></register>
                    <register><name>BEYOND</name><addressOffset>0x10</addressOffset></register>
                </registers>
            </peripheral>"#,
        )
        .expect("peripheral");
        let address = |name| {
            peripheral
                .register(name)
                .and_then(|register| peripheral.register_address(register))
        };
        assert_eq!(address("LAST"), Some(0xFFFF_FFFF_FFFF_FFFC));
        assert_eq!(address("BEYOND"), None);
    }

    #[test]
    fn interrupt() {
        let interrupt: Interrupt = build(
            r#"<interrupt>
                <name>TIM0_INT</name>
                <value>34</value>
                <description>Timer0 Interrupt</description>
            </interrupt>"#,
        )
        .expect("interrupt");
        assert_eq!(interrupt.name(), "TIM0_INT");
        assert_eq!(interrupt.description(), Ok("Timer0 Interrupt"));
        assert_eq!(interrupt.value(), 34);
        assert_eq!(interrupt.present_attributes(), ["description"]);
    }

    #[test]
    fn peripheral_with_registers() {
        let timer: Peripheral = build(TIMER0).expect("peripheral");
        assert_eq!(timer.name(), "TIMER0");
        assert_eq!(timer.group_name(), Ok("TIMER"));
        assert_eq!(timer.base_address(), 0x4001_0000);
        assert_eq!(timer.address_blocks().len(), 1);
        assert_eq!(timer.interrupts()[0].name(), "TIMER0");
        assert!(matches!(
            timer.header_struct_name(),
            Err(SvdError::AttributeNotSet { .. })
        ));

        let names: Vec<&str> = timer.registers().iter().map(Register::name).collect();
        assert_eq!(names, ["CR", "SR"]);
        let sr = timer.register("SR").expect("SR");
        assert_eq!(sr.properties().access(), Ok(Access::ReadOnly));
        assert_eq!(sr.properties().reset_value(), Ok(0));
        assert_eq!(sr.properties().size(), Ok(32));
        assert_eq!(sr.derived_from(), Ok("CR"));
        assert_eq!(timer.register_address(sr), Some(0x4001_0004));

        let channel = timer.cluster("CH[%s]").expect("cluster");
        assert_eq!(channel.dim().map(DimElement::dim), Ok(2));
        assert_eq!(channel.registers()[0].properties().size(), Ok(32));
    }

    #[test]
    fn minimal_peripheral() {
        let peripheral: Peripheral =
            build("<peripheral><name>GPIO</name><baseAddress>0x50000000</baseAddress></peripheral>")
                .expect("peripheral");
        assert!(peripheral.registers().is_empty());
        assert!(peripheral.interrupts().is_empty());
        assert!(peripheral.present_attributes().is_empty());
        assert!(matches!(
            peripheral.version(),
            Err(SvdError::AttributeNotSet { attribute: "version", .. })
        ));
    }
}
