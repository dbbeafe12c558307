use svd_xml::Node;
use tracing::debug;

use crate::collect::{children, single};
use crate::derivation::{resolve_enumerated_values, DerivationIndex};
use crate::dim::DimElement;
use crate::element::{Element, ElementKind, DERIVED_FROM};
use crate::error::SvdError;
use crate::extract::{present, OptionExt, Reader};
use crate::field::{Field, WriteConstraint};
use crate::properties::RegisterProperties;
use crate::vocab::{DataType, ModifiedWriteValues, ReadAction};

/// Register of a peripheral or cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Register {
    name: String,
    display_name: Option<String>,
    description: Option<String>,
    alternate_group: Option<String>,
    alternate_register: Option<String>,
    address_offset: u64,
    properties: RegisterProperties,
    data_type: Option<DataType>,
    modified_write_values: Option<ModifiedWriteValues>,
    write_constraint: Option<WriteConstraint>,
    read_action: Option<ReadAction>,
    derived_from: Option<String>,
    dim: Option<DimElement>,
    fields: Vec<Field>,
}

impl Register {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> Result<&str, SvdError> {
        self.display_name
            .as_deref()
            .or_not_set(Self::KIND, "displayName")
    }

    pub fn description(&self) -> Result<&str, SvdError> {
        self.description
            .as_deref()
            .or_not_set(Self::KIND, "description")
    }

    pub fn alternate_group(&self) -> Result<&str, SvdError> {
        self.alternate_group
            .as_deref()
            .or_not_set(Self::KIND, "alternateGroup")
    }

    pub fn alternate_register(&self) -> Result<&str, SvdError> {
        self.alternate_register
            .as_deref()
            .or_not_set(Self::KIND, "alternateRegister")
    }

    /// Offset from the base address of the enclosing peripheral or cluster.
    pub fn address_offset(&self) -> u64 {
        self.address_offset
    }

    /// Effective properties, inherited values included.
    pub fn properties(&self) -> &RegisterProperties {
        &self.properties
    }

    pub fn data_type(&self) -> Result<DataType, SvdError> {
        self.data_type.or_not_set(Self::KIND, "dataType")
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

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Split a raw register value into per-field values.
    pub fn field_values(&self, raw: u64) -> Vec<(&Field, u64)> {
        self.fields
            .iter()
            .map(|field| (field, field.bit_range().extract(raw)))
            .collect()
    }
}

impl Element for Register {
    const KIND: ElementKind = ElementKind::Register;

    fn from_node(node: &Node, inherited: &RegisterProperties) -> Result<Self, SvdError> {
        Self::KIND.validate_shape(node)?;
        let reader = Reader::new(node, Self::KIND);
        let properties = RegisterProperties::read(&reader)?.inherit(inherited);
        if let Ok(size) = properties.size() {
            if size == 0 || size > 64 {
                return Err(SvdError::malformed(
                    Self::KIND,
                    format!("register size {size} is outside 1..=64"),
                ));
            }
        }

        let register = Register {
            name: reader.required("name")?,
            display_name: reader.optional("displayName")?,
            description: reader.optional("description")?,
            alternate_group: reader.optional("alternateGroup")?,
            alternate_register: reader.optional("alternateRegister")?,
            address_offset: reader.required("addressOffset")?,
            properties,
            data_type: reader.optional("dataType")?,
            modified_write_values: reader.optional("modifiedWriteValues")?,
            write_constraint: single(node, &properties)?,
            read_action: reader.optional("readAction")?,
            derived_from: reader.optional_attr(DERIVED_FROM)?,
            dim: DimElement::read(&reader)?,
            fields: build_fields(node, &properties)?,
        };
        debug!(
            name = %register.name,
            offset = register.address_offset,
            fields = register.fields.len(),
            "built register"
        );
        Ok(register)
    }

    fn present_attributes(&self) -> Vec<&'static str> {
        let mut set = present(&[
            ("displayName", self.display_name.is_some()),
            ("description", self.description.is_some()),
            ("alternateGroup", self.alternate_group.is_some()),
            ("alternateRegister", self.alternate_register.is_some()),
            ("dataType", self.data_type.is_some()),
            ("modifiedWriteValues", self.modified_write_values.is_some()),
            ("writeConstraint", self.write_constraint.is_some()),
            ("readAction", self.read_action.is_some()),
            (DERIVED_FROM, self.derived_from.is_some()),
            ("dim", self.dim.is_some()),
        ]);
        set.extend(present(&self.properties.present()));
        set
    }
}

/// Fields resolve `derivedFrom` among each other; their value sets resolve
/// against every value set declared in the register.
fn build_fields(node: &Node, properties: &RegisterProperties) -> Result<Vec<Field>, SvdError> {
    let field_nodes = children(node, Some("fields"), ElementKind::Field.tag());
    let set_nodes: Vec<&Node> = field_nodes
        .iter()
        .copied()
        .flat_map(|field| field.children_named(ElementKind::EnumeratedValues.tag()))
        .collect();

    let mut fields = DerivationIndex::new(ElementKind::Field, &field_nodes);
    let mut sets = DerivationIndex::new(ElementKind::EnumeratedValues, &set_nodes);
    field_nodes
        .iter()
        .map(|field| {
            let resolved = fields.resolve(field)?;
            let resolved = resolve_enumerated_values(resolved, &mut sets)?;
            Field::from_node(&resolved, properties)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{Access, EnumUsage};

    fn build(xml: &str) -> Result<Register, SvdError> {
        crate::element::build(xml)
    }

    const CTRL: &str = r#"
        <register>
            <name>CTRL</name>
            <description>Control register</description>
            <addressOffset>0x10</addressOffset>
            <size>32</size>
            <access>read-write</access>
            <resetValue>0x00000005</resetValue>
            <fields>
                <field>
                    <name>EN</name>
                    <bitRange>[0:0]</bitRange>
                    <enumeratedValues>
                        <name>EnableState</name>
                        <enumeratedValue><name>OFF</name><value>0</value></enumeratedValue>
                        <enumeratedValue><name>ON</name><value>1</value></enumeratedValue>
                    </enumeratedValues>
                </field>
                <field derivedFrom="EN">
                    <name>IRQEN</name>
                    <bitOffset>1</bitOffset>
                    <bitWidth>1</bitWidth>
                </field>
                <field>
                    <name>MODE</name>
                    <lsb>2</lsb>
                    <msb>3</msb>
                    <access>read-only</access>
                    <enumeratedValues derivedFrom="EnableState">
                        <usage>read</usage>
                    </enumeratedValues>
                </field>
            </fields>
        </register>"#;

    #[test]
    fn empty_register_is_malformed() {
        assert!(matches!(
            build("<register/>"),
            Err(SvdError::MalformedElement { .. })
        ));
        assert!(matches!(
            build("<register><name>X</name></register>"),
            Err(SvdError::MissingRequiredElement { tag: "addressOffset", .. })
        ));
    }

    #[test]
    fn register_with_fields() {
        let register = build(CTRL).expect("register");
        assert_eq!(register.name(), "CTRL");
        assert_eq!(register.address_offset(), 0x10);
        assert_eq!(register.properties().reset_value(), Ok(5));
        assert!(register.is_set("description"));
        assert!(!register.is_set("displayName"));

        let names: Vec<&str> = register.fields().iter().map(Field::name).collect();
        assert_eq!(names, ["EN", "IRQEN", "MODE"]);

        let irqen = register.field("IRQEN").expect("IRQEN");
        assert_eq!(irqen.derived_from(), Ok("EN"));
        assert_eq!(irqen.bit_range().lsb(), 1);
        assert_eq!(irqen.enumerated_values()[0].name(), Ok("EnableState"));
        assert_eq!(irqen.access(), Ok(Access::ReadWrite));

        let mode = register.field("MODE").expect("MODE");
        let set = &mode.enumerated_values()[0];
        assert_eq!(set.usage(), EnumUsage::Read);
        assert_eq!(set.derived_from(), Ok("EnableState"));
        assert_eq!(set.values().len(), 2);
        assert_eq!(mode.access(), Ok(Access::ReadOnly));

        let values: Vec<(&str, u64)> = register
            .field_values(0b0110)
            .into_iter()
            .map(|(field, value)| (field.name(), value))
            .collect();
        assert_eq!(values, [("EN", 0), ("IRQEN", 1), ("MODE", 1)]);
    }

    #[test]
    fn value_set_reference_must_exist() {
        let xml = CTRL.replace(r#"derivedFrom="EnableState""#, r#"derivedFrom="Missing""#);
        assert!(matches!(
            build(&xml),
            Err(SvdError::UnresolvedDerivation {
                element: ElementKind::EnumeratedValues,
                ..
            })
        ));
    }

    #[test]
    fn field_derivation_cycle() {
        let result = build(
            r#"<register>
                <name>R</name>
                <addressOffset>0</addressOffset>
                <fields>
                    <field derivedFrom="B"><name>A</name><bitRange>[0:0]</bitRange></field>
                    <field derivedFrom="A"><name>B</name><bitRange>[1:1]</bitRange></field>
                </fields>
            </register>"#,
        );
        assert!(matches!(result, Err(SvdError::DerivationCycle { .. })));
    }

    #[test]
    fn optional_register_attributes() {
        let register = build(
            r#"<register>
                <name>DATA</name>
                <addressOffset>4</addressOffset>
                <dataType>uint16_t</dataType>
                <readAction>clear</readAction>
                <modifiedWriteValues>oneToClear</modifiedWriteValues>
                <writeConstraint><writeAsRead>true</writeAsRead></writeConstraint>
            </register>"#,
        )
        .expect("register");
        assert_eq!(register.data_type(), Ok(DataType::U16));
        assert_eq!(register.read_action(), Ok(ReadAction::Clear));
        assert_eq!(
            register.modified_write_values(),
            Ok(ModifiedWriteValues::OneToClear)
        );
        assert_eq!(
            register.write_constraint(),
            Ok(&WriteConstraint::WriteAsRead(true))
        );
        assert!(register.fields().is_empty());
        assert_eq!(
            register.properties().size(),
            Err(SvdError::AttributeNotSet {
                element: ElementKind::Register,
                attribute: "size",
            })
        );
        assert!(matches!(
            register.alternate_register(),
            Err(SvdError::AttributeNotSet { .. })
        ));
    }

    #[test]
    fn oversized_register_is_rejected() {
        let result = build(
            "<register><name>WIDE</name><addressOffset>0</addressOffset><size>128</size></register>",
        );
        assert!(matches!(result, Err(SvdError::MalformedElement { .. })));
    }
}
