use svd_xml::Node;
use tracing::debug;

use crate::collect::collect;
use crate::dim::DimElement;
use crate::element::{Element, ElementKind, DERIVED_FROM};
use crate::error::SvdError;
use crate::extract::{present, OptionExt, Reader};
use crate::properties::RegisterProperties;
use crate::register::Register;

/// Group of registers (and nested clusters) at a common offset.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Cluster {
    name: String,
    description: Option<String>,
    alternate_cluster: Option<String>,
    header_struct_name: Option<String>,
    address_offset: u64,
    properties: RegisterProperties,
    derived_from: Option<String>,
    dim: Option<DimElement>,
    registers: Vec<Register>,
    clusters: Vec<Cluster>,
}

impl Cluster {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Result<&str, SvdError> {
        self.description
            .as_deref()
            .or_not_set(Self::KIND, "description")
    }

    pub fn alternate_cluster(&self) -> Result<&str, SvdError> {
        self.alternate_cluster
            .as_deref()
            .or_not_set(Self::KIND, "alternateCluster")
    }

    pub fn header_struct_name(&self) -> Result<&str, SvdError> {
        self.header_struct_name
            .as_deref()
            .or_not_set(Self::KIND, "headerStructName")
    }

    pub fn address_offset(&self) -> u64 {
        self.address_offset
    }

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

    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }
}

impl Element for Cluster {
    const KIND: ElementKind = ElementKind::Cluster;

    fn from_node(node: &Node, inherited: &RegisterProperties) -> Result<Self, SvdError> {
        Self::KIND.validate_shape(node)?;
        let reader = Reader::new(node, Self::KIND);
        let properties = RegisterProperties::read(&reader)?.inherit(inherited);
        let cluster = Cluster {
            name: reader.required("name")?,
            description: reader.optional("description")?,
            alternate_cluster: reader.optional("alternateCluster")?,
            header_struct_name: reader.optional("headerStructName")?,
            address_offset: reader.required("addressOffset")?,
            properties,
            derived_from: reader.optional_attr(DERIVED_FROM)?,
            dim: DimElement::read(&reader)?,
            registers: collect(node, None, &properties)?,
            clusters: collect(node, None, &properties)?,
        };
        debug!(
            name = %cluster.name,
            registers = cluster.registers.len(),
            clusters = cluster.clusters.len(),
            "built cluster"
        );
        Ok(cluster)
    }

    fn present_attributes(&self) -> Vec<&'static str> {
        let mut set = present(&[
            ("description", self.description.is_some()),
            ("alternateCluster", self.alternate_cluster.is_some()),
            ("headerStructName", self.header_struct_name.is_some()),
            (DERIVED_FROM, self.derived_from.is_some()),
            ("dim", self.dim.is_some()),
        ]);
        set.extend(present(&self.properties.present()));
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::build;
    use crate::vocab::Access;

    #[test]
    fn nested_clusters_inherit_properties() {
        let cluster: Cluster = build(
            r#"<cluster>
                <name>DMA</name>
                <addressOffset>0x100</addressOffset>
                <access>read-only</access>
                <size>16</size>
                <register><name>STATUS</name><addressOffset>0</addressOffset></register>
                <cluster>
                    <name>CH</name>
                    <addressOffset>0x10</addressOffset>
                    <size>8</size>
                    <register><name>CFG</name><addressOffset>0</addressOffset></register>
                </cluster>
                <cluster derivedFrom="CH">
                    <name>CH2</name>
                    <addressOffset>0x20</addressOffset>
                </cluster>
            </cluster>"#,
        )
        .expect("cluster");
        assert_eq!(cluster.address_offset(), 0x100);
        assert_eq!(cluster.registers()[0].properties().size(), Ok(16));

        let ch = &cluster.clusters()[0];
        let cfg = &ch.registers()[0];
        assert_eq!(cfg.properties().size(), Ok(8));
        assert_eq!(cfg.properties().access(), Ok(Access::ReadOnly));

        let ch2 = &cluster.clusters()[1];
        assert_eq!(ch2.derived_from(), Ok("CH"));
        assert_eq!(ch2.registers()[0].name(), "CFG");
        assert_eq!(ch2.properties().size(), Ok(8));
    }

    #[test]
    fn mandatory_only_cluster() {
        let cluster: Cluster =
            build("<cluster><name>BUF</name><addressOffset>0x40</addressOffset></cluster>")
                .expect("cluster");
        assert!(cluster.registers().is_empty());
        assert!(cluster.clusters().is_empty());
        assert!(cluster.present_attributes().is_empty());
        for (result, attribute) in [
            (cluster.description(), "description"),
            (cluster.alternate_cluster(), "alternateCluster"),
            (cluster.header_struct_name(), "headerStructName"),
        ] {
            assert_eq!(
                result,
                Err(SvdError::AttributeNotSet {
                    element: ElementKind::Cluster,
                    attribute,
                })
            );
        }
    }

    #[test]
    fn empty_cluster_is_malformed() {
        assert!(matches!(
            build::<Cluster>("<cluster/>"),
            Err(SvdError::MalformedElement { .. })
        ));
    }
}
