use std::fmt;

use svd_xml::Node;

use crate::error::SvdError;
use crate::properties::RegisterProperties;

/// Every element kind the model understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ElementKind {
    Device,
    Cpu,
    SauRegionsConfig,
    SauRegion,
    Peripheral,
    AddressBlock,
    Interrupt,
    Cluster,
    Register,
    Field,
    WriteConstraint,
    EnumeratedValues,
    EnumeratedValue,
}

/// One mandatory piece of content of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// A child element with the given tag.
    Child(&'static str),
    /// An attribute with the given name.
    Attribute(&'static str),
    /// At least one of several child elements, reported under a label.
    OneOf(&'static str, &'static [&'static str]),
}

impl Slot {
    pub fn is_present(self, node: &Node) -> bool {
        match self {
            Slot::Child(tag) => node.has_child(tag),
            Slot::Attribute(name) => node.attribute(name).is_some(),
            Slot::OneOf(_, tags) => tags.iter().any(|tag| node.has_child(tag)),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Slot::Child(tag) | Slot::Attribute(tag) | Slot::OneOf(tag, _) => tag,
        }
    }
}

/// Attribute naming the sibling an element derives from.
pub(crate) const DERIVED_FROM: &str = "derivedFrom";

const NEVER_INHERITED: &[&str] = &[
    "name",
    "dim",
    "dimIncrement",
    "dimIndex",
    "dimName",
    "dimArrayIndex",
];

impl ElementKind {
    /// Tag of the element in SVD documents.
    pub const fn tag(self) -> &'static str {
        match self {
            ElementKind::Device => "device",
            ElementKind::Cpu => "cpu",
            ElementKind::SauRegionsConfig => "sauRegionsConfig",
            ElementKind::SauRegion => "region",
            ElementKind::Peripheral => "peripheral",
            ElementKind::AddressBlock => "addressBlock",
            ElementKind::Interrupt => "interrupt",
            ElementKind::Cluster => "cluster",
            ElementKind::Register => "register",
            ElementKind::Field => "field",
            ElementKind::WriteConstraint => "writeConstraint",
            ElementKind::EnumeratedValues => "enumeratedValues",
            ElementKind::EnumeratedValue => "enumeratedValue",
        }
    }

    /// Content every well-formed element of this kind carries.
    pub const fn mandatory(self) -> &'static [Slot] {
        use Slot::{Attribute, Child, OneOf};
        match self {
            ElementKind::Device => &[
                Attribute("schemaVersion"),
                Child("name"),
                Child("version"),
                Child("description"),
                Child("addressUnitBits"),
                Child("width"),
                Child("peripherals"),
            ],
            ElementKind::Cpu => &[
                Child("name"),
                Child("revision"),
                Child("endian"),
                Child("mpuPresent"),
                Child("fpuPresent"),
                Child("nvicPrioBits"),
                Child("vendorSystickConfig"),
            ],
            ElementKind::SauRegionsConfig => &[],
            ElementKind::SauRegion => &[Child("base"), Child("limit"), Child("access")],
            ElementKind::Peripheral => &[Child("name"), Child("baseAddress")],
            ElementKind::AddressBlock => &[Child("offset"), Child("size"), Child("usage")],
            ElementKind::Interrupt => &[Child("name"), Child("value")],
            ElementKind::Cluster | ElementKind::Register => {
                &[Child("name"), Child("addressOffset")]
            }
            ElementKind::Field => &[
                Child("name"),
                OneOf("bitRange", &["bitOffset", "lsb", "bitRange"]),
            ],
            ElementKind::WriteConstraint => &[OneOf(
                "writeAsRead",
                &["writeAsRead", "useEnumeratedValues", "range"],
            )],
            ElementKind::EnumeratedValues => &[Child("enumeratedValue")],
            ElementKind::EnumeratedValue => &[OneOf("value", &["value", "isDefault"])],
        }
    }

    /// Kinds that may carry a `derivedFrom` reference to a sibling.
    pub const fn is_derivable(self) -> bool {
        matches!(
            self,
            ElementKind::Peripheral
                | ElementKind::Cluster
                | ElementKind::Register
                | ElementKind::Field
                | ElementKind::EnumeratedValues
        )
    }

    /// Whether a child with `tag` is copied from the base of a derivation.
    pub fn inherits(self, tag: &str) -> bool {
        if NEVER_INHERITED.iter().any(|never| *never == tag) {
            return false;
        }
        !(self == ElementKind::Peripheral && tag == "interrupt")
    }

    /// Check the tag and the mandatory slots of `node`.
    ///
    /// A node carrying none of its mandatory content is malformed; one that
    /// carries some of it reports the first missing slot.
    pub fn validate_shape(self, node: &Node) -> Result<(), SvdError> {
        if node.tag() != self.tag() {
            return Err(SvdError::malformed(
                self,
                format!("expected <{}>, found <{}>", self.tag(), node.tag()),
            ));
        }
        let mandatory = self.mandatory();
        if mandatory.is_empty() {
            return Ok(());
        }
        if !mandatory.iter().any(|slot| slot.is_present(node)) {
            return Err(SvdError::malformed(
                self,
                "none of the mandatory elements are present",
            ));
        }
        match mandatory.iter().find(|slot| !slot.is_present(node)) {
            Some(slot) => Err(SvdError::MissingRequiredElement {
                element: self,
                tag: slot.label(),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Construction contract shared by every element kind.
pub trait Element: Sized {
    const KIND: ElementKind;

    /// Build the element from `node`.
    ///
    /// `inherited` carries the register properties of the enclosing element;
    /// kinds outside the register hierarchy ignore it.
    fn from_node(node: &Node, inherited: &RegisterProperties) -> Result<Self, SvdError>;

    /// Names of the optional attributes that carry a value.
    fn present_attributes(&self) -> Vec<&'static str>;

    fn is_set(&self, attribute: &str) -> bool {
        self.present_attributes()
            .iter()
            .any(|present| *present == attribute)
    }
}

#[cfg(test)]
pub(crate) fn build<E: Element>(xml: &str) -> Result<E, SvdError> {
    let node = svd_xml::parse(xml).expect("fixture xml");
    E::from_node(&node, &RegisterProperties::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tags_are_malformed() {
        for kind in [
            ElementKind::Device,
            ElementKind::Cpu,
            ElementKind::SauRegion,
            ElementKind::AddressBlock,
            ElementKind::Interrupt,
            ElementKind::Peripheral,
            ElementKind::Register,
            ElementKind::Field,
            ElementKind::EnumeratedValues,
            ElementKind::EnumeratedValue,
        ] {
            let err = kind.validate_shape(&Node::new(kind.tag())).unwrap_err();
            assert!(
                matches!(err, SvdError::MalformedElement { element, .. } if element == kind),
                "{kind}: {err}"
            );
        }
        assert!(ElementKind::SauRegionsConfig
            .validate_shape(&Node::new("sauRegionsConfig"))
            .is_ok());
    }

    #[test]
    fn partial_content_reports_missing_slot() {
        let node = Node::new("interrupt").with_child(Node::new("name").with_text("TIM0"));
        let err = ElementKind::Interrupt.validate_shape(&node).unwrap_err();
        assert_eq!(
            err,
            SvdError::MissingRequiredElement {
                element: ElementKind::Interrupt,
                tag: "value",
            }
        );

        let field = Node::new("field").with_child(Node::new("lsb").with_text("0"));
        let err = ElementKind::Field.validate_shape(&field).unwrap_err();
        assert!(matches!(
            err,
            SvdError::MissingRequiredElement { tag: "name", .. }
        ));
    }

    #[test]
    fn wrong_tag_is_malformed() {
        let err = ElementKind::Cpu
            .validate_shape(&Node::new("device"))
            .unwrap_err();
        assert!(matches!(err, SvdError::MalformedElement { .. }));
    }

    #[test]
    fn derivation_never_copies_names_or_interrupts() {
        assert!(!ElementKind::Register.inherits("name"));
        assert!(!ElementKind::Field.inherits("dim"));
        assert!(ElementKind::Register.inherits("fields"));
        assert!(!ElementKind::Peripheral.inherits("interrupt"));
        assert!(ElementKind::Peripheral.inherits("registers"));
    }
}
