use svd_xml::Node;
use tracing::trace;

use crate::collect::collect_plain;
use crate::element::{Element, ElementKind, DERIVED_FROM};
use crate::error::SvdError;
use crate::extract::{present, OptionExt, Reader};
use crate::literal::BitPattern;
use crate::properties::RegisterProperties;
use crate::vocab::EnumUsage;

/// Named set of values a field may hold.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EnumeratedValues {
    name: Option<String>,
    header_enum_name: Option<String>,
    usage: EnumUsage,
    derived_from: Option<String>,
    values: Vec<EnumeratedValue>,
}

impl EnumeratedValues {
    pub fn name(&self) -> Result<&str, SvdError> {
        self.name.as_deref().or_not_set(Self::KIND, "name")
    }

    pub fn header_enum_name(&self) -> Result<&str, SvdError> {
        self.header_enum_name
            .as_deref()
            .or_not_set(Self::KIND, "headerEnumName")
    }

    /// Access type the set applies to, `read-write` unless declared.
    pub fn usage(&self) -> EnumUsage {
        self.usage
    }

    pub fn derived_from(&self) -> Result<&str, SvdError> {
        self.derived_from
            .as_deref()
            .or_not_set(Self::KIND, DERIVED_FROM)
    }

    pub fn values(&self) -> &[EnumeratedValue] {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&EnumeratedValue> {
        self.values
            .iter()
            .find(|value| value.name.as_deref() == Some(name))
    }

    /// Entry describing `raw`: the first whose pattern matches, otherwise the
    /// default entry.
    pub fn lookup(&self, raw: u64) -> Option<&EnumeratedValue> {
        let found = self
            .values
            .iter()
            .find(|value| value.matches(raw))
            .or_else(|| self.values.iter().find(|value| value.is_default));
        trace!(raw, found = ?found.and_then(|value| value.name.as_deref()), "enumerated lookup");
        found
    }
}

impl Element for EnumeratedValues {
    const KIND: ElementKind = ElementKind::EnumeratedValues;

    fn from_node(node: &Node, inherited: &RegisterProperties) -> Result<Self, SvdError> {
        Self::KIND.validate_shape(node)?;
        let reader = Reader::new(node, Self::KIND);
        let values: Vec<EnumeratedValue> = collect_plain(node, None, inherited)?;
        if values.iter().filter(|value| value.is_default).count() > 1 {
            return Err(SvdError::malformed(
                Self::KIND,
                "more than one enumeratedValue is marked isDefault",
            ));
        }
        Ok(EnumeratedValues {
            name: reader.optional("name")?,
            header_enum_name: reader.optional("headerEnumName")?,
            usage: reader.optional_or("usage", EnumUsage::ReadWrite)?,
            derived_from: reader.optional_attr(DERIVED_FROM)?,
            values,
        })
    }

    fn present_attributes(&self) -> Vec<&'static str> {
        present(&[
            ("name", self.name.is_some()),
            ("headerEnumName", self.header_enum_name.is_some()),
            (DERIVED_FROM, self.derived_from.is_some()),
        ])
    }
}

/// One named value of a field, or the catch-all default entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EnumeratedValue {
    name: Option<String>,
    description: Option<String>,
    value: Option<BitPattern>,
    is_default: bool,
}

impl EnumeratedValue {
    pub fn name(&self) -> Result<&str, SvdError> {
        self.name.as_deref().or_not_set(Self::KIND, "name")
    }

    pub fn description(&self) -> Result<&str, SvdError> {
        self.description
            .as_deref()
            .or_not_set(Self::KIND, "description")
    }

    /// Decoded value, with don't-care digits read as zero.
    pub fn value(&self) -> Result<u64, SvdError> {
        self.pattern().map(BitPattern::value)
    }

    pub fn pattern(&self) -> Result<BitPattern, SvdError> {
        self.value.or_not_set(Self::KIND, "value")
    }

    /// Only available on the default entry.
    pub fn is_default(&self) -> Result<bool, SvdError> {
        if self.is_default {
            Ok(true)
        } else {
            Err(SvdError::AttributeNotSet {
                element: Self::KIND,
                attribute: "isDefault",
            })
        }
    }

    /// Whether `raw` is described by this entry's value pattern.
    pub fn matches(&self, raw: u64) -> bool {
        self.value.is_some_and(|pattern| pattern.matches(raw))
    }
}

impl Element for EnumeratedValue {
    const KIND: ElementKind = ElementKind::EnumeratedValue;

    fn from_node(node: &Node, _inherited: &RegisterProperties) -> Result<Self, SvdError> {
        Self::KIND.validate_shape(node)?;
        let reader = Reader::new(node, Self::KIND);
        let value: Option<BitPattern> = reader.optional("value")?;
        let is_default: Option<bool> = reader.optional("isDefault")?;
        let is_default = match (value, is_default) {
            (Some(_), Some(_)) => {
                return Err(SvdError::malformed(
                    Self::KIND,
                    "value and isDefault are mutually exclusive",
                ))
            }
            (None, Some(false)) => {
                return Err(SvdError::malformed(
                    Self::KIND,
                    "isDefault is false and no value is given",
                ))
            }
            (_, flag) => flag.unwrap_or(false),
        };
        Ok(EnumeratedValue {
            name: reader.optional("name")?,
            description: reader.optional("description")?,
            value,
            is_default,
        })
    }

    fn present_attributes(&self) -> Vec<&'static str> {
        present(&[
            ("name", self.name.is_some()),
            ("description", self.description.is_some()),
            ("value", self.value.is_some()),
            ("isDefault", self.is_default),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::build;

    const TIMER_INT_SELECT: &str = r#"
        <enumeratedValues>
            <name>TimerIntSelect</name>
            <headerEnumName>TimerIntSelectEnum</headerEnumName>
            <usage>read-write</usage>
            <enumeratedValue>
                <name>disabled</name>
                <description>The periodic interrupt is disabled.</description>
                <value>0</value>
            </enumeratedValue>
            <enumeratedValue>
                <name>enabled</name>
                <description>The periodic interrupt is enabled.</description>
                <value>1</value>
            </enumeratedValue>
            <enumeratedValue>
                <name>reserved</name>
                <description>Reserved values. Do not use.</description>
                <isDefault>true</isDefault>
            </enumeratedValue>
        </enumeratedValues>"#;

    #[test]
    fn empty_tags_are_malformed() {
        assert!(matches!(
            build::<EnumeratedValues>("<enumeratedValues/>"),
            Err(SvdError::MalformedElement { .. })
        ));
        assert!(matches!(
            build::<EnumeratedValue>("<enumeratedValue/>"),
            Err(SvdError::MalformedElement { .. })
        ));
    }

    #[test]
    fn minimal_set() {
        let set: EnumeratedValues = build(
            "<enumeratedValues><enumeratedValue><value>0</value></enumeratedValue></enumeratedValues>",
        )
        .expect("enumerated values");
        assert_eq!(set.usage(), EnumUsage::ReadWrite);
        assert_eq!(set.values().len(), 1);
        assert_eq!(set.values()[0].value(), Ok(0));
        assert!(matches!(set.name(), Err(SvdError::AttributeNotSet { .. })));
        assert!(matches!(
            set.header_enum_name(),
            Err(SvdError::AttributeNotSet { .. })
        ));
        assert!(set.present_attributes().is_empty());
    }

    #[test]
    fn full_set() {
        let set: EnumeratedValues = build(TIMER_INT_SELECT).expect("enumerated values");
        assert_eq!(set.name(), Ok("TimerIntSelect"));
        assert_eq!(set.header_enum_name(), Ok("TimerIntSelectEnum"));
        assert_eq!(set.usage(), EnumUsage::ReadWrite);
        assert_eq!(set.values().len(), 3);

        let disabled = &set.values()[0];
        assert_eq!(disabled.name(), Ok("disabled"));
        assert_eq!(
            disabled.description(),
            Ok("The periodic interrupt is disabled.")
        );
        assert_eq!(disabled.value(), Ok(0));
        assert_eq!(set.values()[1].value(), Ok(1));

        let reserved = &set.values()[2];
        assert_eq!(reserved.is_default(), Ok(true));
        assert!(matches!(
            reserved.value(),
            Err(SvdError::AttributeNotSet { attribute: "value", .. })
        ));
        assert_eq!(set.value("enabled").map(|v| v.value()), Some(Ok(1)));
    }

    #[test]
    fn value_and_default_are_exclusive() {
        let value: EnumeratedValue = build(
            "<enumeratedValue><name>on</name><value>1</value></enumeratedValue>",
        )
        .expect("value only");
        assert_eq!(value.value(), Ok(1));
        assert_eq!(
            value.is_default(),
            Err(SvdError::AttributeNotSet {
                element: ElementKind::EnumeratedValue,
                attribute: "isDefault",
            })
        );
        assert_eq!(value.present_attributes(), ["name", "value"]);

        let default: EnumeratedValue =
            build("<enumeratedValue><isDefault>true</isDefault></enumeratedValue>")
                .expect("default only");
        assert_eq!(default.is_default(), Ok(true));
        assert!(matches!(
            default.value(),
            Err(SvdError::AttributeNotSet { .. })
        ));
        assert!(!default.is_set("value"));

        let both = build::<EnumeratedValue>(
            "<enumeratedValue><value>1</value><isDefault>true</isDefault></enumeratedValue>",
        );
        assert!(matches!(both, Err(SvdError::MalformedElement { .. })));
    }

    #[test]
    fn lookup_uses_patterns_then_default() {
        let set: EnumeratedValues = build(
            r#"<enumeratedValues>
                <enumeratedValue><name>low</name><value>#0x</value></enumeratedValue>
                <enumeratedValue><name>three</name><value>0x3</value></enumeratedValue>
                <enumeratedValue><name>other</name><isDefault>1</isDefault></enumeratedValue>
            </enumeratedValues>"#,
        )
        .expect("enumerated values");
        let name = |raw| set.lookup(raw).and_then(|value| value.name().ok());
        assert_eq!(name(0), Some("low"));
        assert_eq!(name(1), Some("low"));
        assert_eq!(name(3), Some("three"));
        assert_eq!(name(2), Some("other"));
    }

    #[test]
    fn two_defaults_are_rejected() {
        let result = build::<EnumeratedValues>(
            r#"<enumeratedValues>
                <enumeratedValue><isDefault>true</isDefault></enumeratedValue>
                <enumeratedValue><isDefault>true</isDefault></enumeratedValue>
            </enumeratedValues>"#,
        );
        assert!(matches!(result, Err(SvdError::MalformedElement { .. })));
    }

    #[test]
    fn unknown_usage_is_rejected() {
        let result = build::<EnumeratedValues>(
            "<enumeratedValues><usage>sometimes</usage><enumeratedValue><value>0</value></enumeratedValue></enumeratedValues>",
        );
        assert!(matches!(
            result,
            Err(SvdError::UnknownEnumValue { tag: "usage", .. })
        ));
    }
}
