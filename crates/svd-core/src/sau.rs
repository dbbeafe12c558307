use svd_xml::Node;

use crate::collect::collect_plain;
use crate::element::{Element, ElementKind};
use crate::error::SvdError;
use crate::extract::{present, OptionExt, Reader};
use crate::properties::RegisterProperties;
use crate::vocab::{Protection, SauAccess};

/// Predefined Secure Attribution Unit regions of a TrustZone core.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SauRegionsConfig {
    enabled: bool,
    protection_when_disabled: Protection,
    regions: Vec<SauRegion>,
}

impl SauRegionsConfig {
    /// Whether the SAU is enabled at reset, `true` unless declared.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Protection applied to all memory while the SAU is disabled.
    pub fn protection_when_disabled(&self) -> Protection {
        self.protection_when_disabled
    }

    pub fn regions(&self) -> &[SauRegion] {
        &self.regions
    }
}

impl Element for SauRegionsConfig {
    const KIND: ElementKind = ElementKind::SauRegionsConfig;

    fn from_node(node: &Node, inherited: &RegisterProperties) -> Result<Self, SvdError> {
        Self::KIND.validate_shape(node)?;
        let reader = Reader::new(node, Self::KIND);
        Ok(SauRegionsConfig {
            enabled: reader.optional_attr_or("enabled", true)?,
            protection_when_disabled: reader
                .optional_attr_or("protectionWhenDisabled", Protection::Secure)?,
            regions: collect_plain(node, None, inherited)?,
        })
    }

    fn present_attributes(&self) -> Vec<&'static str> {
        Vec::new()
    }
}

/// One address range attributed by the SAU.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SauRegion {
    enabled: bool,
    name: Option<String>,
    base: u64,
    limit: u64,
    access: SauAccess,
}

impl SauRegion {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn name(&self) -> Result<&str, SvdError> {
        self.name.as_deref().or_not_set(Self::KIND, "name")
    }

    /// First address of the region.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Last address of the region (inclusive).
    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn access(&self) -> SauAccess {
        self.access
    }

    pub fn contains(&self, address: u64) -> bool {
        (self.base..=self.limit).contains(&address)
    }
}

impl Element for SauRegion {
    const KIND: ElementKind = ElementKind::SauRegion;

    fn from_node(node: &Node, _inherited: &RegisterProperties) -> Result<Self, SvdError> {
        Self::KIND.validate_shape(node)?;
        let reader = Reader::new(node, Self::KIND);
        let base: u64 = reader.required("base")?;
        let limit: u64 = reader.required("limit")?;
        if base > limit {
            return Err(SvdError::malformed(
                Self::KIND,
                format!("base {base:#x} is above limit {limit:#x}"),
            ));
        }
        Ok(SauRegion {
            enabled: reader.optional_attr_or("enabled", true)?,
            name: reader.optional_attr("name")?,
            base,
            limit,
            access: reader.required("access")?,
        })
    }

    fn present_attributes(&self) -> Vec<&'static str> {
        present(&[("name", self.name.is_some())])
    }
}
