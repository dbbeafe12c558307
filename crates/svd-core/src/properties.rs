use crate::element::ElementKind;
use crate::error::SvdError;
use crate::extract::{OptionExt, Reader};
use crate::vocab::{Access, Protection};

/// Register property group shared by device, peripheral, cluster and register.
///
/// Values declared on an element act as defaults for every register below
/// it unless a closer element overrides them. Accessors of properties that
/// are set nowhere on the path report [`SvdError::AttributeNotSet`] against
/// the element owning the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegisterProperties {
    #[cfg_attr(feature = "serde", serde(skip))]
    owner: ElementKind,
    size: Option<u32>,
    access: Option<Access>,
    protection: Option<Protection>,
    reset_value: Option<u64>,
    reset_mask: Option<u64>,
}

impl RegisterProperties {
    pub(crate) fn read(reader: &Reader<'_>) -> Result<Self, SvdError> {
        Ok(RegisterProperties {
            owner: reader.kind(),
            size: reader.optional("size")?,
            access: reader.optional("access")?,
            protection: reader.optional("protection")?,
            reset_value: reader.optional("resetValue")?,
            reset_mask: reader.optional("resetMask")?,
        })
    }

    /// Fill every unset property from `parent`.
    pub fn inherit(self, parent: &RegisterProperties) -> Self {
        RegisterProperties {
            owner: self.owner,
            size: self.size.or(parent.size),
            access: self.access.or(parent.access),
            protection: self.protection.or(parent.protection),
            reset_value: self.reset_value.or(parent.reset_value),
            reset_mask: self.reset_mask.or(parent.reset_mask),
        }
    }

    /// Element the group belongs to.
    pub fn owner(&self) -> ElementKind {
        self.owner
    }

    /// Register width in bits.
    pub fn size(&self) -> Result<u32, SvdError> {
        self.size.or_not_set(self.owner, "size")
    }

    pub fn access(&self) -> Result<Access, SvdError> {
        self.access.or_not_set(self.owner, "access")
    }

    pub fn protection(&self) -> Result<Protection, SvdError> {
        self.protection.or_not_set(self.owner, "protection")
    }

    pub fn reset_value(&self) -> Result<u64, SvdError> {
        self.reset_value.or_not_set(self.owner, "resetValue")
    }

    pub fn reset_mask(&self) -> Result<u64, SvdError> {
        self.reset_mask.or_not_set(self.owner, "resetMask")
    }

    pub(crate) fn present(&self) -> [(&'static str, bool); 5] {
        [
            ("size", self.size.is_some()),
            ("access", self.access.is_some()),
            ("protection", self.protection.is_some()),
            ("resetValue", self.reset_value.is_some()),
            ("resetMask", self.reset_mask.is_some()),
        ]
    }
}

/// Empty group above the device, the starting point of inheritance.
impl Default for RegisterProperties {
    fn default() -> Self {
        RegisterProperties {
            owner: ElementKind::Device,
            size: None,
            access: None,
            protection: None,
            reset_value: None,
            reset_mask: None,
        }
    }
}
