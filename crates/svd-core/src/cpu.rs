use svd_xml::Node;
use tracing::debug;

use crate::collect::single;
use crate::element::{Element, ElementKind};
use crate::error::SvdError;
use crate::extract::{present, OptionExt, Reader};
use crate::properties::RegisterProperties;
use crate::sau::SauRegionsConfig;
use crate::vocab::{CpuName, Endian};

const NOT_TRUSTZONE: &str = "core has no security extension";

/// Processor core configuration of a device.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Cpu {
    name: CpuName,
    revision: String,
    endian: Endian,
    mpu_present: bool,
    fpu_present: bool,
    fpu_dp: Option<bool>,
    dsp_present: Option<bool>,
    icache_present: Option<bool>,
    dcache_present: Option<bool>,
    itcm_present: Option<bool>,
    dtcm_present: Option<bool>,
    vtor_present: Option<bool>,
    nvic_prio_bits: u32,
    vendor_systick_config: bool,
    device_num_interrupts: Option<u32>,
    sau_num_regions: Option<u32>,
    sau_regions_config: Option<SauRegionsConfig>,
}

impl Cpu {
    pub fn name(&self) -> CpuName {
        self.name
    }

    /// Core revision, `rNpM`.
    pub fn revision(&self) -> &str {
        &self.revision
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn mpu_present(&self) -> bool {
        self.mpu_present
    }

    pub fn fpu_present(&self) -> bool {
        self.fpu_present
    }

    /// Whether the FPU is double precision.
    pub fn fpu_dp(&self) -> Result<bool, SvdError> {
        self.fpu_dp.or_not_set(Self::KIND, "fpuDP")
    }

    pub fn dsp_present(&self) -> Result<bool, SvdError> {
        self.dsp_present.or_not_set(Self::KIND, "dspPresent")
    }

    pub fn icache_present(&self) -> Result<bool, SvdError> {
        self.icache_present.or_not_set(Self::KIND, "icachePresent")
    }

    pub fn dcache_present(&self) -> Result<bool, SvdError> {
        self.dcache_present.or_not_set(Self::KIND, "dcachePresent")
    }

    pub fn itcm_present(&self) -> Result<bool, SvdError> {
        self.itcm_present.or_not_set(Self::KIND, "itcmPresent")
    }

    pub fn dtcm_present(&self) -> Result<bool, SvdError> {
        self.dtcm_present.or_not_set(Self::KIND, "dtcmPresent")
    }

    /// Whether the core has a vector table offset register.
    ///
    /// Assumed present unless the document declares otherwise, so this never
    /// fails.
    pub fn vtor_present(&self) -> bool {
        self.vtor_present.unwrap_or(true)
    }

    /// Number of NVIC priority bits.
    pub fn nvic_prio_bits(&self) -> u32 {
        self.nvic_prio_bits
    }

    pub fn vendor_systick_config(&self) -> bool {
        self.vendor_systick_config
    }

    pub fn device_num_interrupts(&self) -> Result<u32, SvdError> {
        self.device_num_interrupts
            .or_not_set(Self::KIND, "deviceNumInterrupts")
    }

    /// Number of SAU regions; only meaningful on TrustZone cores.
    pub fn sau_num_regions(&self) -> Result<u32, SvdError> {
        self.conditional(self.sau_num_regions, "sauNumRegions")
    }

    pub fn sau_regions_config(&self) -> Result<&SauRegionsConfig, SvdError> {
        self.conditional(self.sau_regions_config.as_ref(), "sauRegionsConfig")
    }

    fn conditional<T>(&self, value: Option<T>, attribute: &'static str) -> Result<T, SvdError> {
        match value {
            Some(value) => Ok(value),
            None if !self.name.has_security_extension() => Err(SvdError::NotApplicable {
                element: Self::KIND,
                attribute,
                reason: NOT_TRUSTZONE,
            }),
            None => Err(SvdError::AttributeNotSet {
                element: Self::KIND,
                attribute,
            }),
        }
    }
}

impl Element for Cpu {
    const KIND: ElementKind = ElementKind::Cpu;

    fn from_node(node: &Node, inherited: &RegisterProperties) -> Result<Self, SvdError> {
        Self::KIND.validate_shape(node)?;
        let reader = Reader::new(node, Self::KIND);

        let nvic_prio_bits: u32 = reader.required("nvicPrioBits")?;
        if !(2..=8).contains(&nvic_prio_bits) {
            return Err(SvdError::malformed(
                Self::KIND,
                format!("nvicPrioBits {nvic_prio_bits} is outside 2..=8"),
            ));
        }
        let fpu_present: bool = reader.required("fpuPresent")?;
        let fpu_dp: Option<bool> = reader.optional("fpuDP")?;
        if fpu_dp == Some(true) && !fpu_present {
            return Err(SvdError::malformed(
                Self::KIND,
                "fpuDP is set without fpuPresent",
            ));
        }
        let sau_num_regions: Option<u32> = reader.optional("sauNumRegions")?;
        let sau_regions_config: Option<SauRegionsConfig> = single(node, inherited)?;
        if let (Some(limit), Some(config)) = (sau_num_regions, &sau_regions_config) {
            if config.regions().len() > limit as usize {
                return Err(SvdError::malformed(
                    Self::KIND,
                    format!(
                        "{} SAU regions configured but sauNumRegions is {limit}",
                        config.regions().len()
                    ),
                ));
            }
        }

        let cpu = Cpu {
            name: reader.required("name")?,
            revision: reader.required("revision")?,
            endian: reader.required("endian")?,
            mpu_present: reader.required("mpuPresent")?,
            fpu_present,
            fpu_dp,
            dsp_present: reader.optional("dspPresent")?,
            icache_present: reader.optional("icachePresent")?,
            dcache_present: reader.optional("dcachePresent")?,
            itcm_present: reader.optional("itcmPresent")?,
            dtcm_present: reader.optional("dtcmPresent")?,
            vtor_present: reader.optional("vtorPresent")?,
            nvic_prio_bits,
            vendor_systick_config: reader.required("vendorSystickConfig")?,
            device_num_interrupts: reader.optional("deviceNumInterrupts")?,
            sau_num_regions,
            sau_regions_config,
        };
        debug!(name = %cpu.name, revision = %cpu.revision, "built cpu");
        Ok(cpu)
    }

    fn present_attributes(&self) -> Vec<&'static str> {
        present(&[
            ("fpuDP", self.fpu_dp.is_some()),
            ("dspPresent", self.dsp_present.is_some()),
            ("icachePresent", self.icache_present.is_some()),
            ("dcachePresent", self.dcache_present.is_some()),
            ("itcmPresent", self.itcm_present.is_some()),
            ("dtcmPresent", self.dtcm_present.is_some()),
            ("vtorPresent", self.vtor_present.is_some()),
            ("deviceNumInterrupts", self.device_num_interrupts.is_some()),
            ("sauNumRegions", self.sau_num_regions.is_some()),
            ("sauRegionsConfig", self.sau_regions_config.is_some()),
        ])
    }
}
