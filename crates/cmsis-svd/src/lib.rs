#![cfg_attr(docsrs, feature(doc_cfg))]
//! CMSIS-SVD facade: reads an SVD document with [`xml`] and builds the typed
//! device model from [`svd`].
//!
//! ```rust
//! let device = cmsis_svd::parse(
//!     r#"<device schemaVersion="1.3">
//!         <name>DEMO</name>
//!         <version>1.0</version>
//!         <description>demo device</description>
//!         <addressUnitBits>8</addressUnitBits>
//!         <width>32</width>
//!         <peripherals>
//!             <peripheral>
//!                 <name>GPIOA</name>
//!                 <baseAddress>0x48000000</baseAddress>
//!             </peripheral>
//!         </peripherals>
//!     </device>"#,
//! )?;
//! assert_eq!(device.peripherals()[0].base_address(), 0x4800_0000);
//! assert!(device.vendor().is_err());
//! # Ok::<(), cmsis_svd::Error>(())
//! ```

pub use svd_core as svd;
pub use svd_xml as xml;

pub use svd_core::{
    Access, Cpu, CpuName, Device, Element, ElementKind, EnumeratedValue, EnumeratedValues, Field,
    Interrupt, Peripheral, Register, RegisterProperties, SvdError,
};
pub use svd_xml::{Node, XmlError};

use thiserror::Error;
use tracing::debug;

/// Error type produced by [`parse`].
#[derive(Debug, Error)]
pub enum Error {
    /// The text is not a well-formed XML document.
    #[error(transparent)]
    Xml(#[from] XmlError),
    /// The document is well-formed but not a valid SVD device description.
    #[error(transparent)]
    Svd(#[from] SvdError),
}

/// Parse SVD text into a [`Device`].
pub fn parse(text: &str) -> Result<Device, Error> {
    let root = svd_xml::parse(text)?;
    debug!(bytes = text.len(), "parsed svd xml");
    Ok(Device::from_root(&root)?)
}
