//! Print an SVD device model as JSON.
//!
//! `cargo run -p cmsis-svd --example dump_device --features serde -- path/to/device.svd`
//! Without a path a small built-in document is used.

use std::error::Error;

use tracing_subscriber::EnvFilter;

const SAMPLE: &str = r#"
<device schemaVersion="1.3">
    <vendor>ARM Ltd.</vendor>
    <name>ARMCM4</name>
    <version>1.0</version>
    <description>Arm Cortex-M4 based demonstration device</description>
    <cpu>
        <name>CM4</name>
        <revision>r0p1</revision>
        <endian>little</endian>
        <mpuPresent>true</mpuPresent>
        <fpuPresent>true</fpuPresent>
        <nvicPrioBits>3</nvicPrioBits>
        <vendorSystickConfig>false</vendorSystickConfig>
    </cpu>
    <addressUnitBits>8</addressUnitBits>
    <width>32</width>
    <size>32</size>
    <access>read-write</access>
    <resetValue>0</resetValue>
    <resetMask>0xFFFFFFFF</resetMask>
    <peripherals>
        <peripheral>
            <name>UART0</name>
            <baseAddress>0x40004000</baseAddress>
            <interrupt><name>UART0</name><value>5</value></interrupt>
            <registers>
                <register>
                    <name>DATA</name>
                    <addressOffset>0x0</addressOffset>
                    <fields>
                        <field><name>DATA</name><bitRange>[7:0]</bitRange></field>
                    </fields>
                </register>
            </registers>
        </peripheral>
    </peripherals>
</device>
"#;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with_target(false)
        .init();

    let text = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE.to_string(),
    };
    let device = cmsis_svd::parse(&text)?;
    println!("{}", serde_json::to_string_pretty(&device)?);
    Ok(())
}
