use std::error::Error;

use cmsis_svd::Element;

const XML: &str = r#"
<device schemaVersion="1.3">
    <name>DEMO</name>
    <version>1.0</version>
    <description>register decoding demo</description>
    <addressUnitBits>8</addressUnitBits>
    <width>32</width>
    <size>32</size>
    <access>read-write</access>
    <peripherals>
        <peripheral>
            <name>RCC</name>
            <baseAddress>0x40021000</baseAddress>
            <registers>
                <register>
                    <name>CFGR</name>
                    <addressOffset>0x04</addressOffset>
                    <resetValue>0x00000005</resetValue>
                    <fields>
                        <field>
                            <name>SW</name>
                            <bitRange>[1:0]</bitRange>
                            <enumeratedValues>
                                <name>ClockSource</name>
                                <enumeratedValue><name>HSI</name><value>#00</value></enumeratedValue>
                                <enumeratedValue><name>HSE</name><value>#01</value></enumeratedValue>
                                <enumeratedValue><name>PLL</name><value>#10</value></enumeratedValue>
                                <enumeratedValue><name>Reserved</name><isDefault>true</isDefault></enumeratedValue>
                            </enumeratedValues>
                        </field>
                        <field derivedFrom="SW">
                            <name>SWS</name>
                            <bitOffset>2</bitOffset>
                            <bitWidth>2</bitWidth>
                            <access>read-only</access>
                        </field>
                    </fields>
                </register>
            </registers>
        </peripheral>
    </peripherals>
</device>
"#;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();
    let device = cmsis_svd::parse(XML)?;
    let rcc = device.peripheral("RCC").ok_or("RCC missing")?;
    let cfgr = rcc.register("CFGR").ok_or("CFGR missing")?;
    let raw = cfgr.properties().reset_value().unwrap_or(0);
    let address = rcc
        .register_address(cfgr)
        .ok_or("CFGR lies past the address space")?;

    println!(
        "{}.{} @ {:#010x} = {raw:#010x}",
        rcc.name(),
        cfgr.name(),
        address
    );
    for (field, value) in cfgr.field_values(raw) {
        let meaning = field
            .describe(raw)
            .and_then(|entry| entry.name().ok())
            .unwrap_or("-");
        println!(
            "  {:<4} [{}:{}] = {value} ({meaning}) set: {:?}",
            field.name(),
            field.bit_range().msb(),
            field.bit_range().lsb(),
            field.present_attributes()
        );
    }
    Ok(())
}
