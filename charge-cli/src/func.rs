use charge_lib::{
    charging::ChargeControl,
    error::Error,
    io::{SmartBattery, SmcConnection},
    key::SmcKey,
    protocol::KeyAccess,
    structs::SMC_BYTES_LEN,
};
use std::borrow::Cow;

fn err_msg(err: Error) -> Cow<'static, str> {
    err.to_string().into()
}

fn parse_key(key: &str) -> Result<SmcKey, Cow<'static, str>> {
    let bytes: [u8; 4] = key
        .as_bytes()
        .try_into()
        .map_err(|_| Cow::from("key must be exactly 4 characters"))?;
    Ok(SmcKey::from_bytes(bytes))
}

fn parse_hex(value: &str) -> Result<Vec<u8>, Cow<'static, str>> {
    if !value.is_ascii() {
        return Err("value should be ascii!".into());
    }
    let (chunks, rest) = value.as_bytes().as_chunks::<2>();
    if !rest.is_empty() {
        return Err("value must be an even number of hex digits".into());
    }
    if chunks.len() > SMC_BYTES_LEN {
        return Err("value is too long!".into());
    }
    let mut bytes = Vec::with_capacity(chunks.len());
    for pair in chunks {
        let s = std::str::from_utf8(pair).map_err(|_| Cow::from("invalid value!"))?;
        let b = u8::from_str_radix(s, 16).map_err(|_| format!("can not parse {s} as hex"))?;
        bytes.push(b);
    }
    Ok(bytes)
}

pub fn disable() -> Result<(), Cow<'static, str>> {
    let smc = SmcConnection::open().map_err(err_msg)?;
    let battery = SmartBattery;
    ChargeControl::new(&smc, &battery)
        .disable_charging()
        .map_err(err_msg)?;
    println!("charging disabled");
    Ok(())
}

pub fn enable() -> Result<(), Cow<'static, str>> {
    let smc = SmcConnection::open().map_err(err_msg)?;
    let battery = SmartBattery;
    ChargeControl::new(&smc, &battery)
        .enable_charging()
        .map_err(err_msg)?;
    println!("charging enabled");
    Ok(())
}

pub fn limit(percent: Option<u8>) -> Result<(), Cow<'static, str>> {
    let smc = SmcConnection::open().map_err(err_msg)?;
    let battery = SmartBattery;
    let ctl = ChargeControl::new(&smc, &battery);
    match percent {
        Some(p) => {
            ctl.set_charge_limit(p).map_err(err_msg)?;
            println!("charge limit set to {p}%");
        }
        None => match ctl.charge_limit().map_err(err_msg)? {
            Some(p) => println!("{p}"),
            None => println!("no data"),
        },
    }
    Ok(())
}

pub fn read(key: &str) -> Result<(), Cow<'static, str>> {
    let key = parse_key(key)?;
    let smc = SmcConnection::open().map_err(err_msg)?;
    match smc.read_key(key) {
        Ok(val) => println!("{val}"),
        Err(err) => {
            tracing::debug!(%err, "read failed");
            println!("no data");
        }
    }
    Ok(())
}

pub fn write(key: &str, value: &str) -> Result<(), Cow<'static, str>> {
    let key = parse_key(key)?;
    let bytes = parse_hex(value)?;
    let smc = SmcConnection::open().map_err(err_msg)?;
    smc.write_key(key, &bytes).map_err(err_msg)?;
    println!("ok");
    Ok(())
}
