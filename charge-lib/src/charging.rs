//! Charging control policy.
//!
//! Different hardware generations expose different subsets of the charging
//! controls: Apple Silicon machines take registry property writes on the
//! battery service, Intel machines take SMC key writes. Rather than detect
//! hardware, [`disable_charging`](ChargeControl::disable_charging) and
//! [`enable_charging`](ChargeControl::enable_charging) try every mechanism
//! in order and succeed if any one of them does. Setting the charge limit
//! prefers the registry property and falls back to the SMC key only when the
//! property write fails; reading the limit has a single method.

use tracing::{debug, warn};

use crate::{
    error::Error,
    key::SmcKey,
    protocol::KeyAccess,
    registry::{
        CHARGE_RATE_STOPPED, CHARGE_RATE_UNLIMITED, PROP_CHARGE_CAPACITY, PROP_CHARGE_INHIBIT,
        PROP_CHARGE_RATE, PropertySetter, PropertyValue,
    },
};

/// Stops the charger while set to 0x02.
pub const KEY_CHARGE_STOP: SmcKey = SmcKey::from_bytes(*b"CH0B");
/// Inhibits charging while set to 0x01.
pub const KEY_CHARGE_INHIBIT: SmcKey = SmcKey::from_bytes(*b"CH0I");
/// Battery charge level max: the percentage cap.
pub const KEY_BCLM: SmcKey = SmcKey::from_bytes(*b"BCLM");

/// Charging operations over an SMC connection and the battery service.
///
/// Both collaborators are borrowed; the caller owns the connection and
/// decides when to close it.
pub struct ChargeControl<'a, S: ?Sized, R: ?Sized> {
    smc: &'a S,
    battery: &'a R,
}

impl<'a, S, R> ChargeControl<'a, S, R>
where
    S: KeyAccess + ?Sized,
    R: PropertySetter + ?Sized,
{
    pub fn new(smc: &'a S, battery: &'a R) -> Self {
        Self { smc, battery }
    }

    /// Stops the battery from charging.
    ///
    /// All four mechanisms are attempted unconditionally; the operation
    /// fails only if every one of them fails.
    pub fn disable_charging(&self) -> Result<(), Error> {
        run_all(
            "disable charging",
            [
                ("registry ChargeInhibit", &mut || {
                    self.battery
                        .set_property(PROP_CHARGE_INHIBIT, PropertyValue::Bool(true))
                }),
                ("registry ChargeRate", &mut || {
                    self.battery
                        .set_property(PROP_CHARGE_RATE, PropertyValue::Int(CHARGE_RATE_STOPPED))
                }),
                ("smc CH0B", &mut || {
                    self.smc.write_key(KEY_CHARGE_STOP, &[0x02])
                }),
                ("smc CH0I", &mut || {
                    self.smc.write_key(KEY_CHARGE_INHIBIT, &[0x01])
                }),
            ],
        )
    }

    /// Allows the battery to charge again, mirroring
    /// [`disable_charging`](Self::disable_charging) with the inverse values.
    pub fn enable_charging(&self) -> Result<(), Error> {
        run_all(
            "enable charging",
            [
                ("registry ChargeInhibit", &mut || {
                    self.battery
                        .set_property(PROP_CHARGE_INHIBIT, PropertyValue::Bool(false))
                }),
                ("registry ChargeRate", &mut || {
                    self.battery
                        .set_property(PROP_CHARGE_RATE, PropertyValue::Int(CHARGE_RATE_UNLIMITED))
                }),
                ("smc CH0B", &mut || {
                    self.smc.write_key(KEY_CHARGE_STOP, &[0x00])
                }),
                ("smc CH0I", &mut || {
                    self.smc.write_key(KEY_CHARGE_INHIBIT, &[0x00])
                }),
            ],
        )
    }

    /// Caps charging at `percent` of full capacity.
    ///
    /// Unlike the enable/disable pair this short-circuits: the SMC key is
    /// written only when the registry property fails, and its error
    /// propagates as-is.
    pub fn set_charge_limit(&self, percent: u8) -> Result<(), Error> {
        match self
            .battery
            .set_property(PROP_CHARGE_CAPACITY, PropertyValue::Int(i32::from(percent)))
        {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(%err, "registry ChargeCapacity failed, falling back to BCLM");
                self.smc.write_key(KEY_BCLM, &[percent])
            }
        }
    }

    /// Reads the current charge cap from the SMC.
    ///
    /// Returns `None` when the key reports no data. There is no registry
    /// counterpart for reading the cap.
    pub fn charge_limit(&self) -> Result<Option<u8>, Error> {
        let val = self.smc.read_key(KEY_BCLM)?;
        Ok(val.valid_bytes().first().copied())
    }
}

/// Runs every attempt in order, swallowing individual failures; the result
/// is the OR of all of them.
fn run_all(
    operation: &'static str,
    attempts: [(&'static str, &mut dyn FnMut() -> Result<(), Error>); 4],
) -> Result<(), Error> {
    let mut any_ok = false;
    for (method, attempt) in attempts {
        match attempt() {
            Ok(()) => {
                debug!(operation, method, "method succeeded");
                any_ok = true;
            }
            Err(err) => warn!(operation, method, %err, "method failed"),
        }
    }
    if any_ok {
        Ok(())
    } else {
        Err(Error::AllMethodsFailed { operation })
    }
}
