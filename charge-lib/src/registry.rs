//! Property writes on the battery management service.
//!
//! An alternate control path that bypasses the SMC entirely: named, typed
//! properties are set directly on the battery service object in the IO
//! registry. Success only means the registry accepted the write, there is no
//! read-back verification of the hardware effect.

use crate::error::Error;

/// Inhibits charging while `true`.
pub const PROP_CHARGE_INHIBIT: &str = "ChargeInhibit";
/// Charge rate; [`CHARGE_RATE_STOPPED`] stops charging,
/// [`CHARGE_RATE_UNLIMITED`] restores it.
pub const PROP_CHARGE_RATE: &str = "ChargeRate";
/// Maximum charge level as a percentage.
pub const PROP_CHARGE_CAPACITY: &str = "ChargeCapacity";

pub const CHARGE_RATE_STOPPED: i32 = 0;
pub const CHARGE_RATE_UNLIMITED: i32 = -1;

/// A typed value writable as a registry property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i32),
}

/// Sets named properties on the battery service.
///
/// Implemented by [`crate::io::SmartBattery`] on macOS; tests script their
/// own implementations.
pub trait PropertySetter {
    fn set_property(&self, name: &str, value: PropertyValue) -> Result<(), Error>;
}
