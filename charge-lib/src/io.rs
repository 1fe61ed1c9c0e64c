//! IOKit-backed implementations of the transport and registry seams.

use std::borrow::Cow;
use std::ffi::{CStr, c_void};

use libc::{KERN_SUCCESS, kern_return_t, mach_error_string};
use mach2::traps::mach_task_self;
use objc2_core_foundation::{CFBoolean, CFNumber, CFString};
use objc2_io_kit::{
    IOConnectCallStructMethod, IOIteratorNext, IOMainPort, IOObjectRelease,
    IORegistryEntrySetCFProperty, IOServiceClose, IOServiceGetMatchingServices,
    IOServiceMatching, IOServiceOpen, io_connect_t, io_object_t,
};
use tracing::debug;

use crate::{
    error::Error,
    protocol::Transport,
    registry::{PropertySetter, PropertyValue},
    structs::{KERNEL_INDEX_SMC, SmcParamStruct},
};

const SMC_SERVICE_CLASS: &CStr = c"AppleSMC";
const BATTERY_SERVICE_CLASS: &CStr = c"AppleSmartBattery";

/// Renders a kernel status code as its mach error string.
pub fn err_str(status: kern_return_t) -> Cow<'static, str> {
    unsafe { CStr::from_ptr(mach_error_string(status)).to_string_lossy() }
}

/// Returns the first registry service matching `class`, or 0 if none exists.
///
/// The caller owns the returned object and must release it.
fn first_matching_service(class: &CStr) -> Result<io_object_t, kern_return_t> {
    unsafe {
        let mut main_port = 0;
        let res = IOMainPort(0, &raw mut main_port);
        if res != KERN_SUCCESS {
            return Err(res);
        }
        let matching_dict = IOServiceMatching(class.as_ptr()).and_then(|d| d.downcast().ok());
        let mut iterator = 0;
        let res = IOServiceGetMatchingServices(main_port, matching_dict, &raw mut iterator);
        if res != KERN_SUCCESS {
            return Err(res);
        }
        let device = IOIteratorNext(iterator);
        IOObjectRelease(iterator);
        Ok(device)
    }
}

/// An open connection to the SMC user client.
///
/// The connection is a privileged kernel resource: open it once per session,
/// pass it by reference to every operation, and release it exactly once
/// (dropping does). It is not guarded against concurrent use from multiple
/// threads.
pub struct SmcConnection {
    conn: io_connect_t,
}

impl SmcConnection {
    /// Locates the SMC service and opens a connection to it.
    pub fn open() -> Result<Self, Error> {
        let device = first_matching_service(SMC_SERVICE_CLASS)
            .map_err(|status| Error::ConnectFailed { status })?;
        if device == 0 {
            return Err(Error::ServiceNotFound { class: "AppleSMC" });
        }
        unsafe {
            let mut conn = 0;
            let res = IOServiceOpen(device, mach_task_self(), 0, &raw mut conn);
            IOObjectRelease(device);
            if res != KERN_SUCCESS {
                debug!(status = res, "IOServiceOpen rejected: {}", err_str(res));
                return Err(Error::ConnectFailed { status: res });
            }
            Ok(Self { conn })
        }
    }

    /// Releases the connection. Equivalent to dropping; releasing an
    /// already-closed handle is a no-op.
    pub fn close(self) {}
}

impl Drop for SmcConnection {
    fn drop(&mut self) {
        if self.conn != 0 {
            IOServiceClose(self.conn);
            self.conn = 0;
        }
    }
}

impl Transport for SmcConnection {
    fn call(&self, input: &SmcParamStruct, output: &mut SmcParamStruct) -> Result<(), Error> {
        unsafe {
            let mut output_cnt = size_of::<SmcParamStruct>();
            let res = IOConnectCallStructMethod(
                self.conn,
                KERNEL_INDEX_SMC,
                input as *const _ as *const c_void,
                size_of::<SmcParamStruct>(),
                output as *mut _ as *mut c_void,
                &raw mut output_cnt,
            );
            if res == KERN_SUCCESS {
                Ok(())
            } else {
                Err(Error::TransportError { status: res })
            }
        }
    }
}

/// Sets a named property on the first service of `class`.
///
/// The service is discovered fresh and released before returning; there is
/// no read-back of the written value.
pub fn set_service_property(
    class: &'static CStr,
    name: &str,
    value: PropertyValue,
) -> Result<(), Error> {
    let device = first_matching_service(class)
        .map_err(|status| Error::PropertySetFailed { status })?;
    if device == 0 {
        return Err(Error::ServiceNotFound {
            class: class.to_str().unwrap_or("unknown"),
        });
    }
    let cf_name = CFString::from_str(name);
    let res = unsafe {
        let res = match value {
            PropertyValue::Bool(b) => {
                IORegistryEntrySetCFProperty(device, Some(&cf_name), Some(&CFBoolean::new(b)))
            }
            PropertyValue::Int(v) => {
                IORegistryEntrySetCFProperty(device, Some(&cf_name), Some(&CFNumber::new_i32(v)))
            }
        };
        IOObjectRelease(device);
        res
    };
    if res != KERN_SUCCESS {
        debug!(status = res, name, "property write rejected: {}", err_str(res));
        return Err(Error::PropertySetFailed { status: res });
    }
    Ok(())
}

/// The battery management service, rediscovered on every write.
pub struct SmartBattery;

impl PropertySetter for SmartBattery {
    fn set_property(&self, name: &str, value: PropertyValue) -> Result<(), Error> {
        set_service_property(BATTERY_SERVICE_CLASS, name, value)
    }
}
