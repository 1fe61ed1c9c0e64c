//! The fixed-layout structures exchanged with the AppleSMC user client.
//!
//! Field order, sizes, and padding are an external ABI contract with the
//! kernel driver, which validates the structure size on every call. The
//! version and power-limit sub-structs are unused by this crate but must stay
//! in place.

use std::ffi::c_char;

use crate::key::SmcKey;

/// Function index of the SMC key interface within the AppleSMC user client.
pub const KERNEL_INDEX_SMC: u32 = 2;

/// Command byte: read a key's value bytes.
pub const SMC_CMD_READ_BYTES: u8 = 5;
/// Command byte: write a key's value bytes.
pub const SMC_CMD_WRITE_BYTES: u8 = 6;
/// Command byte: query a key's size, type, and attributes.
pub const SMC_CMD_READ_KEYINFO: u8 = 9;

/// Result byte of a successful SMC command.
pub const SMC_RESULT_OK: u8 = 0;

/// Maximum size in bytes for SMC data.
pub const SMC_BYTES_LEN: usize = 32;

/// Byte array type for SMC data.
pub type SmcBytes = [u8; SMC_BYTES_LEN];

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct SmcVers {
    pub major: c_char,
    pub minor: c_char,
    pub build: c_char,
    pub reserved: [c_char; 1],
    pub release: u16,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct SmcPLimitData {
    pub version: u16,
    pub length: u16,
    pub cpu_plimit: u32,
    pub gpu_plimit: u32,
    pub mem_plimit: u32,
}

/// Metadata describing a SMC key's value, without the value itself.
///
/// Fetched fresh before every read or write; the controller is the source of
/// truth and declared sizes can change between calls.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct SmcKeyInfo {
    pub data_size: u32,
    /// Four-character type tag, packed like a key name; render it with
    /// [`crate::key::decode_key`].
    pub data_type: u32,
    pub data_attributes: u8,
}

/// The request/response structure of the SMC key interface.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct SmcParamStruct {
    pub key: u32,
    pub vers: SmcVers,
    pub plimit_data: SmcPLimitData,
    pub key_info: SmcKeyInfo,
    pub result: u8,
    pub status: u8,
    /// Command byte selecting the operation.
    pub data8: u8,
    pub data32: u32,
    pub bytes: SmcBytes,
}

/// A key's value as returned by a read: name, type tag, and the valid bytes.
#[derive(Clone, Copy, Debug)]
pub struct SmcValue {
    pub key: SmcKey,
    /// Number of meaningful bytes in `bytes`, already clamped to
    /// [`SMC_BYTES_LEN`].
    pub data_size: u32,
    pub data_type: [u8; 4],
    pub bytes: SmcBytes,
}
