//! The two-phase key access protocol.
//!
//! Every read and write first queries the key's metadata with a
//! read-keyinfo command, then issues the data command sized accordingly.
//! Both phases go through [`Transport::call`], the single choke point to the
//! controller; nothing here retries.

use std::cmp;

use tracing::warn;

use crate::{
    error::Error,
    key::SmcKey,
    structs::{
        SMC_BYTES_LEN, SMC_CMD_READ_BYTES, SMC_CMD_READ_KEYINFO, SMC_CMD_WRITE_BYTES,
        SMC_RESULT_OK, SmcBytes, SmcKeyInfo, SmcParamStruct, SmcValue,
    },
};

/// One exchange with the SMC: a fixed-size request for a same-sized response.
///
/// Implemented by [`crate::io::SmcConnection`] on macOS; tests script their
/// own implementations. The transport does not serialize concurrent use of
/// one connection, callers wanting parallelism must do that themselves.
pub trait Transport {
    fn call(&self, input: &SmcParamStruct, output: &mut SmcParamStruct) -> Result<(), Error>;
}

/// Key reads and writes, available on every [`Transport`].
pub trait KeyAccess {
    /// Queries a key's declared size, type tag, and attributes.
    fn key_info(&self, key: SmcKey) -> Result<SmcKeyInfo, Error>;

    /// Reads a key's current value.
    ///
    /// A declared size of 0 is a valid "no data" result, not an error. A
    /// declared size above [`SMC_BYTES_LEN`] cannot be represented by the
    /// fixed payload and is clamped.
    fn read_key(&self, key: SmcKey) -> Result<SmcValue, Error>;

    /// Writes a key's value bytes.
    ///
    /// `value.len()` must equal the size the controller declares for the key
    /// at the time of the call; on mismatch nothing is written.
    fn write_key(&self, key: SmcKey, value: &[u8]) -> Result<(), Error>;
}

impl<T: Transport + ?Sized> KeyAccess for T {
    fn key_info(&self, key: SmcKey) -> Result<SmcKeyInfo, Error> {
        let input = SmcParamStruct {
            key: key.raw(),
            data8: SMC_CMD_READ_KEYINFO,
            ..Default::default()
        };
        let mut output = SmcParamStruct::default();
        self.call(&input, &mut output)
            .map_err(|_| Error::KeyInfoUnavailable { key })?;
        if output.result != SMC_RESULT_OK {
            return Err(Error::KeyInfoUnavailable { key });
        }
        Ok(output.key_info)
    }

    fn read_key(&self, key: SmcKey) -> Result<SmcValue, Error> {
        let info = self.key_info(key)?;

        let mut input = SmcParamStruct {
            key: key.raw(),
            data8: SMC_CMD_READ_BYTES,
            ..Default::default()
        };
        input.key_info.data_size = info.data_size;
        let mut output = SmcParamStruct::default();
        self.call(&input, &mut output)?;

        if info.data_size as usize > SMC_BYTES_LEN {
            warn!(
                %key,
                declared = info.data_size,
                "declared size exceeds the SMC payload, clamping"
            );
        }
        let len = cmp::min(info.data_size as usize, SMC_BYTES_LEN);
        let mut bytes = SmcBytes::default();
        bytes[..len].copy_from_slice(&output.bytes[..len]);
        Ok(SmcValue {
            key,
            data_size: len as u32,
            data_type: info.data_type.to_be_bytes(),
            bytes,
        })
    }

    fn write_key(&self, key: SmcKey, value: &[u8]) -> Result<(), Error> {
        let info = self.key_info(key)?;
        if info.data_size as usize != value.len() {
            return Err(Error::SizeMismatch {
                expected: info.data_size,
                actual: value.len() as u32,
            });
        }

        let mut input = SmcParamStruct {
            key: key.raw(),
            data8: SMC_CMD_WRITE_BYTES,
            ..Default::default()
        };
        input.key_info.data_size = info.data_size;
        let len = cmp::min(value.len(), SMC_BYTES_LEN);
        input.bytes[..len].copy_from_slice(&value[..len]);
        let mut output = SmcParamStruct::default();
        self.call(&input, &mut output).map_err(|err| match err {
            Error::TransportError { status } => Error::WriteFailed { key, status },
            other => other,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    // SMC result byte for "key not found".
    const SMC_RESULT_KEY_NOT_FOUND: u8 = 132;

    /// Scripted controller: a key table plus optional per-command failures,
    /// recording every request it receives.
    #[derive(Default)]
    struct StubController {
        keys: RefCell<HashMap<u32, (SmcKeyInfo, SmcBytes)>>,
        calls: RefCell<Vec<SmcParamStruct>>,
        fail_command: Option<(u8, i32)>,
    }

    impl StubController {
        fn with_key(self, name: &str, declared_size: u32, value: &[u8]) -> Self {
            let mut bytes = SmcBytes::default();
            bytes[..value.len()].copy_from_slice(value);
            let info = SmcKeyInfo {
                data_size: declared_size,
                data_type: crate::key::encode_key("ui8 "),
                data_attributes: 0,
            };
            self.keys
                .borrow_mut()
                .insert(crate::key::encode_key(name), (info, bytes));
            self
        }

        fn calls_with_command(&self, command: u8) -> Vec<SmcParamStruct> {
            self.calls
                .borrow()
                .iter()
                .filter(|c| c.data8 == command)
                .copied()
                .collect()
        }
    }

    impl Transport for StubController {
        fn call(&self, input: &SmcParamStruct, output: &mut SmcParamStruct) -> Result<(), Error> {
            self.calls.borrow_mut().push(*input);
            if let Some((command, status)) = self.fail_command {
                if input.data8 == command {
                    return Err(Error::TransportError { status });
                }
            }
            let mut keys = self.keys.borrow_mut();
            let Some((info, bytes)) = keys.get_mut(&input.key) else {
                output.result = SMC_RESULT_KEY_NOT_FOUND;
                return Ok(());
            };
            match input.data8 {
                SMC_CMD_READ_KEYINFO => output.key_info = *info,
                SMC_CMD_READ_BYTES => output.bytes = *bytes,
                SMC_CMD_WRITE_BYTES => {
                    let len = cmp::min(input.key_info.data_size as usize, SMC_BYTES_LEN);
                    bytes[..len].copy_from_slice(&input.bytes[..len]);
                }
                _ => {}
            }
            output.result = SMC_RESULT_OK;
            Ok(())
        }
    }

    #[test]
    fn write_then_read_returns_written_bytes() {
        let smc = StubController::default().with_key("MSDW", 2, &[0, 0]);
        let key = SmcKey::new("MSDW");
        smc.write_key(key, &[0xAB, 0xCD]).unwrap();
        let val = smc.read_key(key).unwrap();
        assert_eq!(val.valid_bytes(), &[0xAB, 0xCD]);
    }

    #[test]
    fn size_mismatch_fails_without_writing() {
        let smc = StubController::default().with_key("CH0B", 1, &[0]);
        let err = smc.write_key(SmcKey::new("CH0B"), &[1, 2]).unwrap_err();
        assert_eq!(
            err,
            Error::SizeMismatch {
                expected: 1,
                actual: 2
            }
        );
        assert!(smc.calls_with_command(SMC_CMD_WRITE_BYTES).is_empty());
        assert_eq!(smc.calls_with_command(SMC_CMD_READ_KEYINFO).len(), 1);
    }

    #[test]
    fn zero_size_key_reads_as_empty_success() {
        let smc = StubController::default().with_key("CHWA", 0, &[]);
        let val = smc.read_key(SmcKey::new("CHWA")).unwrap();
        assert_eq!(val.data_size, 0);
        assert!(val.valid_bytes().is_empty());
    }

    #[test]
    fn oversized_declared_size_is_clamped() {
        let smc = StubController::default().with_key("BIGK", 64, &[0xFF; 32]);
        let val = smc.read_key(SmcKey::new("BIGK")).unwrap();
        assert_eq!(val.data_size, 32);
        assert_eq!(val.valid_bytes().len(), SMC_BYTES_LEN);
    }

    #[test]
    fn missing_key_aborts_with_key_info_unavailable() {
        let smc = StubController::default();
        let key = SmcKey::new("NOPE");
        assert_eq!(
            smc.read_key(key).unwrap_err(),
            Error::KeyInfoUnavailable { key }
        );
        assert_eq!(
            smc.write_key(key, &[0]).unwrap_err(),
            Error::KeyInfoUnavailable { key }
        );
    }

    #[test]
    fn transport_failure_in_data_phase_surfaces_status() {
        let mut smc = StubController::default().with_key("CH0B", 1, &[0]);
        smc.fail_command = Some((SMC_CMD_READ_BYTES, -1));
        assert_eq!(
            smc.read_key(SmcKey::new("CH0B")).unwrap_err(),
            Error::TransportError { status: -1 }
        );
    }

    #[test]
    fn rejected_write_reports_key_and_status() {
        let mut smc = StubController::default().with_key("CH0I", 1, &[0]);
        smc.fail_command = Some((SMC_CMD_WRITE_BYTES, -536_870_206));
        let key = SmcKey::new("CH0I");
        assert_eq!(
            smc.write_key(key, &[1]).unwrap_err(),
            Error::WriteFailed {
                key,
                status: -536_870_206
            }
        );
    }

    #[test]
    fn charge_stop_key_scenario() {
        let smc = StubController::default().with_key("CH0B", 1, &[0x00]);
        let key = SmcKey::new("CH0B");

        let val = smc.read_key(key).unwrap();
        assert_eq!(val.data_size, 1);
        assert_eq!(val.valid_bytes(), &[0x00]);

        smc.write_key(key, &[0x02]).unwrap();
        let writes = smc.calls_with_command(SMC_CMD_WRITE_BYTES);
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].key, key.raw());
        assert_eq!(writes[0].key_info.data_size, 1);
        let mut expected = SmcBytes::default();
        expected[0] = 0x02;
        assert_eq!(writes[0].bytes, expected);
    }
}
