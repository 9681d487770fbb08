//! SimConnect wire constants and dispatch message parsing.
//!
//! `SimConnect_GetNextDispatch` hands back a packed little-endian buffer
//! whose third `DWORD` says which layout follows. [`parse_dispatch`] checks
//! the buffer is long enough for that layout before reading any field, so a
//! short or misconfigured message turns into a [`DecodeError`] instead of a
//! read past the end.
//!
//! | Kind          | Layout                                          | Bytes |
//! |---------------|-------------------------------------------------|-------|
//! | header        | `dwSize, dwVersion, dwID`                       | 12    |
//! | `Exception`   | header + `dwException, dwSendID, dwIndex`       | 24    |
//! | `Open`        | header + `szApplicationName[256]` + 10 `DWORD`s | 308   |
//! | `Quit`        | header                                          | 12    |
//! | `ObjectData`  | header + 7 `DWORD`s + one `f64`                 | 48    |

use thiserror::Error;

/// `SIMCONNECT_RECV_ID_NULL`
pub const RECV_ID_NULL: u32 = 0;
/// `SIMCONNECT_RECV_ID_EXCEPTION`
pub const RECV_ID_EXCEPTION: u32 = 1;
/// `SIMCONNECT_RECV_ID_OPEN`
pub const RECV_ID_OPEN: u32 = 2;
/// `SIMCONNECT_RECV_ID_QUIT`
pub const RECV_ID_QUIT: u32 = 3;
/// `SIMCONNECT_RECV_ID_SIMOBJECT_DATA_BYTYPE`
pub const RECV_ID_SIMOBJECT_DATA_BYTYPE: u32 = 9;

/// Size of `SIMCONNECT_RECV`.
pub const HEADER_SIZE: usize = 12;
/// Size of `SIMCONNECT_RECV_EXCEPTION`.
pub const EXCEPTION_SIZE: usize = HEADER_SIZE + 12;
/// Length of `szApplicationName` in `SIMCONNECT_RECV_OPEN`.
pub const APPLICATION_NAME_LEN: usize = 256;
/// Size of `SIMCONNECT_RECV_OPEN`: four application version fields, four
/// SimConnect version fields, `dwReserved1` and `dwReserved2`.
pub const OPEN_SIZE: usize = HEADER_SIZE + APPLICATION_NAME_LEN + 10 * 4;
/// Offset of `dwData` in `SIMCONNECT_RECV_SIMOBJECT_DATA`.
pub const OBJECT_DATA_OFFSET: usize = HEADER_SIZE + 7 * 4;
/// Size of a `SIMCONNECT_RECV_SIMOBJECT_DATA` carrying a single `f64`.
pub const OBJECT_DATA_SIZE: usize = OBJECT_DATA_OFFSET + 8;

/// Bytes shown when logging a message we do not understand.
const RAW_PREVIEW_LEN: usize = 32;

/// `SIMCONNECT_DATATYPE` subset used here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum DataType {
    Int32 = 1,
    Int64 = 2,
    Float32 = 3,
    Float64 = 4,
}

impl DataType {
    /// Size in bytes of one value of this type.
    pub const fn size(self) -> usize {
        match self {
            DataType::Int32 | DataType::Float32 => 4,
            DataType::Int64 | DataType::Float64 => 8,
        }
    }
}

/// `SIMCONNECT_SIMOBJECT_TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SimObjectType {
    /// The user's own aircraft.
    User = 0,
    All = 1,
    Aircraft = 2,
}

/// `SIMCONNECT_DATA_SET_FLAG`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum DataSetFlag {
    Default = 0,
    Tagged = 1,
}

/// Payload of an `Open` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenInfo {
    pub application_name: String,
    pub application_version: (u32, u32),
    pub simconnect_version: (u32, u32),
}

/// Payload of an `Exception` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionInfo {
    /// `SIMCONNECT_EXCEPTION` code.
    pub code: u32,
    /// Send id of the call that caused it.
    pub send_id: u32,
    /// Parameter index at fault, if known.
    pub index: u32,
}

/// One sampled value of a data definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectData {
    pub request_id: u32,
    pub object_id: u32,
    pub define_id: u32,
    pub value: f64,
}

/// A decoded message from the simulator.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchMessage {
    /// The connection is confirmed.
    Open(OpenInfo),
    /// The simulator is shutting down.
    Quit,
    /// The simulator rejected an earlier call.
    Exception(ExceptionInfo),
    /// A requested sample.
    ObjectData(ObjectData),
    /// Any other message kind; ignored by the control loop.
    Unknown { id: u32, raw: Vec<u8> },
}

impl DispatchMessage {
    /// Short name of the message kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchMessage::Open(_) => "Open",
            DispatchMessage::Quit => "Quit",
            DispatchMessage::Exception(_) => "Exception",
            DispatchMessage::ObjectData(_) => "ObjectData",
            DispatchMessage::Unknown { .. } => "Unknown",
        }
    }

    /// At most the first 32 raw bytes of an unknown message.
    pub fn raw_preview(&self) -> Option<&[u8]> {
        match self {
            DispatchMessage::Unknown { raw, .. } => Some(&raw[..raw.len().min(RAW_PREVIEW_LEN)]),
            _ => None,
        }
    }
}

/// Errors decoding a dispatch buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Not even a `SIMCONNECT_RECV` header.
    #[error("dispatch message too short for header: {actual} bytes")]
    TruncatedHeader { actual: usize },

    /// Shorter than the layout its kind tag announces.
    #[error("{kind} message truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Decode one dispatch buffer.
pub fn parse_dispatch(data: &[u8]) -> Result<DispatchMessage, DecodeError> {
    if data.len() < HEADER_SIZE {
        return Err(DecodeError::TruncatedHeader { actual: data.len() });
    }

    match read_u32(data, 8) {
        RECV_ID_OPEN => parse_open(data),
        RECV_ID_QUIT => Ok(DispatchMessage::Quit),
        RECV_ID_EXCEPTION => parse_exception(data),
        RECV_ID_SIMOBJECT_DATA_BYTYPE => parse_object_data(data),
        id => Ok(DispatchMessage::Unknown {
            id,
            raw: data.to_vec(),
        }),
    }
}

fn parse_open(data: &[u8]) -> Result<DispatchMessage, DecodeError> {
    ensure_len("Open", data, OPEN_SIZE)?;

    let name_bytes = &data[HEADER_SIZE..HEADER_SIZE + APPLICATION_NAME_LEN];
    let name_end = name_bytes
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(name_bytes.len());
    let application_name = String::from_utf8_lossy(&name_bytes[..name_end]).into_owned();

    let versions = HEADER_SIZE + APPLICATION_NAME_LEN;
    Ok(DispatchMessage::Open(OpenInfo {
        application_name,
        application_version: (read_u32(data, versions), read_u32(data, versions + 4)),
        simconnect_version: (
            read_u32(data, versions + 16),
            read_u32(data, versions + 20),
        ),
    }))
}

fn parse_exception(data: &[u8]) -> Result<DispatchMessage, DecodeError> {
    ensure_len("Exception", data, EXCEPTION_SIZE)?;

    Ok(DispatchMessage::Exception(ExceptionInfo {
        code: read_u32(data, HEADER_SIZE),
        send_id: read_u32(data, HEADER_SIZE + 4),
        index: read_u32(data, HEADER_SIZE + 8),
    }))
}

fn parse_object_data(data: &[u8]) -> Result<DispatchMessage, DecodeError> {
    ensure_len("ObjectData", data, OBJECT_DATA_SIZE)?;

    // dwRequestID, dwObjectID, dwDefineID, dwFlags, dwentrynumber, dwoutof, dwDefineCount
    Ok(DispatchMessage::ObjectData(ObjectData {
        request_id: read_u32(data, HEADER_SIZE),
        object_id: read_u32(data, HEADER_SIZE + 4),
        define_id: read_u32(data, HEADER_SIZE + 8),
        value: read_f64(data, OBJECT_DATA_OFFSET),
    }))
}

fn ensure_len(kind: &'static str, data: &[u8], expected: usize) -> Result<(), DecodeError> {
    if data.len() < expected {
        return Err(DecodeError::Truncated {
            kind,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Callers must have checked `offset + 4 <= data.len()`.
fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Callers must have checked `offset + 8 <= data.len()`.
fn read_f64(data: &[u8], offset: usize) -> f64 {
    let bytes: [u8; 8] = std::array::from_fn(|i| data[offset + i]);
    f64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(id: u32, size: usize) -> Vec<u8> {
        let mut buf = Vec::with_capacity(size);
        buf.extend_from_slice(&(size as u32).to_le_bytes());
        buf.extend_from_slice(&6u32.to_le_bytes());
        buf.extend_from_slice(&id.to_le_bytes());
        buf
    }

    fn object_data(request_id: u32, object_id: u32, define_id: u32, value: f64) -> Vec<u8> {
        let mut buf = header(RECV_ID_SIMOBJECT_DATA_BYTYPE, OBJECT_DATA_SIZE);
        for field in [request_id, object_id, define_id, 0, 1, 1, 1] {
            buf.extend_from_slice(&field.to_le_bytes());
        }
        buf.extend_from_slice(&value.to_le_bytes());
        buf
    }

    fn open(name: &str) -> Vec<u8> {
        let mut buf = header(RECV_ID_OPEN, OPEN_SIZE);
        let mut name_field = [0u8; APPLICATION_NAME_LEN];
        name_field[..name.len()].copy_from_slice(name.as_bytes());
        buf.extend_from_slice(&name_field);
        for field in [11u32, 0, 282174, 999, 11, 0, 62651, 3, 0, 0] {
            buf.extend_from_slice(&field.to_le_bytes());
        }
        buf
    }

    #[test]
    fn test_parse_object_data() {
        let msg = parse_dispatch(&object_data(7, 1, 0, 0.0)).unwrap();
        assert_eq!(
            msg,
            DispatchMessage::ObjectData(ObjectData {
                request_id: 7,
                object_id: 1,
                define_id: 0,
                value: 0.0,
            })
        );
    }

    #[test]
    fn test_parse_object_data_truncated() {
        let mut buf = object_data(7, 1, 1, 3.0);
        buf.truncate(44);
        assert_eq!(
            parse_dispatch(&buf),
            Err(DecodeError::Truncated {
                kind: "ObjectData",
                expected: OBJECT_DATA_SIZE,
                actual: 44,
            })
        );
    }

    #[test]
    fn test_parse_open_reads_name_and_versions() {
        let msg = parse_dispatch(&open("KittyHawk")).unwrap();
        match msg {
            DispatchMessage::Open(info) => {
                assert_eq!(info.application_name, "KittyHawk");
                assert_eq!(info.application_version, (11, 0));
                assert_eq!(info.simconnect_version, (11, 0));
            }
            other => panic!("expected Open, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_open_without_reserved_fields_is_truncated() {
        let mut buf = open("KittyHawk");
        assert_eq!(buf.len(), 308);
        buf.truncate(300);
        assert_eq!(
            parse_dispatch(&buf),
            Err(DecodeError::Truncated {
                kind: "Open",
                expected: 308,
                actual: 300,
            })
        );
    }

    #[test]
    fn test_parse_quit_is_header_only() {
        let msg = parse_dispatch(&header(RECV_ID_QUIT, HEADER_SIZE)).unwrap();
        assert_eq!(msg, DispatchMessage::Quit);
        assert_eq!(msg.kind(), "Quit");
    }

    #[test]
    fn test_parse_exception() {
        let mut buf = header(RECV_ID_EXCEPTION, EXCEPTION_SIZE);
        for field in [7u32, 42, 3] {
            buf.extend_from_slice(&field.to_le_bytes());
        }
        assert_eq!(
            parse_dispatch(&buf).unwrap(),
            DispatchMessage::Exception(ExceptionInfo {
                code: 7,
                send_id: 42,
                index: 3,
            })
        );
    }

    #[test]
    fn test_parse_exception_truncated() {
        let buf = header(RECV_ID_EXCEPTION, EXCEPTION_SIZE);
        assert!(matches!(
            parse_dispatch(&buf),
            Err(DecodeError::Truncated {
                kind: "Exception",
                ..
            })
        ));
    }

    #[test]
    fn test_parse_unknown_keeps_raw_bytes() {
        let mut buf = header(RECV_ID_NULL, HEADER_SIZE);
        buf.extend_from_slice(&[0xAB; 40]);
        let msg = parse_dispatch(&buf).unwrap();

        assert!(matches!(msg, DispatchMessage::Unknown { id: 0, .. }));
        assert_eq!(msg.raw_preview().map(<[u8]>::len), Some(32));
    }

    #[test]
    fn test_parse_short_header() {
        assert_eq!(
            parse_dispatch(&[1, 2, 3]),
            Err(DecodeError::TruncatedHeader { actual: 3 })
        );
    }

    #[test]
    fn test_data_type_size() {
        assert_eq!(DataType::Float64.size(), 8);
        assert_eq!(DataType::Int32.size(), 4);
    }
}
