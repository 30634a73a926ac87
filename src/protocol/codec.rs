//! Protocol codec
//!
//! Encoding and decoding functions for the fixed-size frames.
//!
//! ## Wire Format
//!
//! ### Request Frame (996 bytes)
//! ```text
//! ┌──────────┬───────────┬────────────────┬──────────────────────┐
//! │ Cmd (1)  │ Flags (4) │   Key (128)    │     Value (863)      │
//! └──────────┴───────────┴────────────────┴──────────────────────┘
//! ```
//!
//! ### Response Frame (996 bytes)
//! ```text
//! ┌──────────┬──────────────────────────────────────────────────┐
//! │Status(1) │                   Value (995)                    │
//! └──────────┴──────────────────────────────────────────────────┘
//! ```
//!
//! Flags are little-endian. Key and value fields are right-padded with zero
//! bytes; trailing zeros are stripped on decode, so a logical key or value
//! cannot itself end in a zero byte.

use bytes::{Buf, BufMut};

use super::{Flags, Request, Response, Status};
use crate::error::{Result, SealError};

/// Command byte
pub const COMMAND_SIZE: usize = 1;

/// Flags bitset
pub const FLAGS_SIZE: usize = 4;

/// Fixed width of the key field
pub const KEY_FIELD_SIZE: usize = 128;

/// Fixed width of the request value field
pub const VALUE_FIELD_SIZE: usize = 863;

/// Plaintext size of every frame, in both directions
pub const FRAME_SIZE: usize = COMMAND_SIZE + FLAGS_SIZE + KEY_FIELD_SIZE + VALUE_FIELD_SIZE;

/// Status byte
pub const STATUS_SIZE: usize = 1;

/// Fixed width of the response value field
pub const RESPONSE_VALUE_SIZE: usize = FRAME_SIZE - STATUS_SIZE;

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to a 996-byte frame
///
/// Oversized keys or values are rejected before anything is allocated.
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    if request.key.len() > KEY_FIELD_SIZE {
        return Err(SealError::KeyTooLong {
            len: request.key.len(),
            max: KEY_FIELD_SIZE,
        });
    }
    if request.value.len() > VALUE_FIELD_SIZE {
        return Err(SealError::ValueTooLong {
            len: request.value.len(),
            max: VALUE_FIELD_SIZE,
        });
    }

    let mut frame = Vec::with_capacity(FRAME_SIZE);
    frame.put_u8(request.opcode);
    frame.put_u32_le(request.flags.bits());
    put_padded(&mut frame, &request.key, KEY_FIELD_SIZE);
    put_padded(&mut frame, &request.value, VALUE_FIELD_SIZE);

    debug_assert_eq!(frame.len(), FRAME_SIZE);
    Ok(frame)
}

/// Decode a request frame
///
/// The command byte is not validated here; see [`Request::command`].
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    check_frame_size(bytes)?;

    let mut buf = bytes;
    let opcode = buf.get_u8();
    let flags = Flags::from_bits(buf.get_u32_le());

    let (key_field, value_field) = buf.split_at(KEY_FIELD_SIZE);

    Ok(Request {
        opcode,
        flags,
        key: trim_padding(key_field),
        value: trim_padding(value_field),
    })
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to a 996-byte frame
///
/// Values wider than the field are cut to fit; the store never holds
/// anything longer than a request value, so only long error messages
/// can hit this.
pub fn encode_response(response: &Response) -> Vec<u8> {
    let value = &response.value[..response.value.len().min(RESPONSE_VALUE_SIZE)];

    let mut frame = Vec::with_capacity(FRAME_SIZE);
    frame.put_u8(response.status as u8);
    put_padded(&mut frame, value, RESPONSE_VALUE_SIZE);

    frame
}

/// Decode a response frame
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    check_frame_size(bytes)?;

    let mut buf = bytes;
    let status_byte = buf.get_u8();
    let status = Status::from_u8(status_byte).ok_or(SealError::UnknownStatus(status_byte))?;

    Ok(Response {
        status,
        value: trim_padding(buf),
    })
}

// =============================================================================
// Helpers
// =============================================================================

fn check_frame_size(bytes: &[u8]) -> Result<()> {
    if bytes.len() != FRAME_SIZE {
        return Err(SealError::InvalidFrameSize {
            expected: FRAME_SIZE,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Write `data` then zero-fill up to `width`
fn put_padded(frame: &mut Vec<u8>, data: &[u8], width: usize) {
    frame.put_slice(data);
    frame.put_bytes(0, width - data.len());
}

/// Strip the zero padding from a fixed-width field
fn trim_padding(field: &[u8]) -> Vec<u8> {
    let end = field.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    field[..end].to_vec()
}
