//! Protocol Module
//!
//! Defines the fixed-size frames exchanged between client and server.
//!
//! Every datagram carries exactly one frame, sealed into a 1024-byte
//! envelope by [`crate::crypto::Cipher`].
//!
//! ### Commands
//! - 0x00: SET     - key + value, honours OVERWRITE / RETURN_OLD
//! - 0x01: GET     - key
//! - 0x02: DELETE  - key
//! - 0x03: EXISTS  - key
//!
//! ### Flags
//! - bit 0: OVERWRITE
//! - bit 1: RETURN_OLD
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: NOT_FOUND
//! - 0x02: ERROR

mod command;
mod response;
mod codec;

pub use command::{CommandType, Flags, Request};
pub use response::{Response, Status};
pub use codec::{
    decode_request, decode_response, encode_request, encode_response, COMMAND_SIZE, FLAGS_SIZE,
    FRAME_SIZE, KEY_FIELD_SIZE, RESPONSE_VALUE_SIZE, STATUS_SIZE, VALUE_FIELD_SIZE,
};

/// AES-GCM nonce prepended to every envelope
pub const NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag appended by the seal
pub const TAG_SIZE: usize = 16;

/// Size of every datagram on the wire
pub const ENVELOPE_SIZE: usize = NONCE_SIZE + FRAME_SIZE + TAG_SIZE;

/// Default UDP port
pub const DEFAULT_PORT: u16 = 4040;

const _: () = assert!(FRAME_SIZE == 996);
const _: () = assert!(ENVELOPE_SIZE == 1024);
