//! Command definitions
//!
//! Represents requests from clients.

use std::fmt;
use std::ops::BitOr;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Set = 0x00,
    Get = 0x01,
    Delete = 0x02,
    Exists = 0x03,
}

impl CommandType {
    /// Map a wire opcode to a command, if known
    pub fn from_u8(opcode: u8) -> Option<Self> {
        match opcode {
            0x00 => Some(CommandType::Set),
            0x01 => Some(CommandType::Get),
            0x02 => Some(CommandType::Delete),
            0x03 => Some(CommandType::Exists),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CommandType::Set => "set",
            CommandType::Get => "get",
            CommandType::Delete => "delete",
            CommandType::Exists => "exists",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Request flag bits, carried little-endian on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags(u32);

impl Flags {
    /// Replace an existing value on SET
    pub const OVERWRITE: Flags = Flags(1 << 0);

    /// Return the previous value on SET
    pub const RETURN_OLD: Flags = Flags(1 << 1);

    pub const fn empty() -> Self {
        Flags(0)
    }

    /// Keep every bit, including ones this version does not interpret
    pub const fn from_bits(bits: u32) -> Self {
        Flags(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Build from the two SET options
    pub fn from_options(overwrite: bool, old: bool) -> Self {
        let mut flags = Flags::empty();
        if overwrite {
            flags = flags | Flags::OVERWRITE;
        }
        if old {
            flags = flags | Flags::RETURN_OLD;
        }
        flags
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

/// A request frame's logical contents
///
/// The opcode is kept raw so that frames carrying an unknown command still
/// decode and can be answered with an ERROR status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Wire command byte
    pub opcode: u8,

    pub flags: Flags,

    /// Logical key (padding removed)
    pub key: Vec<u8>,

    /// Logical value (padding removed)
    pub value: Vec<u8>,
}

impl Request {
    pub fn new(command: CommandType, flags: Flags, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            opcode: command as u8,
            flags,
            key: key.into(),
            value: value.into(),
        }
    }

    /// SET request
    pub fn set(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>, overwrite: bool, old: bool) -> Self {
        Self::new(CommandType::Set, Flags::from_options(overwrite, old), key, value)
    }

    /// GET request
    pub fn get(key: impl Into<Vec<u8>>) -> Self {
        Self::new(CommandType::Get, Flags::empty(), key, Vec::new())
    }

    /// DELETE request
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        Self::new(CommandType::Delete, Flags::empty(), key, Vec::new())
    }

    /// EXISTS request
    pub fn exists(key: impl Into<Vec<u8>>) -> Self {
        Self::new(CommandType::Exists, Flags::empty(), key, Vec::new())
    }

    /// Get the command type (None for an unrecognized opcode)
    pub fn command(&self) -> Option<CommandType> {
        CommandType::from_u8(self.opcode)
    }

    pub fn overwrite(&self) -> bool {
        self.flags.contains(Flags::OVERWRITE)
    }

    pub fn return_old(&self) -> bool {
        self.flags.contains(Flags::RETURN_OLD)
    }
}
