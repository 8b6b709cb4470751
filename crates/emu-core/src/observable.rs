//! Read-only state queries by path.
//!
//! A machine answers dotted paths by stripping its own prefix and handing
//! the rest to the chip that owns it. On the NES, `cpu.pc` goes to the
//! 6502, `ppu.scanline` to the 2C02, `apu.pulse1.length` to the 2A03 and
//! `memory.$0300` to a bus peek.

use std::fmt;

/// A queried value. Integers print as zero-padded hex sized to the
/// register, except `U64`, which holds counters and prints in decimal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v:#04X}"),
            Value::U16(v) => write!(f, "{v:#06X}"),
            Value::U32(v) => write!(f, "{v:#010X}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from!(bool => Bool, u8 => U8, u16 => U16, u32 => U32, u64 => U64, String => String);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

/// A component whose state can be inspected between steps.
///
/// `query` must not change emulation state: a PPU answering `status` does
/// not clear vblank, and `memory.*` paths use [`crate::Bus::peek`].
pub trait Observable {
    /// Value at `path`, relative to this component, or `None` if the path
    /// is unknown.
    fn query(&self, path: &str) -> Option<Value>;

    /// Paths `query` understands. Placeholders in angle brackets stand for
    /// a family, e.g. `memory.<address>`.
    fn query_paths(&self) -> &'static [&'static str];
}

/// Parse an address written as `0x1234`, `$1234` or decimal `4660`.
#[must_use]
pub fn parse_address(text: &str) -> Option<u16> {
    if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix('$'))
    {
        u16::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_address_forms() {
        assert_eq!(parse_address("0x2002"), Some(0x2002));
        assert_eq!(parse_address("$C000"), Some(0xC000));
        assert_eq!(parse_address("16"), Some(16));
        assert_eq!(parse_address("0x10000"), None);
        assert_eq!(parse_address("pc"), None);
    }

    #[test]
    fn display_sizes_hex_to_register() {
        assert_eq!(Value::U8(0x0A).to_string(), "0x0A");
        assert_eq!(Value::U16(0xC000).to_string(), "0xC000");
        assert_eq!(Value::U64(27_395).to_string(), "27395");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from("NTSC").to_string(), "NTSC");
    }
}
