//! Four-character video codec tags.

use std::fmt;
use std::str::FromStr;

/// A four-character codec code such as `MJPG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    /// Motion JPEG. The default recording codec.
    pub const MJPG: Self = Self(*b"MJPG");
    /// Uncompressed planar YUV 4:2:0.
    pub const I420: Self = Self(*b"I420");
    /// MPEG-4 part 2.
    pub const XVID: Self = Self(*b"XVID");

    /// The tag as raw bytes, in stream order.
    pub fn bytes(self) -> [u8; 4] {
        self.0
    }
}

impl Default for FourCc {
    fn default() -> Self {
        Self::MJPG
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Error returned when a string is not exactly four ASCII characters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid fourcc {0:?}: expected four ASCII characters")]
pub struct ParseFourCcError(String);

impl FromStr for FourCc {
    type Err = ParseFourCcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| ParseFourCcError(s.to_string()))?;
        if !bytes.iter().all(u8::is_ascii) {
            return Err(ParseFourCcError(s.to_string()));
        }
        Ok(Self(bytes))
    }
}
