use crate::Archive;
use std::fmt;
use std::str::FromStr;

/// Byte order in which a guid's raw bytes appear in its textual form. Unreal
/// stores a guid as four little endian u32 words but prints them big endian.
const GUID_TEXT_ORDER: [usize; 16] = [3, 2, 1, 0, 7, 6, 5, 4, 11, 10, 9, 8, 15, 14, 13, 12];

/// A 128 bit Unreal `FGuid` stored exactly as it appears on disk
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Guid([u8; 16]);

impl Guid {
    #[inline]
    pub const fn from_bytes(data: [u8; 16]) -> Self {
        Guid(data)
    }

    /// The all zero guid
    #[inline]
    pub const fn nil() -> Self {
        Guid([0; 16])
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        self.0 == [0; 16]
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &idx) in GUID_TEXT_ORDER.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                f.write_str("-")?;
            }
            write!(f, "{:02x}", self.0[idx])?;
        }
        Ok(())
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({})", self)
    }
}

/// The textual guid was not 32 hex digits (hyphens are ignored)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseGuidError;

impl fmt::Display for ParseGuidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid guid: expected 32 hex digits")
    }
}

impl std::error::Error for ParseGuidError {}

impl FromStr for Guid {
    type Err = ParseGuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut digits = s.bytes().filter(|&b| b != b'-');
        let mut out = [0u8; 16];
        for &idx in GUID_TEXT_ORDER.iter() {
            let hi = digits.next().and_then(hex_value).ok_or(ParseGuidError)?;
            let lo = digits.next().and_then(hex_value).ok_or(ParseGuidError)?;
            out[idx] = (hi << 4) | lo;
        }

        if digits.next().is_some() {
            return Err(ParseGuidError);
        }

        Ok(Guid(out))
    }
}

#[inline]
fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Guid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Guid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// `FVector` with double precision components
#[derive(Archive, Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector { x, y, z }
    }
}

/// `FQuat` with double precision components
#[derive(Archive, Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quat {
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Quat { x, y, z, w }
    }

    pub const fn identity() -> Self {
        Quat::new(0.0, 0.0, 0.0, 1.0)
    }
}

/// `FTransform` as serialized by `<<`: rotation, translation, then scale
#[derive(Archive, Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub rotation: Quat,
    pub translation: Vector,
    pub scale3d: Vector,
}

/// `FLinearColor`
#[derive(Archive, Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}
