use std::fmt;
use std::num::NonZeroU16;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A TCP listen port. Always in `1..=65535`.
///
/// Parsed from the string form the runtime environment hands over
/// (`PORT=9001`), so every value that reaches the server start call has
/// already been checked.
///
/// # Examples
///
/// ```
/// use shipyard_core::Port;
///
/// let port: Port = "9001".parse().unwrap();
/// assert_eq!(port.get(), 9001);
/// assert!("0".parse::<Port>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Port(NonZeroU16);

impl Port {
    /// Listen port used when the environment does not provide one.
    pub const DEFAULT: Port = Port(NonZeroU16::new(8000).unwrap());

    /// Returns `None` for zero.
    pub const fn new(value: u16) -> Option<Self> {
        match NonZeroU16::new(value) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    pub const fn get(self) -> u16 {
        self.0.get()
    }
}

impl Default for Port {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port is empty")]
    Empty,
    #[error("port must be a positive integer")]
    NotANumber,
    #[error("port must be greater than zero")]
    Zero,
    #[error("port must be at most 65535")]
    OutOfRange,
}

impl FromStr for Port {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PortError::NotANumber);
        }
        // Digits only: the sole parse failure left is overflow.
        let value: u64 = s.parse().map_err(|_| PortError::OutOfRange)?;
        let value = u16::try_from(value).map_err(|_| PortError::OutOfRange)?;
        Port::new(value).ok_or(PortError::Zero)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.get()
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Port::new(value).ok_or(PortError::Zero)
    }
}

impl Serialize for Port {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.get())
    }
}

impl<'de> Deserialize<'de> for Port {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u16::deserialize(deserializer)?;
        Port::try_from(value).map_err(serde::de::Error::custom)
    }
}
