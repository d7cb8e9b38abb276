//! SNMP protocol version.

/// SNMP version carried in the message header.
///
/// Only the community-based versions are supported: SNMPv3 messages have a
/// different header structure and are rejected during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// SNMPv1 (RFC 1157), wire value 0.
    V1,
    /// SNMPv2c (RFC 1901), wire value 1.
    V2c,
}

impl Version {
    /// Create from the wire integer, returning `None` for unknown versions.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::V1),
            1 => Some(Self::V2c),
            _ => None,
        }
    }

    /// Get the wire integer value.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::V1 => 0,
            Self::V2c => 1,
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::V2c => write!(f, "v2c"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values_roundtrip() {
        for version in [Version::V1, Version::V2c] {
            assert_eq!(Version::from_i32(version.as_i32()), Some(version));
        }
    }

    #[test]
    fn test_unknown_versions_rejected() {
        // 3 is SNMPv3 (msgVersion), out of scope for this crate
        assert_eq!(Version::from_i32(3), None);
        assert_eq!(Version::from_i32(-1), None);
        assert_eq!(Version::from_i32(2), None);
    }
}
