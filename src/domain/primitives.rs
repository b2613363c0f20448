//! Domain primitives: Network, ParameterDelta, address resolution.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Which chain endpoint a read is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// The production network, state before the proposal executes.
    Live,
    /// A forked copy with the proposal applied.
    Forked,
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Live => write!(f, "live"),
            Network::Forked => write!(f, "forked"),
        }
    }
}

/// A value read before and after a governance change.
///
/// Both sides always carry the same unit and scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParameterDelta<T> {
    pub before: T,
    pub after: T,
}

impl<T: PartialEq> ParameterDelta<T> {
    pub fn new(before: T, after: T) -> Self {
        Self { before, after }
    }

    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

impl<T> ParameterDelta<T> {
    /// Apply the same conversion to both sides.
    pub fn map<U, E>(self, mut f: impl FnMut(T) -> Result<U, E>) -> Result<ParameterDelta<U>, E> {
        Ok(ParameterDelta {
            before: f(self.before)?,
            after: f(self.after)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid Ethereum address format: {0}")]
pub struct InvalidAddressError(pub String);

/// Parse a user-supplied hex address.
///
/// Accepts any letter case; the returned address displays in EIP-55 checksum form.
pub fn resolve_checksum_address(input: &str) -> Result<Address, InvalidAddressError> {
    let trimmed = input.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| InvalidAddressError(input.to_string()))?;

    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(InvalidAddressError(input.to_string()));
    }

    Address::from_str(hex_part).map_err(|_| InvalidAddressError(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_delta_changed() {
        assert!(!ParameterDelta::new(8000u64, 8000).changed());
        assert!(ParameterDelta::new(8000u64, 7500).changed());
    }

    #[test]
    fn test_parameter_delta_serialization() {
        let delta = ParameterDelta::new(1u64, 2u64);
        let json = serde_json::to_value(delta).unwrap();
        assert_eq!(json, serde_json::json!({"before": 1, "after": 2}));
    }

    #[test]
    fn test_resolve_lowercase_address_to_checksum() {
        let addr = resolve_checksum_address("0xad038eb671c44b853887a7e32528fab35dc5d710").unwrap();
        assert_eq!(
            addr.to_checksum(None),
            "0xAD038Eb671c44b853887A7E32528FaB35dC5D710"
        );
    }

    #[test]
    fn test_resolve_rejects_malformed_addresses() {
        for bad in ["", "0x", "0x1234", "AD038Eb671c44b853887A7E32528FaB35dC5D710", "0xZZ038Eb671c44b853887A7E32528FaB35dC5D710"] {
            assert!(resolve_checksum_address(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_network_display() {
        assert_eq!(Network::Live.to_string(), "live");
        assert_eq!(Network::Forked.to_string(), "forked");
    }
}
