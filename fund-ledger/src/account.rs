//! Contributor and owner identities.

use std::fmt;

pub const ACCOUNT_ID_LEN: usize = 20;

/// Opaque 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId([u8; ACCOUNT_ID_LEN]);

impl AccountId {
    pub const fn new(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Identity with `value` in the trailing bytes; handy for fixtures.
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; ACCOUNT_ID_LEN];
        bytes[ACCOUNT_ID_LEN - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.0
    }
}

impl From<[u8; ACCOUNT_ID_LEN]> for AccountId {
    fn from(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_hex() {
        let account = AccountId::from_low_u64(0xdead_beef);
        assert_eq!(
            account.to_string(),
            "0x00000000000000000000000000000000deadbeef"
        );
    }

    #[test]
    fn from_low_u64_is_stable() {
        assert_eq!(AccountId::from_low_u64(7), AccountId::from_low_u64(7));
        assert_ne!(AccountId::from_low_u64(7), AccountId::from_low_u64(8));
    }
}
