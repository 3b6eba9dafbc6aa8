//! Wallet address resolution for the current session.

use zkvip_core::WalletAddress;

/// The wallet connected to this session, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    address: Option<WalletAddress>,
}

impl WalletSession {
    pub fn new(address: Option<WalletAddress>) -> Self {
        Self { address }
    }

    /// Session from `ZKVIP_WALLET`; an unset or unparseable value yields an
    /// empty session.
    pub fn from_env() -> Self {
        let address = std::env::var("ZKVIP_WALLET").ok().and_then(|raw| {
            WalletAddress::parse(&raw)
                .map_err(|e| tracing::warn!(error = %e, "ignoring ZKVIP_WALLET"))
                .ok()
        });
        Self { address }
    }

    pub fn address(&self) -> Option<&WalletAddress> {
        self.address.as_ref()
    }

    /// The address to query: an explicit override, else the session wallet,
    /// else the zero address.
    pub fn resolve(&self, explicit: Option<&WalletAddress>) -> WalletAddress {
        if let Some(addr) = explicit.or(self.address.as_ref()) {
            return addr.clone();
        }
        tracing::warn!("no session wallet; querying the zero address");
        WalletAddress::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: char) -> WalletAddress {
        WalletAddress::parse(&format!("0x{}{last}", "0".repeat(39))).unwrap()
    }

    #[test]
    fn explicit_address_wins() {
        let session = WalletSession::new(Some(addr('1')));
        assert_eq!(session.resolve(Some(&addr('2'))), addr('2'));
    }

    #[test]
    fn session_address_used_when_no_override() {
        let session = WalletSession::new(Some(addr('1')));
        assert_eq!(session.resolve(None), addr('1'));
    }

    #[test]
    fn empty_session_falls_back_to_zero() {
        let resolved = WalletSession::default().resolve(None);
        assert_eq!(resolved.as_str(), WalletAddress::ZERO);
    }
}
