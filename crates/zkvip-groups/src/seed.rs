//! Starter groups and avatar palette.

use zkvip_core::{GroupId, TokenAmount, ZkvipError};

use crate::model::AvailableGroup;

/// Gradient presentation keys offered to new groups.
pub const AVATAR_PALETTE: [&str; 6] = [
    "bg-gradient-to-br from-indigo-600 via-purple-500 to-pink-500",
    "bg-gradient-to-br from-amber-500 via-orange-500 to-rose-500",
    "bg-gradient-to-br from-slate-700 via-slate-600 to-slate-500",
    "bg-gradient-to-br from-teal-500 via-emerald-500 to-lime-500",
    "bg-gradient-to-br from-blue-500 via-cyan-500 to-teal-500",
    "bg-gradient-to-br from-pink-500 via-rose-500 to-red-500",
];

/// (id, name, description, minimum balance, members)
const DEFAULTS: [(&str, &str, &str, &str, u64); 2] = [
    (
        "zk-builders",
        "ZK Builders",
        "Daily discussions about ZK, proofs and tooling.",
        "0.5",
        124,
    ),
    (
        "ethereum-sp",
        "Ethereum São Paulo",
        "Events, meetups and grants from the São Paulo community.",
        "1",
        89,
    ),
];

/// The groups a fresh store is seeded with.
pub fn default_groups() -> Result<Vec<AvailableGroup>, ZkvipError> {
    DEFAULTS
        .iter()
        .zip(AVATAR_PALETTE)
        .map(|(&(id, name, description, min, members), avatar)| -> Result<_, ZkvipError> {
            Ok(AvailableGroup {
                id: GroupId::parse(id)?,
                name: name.to_string(),
                description: description.to_string(),
                min_balance: TokenAmount::parse_decimal(min)?,
                members,
                avatar_tag: avatar.to_string(),
            })
        })
        .collect()
}

/// Palette entry for the `n`th pick, wrapping around.
pub fn avatar_for(n: usize) -> &'static str {
    AVATAR_PALETTE[n % AVATAR_PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_distinct() {
        let groups = default_groups().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id.as_str(), "zk-builders");
        assert_eq!(groups[0].min_balance.to_string(), "0.5");
        assert_eq!(groups[0].members, 124);
        assert_eq!(groups[1].id.as_str(), "ethereum-sp");
        assert_eq!(groups[1].min_balance.to_string(), "1");
        assert_eq!(groups[1].avatar_tag, AVATAR_PALETTE[1]);
    }

    #[test]
    fn avatar_wraps() {
        assert_eq!(avatar_for(0), avatar_for(AVATAR_PALETTE.len()));
    }
}
