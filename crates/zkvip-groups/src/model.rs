//! Group records as stored and listed.
//!
//! Field names serialize in camelCase. Records written by the earlier web
//! client used `minWld`, `avatarBg` and `unread`; those names are accepted
//! as aliases on load.

use serde::{Deserialize, Serialize};
use zkvip_core::{GroupId, TokenAmount, Timestamp};

/// First message shown in a freshly joined group.
pub const WELCOME_MESSAGE: &str = "Welcome to the group!";

/// Sender shown with [`WELCOME_MESSAGE`].
pub const SYSTEM_SENDER: &str = "System";

/// A group the user may join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableGroup {
    pub id: GroupId,
    pub name: String,
    pub description: String,
    /// Minimum token balance required to join.
    #[serde(alias = "minWld")]
    pub min_balance: TokenAmount,
    /// Informational member count.
    #[serde(default)]
    pub members: u64,
    /// Opaque presentation key.
    #[serde(alias = "avatarBg")]
    pub avatar_tag: String,
}

/// A group the user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedGroup {
    pub id: GroupId,
    pub name: String,
    pub description: String,
    #[serde(alias = "minWld")]
    pub min_balance: TokenAmount,
    #[serde(default)]
    pub members: u64,
    #[serde(alias = "avatarBg")]
    pub avatar_tag: String,
    pub joined_at: Timestamp,
    pub last_message: String,
    pub last_sender: String,
    #[serde(alias = "unread", default)]
    pub unread_count: u64,
}

impl JoinedGroup {
    /// The joined record for `group`, with the welcome message and no unread.
    pub fn from_available(group: AvailableGroup, joined_at: Timestamp) -> Self {
        Self {
            id: group.id,
            name: group.name,
            description: group.description,
            min_balance: group.min_balance,
            members: group.members,
            avatar_tag: group.avatar_tag,
            joined_at,
            last_message: WELCOME_MESSAGE.to_string(),
            last_sender: SYSTEM_SENDER.to_string(),
            unread_count: 0,
        }
    }
}

/// Parameters for creating a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub name: String,
    pub description: String,
    pub min_balance: TokenAmount,
    pub avatar_tag: String,
}

/// Filter for [`crate::GroupStore::list_available_filtered`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AvailableFilter {
    /// Every group not yet joined.
    #[default]
    All,
    /// Groups whose minimum balance is at most the given amount.
    AtMost(TokenAmount),
}

impl AvailableFilter {
    pub fn admits(&self, group: &AvailableGroup) -> bool {
        match self {
            Self::All => true,
            Self::AtMost(limit) => &group.min_balance <= limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_legacy_joined_record() {
        let raw = r#"{
            "id": "zk-builders",
            "name": "ZK Builders",
            "lastMessage": "hi",
            "lastSender": "ana",
            "description": "d",
            "minWld": 0.5,
            "unread": 3,
            "avatarBg": "bg-x",
            "members": 124,
            "joinedAt": "2025-11-02T10:15:30.123Z"
        }"#;
        let group: JoinedGroup = serde_json::from_str(raw).unwrap();
        assert_eq!(group.min_balance.to_string(), "0.5");
        assert_eq!(group.unread_count, 3);
        assert_eq!(group.avatar_tag, "bg-x");
        assert_eq!(group.joined_at.to_iso8601(), "2025-11-02T10:15:30Z");
    }

    #[test]
    fn writes_camel_case_with_string_amounts() {
        let group = AvailableGroup {
            id: GroupId::parse("g").unwrap(),
            name: "G".into(),
            description: String::new(),
            min_balance: TokenAmount::parse_decimal("1").unwrap(),
            members: 0,
            avatar_tag: "a".into(),
        };
        let value = serde_json::to_value(&group).unwrap();
        assert_eq!(value["minBalance"], "1");
        assert_eq!(value["avatarTag"], "a");
    }

    #[test]
    fn joined_defaults() {
        let group = AvailableGroup {
            id: GroupId::parse("g").unwrap(),
            name: "G".into(),
            description: String::new(),
            min_balance: TokenAmount::zero(),
            members: 7,
            avatar_tag: "a".into(),
        };
        let joined = JoinedGroup::from_available(group, Timestamp::now());
        assert_eq!(joined.last_message, WELCOME_MESSAGE);
        assert_eq!(joined.last_sender, SYSTEM_SENDER);
        assert_eq!(joined.unread_count, 0);
        assert_eq!(joined.members, 7);
    }

    #[test]
    fn at_most_filter_is_inclusive() {
        let mut group = AvailableGroup {
            id: GroupId::parse("g").unwrap(),
            name: "G".into(),
            description: String::new(),
            min_balance: TokenAmount::parse_decimal("1").unwrap(),
            members: 0,
            avatar_tag: "a".into(),
        };
        let filter = AvailableFilter::AtMost(TokenAmount::parse_decimal("1").unwrap());
        assert!(filter.admits(&group));
        group.min_balance = TokenAmount::parse_decimal("1.01").unwrap();
        assert!(!filter.admits(&group));
    }
}
