//! Per-organizer capability bits.
//!
//! A user's rights on an organizer are one 64-bit mask stored as BIGINT in
//! `user_organizer_link.permissions`. Bit positions are part of the stored
//! data and must never be renumbered.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(pub u64);

impl Permission {
    // organizer
    pub const EDIT_ORGANIZER: Permission = Permission::bit(0);
    pub const DELETE_ORGANIZER: Permission = Permission::bit(1);
    pub const CHOOSE_AS_EVENT_ORGANIZER: Permission = Permission::bit(2);
    pub const CHOOSE_AS_EVENT_PARTNER: Permission = Permission::bit(3);
    pub const RECEIVE_ORGANIZER_MESSAGES: Permission = Permission::bit(4);
    pub const MANAGE_PERMISSIONS: Permission = Permission::bit(5);
    pub const MANAGE_TEAM: Permission = Permission::bit(6);

    // venue
    pub const ADD_VENUE: Permission = Permission::bit(8);
    pub const EDIT_VENUE: Permission = Permission::bit(9);
    pub const DELETE_VENUE: Permission = Permission::bit(10);
    pub const CHOOSE_VENUE: Permission = Permission::bit(11);

    // space
    pub const ADD_SPACE: Permission = Permission::bit(16);
    pub const EDIT_SPACE: Permission = Permission::bit(17);
    pub const DELETE_SPACE: Permission = Permission::bit(18);

    // event
    pub const ADD_EVENT: Permission = Permission::bit(24);
    pub const EDIT_EVENT: Permission = Permission::bit(25);
    pub const DELETE_EVENT: Permission = Permission::bit(26);
    pub const RELEASE_EVENT: Permission = Permission::bit(27);
    pub const VIEW_EVENT_INSIGHTS: Permission = Permission::bit(28);

    /// Every defined bit; granted to the creator of an organizer.
    pub const ADMIN: Permission = Permission(0b00011111000001110000111101111111);

    pub const NONE: Permission = Permission(0);

    const fn bit(n: u32) -> Permission {
        Permission(1 << n)
    }

    /// True if any bit of `flag` is set.
    pub fn has(self, flag: Permission) -> bool {
        self.0 & flag.0 != 0
    }

    pub fn has_all(self, mask: Permission) -> bool {
        self.0 & mask.0 == mask.0
    }

    pub fn has_any(self, mask: Permission) -> bool {
        self.0 & mask.0 != 0
    }

    pub fn set(&mut self, flag: Permission) {
        self.0 |= flag.0;
    }

    pub fn clear(&mut self, flag: Permission) {
        self.0 &= !flag.0;
    }

    /// Bits above 63 are ignored.
    pub fn set_bit(&mut self, bit: u32) {
        if bit < 64 {
            self.0 |= 1 << bit;
        }
    }

    pub fn clear_bit(&mut self, bit: u32) {
        if bit < 64 {
            self.0 &= !(1 << bit);
        }
    }

    pub fn has_bit(self, bit: u32) -> bool {
        bit < 64 && self.0 & (1 << bit) != 0
    }

    /// Zero-padded 64-digit binary rendering.
    pub fn binary(self) -> String {
        format!("{:064b}", self.0)
    }

    /// Reinterprets the stored BIGINT.
    pub fn from_db(value: i64) -> Self {
        Permission(value as u64)
    }

    pub fn to_db(self) -> i64 {
        self.0 as i64
    }
}

impl std::ops::BitOr for Permission {
    type Output = Permission;

    fn bitor(self, rhs: Permission) -> Permission {
        Permission(self.0 | rhs.0)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.binary())
    }
}

/// Named permission bundles offered when inviting team members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Assistant,
    Booker,
    EventProofreader,
    VenueManager,
    SpaceManager,
    InsightViewer,
}

impl Role {
    pub fn permissions(self) -> Permission {
        Permission(match self {
            Role::Admin => 0b00011111000001110000111100111111,
            Role::Manager => 0b00011111000001110000111100111101,
            Role::Assistant => 0b00011111000000100000001000011101,
            Role::Booker => 0b00011111000000000000000000000000,
            Role::EventProofreader => 0b00010010000000000000000000000000,
            Role::VenueManager => 0b00011111000000100000001000000000,
            Role::SpaceManager => 0b00000000000000100000000000000000,
            Role::InsightViewer => 0b00010000000000000000000000000000,
        })
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "assistant" => Ok(Role::Assistant),
            "booker" => Ok(Role::Booker),
            "event_proofreader" => Ok(Role::EventProofreader),
            "venue_manager" => Ok(Role::VenueManager),
            "space_manager" => Ok(Role::SpaceManager),
            "insight_viewer" => Ok(Role::InsightViewer),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PermissionInfo {
    pub bit: u32,
    pub group: &'static str,
    pub key: &'static str,
}

static CATALOG: [PermissionInfo; 19] = [
    PermissionInfo { bit: 0, group: "organizer", key: "edit_organizer" },
    PermissionInfo { bit: 1, group: "organizer", key: "delete_organizer" },
    PermissionInfo { bit: 2, group: "organizer", key: "choose_as_event_organizer" },
    PermissionInfo { bit: 3, group: "organizer", key: "choose_as_event_partner" },
    PermissionInfo { bit: 4, group: "organizer", key: "receive_organizer_messages" },
    PermissionInfo { bit: 5, group: "organizer", key: "manage_permissions" },
    PermissionInfo { bit: 6, group: "organizer", key: "manage_team" },
    PermissionInfo { bit: 8, group: "venue", key: "add_venue" },
    PermissionInfo { bit: 9, group: "venue", key: "edit_venue" },
    PermissionInfo { bit: 10, group: "venue", key: "delete_venue" },
    PermissionInfo { bit: 11, group: "venue", key: "choose_venue" },
    PermissionInfo { bit: 16, group: "space", key: "add_space" },
    PermissionInfo { bit: 17, group: "space", key: "edit_space" },
    PermissionInfo { bit: 18, group: "space", key: "delete_space" },
    PermissionInfo { bit: 24, group: "event", key: "add_event" },
    PermissionInfo { bit: 25, group: "event", key: "edit_event" },
    PermissionInfo { bit: 26, group: "event", key: "delete_event" },
    PermissionInfo { bit: 27, group: "event", key: "release_event" },
    PermissionInfo { bit: 28, group: "event", key: "view_event_insights" },
];

/// Defined permissions in bit order.
pub fn catalog() -> &'static [PermissionInfo] {
    &CATALOG
}

/// Bits a member may never toggle on their own link.
pub fn is_self_protected(bit: u32) -> bool {
    Permission::MANAGE_PERMISSIONS.has_bit(bit) || Permission::MANAGE_TEAM.has_bit(bit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_covers_every_defined_bit() {
        let all = catalog()
            .iter()
            .fold(Permission::NONE, |acc, p| acc | Permission::bit(p.bit));
        assert_eq!(all, Permission::ADMIN);
        assert_eq!(catalog().len(), 19);
    }

    #[test]
    fn test_has_semantics() {
        let p = Permission::EDIT_EVENT | Permission::ADD_VENUE;
        assert!(p.has(Permission::EDIT_EVENT));
        assert!(!p.has(Permission::DELETE_EVENT));
        assert!(p.has_any(Permission::EDIT_EVENT | Permission::DELETE_EVENT));
        assert!(!p.has_all(Permission::EDIT_EVENT | Permission::DELETE_EVENT));
        assert!(p.has_all(Permission::EDIT_EVENT | Permission::ADD_VENUE));
    }

    #[test]
    fn test_set_and_clear() {
        let mut p = Permission::NONE;
        p.set(Permission::MANAGE_TEAM);
        p.set_bit(27);
        assert!(p.has(Permission::RELEASE_EVENT));
        p.clear(Permission::MANAGE_TEAM);
        assert!(!p.has(Permission::MANAGE_TEAM));
        p.clear_bit(27);
        assert_eq!(p, Permission::NONE);
    }

    #[test]
    fn test_out_of_range_bits_are_ignored() {
        let mut p = Permission(5);
        p.set_bit(64);
        p.clear_bit(100);
        assert_eq!(p, Permission(5));
        assert!(!p.has_bit(64));
        assert!(p.has_bit(0));
        assert!(p.has_bit(2));
    }

    #[test]
    fn test_binary_rendering() {
        let b = Permission(5).binary();
        assert_eq!(b.len(), 64);
        assert!(b.ends_with("101"));
        assert!(b[..61].chars().all(|c| c == '0'));
    }

    #[test]
    fn test_db_roundtrip_keeps_high_bit() {
        let p = Permission(1 << 63);
        assert_eq!(p.to_db(), i64::MIN);
        assert_eq!(Permission::from_db(p.to_db()), p);
    }

    #[test]
    fn test_roles() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
        assert!(Permission::ADMIN.has_all(Role::Admin.permissions()));
        assert!(!Role::Admin.permissions().has(Permission::MANAGE_TEAM));
        assert!(!Role::Manager.permissions().has(Permission::DELETE_ORGANIZER));
        assert_eq!(Role::SpaceManager.permissions(), Permission::EDIT_SPACE);
        assert!(Role::EventProofreader.permissions().has(Permission::EDIT_EVENT));
        assert!(Role::EventProofreader.permissions().has(Permission::VIEW_EVENT_INSIGHTS));
    }

    #[test]
    fn test_self_protected_bits() {
        assert!(is_self_protected(5));
        assert!(is_self_protected(6));
        assert!(!is_self_protected(0));
        assert!(!is_self_protected(64));
    }
}
