//! Principal identity, positions and chat modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Namespace for name-derived principal ids.
const PRINCIPAL_NAMESPACE: Uuid = Uuid::from_u128(0x6e67_6368_6174_4000_8000_6e65_7874_6765);

/// Opaque, stable principal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    /// Derive the id for a display name. Case-insensitive, so a player keeps
    /// the same id across reconnects regardless of capitalisation.
    pub fn from_name(name: &str) -> Self {
        Self(Uuid::new_v5(&PRINCIPAL_NAMESPACE, name.to_lowercase().as_bytes()))
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A connected (or recorded) player: stable id plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    pub id: PrincipalId,
    pub name: String,
}

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: PrincipalId::from_name(&name),
            name,
        }
    }
}

/// World coordinates of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_squared(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

/// Chat scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// Proximity-limited, same zone only.
    #[default]
    Local,
    /// Everyone online.
    Global,
}

impl ChatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Global => "global",
        }
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one online session as seen by the router.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub principal: Principal,
    pub zone: String,
    pub position: Position,
}

impl RosterEntry {
    /// Whether `other` is within `radius` of this entry (inclusive, same zone).
    pub fn within_radius(&self, other: &RosterEntry, radius: f64) -> bool {
        self.zone == other.zone && self.position.distance_squared(&other.position) <= radius * radius
    }
}
