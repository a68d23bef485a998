//! Wire protocol for the Cilia control endpoint.
//!
//! Every message is a single JSON document sent as one text frame.
//! Commands serialize as a one-entry object keyed by the command name,
//! holding a list with one tuple:
//!
//! ```text
//! {"SetLight":[[1,255,0,0]]}
//! {"SetFan":[["Apple",128]]}        {"SetFan":[[3,128]]}
//! {"SetScent":[["Rose",255]]}
//! {"LoadProfile":{"ProfileName":"Game", ...}}
//! ```
//!
//! Group-addressed commands are nested under `Message` next to a
//! `GroupID` list. Device firmware matches on these exact field names.

use std::collections::BTreeSet;
use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ── Fan addressing ───────────────────────────────────────────────────

/// A fan addressed either by the scent loaded in it or by its slot index.
///
/// Both forms produce the same `SetFan` shape; only the JSON type of the
/// first tuple element differs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FanId {
    Index(u32),
    Name(String),
}

impl From<u32> for FanId {
    fn from(index: u32) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for FanId {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for FanId {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl fmt::Display for FanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

// ── Command ──────────────────────────────────────────────────────────

/// A single device command.
///
/// Values are not range-checked: light indices outside 1-6 are passed
/// through untouched and the device decides what to do with them.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set one light (1-6) of every addressed device to an RGB color.
    SetLight {
        light: u8,
        red: u8,
        green: u8,
        blue: u8,
    },
    /// Spin a fan, addressed by scent name or slot index.
    SetFan { fan: FanId, speed: u8 },
    /// Spin every fan loaded with the named scent.
    SetScent { scent: String, speed: u8 },
    /// Install the session profile (scent library, groups, initial effect).
    LoadProfile(ProfileDocument),
}

impl Command {
    /// The top-level document key for this command.
    pub fn key(&self) -> &'static str {
        match self {
            Self::SetLight { .. } => "SetLight",
            Self::SetFan { .. } => "SetFan",
            Self::SetScent { .. } => "SetScent",
            Self::LoadProfile(_) => "LoadProfile",
        }
    }

    /// Serialize this command for the given target.
    pub fn encode(&self, target: &GroupTarget) -> Result<String, Error> {
        encode(self, target)
    }
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::SetLight {
                light,
                red,
                green,
                blue,
            } => map.serialize_entry(self.key(), &[(light, red, green, blue)])?,
            Self::SetFan { fan, speed } => map.serialize_entry(self.key(), &[(fan, speed)])?,
            Self::SetScent { scent, speed } => {
                map.serialize_entry(self.key(), &[(scent, speed)])?;
            }
            Self::LoadProfile(profile) => map.serialize_entry(self.key(), profile)?,
        }
        map.end()
    }
}

// ── Group addressing ─────────────────────────────────────────────────

/// Which device groups a command applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GroupTarget {
    /// Every group. The command is sent without an envelope.
    #[default]
    All,
    /// Only the listed group IDs. Serialized in ascending order.
    Groups(BTreeSet<u8>),
}

impl GroupTarget {
    /// Target a single group.
    pub fn group(id: u8) -> Self {
        Self::Groups(BTreeSet::from([id]))
    }

    /// Target a set of groups.
    ///
    /// An empty set is kept as-is and rejected at encode time rather
    /// than silently widened to [`GroupTarget::All`].
    pub fn groups(ids: impl IntoIterator<Item = u8>) -> Self {
        Self::Groups(ids.into_iter().collect())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<u8> for GroupTarget {
    fn from(id: u8) -> Self {
        Self::group(id)
    }
}

/// Outer document restricting a message to a set of groups.
///
/// Generic over the wrapped message; it never inspects what it carries.
#[derive(Debug, Serialize)]
pub struct GroupEnvelope<'a, T: Serialize> {
    #[serde(rename = "GroupID")]
    pub group_ids: Vec<u8>,
    #[serde(rename = "Message")]
    pub message: &'a T,
}

impl<'a, T: Serialize> GroupEnvelope<'a, T> {
    /// Wrap `message` for the given groups. Fails if `group_ids` is empty.
    pub fn wrap(group_ids: impl IntoIterator<Item = u8>, message: &'a T) -> Result<Self, Error> {
        let group_ids: Vec<u8> = group_ids.into_iter().collect();
        if group_ids.is_empty() {
            return Err(Error::EmptyGroupTarget);
        }
        Ok(Self { group_ids, message })
    }
}

/// Serialize any message document for a target.
///
/// [`GroupTarget::All`] emits the document unchanged; anything else wraps
/// it in a [`GroupEnvelope`].
pub fn encode<T: Serialize>(message: &T, target: &GroupTarget) -> Result<String, Error> {
    let text = match target {
        GroupTarget::All => serde_json::to_string(message)?,
        GroupTarget::Groups(ids) => {
            let envelope = GroupEnvelope::wrap(ids.iter().copied(), message)?;
            serde_json::to_string(&envelope)?
        }
    };
    Ok(text)
}

// ── Profile document ─────────────────────────────────────────────────

/// Body of a `LoadProfile` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProfileDocument {
    pub profile_name: String,
    #[serde(rename = "DefaultGroupID")]
    pub default_group_id: u8,
    pub groups: Vec<String>,
    /// `(position, scent name)` pairs. The position is the library slot,
    /// so reordering the library renumbers every scent after it.
    pub scents: Vec<(u32, String)>,
    pub effect: Effect,
}

/// Lighting effect applied when a profile loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Effect {
    #[serde(rename = "EffectID")]
    pub effect_id: i32,
    pub loop_time: f64,
    pub frame_duration: f64,
    /// `(light fixture, packed RGBW)` pairs; fixtures count from 1.
    pub effect_colors: Vec<(u32, u32)>,
    pub options: EffectOptions,
}

impl Effect {
    /// A static effect (ID 0, no animation timing) with the given colors.
    pub fn solid(effect_colors: Vec<(u32, u32)>) -> Self {
        Self {
            effect_id: 0,
            loop_time: 0.0,
            frame_duration: 0.0,
            effect_colors,
            options: EffectOptions::default(),
        }
    }
}

/// Reserved effect options. Always serialized as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectOptions {}

// ── Tests ────────────────────────────────────────────────────────────
