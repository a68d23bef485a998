// ── Session profile ──
//
// The profile the device loads once per connection: a nickname, the
// scent library, named groups, and a static color per light fixture.

use serde::{Deserialize, Serialize};

use cilia_api::{Command, Effect, ProfileDocument};

use crate::color::RgbColor;

pub const DEFAULT_PROFILE_NAME: &str = "Game";

pub const DEFAULT_SCENTS: [&str; 6] = [
    "Apple",
    "BahamaBreeze",
    "CleanCotton",
    "Leather",
    "Lemon",
    "Rose",
];

pub const DEFAULT_GROUPS: [&str; 8] = [
    "FrontCenter",
    "FrontLeft",
    "SideLeft",
    "RearLeft",
    "RearCenter",
    "RearRight",
    "SideRight",
    "FrontRight",
];

/// Number of light fixtures on a device.
pub const LIGHT_COUNT: usize = 6;

/// Builder input for the `LoadProfile` document.
///
/// List order is significant: scent positions become library slots,
/// group positions become group IDs, and light positions become fixture
/// numbers (counting from 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameProfile {
    pub name: String,
    pub default_group: u8,
    pub scents: Vec<String>,
    pub groups: Vec<String>,
    pub lights: Vec<RgbColor>,
}

impl Default for GameProfile {
    fn default() -> Self {
        Self {
            name: DEFAULT_PROFILE_NAME.into(),
            default_group: 0,
            scents: DEFAULT_SCENTS.iter().map(ToString::to_string).collect(),
            groups: DEFAULT_GROUPS.iter().map(ToString::to_string).collect(),
            lights: vec![RgbColor::BLACK; LIGHT_COUNT],
        }
    }
}

impl GameProfile {
    /// Resolve a group name to its ID. Exact matches win over
    /// case-insensitive ones.
    pub fn group_id(&self, name: &str) -> Option<u8> {
        let position = self
            .groups
            .iter()
            .position(|group| group == name)
            .or_else(|| {
                self.groups
                    .iter()
                    .position(|group| group.eq_ignore_ascii_case(name))
            })?;
        u8::try_from(position).ok()
    }

    /// Build the wire document.
    pub fn to_document(&self) -> ProfileDocument {
        let scents = (0u32..).zip(self.scents.iter().cloned()).collect();
        let effect_colors = (1u32..)
            .zip(self.lights.iter().map(|light| light.to_hex()))
            .collect();

        ProfileDocument {
            profile_name: self.name.clone(),
            default_group_id: self.default_group,
            groups: self.groups.clone(),
            scents,
            effect: Effect::solid(effect_colors),
        }
    }

    pub fn to_command(&self) -> Command {
        Command::LoadProfile(self.to_document())
    }
}
