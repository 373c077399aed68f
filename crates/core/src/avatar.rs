//! Avatar option sets, palettes, and validation.
//!
//! Every avatar field draws from a fixed option set or color palette. A save
//! replaces the whole configuration at once; out-of-set values are rejected,
//! never clamped to a nearby valid one.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Style option sets
// ---------------------------------------------------------------------------

/// All valid hair styles.
pub const HAIR_STYLES: &[&str] = &["short", "long", "curly", "bald", "ponytail", "buzz"];

/// All valid eye styles.
pub const EYE_STYLES: &[&str] = &["normal", "big", "small", "sleepy", "wink", "star"];

/// All valid outfits.
pub const OUTFITS: &[&str] = &["casual", "formal", "sporty", "hoodie", "dress", "uniform"];

/// All valid accessories. `"none"` is a member of the set, not an absent value.
pub const ACCESSORIES: &[&str] = &["none", "glasses", "hat", "headband", "earrings", "necklace"];

// ---------------------------------------------------------------------------
// Color palettes
// ---------------------------------------------------------------------------

/// Hair color palette.
pub const HAIR_COLORS: &[&str] = &[
    "#8B4513", "#000000", "#FFD700", "#FF6347", "#9370DB", "#32CD32",
];

/// Eye color palette.
pub const EYE_COLORS: &[&str] = &[
    "#4169E1", "#228B22", "#8B4513", "#FF1493", "#00CED1", "#FF4500",
];

/// Skin tone palette.
pub const SKIN_TONES: &[&str] = &[
    "#FDBCB4", "#F1C27D", "#E0AC69", "#C68642", "#8D5524", "#F3E7DB",
];

/// Outfit color palette.
pub const OUTFIT_COLORS: &[&str] = &[
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8", "#F7DC6F",
];

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// A user's avatar configuration.
///
/// Saved wholesale: a save replaces every field; there is no per-field merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarConfig {
    pub hair: String,
    pub hair_color: String,
    pub eyes: String,
    pub eye_color: String,
    pub skin: String,
    pub outfit: String,
    pub outfit_color: String,
    pub accessory: String,
}

impl Default for AvatarConfig {
    /// The baseline avatar every new participant starts with.
    fn default() -> Self {
        AvatarConfig {
            hair: "short".to_string(),
            hair_color: "#8B4513".to_string(),
            eyes: "normal".to_string(),
            eye_color: "#4169E1".to_string(),
            skin: "#FDBCB4".to_string(),
            outfit: "casual".to_string(),
            outfit_color: "#FF6B6B".to_string(),
            accessory: "none".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_field(field: &'static str, value: &str, valid: &[&str]) -> Result<(), CoreError> {
    if valid.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::InvalidArgument(format!(
            "Unknown {field}: '{value}'. Valid values: {}",
            valid.join(", ")
        )))
    }
}

/// Validate every field of an avatar configuration against its option set.
pub fn validate_avatar(config: &AvatarConfig) -> Result<(), CoreError> {
    validate_field("hair style", &config.hair, HAIR_STYLES)?;
    validate_field("hair color", &config.hair_color, HAIR_COLORS)?;
    validate_field("eye style", &config.eyes, EYE_STYLES)?;
    validate_field("eye color", &config.eye_color, EYE_COLORS)?;
    validate_field("skin tone", &config.skin, SKIN_TONES)?;
    validate_field("outfit", &config.outfit, OUTFITS)?;
    validate_field("outfit color", &config.outfit_color, OUTFIT_COLORS)?;
    validate_field("accessory", &config.accessory, ACCESSORIES)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
