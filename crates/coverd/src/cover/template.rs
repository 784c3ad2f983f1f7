//! Cover entry generation.
//!
//! Turns `{cover_id, name, switch_entity, travel_time}` into one entry of the
//! covers document. No side effects; the same inputs always produce the same
//! entry.

use serde::{Deserialize, Serialize};

use super::CoverError;

/// Position extrapolation model.
///
/// Time-based covers have no position feedback: the current position is
/// estimated from elapsed movement time, assuming constant travel speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovementModel {
    LinearByTime,
}

/// One rendered entry of the covers document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverConfigEntry {
    /// Human-readable cover name
    pub name: String,

    /// Entity id of the switch driving the cover motor
    pub switch_entity: String,

    /// Full open-to-close travel time in seconds
    pub travel_time: f64,

    /// Helper entity tracking the estimated position (0-100)
    pub position_helper: String,

    /// Helper entity tracking the movement direction
    pub direction_helper: String,

    /// Position extrapolation model
    pub movement: MovementModel,

    /// Whether state changes are assumed to succeed without feedback
    pub optimistic: bool,
}

/// Derive a cover id from a display name: lowercase, whitespace runs
/// replaced by single underscores.
pub fn normalize_id(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Generate the configuration entry for one time-based cover.
///
/// Fails with [`CoverError::Validation`] if `cover_id` or `switch_entity` is
/// empty or `travel_time` is not a positive number of seconds.
pub fn generate(
    cover_id: &str,
    name: &str,
    switch_entity: &str,
    travel_time: f64,
) -> Result<CoverConfigEntry, CoverError> {
    let cover_id = cover_id.trim();
    let switch_entity = switch_entity.trim();

    if cover_id.is_empty() {
        return Err(CoverError::Validation("cover id must not be empty".into()));
    }
    if switch_entity.is_empty() {
        return Err(CoverError::Validation(
            "switch entity must not be empty".into(),
        ));
    }
    if !travel_time.is_finite() || travel_time <= 0.0 {
        return Err(CoverError::Validation(format!(
            "travel time must be a positive number of seconds, got {}",
            travel_time
        )));
    }

    Ok(CoverConfigEntry {
        name: name.to_string(),
        switch_entity: switch_entity.to_string(),
        travel_time,
        position_helper: format!("input_text.{}_position", cover_id),
        direction_helper: format!("input_text.{}_direction", cover_id),
        movement: MovementModel::LinearByTime,
        optimistic: true,
    })
}
