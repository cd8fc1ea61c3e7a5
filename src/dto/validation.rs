//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a player name carries at least one visible character.
///
/// # Examples
///
/// ```ignore
/// validate_player_name("Zidane") // Ok
/// validate_player_name("   ")    // Err - blank
/// ```
pub fn validate_player_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("player_name_blank");
        err.message = Some("Player name must not be blank".into());
        return Err(err);
    }

    Ok(())
}
