//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest display name a team may register.
pub const MAX_TEAM_NAME_CHARS: usize = 20;

/// Validates that a team name is 1 to 20 characters once surrounding whitespace is trimmed.
///
/// # Examples
///
/// ```ignore
/// validate_team_name("Quiz Khalifa") // Ok
/// validate_team_name("   ")          // Err - blank
/// validate_team_name("The Incredibly Long Name") // Err - too long
/// ```
pub fn validate_team_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("team_name_blank");
        err.message = Some("Team name must not be blank".into());
        return Err(err);
    }

    let count = trimmed.chars().count();
    if count > MAX_TEAM_NAME_CHARS {
        let mut err = ValidationError::new("team_name_length");
        err.message = Some(
            format!("Team name must be at most {MAX_TEAM_NAME_CHARS} characters (got {count})")
                .into(),
        );
        return Err(err);
    }

    Ok(())
}
