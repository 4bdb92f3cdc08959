//! Validation helpers for DTOs.

use validator::ValidationError;

/// Maximum accepted length for participant addresses and room identifiers.
const MAX_IDENTIFIER_LEN: usize = 128;

/// Validates that a participant address is a non-empty printable token.
///
/// Addresses are opaque external identities (wallet-style strings such as
/// `0xA1b2...`); the backend only requires that they are non-empty, free of
/// whitespace, and reasonably bounded.
pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    if address.is_empty() || address.len() > MAX_IDENTIFIER_LEN {
        let mut err = ValidationError::new("address_length");
        err.message = Some(
            format!("Address must be between 1 and {MAX_IDENTIFIER_LEN} characters").into(),
        );
        return Err(err);
    }

    if address.chars().any(char::is_whitespace) {
        let mut err = ValidationError::new("address_format");
        err.message = Some("Address must not contain whitespace".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a client-supplied room identifier.
///
/// Identifiers become map keys and channel names, so they must be non-empty,
/// whitespace-free, and bounded.
pub fn validate_room_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > MAX_IDENTIFIER_LEN {
        let mut err = ValidationError::new("room_id_length");
        err.message = Some(
            format!("Room identifier must be between 1 and {MAX_IDENTIFIER_LEN} characters")
                .into(),
        );
        return Err(err);
    }

    if id.chars().any(char::is_whitespace) {
        let mut err = ValidationError::new("room_id_format");
        err.message = Some("Room identifier must not contain whitespace".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_address_valid() {
        assert!(validate_address("0xA").is_ok());
        assert!(validate_address("0xdeadbeef0001").is_ok());
        assert!(validate_address("alice").is_ok());
    }

    #[test]
    fn test_validate_address_invalid() {
        assert!(validate_address("").is_err());
        assert!(validate_address("0x dead").is_err());
        assert!(validate_address(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_room_id() {
        assert!(validate_room_id("quiz_1700000000000_abc123xyz").is_ok());
        assert!(validate_room_id("r1").is_ok());
        assert!(validate_room_id("").is_err());
        assert!(validate_room_id("has space").is_err());
    }
}
