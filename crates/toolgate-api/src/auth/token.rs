//! Invitation token generation.

const TOKEN_BYTES: usize = 32;

/// Generate an unguessable invitation token: 32 random bytes hex-encoded
/// (256 bits of entropy).
pub fn generate_invitation_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let random_bytes: Vec<u8> = (0..TOKEN_BYTES).map(|_| rng.random()).collect();
    hex::encode(random_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_64_hex_chars() {
        let token = generate_invitation_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_invitation_token(), generate_invitation_token());
    }
}
