use rand::distributions::Alphanumeric;
use rand::Rng;

/// 32 alphanumeric chars, roughly 190 bits of entropy.
pub const TOKEN_LEN: usize = 32;

/// Generate an opaque bearer token. Tokens are permanent: there is no
/// expiry or rotation, a new signup simply mints a new one.
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_has_fixed_length_and_charset() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn tokens_differ_between_calls() {
        assert_ne!(generate_token(), generate_token());
    }
}
