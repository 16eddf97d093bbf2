use rand::Rng;

use crate::shared::errors::{DomainError, DomainResult};

pub const SHARE_TOKEN_LEN: usize = 12;

const CHANNELS: &[&str] = &["link", "email", "twitter", "facebook", "linkedin", "whatsapp"];

const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn generate_token<R: Rng>(rng: &mut R) -> String {
    (0..SHARE_TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

pub fn normalize_channel(channel: Option<&str>) -> DomainResult<String> {
    let channel = channel.map(|c| c.trim().to_lowercase()).unwrap_or_else(|| "link".into());
    if CHANNELS.contains(&channel.as_str()) {
        Ok(channel)
    } else {
        Err(DomainError::validation(format!("Unsupported share channel: {}", channel)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_shape() {
        let t = generate_token(&mut rand::thread_rng());
        assert_eq!(t.len(), 12);
        assert!(t.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn channel_defaults_to_link() {
        assert_eq!(normalize_channel(None).unwrap(), "link");
        assert_eq!(normalize_channel(Some(" Twitter ")).unwrap(), "twitter");
        assert!(normalize_channel(Some("fax")).is_err());
    }
}
