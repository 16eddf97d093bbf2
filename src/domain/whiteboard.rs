use crate::shared::errors::{DomainError, DomainResult};

/// Locked boards only accept actions from their creator.
pub fn ensure_can_draw(is_locked: bool, created_by: &str, user_id: &str) -> DomainResult<()> {
    if is_locked && created_by != user_id {
        Err(DomainError::forbidden("Whiteboard is locked"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_allows_creator_only() {
        assert!(ensure_can_draw(true, "u1", "u1").is_ok());
        assert!(ensure_can_draw(true, "u1", "u2").is_err());
        assert!(ensure_can_draw(false, "u1", "u2").is_ok());
    }
}
