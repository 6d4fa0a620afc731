use rand::{distributions::Alphanumeric, Rng};
use crate::domain::{
    models::{guest::Guest, senior::Senior},
    ports::{GuestRepository, SeniorRepository}
};
use crate::error::AppError;

pub const SHARE_TOKEN_LEN: usize = 24;
pub const TICKET_TOKEN_LEN: usize = 32;

pub fn generate_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Returns the senior's share token, creating it on first use.
///
/// If two callers race, the first stored token wins and both see it.
pub async fn ensure_share_token(repo: &dyn SeniorRepository, senior: Senior) -> Result<Senior, AppError> {
    if senior.share_token.is_some() {
        return Ok(senior);
    }

    let candidate = generate_token(SHARE_TOKEN_LEN);
    if let Some(updated) = repo.set_share_token_if_absent(&senior.id, &candidate).await? {
        return Ok(updated);
    }

    repo.find_by_id(&senior.id).await?
        .ok_or(AppError::NotFound("Senior not found".into()))
}

/// Returns the guest's ticket token, creating it on first use.
pub async fn ensure_ticket_token(repo: &dyn GuestRepository, guest: Guest) -> Result<Guest, AppError> {
    if guest.ticket_token.is_some() {
        return Ok(guest);
    }

    let candidate = generate_token(TICKET_TOKEN_LEN);
    if let Some(updated) = repo.set_ticket_token_if_absent(&guest.id, &candidate).await? {
        return Ok(updated);
    }

    repo.find_by_id(&guest.id).await?
        .ok_or(AppError::NotFound("Guest not found".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tokens_are_alphanumeric_and_distinct() {
        let tokens: HashSet<String> = (0..200).map(|_| generate_token(TICKET_TOKEN_LEN)).collect();
        assert_eq!(tokens.len(), 200);
        assert!(tokens.iter().all(|t| t.len() == TICKET_TOKEN_LEN && t.chars().all(|c| c.is_ascii_alphanumeric())));
    }
}
