//! Account lifecycle: registration, login, profile updates.

use std::sync::{Arc, OnceLock};

use crate::domain::{NewUser, NewUserRecord, Paginated, Pagination, UserPublic, UserUpdate};
use crate::error::DomainError;
use crate::ports::{PasswordService, TokenService, UserRepository};

const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 50;
const PASSWORD_MIN_LEN: usize = 6;

/// Hashed once and verified against when the username is unknown, so both
/// rejection paths pay the same hashing cost.
const DECOY_PASSWORD: &str = "quill-login-decoy";

pub struct UserService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
    decoy_hash: OnceLock<String>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
            decoy_hash: OnceLock::new(),
        }
    }

    /// Create an account. Username and email must both be unused.
    pub async fn register(&self, input: NewUser) -> Result<UserPublic, DomainError> {
        validate_username(&input.username)?;
        validate_email(&input.email)?;
        if input.password.chars().count() < PASSWORD_MIN_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {PASSWORD_MIN_LEN} characters"
            )));
        }

        if self.users.find_by_username(&input.username).await?.is_some() {
            return Err(DomainError::conflict("username already exists"));
        }
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(DomainError::conflict("email already exists"));
        }

        let password_hash = self.passwords.hash(&input.password)?;

        let user = self
            .users
            .create(NewUserRecord {
                username: input.username,
                email: input.email,
                password_hash,
                avatar: input.avatar,
                bio: input.bio,
            })
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user.into())
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown usernames and wrong passwords fail identically.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(String, UserPublic), DomainError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            self.passwords.verify(password, self.decoy_hash()?)?;
            tracing::debug!("Login rejected");
            return Err(DomainError::Unauthorized);
        };

        if !self.passwords.verify(password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Login rejected");
            return Err(DomainError::Unauthorized);
        }

        let token = self.tokens.issue(user.id)?;
        Ok((token, user.into()))
    }

    fn decoy_hash(&self) -> Result<&str, DomainError> {
        if let Some(hash) = self.decoy_hash.get() {
            return Ok(hash);
        }
        let hash = self.passwords.hash(DECOY_PASSWORD)?;
        Ok(self.decoy_hash.get_or_init(|| hash))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<UserPublic, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| DomainError::not_found("user", id))
    }

    /// Apply a partial profile update. A new email must not belong to anyone else.
    pub async fn update(&self, id: i64, input: UserUpdate) -> Result<UserPublic, DomainError> {
        let mut user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", id))?;

        if let Some(email) = input.email {
            validate_email(&email)?;
            if let Some(existing) = self.users.find_by_email(&email).await? {
                if existing.id != id {
                    return Err(DomainError::conflict("email already in use"));
                }
            }
            user.email = email;
        }
        input.avatar.apply_to(&mut user.avatar);
        input.bio.apply_to(&mut user.bio);

        let user = self.users.update(user).await?;
        Ok(user.into())
    }

    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        self.users
            .delete(id)
            .await
            .map_err(|e| super::delete_error(e, "user", id))?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    pub async fn list(&self, pagination: Pagination) -> Result<Paginated<UserPublic>, DomainError> {
        let users = self.users.list(pagination).await?;
        let total = self.users.count().await?;
        Ok(Paginated::new(users, total, pagination).map(Into::into))
    }
}

fn validate_username(username: &str) -> Result<(), DomainError> {
    let len = username.chars().count();
    if username.trim() != username || !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(DomainError::validation(format!(
            "username must be {USERNAME_MIN_LEN}-{USERNAME_MAX_LEN} characters without surrounding spaces"
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), DomainError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(DomainError::validation("invalid email address")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_bounds() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"a".repeat(50)).is_ok());
        assert!(validate_username(&"a".repeat(51)).is_err());
        assert!(validate_username(" alice").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("alice").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@").is_err());
    }
}
