use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User, users,
    util::{normalize_display_name, normalize_email, validate_password},
};

use super::{Engine, with_tx};

fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::PasswordHash(err.to_string()))
}

fn verify_password(hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

impl Engine {
    /// Register a new user. Emails are unique (case-insensitive).
    pub async fn register_user(&self, name: &str, email: &str, password: &str) -> ResultEngine<User> {
        let name = normalize_display_name(name, "user")?;
        let email = normalize_email(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        with_tx!(self, |db_tx| {
            let existing = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(email));
            }

            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                name: ActiveValue::Set(name),
                email: ActiveValue::Set(email),
                password_hash: ActiveValue::Set(password_hash),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!(user_id = %model.id, "registered user");
            Ok(User::from(model))
        })
    }

    /// Check credentials and return the matching user.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<User> {
        let invalid = || EngineError::Unauthorized("incorrect email or password".to_string());

        let email = normalize_email(email).map_err(|_| invalid())?;
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&model.password_hash, password) {
            tracing::debug!(user_id = %model.id, "password mismatch");
            return Err(invalid());
        }
        Ok(User::from(model))
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// All users, newest first.
    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        Ok(users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(User::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_only_the_same_password() {
        let hash = hash_password("secret-password").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "secret-password"));
        assert!(!verify_password(&hash, "wrong-password"));
        assert!(!verify_password("not a hash", "secret-password"));
    }
}
