//! Account registration and authentication for both account kinds.

use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, password, providers, users};

use super::{Engine, require_field, with_tx};

/// Signup data for a service requester.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password: String,
}

/// Signup data for a service fulfiller.
#[derive(Clone, Debug)]
pub struct NewProvider {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub work: String,
    pub password: String,
}

/// Generates an `authenticate_*` method for an account entity.
///
/// Both account kinds verify the same way: look the row up by email,
/// check the candidate against the stored credential (hashed or legacy
/// plaintext), and rehash legacy rows in place on success. A missing row
/// and a wrong password are indistinguishable to the caller.
macro_rules! impl_authenticate {
    ($fn_name:ident, $entity:ident) => {
        pub async fn $fn_name(
            &self,
            email: &str,
            candidate: &str,
        ) -> ResultEngine<$entity::Model> {
            with_tx!(self, |db_tx| {
                let account = $entity::Entity::find()
                    .filter($entity::Column::Email.eq(email))
                    .one(&db_tx)
                    .await?
                    .ok_or(EngineError::InvalidCredentials)?;

                let stored = password::StoredPassword::parse(&account.password);
                if !stored.verify(candidate)? {
                    return Err(EngineError::InvalidCredentials);
                }

                // One-way upgrade path for rows created before hashing.
                let account = if stored.needs_rehash() {
                    let rehashed = password::hash(candidate)?;
                    let mut active: $entity::ActiveModel = account.into();
                    active.password = ActiveValue::Set(rehashed);
                    active.update(&db_tx).await?
                } else {
                    account
                };
                Ok(account)
            })
        }
    };
}

impl Engine {
    /// Register a new user account, hashing the password.
    ///
    /// Fails with [`EngineError::ExistingKey`] when the email is taken and
    /// [`EngineError::MissingField`] when a required field is empty.
    pub async fn register_user(&self, new: NewUser) -> ResultEngine<i64> {
        require_field(&new.name, "name")?;
        require_field(&new.email, "email")?;
        require_field(&new.phone, "phone")?;
        require_field(&new.address, "address")?;
        require_field(&new.password, "password")?;

        let hashed = password::hash(&new.password)?;
        with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::Email.eq(new.email.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(new.email));
            }

            let inserted = users::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(new.name),
                email: ActiveValue::Set(new.email),
                password: ActiveValue::Set(hashed),
                phone: ActiveValue::Set(new.phone),
                address: ActiveValue::Set(new.address),
            }
            .insert(&db_tx)
            .await?;
            Ok(inserted.id)
        })
    }

    /// Register a new provider account, hashing the password.
    pub async fn register_provider(&self, new: NewProvider) -> ResultEngine<i64> {
        require_field(&new.name, "name")?;
        require_field(&new.email, "email")?;
        require_field(&new.phone, "phone")?;
        require_field(&new.address, "address")?;
        require_field(&new.work, "work")?;
        require_field(&new.password, "password")?;

        let hashed = password::hash(&new.password)?;
        with_tx!(self, |db_tx| {
            let exists = providers::Entity::find()
                .filter(providers::Column::Email.eq(new.email.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(new.email));
            }

            let inserted = providers::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(new.name),
                email: ActiveValue::Set(new.email),
                password: ActiveValue::Set(hashed),
                work: ActiveValue::Set(new.work),
                phone: ActiveValue::Set(new.phone),
                address: ActiveValue::Set(new.address),
            }
            .insert(&db_tx)
            .await?;
            Ok(inserted.id)
        })
    }

    impl_authenticate!(authenticate_user, users);

    impl_authenticate!(authenticate_provider, providers);
}
