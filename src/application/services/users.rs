//! Accounts and authentication

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use tracing::info;

use super::{new_id, required};
use crate::config::AdminConfig;
use crate::domain::user::MIN_PASSWORD_LEN;
use crate::domain::{Actor, UserRole};
use crate::infrastructure::crypto::password::{hash_password_with_cost, verify_password};
use crate::infrastructure::crypto::{create_token, JwtConfig};
use crate::infrastructure::database::entities::user;
use crate::shared::errors::{DomainError, DomainResult};
use crate::shared::pagination::{PaginatedResult, PaginationParams};

#[derive(Debug, Clone, Serialize)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: user::Model,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
    /// Only STUDENT and TEACHER may self-register
    pub role: UserRole,
}

pub struct UserService {
    db: DatabaseConnection,
    jwt: JwtConfig,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(db: DatabaseConnection, jwt: JwtConfig, bcrypt_cost: u32) -> Self {
        Self {
            db,
            jwt,
            bcrypt_cost,
        }
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt
    }

    pub async fn register(&self, input: Registration) -> DomainResult<user::Model> {
        if input.role == UserRole::Admin {
            return Err(DomainError::forbidden("Admin accounts cannot self-register"));
        }
        self.create(input).await
    }

    async fn create(&self, input: Registration) -> DomainResult<user::Model> {
        let email = required("email", &input.email)?.to_lowercase();
        let username = required("username", &input.username)?;
        if !email.contains('@') {
            return Err(DomainError::validation("Invalid email address"));
        }
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let taken = user::Entity::find()
            .filter(
                user::Column::Email
                    .eq(email.as_str())
                    .or(user::Column::Username.eq(username.as_str())),
            )
            .one(&self.db)
            .await?;
        if let Some(existing) = taken {
            let what = if existing.email == email { "Email" } else { "Username" };
            return Err(DomainError::Conflict(format!("{} already exists", what)));
        }

        let password_hash = hash_password_with_cost(&input.password, self.bcrypt_cost)
            .map_err(|e| DomainError::validation(format!("Failed to hash password: {}", e)))?;

        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(new_id()),
            email: Set(email),
            username: Set(username),
            password_hash: Set(password_hash),
            role: Set(input.role),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            last_login_at: Set(None),
        }
        .insert(&self.db)
        .await?;

        info!(user_id = %model.id, role = %model.role, "User registered");
        Ok(model)
    }

    /// Authenticate by username or email.
    pub async fn login(&self, login: &str, password: &str) -> DomainResult<AuthResult> {
        let found = user::Entity::find()
            .filter(
                user::Column::Username
                    .eq(login)
                    .or(user::Column::Email.eq(login.to_lowercase())),
            )
            .one(&self.db)
            .await?;
        let Some(found) = found else {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        };
        if !found.is_active {
            return Err(DomainError::Unauthorized("Account is disabled".into()));
        }
        if !verify_password(password, &found.password_hash).unwrap_or(false) {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        let mut active: user::ActiveModel = found.into();
        active.last_login_at = Set(Some(Utc::now()));
        let found = active.update(&self.db).await?;

        let token = create_token(&found.id, &found.username, found.role.as_str(), &self.jwt)
            .map_err(|e| DomainError::validation(format!("Failed to create token: {}", e)))?;

        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt.expiration_hours * 3600,
            user: found,
        })
    }

    pub async fn get(&self, user_id: &str) -> DomainResult<user::Model> {
        user::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))
    }

    pub async fn list(
        &self,
        actor: &Actor,
        role: Option<UserRole>,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<user::Model>> {
        actor.ensure_admin()?;
        let mut query = user::Entity::find().order_by_asc(user::Column::CreatedAt);
        if let Some(role) = role {
            query = query.filter(user::Column::Role.eq(role));
        }
        let paginator = query.paginate(&self.db, page.limit as u64);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page((page.page - 1) as u64).await?;
        Ok(PaginatedResult::new(items, total, page.page, page.limit))
    }

    pub async fn set_role(&self, actor: &Actor, user_id: &str, role: UserRole) -> DomainResult<user::Model> {
        actor.ensure_admin()?;
        let mut active: user::ActiveModel = self.get(user_id).await?.into();
        active.role = Set(role);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    pub async fn set_active(&self, actor: &Actor, user_id: &str, is_active: bool) -> DomainResult<user::Model> {
        actor.ensure_admin()?;
        let mut active: user::ActiveModel = self.get(user_id).await?.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    /// Create the configured admin when no users exist yet.
    pub async fn ensure_default_admin(&self, admin: &AdminConfig) -> DomainResult<Option<user::Model>> {
        if user::Entity::find().count(&self.db).await? > 0 {
            return Ok(None);
        }
        let created = self
            .create(Registration {
                email: admin.email.clone(),
                username: admin.username.clone(),
                password: admin.password.clone(),
                role: UserRole::Admin,
            })
            .await?;
        info!(username = %created.username, "Default admin created");
        Ok(Some(created))
    }
}
