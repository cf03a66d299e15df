use async_trait::async_trait;
use catalog_authz::Role;
use catalog_db::{map_sqlx_error, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{NewUser, UserRecord};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Case-insensitive lookup by login email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Fails with [`StoreError::Unique`] when the email is taken.
    async fn create(&self, user: &NewUser) -> Result<UserRecord, StoreError>;

    /// Grant `role` to the user; granting a held role is a no-op.
    async fn add_role(&self, user_id: &str, role: Role) -> Result<(), StoreError>;

    /// Make sure every role in `roles` exists.
    async fn ensure_roles(&self, roles: &[Role]) -> Result<(), StoreError>;

    async fn list_roles(&self) -> Result<Vec<Role>, StoreError>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn roles_of(&self, user_id: Uuid) -> Result<Vec<Role>, StoreError> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT role_name FROM user_roles WHERE user_id = $1 ORDER BY role_name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(parse_roles(&names))
    }

    async fn hydrate(&self, row: Option<UserRow>) -> Result<Option<UserRecord>, StoreError> {
        match row {
            Some(row) => {
                let roles = self.roles_of(row.id).await?;
                Ok(Some(row.into_record(roles)))
            }
            None => Ok(None),
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    full_name: String,
    password_hash: String,
}

impl UserRow {
    fn into_record(self, mut roles: Vec<Role>) -> UserRecord {
        roles.sort();
        UserRecord {
            id: self.id.to_string(),
            email: self.email,
            full_name: self.full_name,
            password_hash: self.password_hash,
            roles,
        }
    }
}

fn parse_roles(names: &[String]) -> Vec<Role> {
    names
        .iter()
        .filter_map(|name| {
            let role = Role::parse(name);
            if role.is_none() {
                tracing::warn!(role = %name, "ignoring unknown stored role");
            }
            role
        })
        .collect()
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, full_name, password_hash
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        self.hydrate(row).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, full_name, password_hash FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        self.hydrate(row).await
    }

    async fn create(&self, user: &NewUser) -> Result<UserRecord, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, full_name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, full_name, password_hash
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        for role in &user.roles {
            sqlx::query(
                "INSERT INTO user_roles (user_id, role_name) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(user.id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(row.into_record(user.roles.clone()))
    }

    async fn add_role(&self, user_id: &str, role: Role) -> Result<(), StoreError> {
        let user_id = Uuid::parse_str(user_id)
            .map_err(|e| StoreError::Backend(format!("malformed user id: {e}")))?;

        sqlx::query(
            "INSERT INTO user_roles (user_id, role_name) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn ensure_roles(&self, roles: &[Role]) -> Result<(), StoreError> {
        for role in roles {
            sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT DO NOTHING")
                .bind(role.as_str())
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        Ok(())
    }

    async fn list_roles(&self) -> Result<Vec<Role>, StoreError> {
        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let mut roles = parse_roles(&names);
        roles.sort();
        Ok(roles)
    }
}
