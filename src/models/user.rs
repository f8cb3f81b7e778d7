use libsql::params::Params;
use libsql::{Connection, Value};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{fetch_all, fetch_optional, now_ts};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Artist,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Artist => "artist",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "buyer" => Some(Role::Buyer),
            "artist" => Some(Role::Artist),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_ts: i64,
    pub updated_ts: i64,
}

const COLUMNS: &str = "id, email, password_hash, name, role, is_active, created_ts, updated_ts";

impl User {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            name: row.get(3)?,
            role: row.get(4)?,
            is_active: row.get::<i64>(5)? != 0,
            created_ts: row.get(6)?,
            updated_ts: row.get(7)?,
        })
    }

    pub fn get_role(&self) -> Role {
        Role::parse(&self.role).unwrap_or(Role::Buyer)
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.email.clone())
    }
}

#[derive(Debug)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub role: Role,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {
    pub role: Option<String>,
    pub q: Option<String>,
}

impl User {
    pub async fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Self>> {
        fetch_optional(
            conn,
            &format!("SELECT {COLUMNS} FROM users WHERE id = ?"),
            [id],
            Self::from_row,
        )
        .await
    }

    pub async fn find_by_email(conn: &Connection, email: &str) -> AppResult<Option<Self>> {
        fetch_optional(
            conn,
            &format!("SELECT {COLUMNS} FROM users WHERE email = ?"),
            [email.trim().to_lowercase()],
            Self::from_row,
        )
        .await
    }

    pub async fn create(conn: &Connection, data: CreateUser) -> AppResult<Self> {
        let email = data.email.trim().to_lowercase();
        if Self::find_by_email(conn, &email).await?.is_some() {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let now = now_ts();
        conn.execute(
            "INSERT INTO users (id, email, password_hash, name, role, is_active, created_ts, updated_ts) VALUES (?, ?, ?, ?, ?, 1, ?, ?)",
            libsql::params![id.clone(), email, data.password_hash, data.name, data.role.as_str(), now, now],
        )
        .await?;

        Self::find_by_id(conn, &id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to create user".to_string()))
    }

    pub async fn list(conn: &Connection, filter: &UserFilter) -> AppResult<Vec<Self>> {
        let mut sql = format!("SELECT {COLUMNS} FROM users WHERE 1 = 1");
        let mut params: Vec<Value> = Vec::new();

        if let Some(role) = filter.role.as_deref().filter(|r| !r.is_empty()) {
            sql.push_str(" AND role = ?");
            params.push(Value::Text(role.to_string()));
        }
        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = crate::services::catalogue::like_pattern(q);
            sql.push_str(" AND (email LIKE ? ESCAPE '\\' OR name LIKE ? ESCAPE '\\')");
            params.push(Value::Text(pattern.clone()));
            params.push(Value::Text(pattern));
        }
        sql.push_str(" ORDER BY created_ts DESC");

        fetch_all(conn, &sql, Params::Positional(params), Self::from_row).await
    }

    pub async fn set_role(conn: &Connection, id: &str, role: Role) -> AppResult<Self> {
        conn.execute(
            "UPDATE users SET role = ?, updated_ts = ? WHERE id = ?",
            libsql::params![role.as_str(), now_ts(), id.to_string()],
        )
        .await?;

        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn set_active(conn: &Connection, id: &str, is_active: bool) -> AppResult<Self> {
        conn.execute(
            "UPDATE users SET is_active = ?, updated_ts = ? WHERE id = ?",
            libsql::params![is_active as i64, now_ts(), id.to_string()],
        )
        .await?;

        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn count_all(conn: &Connection) -> AppResult<i64> {
        crate::db::fetch_i64(conn, "SELECT COUNT(*) FROM users", ()).await
    }
}
