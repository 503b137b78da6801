//! Repository Implementation

use crate::StorageError;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::{debug, info};

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub created_at_ms: i64,
}

/// User fields supplied at signup
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: Option<String>,
}

/// Stored health profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProfileRecord {
    pub id: i64,
    pub user_id: i64,
    pub age: i32,
    pub gender: String,
    pub height: f64,
    pub weight: f64,
    pub bmi: f64,
    pub medical_conditions: Option<String>,
    pub stress_level: i32,
    pub glucose: i32,
    pub smoke: i32,
    pub alco: i32,
    pub active: i32,
}

/// Profile fields written on every submission
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileData {
    pub age: i32,
    pub gender: String,
    pub height: f64,
    pub weight: f64,
    pub bmi: f64,
    pub medical_conditions: Option<String>,
    pub stress_level: i32,
    pub glucose: i32,
    pub smoke: i32,
    pub alco: i32,
    pub active: i32,
}

/// Prediction history record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PredictionRecord {
    pub id: i64,
    pub user_id: i64,
    pub model_type: String,
    /// JSON snapshot of the model input
    pub input_data: String,
    pub risk_probability: f64,
    pub risk_label: String,
    pub timestamp_ms: i64,
}

/// Prediction fields supplied on insert
#[derive(Debug, Clone)]
pub struct NewPrediction {
    pub user_id: i64,
    pub model_type: String,
    pub input_data: String,
    pub risk_probability: f64,
    pub risk_label: String,
    pub timestamp_ms: i64,
}

/// Repository for data access
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Open (creating if missing) a SQLite database and run migrations
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        info!("Opening SQLite database at {}", url);
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        let repository = Self { pool };
        repository.migrate().await?;
        Ok(repository)
    }

    /// Create a private in-memory database (for testing)
    ///
    /// Every pooled connection to `sqlite::memory:` is a separate database,
    /// so the pool is pinned to a single connection that never expires.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let repository = Self { pool };
        repository.migrate().await?;
        Ok(repository)
    }

    async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        debug!("Database migrations applied");
        Ok(())
    }

    /// Check the database answers queries
    pub async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Insert a user; a taken email yields [`StorageError::Conflict`]
    pub async fn create_user(&self, user: &NewUser) -> Result<UserRecord, StorageError> {
        let id = sqlx::query(
            "INSERT INTO users (email, password_hash, full_name, phone_number, created_at_ms)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.phone_number)
        .bind(now_ms())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        debug!("Inserted user with ID {}", id);
        self.get_user(id).await
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: i64) -> Result<UserRecord, StorageError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, full_name, phone_number, created_at_ms
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// Find a user by email
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, full_name, phone_number, created_at_ms
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Get the profile owned by a user
    pub async fn get_profile(&self, user_id: i64) -> Result<Option<ProfileRecord>, StorageError> {
        let profile = sqlx::query_as::<_, ProfileRecord>(
            "SELECT id, user_id, age, gender, height, weight, bmi, medical_conditions,
                    stress_level, glucose, smoke, alco, active
             FROM profiles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    /// Create the user's profile, or overwrite every field of the existing one
    pub async fn upsert_profile(
        &self,
        user_id: i64,
        profile: &ProfileData,
    ) -> Result<ProfileRecord, StorageError> {
        sqlx::query(
            "INSERT INTO profiles (user_id, age, gender, height, weight, bmi, medical_conditions,
                                   stress_level, glucose, smoke, alco, active)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                age = excluded.age,
                gender = excluded.gender,
                height = excluded.height,
                weight = excluded.weight,
                bmi = excluded.bmi,
                medical_conditions = excluded.medical_conditions,
                stress_level = excluded.stress_level,
                glucose = excluded.glucose,
                smoke = excluded.smoke,
                alco = excluded.alco,
                active = excluded.active",
        )
        .bind(user_id)
        .bind(profile.age)
        .bind(&profile.gender)
        .bind(profile.height)
        .bind(profile.weight)
        .bind(profile.bmi)
        .bind(&profile.medical_conditions)
        .bind(profile.stress_level)
        .bind(profile.glucose)
        .bind(profile.smoke)
        .bind(profile.alco)
        .bind(profile.active)
        .execute(&self.pool)
        .await?;

        debug!("Upserted profile for user {}", user_id);
        self.get_profile(user_id).await?.ok_or(StorageError::NotFound)
    }

    /// Insert a prediction record
    pub async fn insert_prediction(&self, record: &NewPrediction) -> Result<i64, StorageError> {
        let id = sqlx::query(
            "INSERT INTO predictions (user_id, model_type, input_data, risk_probability,
                                      risk_label, timestamp_ms)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.user_id)
        .bind(&record.model_type)
        .bind(&record.input_data)
        .bind(record.risk_probability)
        .bind(&record.risk_label)
        .bind(record.timestamp_ms)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        debug!("Inserted prediction with ID {}", id);
        Ok(id)
    }

    /// Get a user's predictions, newest first
    pub async fn get_predictions(&self, user_id: i64) -> Result<Vec<PredictionRecord>, StorageError> {
        let records = sqlx::query_as::<_, PredictionRecord>(
            "SELECT id, user_id, model_type, input_data, risk_probability, risk_label, timestamp_ms
             FROM predictions
             WHERE user_id = ?
             ORDER BY timestamp_ms DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Get total prediction count
    pub async fn prediction_count(&self) -> Result<i64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM predictions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            full_name: "Ada Lovelace".to_string(),
            phone_number: Some("+15551234567".to_string()),
        }
    }

    fn profile(height: f64, weight: f64, bmi: f64) -> ProfileData {
        ProfileData {
            age: 40,
            gender: "female".to_string(),
            height,
            weight,
            bmi,
            medical_conditions: None,
            stress_level: 3,
            glucose: 1,
            smoke: 0,
            alco: 0,
            active: 1,
        }
    }

    fn prediction(user_id: i64, timestamp_ms: i64) -> NewPrediction {
        NewPrediction {
            user_id,
            model_type: "acute".to_string(),
            input_data: "{}".to_string(),
            risk_probability: 0.4,
            risk_label: "Moderate".to_string(),
            timestamp_ms,
        }
    }

    #[tokio::test]
    async fn test_user_insert_and_lookup() {
        let repo = Repository::in_memory().await.unwrap();
        let user = repo.create_user(&new_user("ada@example.com")).await.unwrap();
        assert_eq!(user.email, "ada@example.com");

        let found = repo.find_user_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(repo.find_user_by_email("bob@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = Repository::in_memory().await.unwrap();
        repo.create_user(&new_user("ada@example.com")).await.unwrap();

        let result = repo.create_user(&new_user("ada@example.com")).await;
        assert!(matches!(result, Err(StorageError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_profile_upsert_replaces_fields() {
        let repo = Repository::in_memory().await.unwrap();
        let user = repo.create_user(&new_user("ada@example.com")).await.unwrap();
        assert!(repo.get_profile(user.id).await.unwrap().is_none());

        let first = repo.upsert_profile(user.id, &profile(170.0, 70.0, 24.22)).await.unwrap();
        let second = repo.upsert_profile(user.id, &profile(170.0, 80.0, 27.68)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.weight, 80.0);
        assert_eq!(second.bmi, 27.68);
        assert_eq!(repo.get_profile(user.id).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_predictions_newest_first_and_scoped() {
        let repo = Repository::in_memory().await.unwrap();
        let ada = repo.create_user(&new_user("ada@example.com")).await.unwrap();
        let bob = repo.create_user(&new_user("bob@example.com")).await.unwrap();

        for ts in [2_000, 1_000, 3_000] {
            repo.insert_prediction(&prediction(ada.id, ts)).await.unwrap();
        }
        repo.insert_prediction(&prediction(bob.id, 5_000)).await.unwrap();

        let history = repo.get_predictions(ada.id).await.unwrap();
        let timestamps: Vec<i64> = history.iter().map(|p| p.timestamp_ms).collect();
        assert_eq!(timestamps, vec![3_000, 2_000, 1_000]);
        assert!(history.iter().all(|p| p.user_id == ada.id));

        assert_eq!(repo.get_predictions(bob.id).await.unwrap().len(), 1);
        assert_eq!(repo.prediction_count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_prediction_requires_existing_user() {
        let repo = Repository::in_memory().await.unwrap();
        assert!(repo.insert_prediction(&prediction(42, 1_000)).await.is_err());
    }
}
