//! Farmer registration and profile service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validate_phone_number;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::farm::{FarmService, FarmWithNames};

/// Farmer service for registration and profile management
#[derive(Clone)]
pub struct FarmerService {
    db: PgPool,
}

/// Farmer record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Farmer {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub date_created: DateTime<Utc>,
    pub is_active: bool,
}

/// Farmer with every farm and the names grown or kept there
#[derive(Debug, Serialize)]
pub struct FarmerProfile {
    pub farmer: Farmer,
    pub farms: Vec<FarmWithNames>,
}

/// Input for registering a farmer
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFarmerInput {
    #[serde(default)]
    #[validate(length(max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub phone_number: String,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Partial profile update; absent keys keep their stored value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub phone_number: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

const FARMER_COLUMNS: &str =
    "id, name, phone_number, email, address, date_created, is_active";

impl FarmerService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All farmers, oldest first
    pub async fn list_farmers(&self) -> AppResult<Vec<Farmer>> {
        let farmers = sqlx::query_as::<_, Farmer>(&format!(
            "SELECT {} FROM farmers ORDER BY id ASC",
            FARMER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(farmers)
    }

    pub async fn get_farmer(&self, farmer_id: i64) -> AppResult<Farmer> {
        sqlx::query_as::<_, Farmer>(&format!(
            "SELECT {} FROM farmers WHERE id = $1",
            FARMER_COLUMNS
        ))
        .bind(farmer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farmer".to_string()))
    }

    /// Register a farmer
    pub async fn create_farmer(&self, input: CreateFarmerInput) -> AppResult<Farmer> {
        let name = input.name.trim();
        let phone = input.phone_number.trim();

        if name.is_empty() || phone.is_empty() {
            return Err(AppError::invalid(
                "name",
                "Name and phone number are required",
                "പേരും ഫോൺ നമ്പറും ആവശ്യമാണ്",
            ));
        }
        input.validate()?;
        validate_phone_number(phone).map_err(|msg| {
            AppError::invalid("phone_number", msg, "ഫോൺ നമ്പർ അസാധുവാണ്")
        })?;

        self.ensure_unique(phone, input.email.as_deref(), None).await?;

        let farmer = sqlx::query_as::<_, Farmer>(&format!(
            r#"
            INSERT INTO farmers (name, phone_number, email, address)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            FARMER_COLUMNS
        ))
        .bind(name)
        .bind(phone)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Registered farmer {} ({})", farmer.id, farmer.name);
        Ok(farmer)
    }

    /// Delete a farmer together with their farms and everything on them
    pub async fn delete_farmer(&self, farmer_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM farmers WHERE id = $1")
            .bind(farmer_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Farmer".to_string()));
        }

        tracing::info!("Deleted farmer {}", farmer_id);
        Ok(())
    }

    pub async fn get_profile(&self, farmer_id: i64) -> AppResult<FarmerProfile> {
        let farmer = self.get_farmer(farmer_id).await?;
        let farms = FarmService::new(self.db.clone())
            .farms_for_farmer(farmer_id)
            .await?;

        Ok(FarmerProfile { farmer, farms })
    }

    /// Apply a partial update to the farmer record
    pub async fn update_profile(
        &self,
        farmer_id: i64,
        input: UpdateProfileInput,
    ) -> AppResult<FarmerProfile> {
        input.validate()?;
        let existing = self.get_farmer(farmer_id).await?;

        if let Some(ref phone) = input.phone_number {
            validate_phone_number(phone).map_err(|msg| {
                AppError::invalid("phone_number", msg, "ഫോൺ നമ്പർ അസാധുവാണ്")
            })?;
        }

        let phone = input.phone_number.unwrap_or(existing.phone_number);
        let email = input.email.or(existing.email);
        self.ensure_unique(&phone, email.as_deref(), Some(farmer_id))
            .await?;

        let name = input.name.unwrap_or(existing.name);
        let address = input.address.or(existing.address);
        let is_active = input.is_active.unwrap_or(existing.is_active);

        sqlx::query(
            r#"
            UPDATE farmers
            SET name = $1, phone_number = $2, email = $3, address = $4, is_active = $5
            WHERE id = $6
            "#,
        )
        .bind(&name)
        .bind(&phone)
        .bind(&email)
        .bind(&address)
        .bind(is_active)
        .bind(farmer_id)
        .execute(&self.db)
        .await?;

        self.get_profile(farmer_id).await
    }

    async fn ensure_unique(
        &self,
        phone: &str,
        email: Option<&str>,
        exclude_id: Option<i64>,
    ) -> AppResult<()> {
        let exclude = exclude_id.unwrap_or(0);

        let phone_taken = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM farmers WHERE phone_number = $1 AND id != $2",
        )
        .bind(phone)
        .bind(exclude)
        .fetch_one(&self.db)
        .await?;

        if phone_taken > 0 {
            return Err(AppError::DuplicateEntry("phone_number".to_string()));
        }

        if let Some(email) = email {
            let email_taken = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM farmers WHERE LOWER(email) = LOWER($1) AND id != $2",
            )
            .bind(email)
            .bind(exclude)
            .fetch_one(&self.db)
            .await?;

            if email_taken > 0 {
                return Err(AppError::DuplicateEntry("email".to_string()));
            }
        }

        Ok(())
    }
}
