//! Activity recorder service
//!
//! Manual activity bookkeeping with bilingual labels and `DD/MM/YYYY`
//! dates, the recent-activity feed for the home page, and best-effort
//! logging of activities mentioned in chat.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    activity_description, activity_label, format_activity_date, parse_activity_datetime,
    validate_non_negative, validate_success_rating, ActivitySource, ActivityStatus, Bilingual,
};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::services::farm::FarmService;

/// Number of entries in the home page feed
const RECENT_LIMIT: i64 = 10;

/// Longest chat message stored as activity details
const CHAT_DETAILS_MAX_CHARS: usize = 500;

#[derive(Clone)]
pub struct ActivityService {
    db: PgPool,
}

/// Activity record as stored
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Activity {
    pub id: i64,
    pub farm_id: i64,
    pub crop_id: Option<i64>,
    pub activity_type: String,
    pub date: NaiveDateTime,
    pub details: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub labor_hours: Decimal,
    pub weather_conditions: Option<String>,
    pub success_rating: Option<i32>,
    pub notes: Option<String>,
    pub is_completed: bool,
    pub created_by: String,
    pub date_created: DateTime<Utc>,
}

/// Activity joined with its farm and optional crop
#[derive(Debug, Clone, sqlx::FromRow)]
struct ActivityJoinRow {
    id: i64,
    activity_type: String,
    date: NaiveDateTime,
    details: Option<String>,
    cost: Decimal,
    labor_hours: Decimal,
    is_completed: bool,
    farm_name: Option<String>,
    farm_size: Decimal,
    crop_name: Option<String>,
    crop_area: Option<Decimal>,
}

/// Activity list entry
#[derive(Debug, Serialize)]
pub struct ActivityView {
    pub id: i64,
    pub name: Bilingual,
    pub date: String,
    pub status: ActivityStatus,
    pub description: Bilingual,
    pub farm_name: String,
    pub crop_name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub labor_hours: Decimal,
}

/// Home page feed entry
#[derive(Debug, Serialize)]
pub struct RecentActivity {
    pub id: i64,
    pub name: Bilingual,
    pub date: String,
    pub time: String,
    pub status: ActivityStatus,
    pub crop: String,
    pub area: String,
    pub details: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub labor_hours: Decimal,
}

/// Input for logging an activity
#[derive(Debug, Deserialize)]
pub struct CreateActivityInput {
    pub farm_id: i64,
    #[serde(default)]
    pub activity_type: String,
    /// `DD/MM/YYYY`; defaults to now
    pub date: Option<String>,
    pub details: Option<String>,
    pub cost: Option<Decimal>,
    pub labor_hours: Option<Decimal>,
    pub crop_id: Option<i64>,
    pub status: Option<String>,
    pub success_rating: Option<i32>,
    pub weather_conditions: Option<String>,
    pub notes: Option<String>,
}

/// Partial activity update
#[derive(Debug, Default, Deserialize)]
pub struct UpdateActivityInput {
    pub activity_type: Option<String>,
    pub details: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,
    pub cost: Option<Decimal>,
    pub labor_hours: Option<Decimal>,
    pub success_rating: Option<i32>,
    pub weather_conditions: Option<String>,
    pub notes: Option<String>,
}

const ACTIVITY_COLUMNS: &str = "id, farm_id, crop_id, activity_type, date, details, cost, \
     labor_hours, weather_conditions, success_rating, notes, is_completed, created_by, date_created";

const JOINED_SELECT: &str = r#"
    SELECT a.id, a.activity_type, a.date, a.details, a.cost, a.labor_hours, a.is_completed,
           f.name AS farm_name, f.size AS farm_size,
           c.name AS crop_name, c.area_planted AS crop_area
    FROM activities a
    JOIN farms f ON f.id = a.farm_id
    LEFT JOIN crops c ON c.id = a.crop_id
    ORDER BY a.date DESC, a.id DESC
"#;

fn parse_date(value: &str) -> AppResult<NaiveDateTime> {
    parse_activity_datetime(value)
        .map_err(|msg| AppError::invalid("date", msg, "തീയതി DD/MM/YYYY രൂപത്തിൽ നൽകുക"))
}

fn check_amounts(
    cost: Option<Decimal>,
    labor_hours: Option<Decimal>,
    rating: Option<i32>,
) -> AppResult<()> {
    if let Some(cost) = cost {
        validate_non_negative(cost)
            .map_err(|msg| AppError::invalid("cost", msg, "ചെലവ് നെഗറ്റീവ് ആകരുത്"))?;
    }
    if let Some(hours) = labor_hours {
        validate_non_negative(hours)
            .map_err(|msg| AppError::invalid("labor_hours", msg, "തൊഴിൽ സമയം നെഗറ്റീവ് ആകരുത്"))?;
    }
    if let Some(rating) = rating {
        validate_success_rating(rating).map_err(|msg| {
            AppError::invalid("success_rating", msg, "വിജയ റേറ്റിംഗ് 1 മുതൽ 5 വരെ ആയിരിക്കണം")
        })?;
    }
    Ok(())
}

/// Area shown in the feed: the crop's planted area, else the farm size
fn area_text(crop_area: Option<Decimal>, farm_size: Decimal) -> String {
    match crop_area {
        Some(area) if !area.is_zero() => format!("{} acres", area),
        _ if !farm_size.is_zero() => format!("~{} acres", farm_size),
        _ => String::new(),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

impl ActivityService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Every activity, newest first, with bilingual labels
    pub async fn list_activities(&self) -> AppResult<Vec<ActivityView>> {
        let rows = sqlx::query_as::<_, ActivityJoinRow>(JOINED_SELECT)
            .fetch_all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ActivityView {
                id: row.id,
                name: activity_label(&row.activity_type),
                date: format_activity_date(row.date),
                status: ActivityStatus::from_completed(row.is_completed),
                description: activity_description(&row.activity_type, row.details.as_deref()),
                farm_name: row.farm_name.unwrap_or_else(|| "Farm".to_string()),
                crop_name: row.crop_name,
                cost: row.cost,
                labor_hours: row.labor_hours,
            })
            .collect())
    }

    /// The ten latest activities for the home page
    pub async fn recent_activities(&self) -> AppResult<Vec<RecentActivity>> {
        let rows = sqlx::query_as::<_, ActivityJoinRow>(&format!(
            "{} LIMIT {}",
            JOINED_SELECT, RECENT_LIMIT
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| RecentActivity {
                id: row.id,
                name: activity_label(&row.activity_type),
                date: row.date.format("%Y-%m-%d").to_string(),
                time: row.date.format("%H:%M").to_string(),
                status: ActivityStatus::from_completed(row.is_completed),
                area: area_text(row.crop_area, row.farm_size),
                crop: row.crop_name.unwrap_or_else(|| "General".to_string()),
                details: row.details,
                cost: row.cost,
                labor_hours: row.labor_hours,
            })
            .collect())
    }

    /// Raw records for one farm, newest first
    pub async fn activities_for_farm(&self, farm_id: i64) -> AppResult<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(&format!(
            "SELECT {} FROM activities WHERE farm_id = $1 ORDER BY date DESC, id DESC",
            ACTIVITY_COLUMNS
        ))
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(activities)
    }

    pub async fn get_activity(&self, activity_id: i64) -> AppResult<Activity> {
        sqlx::query_as::<_, Activity>(&format!(
            "SELECT {} FROM activities WHERE id = $1",
            ACTIVITY_COLUMNS
        ))
        .bind(activity_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Activity".to_string()))
    }

    /// Log a manual activity and return its id
    pub async fn create_activity(&self, input: CreateActivityInput) -> AppResult<i64> {
        let activity_type = input.activity_type.trim();
        if activity_type.is_empty() {
            return Err(AppError::invalid(
                "activity_type",
                "Activity type is required",
                "പ്രവർത്തന തരം ആവശ്യമാണ്",
            ));
        }

        let date = match input.date.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(value) => parse_date(value)?,
            None => Utc::now().naive_utc(),
        };
        check_amounts(input.cost, input.labor_hours, input.success_rating)?;

        FarmService::new(self.db.clone()).find_farm(input.farm_id).await?;
        if let Some(crop_id) = input.crop_id {
            self.check_crop(input.farm_id, crop_id).await?;
        }

        let is_completed = input
            .status
            .as_deref()
            .map(ActivityStatus::is_completed_str)
            .unwrap_or(false);

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO activities (farm_id, crop_id, activity_type, date, details, cost,
                                    labor_hours, weather_conditions, success_rating, notes,
                                    is_completed, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(input.farm_id)
        .bind(input.crop_id)
        .bind(activity_type)
        .bind(date)
        .bind(&input.details)
        .bind(input.cost.unwrap_or(Decimal::ZERO))
        .bind(input.labor_hours.unwrap_or(Decimal::ZERO))
        .bind(&input.weather_conditions)
        .bind(input.success_rating)
        .bind(&input.notes)
        .bind(is_completed)
        .bind(ActivitySource::Manual.as_str())
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Logged {} activity {} on farm {}", activity_type, id, input.farm_id);
        Ok(id)
    }

    /// Crop must exist; a crop from another farm is accepted but flagged
    async fn check_crop(&self, farm_id: i64, crop_id: i64) -> AppResult<()> {
        let crop_farm = sqlx::query_scalar::<_, i64>("SELECT farm_id FROM crops WHERE id = $1")
            .bind(crop_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Crop".to_string()))?;

        if crop_farm != farm_id {
            tracing::warn!(
                "Activity on farm {} references crop {} of farm {}",
                farm_id,
                crop_id,
                crop_farm
            );
        }
        Ok(())
    }

    /// Apply a partial update
    pub async fn update_activity(
        &self,
        activity_id: i64,
        input: UpdateActivityInput,
    ) -> AppResult<Activity> {
        let date = input.date.as_deref().map(parse_date).transpose()?;
        check_amounts(input.cost, input.labor_hours, input.success_rating)?;
        if input
            .activity_type
            .as_deref()
            .map(|t| t.trim().is_empty())
            .unwrap_or(false)
        {
            return Err(AppError::invalid(
                "activity_type",
                "Activity type cannot be empty",
                "പ്രവർത്തന തരം ശൂന്യമാകരുത്",
            ));
        }

        let existing = self.get_activity(activity_id).await?;

        let is_completed = input
            .status
            .as_deref()
            .map(ActivityStatus::is_completed_str)
            .unwrap_or(existing.is_completed);

        let activity = sqlx::query_as::<_, Activity>(&format!(
            r#"
            UPDATE activities
            SET activity_type = $1, details = $2, date = $3, is_completed = $4, cost = $5,
                labor_hours = $6, success_rating = $7, weather_conditions = $8, notes = $9
            WHERE id = $10
            RETURNING {}
            "#,
            ACTIVITY_COLUMNS
        ))
        .bind(
            input
                .activity_type
                .map(|t| t.trim().to_string())
                .unwrap_or(existing.activity_type),
        )
        .bind(input.details.or(existing.details))
        .bind(date.unwrap_or(existing.date))
        .bind(is_completed)
        .bind(input.cost.unwrap_or(existing.cost))
        .bind(input.labor_hours.unwrap_or(existing.labor_hours))
        .bind(input.success_rating.or(existing.success_rating))
        .bind(input.weather_conditions.or(existing.weather_conditions))
        .bind(input.notes.or(existing.notes))
        .bind(activity_id)
        .fetch_one(&self.db)
        .await?;

        Ok(activity)
    }

    pub async fn delete_activity(&self, activity_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(activity_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Activity".to_string()));
        }
        Ok(())
    }

    /// Record an activity mentioned in chat on the most recently created
    /// active farm. Returns `None` when no farm exists.
    pub async fn log_from_chat(&self, activity_type: &str, message: &str) -> AppResult<Option<i64>> {
        let farm_id = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM farms WHERE is_active ORDER BY date_created DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.db)
        .await?;

        let Some(farm_id) = farm_id else {
            tracing::debug!("No active farm to attach chat activity to");
            return Ok(None);
        };

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO activities (farm_id, activity_type, details, is_completed, created_by)
            VALUES ($1, $2, $3, TRUE, $4)
            RETURNING id
            "#,
        )
        .bind(farm_id)
        .bind(activity_type)
        .bind(truncate_chars(message.trim(), CHAT_DETAILS_MAX_CHARS))
        .bind(ActivitySource::Chat.as_str())
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Logged {} activity {} from chat", activity_type, id);
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_prefers_crop_area() {
        assert_eq!(area_text(Some(Decimal::new(150, 2)), Decimal::new(3, 0)), "1.50 acres");
        assert_eq!(area_text(None, Decimal::new(3, 0)), "~3 acres");
        assert_eq!(area_text(Some(Decimal::ZERO), Decimal::new(25, 1)), "~2.5 acres");
    }

    #[test]
    fn bad_date_is_validation_error() {
        assert!(matches!(parse_date("2024-03-25"), Err(AppError::Validation { .. })));
        let parsed = parse_date("25/03/2024").unwrap();
        assert_eq!(format_activity_date(parsed), "25/03/2024");
    }

    #[test]
    fn rating_and_amounts_are_checked() {
        assert!(check_amounts(None, None, Some(6)).is_err());
        assert!(check_amounts(Some(Decimal::NEGATIVE_ONE), None, None).is_err());
        assert!(check_amounts(Some(Decimal::ZERO), Some(Decimal::ONE), Some(5)).is_ok());
    }

    #[test]
    fn chat_details_are_truncated_on_char_boundary() {
        let text = "മഴ".repeat(400);
        assert_eq!(truncate_chars(&text, 10).chars().count(), 10);
    }
}
