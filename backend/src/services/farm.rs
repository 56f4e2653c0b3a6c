//! Farm, crop and livestock management service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    invalid_crops, invalid_livestock, validate_coordinates, validate_farm_size, CropStatus,
    DEFAULT_HEALTH_STATUS,
};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashSet;
use std::str::FromStr;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Farm service for farms and the crops and livestock on them
#[derive(Clone)]
pub struct FarmService {
    db: PgPool,
}

/// Farm record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Farm {
    pub id: i64,
    pub farmer_id: i64,
    pub name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub size: Decimal,
    pub location: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub latitude: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub longitude: Option<Decimal>,
    pub soil_type: Option<String>,
    pub irrigation_type: Option<String>,
    pub date_created: DateTime<Utc>,
    pub is_active: bool,
}

/// Farm with the crop names and livestock species recorded on it
#[derive(Debug, Clone, Serialize)]
pub struct FarmWithNames {
    #[serde(flatten)]
    pub farm: Farm,
    pub crops: Vec<String>,
    pub livestock: Vec<String>,
}

/// Crop record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Crop {
    pub id: i64,
    pub farm_id: i64,
    pub name: String,
    pub variety: Option<String>,
    pub planting_date: Option<NaiveDate>,
    pub expected_harvest_date: Option<NaiveDate>,
    pub actual_harvest_date: Option<NaiveDate>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub area_planted: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub expected_yield: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub actual_yield: Option<Decimal>,
    pub status: String,
    pub notes: Option<String>,
    pub date_created: DateTime<Utc>,
}

/// Livestock record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Livestock {
    pub id: i64,
    pub farm_id: i64,
    pub species: String,
    pub breed: Option<String>,
    pub count: i32,
    pub age_group: Option<String>,
    pub purpose: Option<String>,
    pub health_status: String,
    pub vaccination_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub date_created: DateTime<Utc>,
    pub is_active: bool,
}

/// Input for creating a farm
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFarmInput {
    pub farmer_id: i64,
    pub size: Decimal,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub location: String,
    #[validate(length(max = 100))]
    pub name: Option<String>,
    pub crops: Option<Vec<String>>,
    pub livestock: Option<Vec<String>>,
    pub soil_type: Option<String>,
    pub irrigation_type: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
}

/// Partial farm update. Supplied `crops`/`livestock` replace the stored names.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateFarmInput {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    pub size: Option<Decimal>,
    #[validate(length(min = 1, max = 200))]
    pub location: Option<String>,
    pub crops: Option<Vec<String>>,
    pub livestock: Option<Vec<String>>,
    pub soil_type: Option<String>,
    pub irrigation_type: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// Input for adding a crop to a farm
#[derive(Debug, Deserialize)]
pub struct CreateCropInput {
    pub name: String,
    pub variety: Option<String>,
    pub planting_date: Option<NaiveDate>,
    pub expected_harvest_date: Option<NaiveDate>,
    pub area_planted: Option<Decimal>,
    pub expected_yield: Option<Decimal>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCropInput {
    pub name: Option<String>,
    pub variety: Option<String>,
    pub planting_date: Option<NaiveDate>,
    pub expected_harvest_date: Option<NaiveDate>,
    pub actual_harvest_date: Option<NaiveDate>,
    pub area_planted: Option<Decimal>,
    pub expected_yield: Option<Decimal>,
    pub actual_yield: Option<Decimal>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Input for adding livestock to a farm
#[derive(Debug, Deserialize)]
pub struct CreateLivestockInput {
    pub species: String,
    pub breed: Option<String>,
    pub count: Option<i32>,
    pub age_group: Option<String>,
    pub purpose: Option<String>,
    pub health_status: Option<String>,
    pub vaccination_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateLivestockInput {
    pub species: Option<String>,
    pub breed: Option<String>,
    pub count: Option<i32>,
    pub age_group: Option<String>,
    pub purpose: Option<String>,
    pub health_status: Option<String>,
    pub vaccination_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

const FARM_COLUMNS: &str = "id, farmer_id, name, size, location, latitude, longitude, \
     soil_type, irrigation_type, date_created, is_active";

const CROP_COLUMNS: &str = "id, farm_id, name, variety, planting_date, expected_harvest_date, \
     actual_harvest_date, area_planted, expected_yield, actual_yield, status, notes, date_created";

const LIVESTOCK_COLUMNS: &str = "id, farm_id, species, breed, count, age_group, purpose, \
     health_status, vaccination_date, notes, date_created, is_active";

/// Reject names outside the Kerala allow-lists before anything is written
fn check_allow_lists(crops: Option<&[String]>, livestock: Option<&[String]>) -> AppResult<()> {
    let bad_crops = crops.map(invalid_crops).unwrap_or_default();
    let bad_livestock = livestock.map(invalid_livestock).unwrap_or_default();

    if bad_crops.is_empty() && bad_livestock.is_empty() {
        return Ok(());
    }

    Err(AppError::DisallowedFarmEntries {
        crops: bad_crops,
        livestock: bad_livestock,
    })
}

fn check_farm_fields(
    size: Option<Decimal>,
    latitude: Option<Decimal>,
    longitude: Option<Decimal>,
) -> AppResult<()> {
    if let Some(size) = size {
        validate_farm_size(size)
            .map_err(|msg| AppError::invalid("size", msg, "കൃഷിയിടത്തിന്റെ വലിപ്പം പൂജ്യത്തേക്കാൾ കൂടുതലായിരിക്കണം"))?;
    }
    if let (Some(lat), Some(lon)) = (latitude, longitude) {
        validate_coordinates(lat, lon)
            .map_err(|msg| AppError::invalid("latitude", msg, "അക്ഷാംശ രേഖാംശങ്ങൾ അസാധുവാണ്"))?;
    }
    Ok(())
}

fn parse_crop_status(status: Option<&str>) -> AppResult<Option<CropStatus>> {
    status
        .map(|s| {
            CropStatus::from_str(s)
                .map_err(|msg| AppError::invalid("status", msg, "വിളയുടെ നില അസാധുവാണ്"))
        })
        .transpose()
}

fn clean_names(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

fn lowercased(names: &[String]) -> Vec<String> {
    names.iter().map(|n| n.to_lowercase()).collect()
}

/// Wanted names with no stored row yet, compared case-insensitively
fn missing_names(wanted: &[String], existing: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = existing.iter().map(|n| n.to_lowercase()).collect();
    wanted
        .iter()
        .filter(|n| seen.insert(n.to_lowercase()))
        .cloned()
        .collect()
}

impl FarmService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All farms with their names, newest first
    pub async fn list_farms(&self) -> AppResult<Vec<FarmWithNames>> {
        let farms = sqlx::query_as::<_, Farm>(&format!(
            "SELECT {} FROM farms ORDER BY date_created DESC, id DESC",
            FARM_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        self.attach_names(farms).await
    }

    pub async fn farms_for_farmer(&self, farmer_id: i64) -> AppResult<Vec<FarmWithNames>> {
        let farms = sqlx::query_as::<_, Farm>(&format!(
            "SELECT {} FROM farms WHERE farmer_id = $1 ORDER BY id ASC",
            FARM_COLUMNS
        ))
        .bind(farmer_id)
        .fetch_all(&self.db)
        .await?;

        self.attach_names(farms).await
    }

    pub async fn get_farm(&self, farm_id: i64) -> AppResult<FarmWithNames> {
        let farm = self.find_farm(farm_id).await?;
        let mut with_names = self.attach_names(vec![farm]).await?;
        with_names
            .pop()
            .ok_or_else(|| AppError::NotFound("Farm".to_string()))
    }

    pub(crate) async fn find_farm(&self, farm_id: i64) -> AppResult<Farm> {
        sqlx::query_as::<_, Farm>(&format!(
            "SELECT {} FROM farms WHERE id = $1",
            FARM_COLUMNS
        ))
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farm".to_string()))
    }

    async fn attach_names(&self, farms: Vec<Farm>) -> AppResult<Vec<FarmWithNames>> {
        let ids: Vec<i64> = farms.iter().map(|f| f.id).collect();

        let crops = sqlx::query_as::<_, (i64, String)>(
            "SELECT farm_id, name FROM crops WHERE farm_id = ANY($1) ORDER BY id ASC",
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let livestock = sqlx::query_as::<_, (i64, String)>(
            "SELECT farm_id, species FROM livestock WHERE farm_id = ANY($1) ORDER BY id ASC",
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        Ok(farms
            .into_iter()
            .map(|farm| {
                let names_for = |rows: &[(i64, String)]| {
                    rows.iter()
                        .filter(|(farm_id, _)| *farm_id == farm.id)
                        .map(|(_, name)| name.clone())
                        .collect()
                };
                FarmWithNames {
                    crops: names_for(&crops),
                    livestock: names_for(&livestock),
                    farm,
                }
            })
            .collect())
    }

    /// Create a farm, optionally seeding its crops and livestock by name
    pub async fn create_farm(&self, input: CreateFarmInput) -> AppResult<FarmWithNames> {
        // Allow-list check runs first so a rejected farm never touches the store
        check_allow_lists(input.crops.as_deref(), input.livestock.as_deref())?;
        input.validate()?;

        if input.location.trim().is_empty() {
            return Err(AppError::invalid(
                "location",
                "Farm location is required",
                "കൃഷിയിടത്തിന്റെ സ്ഥലം ആവശ്യമാണ്",
            ));
        }
        check_farm_fields(Some(input.size), input.latitude, input.longitude)?;

        let farmer_exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM farmers WHERE id = $1")
                .bind(input.farmer_id)
                .fetch_one(&self.db)
                .await?;
        if farmer_exists == 0 {
            return Err(AppError::NotFound("Farmer".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let farm_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO farms (farmer_id, name, size, location, latitude, longitude,
                               soil_type, irrigation_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(input.farmer_id)
        .bind(&input.name)
        .bind(input.size)
        .bind(input.location.trim())
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(&input.soil_type)
        .bind(&input.irrigation_type)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(ref crops) = input.crops {
            insert_crop_names(&mut tx, farm_id, &clean_names(crops)).await?;
        }
        if let Some(ref livestock) = input.livestock {
            insert_livestock_names(&mut tx, farm_id, &clean_names(livestock)).await?;
        }

        tx.commit().await?;

        tracing::info!("Created farm {} for farmer {}", farm_id, input.farmer_id);
        self.get_farm(farm_id).await
    }

    /// Apply a partial farm update
    pub async fn update_farm(&self, farm_id: i64, input: UpdateFarmInput) -> AppResult<FarmWithNames> {
        check_allow_lists(input.crops.as_deref(), input.livestock.as_deref())?;
        input.validate()?;
        check_farm_fields(input.size, input.latitude, input.longitude)?;

        let existing = self.find_farm(farm_id).await?;

        let name = input.name.or(existing.name);
        let size = input.size.unwrap_or(existing.size);
        let location = input.location.unwrap_or(existing.location);
        let latitude = input.latitude.or(existing.latitude);
        let longitude = input.longitude.or(existing.longitude);
        let soil_type = input.soil_type.or(existing.soil_type);
        let irrigation_type = input.irrigation_type.or(existing.irrigation_type);
        let is_active = input.is_active.unwrap_or(existing.is_active);

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            UPDATE farms
            SET name = $1, size = $2, location = $3, latitude = $4, longitude = $5,
                soil_type = $6, irrigation_type = $7, is_active = $8
            WHERE id = $9
            "#,
        )
        .bind(&name)
        .bind(size)
        .bind(&location)
        .bind(latitude)
        .bind(longitude)
        .bind(&soil_type)
        .bind(&irrigation_type)
        .bind(is_active)
        .bind(farm_id)
        .execute(&mut *tx)
        .await?;

        // Rows whose name survives keep their id, details and activity links
        if let Some(ref crops) = input.crops {
            let wanted = clean_names(crops);
            sqlx::query("DELETE FROM crops WHERE farm_id = $1 AND NOT (lower(name) = ANY($2))")
                .bind(farm_id)
                .bind(lowercased(&wanted))
                .execute(&mut *tx)
                .await?;
            let kept: Vec<String> = sqlx::query_scalar("SELECT name FROM crops WHERE farm_id = $1")
                .bind(farm_id)
                .fetch_all(&mut *tx)
                .await?;
            insert_crop_names(&mut tx, farm_id, &missing_names(&wanted, &kept)).await?;
        }

        if let Some(ref livestock) = input.livestock {
            let wanted = clean_names(livestock);
            sqlx::query(
                "DELETE FROM livestock WHERE farm_id = $1 AND NOT (lower(species) = ANY($2))",
            )
            .bind(farm_id)
            .bind(lowercased(&wanted))
            .execute(&mut *tx)
            .await?;
            let kept: Vec<String> =
                sqlx::query_scalar("SELECT species FROM livestock WHERE farm_id = $1")
                    .bind(farm_id)
                    .fetch_all(&mut *tx)
                    .await?;
            insert_livestock_names(&mut tx, farm_id, &missing_names(&wanted, &kept)).await?;
        }

        tx.commit().await?;

        self.get_farm(farm_id).await
    }

    /// Delete a farm (cascade removes crops, livestock and activities)
    pub async fn delete_farm(&self, farm_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM farms WHERE id = $1")
            .bind(farm_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Farm".to_string()));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Crops
    // ---------------------------------------------------------------------

    pub async fn get_crop(&self, crop_id: i64) -> AppResult<Crop> {
        sqlx::query_as::<_, Crop>(&format!(
            "SELECT {} FROM crops WHERE id = $1",
            CROP_COLUMNS
        ))
        .bind(crop_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Crop".to_string()))
    }

    pub async fn add_crop(&self, farm_id: i64, input: CreateCropInput) -> AppResult<Crop> {
        check_allow_lists(Some(std::slice::from_ref(&input.name)), None)?;
        let status = parse_crop_status(input.status.as_deref())?.unwrap_or_default();
        self.find_farm(farm_id).await?;

        let crop = sqlx::query_as::<_, Crop>(&format!(
            r#"
            INSERT INTO crops (farm_id, name, variety, planting_date, expected_harvest_date,
                               area_planted, expected_yield, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            CROP_COLUMNS
        ))
        .bind(farm_id)
        .bind(input.name.trim())
        .bind(&input.variety)
        .bind(input.planting_date)
        .bind(input.expected_harvest_date)
        .bind(input.area_planted)
        .bind(input.expected_yield)
        .bind(status.as_str())
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(crop)
    }

    pub async fn update_crop(&self, crop_id: i64, input: UpdateCropInput) -> AppResult<Crop> {
        if let Some(ref name) = input.name {
            check_allow_lists(Some(std::slice::from_ref(name)), None)?;
        }
        let status = parse_crop_status(input.status.as_deref())?;
        let existing = self.get_crop(crop_id).await?;

        let crop = sqlx::query_as::<_, Crop>(&format!(
            r#"
            UPDATE crops
            SET name = $1, variety = $2, planting_date = $3, expected_harvest_date = $4,
                actual_harvest_date = $5, area_planted = $6, expected_yield = $7,
                actual_yield = $8, status = $9, notes = $10
            WHERE id = $11
            RETURNING {}
            "#,
            CROP_COLUMNS
        ))
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.variety.or(existing.variety))
        .bind(input.planting_date.or(existing.planting_date))
        .bind(input.expected_harvest_date.or(existing.expected_harvest_date))
        .bind(input.actual_harvest_date.or(existing.actual_harvest_date))
        .bind(input.area_planted.or(existing.area_planted))
        .bind(input.expected_yield.or(existing.expected_yield))
        .bind(input.actual_yield.or(existing.actual_yield))
        .bind(status.map(|s| s.as_str().to_string()).unwrap_or(existing.status))
        .bind(input.notes.or(existing.notes))
        .bind(crop_id)
        .fetch_one(&self.db)
        .await?;

        Ok(crop)
    }

    pub async fn delete_crop(&self, crop_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM crops WHERE id = $1")
            .bind(crop_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Crop".to_string()));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Livestock
    // ---------------------------------------------------------------------

    pub async fn get_livestock(&self, livestock_id: i64) -> AppResult<Livestock> {
        sqlx::query_as::<_, Livestock>(&format!(
            "SELECT {} FROM livestock WHERE id = $1",
            LIVESTOCK_COLUMNS
        ))
        .bind(livestock_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Livestock".to_string()))
    }

    pub async fn add_livestock(
        &self,
        farm_id: i64,
        input: CreateLivestockInput,
    ) -> AppResult<Livestock> {
        check_allow_lists(None, Some(std::slice::from_ref(&input.species)))?;
        let count = input.count.unwrap_or(1);
        if count < 0 {
            return Err(AppError::invalid(
                "count",
                "Livestock count cannot be negative",
                "കന്നുകാലികളുടെ എണ്ണം നെഗറ്റീവ് ആകരുത്",
            ));
        }
        self.find_farm(farm_id).await?;

        let livestock = sqlx::query_as::<_, Livestock>(&format!(
            r#"
            INSERT INTO livestock (farm_id, species, breed, count, age_group, purpose,
                                   health_status, vaccination_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            LIVESTOCK_COLUMNS
        ))
        .bind(farm_id)
        .bind(input.species.trim())
        .bind(&input.breed)
        .bind(count)
        .bind(&input.age_group)
        .bind(&input.purpose)
        .bind(input.health_status.as_deref().unwrap_or(DEFAULT_HEALTH_STATUS))
        .bind(input.vaccination_date)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(livestock)
    }

    pub async fn update_livestock(
        &self,
        livestock_id: i64,
        input: UpdateLivestockInput,
    ) -> AppResult<Livestock> {
        if let Some(ref species) = input.species {
            check_allow_lists(None, Some(std::slice::from_ref(species)))?;
        }
        if input.count.map(|c| c < 0).unwrap_or(false) {
            return Err(AppError::invalid(
                "count",
                "Livestock count cannot be negative",
                "കന്നുകാലികളുടെ എണ്ണം നെഗറ്റീവ് ആകരുത്",
            ));
        }
        let existing = self.get_livestock(livestock_id).await?;

        let livestock = sqlx::query_as::<_, Livestock>(&format!(
            r#"
            UPDATE livestock
            SET species = $1, breed = $2, count = $3, age_group = $4, purpose = $5,
                health_status = $6, vaccination_date = $7, notes = $8, is_active = $9
            WHERE id = $10
            RETURNING {}
            "#,
            LIVESTOCK_COLUMNS
        ))
        .bind(input.species.unwrap_or(existing.species))
        .bind(input.breed.or(existing.breed))
        .bind(input.count.unwrap_or(existing.count))
        .bind(input.age_group.or(existing.age_group))
        .bind(input.purpose.or(existing.purpose))
        .bind(input.health_status.unwrap_or(existing.health_status))
        .bind(input.vaccination_date.or(existing.vaccination_date))
        .bind(input.notes.or(existing.notes))
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(livestock_id)
        .fetch_one(&self.db)
        .await?;

        Ok(livestock)
    }

    pub async fn delete_livestock(&self, livestock_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM livestock WHERE id = $1")
            .bind(livestock_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Livestock".to_string()));
        }
        Ok(())
    }
}

async fn insert_crop_names(
    tx: &mut Transaction<'_, Postgres>,
    farm_id: i64,
    names: &[String],
) -> AppResult<()> {
    for name in names {
        sqlx::query("INSERT INTO crops (farm_id, name, status) VALUES ($1, $2, $3)")
            .bind(farm_id)
            .bind(name)
            .bind(CropStatus::Planted.as_str())
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

async fn insert_livestock_names(
    tx: &mut Transaction<'_, Postgres>,
    farm_id: i64,
    species: &[String],
) -> AppResult<()> {
    for name in species {
        sqlx::query("INSERT INTO livestock (farm_id, species, health_status) VALUES ($1, $2, $3)")
            .bind(farm_id)
            .bind(name)
            .bind(DEFAULT_HEALTH_STATUS)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_reports_every_offender() {
        let err = check_allow_lists(
            Some(&["Rice".to_string(), "Kiwi".to_string()]),
            Some(&["Cow".to_string(), "Llama".to_string()]),
        )
        .unwrap_err();

        match err {
            AppError::DisallowedFarmEntries { crops, livestock } => {
                assert_eq!(crops, vec!["Kiwi"]);
                assert_eq!(livestock, vec!["Llama"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn allow_list_passes_known_names() {
        assert!(check_allow_lists(Some(&["coconut".to_string()]), None).is_ok());
        assert!(check_allow_lists(None, None).is_ok());
    }

    #[test]
    fn farm_size_must_be_positive() {
        assert!(check_farm_fields(Some(Decimal::ZERO), None, None).is_err());
        assert!(check_farm_fields(Some(Decimal::new(25, 1)), None, None).is_ok());
    }

    #[test]
    fn crop_status_parsing() {
        assert_eq!(parse_crop_status(Some("Growing")).unwrap(), Some(CropStatus::Growing));
        assert_eq!(parse_crop_status(None).unwrap(), None);
        assert!(parse_crop_status(Some("sprouting")).is_err());
    }

    #[test]
    fn names_are_trimmed_and_blank_dropped() {
        let names = clean_names(&[" Rice ".to_string(), "  ".to_string()]);
        assert_eq!(names, vec!["Rice"]);
    }

    #[test]
    fn only_unstored_names_are_added() {
        let wanted = ["rice".to_string(), "Banana".to_string(), "banana".to_string()];
        let stored = ["Rice".to_string()];
        assert_eq!(missing_names(&wanted, &stored), vec!["Banana"]);
        assert!(missing_names(&[], &stored).is_empty());
    }
}
