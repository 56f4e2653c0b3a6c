//! Storage tests against a live PostgreSQL
//!
//! Run with `DATABASE_URL` set and `cargo test -- --ignored`.
//! - Deleting a farmer removes their farms, crops and activities
//! - Activity dates survive the DD/MM/YYYY round trip
//! - Farm updates keep crop rows whose names survive
//! - Repeated weather readings keep the day's peak rainfall

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::{str::FromStr, sync::Arc};

use krishi_sakhi_backend::{
    error::AppError,
    external::{ai::AiError, weather::CurrentWeather, GenerationOptions, ImageInput, LanguageModel},
    services::{
        activity::CreateActivityInput,
        farm::{CreateCropInput, CreateFarmInput, UpdateFarmInput},
        farmer::CreateFarmerInput,
        ActivityService, FarmService, FarmerService, WeatherService,
    },
};

/// Storage paths never reach the model
struct UnusedModel;

#[async_trait]
impl LanguageModel for UnusedModel {
    async fn generate(&self, _prompt: &str, _options: &GenerationOptions) -> Result<String, AiError> {
        Err(AiError::EmptyResponse)
    }

    async fn generate_from_image(
        &self,
        _prompt: &str,
        _image: &ImageInput,
        _options: &GenerationOptions,
    ) -> Result<String, AiError> {
        Err(AiError::EmptyResponse)
    }
}

async fn seed_farm(pool: &PgPool) -> (i64, i64) {
    let farmer = FarmerService::new(pool.clone())
        .create_farmer(CreateFarmerInput {
            name: "Lakshmi".to_string(),
            phone_number: "9876543210".to_string(),
            email: None,
            address: Some("Palakkad".to_string()),
        })
        .await
        .unwrap();

    let farm = FarmService::new(pool.clone())
        .create_farm(CreateFarmInput {
            farmer_id: farmer.id,
            size: Decimal::from_str("2.5").unwrap(),
            location: "Palakkad".to_string(),
            name: Some("Paddy field".to_string()),
            crops: Some(vec!["Rice".to_string()]),
            livestock: Some(vec!["Cow".to_string()]),
            soil_type: None,
            irrigation_type: None,
            latitude: None,
            longitude: None,
        })
        .await
        .unwrap();

    (farmer.id, farm.farm.id)
}

fn nendran_banana() -> CreateCropInput {
    CreateCropInput {
        name: "Banana".to_string(),
        variety: Some("Nendran".to_string()),
        planting_date: None,
        expected_harvest_date: None,
        area_planted: None,
        expected_yield: None,
        status: None,
        notes: None,
    }
}

fn reading(hour: u32, rain_mm: &str) -> CurrentWeather {
    CurrentWeather {
        timestamp: Utc.with_ymd_and_hms(2024, 7, 1, hour, 0, 0).unwrap(),
        location_name: "Kochi".to_string(),
        temperature_celsius: Decimal::from(28),
        feels_like_celsius: Decimal::from(31),
        temp_min_celsius: Decimal::from(26),
        temp_max_celsius: Decimal::from(30),
        humidity_percent: 88,
        pressure_hpa: 1006,
        wind_speed_mps: Decimal::from(4),
        visibility_meters: 8000,
        weather_condition: "Rain".to_string(),
        weather_description: "moderate rain".to_string(),
        weather_icon: "10d".to_string(),
        rain_1h_mm: Some(Decimal::from_str(rain_mm).unwrap()),
    }
}

fn activity(farm_id: i64, date: &str) -> CreateActivityInput {
    CreateActivityInput {
        farm_id,
        activity_type: "irrigation".to_string(),
        date: Some(date.to_string()),
        details: Some("Flooded the field".to_string()),
        cost: Some(Decimal::from(150)),
        labor_hours: None,
        crop_id: None,
        status: Some("completed".to_string()),
        success_rating: None,
        weather_conditions: None,
        notes: None,
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_farmer_delete_cascades(pool: PgPool) {
        let (farmer_id, farm_id) = seed_farm(&pool).await;
        let farms = FarmService::new(pool.clone());
        farms.add_crop(farm_id, nendran_banana()).await.unwrap();
        ActivityService::new(pool.clone())
            .create_activity(activity(farm_id, "05/07/2024"))
            .await
            .unwrap();

        FarmerService::new(pool.clone())
            .delete_farmer(farmer_id)
            .await
            .unwrap();

        assert!(matches!(farms.get_farm(farm_id).await, Err(AppError::NotFound(_))));
        let (crops,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM crops")
            .fetch_one(&pool)
            .await
            .unwrap();
        let (activities,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM activities")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(crops, 0);
        assert_eq!(activities, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_activity_date_round_trip(pool: PgPool) {
        let (_, farm_id) = seed_farm(&pool).await;
        let service = ActivityService::new(pool.clone());

        service
            .create_activity(activity(farm_id, "05/07/2024"))
            .await
            .unwrap();

        let listed = service.list_activities().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].date, "05/07/2024");
        assert_eq!(listed[0].farm_name, "Paddy field");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_farm_update_keeps_surviving_crop_rows(pool: PgPool) {
        let (_, farm_id) = seed_farm(&pool).await;
        let farms = FarmService::new(pool.clone());
        let banana = farms.add_crop(farm_id, nendran_banana()).await.unwrap();
        let (rice_id,): (i64,) =
            sqlx::query_as("SELECT id FROM crops WHERE farm_id = $1 AND name = 'Rice'")
                .bind(farm_id)
                .fetch_one(&pool)
                .await
                .unwrap();

        let updated = farms
            .update_farm(
                farm_id,
                UpdateFarmInput {
                    crops: Some(vec!["rice".into(), "Banana".into(), "Coconut".into()]),
                    livestock: Some(vec!["Goat".into()]),
                    ..UpdateFarmInput::default()
                },
            )
            .await
            .unwrap();

        let kept = farms.get_crop(banana.id).await.unwrap();
        assert_eq!(kept.variety.as_deref(), Some("Nendran"));
        let (rice_still,): (i64,) = sqlx::query_as("SELECT id FROM crops WHERE lower(name) = 'rice'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rice_still, rice_id);

        let mut crops = updated.crops.clone();
        crops.sort();
        assert_eq!(crops, vec!["Banana", "Coconut", "Rice"]);
        assert_eq!(updated.livestock, vec!["Goat"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_repeated_readings_keep_peak_rainfall(pool: PgPool) {
        let weather = WeatherService::new(pool.clone(), Arc::new(UnusedModel));

        weather.record_daily_log("Kochi", &reading(6, "4.5")).await;
        weather.record_daily_log("Kochi", &reading(9, "12.0")).await;
        weather.record_daily_log("Kochi", &reading(12, "3.0")).await;

        let (rows, rainfall): (i64, Option<Decimal>) = sqlx::query_as(
            "SELECT COUNT(*), MAX(rainfall) FROM weather_logs WHERE location = 'Kochi'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(rainfall, Some(Decimal::from_str("12.00").unwrap()));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_duplicate_phone_is_conflict(pool: PgPool) {
        seed_farm(&pool).await;

        let result = FarmerService::new(pool.clone())
            .create_farmer(CreateFarmerInput {
                name: "Another".to_string(),
                phone_number: "9876543210".to_string(),
                email: None,
                address: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::DuplicateEntry(_))));
    }
}
