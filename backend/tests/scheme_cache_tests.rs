//! Scheme recommendation cache tests
//!
//! Tests for the default recommendation cache including:
//! - Repeated calls inside the window share one computation
//! - Expiry after the window
//! - Failed refreshes are never cached and fall back to the stale value

use chrono::{Duration, TimeZone, Utc};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use krishi_sakhi_backend::{
    error::AppError,
    services::{
        clock::ManualClock,
        scheme::{DefaultRecommendations, RecommendationCache},
    },
};

fn recommendations(now: chrono::DateTime<Utc>, advice: &str) -> DefaultRecommendations {
    DefaultRecommendations {
        recommended_schemes: Vec::new(),
        season: "Monsoon".to_string(),
        general_advice: advice.to_string(),
        last_updated: now,
        total_recommendations: 0,
    }
}

fn cache_at(start: chrono::DateTime<Utc>) -> (Arc<ManualClock>, RecommendationCache) {
    let clock = Arc::new(ManualClock::new(start));
    let cache = RecommendationCache::new(Duration::hours(24), clock.clone());
    (clock, cache)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn test_same_value_within_window() {
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 6, 0, 0).unwrap();
        let (clock, cache) = cache_at(start);
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let first = cache
            .get_or_refresh(|now| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(recommendations(now, "first"))
            })
            .await
            .unwrap();

        clock.advance(Duration::hours(23));
        let second = cache
            .get_or_refresh(|now| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(recommendations(now, "second"))
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(second.last_updated, start);
    }

    #[tokio::test]
    async fn test_recomputes_after_window() {
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 6, 0, 0).unwrap();
        let (clock, cache) = cache_at(start);

        cache
            .get_or_refresh(|now| async move { Ok(recommendations(now, "first")) })
            .await
            .unwrap();

        clock.advance(Duration::hours(24) + Duration::seconds(1));
        let refreshed = cache
            .get_or_refresh(|now| async move { Ok(recommendations(now, "second")) })
            .await
            .unwrap();

        assert_eq!(refreshed.general_advice, "second");
        assert!(refreshed.last_updated > start);
    }

    #[tokio::test]
    async fn test_error_without_cached_value_propagates() {
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 6, 0, 0).unwrap();
        let (_clock, cache) = cache_at(start);

        let result = cache
            .get_or_refresh(|_| async { Err(AppError::Internal("provider down".to_string())) })
            .await;
        assert!(result.is_err());

        // The failure was not cached; the next call computes again
        let value = cache
            .get_or_refresh(|now| async move { Ok(recommendations(now, "recovered")) })
            .await
            .unwrap();
        assert_eq!(value.general_advice, "recovered");
    }

    #[tokio::test]
    async fn test_stale_value_served_when_refresh_fails() {
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 6, 0, 0).unwrap();
        let (clock, cache) = cache_at(start);

        cache
            .get_or_refresh(|now| async move { Ok(recommendations(now, "original")) })
            .await
            .unwrap();

        clock.advance(Duration::hours(30));
        let stale = cache
            .get_or_refresh(|_| async { Err(AppError::Internal("provider down".to_string())) })
            .await
            .unwrap();
        assert_eq!(stale.general_advice, "original");

        // Still expired, so a healthy provider refreshes immediately
        let fresh = cache
            .get_or_refresh(|now| async move { Ok(recommendations(now, "fresh")) })
            .await
            .unwrap();
        assert_eq!(fresh.general_advice, "fresh");
        assert_eq!(fresh.last_updated, start + Duration::hours(30));
    }
}
