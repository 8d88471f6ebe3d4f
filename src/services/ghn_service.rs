// services/ghn_service.rs
//
// Client, cache and validation for the GHN administrative-division API
// (provinces / districts / wards). Lookups are memoized per key for the
// lifetime of the process; a failed fetch is never cached and will be
// retried on the next call.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::errors::{AppError, Result};
use crate::models::division::{District, Province, Ward};

/// In-memory division cache. Entries are immutable once populated and
/// never expire. Concurrent first-calls for the same key may both hit
/// upstream; both compute the same list, so the last write winning is
/// harmless.
#[derive(Debug, Default)]
pub struct DivisionCache {
    provinces: RwLock<Option<Vec<Province>>>,
    districts: RwLock<HashMap<i32, Vec<District>>>,
    wards: RwLock<HashMap<i32, Vec<Ward>>>,
}

impl DivisionCache {
    pub fn provinces(&self) -> Option<Vec<Province>> {
        self.provinces.read().unwrap().clone()
    }

    pub fn put_provinces(&self, provinces: Vec<Province>) {
        *self.provinces.write().unwrap() = Some(provinces);
    }

    pub fn districts(&self, province_id: i32) -> Option<Vec<District>> {
        self.districts.read().unwrap().get(&province_id).cloned()
    }

    pub fn put_districts(&self, province_id: i32, districts: Vec<District>) {
        self.districts.write().unwrap().insert(province_id, districts);
    }

    pub fn wards(&self, district_id: i32) -> Option<Vec<Ward>> {
        self.wards.read().unwrap().get(&district_id).cloned()
    }

    pub fn put_wards(&self, district_id: i32, wards: Vec<Ward>) {
        self.wards.write().unwrap().insert(district_id, wards);
    }
}

pub struct GhnService {
    client: Client,
    base_url: String,
    api_key: String,
    cache: DivisionCache,
}

impl GhnService {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        GhnService {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            cache: DivisionCache::default(),
        }
    }

    pub async fn get_provinces(&self) -> Result<Vec<Province>> {
        if let Some(cached) = self.cache.provinces() {
            return Ok(cached);
        }

        let url = format!("{}/province", self.base_url);
        let provinces: Vec<Province> = self.call_ghn(&url).await?;
        self.cache.put_provinces(provinces.clone());
        Ok(provinces)
    }

    pub async fn get_districts(&self, province_id: i32) -> Result<Vec<District>> {
        if let Some(cached) = self.cache.districts(province_id) {
            return Ok(cached);
        }

        let url = format!("{}/district?province_id={}", self.base_url, province_id);
        let districts: Vec<District> = self.call_ghn(&url).await?;
        self.cache.put_districts(province_id, districts.clone());
        Ok(districts)
    }

    pub async fn get_wards(&self, district_id: i32) -> Result<Vec<Ward>> {
        if let Some(cached) = self.cache.wards(district_id) {
            return Ok(cached);
        }

        let url = format!("{}/ward?district_id={}", self.base_url, district_id);
        let wards: Vec<Ward> = self.call_ghn(&url).await?;
        self.cache.put_wards(district_id, wards.clone());
        Ok(wards)
    }

    pub async fn is_valid_province(&self, province_id: i32) -> Result<bool> {
        let provinces = self.get_provinces().await?;
        if provinces.is_empty() {
            debug!("GHN returned an empty province list");
            return Ok(false);
        }
        Ok(contains_province(&provinces, province_id))
    }

    pub async fn is_valid_district(&self, district_id: i32, province_id: i32) -> Result<bool> {
        let districts = self.get_districts(province_id).await?;
        if districts.is_empty() {
            debug!("GHN returned an empty district list for province {}", province_id);
            return Ok(false);
        }
        Ok(contains_district(&districts, district_id))
    }

    pub async fn is_valid_ward(&self, ward_id: &str, district_id: i32) -> Result<bool> {
        let wards = self.get_wards(district_id).await?;
        if wards.is_empty() {
            debug!("GHN returned an empty ward list for district {}", district_id);
            return Ok(false);
        }
        Ok(contains_ward(&wards, ward_id))
    }

    async fn call_ghn<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let response = self
            .client
            .get(url)
            .header("Token", &self.api_key)
            .send()
            .await
            .map_err(|_| AppError::ProviderCallFailed(url.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::ProviderUnavailable {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|_| AppError::ProviderCallFailed(url.to_string()))?;

        parse_division_payload(body, url)
    }
}

/// Extracts the `data` array from a GHN response envelope and decodes
/// each entry. A missing or non-array `data` field, or an entry missing
/// an expected field, is a bad response.
fn parse_division_payload<T: DeserializeOwned>(body: Value, url: &str) -> Result<Vec<T>> {
    match body.get("data") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                serde_json::from_value(item.clone())
                    .map_err(|_| AppError::ProviderBadResponse(url.to_string()))
            })
            .collect(),
        _ => Err(AppError::ProviderBadResponse(url.to_string())),
    }
}

pub fn contains_province(provinces: &[Province], province_id: i32) -> bool {
    provinces.iter().any(|p| p.province_id == province_id)
}

pub fn contains_district(districts: &[District], district_id: i32) -> bool {
    districts.iter().any(|d| d.district_id == district_id)
}

// String-exact comparison against the stringified WardCode; "01" never
// matches a numeric code 1.
pub fn contains_ward(wards: &[Ward], ward_id: &str) -> bool {
    wards.iter().any(|w| w.ward_code == ward_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provinces() -> Vec<Province> {
        serde_json::from_value(json!([
            {"ProvinceID": 201, "ProvinceName": "Hà Nội"},
            {"ProvinceID": 202, "ProvinceName": "Hồ Chí Minh"}
        ]))
        .unwrap()
    }

    #[test]
    fn parse_payload_extracts_data_array() {
        let body = json!({"code": 200, "data": [{"ProvinceID": 1, "ProvinceName": "Hanoi"}]});
        let parsed: Vec<Province> = parse_division_payload(body, "u").unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].province_id, 1);
    }

    #[test]
    fn parse_payload_rejects_missing_data() {
        let body = json!({"code": 200, "message": "ok"});
        let err = parse_division_payload::<Province>(body, "u").unwrap_err();
        assert!(matches!(err, AppError::ProviderBadResponse(_)));
    }

    #[test]
    fn parse_payload_rejects_non_array_data() {
        let body = json!({"data": "not-a-list"});
        let err = parse_division_payload::<Province>(body, "u").unwrap_err();
        assert!(matches!(err, AppError::ProviderBadResponse(_)));
    }

    #[test]
    fn parse_payload_rejects_entry_missing_fields() {
        let body = json!({"data": [{"ProvinceName": "Hà Nội"}]});
        let err = parse_division_payload::<Province>(body, "u").unwrap_err();
        assert!(matches!(err, AppError::ProviderBadResponse(_)));
    }

    #[test]
    fn province_membership() {
        assert!(contains_province(&provinces(), 201));
        assert!(!contains_province(&provinces(), 9999));
        assert!(!contains_province(&[], 201));
    }

    #[test]
    fn ward_membership_is_string_exact() {
        let wards: Vec<Ward> = serde_json::from_value(json!([
            {"WardCode": "1", "WardName": "A"},
            {"WardCode": 10, "WardName": "B"}
        ]))
        .unwrap();

        assert!(contains_ward(&wards, "1"));
        assert!(contains_ward(&wards, "10"));
        // no numeric coercion: "01" is not the numeric code 1
        assert!(!contains_ward(&wards, "01"));
        assert!(!contains_ward(&wards, "2"));
    }

    #[test]
    fn cache_starts_empty_and_keys_independently() {
        let cache = DivisionCache::default();
        assert!(cache.provinces().is_none());
        assert!(cache.districts(201).is_none());

        cache.put_provinces(provinces());
        assert_eq!(cache.provinces().unwrap().len(), 2);

        cache.put_districts(201, vec![]);
        assert_eq!(cache.districts(201).unwrap().len(), 0);
        assert!(cache.districts(202).is_none());
        assert!(cache.wards(201).is_none());
    }
}

#[cfg(test)]
mod fixture_tests {
    //! End-to-end tests against a local HTTP stand-in for the GHN
    //! gateway, counting upstream calls to verify memoization.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;

    #[derive(Clone, Default)]
    struct Counters {
        province: Arc<AtomicUsize>,
        district: Arc<AtomicUsize>,
        ward: Arc<AtomicUsize>,
    }

    async fn spawn_fixture(counters: Counters) -> String {
        let province_hits = counters.province.clone();
        let district_hits = counters.district.clone();
        let ward_hits = counters.ward.clone();

        let app = Router::new()
            .route(
                "/province",
                get(move || {
                    let hits = province_hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        Json(json!({"data": [{"ProvinceID": 1, "ProvinceName": "Hanoi"}]}))
                    }
                }),
            )
            .route(
                "/district",
                get(move |Query(params): Query<HashMap<String, String>>| {
                    let hits = district_hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        match params.get("province_id").map(String::as_str) {
                            Some("1") => Json(json!({
                                "data": [{"DistrictID": 1442, "DistrictName": "Đống Đa"}]
                            })),
                            _ => Json(json!({"data": []})),
                        }
                    }
                }),
            )
            .route(
                "/ward",
                get(move |Query(_): Query<HashMap<String, String>>| {
                    let hits = ward_hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        Json(json!({
                            "data": [
                                {"WardCode": "1", "WardName": "A"},
                                {"WardCode": 2, "WardName": "B"}
                            ]
                        }))
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn provinces_are_fetched_once_and_validated() {
        let counters = Counters::default();
        let base_url = spawn_fixture(counters.clone()).await;
        let ghn = GhnService::new(base_url, "test-key");

        let provinces = ghn.get_provinces().await.unwrap();
        assert_eq!(provinces.len(), 1);
        assert_eq!(provinces[0].province_name, "Hanoi");

        // second call must be served from the cache
        ghn.get_provinces().await.unwrap();
        assert_eq!(counters.province.load(Ordering::SeqCst), 1);

        assert!(ghn.is_valid_province(1).await.unwrap());
        assert!(!ghn.is_valid_province(2).await.unwrap());
        assert_eq!(counters.province.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn district_and_ward_lookups_memoize_per_key() {
        let counters = Counters::default();
        let base_url = spawn_fixture(counters.clone()).await;
        let ghn = GhnService::new(base_url, "test-key");

        assert!(ghn.is_valid_district(1442, 1).await.unwrap());
        assert!(!ghn.is_valid_district(9, 1).await.unwrap());
        assert_eq!(counters.district.load(Ordering::SeqCst), 1);

        // a different province id is a different cache key
        assert!(!ghn.is_valid_district(1442, 2).await.unwrap());
        assert_eq!(counters.district.load(Ordering::SeqCst), 2);

        assert!(ghn.is_valid_ward("1", 1442).await.unwrap());
        assert!(ghn.is_valid_ward("2", 1442).await.unwrap());
        assert!(!ghn.is_valid_ward("01", 1442).await.unwrap());
        assert!(!ghn.is_valid_ward("02", 1442).await.unwrap());
        assert_eq!(counters.ward.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn upstream_error_surfaces_and_is_not_cached() {
        let hits = Arc::new(AtomicUsize::new(0));
        let route_hits = hits.clone();

        // first call fails with 500, later calls succeed
        let app = Router::new().route(
            "/province",
            get(move || {
                let hits = route_hits.clone();
                async move {
                    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                        StatusCode::INTERNAL_SERVER_ERROR.into_response()
                    } else {
                        Json(json!({"data": [{"ProvinceID": 1, "ProvinceName": "Hanoi"}]}))
                            .into_response()
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let ghn = GhnService::new(format!("http://{}", addr), "test-key");

        let err = ghn.get_provinces().await.unwrap_err();
        assert!(matches!(
            err,
            AppError::ProviderUnavailable { status: 500, .. }
        ));

        // failure was not cached: the retry goes upstream and succeeds
        assert!(ghn.is_valid_province(1).await.unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        // success was cached
        ghn.get_provinces().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn malformed_envelope_is_a_bad_response() {
        let app = Router::new()
            .route("/ward", get(|| async { Json(json!({"message": "ok"})) }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let ghn = GhnService::new(format!("http://{}", addr), "test-key");
        let err = ghn.get_wards(1442).await.unwrap_err();
        assert!(matches!(err, AppError::ProviderBadResponse(_)));
    }
}
