use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use futures_util::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Collection;
use tracing::{info, warn};

use crate::database::counters::next_sequence;
use crate::errors::{AppError, Result};
use crate::models::address::{Address, AddressEnvelope, AddressPayload};
use crate::models::division::{District, Province, Ward};
use crate::models::user::Claims;
use crate::state::AppState;

const ADDRESSES: &str = "addresses";

pub const MSG_DIVISION_REQUIRED: &str = "Tỉnh, Huyện, hoặc Xã không được bỏ trống.";
pub const MSG_PHONE_REQUIRED: &str = "Số điện thoại không được bỏ trống.";
pub const MSG_INVALID_PROVINCE: &str = "Tỉnh không hợp lệ.";
pub const MSG_INVALID_WARD: &str = "Xã không hợp lệ.";
pub const MSG_CREATED: &str = "Địa chỉ đã được tạo thành công.";
pub const MSG_LIST_EMPTY: &str = "Danh sách địa chỉ của bạn hiện tại trống.";
pub const MSG_LIST_LOADED: &str = "Danh sách địa chỉ của bạn đã được tải thành công.";
pub const MSG_UPDATE_INVALID_PROVINCE: &str = "ID Tỉnh không hợp lệ.";
pub const MSG_UPDATE_INVALID_DISTRICT: &str = "ID Huyện không hợp lệ hoặc không thuộc tỉnh này.";
pub const MSG_UPDATE_INVALID_WARD: &str = "ID Xã không hợp lệ hoặc không thuộc huyện này.";
pub const MSG_UPDATED: &str = "Địa chỉ đã được cập nhật thành công.";
pub const MSG_DELETED: &str = "Địa chỉ đã được xóa thành công.";
pub const MSG_NOT_FOUND: &str = "Địa chỉ không tồn tại.";
pub const MSG_UPDATE_FORBIDDEN: &str = "Bạn không có quyền cập nhật địa chỉ này.";
pub const MSG_DELETE_FORBIDDEN: &str = "Bạn không có quyền xóa địa chỉ này.";

fn error_response(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(AddressEnvelope::error(message))).into_response()
}

fn success_response(status: StatusCode, addresses: Vec<Address>, message: &str) -> Response {
    (status, Json(AddressEnvelope::success(addresses, message))).into_response()
}

/// Division gate for create: province and ward block, district validity
/// is observed by the caller but never enforced here.
fn create_division_rejection(
    valid_province: bool,
    _valid_district: bool,
    valid_ward: bool,
) -> Option<&'static str> {
    if !valid_province {
        return Some(MSG_INVALID_PROVINCE);
    }
    if !valid_ward {
        return Some(MSG_INVALID_WARD);
    }
    None
}

/// Division gate for update: all three levels must check out.
fn update_division_rejection(
    valid_province: bool,
    valid_district: bool,
    valid_ward: bool,
) -> Option<&'static str> {
    if !valid_province {
        return Some(MSG_UPDATE_INVALID_PROVINCE);
    }
    if !valid_district {
        return Some(MSG_UPDATE_INVALID_DISTRICT);
    }
    if !valid_ward {
        return Some(MSG_UPDATE_INVALID_WARD);
    }
    None
}

/// Update and delete are owner-only; the gate runs before any write.
fn owner_gate(existing: &Address, caller_id: i32, denial: &str) -> Result<()> {
    if existing.user_id != caller_id {
        return Err(AppError::Authorization(denial.to_string()));
    }
    Ok(())
}

/// Failure text shown when a GHN lookup breaks mid-create. A transport
/// failure on the district lookup (its URL carries `province_id`) is
/// reported as an invalid province; anything else is wrapped verbatim.
fn ghn_failure_message(err: &AppError) -> String {
    match err {
        AppError::ProviderCallFailed(url) if url.contains("province_id") => {
            "Tỉnh không hợp lệ!.".to_string()
        }
        other => format!("Lỗi khi cập nhật địa chỉ: {}", other),
    }
}

// Public division listings (no auth) -------------------------------------

pub async fn get_provinces(State(state): State<AppState>) -> Result<Json<Vec<Province>>> {
    Ok(Json(state.ghn.get_provinces().await?))
}

pub async fn get_districts(
    State(state): State<AppState>,
    Path(province_id): Path<i32>,
) -> Result<Json<Vec<District>>> {
    Ok(Json(state.ghn.get_districts(province_id).await?))
}

pub async fn get_wards(
    State(state): State<AppState>,
    Path(district_id): Path<i32>,
) -> Result<Json<Vec<Ward>>> {
    Ok(Json(state.ghn.get_wards(district_id).await?))
}

// Address CRUD (auth required) --------------------------------------------

pub async fn create_address(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddressPayload>,
) -> Response {
    let (Some(province_id), Some(district_id), Some(ward_id)) = (
        payload.province_id,
        payload.district_id,
        payload.ward_id.clone(),
    ) else {
        return AppError::Validation(MSG_DIVISION_REQUIRED.to_string()).into_response();
    };

    let phone = match payload.phone.as_deref() {
        Some(phone) if !phone.is_empty() => phone.to_string(),
        _ => return AppError::Validation(MSG_PHONE_REQUIRED.to_string()).into_response(),
    };

    let checks = async {
        let valid_province = state.ghn.is_valid_province(province_id).await?;
        let valid_district = state.ghn.is_valid_district(district_id, province_id).await?;
        let valid_ward = state.ghn.is_valid_ward(&ward_id, district_id).await?;
        Ok::<_, AppError>((valid_province, valid_district, valid_ward))
    };

    match checks.await {
        Ok((valid_province, valid_district, valid_ward)) => {
            // District validity is computed and logged but does not gate
            // creation; only the update path enforces it.
            if !valid_district {
                warn!(
                    "district {} does not belong to province {}, creating anyway",
                    district_id, province_id
                );
            }
            if let Some(message) =
                create_division_rejection(valid_province, valid_district, valid_ward)
            {
                return AppError::Validation(message.to_string()).into_response();
            }
        }
        Err(e) => return error_response(ghn_failure_message(&e)),
    }

    let id = match next_sequence(&state.db, ADDRESSES).await {
        Ok(id) => id,
        Err(e) => return error_response(format!("Lỗi khi cập nhật địa chỉ: {}", e)),
    };

    let address = Address {
        id,
        name: payload.name.unwrap_or_default(),
        province_id,
        district_id,
        ward_id,
        detailed_address: payload.detailed_address.unwrap_or_default(),
        phone,
        user_id: claims.sub,
    };

    let collection: Collection<Address> = state.db.collection(ADDRESSES);
    if let Err(e) = collection.insert_one(&address).await {
        return error_response(format!("Lỗi khi cập nhật địa chỉ: {}", e));
    }

    info!("address {} created for user {}", address.id, claims.sub);
    success_response(StatusCode::CREATED, vec![address], MSG_CREATED)
}

pub async fn get_addresses(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let collection: Collection<Address> = state.db.collection(ADDRESSES);

    let addresses: Vec<Address> = match collection.find(doc! { "user_id": claims.sub }).await {
        Ok(cursor) => match cursor.try_collect().await {
            Ok(addresses) => addresses,
            Err(e) => return error_response(format!("Lỗi khi lấy danh sách địa chỉ: {}", e)),
        },
        Err(e) => return error_response(format!("Lỗi khi lấy danh sách địa chỉ: {}", e)),
    };

    // An empty list is reported through the error envelope, it is not a
    // transport failure.
    if addresses.is_empty() {
        return AppError::NotFound(MSG_LIST_EMPTY.to_string()).into_response();
    }

    success_response(StatusCode::OK, addresses, MSG_LIST_LOADED)
}

pub async fn update_address(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    Json(payload): Json<AddressPayload>,
) -> Response {
    let (Some(province_id), Some(district_id), Some(ward_id)) = (
        payload.province_id,
        payload.district_id,
        payload.ward_id.clone(),
    ) else {
        return AppError::Validation(MSG_DIVISION_REQUIRED.to_string()).into_response();
    };

    // Unlike create, all three divisions gate the update.
    let checks = async {
        let valid_province = state.ghn.is_valid_province(province_id).await?;
        let valid_district = state.ghn.is_valid_district(district_id, province_id).await?;
        let valid_ward = state.ghn.is_valid_ward(&ward_id, district_id).await?;
        Ok::<_, AppError>((valid_province, valid_district, valid_ward))
    };

    match checks.await {
        Ok((valid_province, valid_district, valid_ward)) => {
            if let Some(message) =
                update_division_rejection(valid_province, valid_district, valid_ward)
            {
                return AppError::Validation(message.to_string()).into_response();
            }
        }
        Err(e) => return error_response(format!("Lỗi khi cập nhật địa chỉ: {}", e)),
    }

    let collection: Collection<Address> = state.db.collection(ADDRESSES);

    let existing = match collection.find_one(doc! { "_id": id }).await {
        Ok(Some(address)) => address,
        Ok(None) => return AppError::NotFound(MSG_NOT_FOUND.to_string()).into_response(),
        Err(e) => return error_response(format!("Lỗi khi cập nhật địa chỉ: {}", e)),
    };

    if let Err(e) = owner_gate(&existing, claims.sub, MSG_UPDATE_FORBIDDEN) {
        return e.into_response();
    }

    // Phone is deliberately carried over from the stored record; update
    // only overwrites name, divisions and the detailed address.
    let updated = Address {
        id,
        name: payload.name.unwrap_or_default(),
        province_id,
        district_id,
        ward_id,
        detailed_address: payload.detailed_address.unwrap_or_default(),
        phone: existing.phone,
        user_id: existing.user_id,
    };

    if let Err(e) = collection.replace_one(doc! { "_id": id }, &updated).await {
        return error_response(format!("Lỗi khi cập nhật địa chỉ: {}", e));
    }

    info!("address {} updated by user {}", id, claims.sub);
    success_response(StatusCode::OK, vec![updated], MSG_UPDATED)
}

pub async fn delete_address(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Response {
    let collection: Collection<Address> = state.db.collection(ADDRESSES);

    let existing = match collection.find_one(doc! { "_id": id }).await {
        Ok(Some(address)) => address,
        Ok(None) => return AppError::NotFound(MSG_NOT_FOUND.to_string()).into_response(),
        Err(e) => return error_response(format!("Lỗi khi xóa địa chỉ: {}", e)),
    };

    if let Err(e) = owner_gate(&existing, claims.sub, MSG_DELETE_FORBIDDEN) {
        return e.into_response();
    }

    if let Err(e) = collection.delete_one(doc! { "_id": id }).await {
        return error_response(format!("Lỗi khi xóa địa chỉ: {}", e));
    }

    info!("address {} deleted by user {}", id, claims.sub);
    (
        StatusCode::OK,
        Json(AddressEnvelope {
            addresses: None,
            message: MSG_DELETED.to_string(),
            is_error: false,
        }),
    )
        .into_response()
}
