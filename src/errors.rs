// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
// endregion: --- Imports

// region:    --- Bid Errors

/// 입찰 수락 오류 분류
/// 모든 오류는 호출자에게 타입으로 반환되며 내부에서 재시도하지 않는다.
#[derive(Debug, thiserror::Error)]
pub enum BidError {
    /// 입력 형식 오류(이름 / 이메일 / 금액)
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    /// 경매가 없거나, 마감되었거나, 비활성이거나, 종료 시각이 지남
    #[error("{message}")]
    NotBiddable { message: String },
    /// 입찰 금액이 현재 바닥가 + 최소 증가분에 미달(동시 입찰 경쟁에서 밀린 경우 포함)
    #[error("입찰 금액이 현재 가격보다 낮습니다.")]
    TooLow { current_bid: i64 },
    /// 저장소 접근 실패
    #[error("저장소 오류: {0}")]
    Storage(#[from] sqlx::Error),
}

impl IntoResponse for BidError {
    fn into_response(self) -> Response {
        match self {
            BidError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": message,
                    "code": "VALIDATION",
                    "field": field
                })),
            )
                .into_response(),
            BidError::NotBiddable { message } => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": message,
                    "code": "NOT_BIDDABLE"
                })),
            )
                .into_response(),
            BidError::TooLow { current_bid } => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "입찰 금액이 현재 가격보다 낮습니다.",
                    "code": "LOW_BID",
                    "current_bid": current_bid
                })),
            )
                .into_response(),
            BidError::Storage(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": format!("저장소 오류: {}", e),
                    "code": "STORAGE_UNAVAILABLE"
                })),
            )
                .into_response(),
        }
    }
}

// endregion: --- Bid Errors

// region:    --- Purchase Errors

/// 즉시 구매 / 렌탈 처리 오류
#[derive(Debug, thiserror::Error)]
pub enum PurchaseError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    /// 차량이 없거나 판매 가능 상태가 아님
    #[error("{message}")]
    CarNotAvailable { message: String },
    #[error("저장소 오류: {0}")]
    Storage(#[from] sqlx::Error),
}

impl IntoResponse for PurchaseError {
    fn into_response(self) -> Response {
        match self {
            PurchaseError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": message,
                    "code": "VALIDATION",
                    "field": field
                })),
            )
                .into_response(),
            PurchaseError::CarNotAvailable { message } => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": message,
                    "code": "CAR_NOT_AVAILABLE"
                })),
            )
                .into_response(),
            PurchaseError::Storage(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": format!("저장소 오류: {}", e),
                    "code": "STORAGE_UNAVAILABLE"
                })),
            )
                .into_response(),
        }
    }
}

// endregion: --- Purchase Errors

// region:    --- Api Errors

/// 조회 / CRUD 핸들러 공용 오류
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("대상을 찾을 수 없습니다.")]
    NotFound,
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("저장소 오류: {0}")]
    Storage(sqlx::Error),
}

/// 행이 없는 경우는 404, 그 외 저장소 오류는 503으로 구분한다.
impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            other => ApiError::Storage(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "대상을 찾을 수 없습니다.",
                    "code": "NOT_FOUND"
                })),
            )
                .into_response(),
            ApiError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": message,
                    "code": "VALIDATION",
                    "field": field
                })),
            )
                .into_response(),
            ApiError::Storage(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": format!("저장소 오류: {}", e),
                    "code": "STORAGE_UNAVAILABLE"
                })),
            )
                .into_response(),
        }
    }
}

// endregion: --- Api Errors

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn too_low_reports_current_floor() {
        let response = BidError::TooLow { current_bid: 10500 }.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_error_is_service_unavailable() {
        let response = BidError::Storage(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
