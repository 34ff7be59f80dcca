use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 판매 차량 모델
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Car {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub category: Option<String>,
    pub year: Option<i64>,
    pub engine: Option<String>,
    pub transmission: Option<String>,
    pub color: Option<String>,
    pub mileage: Option<i64>,
    pub doors: Option<i64>,
    pub passengers: Option<i64>,
    pub speed: Option<String>,
    pub image_url: Option<String>,
    pub image_hover_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 차량 생성 / 수정 입력
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CarForm {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub category: Option<String>,
    pub year: Option<i64>,
    pub engine: Option<String>,
    pub transmission: Option<String>,
    pub color: Option<String>,
    pub mileage: Option<i64>,
    pub doors: Option<i64>,
    pub passengers: Option<i64>,
    pub speed: Option<String>,
    pub image_url: Option<String>,
    pub image_hover_url: Option<String>,
}

// 홈 화면 섹션 모델
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct HomeSection {
    pub id: i64,
    pub section_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub button_text: Option<String>,
    pub button_link: Option<String>,
    pub order_index: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 홈 화면 섹션 입력
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HomeSectionForm {
    pub section_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub button_text: Option<String>,
    pub button_link: Option<String>,
    pub order_index: Option<i64>,
}

// 소개 페이지 섹션 모델(섹션 내용은 구조가 자유로운 JSON)
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct AboutSection {
    pub id: i64,
    pub section_type: String,
    pub content: Option<serde_json::Value>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 소개 페이지 섹션 입력
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AboutSectionForm {
    pub section_type: String,
    pub content: Option<serde_json::Value>,
}

// 연락처 정보 모델(전화번호 / 이메일은 JSON 배열)
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContactInfo {
    pub id: i64,
    pub address: Option<String>,
    pub phone_numbers: Option<serde_json::Value>,
    pub email_addresses: Option<serde_json::Value>,
    pub working_hours: Option<String>,
    pub map_embed_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 연락처 정보 입력
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContactInfoForm {
    pub address: Option<String>,
    pub phone_numbers: Option<serde_json::Value>,
    pub email_addresses: Option<serde_json::Value>,
    pub working_hours: Option<String>,
    pub map_embed_url: Option<String>,
}

// 문의 접수 모델
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContactSubmission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub read_status: bool,
    pub created_at: DateTime<Utc>,
}

/// 문의 접수 입력
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContactSubmissionForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

// 사이트 설정 모델(단일 행)
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct SiteSettings {
    pub id: i64,
    pub site_title: Option<String>,
    pub logo_url: Option<String>,
    pub favicon_url: Option<String>,
    pub maintenance_mode: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 사이트 설정 입력
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SiteSettingsForm {
    pub site_title: Option<String>,
    pub logo_url: Option<String>,
    pub favicon_url: Option<String>,
    pub maintenance_mode: Option<bool>,
}

// 판매 합계 집계 행
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct SalesTotals {
    pub total_revenue: i64,
    pub total_sales: i64,
}

// 판매 유형별 건수 집계 행
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct SalesByType {
    pub sale_type: String,
    pub count: i64,
}

/// 판매 통계 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct SalesStatistics {
    pub total_revenue: i64,
    pub average_transaction: f64,
    pub total_sales: i64,
    pub sales_by_type: Vec<SalesByType>,
}
