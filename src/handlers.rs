// region:    --- Imports
use crate::auction::registry::{self, AuctionForm};
use crate::bidding::commands::{handle_place_bid as command_place_bid, PlaceBidCommand};
use crate::bidding::model::{Auction, Bid, SalesTransaction};
use crate::content::commands::{self, PurchaseCommand, PurchaseReceipt};
use crate::content::model::{
    AboutSection, AboutSectionForm, Car, CarForm, ContactInfo, ContactInfoForm, ContactSubmission,
    ContactSubmissionForm, HomeSection, HomeSectionForm, SalesStatistics, SiteSettings,
    SiteSettingsForm,
};
use crate::database::DatabaseManager;
use crate::errors::{ApiError, BidError, PurchaseError};
use crate::message_broker::KafkaProducer;
use crate::query;
use crate::scheduler::{self, SweepSummary};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

/// 모든 핸들러가 공유하는 상태
pub type AppState = (Arc<DatabaseManager>, Arc<KafkaProducer>);

// region:    --- Command Handlers

/// 입찰 요청 처리
pub async fn handle_bid(
    State((db_manager, kafka_producer)): State<AppState>,
    Json(cmd): Json<PlaceBidCommand>,
) -> Result<Json<serde_json::Value>, BidError> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Handler", cmd);

    let accepted = command_place_bid(cmd, &db_manager, &*kafka_producer).await?;

    Ok(Json(serde_json::json!({
        "message": "입찰이 성공적으로 처리되었습니다.",
        "current_bid": accepted.current_bid,
        "total_bids": accepted.total_bids,
        "bid_amount": accepted.bid.bid_amount
    })))
}

/// 즉시 구매 / 렌탈 요청 처리
pub async fn handle_purchase(
    State((db_manager, kafka_producer)): State<AppState>,
    Json(cmd): Json<PurchaseCommand>,
) -> Result<Json<PurchaseReceipt>, PurchaseError> {
    info!("{:<12} --> 구매 요청 처리 시작: {:?}", "Handler", cmd);
    let receipt = commands::process_purchase(cmd, &db_manager, &*kafka_producer).await?;
    Ok(Json(receipt))
}

/// 종료 경매 즉시 마감("지금 마감" 관리자 트리거)
/// 주기 실행과 동일한 멱등 연산을 호출한다.
pub async fn handle_sweep_now(
    State((db_manager, kafka_producer)): State<AppState>,
) -> Result<Json<SweepSummary>, ApiError> {
    info!("{:<12} --> 관리자 경매 마감 트리거", "Handler");
    let summary = scheduler::sweep_ended_auctions(db_manager.pool(), &*kafka_producer)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(summary))
}

/// 문의 접수 처리
pub async fn handle_submit_contact(
    State((db_manager, _)): State<AppState>,
    Json(form): Json<ContactSubmissionForm>,
) -> Result<Json<ContactSubmission>, ApiError> {
    let submission = commands::submit_contact(&db_manager, form).await?;
    Ok(Json(submission))
}

// endregion: --- Command Handlers

// region:    --- Public Query Handlers

#[derive(Debug, Deserialize)]
pub struct BidListQuery {
    pub limit: Option<i64>,
}

/// 활성 경매 목록 조회(종료 임박 순)
pub async fn handle_get_auctions(
    State((db_manager, _)): State<AppState>,
) -> Result<Json<Vec<Auction>>, ApiError> {
    let auctions = query::handlers::get_active_auctions(&db_manager).await?;
    Ok(Json(auctions))
}

/// 경매 단건 조회
pub async fn handle_get_auction(
    State((db_manager, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> Result<Json<Auction>, ApiError> {
    let auction = query::handlers::get_auction(&db_manager, auction_id).await?;
    Ok(Json(auction))
}

/// 최근 입찰 목록 조회(기본 5건)
pub async fn handle_get_recent_bids(
    State((db_manager, _)): State<AppState>,
    Path(auction_id): Path<i64>,
    Query(params): Query<BidListQuery>,
) -> Result<Json<Vec<Bid>>, ApiError> {
    let limit = params.limit.unwrap_or(5).clamp(1, 100);
    let bids = query::handlers::get_recent_bids(&db_manager, auction_id, limit).await?;
    Ok(Json(bids))
}

/// 최고 입찰액 조회
pub async fn handle_get_highest_bid(
    State((db_manager, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> Result<Json<Option<i64>>, ApiError> {
    let highest = query::handlers::get_highest_bid(&db_manager, auction_id).await?;
    Ok(Json(highest))
}

/// 판매 중 차량 목록 조회
pub async fn handle_get_cars(
    State((db_manager, _)): State<AppState>,
) -> Result<Json<Vec<Car>>, ApiError> {
    let cars = query::handlers::get_active_cars(&db_manager).await?;
    Ok(Json(cars))
}

/// 차량 단건 조회
pub async fn handle_get_car(
    State((db_manager, _)): State<AppState>,
    Path(car_id): Path<i64>,
) -> Result<Json<Car>, ApiError> {
    let car = query::handlers::get_car(&db_manager, car_id).await?;
    Ok(Json(car))
}

/// 홈 콘텐츠 조회
pub async fn handle_get_home_content(
    State((db_manager, _)): State<AppState>,
) -> Result<Json<Vec<HomeSection>>, ApiError> {
    let sections = query::handlers::get_home_sections(&db_manager).await?;
    Ok(Json(sections))
}

/// 소개 콘텐츠 조회
pub async fn handle_get_about_content(
    State((db_manager, _)): State<AppState>,
) -> Result<Json<Vec<AboutSection>>, ApiError> {
    let sections = query::handlers::get_about_sections(&db_manager).await?;
    Ok(Json(sections))
}

/// 연락처 정보 조회
pub async fn handle_get_contact_info(
    State((db_manager, _)): State<AppState>,
) -> Result<Json<ContactInfo>, ApiError> {
    let contact_info = query::handlers::get_contact_info(&db_manager)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(contact_info))
}

/// 사이트 설정 조회
pub async fn handle_get_settings(
    State((db_manager, _)): State<AppState>,
) -> Result<Json<SiteSettings>, ApiError> {
    let settings = query::handlers::get_site_settings(&db_manager)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(settings))
}

// endregion: --- Public Query Handlers

// region:    --- Admin Handlers

#[derive(Debug, Deserialize)]
pub struct AuctionListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionListQuery {
    pub since: Option<DateTime<Utc>>,
}

/// 관리자 경매 목록 조회
pub async fn handle_admin_get_auctions(
    State((db_manager, _)): State<AppState>,
    Query(params): Query<AuctionListQuery>,
) -> Result<Json<Vec<Auction>>, ApiError> {
    let auctions = query::handlers::get_auctions_admin(&db_manager, params.status).await?;
    Ok(Json(auctions))
}

/// 경매 생성
pub async fn handle_create_auction(
    State((db_manager, kafka_producer)): State<AppState>,
    Json(form): Json<AuctionForm>,
) -> Result<Json<Auction>, ApiError> {
    let auction = registry::create_auction(&db_manager, &*kafka_producer, form).await?;
    Ok(Json(auction))
}

/// 경매 수정
pub async fn handle_update_auction(
    State((db_manager, kafka_producer)): State<AppState>,
    Path(auction_id): Path<i64>,
    Json(form): Json<AuctionForm>,
) -> Result<Json<Auction>, ApiError> {
    let auction =
        registry::update_auction(&db_manager, &*kafka_producer, auction_id, form).await?;
    Ok(Json(auction))
}

/// 경매 노출 해제
pub async fn handle_delete_auction(
    State((db_manager, kafka_producer)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> Result<Json<Auction>, ApiError> {
    let auction = registry::deactivate_auction(&db_manager, &*kafka_producer, auction_id).await?;
    Ok(Json(auction))
}

/// 입찰 원장 전체 조회
pub async fn handle_get_bid_ledger(
    State((db_manager, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> Result<Json<Vec<Bid>>, ApiError> {
    let bids = query::handlers::get_bid_ledger(&db_manager, auction_id).await?;
    Ok(Json(bids))
}

/// 관리자 차량 목록 조회
pub async fn handle_admin_get_cars(
    State((db_manager, _)): State<AppState>,
) -> Result<Json<Vec<Car>>, ApiError> {
    let cars = query::handlers::get_cars_admin(&db_manager).await?;
    Ok(Json(cars))
}

/// 차량 등록
pub async fn handle_create_car(
    State((db_manager, _)): State<AppState>,
    Json(form): Json<CarForm>,
) -> Result<Json<Car>, ApiError> {
    let car = commands::create_car(&db_manager, form).await?;
    Ok(Json(car))
}

/// 차량 수정
pub async fn handle_update_car(
    State((db_manager, _)): State<AppState>,
    Path(car_id): Path<i64>,
    Json(form): Json<CarForm>,
) -> Result<Json<Car>, ApiError> {
    let car = commands::update_car(&db_manager, car_id, form).await?;
    Ok(Json(car))
}

/// 차량 노출 해제
pub async fn handle_delete_car(
    State((db_manager, _)): State<AppState>,
    Path(car_id): Path<i64>,
) -> Result<Json<Car>, ApiError> {
    let car = commands::deactivate_car(&db_manager, car_id).await?;
    Ok(Json(car))
}

/// 판매 기록 조회
pub async fn handle_get_transactions(
    State((db_manager, _)): State<AppState>,
    Query(params): Query<TransactionListQuery>,
) -> Result<Json<Vec<SalesTransaction>>, ApiError> {
    let transactions = query::handlers::get_transactions(&db_manager, params.since).await?;
    Ok(Json(transactions))
}

/// 판매 통계 조회
pub async fn handle_get_statistics(
    State((db_manager, _)): State<AppState>,
) -> Result<Json<SalesStatistics>, ApiError> {
    let statistics = query::handlers::get_statistics(&db_manager).await?;
    Ok(Json(statistics))
}

/// 홈 섹션 생성
pub async fn handle_create_home_section(
    State((db_manager, _)): State<AppState>,
    Json(form): Json<HomeSectionForm>,
) -> Result<Json<HomeSection>, ApiError> {
    let section = commands::create_home_section(&db_manager, form).await?;
    Ok(Json(section))
}

/// 홈 섹션 수정
pub async fn handle_update_home_section(
    State((db_manager, _)): State<AppState>,
    Path(section_id): Path<i64>,
    Json(form): Json<HomeSectionForm>,
) -> Result<Json<HomeSection>, ApiError> {
    let section = commands::update_home_section(&db_manager, section_id, form).await?;
    Ok(Json(section))
}

/// 소개 섹션 생성
pub async fn handle_create_about_section(
    State((db_manager, _)): State<AppState>,
    Json(form): Json<AboutSectionForm>,
) -> Result<Json<AboutSection>, ApiError> {
    let section = commands::create_about_section(&db_manager, form).await?;
    Ok(Json(section))
}

/// 소개 섹션 수정
pub async fn handle_update_about_section(
    State((db_manager, _)): State<AppState>,
    Path(section_id): Path<i64>,
    Json(form): Json<AboutSectionForm>,
) -> Result<Json<AboutSection>, ApiError> {
    let section = commands::update_about_section(&db_manager, section_id, form).await?;
    Ok(Json(section))
}

/// 연락처 정보 갱신
pub async fn handle_update_contact_info(
    State((db_manager, _)): State<AppState>,
    Json(form): Json<ContactInfoForm>,
) -> Result<Json<ContactInfo>, ApiError> {
    let contact_info = commands::update_contact_info(&db_manager, form).await?;
    Ok(Json(contact_info))
}

/// 문의 접수 목록 조회
pub async fn handle_get_contact_submissions(
    State((db_manager, _)): State<AppState>,
) -> Result<Json<Vec<ContactSubmission>>, ApiError> {
    let submissions = query::handlers::get_contact_submissions(&db_manager).await?;
    Ok(Json(submissions))
}

/// 문의 읽음 처리
pub async fn handle_mark_submission_read(
    State((db_manager, _)): State<AppState>,
    Path(submission_id): Path<i64>,
) -> Result<Json<ContactSubmission>, ApiError> {
    let submission = commands::mark_submission_read(&db_manager, submission_id).await?;
    Ok(Json(submission))
}

/// 사이트 설정 갱신
pub async fn handle_update_settings(
    State((db_manager, _)): State<AppState>,
    Json(form): Json<SiteSettingsForm>,
) -> Result<Json<SiteSettings>, ApiError> {
    let settings = commands::update_site_settings(&db_manager, form).await?;
    Ok(Json(settings))
}

// endregion: --- Admin Handlers
