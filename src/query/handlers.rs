// region:    --- Imports
use super::queries;
use crate::bidding::model::{Auction, Bid, SalesTransaction};
use crate::content::model::{
    AboutSection, Car, ContactInfo, ContactSubmission, HomeSection, SalesByType, SalesStatistics,
    SalesTotals, SiteSettings,
};
use crate::database::DatabaseManager;
use chrono::{DateTime, Utc};
use sqlx::Error as SqlxError;
use sqlx::Row;
use tracing::info;

// endregion: --- Imports

// region:    --- Auction Queries

/// 활성 경매 조회(종료 임박 순)
pub async fn get_active_auctions(db_manager: &DatabaseManager) -> Result<Vec<Auction>, SqlxError> {
    info!("{:<12} --> 활성 경매 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::GET_ACTIVE_AUCTIONS)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 경매 단건 조회
pub async fn get_auction(
    db_manager: &DatabaseManager,
    auction_id: i64,
) -> Result<Auction, SqlxError> {
    info!("{:<12} --> 경매 조회 id: {}", "Query", auction_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
                    .bind(auction_id)
                    .fetch_one(&mut **tx)
                    .await
            })
        })
        .await
}

/// 관리자 경매 목록 조회(상태 필터는 선택)
pub async fn get_auctions_admin(
    db_manager: &DatabaseManager,
    status: Option<String>,
) -> Result<Vec<Auction>, SqlxError> {
    info!("{:<12} --> 관리자 경매 목록 조회: {:?}", "Query", status);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                match status {
                    Some(status) => {
                        sqlx::query_as::<_, Auction>(queries::GET_AUCTIONS_ADMIN_BY_STATUS)
                            .bind(status)
                            .fetch_all(&mut **tx)
                            .await
                    }
                    None => {
                        sqlx::query_as::<_, Auction>(queries::GET_AUCTIONS_ADMIN)
                            .fetch_all(&mut **tx)
                            .await
                    }
                }
            })
        })
        .await
}

/// 최근 입찰 조회(최신 순)
pub async fn get_recent_bids(
    db_manager: &DatabaseManager,
    auction_id: i64,
    limit: i64,
) -> Result<Vec<Bid>, SqlxError> {
    info!(
        "{:<12} --> 최근 입찰 조회 id: {}, limit: {}",
        "Query", auction_id, limit
    );
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Bid>(queries::GET_RECENT_BIDS)
                    .bind(auction_id)
                    .bind(limit)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 입찰 원장 전체 조회(금액 내림차순)
pub async fn get_bid_ledger(
    db_manager: &DatabaseManager,
    auction_id: i64,
) -> Result<Vec<Bid>, SqlxError> {
    info!("{:<12} --> 입찰 원장 조회 id: {}", "Query", auction_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Bid>(queries::GET_BID_LEDGER)
                    .bind(auction_id)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 최고 입찰액 조회
pub async fn get_highest_bid(
    db_manager: &DatabaseManager,
    auction_id: i64,
) -> Result<Option<i64>, SqlxError> {
    info!("{:<12} --> 최고 입찰액 조회 id: {}", "Query", auction_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let result = sqlx::query(queries::GET_HIGHEST_BID)
                    .bind(auction_id)
                    .fetch_one(&mut **tx)
                    .await?;

                Ok(result.get("highest_bid"))
            })
        })
        .await
}

// endregion: --- Auction Queries

// region:    --- Car Queries

/// 판매 중 차량 조회
pub async fn get_active_cars(db_manager: &DatabaseManager) -> Result<Vec<Car>, SqlxError> {
    info!("{:<12} --> 판매 중 차량 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Car>(queries::GET_ACTIVE_CARS)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 차량 단건 조회
pub async fn get_car(db_manager: &DatabaseManager, car_id: i64) -> Result<Car, SqlxError> {
    info!("{:<12} --> 차량 조회 id: {}", "Query", car_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Car>(queries::GET_CAR)
                    .bind(car_id)
                    .fetch_one(&mut **tx)
                    .await
            })
        })
        .await
}

/// 관리자 차량 목록 조회(상태 무관)
pub async fn get_cars_admin(db_manager: &DatabaseManager) -> Result<Vec<Car>, SqlxError> {
    info!("{:<12} --> 관리자 차량 목록 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Car>(queries::GET_CARS_ADMIN)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

// endregion: --- Car Queries

// region:    --- Sales Queries

/// 판매 기록 조회(기준 시각 이후 필터는 선택)
pub async fn get_transactions(
    db_manager: &DatabaseManager,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<SalesTransaction>, SqlxError> {
    info!("{:<12} --> 판매 기록 조회: since={:?}", "Query", since);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                match since {
                    Some(since) => {
                        sqlx::query_as::<_, SalesTransaction>(queries::GET_TRANSACTIONS_SINCE)
                            .bind(since)
                            .fetch_all(&mut **tx)
                            .await
                    }
                    None => {
                        sqlx::query_as::<_, SalesTransaction>(queries::GET_TRANSACTIONS)
                            .fetch_all(&mut **tx)
                            .await
                    }
                }
            })
        })
        .await
}

/// 판매 통계 조회(총매출 / 평균 거래액 / 건수 / 유형별 건수)
pub async fn get_statistics(db_manager: &DatabaseManager) -> Result<SalesStatistics, SqlxError> {
    info!("{:<12} --> 판매 통계 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let totals = sqlx::query_as::<_, SalesTotals>(queries::GET_SALES_TOTALS)
                    .fetch_one(&mut **tx)
                    .await?;

                let sales_by_type = sqlx::query_as::<_, SalesByType>(queries::GET_SALES_BY_TYPE)
                    .fetch_all(&mut **tx)
                    .await?;

                let average_transaction = if totals.total_sales > 0 {
                    totals.total_revenue as f64 / totals.total_sales as f64
                } else {
                    0.0
                };

                Ok(SalesStatistics {
                    total_revenue: totals.total_revenue,
                    average_transaction,
                    total_sales: totals.total_sales,
                    sales_by_type,
                })
            })
        })
        .await
}

// endregion: --- Sales Queries

// region:    --- Content Queries

/// 홈 콘텐츠 섹션 조회
pub async fn get_home_sections(db_manager: &DatabaseManager) -> Result<Vec<HomeSection>, SqlxError> {
    info!("{:<12} --> 홈 콘텐츠 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, HomeSection>(queries::GET_HOME_SECTIONS)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 소개 콘텐츠 섹션 조회
pub async fn get_about_sections(
    db_manager: &DatabaseManager,
) -> Result<Vec<AboutSection>, SqlxError> {
    info!("{:<12} --> 소개 콘텐츠 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, AboutSection>(queries::GET_ABOUT_SECTIONS)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 연락처 정보 조회
pub async fn get_contact_info(
    db_manager: &DatabaseManager,
) -> Result<Option<ContactInfo>, SqlxError> {
    info!("{:<12} --> 연락처 정보 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, ContactInfo>(queries::GET_CONTACT_INFO)
                    .fetch_optional(&mut **tx)
                    .await
            })
        })
        .await
}

/// 문의 접수 목록 조회
pub async fn get_contact_submissions(
    db_manager: &DatabaseManager,
) -> Result<Vec<ContactSubmission>, SqlxError> {
    info!("{:<12} --> 문의 접수 목록 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, ContactSubmission>(queries::GET_CONTACT_SUBMISSIONS)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 사이트 설정 조회
pub async fn get_site_settings(
    db_manager: &DatabaseManager,
) -> Result<Option<SiteSettings>, SqlxError> {
    info!("{:<12} --> 사이트 설정 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, SiteSettings>(queries::GET_SITE_SETTINGS)
                    .fetch_optional(&mut **tx)
                    .await
            })
        })
        .await
}

// endregion: --- Content Queries
