use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 경매 모델
// current_bid / total_bids / status 는 입찰 수락기와 마감 스케줄러만 갱신한다.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Auction {
    pub id: i64,
    pub car_name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub current_bid: i64,
    pub total_bids: i64,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// 입찰 모델(추가 전용 원장, 생성 후 불변)
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub auction_id: i64,
    pub bidder_name: String,
    pub bidder_email: String,
    pub bid_amount: i64,
    pub created_at: DateTime<Utc>,
}

// 판매 기록 모델
// 낙찰(sale_type = "auction")은 마감된 경매당 정확히 한 건 생성된다.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct SalesTransaction {
    pub id: i64,
    pub auction_id: Option<i64>,
    pub car_id: Option<i64>,
    pub customer_name: String,
    pub customer_email: String,
    pub amount: i64,
    pub sale_type: String,
    pub transaction_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
