/// 경매 레지스트리 관리 커맨드
/// 관리자 패널의 경매 생성 / 수정 / 노출 해제가 이 경로를 거친다.
/// 입찰에 따른 current_bid / total_bids 갱신은 bidding::commands 가,
/// active -> closed 전이는 scheduler 가 담당한다.
// region:    --- Imports
use crate::auction::events::ChangeEvent;
use crate::bidding::model::Auction;
use crate::database::DatabaseManager;
use crate::errors::ApiError;
use crate::message_broker::ChangeNotifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
// endregion: --- Imports

/// 경매 생성 / 수정 입력
/// current_bid 는 생성 시 판매자가 정한 시작가이다.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuctionForm {
    pub car_name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub current_bid: i64,
    pub end_time: DateTime<Utc>,
}

/// 경매 생성(상태는 active, 입찰 수 0으로 시작)
pub async fn create_auction(
    db: &DatabaseManager,
    notifier: &impl ChangeNotifier,
    form: AuctionForm,
) -> Result<Auction, ApiError> {
    info!("{:<12} --> 경매 생성: {}", "Registry", form.car_name);
    validate_form(&form)?;

    let now = Utc::now();
    let auction = sqlx::query_as::<_, Auction>(
        "INSERT INTO auctions
            (car_name, description, image_url, current_bid, total_bids, end_time, status,
             created_at, updated_at)
         VALUES ($1, $2, $3, $4, 0, $5, 'active', $6, $6)
         RETURNING *",
    )
    .bind(&form.car_name)
    .bind(&form.description)
    .bind(&form.image_url)
    .bind(form.current_bid)
    .bind(form.end_time)
    .bind(now)
    .fetch_one(db.pool())
    .await?;

    if let Err(e) = notifier.notify(&ChangeEvent::auction_inserted(&auction)).await {
        warn!("{:<12} --> 경매 생성 이벤트 발행 실패: {}", "Registry", e);
    }

    Ok(auction)
}

/// 경매 수정(설명 필드와 시작가 / 종료 시각)
pub async fn update_auction(
    db: &DatabaseManager,
    notifier: &impl ChangeNotifier,
    auction_id: i64,
    form: AuctionForm,
) -> Result<Auction, ApiError> {
    info!("{:<12} --> 경매 수정 id: {}", "Registry", auction_id);
    validate_form(&form)?;

    let auction = sqlx::query_as::<_, Auction>(
        "UPDATE auctions
         SET car_name = $1, description = $2, image_url = $3, current_bid = $4,
             end_time = $5, updated_at = $6
         WHERE id = $7
         RETURNING *",
    )
    .bind(&form.car_name)
    .bind(&form.description)
    .bind(&form.image_url)
    .bind(form.current_bid)
    .bind(form.end_time)
    .bind(Utc::now())
    .bind(auction_id)
    .fetch_optional(db.pool())
    .await?
    .ok_or(ApiError::NotFound)?;

    if let Err(e) = notifier.notify(&ChangeEvent::auction_updated(&auction)).await {
        warn!("{:<12} --> 경매 수정 이벤트 발행 실패: {}", "Registry", e);
    }

    Ok(auction)
}

/// 경매 노출 해제(soft delete, 공개 목록에서 제외)
/// active / closed 어느 상태에서든 가능하며 입찰 이력과 무관하다.
pub async fn deactivate_auction(
    db: &DatabaseManager,
    notifier: &impl ChangeNotifier,
    auction_id: i64,
) -> Result<Auction, ApiError> {
    info!("{:<12} --> 경매 노출 해제 id: {}", "Registry", auction_id);

    let auction = sqlx::query_as::<_, Auction>(
        "UPDATE auctions SET status = 'inactive', updated_at = $1
         WHERE id = $2
         RETURNING *",
    )
    .bind(Utc::now())
    .bind(auction_id)
    .fetch_optional(db.pool())
    .await?
    .ok_or(ApiError::NotFound)?;

    if let Err(e) = notifier.notify(&ChangeEvent::auction_updated(&auction)).await {
        warn!(
            "{:<12} --> 경매 노출 해제 이벤트 발행 실패: {}",
            "Registry", e
        );
    }

    Ok(auction)
}

/// 경매 입력 검증
fn validate_form(form: &AuctionForm) -> Result<(), ApiError> {
    if form.car_name.trim().is_empty() {
        return Err(ApiError::Validation {
            field: "car_name",
            message: "차량 이름은 비울 수 없습니다.".to_string(),
        });
    }
    if form.current_bid <= 0 {
        return Err(ApiError::Validation {
            field: "current_bid",
            message: "시작가는 양수여야 합니다.".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_form() -> AuctionForm {
        AuctionForm {
            car_name: "제네시스 G90".to_string(),
            description: None,
            image_url: None,
            current_bid: 10000,
            end_time: Utc::now(),
        }
    }

    #[test]
    fn empty_car_name_is_rejected() {
        let mut form = sample_form();
        form.car_name = "   ".to_string();
        assert!(validate_form(&form).is_err());
    }

    #[test]
    fn starting_bid_must_be_positive() {
        let mut form = sample_form();
        form.current_bid = 0;
        assert!(validate_form(&form).is_err());
        form.current_bid = 10000;
        assert!(validate_form(&form).is_ok());
    }
}
