/// 입찰 수락 처리
/// current_bid / total_bids 를 갱신하는 유일한 경로이며,
/// 검증 -> 조건부 갱신(CAS) -> 원장 추가 -> 변경 이벤트 발행 순서로 진행한다.
// region:    --- Imports
use crate::auction::events::ChangeEvent;
use crate::bidding::model::{Auction, Bid};
use crate::database::DatabaseManager;
use crate::errors::BidError;
use crate::message_broker::ChangeNotifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
// endregion: --- Imports

// region:    --- Commands

/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub auction_id: i64,
    pub bidder_name: String,
    pub bidder_email: String,
    pub bid_amount: i64,
}

/// 수락된 입찰 결과
#[derive(Debug, Serialize)]
pub struct BidAccepted {
    pub bid: Bid,
    pub current_bid: i64,
    pub total_bids: i64,
}

/// 최소 입찰 증가분(서버 측 불변식)
pub const MIN_BID_INCREMENT: i64 = 100;

/// 입찰 수락
///
/// 원자성: 바닥가 갱신은 status / end_time / 바닥가 조건이 모두 걸린 단일
/// 조건부 UPDATE 로 처리하고, 입찰 원장 추가는 같은 트랜잭션에서 커밋한다.
/// 동시에 도착한 두 입찰 중 늦게 커밋되는 쪽은 먼저 커밋된 바닥가를 기준으로
/// 재평가되어 미달이면 거절된다. 거절된 입찰은 재시도하지 않는다.
pub async fn handle_place_bid(
    cmd: PlaceBidCommand,
    db: &DatabaseManager,
    notifier: &impl ChangeNotifier,
) -> Result<BidAccepted, BidError> {
    info!(
        "{:<12} --> 입찰 요청 처리 시작: auction_id={}, bid_amount={}",
        "Command", cmd.auction_id, cmd.bid_amount
    );

    // 입력 검증(이름 -> 이메일 -> 금액 순서로 첫 위반에서 중단)
    let bidder_name = validate_bidder_name(&cmd.bidder_name)?;
    let bidder_email = validate_bidder_email(&cmd.bidder_email)?;
    validate_bid_amount(cmd.bid_amount)?;

    let now = Utc::now();
    let mut tx = db.pool().begin().await?;

    // 조건부 갱신(CAS): 활성 상태이고 종료 전이며 최소 증가분을 충족할 때만
    // 바닥가가 올라간다. 조건 불일치면 0행 갱신으로 끝난다.
    let updated = sqlx::query_as::<_, Auction>(
        "UPDATE auctions
         SET current_bid = $1, total_bids = total_bids + 1, updated_at = $2
         WHERE id = $3 AND status = 'active' AND end_time > $2
           AND current_bid + $4 <= $1
         RETURNING *",
    )
    .bind(cmd.bid_amount)
    .bind(now)
    .bind(cmd.auction_id)
    .bind(MIN_BID_INCREMENT)
    .fetch_optional(&mut *tx)
    .await?;

    let auction = match updated {
        Some(auction) => auction,
        None => {
            tx.rollback().await?;
            let rejection = classify_rejection(db, cmd.auction_id, now).await?;
            info!(
                "{:<12} --> 입찰 거절: auction_id={}, 사유={}",
                "Command", cmd.auction_id, rejection
            );
            return Err(rejection);
        }
    };

    // 같은 트랜잭션에서 입찰 원장에 추가
    let bid = sqlx::query_as::<_, Bid>(
        "INSERT INTO bids (auction_id, bidder_name, bidder_email, bid_amount, created_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(cmd.auction_id)
    .bind(&bidder_name)
    .bind(&bidder_email)
    .bind(cmd.bid_amount)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "{:<12} --> 입찰 수락: auction_id={}, current_bid={}, total_bids={}",
        "Command", auction.id, auction.current_bid, auction.total_bids
    );

    // 커밋 이후 변경 이벤트 발행. 발행 실패는 수락을 되돌리지 않는다:
    // 전송은 최소 1회 보장이고 재접속 클라이언트는 상태를 재조회한다.
    if let Err(e) = notifier.notify(&ChangeEvent::bid_inserted(&bid)).await {
        warn!("{:<12} --> 입찰 이벤트 발행 실패: {}", "Command", e);
    }
    if let Err(e) = notifier.notify(&ChangeEvent::auction_updated(&auction)).await {
        warn!("{:<12} --> 경매 갱신 이벤트 발행 실패: {}", "Command", e);
    }

    Ok(BidAccepted {
        current_bid: auction.current_bid,
        total_bids: auction.total_bids,
        bid,
    })
}

/// CAS 실패 원인 분류
/// 갱신 시점과 분류 시점 사이에 상태가 또 바뀔 수 있으므로 최선 노력 분류이다.
async fn classify_rejection(
    db: &DatabaseManager,
    auction_id: i64,
    now: DateTime<Utc>,
) -> Result<BidError, BidError> {
    let auction = sqlx::query_as::<_, Auction>("SELECT * FROM auctions WHERE id = $1")
        .bind(auction_id)
        .fetch_optional(db.pool())
        .await?;

    Ok(match auction {
        None => BidError::NotBiddable {
            message: "경매를 찾을 수 없습니다.".to_string(),
        },
        Some(auction) if auction.status != "active" => BidError::NotBiddable {
            message: "경매가 이미 종료되었습니다.".to_string(),
        },
        Some(auction) if auction.end_time <= now => BidError::NotBiddable {
            message: "경매가 이미 종료되었습니다.".to_string(),
        },
        Some(auction) => BidError::TooLow {
            current_bid: auction.current_bid,
        },
    })
}

// endregion: --- Commands

// region:    --- Validation

/// 입찰자 이름 검증: 공백 제거 후 3~100자
pub fn validate_bidder_name(name: &str) -> Result<String, BidError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if !(3..=100).contains(&len) {
        return Err(BidError::Validation {
            field: "bidder_name",
            message: "이름은 3자 이상 100자 이하여야 합니다.".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// 입찰자 이메일 검증: 형식 및 255자 제한
pub fn validate_bidder_email(email: &str) -> Result<String, BidError> {
    if email.chars().count() > 255 {
        return Err(BidError::Validation {
            field: "bidder_email",
            message: "이메일이 너무 깁니다.".to_string(),
        });
    }
    if !is_valid_email(email) {
        return Err(BidError::Validation {
            field: "bidder_email",
            message: "올바른 이메일 형식이 아닙니다.".to_string(),
        });
    }
    Ok(email.to_string())
}

/// 입찰 금액 검증: 양수
pub fn validate_bid_amount(amount: i64) -> Result<(), BidError> {
    if amount <= 0 {
        return Err(BidError::Validation {
            field: "bid_amount",
            message: "입찰 금액은 양수여야 합니다.".to_string(),
        });
    }
    Ok(())
}

/// 이메일 형식 검사: 로컬@도메인, 도메인에 점 포함, 공백 불가
pub fn is_valid_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

// endregion: --- Validation

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed_and_length_checked() {
        assert_eq!(validate_bidder_name("  홍길동  ").unwrap(), "홍길동");
        assert!(validate_bidder_name("ab").is_err());
        assert!(validate_bidder_name("   ").is_err());
        assert!(validate_bidder_name(&"a".repeat(101)).is_err());
        assert!(validate_bidder_name(&"a".repeat(100)).is_ok());
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(validate_bidder_email("bob@example.com").is_ok());
        assert!(validate_bidder_email("not-an-email").is_err());
        assert!(validate_bidder_email("@example.com").is_err());
        assert!(validate_bidder_email("bob@").is_err());
        assert!(validate_bidder_email("bob@example").is_err());
        assert!(validate_bidder_email("bob smith@example.com").is_err());
        assert!(validate_bidder_email("bob@@example.com").is_err());
    }

    #[test]
    fn overlong_email_is_rejected() {
        let local = "a".repeat(250);
        assert!(validate_bidder_email(&format!("{}@example.com", local)).is_err());
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(validate_bid_amount(1).is_ok());
        assert!(validate_bid_amount(0).is_err());
        assert!(validate_bid_amount(-100).is_err());
    }

    #[test]
    fn validation_order_reports_name_first() {
        // 이름과 이메일이 모두 잘못된 명령은 이름 오류를 먼저 보고해야 한다.
        let name_error = validate_bidder_name("ab").unwrap_err();
        match name_error {
            BidError::Validation { field, .. } => assert_eq!(field, "bidder_name"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
