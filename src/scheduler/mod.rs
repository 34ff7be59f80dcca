/// 종료 경매 마감 스케줄러
/// 만료된 활성 경매를 closed 로 전이시키고 최고 입찰을 판매 기록으로 반영한다.
/// 주기 실행과 관리자 "지금 마감" 트리거는 동일한 sweep 연산을 호출한다.
// region:    --- Imports
use crate::auction::events::ChangeEvent;
use crate::bidding::model::{Auction, Bid, SalesTransaction};
use crate::message_broker::{ChangeNotifier, KafkaProducer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info, warn};

// endregion: --- Imports

// region:    --- Sweep Summary

/// 경매 한 건의 마감 결과
#[derive(Debug, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub auction: String,
    pub winner: Option<String>,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// sweep 한 번의 요약
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SweepSummary {
    pub processed: i64,
    pub closed: Vec<SweepOutcome>,
}

// endregion: --- Sweep Summary

// region:    --- Auction Sweeper

/// 경매 마감 스케줄러
pub struct AuctionSweeper {
    pool: Arc<PgPool>,
    notifier: Arc<KafkaProducer>,
    interval_secs: u64,
}

impl AuctionSweeper {
    pub fn new(pool: Arc<PgPool>, notifier: Arc<KafkaProducer>, interval_secs: u64) -> Self {
        Self {
            pool,
            notifier,
            interval_secs,
        }
    }

    /// 마감 스케줄러 시작
    pub async fn start(&self) {
        let pool = Arc::clone(&self.pool);
        let notifier = Arc::clone(&self.notifier);
        let interval_secs = self.interval_secs;
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(interval_secs));
            loop {
                interval.tick().await;
                match sweep_ended_auctions(&pool, &*notifier).await {
                    Ok(summary) if summary.processed > 0 => {
                        info!(
                            "{:<12} --> 경매 {}건 마감 처리",
                            "Sweeper", summary.processed
                        );
                    }
                    Ok(_) => {
                        debug!("{:<12} --> 마감 대상 경매 없음", "Sweeper");
                    }
                    Err(e) => {
                        error!("{:<12} --> 경매 마감 중 오류 발생: {:?}", "Sweeper", e);
                    }
                }
            }
        });
    }
}

/// 만료된 활성 경매 일괄 마감
///
/// 경매별로 독립 처리하며 한 건의 실패는 나머지 처리를 중단하지 않는다.
/// 이미 마감된 경매는 status = 'active' 필터로 제외되므로 재호출은 무해하다.
pub async fn sweep_ended_auctions(
    pool: &PgPool,
    notifier: &impl ChangeNotifier,
) -> Result<SweepSummary, sqlx::Error> {
    let now = Utc::now();

    let ended = sqlx::query_as::<_, Auction>(
        "SELECT * FROM auctions
         WHERE status = 'active' AND end_time < $1
         ORDER BY end_time ASC",
    )
    .bind(now)
    .fetch_all(pool)
    .await?;

    if !ended.is_empty() {
        info!(
            "{:<12} --> 만료된 활성 경매 {}건 발견",
            "Sweeper",
            ended.len()
        );
    }

    let mut summary = SweepSummary::default();
    for auction in &ended {
        if let Some(outcome) = close_one(pool, notifier, auction, now).await {
            summary.processed += 1;
            summary.closed.push(outcome);
        }
    }

    Ok(summary)
}

/// 경매 한 건 마감
///
/// 상태 전이(active -> closed)가 직렬화 지점이다: 조건부 갱신이 0행이면
/// 동시 실행된 다른 sweep 이 이미 처리한 것이므로 None 을 돌려 건너뛴다.
/// 낙찰자는 상태 전이 이후에 조회한다. 전이보다 먼저 커밋된 입찰은 조회에
/// 포함되고, 전이 이후의 입찰 시도는 수락기의 status 조건에서 거절된다.
async fn close_one(
    pool: &PgPool,
    notifier: &impl ChangeNotifier,
    auction: &Auction,
    now: DateTime<Utc>,
) -> Option<SweepOutcome> {
    let closed = match sqlx::query_as::<_, Auction>(
        "UPDATE auctions SET status = 'closed', updated_at = $1
         WHERE id = $2 AND status = 'active'
         RETURNING *",
    )
    .bind(now)
    .bind(auction.id)
    .fetch_optional(pool)
    .await
    {
        Ok(Some(closed)) => closed,
        Ok(None) => {
            debug!(
                "{:<12} --> 경매 {} 는 이미 마감됨, 건너뜀",
                "Sweeper", auction.id
            );
            return None;
        }
        Err(e) => {
            error!(
                "{:<12} --> 경매 {} 마감 실패: {:?}",
                "Sweeper", auction.id, e
            );
            return Some(SweepOutcome {
                auction: auction.car_name.clone(),
                winner: None,
                amount: 0,
                error: Some(format!("마감 실패: {}", e)),
            });
        }
    };

    info!(
        "{:<12} --> 경매 마감: id={}, car_name={}",
        "Sweeper", closed.id, closed.car_name
    );

    if let Err(e) = notifier.notify(&ChangeEvent::auction_updated(&closed)).await {
        warn!("{:<12} --> 마감 이벤트 발행 실패: {}", "Sweeper", e);
    }

    // 낙찰자 조회. 상위 2건을 읽어 동률을 감지한다: 엄격 증가 수락 규칙에서
    // 동률은 나올 수 없으므로 관측되면 데이터 정합성 신호로 기록만 한다.
    let top_bids = match sqlx::query_as::<_, Bid>(
        "SELECT * FROM bids WHERE auction_id = $1
         ORDER BY bid_amount DESC, created_at ASC
         LIMIT 2",
    )
    .bind(closed.id)
    .fetch_all(pool)
    .await
    {
        Ok(bids) => bids,
        Err(e) => {
            error!(
                "{:<12} --> 경매 {} 낙찰자 조회 실패: {:?}",
                "Sweeper", closed.id, e
            );
            return Some(SweepOutcome {
                auction: closed.car_name,
                winner: None,
                amount: 0,
                error: Some(format!("낙찰자 조회 실패: {}", e)),
            });
        }
    };

    if top_bids.len() == 2 && top_bids[0].bid_amount == top_bids[1].bid_amount {
        warn!(
            "{:<12} --> 경매 {} 에서 동일 최고 입찰액 {} 감지, 선착순 적용",
            "Sweeper", closed.id, top_bids[0].bid_amount
        );
    }

    let Some(winner) = top_bids.into_iter().next() else {
        info!(
            "{:<12} --> 경매 {} 는 입찰 없이 마감",
            "Sweeper", closed.id
        );
        return Some(SweepOutcome {
            auction: closed.car_name,
            winner: None,
            amount: 0,
            error: None,
        });
    };

    // 낙찰 판매 기록 생성(마감된 경매당 한 건)
    match sqlx::query_as::<_, SalesTransaction>(
        "INSERT INTO sales_transactions
            (auction_id, customer_name, customer_email, amount, sale_type, transaction_date)
         VALUES ($1, $2, $3, $4, 'auction', $5)
         RETURNING *",
    )
    .bind(closed.id)
    .bind(&winner.bidder_name)
    .bind(&winner.bidder_email)
    .bind(winner.bid_amount)
    .bind(now)
    .fetch_one(pool)
    .await
    {
        Ok(sale) => {
            info!(
                "{:<12} --> 낙찰 기록: {} - {}",
                "Sweeper", winner.bidder_email, winner.bid_amount
            );
            if let Err(e) = notifier.notify(&ChangeEvent::sale_inserted(&sale)).await {
                warn!("{:<12} --> 판매 이벤트 발행 실패: {}", "Sweeper", e);
            }
            Some(SweepOutcome {
                auction: closed.car_name,
                winner: Some(winner.bidder_email),
                amount: winner.bid_amount,
                error: None,
            })
        }
        Err(e) => {
            // 경매는 이미 마감됨. 기록 실패만 표시하고 나머지 경매는 계속 처리한다.
            error!(
                "{:<12} --> 경매 {} 판매 기록 실패: {:?}",
                "Sweeper", closed.id, e
            );
            Some(SweepOutcome {
                auction: closed.car_name,
                winner: Some(winner.bidder_email),
                amount: winner.bid_amount,
                error: Some(format!("판매 기록 실패: {}", e)),
            })
        }
    }
}

// endregion: --- Auction Sweeper

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_omits_error_field_when_clean() {
        let summary = SweepSummary {
            processed: 1,
            closed: vec![SweepOutcome {
                auction: "제네시스 G90".to_string(),
                winner: Some("bob@example.com".to_string()),
                amount: 15000,
                error: None,
            }],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["processed"], 1);
        assert_eq!(json["closed"][0]["winner"], "bob@example.com");
        assert!(json["closed"][0].get("error").is_none());
    }

    #[test]
    fn summary_marks_failed_auction() {
        let summary = SweepSummary {
            processed: 2,
            closed: vec![
                SweepOutcome {
                    auction: "아반떼".to_string(),
                    winner: None,
                    amount: 0,
                    error: None,
                },
                SweepOutcome {
                    auction: "쏘나타".to_string(),
                    winner: Some("amy@example.com".to_string()),
                    amount: 22000,
                    error: Some("판매 기록 실패: timeout".to_string()),
                },
            ],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["closed"][0].get("error").is_none());
        assert_eq!(
            json["closed"][1]["error"],
            "판매 기록 실패: timeout"
        );
    }

    #[test]
    fn empty_sweep_serializes_to_zero_processed() {
        let summary = SweepSummary::default();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["processed"], 0);
        assert_eq!(json["closed"].as_array().unwrap().len(), 0);
    }
}
