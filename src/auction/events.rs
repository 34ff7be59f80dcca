use crate::bidding::model::{Auction, Bid, SalesTransaction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 변경 이벤트 작업 종류(행 삽입 / 행 갱신)
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Insert,
    Update,
}

/// 실시간 팬아웃으로 발행되는 행 단위 변경 이벤트
/// 경매 id를 메시지 키로 사용해 경매별 커밋 순서를 유지한다.
/// 전달은 최소 1회 보장이며 재접속한 클라이언트는 현재 상태를 다시 조회해야 한다.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChangeEvent {
    pub table: String,
    pub op: ChangeOp,
    pub auction_id: Option<i64>,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// 입찰 삽입 이벤트
    pub fn bid_inserted(bid: &Bid) -> Self {
        ChangeEvent {
            table: "bids".to_string(),
            op: ChangeOp::Insert,
            auction_id: Some(bid.auction_id),
            payload: serde_json::to_value(bid).unwrap_or_default(),
            timestamp: Utc::now(),
        }
    }

    /// 경매 생성 이벤트
    pub fn auction_inserted(auction: &Auction) -> Self {
        ChangeEvent {
            table: "auctions".to_string(),
            op: ChangeOp::Insert,
            auction_id: Some(auction.id),
            payload: serde_json::to_value(auction).unwrap_or_default(),
            timestamp: Utc::now(),
        }
    }

    /// 경매 갱신 이벤트(바닥가 갱신, 마감 등)
    pub fn auction_updated(auction: &Auction) -> Self {
        ChangeEvent {
            table: "auctions".to_string(),
            op: ChangeOp::Update,
            auction_id: Some(auction.id),
            payload: serde_json::to_value(auction).unwrap_or_default(),
            timestamp: Utc::now(),
        }
    }

    /// 판매 기록 삽입 이벤트
    pub fn sale_inserted(sale: &SalesTransaction) -> Self {
        ChangeEvent {
            table: "sales_transactions".to_string(),
            op: ChangeOp::Insert,
            auction_id: sale.auction_id,
            payload: serde_json::to_value(sale).unwrap_or_default(),
            timestamp: Utc::now(),
        }
    }

    /// 메시지 키: 경매 id가 있으면 경매별 파티셔닝, 없으면 테이블 단위
    pub fn key(&self) -> String {
        match self.auction_id {
            Some(id) => id.to_string(),
            None => self.table.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bid() -> Bid {
        Bid {
            id: 7,
            auction_id: 42,
            bidder_name: "홍길동".to_string(),
            bidder_email: "hong@example.com".to_string(),
            bid_amount: 10100,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn bid_event_keyed_by_auction_id() {
        let event = ChangeEvent::bid_inserted(&sample_bid());
        assert_eq!(event.key(), "42");
        assert_eq!(event.table, "bids");
        assert_eq!(event.op, ChangeOp::Insert);
        assert_eq!(event.payload["bid_amount"], 10100);
    }

    #[test]
    fn event_without_auction_id_keyed_by_table() {
        let sale = SalesTransaction {
            id: 1,
            auction_id: None,
            car_id: Some(3),
            customer_name: "김구매".to_string(),
            customer_email: "kim@example.com".to_string(),
            amount: 55000,
            sale_type: "purchase".to_string(),
            transaction_date: Utc::now(),
            created_at: Utc::now(),
        };
        let event = ChangeEvent::sale_inserted(&sale);
        assert_eq!(event.key(), "sales_transactions");
    }

    #[test]
    fn change_op_serializes_lowercase() {
        let event = ChangeEvent::bid_inserted(&sample_bid());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["op"], "insert");
    }
}
