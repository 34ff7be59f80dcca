use chrono::{DateTime, Duration, Utc};
use dealership_auction_service::auction::events::ChangeEvent;
use dealership_auction_service::bidding::commands::{handle_place_bid, PlaceBidCommand};
use dealership_auction_service::bidding::model::{Auction, SalesTransaction};
use dealership_auction_service::database::DatabaseManager;
use dealership_auction_service::errors::BidError;
use dealership_auction_service::message_broker::{ChangeNotifier, KafkaManager, CHANGES_TOPIC};
use dealership_auction_service::query;
use dealership_auction_service::scheduler::sweep_ended_auctions;
use reqwest::Client;
use serde_json::json;
use sqlx::Row;
use std::sync::{Arc, Mutex};
use tracing::info;

/// 트레이싱 초기화
fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 데이터베이스 매니저 설정
async fn setup() -> Arc<DatabaseManager> {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db_manager = Arc::new(
        DatabaseManager::new(&database_url)
            .await
            .expect("데이터베이스 연결 실패"),
    );
    db_manager
        .initialize_database()
        .await
        .expect("스키마 초기화 실패");
    db_manager
}

/// 발행된 변경 이벤트를 기록만 하는 테스트용 노티파이어
#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<ChangeEvent>>,
}

#[async_trait::async_trait]
impl ChangeNotifier for RecordingNotifier {
    async fn notify(&self, event: &ChangeEvent) -> Result<(), String> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// 테스트용 경매 생성
async fn create_test_auction(
    db_manager: &DatabaseManager,
    car_name: &str,
    starting_bid: i64,
    end_time: DateTime<Utc>,
) -> Auction {
    let car_name = car_name.to_string();
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(
                    "INSERT INTO auctions
                        (car_name, description, current_bid, total_bids, end_time, status,
                         created_at, updated_at)
                     VALUES ($1, $2, $3, 0, $4, 'active', $5, $5)
                     RETURNING *",
                )
                .bind(&car_name)
                .bind("통합 테스트용 경매입니다.")
                .bind(starting_bid)
                .bind(end_time)
                .bind(Utc::now())
                .fetch_one(&mut **tx)
                .await
            })
        })
        .await
        .unwrap()
}

/// 경매 종료 시각을 과거로 옮김
async fn expire_auction(db_manager: &DatabaseManager, auction_id: i64) {
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query("UPDATE auctions SET end_time = $1 WHERE id = $2")
                    .bind(Utc::now() - Duration::seconds(1))
                    .bind(auction_id)
                    .execute(&mut **tx)
                    .await
            })
        })
        .await
        .unwrap();
}

/// 경매를 closed 상태로 만듦
async fn close_auction(db_manager: &DatabaseManager, auction_id: i64) {
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query("UPDATE auctions SET status = 'closed' WHERE id = $1")
                    .bind(auction_id)
                    .execute(&mut **tx)
                    .await
            })
        })
        .await
        .unwrap();
}

/// 경매의 판매 기록 수
async fn count_auction_transactions(db_manager: &DatabaseManager, auction_id: i64) -> i64 {
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let row = sqlx::query(
                    "SELECT COUNT(*) AS count FROM sales_transactions WHERE auction_id = $1",
                )
                .bind(auction_id)
                .fetch_one(&mut **tx)
                .await?;
                Ok::<i64, sqlx::Error>(row.get("count"))
            })
        })
        .await
        .unwrap()
}

/// 경매의 판매 기록 단건 조회
async fn get_auction_transaction(
    db_manager: &DatabaseManager,
    auction_id: i64,
) -> SalesTransaction {
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, SalesTransaction>(
                    "SELECT * FROM sales_transactions WHERE auction_id = $1",
                )
                .bind(auction_id)
                .fetch_one(&mut **tx)
                .await
            })
        })
        .await
        .unwrap()
}

fn bid_cmd(auction_id: i64, amount: i64) -> PlaceBidCommand {
    PlaceBidCommand {
        auction_id,
        bidder_name: "테스트 입찰자".to_string(),
        bidder_email: "bidder@example.com".to_string(),
        bid_amount: amount,
    }
}

/// 입찰 수락이 바닥가와 원장을 함께 갱신하는지 확인
#[tokio::test]
#[ignore = "PostgreSQL 이 필요한 테스트"]
async fn test_place_bid_updates_floor_and_ledger() {
    let db_manager = setup().await;
    let notifier = RecordingNotifier::default();
    let auction = create_test_auction(
        &db_manager,
        "입찰 테스트 차량",
        10000,
        Utc::now() + Duration::hours(2),
    )
    .await;

    let accepted = handle_place_bid(bid_cmd(auction.id, 10100), &db_manager, &notifier)
        .await
        .unwrap();
    assert_eq!(accepted.current_bid, 10100);
    assert_eq!(accepted.total_bids, 1);

    let updated = query::handlers::get_auction(&db_manager, auction.id)
        .await
        .unwrap();
    assert_eq!(updated.current_bid, 10100);
    assert_eq!(updated.total_bids, 1);

    let ledger = query::handlers::get_bid_ledger(&db_manager, auction.id)
        .await
        .unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].bid_amount, 10100);

    // 입찰 삽입과 경매 갱신 이벤트가 순서대로 발행되어야 한다
    let events = notifier.events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].table, "bids");
    assert_eq!(events[1].table, "auctions");
}

/// 최소 증가분(+100)이 서버 측 불변식으로 강제되는지 확인
/// 바닥가 10000 에 10050 입찰은 엄격 증가이지만 증가분 미달로 거절된다.
#[tokio::test]
#[ignore = "PostgreSQL 이 필요한 테스트"]
async fn test_minimum_increment_is_enforced() {
    let db_manager = setup().await;
    let notifier = RecordingNotifier::default();
    let auction = create_test_auction(
        &db_manager,
        "증가분 테스트 차량",
        10000,
        Utc::now() + Duration::hours(2),
    )
    .await;

    let err = handle_place_bid(bid_cmd(auction.id, 10050), &db_manager, &notifier)
        .await
        .unwrap_err();
    match err {
        BidError::TooLow { current_bid } => assert_eq!(current_bid, 10000),
        other => panic!("예상과 다른 오류: {:?}", other),
    }

    // 정확히 증가분을 충족하면 수락된다
    let accepted = handle_place_bid(bid_cmd(auction.id, 10100), &db_manager, &notifier)
        .await
        .unwrap();
    assert_eq!(accepted.current_bid, 10100);
}

/// 바닥가를 순서대로 넘어서는 두 입찰은 모두 수락된다
#[tokio::test]
#[ignore = "PostgreSQL 이 필요한 테스트"]
async fn test_two_rising_bids_are_both_admitted() {
    let db_manager = setup().await;
    let notifier = RecordingNotifier::default();
    let auction = create_test_auction(
        &db_manager,
        "연속 입찰 테스트 차량",
        10000,
        Utc::now() + Duration::hours(2),
    )
    .await;

    handle_place_bid(bid_cmd(auction.id, 10200), &db_manager, &notifier)
        .await
        .unwrap();
    handle_place_bid(bid_cmd(auction.id, 10500), &db_manager, &notifier)
        .await
        .unwrap();

    let updated = query::handlers::get_auction(&db_manager, auction.id)
        .await
        .unwrap();
    assert_eq!(updated.current_bid, 10500);
    assert_eq!(updated.total_bids, 2);

    let ledger = query::handlers::get_bid_ledger(&db_manager, auction.id)
        .await
        .unwrap();
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger[0].bid_amount, 10500);
    assert_eq!(ledger[1].bid_amount, 10200);
}

/// 잘못된 이메일은 검증 오류가 되고 경매 상태는 그대로여야 한다
#[tokio::test]
#[ignore = "PostgreSQL 이 필요한 테스트"]
async fn test_invalid_email_leaves_auction_unchanged() {
    let db_manager = setup().await;
    let notifier = RecordingNotifier::default();
    let auction = create_test_auction(
        &db_manager,
        "검증 테스트 차량",
        10000,
        Utc::now() + Duration::hours(2),
    )
    .await;

    let mut cmd = bid_cmd(auction.id, 12000);
    cmd.bidder_email = "not-an-email".to_string();
    let err = handle_place_bid(cmd, &db_manager, &notifier)
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::Validation { field, .. } if field == "bidder_email"));

    let unchanged = query::handlers::get_auction(&db_manager, auction.id)
        .await
        .unwrap();
    assert_eq!(unchanged.current_bid, 10000);
    assert_eq!(unchanged.total_bids, 0);
    assert!(notifier.events.lock().unwrap().is_empty());
}

/// 종료 시각이 지난 경매에는 입찰할 수 없다(서버 시각이 기준)
#[tokio::test]
#[ignore = "PostgreSQL 이 필요한 테스트"]
async fn test_bid_on_ended_auction_is_rejected() {
    let db_manager = setup().await;
    let notifier = RecordingNotifier::default();
    let auction = create_test_auction(
        &db_manager,
        "종료 테스트 차량",
        10000,
        Utc::now() - Duration::seconds(1),
    )
    .await;

    let err = handle_place_bid(bid_cmd(auction.id, 20000), &db_manager, &notifier)
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::NotBiddable { .. }));
}

/// 마감된 경매에는 금액과 무관하게 입찰할 수 없다
#[tokio::test]
#[ignore = "PostgreSQL 이 필요한 테스트"]
async fn test_bid_after_close_is_rejected() {
    let db_manager = setup().await;
    let notifier = RecordingNotifier::default();
    let auction = create_test_auction(
        &db_manager,
        "마감 후 입찰 테스트 차량",
        10000,
        Utc::now() + Duration::hours(2),
    )
    .await;
    close_auction(&db_manager, auction.id).await;

    let err = handle_place_bid(bid_cmd(auction.id, 1000000), &db_manager, &notifier)
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::NotBiddable { .. }));
}

/// 없는 경매 입찰은 NotBiddable 로 거절된다
#[tokio::test]
#[ignore = "PostgreSQL 이 필요한 테스트"]
async fn test_bid_on_missing_auction_is_rejected() {
    let db_manager = setup().await;
    let notifier = RecordingNotifier::default();

    let err = handle_place_bid(bid_cmd(-1, 20000), &db_manager, &notifier)
        .await
        .unwrap_err();
    assert!(matches!(err, BidError::NotBiddable { .. }));
}

/// 동시 입찰 경쟁에서도 바닥가는 원장의 최대 금액과 항상 일치해야 한다
#[tokio::test]
#[ignore = "PostgreSQL 이 필요한 테스트"]
async fn test_concurrent_bidding_keeps_floor_monotonic() {
    init_tracing();
    let db_manager = setup().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let auction = create_test_auction(
        &db_manager,
        "동시성 테스트 차량",
        10000,
        Utc::now() + Duration::hours(2),
    )
    .await;

    // 50개의 동시 입찰 생성
    let mut handles = vec![];
    for i in 1..=50 {
        let db_manager = Arc::clone(&db_manager);
        let notifier = Arc::clone(&notifier);
        let auction_id = auction.id;
        let bid_amount = 10000 + i * 1000;

        let handle = tokio::spawn(async move {
            let cmd = PlaceBidCommand {
                auction_id,
                bidder_name: format!("입찰자 {}", i),
                bidder_email: format!("bidder{}@example.com", i),
                bid_amount,
            };
            handle_place_bid(cmd, &db_manager, &*notifier).await
        });
        handles.push(handle);
    }

    let mut accepted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(BidError::TooLow { .. }) => rejected += 1,
            Err(other) => panic!("예상과 다른 오류: {:?}", other),
        }
    }
    info!("수락된 입찰 수: {}, 거절된 입찰 수: {}", accepted, rejected);

    let final_auction = query::handlers::get_auction(&db_manager, auction.id)
        .await
        .unwrap();
    let ledger = query::handlers::get_bid_ledger(&db_manager, auction.id)
        .await
        .unwrap();

    // 최고액 입찰은 어떤 인터리빙에서도 수락된다
    assert_eq!(final_auction.current_bid, 60000);
    // 바닥가 = 원장의 최대 금액, 입찰 수 = 수락된 건수
    assert_eq!(ledger.len(), accepted);
    assert_eq!(final_auction.total_bids as usize, accepted);
    assert_eq!(ledger[0].bid_amount, final_auction.current_bid);
}

/// 만료된 경매 마감: 최고 입찰이 판매 기록으로 반영된다
#[tokio::test]
#[ignore = "PostgreSQL 이 필요한 테스트"]
async fn test_sweep_closes_and_records_winner() {
    let db_manager = setup().await;
    let notifier = RecordingNotifier::default();
    let auction = create_test_auction(
        &db_manager,
        "낙찰 테스트 차량",
        10000,
        Utc::now() + Duration::hours(2),
    )
    .await;

    let mut cmd = bid_cmd(auction.id, 15000);
    cmd.bidder_email = "bob@example.com".to_string();
    cmd.bidder_name = "Bob Winner".to_string();
    handle_place_bid(cmd, &db_manager, &notifier).await.unwrap();

    expire_auction(&db_manager, auction.id).await;

    let summary = sweep_ended_auctions(db_manager.pool(), &notifier)
        .await
        .unwrap();
    assert!(summary.processed >= 1);
    let outcome = summary
        .closed
        .iter()
        .find(|o| o.auction == "낙찰 테스트 차량")
        .expect("마감 대상에 포함되어야 함");
    assert_eq!(outcome.winner.as_deref(), Some("bob@example.com"));
    assert_eq!(outcome.amount, 15000);
    assert!(outcome.error.is_none());

    let closed = query::handlers::get_auction(&db_manager, auction.id)
        .await
        .unwrap();
    assert_eq!(closed.status, "closed");

    let sale = get_auction_transaction(&db_manager, auction.id).await;
    assert_eq!(sale.amount, 15000);
    assert_eq!(sale.customer_email, "bob@example.com");
    assert_eq!(sale.sale_type, "auction");
}

/// 입찰 없는 경매 마감: 판매 기록 없이 닫힌다
#[tokio::test]
#[ignore = "PostgreSQL 이 필요한 테스트"]
async fn test_sweep_with_no_bids_closes_without_sale() {
    let db_manager = setup().await;
    let notifier = RecordingNotifier::default();
    let auction = create_test_auction(
        &db_manager,
        "무입찰 테스트 차량",
        10000,
        Utc::now() - Duration::seconds(1),
    )
    .await;

    let summary = sweep_ended_auctions(db_manager.pool(), &notifier)
        .await
        .unwrap();
    let outcome = summary
        .closed
        .iter()
        .find(|o| o.auction == "무입찰 테스트 차량")
        .expect("마감 대상에 포함되어야 함");
    assert!(outcome.winner.is_none());
    assert_eq!(outcome.amount, 0);

    let closed = query::handlers::get_auction(&db_manager, auction.id)
        .await
        .unwrap();
    assert_eq!(closed.status, "closed");
    assert_eq!(count_auction_transactions(&db_manager, auction.id).await, 0);
}

/// 마감 재호출은 무해하다: 새 만료가 없으면 0건 처리, 판매 기록도 중복되지 않는다
#[tokio::test]
#[ignore = "PostgreSQL 이 필요한 테스트"]
async fn test_sweep_is_idempotent() {
    let db_manager = setup().await;
    let notifier = RecordingNotifier::default();
    let auction = create_test_auction(
        &db_manager,
        "멱등성 테스트 차량",
        10000,
        Utc::now() + Duration::hours(2),
    )
    .await;
    handle_place_bid(bid_cmd(auction.id, 11000), &db_manager, &notifier)
        .await
        .unwrap();
    expire_auction(&db_manager, auction.id).await;

    let first = sweep_ended_auctions(db_manager.pool(), &notifier)
        .await
        .unwrap();
    assert!(first.processed >= 1);

    let second = sweep_ended_auctions(db_manager.pool(), &notifier)
        .await
        .unwrap();
    let reprocessed = second
        .closed
        .iter()
        .any(|o| o.auction == "멱등성 테스트 차량");
    assert!(!reprocessed);
    assert_eq!(count_auction_transactions(&db_manager, auction.id).await, 1);
}

/// HTTP 입찰 엔드포인트 동작 확인(실행 중인 서버 기준)
#[tokio::test]
#[ignore = "실행 중인 서비스(서버 / PostgreSQL / Kafka)가 필요한 테스트"]
async fn test_http_place_bid() {
    let db_manager = setup().await;
    let client = Client::new();
    let auction = create_test_auction(
        &db_manager,
        "HTTP 입찰 테스트 차량",
        10000,
        Utc::now() + Duration::hours(2),
    )
    .await;

    let bid_data = json!({
        "auction_id": auction.id,
        "bidder_name": "HTTP 테스터",
        "bidder_email": "http@example.com",
        "bid_amount": auction.current_bid + 1000
    });

    let response = client
        .post("http://localhost:3000/bids")
        .json(&bid_data)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let updated = query::handlers::get_auction(&db_manager, auction.id)
        .await
        .unwrap();
    assert_eq!(updated.current_bid, auction.current_bid + 1000);
}

/// 입찰 변경 이벤트가 경매 id 필터를 거쳐 구독자에게 전달되는지 확인
#[tokio::test]
#[ignore = "실행 중인 Kafka 와 PostgreSQL 이 필요한 테스트"]
async fn test_change_fanout_delivers_bid_events() {
    let db_manager = setup().await;
    let auction = create_test_auction(
        &db_manager,
        "팬아웃 테스트 차량",
        10000,
        Utc::now() + Duration::hours(2),
    )
    .await;

    let brokers = std::env::var("KAFKA_BROKERS").unwrap_or_else(|_| "localhost:9092".to_string());
    let kafka_manager = KafkaManager::new(&brokers);
    kafka_manager.create_topic(CHANGES_TOPIC, 5, 1).await.ok();

    let (tx_ch, mut rx_ch) = tokio::sync::mpsc::unbounded_channel();
    let consumer = kafka_manager.get_consumer();
    let auction_id = auction.id;
    tokio::spawn(async move {
        let _ = consumer
            .consume_changes(
                CHANGES_TOPIC,
                Some("bids".to_string()),
                Some(auction_id),
                move |event| {
                    let tx_ch = tx_ch.clone();
                    Box::pin(async move {
                        let _ = tx_ch.send(event);
                        Ok(())
                    })
                },
            )
            .await;
    });

    // 구독이 자리잡을 때까지 대기
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    let producer = kafka_manager.get_producer();
    handle_place_bid(bid_cmd(auction.id, 10100), &db_manager, &*producer)
        .await
        .unwrap();

    let event = tokio::time::timeout(std::time::Duration::from_secs(10), rx_ch.recv())
        .await
        .expect("이벤트 수신 시간 초과")
        .expect("채널이 닫힘");
    assert_eq!(event.table, "bids");
    assert_eq!(event.auction_id, Some(auction.id));
    assert_eq!(event.payload["bid_amount"], 10100);
}
