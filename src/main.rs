// region:    --- Imports
use crate::config::Config;
use crate::database::DatabaseManager;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use message_broker::{KafkaManager, CHANGES_TOPIC};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Modules
mod auction;
mod bidding;
mod config;
mod content;
mod database;
mod errors;
mod handlers;
mod message_broker;
mod query;
mod scheduler;

// endregion: --- Modules

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 환경 변수 설정 읽기
    let config = Config::from_env()?;

    // DatabaseManager 생성
    let db_manager = Arc::new(DatabaseManager::new(&config.database_url).await?);

    // 스키마 초기화
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // Kafka 매니저 생성 및 초기화
    let kafka_manager = Arc::new(KafkaManager::new(&config.kafka_brokers));
    if let Err(e) = kafka_manager.initialize().await {
        error!("{:<12} --> Kafka 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> Kafka 초기화 성공", "Main");

    // 변경 이벤트 토픽 생성
    kafka_manager.create_topic(CHANGES_TOPIC, 5, 1).await?;

    // 종료 경매 마감 스케줄러 시작
    let sweeper = scheduler::AuctionSweeper::new(
        db_manager.get_pool(),
        kafka_manager.get_producer(),
        config.sweep_interval_secs,
    );
    sweeper.start().await;

    // 브라우저 클라이언트를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 라우터 설정
    let routes_all = Router::new()
        // 공개 경매
        .route("/auctions", get(handlers::handle_get_auctions))
        .route("/auctions/:id", get(handlers::handle_get_auction))
        .route("/auctions/:id/bids", get(handlers::handle_get_recent_bids))
        .route(
            "/auctions/:id/highest-bid",
            get(handlers::handle_get_highest_bid),
        )
        .route("/bids", post(handlers::handle_bid))
        // 재고 및 구매
        .route("/cars", get(handlers::handle_get_cars))
        .route("/cars/:id", get(handlers::handle_get_car))
        .route("/purchases", post(handlers::handle_purchase))
        // 콘텐츠
        .route("/content/home", get(handlers::handle_get_home_content))
        .route("/content/about", get(handlers::handle_get_about_content))
        .route("/contact-info", get(handlers::handle_get_contact_info))
        .route("/contact", post(handlers::handle_submit_contact))
        .route("/settings", get(handlers::handle_get_settings))
        // 관리자: 경매
        .route(
            "/admin/auctions",
            get(handlers::handle_admin_get_auctions).post(handlers::handle_create_auction),
        )
        .route("/admin/auctions/sweep", post(handlers::handle_sweep_now))
        .route(
            "/admin/auctions/:id",
            put(handlers::handle_update_auction).delete(handlers::handle_delete_auction),
        )
        .route(
            "/admin/auctions/:id/bids",
            get(handlers::handle_get_bid_ledger),
        )
        // 관리자: 차량
        .route(
            "/admin/cars",
            get(handlers::handle_admin_get_cars).post(handlers::handle_create_car),
        )
        .route(
            "/admin/cars/:id",
            put(handlers::handle_update_car).delete(handlers::handle_delete_car),
        )
        // 관리자: 판매
        .route("/admin/transactions", get(handlers::handle_get_transactions))
        .route("/admin/statistics", get(handlers::handle_get_statistics))
        // 관리자: 콘텐츠
        .route(
            "/admin/content/home",
            post(handlers::handle_create_home_section),
        )
        .route(
            "/admin/content/home/:id",
            put(handlers::handle_update_home_section),
        )
        .route(
            "/admin/content/about",
            post(handlers::handle_create_about_section),
        )
        .route(
            "/admin/content/about/:id",
            put(handlers::handle_update_about_section),
        )
        .route(
            "/admin/contact-info",
            put(handlers::handle_update_contact_info),
        )
        .route(
            "/admin/contact-submissions",
            get(handlers::handle_get_contact_submissions),
        )
        .route(
            "/admin/contact-submissions/:id/read",
            post(handlers::handle_mark_submission_read),
        )
        .route("/admin/settings", put(handlers::handle_update_settings))
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 폼 및 JSON 페이로드 상한(1MB)
        .with_state((db_manager, kafka_manager.get_producer()));

    // 리스너 생성
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
