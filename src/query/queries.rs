/// 활성 경매 조회(종료 시각 오름차순)
pub const GET_ACTIVE_AUCTIONS: &str =
    "SELECT * FROM auctions WHERE status = 'active' ORDER BY end_time ASC";

/// 경매 단건 조회
pub const GET_AUCTION: &str = "SELECT * FROM auctions WHERE id = $1";

/// 관리자 경매 목록 조회(최근 생성 순)
pub const GET_AUCTIONS_ADMIN: &str = "SELECT * FROM auctions ORDER BY created_at DESC";

/// 관리자 경매 목록 조회(상태 필터)
pub const GET_AUCTIONS_ADMIN_BY_STATUS: &str =
    "SELECT * FROM auctions WHERE status = $1 ORDER BY created_at DESC";

/// 최근 입찰 조회(최신 순, 건수 제한)
pub const GET_RECENT_BIDS: &str = r#"
    SELECT id, auction_id, bidder_name, bidder_email, bid_amount, created_at
    FROM bids
    WHERE auction_id = $1
    ORDER BY created_at DESC
    LIMIT $2
"#;

/// 입찰 원장 전체 조회(금액 내림차순, 동률은 선착순)
pub const GET_BID_LEDGER: &str = r#"
    SELECT id, auction_id, bidder_name, bidder_email, bid_amount, created_at
    FROM bids
    WHERE auction_id = $1
    ORDER BY bid_amount DESC, created_at ASC
"#;

/// 최고 입찰액 조회
pub const GET_HIGHEST_BID: &str =
    "SELECT MAX(bid_amount) AS highest_bid FROM bids WHERE auction_id = $1";

/// 판매 중 차량 조회
pub const GET_ACTIVE_CARS: &str =
    "SELECT * FROM cars WHERE status = 'active' ORDER BY created_at DESC";

/// 차량 단건 조회
pub const GET_CAR: &str = "SELECT * FROM cars WHERE id = $1";

/// 관리자 차량 목록 조회(상태 무관)
pub const GET_CARS_ADMIN: &str = "SELECT * FROM cars ORDER BY created_at DESC";

/// 판매 기록 조회(최근 거래 순)
pub const GET_TRANSACTIONS: &str =
    "SELECT * FROM sales_transactions ORDER BY transaction_date DESC";

/// 판매 기록 조회(기준 시각 이후)
pub const GET_TRANSACTIONS_SINCE: &str = r#"
    SELECT * FROM sales_transactions
    WHERE transaction_date >= $1
    ORDER BY transaction_date DESC
"#;

/// 판매 합계 조회
pub const GET_SALES_TOTALS: &str = r#"
    SELECT COALESCE(SUM(amount), 0)::BIGINT AS total_revenue, COUNT(*) AS total_sales
    FROM sales_transactions
"#;

/// 판매 유형별 건수 조회
pub const GET_SALES_BY_TYPE: &str = r#"
    SELECT sale_type, COUNT(*) AS count
    FROM sales_transactions
    GROUP BY sale_type
    ORDER BY sale_type ASC
"#;

/// 홈 콘텐츠 섹션 조회(노출 순서대로)
pub const GET_HOME_SECTIONS: &str =
    "SELECT * FROM home_content WHERE status = 'active' ORDER BY order_index ASC";

/// 소개 콘텐츠 섹션 조회
pub const GET_ABOUT_SECTIONS: &str =
    "SELECT * FROM about_content WHERE status = 'active' ORDER BY section_type ASC";

/// 연락처 정보 조회(단일 행)
pub const GET_CONTACT_INFO: &str = "SELECT * FROM contact_info ORDER BY id ASC LIMIT 1";

/// 문의 접수 목록 조회(최신 순)
pub const GET_CONTACT_SUBMISSIONS: &str =
    "SELECT * FROM contact_submissions ORDER BY created_at DESC";

/// 사이트 설정 조회(단일 행)
pub const GET_SITE_SETTINGS: &str = "SELECT * FROM site_settings ORDER BY id ASC LIMIT 1";
