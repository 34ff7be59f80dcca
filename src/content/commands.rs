/// 사이트 콘텐츠 / 재고 / 판매 커맨드 처리
/// 경매 엔진 바깥의 관리자 CRUD 와 차량 즉시 구매 · 렌탈 흐름을 담당한다.
// region:    --- Imports
use crate::auction::events::ChangeEvent;
use crate::bidding::commands::is_valid_email;
use crate::bidding::model::SalesTransaction;
use crate::content::model::{
    AboutSection, AboutSectionForm, Car, CarForm, ContactInfo, ContactInfoForm, ContactSubmission,
    ContactSubmissionForm, HomeSection, HomeSectionForm, SiteSettings, SiteSettingsForm,
};
use crate::database::DatabaseManager;
use crate::errors::{ApiError, PurchaseError};
use crate::message_broker::ChangeNotifier;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
// endregion: --- Imports

// region:    --- Car Commands

/// 차량 등록
pub async fn create_car(db: &DatabaseManager, form: CarForm) -> Result<Car, ApiError> {
    info!("{:<12} --> 차량 등록: {}", "Content", form.name);
    validate_car_form(&form)?;

    let now = Utc::now();
    let car = sqlx::query_as::<_, Car>(
        "INSERT INTO cars
            (name, description, price, category, year, engine, transmission, color, mileage,
             doors, passengers, speed, image_url, image_hover_url, status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, 'active', $15, $15)
         RETURNING *",
    )
    .bind(&form.name)
    .bind(&form.description)
    .bind(form.price)
    .bind(&form.category)
    .bind(form.year)
    .bind(&form.engine)
    .bind(&form.transmission)
    .bind(&form.color)
    .bind(form.mileage)
    .bind(form.doors)
    .bind(form.passengers)
    .bind(&form.speed)
    .bind(&form.image_url)
    .bind(&form.image_hover_url)
    .bind(now)
    .fetch_one(db.pool())
    .await?;

    Ok(car)
}

/// 차량 수정
pub async fn update_car(
    db: &DatabaseManager,
    car_id: i64,
    form: CarForm,
) -> Result<Car, ApiError> {
    info!("{:<12} --> 차량 수정 id: {}", "Content", car_id);
    validate_car_form(&form)?;

    sqlx::query_as::<_, Car>(
        "UPDATE cars
         SET name = $1, description = $2, price = $3, category = $4, year = $5, engine = $6,
             transmission = $7, color = $8, mileage = $9, doors = $10, passengers = $11,
             speed = $12, image_url = $13, image_hover_url = $14, updated_at = $15
         WHERE id = $16
         RETURNING *",
    )
    .bind(&form.name)
    .bind(&form.description)
    .bind(form.price)
    .bind(&form.category)
    .bind(form.year)
    .bind(&form.engine)
    .bind(&form.transmission)
    .bind(&form.color)
    .bind(form.mileage)
    .bind(form.doors)
    .bind(form.passengers)
    .bind(&form.speed)
    .bind(&form.image_url)
    .bind(&form.image_hover_url)
    .bind(Utc::now())
    .bind(car_id)
    .fetch_optional(db.pool())
    .await?
    .ok_or(ApiError::NotFound)
}

/// 차량 노출 해제(soft delete)
pub async fn deactivate_car(db: &DatabaseManager, car_id: i64) -> Result<Car, ApiError> {
    info!("{:<12} --> 차량 노출 해제 id: {}", "Content", car_id);
    sqlx::query_as::<_, Car>(
        "UPDATE cars SET status = 'inactive', updated_at = $1 WHERE id = $2 RETURNING *",
    )
    .bind(Utc::now())
    .bind(car_id)
    .fetch_optional(db.pool())
    .await?
    .ok_or(ApiError::NotFound)
}

/// 차량 입력 검증
fn validate_car_form(form: &CarForm) -> Result<(), ApiError> {
    if form.name.trim().is_empty() {
        return Err(ApiError::Validation {
            field: "name",
            message: "차량 이름은 비울 수 없습니다.".to_string(),
        });
    }
    if form.price <= 0 {
        return Err(ApiError::Validation {
            field: "price",
            message: "가격은 양수여야 합니다.".to_string(),
        });
    }
    Ok(())
}

// endregion: --- Car Commands

// region:    --- Purchase

/// 즉시 구매 / 렌탈 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PurchaseCommand {
    pub car_id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
    pub sale_type: String,
}

/// 구매 처리 결과
#[derive(Debug, Serialize)]
pub struct PurchaseReceipt {
    pub transaction_id: i64,
    pub car_name: String,
    pub amount: i64,
    pub sale_type: String,
}

/// 렌탈 일일 요금: 차량 가격의 1% 반올림
fn rental_daily_rate(price: i64) -> i64 {
    (price as f64 * 0.01).round() as i64
}

/// 차량 즉시 구매 / 렌탈 처리
/// 구매는 전체 가격, 렌탈은 일일 요금으로 판매 기록을 남긴다.
pub async fn process_purchase(
    cmd: PurchaseCommand,
    db: &DatabaseManager,
    notifier: &impl ChangeNotifier,
) -> Result<PurchaseReceipt, PurchaseError> {
    info!(
        "{:<12} --> 구매 요청 처리 시작: car_id={}, sale_type={}",
        "Content", cmd.car_id, cmd.sale_type
    );

    let customer_name = cmd.customer_name.trim().to_string();
    if customer_name.is_empty() {
        return Err(PurchaseError::Validation {
            field: "customer_name",
            message: "이름은 비울 수 없습니다.".to_string(),
        });
    }
    let customer_email = cmd.customer_email.trim().to_string();
    if !is_valid_email(&customer_email) {
        return Err(PurchaseError::Validation {
            field: "customer_email",
            message: "올바른 이메일 형식이 아닙니다.".to_string(),
        });
    }
    if cmd.sale_type != "purchase" && cmd.sale_type != "rental" {
        return Err(PurchaseError::Validation {
            field: "sale_type",
            message: "판매 유형은 purchase 또는 rental 이어야 합니다.".to_string(),
        });
    }

    let car = sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1")
        .bind(cmd.car_id)
        .fetch_optional(db.pool())
        .await?
        .ok_or_else(|| PurchaseError::CarNotAvailable {
            message: "차량을 찾을 수 없습니다.".to_string(),
        })?;

    if car.status != "active" {
        return Err(PurchaseError::CarNotAvailable {
            message: "더 이상 판매하지 않는 차량입니다.".to_string(),
        });
    }

    let amount = if cmd.sale_type == "purchase" {
        car.price
    } else {
        rental_daily_rate(car.price)
    };

    let sale = sqlx::query_as::<_, SalesTransaction>(
        "INSERT INTO sales_transactions
            (car_id, customer_name, customer_email, amount, sale_type, transaction_date)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(car.id)
    .bind(&customer_name)
    .bind(&customer_email)
    .bind(amount)
    .bind(&cmd.sale_type)
    .bind(Utc::now())
    .fetch_one(db.pool())
    .await?;

    info!(
        "{:<12} --> 판매 기록 생성: id={}, amount={}",
        "Content", sale.id, sale.amount
    );

    if let Err(e) = notifier.notify(&ChangeEvent::sale_inserted(&sale)).await {
        warn!("{:<12} --> 판매 이벤트 발행 실패: {}", "Content", e);
    }

    Ok(PurchaseReceipt {
        transaction_id: sale.id,
        car_name: car.name,
        amount,
        sale_type: cmd.sale_type,
    })
}

// endregion: --- Purchase

// region:    --- Content Commands

/// 홈 화면 섹션 생성
pub async fn create_home_section(
    db: &DatabaseManager,
    form: HomeSectionForm,
) -> Result<HomeSection, ApiError> {
    info!(
        "{:<12} --> 홈 섹션 생성: {}",
        "Content", form.section_type
    );
    let now = Utc::now();
    let section = sqlx::query_as::<_, HomeSection>(
        "INSERT INTO home_content
            (section_type, title, description, image_url, button_text, button_link, order_index,
             status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, 'active', $8, $8)
         RETURNING *",
    )
    .bind(&form.section_type)
    .bind(&form.title)
    .bind(&form.description)
    .bind(&form.image_url)
    .bind(&form.button_text)
    .bind(&form.button_link)
    .bind(form.order_index.unwrap_or(0))
    .bind(now)
    .fetch_one(db.pool())
    .await?;
    Ok(section)
}

/// 홈 화면 섹션 수정
pub async fn update_home_section(
    db: &DatabaseManager,
    section_id: i64,
    form: HomeSectionForm,
) -> Result<HomeSection, ApiError> {
    info!("{:<12} --> 홈 섹션 수정 id: {}", "Content", section_id);
    sqlx::query_as::<_, HomeSection>(
        "UPDATE home_content
         SET section_type = $1, title = $2, description = $3, image_url = $4, button_text = $5,
             button_link = $6, order_index = COALESCE($7, order_index), updated_at = $8
         WHERE id = $9
         RETURNING *",
    )
    .bind(&form.section_type)
    .bind(&form.title)
    .bind(&form.description)
    .bind(&form.image_url)
    .bind(&form.button_text)
    .bind(&form.button_link)
    .bind(form.order_index)
    .bind(Utc::now())
    .bind(section_id)
    .fetch_optional(db.pool())
    .await?
    .ok_or(ApiError::NotFound)
}

/// 소개 페이지 섹션 생성
pub async fn create_about_section(
    db: &DatabaseManager,
    form: AboutSectionForm,
) -> Result<AboutSection, ApiError> {
    info!(
        "{:<12} --> 소개 섹션 생성: {}",
        "Content", form.section_type
    );
    let now = Utc::now();
    let section = sqlx::query_as::<_, AboutSection>(
        "INSERT INTO about_content (section_type, content, status, created_at, updated_at)
         VALUES ($1, $2, 'active', $3, $3)
         RETURNING *",
    )
    .bind(&form.section_type)
    .bind(&form.content)
    .bind(now)
    .fetch_one(db.pool())
    .await?;
    Ok(section)
}

/// 소개 페이지 섹션 수정
pub async fn update_about_section(
    db: &DatabaseManager,
    section_id: i64,
    form: AboutSectionForm,
) -> Result<AboutSection, ApiError> {
    info!("{:<12} --> 소개 섹션 수정 id: {}", "Content", section_id);
    sqlx::query_as::<_, AboutSection>(
        "UPDATE about_content
         SET section_type = $1, content = $2, updated_at = $3
         WHERE id = $4
         RETURNING *",
    )
    .bind(&form.section_type)
    .bind(&form.content)
    .bind(Utc::now())
    .bind(section_id)
    .fetch_optional(db.pool())
    .await?
    .ok_or(ApiError::NotFound)
}

/// 연락처 정보 갱신(행이 없으면 생성)
pub async fn update_contact_info(
    db: &DatabaseManager,
    form: ContactInfoForm,
) -> Result<ContactInfo, ApiError> {
    info!("{:<12} --> 연락처 정보 갱신", "Content");
    let now = Utc::now();

    let updated = sqlx::query_as::<_, ContactInfo>(
        "UPDATE contact_info
         SET address = $1, phone_numbers = $2, email_addresses = $3, working_hours = $4,
             map_embed_url = $5, updated_at = $6
         WHERE id = (SELECT id FROM contact_info ORDER BY id ASC LIMIT 1)
         RETURNING *",
    )
    .bind(&form.address)
    .bind(&form.phone_numbers)
    .bind(&form.email_addresses)
    .bind(&form.working_hours)
    .bind(&form.map_embed_url)
    .bind(now)
    .fetch_optional(db.pool())
    .await?;

    if let Some(info) = updated {
        return Ok(info);
    }

    let inserted = sqlx::query_as::<_, ContactInfo>(
        "INSERT INTO contact_info
            (address, phone_numbers, email_addresses, working_hours, map_embed_url, status,
             created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, 'active', $6, $6)
         RETURNING *",
    )
    .bind(&form.address)
    .bind(&form.phone_numbers)
    .bind(&form.email_addresses)
    .bind(&form.working_hours)
    .bind(&form.map_embed_url)
    .bind(now)
    .fetch_one(db.pool())
    .await?;

    Ok(inserted)
}

/// 문의 접수
pub async fn submit_contact(
    db: &DatabaseManager,
    form: ContactSubmissionForm,
) -> Result<ContactSubmission, ApiError> {
    info!("{:<12} --> 문의 접수: {}", "Content", form.subject);
    validate_submission(&form)?;

    let submission = sqlx::query_as::<_, ContactSubmission>(
        "INSERT INTO contact_submissions (name, email, phone, subject, message, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(form.name.trim())
    .bind(form.email.trim())
    .bind(&form.phone)
    .bind(form.subject.trim())
    .bind(&form.message)
    .bind(Utc::now())
    .fetch_one(db.pool())
    .await?;
    Ok(submission)
}

/// 문의 읽음 처리
pub async fn mark_submission_read(
    db: &DatabaseManager,
    submission_id: i64,
) -> Result<ContactSubmission, ApiError> {
    info!(
        "{:<12} --> 문의 읽음 처리 id: {}",
        "Content", submission_id
    );
    sqlx::query_as::<_, ContactSubmission>(
        "UPDATE contact_submissions SET read_status = TRUE WHERE id = $1 RETURNING *",
    )
    .bind(submission_id)
    .fetch_optional(db.pool())
    .await?
    .ok_or(ApiError::NotFound)
}

/// 사이트 설정 갱신(행이 없으면 생성)
pub async fn update_site_settings(
    db: &DatabaseManager,
    form: SiteSettingsForm,
) -> Result<SiteSettings, ApiError> {
    info!("{:<12} --> 사이트 설정 갱신", "Content");
    let now = Utc::now();

    let updated = sqlx::query_as::<_, SiteSettings>(
        "UPDATE site_settings
         SET site_title = $1, logo_url = $2, favicon_url = $3,
             maintenance_mode = COALESCE($4, maintenance_mode), updated_at = $5
         WHERE id = (SELECT id FROM site_settings ORDER BY id ASC LIMIT 1)
         RETURNING *",
    )
    .bind(&form.site_title)
    .bind(&form.logo_url)
    .bind(&form.favicon_url)
    .bind(form.maintenance_mode)
    .bind(now)
    .fetch_optional(db.pool())
    .await?;

    if let Some(settings) = updated {
        return Ok(settings);
    }

    let inserted = sqlx::query_as::<_, SiteSettings>(
        "INSERT INTO site_settings
            (site_title, logo_url, favicon_url, maintenance_mode, created_at, updated_at)
         VALUES ($1, $2, $3, COALESCE($4, FALSE), $5, $5)
         RETURNING *",
    )
    .bind(&form.site_title)
    .bind(&form.logo_url)
    .bind(&form.favicon_url)
    .bind(form.maintenance_mode)
    .bind(now)
    .fetch_one(db.pool())
    .await?;

    Ok(inserted)
}

/// 문의 입력 검증
fn validate_submission(form: &ContactSubmissionForm) -> Result<(), ApiError> {
    if form.name.trim().is_empty() {
        return Err(ApiError::Validation {
            field: "name",
            message: "이름은 비울 수 없습니다.".to_string(),
        });
    }
    if !is_valid_email(form.email.trim()) {
        return Err(ApiError::Validation {
            field: "email",
            message: "올바른 이메일 형식이 아닙니다.".to_string(),
        });
    }
    if form.subject.trim().is_empty() {
        return Err(ApiError::Validation {
            field: "subject",
            message: "제목은 비울 수 없습니다.".to_string(),
        });
    }
    if form.message.trim().is_empty() {
        return Err(ApiError::Validation {
            field: "message",
            message: "내용은 비울 수 없습니다.".to_string(),
        });
    }
    Ok(())
}

// endregion: --- Content Commands

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rental_rate_is_one_percent_rounded() {
        assert_eq!(rental_daily_rate(55000), 550);
        assert_eq!(rental_daily_rate(55049), 550);
        assert_eq!(rental_daily_rate(55050), 551);
        assert_eq!(rental_daily_rate(99), 1);
    }

    #[test]
    fn submission_requires_all_fields() {
        let form = ContactSubmissionForm {
            name: "김문의".to_string(),
            email: "kim@example.com".to_string(),
            phone: None,
            subject: "시승 문의".to_string(),
            message: "주말 시승이 가능한가요?".to_string(),
        };
        assert!(validate_submission(&form).is_ok());

        let mut bad = form.clone();
        bad.email = "not-an-email".to_string();
        assert!(validate_submission(&bad).is_err());

        let mut bad = form.clone();
        bad.message = " ".to_string();
        assert!(validate_submission(&bad).is_err());
    }
}
