use std::env;

/// 환경 변수 기반 서비스 설정
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub kafka_brokers: String,
    pub bind_addr: String,
    pub sweep_interval_secs: u64,
}

impl Config {
    /// 환경 변수에서 설정 읽기
    /// DATABASE_URL 만 필수이며 나머지는 기본값을 사용한다.
    pub fn from_env() -> Result<Self, String> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;
        let kafka_brokers =
            env::var("KAFKA_BROKERS").unwrap_or_else(|_| "localhost:9092".to_string());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let sweep_interval_secs = parse_secs(env::var("SWEEP_INTERVAL_SECS").ok(), 30);

        Ok(Config {
            database_url,
            kafka_brokers,
            bind_addr,
            sweep_interval_secs,
        })
    }
}

/// 초 단위 양의 정수 파싱, 실패 시 기본값
fn parse_secs(value: Option<String>, default: u64) -> u64 {
    value
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_secs_uses_default_on_missing_or_invalid() {
        assert_eq!(parse_secs(None, 30), 30);
        assert_eq!(parse_secs(Some("abc".to_string()), 30), 30);
        assert_eq!(parse_secs(Some("0".to_string()), 30), 30);
    }

    #[test]
    fn parse_secs_accepts_positive_value() {
        assert_eq!(parse_secs(Some("5".to_string()), 30), 5);
    }
}
