//! # codetrail-core
//!
//! codetrail 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`]: 활동/측정값 데이터 구조체 (serde Serialize/Deserialize)
//! - [`ports`]: Hexagonal Architecture 포트 인터페이스 (async_trait)
//! - [`error`]: 핵심 에러 타입 (thiserror)
//! - [`config`]: 애플리케이션 설정 구조체
//! - [`config_manager`]: 설정 파일 관리 (로드/저장)

pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;

#[cfg(test)]
mod tests {
    use crate::models::activity::{Activity, ActivityBatch, Measurement};

    #[test]
    fn batch_payload_shape() {
        let mut activity = Activity::new("codetrail");
        activity.push(Measurement::string("code path", "PROJ:P|LANG:C#|LINE:1"));
        activity.push(Measurement::timestamp("code begin time", 1_700_000_000));

        let batch = ActivityBatch::new(vec![activity]);
        let json = serde_json::to_value(&batch).unwrap();

        assert_eq!(json["activities"][0]["name"], "codetrail");
        let measurements = json["activities"][0]["measurements"].as_array().unwrap();
        assert_eq!(measurements.len(), 2);
        assert_eq!(measurements[0]["name"], "code path");
        assert_eq!(measurements[0]["type"], "string");
        assert_eq!(measurements[1]["type"], "long");
        assert_eq!(measurements[1]["value"], "1700000000");
    }

    #[test]
    fn config_defaults() {
        let config = crate::config::AppConfig::default_config();
        assert!(config.server.base_url.is_empty());
        assert_eq!(config.server.request_timeout_ms, 30_000);
        assert_eq!(config.tracker.default_language, "C#");
        assert!(!config.credentials.has_token());
    }
}
