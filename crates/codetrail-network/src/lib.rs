//! # codetrail-network
//!
//! 수집 서버 HTTP 어댑터.
//! 토큰 획득(`/api-token-auth/`)과 활동 배치 전송(`/activities/`)을 담당하며
//! `ActivitySender` 포트를 구현한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use codetrail_network::auth::TokenManager;
//! use codetrail_network::http_client::HttpActivitySender;
//!
//! let tokens = Arc::new(TokenManager::from_config(&config));
//! let sender = HttpActivitySender::from_config(&config, tokens)?;
//! ```

pub mod auth;
pub mod http_client;
