//! # codetrail-tracker
//!
//! 커서 위치에서 코드 경로(breadcrumb) 식별자를 계산하고,
//! 식별자 변화에 따라 활동 세션을 시작/종료한다.
//!
//! ## 구조
//!
//! - [`syntax`]: tree-sitter C# 구문 트리와 토큰 탐색
//! - [`breadcrumb`]: 노드 분류(5개 카테고리)와 `CodePath` 식별자
//! - [`resolver`]: 커서 오프셋 → `CodePath`
//! - [`session`]: `ActivitySessionManager` 상태 머신
//! - [`tracker`]: 호스트 이벤트 입력, 직렬화, flush/전송 구동

pub mod breadcrumb;
pub mod error;
pub mod resolver;
pub mod session;
pub mod syntax;
pub mod tracker;

pub use breadcrumb::{BreadcrumbKind, CodePath, Segment};
pub use error::ResolveError;
pub use resolver::resolve;
pub use session::{ActivitySessionManager, LocationChange, SessionState};
pub use syntax::SourceTree;
pub use tracker::{EventOutcome, FlushOutcome, HostEvent, LocationEvent, LocationOutcome, Tracker};
