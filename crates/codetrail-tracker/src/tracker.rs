//! 호스트 이벤트 구동기.
//!
//! 호스트(에디터 어댑터)가 보내는 이벤트를 받아 경로를 해석하고 세션에 반영한다.
//! 모든 작업은 하나의 비동기 뮤텍스 아래에서 실행되며, 전송 왕복 동안에도
//! 잠금을 유지한다. 결과는 값으로 반환하고 에러를 호스트로 넘기지 않는다.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use codetrail_core::config::TrackerConfig;
use codetrail_core::ports::sender::ActivitySender;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::ResolveError;
use crate::resolver;
use crate::session::{ActivitySessionManager, LocationChange};
use crate::syntax::SourceTree;

/// 커서/창 이벤트 내용
#[derive(Debug, Clone)]
pub struct LocationEvent {
    /// 활동에 기록할 파일 경로
    pub file_path: String,
    /// 이벤트 시점의 문서 전체 텍스트
    pub source: String,
    /// 문자 오프셋
    pub offset: usize,
    /// 프로젝트 언어 (없으면 세션 값 유지)
    pub language: Option<String>,
}

/// 호스트 이벤트
#[derive(Debug, Clone)]
pub enum HostEvent {
    CaretMoved(LocationEvent),
    WindowActivated(LocationEvent),
    SolutionOpened { solution_path: PathBuf },
    DocumentSaved,
    SolutionClosing,
}

/// 위치 이벤트 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationOutcome {
    Started(String),
    Switched(String),
    Unchanged,
    /// 해석 실패: 위치 변화 없음으로 취급
    Ignored,
}

/// flush 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// 보낼 활동 없음
    Empty,
    /// 전송 성공 후 목록 비움
    Sent { count: usize },
    /// 전송 실패: 다음 flush에서 재시도
    Retained { count: usize },
}

/// `dispatch` 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Location(LocationOutcome),
    Flush(FlushOutcome),
    ProjectChanged(String),
}

/// 세션 + 전송 포트 구동기
pub struct Tracker {
    session: Mutex<ActivitySessionManager>,
    sender: Arc<dyn ActivitySender>,
}

impl Tracker {
    pub fn new(session: ActivitySessionManager, sender: Arc<dyn ActivitySender>) -> Self {
        Self {
            session: Mutex::new(session),
            sender,
        }
    }

    /// 추적기 설정으로 세션 생성
    pub fn from_config(config: &TrackerConfig, sender: Arc<dyn ActivitySender>) -> Self {
        Self::new(ActivitySessionManager::from_config(config), sender)
    }

    /// 이벤트 종류별 intake로 분기
    pub async fn dispatch(&self, event: HostEvent) -> EventOutcome {
        match event {
            HostEvent::CaretMoved(location) => {
                EventOutcome::Location(self.caret_moved(location).await)
            }
            HostEvent::WindowActivated(location) => {
                EventOutcome::Location(self.window_activated(location).await)
            }
            HostEvent::SolutionOpened { solution_path } => {
                EventOutcome::ProjectChanged(self.solution_opened(&solution_path).await)
            }
            HostEvent::DocumentSaved => EventOutcome::Flush(self.document_saved().await),
            HostEvent::SolutionClosing => EventOutcome::Flush(self.solution_closing().await),
        }
    }

    pub async fn caret_moved(&self, event: LocationEvent) -> LocationOutcome {
        self.track_location(event).await
    }

    pub async fn window_activated(&self, event: LocationEvent) -> LocationOutcome {
        self.track_location(event).await
    }

    /// 프로젝트 이름을 솔루션 파일 이름(확장자 제외)으로 변경
    pub async fn solution_opened(&self, solution_path: &Path) -> String {
        let name = solution_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "undefined".to_string());

        let mut session = self.session.lock().await;
        session.set_project_name(name.clone());
        info!("프로젝트 열림: {name}");
        name
    }

    pub async fn document_saved(&self) -> FlushOutcome {
        self.flush().await
    }

    /// flush 후 프로젝트 이름 초기화. 미전송 활동은 유지한다.
    pub async fn solution_closing(&self) -> FlushOutcome {
        let mut session = self.session.lock().await;
        let outcome = self.flush_locked(&mut session).await;
        session.set_project_name("undefined");
        outcome
    }

    /// 마지막 활동을 닫고 전체 목록 전송. 성공했을 때만 비운다.
    pub async fn flush(&self) -> FlushOutcome {
        let mut session = self.session.lock().await;
        self.flush_locked(&mut session).await
    }

    /// 현재 세션 복사본 (진단/테스트용)
    pub async fn session(&self) -> ActivitySessionManager {
        self.session.lock().await.clone()
    }

    async fn track_location(&self, event: LocationEvent) -> LocationOutcome {
        let mut session = self.session.lock().await;

        let tree = match parse_source(event.source).await {
            Ok(tree) => tree,
            Err(e) => {
                warn!("구문 트리 생성 실패 ({}): {e}", event.file_path);
                return LocationOutcome::Ignored;
            }
        };

        let language = event
            .language
            .unwrap_or_else(|| session.project_language().to_string());
        let identifier = match resolver::resolve_identifier(
            &tree,
            event.offset,
            session.project_name(),
            &language,
        ) {
            Ok(identifier) => identifier,
            Err(e) => {
                warn!("코드 경로 해석 실패 ({}): {e}", event.file_path);
                return LocationOutcome::Ignored;
            }
        };

        debug!("코드 경로: {identifier}");
        let project = session.project_name().to_string();
        session.set_project(project, language);
        session.set_file_path(event.file_path);
        match session.handle_location_change(&identifier) {
            LocationChange::Started => LocationOutcome::Started(identifier),
            LocationChange::Switched => LocationOutcome::Switched(identifier),
            LocationChange::Unchanged => LocationOutcome::Unchanged,
        }
    }

    async fn flush_locked(&self, session: &mut ActivitySessionManager) -> FlushOutcome {
        if session.activities().is_empty() {
            debug!("전송할 활동 없음");
            return FlushOutcome::Empty;
        }

        session.stop_last_activity();
        let batch = session.snapshot();
        let count = batch.len();

        if self.sender.send_activities(batch).await {
            session.clear_activities();
            info!("활동 {count}개 전송 완료");
            FlushOutcome::Sent { count }
        } else {
            warn!("활동 {count}개 전송 실패: 다음 flush에서 재시도");
            FlushOutcome::Retained { count }
        }
    }
}

/// 블로킹 파싱을 별도 스레드에서 실행
async fn parse_source(source: String) -> Result<SourceTree, ResolveError> {
    tokio::task::spawn_blocking(move || SourceTree::parse(source))
        .await
        .map_err(|e| ResolveError::Parse(e.to_string()))?
}
