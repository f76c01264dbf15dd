//! 활동 세션 상태 머신.
//!
//! - **Idle**: 활동 목록이 비어 있음
//! - **Tracking**: 활동이 하나 이상 있음 (마지막 활동은 열려 있거나 닫혀 있음)
//!
//! 코드 경로가 바뀌면 마지막 활동을 닫고 새 활동을 연다. 같은 경로가 반복되면
//! 아무것도 추가하지 않는다. 목록은 전송 성공이 확인된 뒤에만 통째로 비운다.

use codetrail_core::config::TrackerConfig;
use codetrail_core::models::activity::{
    Activity, ActivityBatch, Measurement, BEGIN_TIME, CODE_PATH, END_TIME, FILE_PATH, TOOL_NAME,
    TOOL_VERSION,
};
use tracing::debug;

/// 에포크 초를 반환하는 시계
pub type Clock = fn() -> i64;

/// 현재 UTC 에포크 초
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// 프로젝트 정보가 아직 없을 때의 값
const UNDEFINED: &str = "undefined";

/// 세션 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Tracking,
}

/// `handle_location_change` 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationChange {
    /// Idle → Tracking, 첫 활동 시작
    Started,
    /// 이전 활동을 닫고 새 활동 시작
    Switched,
    /// 같은 경로: 변화 없음
    Unchanged,
}

/// 활동 세션 관리자
///
/// 활동 목록을 단독 소유한다. 동시 접근 직렬화는 호출자([`crate::tracker::Tracker`]) 책임이다.
#[derive(Debug, Clone)]
pub struct ActivitySessionManager {
    activity_name: String,
    activities: Vec<Activity>,
    project_name: String,
    project_language: String,
    file_path: String,
    tool_name: Option<String>,
    tool_version: Option<String>,
    clock: Clock,
}

impl ActivitySessionManager {
    /// 새 세션 관리자 생성
    pub fn new(activity_name: impl Into<String>) -> Self {
        Self {
            activity_name: activity_name.into(),
            activities: Vec::new(),
            project_name: UNDEFINED.to_string(),
            project_language: UNDEFINED.to_string(),
            file_path: String::new(),
            tool_name: None,
            tool_version: None,
            clock: unix_now,
        }
    }

    /// 추적기 설정으로 생성 (활동 이름, 기본 언어, 호스트 도구 정보)
    pub fn from_config(config: &TrackerConfig) -> Self {
        let mut manager = Self::new(config.activity_name.clone());
        manager.project_language = config.default_language.clone();
        manager.tool_name = config.tool_name.clone();
        manager.tool_version = config.tool_version.clone();
        manager
    }

    /// 시계 교체
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// 호스트 도구 이름/버전 설정
    pub fn with_host_identity(
        mut self,
        tool_name: impl Into<String>,
        tool_version: impl Into<String>,
    ) -> Self {
        self.tool_name = Some(tool_name.into());
        self.tool_version = Some(tool_version.into());
        self
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn project_language(&self) -> &str {
        &self.project_language
    }

    /// 다음 경로 계산에 쓸 프로젝트 이름/언어
    pub fn set_project(&mut self, name: impl Into<String>, language: impl Into<String>) {
        self.project_name = name.into();
        self.project_language = language.into();
    }

    pub fn set_project_name(&mut self, name: impl Into<String>) {
        self.project_name = name.into();
    }

    /// 새로 시작하는 활동에 기록할 파일 경로
    pub fn set_file_path(&mut self, path: impl Into<String>) {
        self.file_path = path.into();
    }

    pub fn state(&self) -> SessionState {
        if self.activities.is_empty() {
            SessionState::Idle
        } else {
            SessionState::Tracking
        }
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// 진행 중인 활동의 코드 경로
    pub fn current_path(&self) -> Option<&str> {
        self.activities.last().and_then(Activity::code_path)
    }

    /// 커서 위치 변화 처리
    pub fn handle_location_change(&mut self, identifier: &str) -> LocationChange {
        let Some(last) = self.activities.last() else {
            self.start_activity(identifier);
            return LocationChange::Started;
        };

        if last.code_path() == Some(identifier) {
            return LocationChange::Unchanged;
        }

        self.stop_last_activity();
        self.start_activity(identifier);
        LocationChange::Switched
    }

    /// 새 활동 추가: 측정값 순서: 경로, 파일, 시작 시각, (도구 이름, 도구 버전)
    fn start_activity(&mut self, identifier: &str) {
        let mut activity = Activity::new(self.activity_name.clone());
        activity.push(Measurement::string(CODE_PATH, identifier));
        activity.push(Measurement::string(FILE_PATH, self.file_path.clone()));
        activity.push(Measurement::timestamp(BEGIN_TIME, (self.clock)()));
        if let Some(name) = &self.tool_name {
            activity.push(Measurement::string(TOOL_NAME, name.clone()));
        }
        if let Some(version) = &self.tool_version {
            activity.push(Measurement::string(TOOL_VERSION, version.clone()));
        }

        debug!("활동 시작: {identifier}");
        self.activities.push(activity);
    }

    /// 마지막 활동 종료 (멱등)
    ///
    /// 종료 측정값을 새로 추가했으면 `true`. 목록이 비었거나 이미 닫혔으면 `false`.
    pub fn stop_last_activity(&mut self) -> bool {
        let now = self.clock;
        let Some(last) = self.activities.last_mut() else {
            return false;
        };
        if last.is_closed() {
            return false;
        }

        last.push(Measurement::timestamp(END_TIME, now()));
        true
    }

    /// 전송용 복사본
    pub fn snapshot(&self) -> ActivityBatch {
        ActivityBatch::new(self.activities.clone())
    }

    /// 목록 비우기: 전송 성공 확인 후에만 호출
    pub fn clear_activities(&mut self) {
        self.activities = Vec::new();
    }
}
