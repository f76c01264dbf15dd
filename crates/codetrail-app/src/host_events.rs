//! 호스트 어댑터 메시지.
//!
//! 에디터 어댑터는 stdin으로 한 줄에 JSON 메시지 하나를 보낸다.
//!
//! ```text
//! {"event":"caret_moved","file":"/src/A.cs","offset":120}
//! {"event":"window_activated","file":"/src/B.cs","offset":0,"text":"class B {}"}
//! {"event":"solution_opened","path":"/work/Shop.sln"}
//! {"event":"document_saved"}
//! {"event":"solution_closing"}
//! ```
//!
//! `text`가 없으면 파일을 디스크에서 읽는다.

use std::fs;
use std::path::PathBuf;

use codetrail_core::error::CoreError;
use codetrail_tracker::{HostEvent, LocationEvent};
use serde::Deserialize;

/// 위치 메시지 본문
#[derive(Debug, Clone, Deserialize)]
pub struct LocationMessage {
    pub file: PathBuf,
    /// 문자 오프셋
    pub offset: usize,
    /// 저장되지 않은 편집 내용 (없으면 파일에서 읽음)
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// stdin 한 줄
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostMessage {
    CaretMoved(LocationMessage),
    WindowActivated(LocationMessage),
    SolutionOpened { path: PathBuf },
    DocumentSaved,
    SolutionClosing,
}

impl HostMessage {
    /// JSON 한 줄 파싱
    pub fn parse(line: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(line.trim())?)
    }

    /// 추적기 이벤트로 변환 (필요하면 소스 파일 읽기)
    pub fn into_event(self) -> Result<HostEvent, CoreError> {
        Ok(match self {
            Self::CaretMoved(location) => HostEvent::CaretMoved(location.into_event()?),
            Self::WindowActivated(location) => HostEvent::WindowActivated(location.into_event()?),
            Self::SolutionOpened { path } => HostEvent::SolutionOpened {
                solution_path: path,
            },
            Self::DocumentSaved => HostEvent::DocumentSaved,
            Self::SolutionClosing => HostEvent::SolutionClosing,
        })
    }
}

impl LocationMessage {
    fn into_event(self) -> Result<LocationEvent, CoreError> {
        let source = match self.text {
            Some(text) => text,
            None => fs::read_to_string(&self.file)?,
        };
        Ok(LocationEvent {
            file_path: self.file.to_string_lossy().into_owned(),
            source,
            offset: self.offset,
            language: self.language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_inline_caret_message() {
        let msg = HostMessage::parse(
            r#"{"event":"caret_moved","file":"/src/A.cs","offset":3,"text":"class A {}","language":"C#"}"#,
        )
        .unwrap();

        match msg.into_event().unwrap() {
            HostEvent::CaretMoved(location) => {
                assert_eq!(location.file_path, "/src/A.cs");
                assert_eq!(location.offset, 3);
                assert_eq!(location.source, "class A {}");
                assert_eq!(location.language.as_deref(), Some("C#"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn reads_source_from_disk_without_text() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("B.cs");
        fs::write(&file, "class B {}").unwrap();

        let line = serde_json::json!({
            "event": "window_activated",
            "file": file,
            "offset": 0,
        })
        .to_string();

        match HostMessage::parse(&line).unwrap().into_event().unwrap() {
            HostEvent::WindowActivated(location) => {
                assert_eq!(location.source, "class B {}");
                assert!(location.language.is_none());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let msg = HostMessage::parse(
            r#"{"event":"caret_moved","file":"/nonexistent/codetrail/X.cs","offset":0}"#,
        )
        .unwrap();
        assert!(matches!(msg.into_event(), Err(CoreError::Io(_))));
    }

    #[test]
    fn unit_messages() {
        assert!(matches!(
            HostMessage::parse(r#"{"event":"document_saved"}"#).unwrap(),
            HostMessage::DocumentSaved
        ));
        assert!(matches!(
            HostMessage::parse(r#"{"event":"solution_closing"}"#).unwrap(),
            HostMessage::SolutionClosing
        ));

        let opened = HostMessage::parse(r#"{"event":"solution_opened","path":"/w/Shop.sln"}"#)
            .unwrap()
            .into_event()
            .unwrap();
        assert!(matches!(
            opened,
            HostEvent::SolutionOpened { solution_path } if solution_path == PathBuf::from("/w/Shop.sln")
        ));
    }

    #[test]
    fn unknown_event_is_rejected() {
        let err = HostMessage::parse(r#"{"event":"build_started"}"#).unwrap_err();
        assert!(matches!(err, CoreError::Serialization(_)));
    }
}
