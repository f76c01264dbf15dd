//! 활동(Activity) 및 측정값(Measurement) 모델.
//!
//! 하나의 활동은 개발자가 한 코드 경로(breadcrumb)에 머문 시간 구간이다.
//! 측정값은 항상 문자열로 저장하며, 숫자형(`long`)도 10진수 문자열이다.

use serde::{Deserialize, Serialize};

/// 코드 경로 측정값 이름
pub const CODE_PATH: &str = "code path";
/// 파일 경로 측정값 이름
pub const FILE_PATH: &str = "file path";
/// 시작 시각 측정값 이름
pub const BEGIN_TIME: &str = "code begin time";
/// 종료 시각 측정값 이름
pub const END_TIME: &str = "code end time";
/// 이전 버전 플러그인이 기록하던 종료 시각 이름
pub const LEGACY_END_TIME: &str = "end_time";
/// 도구 이름 측정값 이름
pub const TOOL_NAME: &str = "version name";
/// 도구 버전 측정값 이름
pub const TOOL_VERSION: &str = "full version";

/// 측정값 타입 태그
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementType {
    /// 문자열 값
    String,
    /// 정수 값 (에포크 초 등)
    Long,
}

/// 이름/타입/값 삼중항: 생성 후 불변
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    name: String,
    #[serde(rename = "type")]
    kind: MeasurementType,
    value: String,
}

impl Measurement {
    /// 새 측정값 생성
    pub fn new(name: impl Into<String>, kind: MeasurementType, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
        }
    }

    /// 문자열 측정값
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, MeasurementType::String, value)
    }

    /// 에포크 초 타임스탬프 측정값 (`long`)
    pub fn timestamp(name: impl Into<String>, epoch_secs: i64) -> Self {
        Self::new(name, MeasurementType::Long, epoch_secs.to_string())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MeasurementType {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// 활동: 이름이 붙은 순서 있는 측정값 묶음
///
/// 측정값은 추가만 가능하다. 코드 경로가 바뀌면 기존 활동을 수정하지 않고
/// 새 활동을 만든다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    name: String,
    measurements: Vec<Measurement>,
}

impl Activity {
    /// 빈 활동 생성
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            measurements: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// 측정값 추가
    pub fn push(&mut self, measurement: Measurement) {
        self.measurements.push(measurement);
    }

    /// 이름이 일치하는 첫 측정값
    pub fn first_named(&self, name: &str) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.name == name)
    }

    /// 이름이 일치하는 마지막 측정값
    pub fn last_named(&self, name: &str) -> Option<&Measurement> {
        self.measurements.iter().rev().find(|m| m.name == name)
    }

    /// 이 활동의 코드 경로 (첫 `code path` 측정값)
    pub fn code_path(&self) -> Option<&str> {
        self.first_named(CODE_PATH).map(Measurement::value)
    }

    /// 종료 측정값 (현재 이름 또는 레거시 이름)
    pub fn end_measurement(&self) -> Option<&Measurement> {
        self.last_named(END_TIME)
            .or_else(|| self.last_named(LEGACY_END_TIME))
    }

    /// 종료 측정값이 있으면 닫힌 활동
    pub fn is_closed(&self) -> bool {
        self.end_measurement().is_some()
    }
}

/// 전송 배치: `{"activities": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityBatch {
    pub activities: Vec<Activity>,
}

impl ActivityBatch {
    pub fn new(activities: Vec<Activity>) -> Self {
        Self { activities }
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_activity() -> Activity {
        let mut activity = Activity::new("codetrail");
        activity.push(Measurement::string(CODE_PATH, "PROJ:P|LANG:C#|CLASS:A|LINE:3"));
        activity.push(Measurement::string(FILE_PATH, "/src/A.cs"));
        activity.push(Measurement::timestamp(BEGIN_TIME, 100));
        activity
    }

    #[test]
    fn code_path_uses_first_match() {
        let mut activity = sample_activity();
        activity.push(Measurement::string(CODE_PATH, "PROJ:P|LANG:C#|LINE:9"));
        assert_eq!(activity.code_path(), Some("PROJ:P|LANG:C#|CLASS:A|LINE:3"));
    }

    #[test]
    fn closed_after_end_measurement() {
        let mut activity = sample_activity();
        assert!(!activity.is_closed());

        activity.push(Measurement::timestamp(END_TIME, 160));
        assert!(activity.is_closed());
        assert_eq!(activity.end_measurement().unwrap().value(), "160");
    }

    #[test]
    fn legacy_end_name_counts_as_closed() {
        let mut activity = sample_activity();
        activity.push(Measurement::timestamp(LEGACY_END_TIME, 120));
        assert!(activity.is_closed());
    }

    #[test]
    fn measurement_type_serializes_lowercase() {
        let json = serde_json::to_string(&Measurement::timestamp(BEGIN_TIME, 42)).unwrap();
        assert_eq!(json, r#"{"name":"code begin time","type":"long","value":"42"}"#);
    }

    #[test]
    fn batch_deserializes_collector_payload() {
        let payload = r#"{"activities":[{"name":"tool","measurements":[{"name":"code path","type":"string","value":"x"}]}]}"#;
        let batch: ActivityBatch = serde_json::from_str(payload).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.activities[0].code_path(), Some("x"));
        assert_eq!(batch.activities[0].measurements()[0].kind(), MeasurementType::String);
    }
}
