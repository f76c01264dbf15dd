//! 코드 경로(breadcrumb) 모델.
//!
//! 식별자 형식 (ASCII, `|` 구분, 수집기와 정확히 일치해야 함):
//!
//! ```text
//! PROJ:<project>|LANG:<language>|[<segment>|...]LINE:<n>
//! ```
//!
//! 세그먼트는 바깥(네임스페이스)에서 안쪽(함수) 순서다.

use std::fmt;

/// 구문 노드 분류: 이 다섯 가지 외의 노드는 경로에 나타나지 않는다
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreadcrumbKind {
    /// 네임스페이스 (`NS:`)
    Namespace,
    /// 클래스/구조체/레코드/인터페이스 (`CLASS:`)
    Type,
    /// 메서드, 생성자, 로컬 함수 (`FUNC:<name>`)
    Function,
    /// 람다 (`FUNC:[LAMBDA]`)
    Lambda,
    /// 블록 본문 익명 메서드 (`FUNC:[ANONYMOUS]`)
    AnonymousMethod,
}

impl BreadcrumbKind {
    /// tree-sitter-c-sharp 노드 종류 → 분류 (모르는 종류는 `None`)
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "namespace_declaration" | "file_scoped_namespace_declaration" => Some(Self::Namespace),
            "class_declaration"
            | "struct_declaration"
            | "record_declaration"
            | "record_struct_declaration"
            | "interface_declaration" => Some(Self::Type),
            "method_declaration" | "constructor_declaration" | "local_function_statement" => {
                Some(Self::Function)
            }
            "lambda_expression" => Some(Self::Lambda),
            "anonymous_method_expression" => Some(Self::AnonymousMethod),
            _ => None,
        }
    }

    /// 식별자 접두어
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Namespace => "NS",
            Self::Type => "CLASS",
            Self::Function | Self::Lambda | Self::AnonymousMethod => "FUNC",
        }
    }

    /// 이름 없는 구문의 고정 자리표시자
    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            Self::Lambda => Some("[LAMBDA]"),
            Self::AnonymousMethod => Some("[ANONYMOUS]"),
            _ => None,
        }
    }
}

/// 경로의 한 단계: `KIND:name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: BreadcrumbKind,
    pub name: String,
}

impl Segment {
    pub fn new(kind: BreadcrumbKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// 자리표시자 이름을 쓰는 세그먼트 (람다/익명 메서드)
    pub fn anonymous(kind: BreadcrumbKind) -> Self {
        Self::new(kind, kind.placeholder().unwrap_or_default())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.prefix(), self.name)
    }
}

/// 커서 위치의 코드 경로
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePath {
    pub project: String,
    pub language: String,
    /// 바깥 → 안쪽 순서
    pub segments: Vec<Segment>,
    /// 1부터 시작하는 줄 번호
    pub line: usize,
}

impl CodePath {
    /// 가장 안쪽 세그먼트
    pub fn innermost(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// 와이어 형식 식별자
    pub fn identifier(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PROJ:{}|LANG:{}|", self.project, self.language)?;
        for segment in &self.segments {
            write!(f, "{segment}|")?;
        }
        write!(f, "LINE:{}", self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_kind_mapping() {
        assert_eq!(
            BreadcrumbKind::from_node_kind("namespace_declaration"),
            Some(BreadcrumbKind::Namespace)
        );
        assert_eq!(
            BreadcrumbKind::from_node_kind("constructor_declaration"),
            Some(BreadcrumbKind::Function)
        );
        assert_eq!(
            BreadcrumbKind::from_node_kind("anonymous_method_expression"),
            Some(BreadcrumbKind::AnonymousMethod)
        );
        assert_eq!(BreadcrumbKind::from_node_kind("block"), None);
        assert_eq!(BreadcrumbKind::from_node_kind("if_statement"), None);
    }

    #[test]
    fn identifier_format() {
        let path = CodePath {
            project: "P".to_string(),
            language: "C#".to_string(),
            segments: vec![
                Segment::new(BreadcrumbKind::Namespace, "N"),
                Segment::new(BreadcrumbKind::Type, "C"),
                Segment::new(BreadcrumbKind::Function, "Run"),
                Segment::anonymous(BreadcrumbKind::Lambda),
            ],
            line: 12,
        };
        assert_eq!(
            path.identifier(),
            "PROJ:P|LANG:C#|NS:N|CLASS:C|FUNC:Run|FUNC:[LAMBDA]|LINE:12"
        );
        assert_eq!(path.innermost().unwrap().name, "[LAMBDA]");
    }

    #[test]
    fn empty_breadcrumb_keeps_project_language_line() {
        let path = CodePath {
            project: "P".to_string(),
            language: "C#".to_string(),
            segments: Vec::new(),
            line: 1,
        };
        assert_eq!(path.to_string(), "PROJ:P|LANG:C#|LINE:1");
    }
}
