//! 커서 오프셋 → 코드 경로 해석.
//!
//! 1. 오프셋을 포함하는 가장 작은 토큰을 찾는다.
//! 2. 토큰에서 루트까지 조상을 따라가며 다섯 가지 분류에 해당하는 노드만 모은다.
//! 3. 순서를 뒤집어 바깥 → 안쪽으로 만든다.
//! 4. 줄 번호는 커서가 아니라 찾은 토큰 span의 *끝* 줄(0 기준) + 1이다.
//!    수집기에 쌓인 기존 식별자와의 호환을 위해 고정한다.

use tracing::debug;
use tree_sitter::Node;

use crate::breadcrumb::{BreadcrumbKind, CodePath, Segment};
use crate::error::ResolveError;
use crate::syntax::SourceTree;

const FILE_SCOPED_NAMESPACE: &str = "file_scoped_namespace_declaration";

/// 구문 트리 스냅샷과 문자 오프셋으로 코드 경로 계산
///
/// 같은 트리/오프셋이면 항상 같은 결과를 반환한다.
pub fn resolve(
    tree: &SourceTree,
    offset: usize,
    project: &str,
    language: &str,
) -> Result<CodePath, ResolveError> {
    let byte = tree.byte_offset(offset)?;
    let token = tree.token_at(byte);

    if tree.has_errors() {
        debug!("구문 오류가 있는 트리에서 경로 해석: offset={offset}");
    }

    let mut segments = Vec::new();
    let mut has_namespace = false;
    let mut node = Some(token);
    while let Some(current) = node {
        if let Some(kind) = BreadcrumbKind::from_node_kind(current.kind()) {
            has_namespace |= kind == BreadcrumbKind::Namespace;
            segments.push(segment_for(tree, current, kind));
        }
        node = current.parent();
    }
    segments.reverse();

    // `namespace X;` 는 뒤따르는 선언을 감싸지 않으므로 따로 찾는다
    if !has_namespace {
        if let Some(namespace) = enclosing_file_scoped_namespace(tree, token) {
            segments.insert(0, namespace);
        }
    }

    Ok(CodePath {
        project: project.to_string(),
        language: language.to_string(),
        segments,
        line: token.end_position().row + 1,
    })
}

/// 와이어 형식 식별자만 필요할 때
pub fn resolve_identifier(
    tree: &SourceTree,
    offset: usize,
    project: &str,
    language: &str,
) -> Result<String, ResolveError> {
    resolve(tree, offset, project, language).map(|path| path.identifier())
}

fn segment_for(tree: &SourceTree, node: Node<'_>, kind: BreadcrumbKind) -> Segment {
    if kind.placeholder().is_some() {
        return Segment::anonymous(kind);
    }
    let name = node
        .child_by_field_name("name")
        .map(|n| tree.text(n).to_string())
        .unwrap_or_default();
    Segment::new(kind, name)
}

fn enclosing_file_scoped_namespace(tree: &SourceTree, token: Node<'_>) -> Option<Segment> {
    let root = tree.root();
    let mut cursor = root.walk();
    let declaration = root
        .named_children(&mut cursor)
        .filter(|child| child.kind() == FILE_SCOPED_NAMESPACE)
        .filter(|child| child.start_byte() <= token.start_byte())
        .last()?;
    Some(segment_for(tree, declaration, BreadcrumbKind::Namespace))
}
