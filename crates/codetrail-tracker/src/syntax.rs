//! tree-sitter 기반 C# 구문 트리.
//!
//! 소스 텍스트와 트리를 함께 소유하여 해석 중 스냅샷이 바뀌지 않게 한다.
//! 공백/주석은 trivia로 취급한다: 토큰 뒤 첫 줄바꿈까지는 앞 토큰에,
//! 그 외에는 다음 토큰에 속한다.

use tree_sitter::{Node, Parser, Tree};

use crate::error::ResolveError;

/// 파싱된 소스 스냅샷
pub struct SourceTree {
    source: String,
    tree: Tree,
}

impl SourceTree {
    /// C# 소스 파싱
    pub fn parse(source: impl Into<String>) -> Result<Self, ResolveError> {
        let source = source.into();
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .map_err(|e| ResolveError::Language(e.to_string()))?;

        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| ResolveError::Parse("파서가 트리를 반환하지 않음".to_string()))?;

        Ok(Self { source, tree })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// 구문 오류 노드 포함 여부
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// 노드의 소스 텍스트
    pub fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }

    /// 문자 오프셋 → 바이트 오프셋 (`offset == 문자 수`는 파일 끝)
    pub fn byte_offset(&self, char_offset: usize) -> Result<usize, ResolveError> {
        self.source
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(self.source.len()))
            .nth(char_offset)
            .ok_or_else(|| ResolveError::OffsetOutOfRange {
                offset: char_offset,
                len: self.source.chars().count(),
            })
    }

    /// 바이트 위치를 포함하는 가장 작은 토큰
    ///
    /// 토큰이 하나도 없으면 루트 노드를 반환한다.
    pub fn token_at(&self, byte: usize) -> Node<'_> {
        let tokens = self.tokens();
        let after = tokens.partition_point(|t| t.start_byte() <= byte);

        let prev = after.checked_sub(1).map(|i| tokens[i]);
        if let Some(prev) = prev {
            if byte < prev.end_byte() {
                return prev;
            }
        }

        match (prev, tokens.get(after).copied()) {
            (Some(prev), Some(next)) => {
                let gap = &self.source[prev.end_byte()..byte];
                if gap.contains('\n') {
                    next
                } else {
                    prev
                }
            }
            (Some(prev), None) => prev,
            (None, Some(next)) => next,
            (None, None) => self.root(),
        }
    }

    /// 문서 순서의 토큰(리프) 목록: 주석 등 extra 노드와 빈 노드 제외
    ///
    /// ERROR 노드도 extra로 표시되지만 그 안의 토큰은 실제 입력이므로 내려간다.
    fn tokens(&self) -> Vec<Node<'_>> {
        let mut tokens = Vec::new();
        let mut cursor = self.tree.walk();

        loop {
            let node = cursor.node();
            if !node.is_extra() || node.is_error() {
                if node.child_count() > 0 && cursor.goto_first_child() {
                    continue;
                }
                if node.child_count() == 0 && node.start_byte() < node.end_byte() {
                    tokens.push(node);
                }
            }

            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return tokens;
                }
            }
        }
    }
}

impl std::fmt::Debug for SourceTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceTree")
            .field("len", &self.source.len())
            .field("root", &self.root().kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_text_at(tree: &SourceTree, needle: &str, delta: usize) -> String {
        let byte = tree.source().find(needle).unwrap() + delta;
        tree.text(tree.token_at(byte)).to_string()
    }

    #[test]
    fn inside_token() {
        let tree = SourceTree::parse("class Foo { }").unwrap();
        assert_eq!(token_text_at(&tree, "Foo", 1), "Foo");
    }

    #[test]
    fn same_line_trivia_belongs_to_previous_token() {
        let tree = SourceTree::parse("class Foo {   // note\n}\n").unwrap();
        assert_eq!(token_text_at(&tree, "// note", 3), "{");
        assert_eq!(token_text_at(&tree, "{", 2), "{");
    }

    #[test]
    fn next_line_trivia_belongs_to_next_token() {
        let tree = SourceTree::parse("class Foo {\n    int x;\n}\n").unwrap();
        // "{\n" 바로 다음 줄의 들여쓰기
        assert_eq!(token_text_at(&tree, "    int", 1), "int");
    }

    #[test]
    fn crlf_stays_with_previous_token() {
        let tree = SourceTree::parse("class Foo {\r\n}\r\n").unwrap();
        assert_eq!(token_text_at(&tree, "\r\n", 1), "{");
    }

    #[test]
    fn tokens_inside_error_region_are_kept() {
        let tree = SourceTree::parse("class A\n{\n    void M()\n    {\n        int z = \n    }\n}\n").unwrap();
        assert!(tree.has_errors());
        assert_eq!(token_text_at(&tree, "int", 1), "int");
        assert_eq!(token_text_at(&tree, "z =", 0), "z");
    }

    #[test]
    fn empty_source_returns_root() {
        let tree = SourceTree::parse("").unwrap();
        assert_eq!(tree.token_at(0).kind(), tree.root().kind());
    }

    #[test]
    fn char_offsets_map_to_bytes() {
        let tree = SourceTree::parse("// é\nclass A {}").unwrap();
        assert_eq!(tree.byte_offset(0).unwrap(), 0);
        assert_eq!(tree.byte_offset(4).unwrap(), 5);
        let len = tree.source().chars().count();
        assert_eq!(tree.byte_offset(len).unwrap(), tree.source().len());
        assert_eq!(
            tree.byte_offset(len + 1),
            Err(ResolveError::OffsetOutOfRange {
                offset: len + 1,
                len
            })
        );
    }
}
