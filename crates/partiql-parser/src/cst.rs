//! Rowan-based parse tree types for PartiQL.
//!
//! Defines the `PartiQlLanguage` marker type that connects [`SyntaxKind`]
//! to rowan's generic tree infrastructure, plus type aliases for
//! convenience. The rowan green tree is the parser's internal parse tree;
//! the public AST is produced from it by the lowering pass.

use crate::syntax_kind::SyntaxKind;

/// Marker type for PartiQL in rowan's generic tree system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PartiQlLanguage {}

impl rowan::Language for PartiQlLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        // Safety: SyntaxKind is #[repr(u16)] and rowan only stores kinds
        // that we previously gave it via kind_to_raw.
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

/// A parse-tree node (interior node with children).
pub type SyntaxNode = rowan::SyntaxNode<PartiQlLanguage>;

/// A parse-tree token (leaf node with text).
pub type SyntaxToken = rowan::SyntaxToken<PartiQlLanguage>;

/// Either a node or a token in the parse tree.
pub type SyntaxElement = rowan::SyntaxElement<PartiQlLanguage>;
