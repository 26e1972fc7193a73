//! Parse-tree node model for regular grammars
//!
//! A grammar is an immutable tree of `Node` values. Trees are usually built
//! by the parser from a grammar expression, but they can also be composed
//! programmatically with [`Node::then`] and [`Node::or`], which flatten into
//! an existing `Sequence`/`Alternation` instead of nesting.
//!
//! The enum is closed on purpose: the compiler's tree walks match
//! exhaustively, so adding a node kind is a compile-time-checked change.

use serde::{Deserialize, Serialize};

/// A fragment of a regular grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    /// An opaque regex fragment, itself a valid standalone pattern.
    /// Fragments are validated against the regex engine at compile time.
    Literal(String),

    /// Concatenation of child grammars, in order.
    Sequence(Vec<Node>),

    /// Union of child grammars.
    Alternation(Vec<Node>),

    /// A lookahead assertion. Only `negative == true` is compilable;
    /// positive lookahead is representable but rejected by the compiler.
    Lookahead { node: Box<Node>, negative: bool },

    /// Marks a capturable region. Each variable can have its own completer,
    /// lexer, validator and escape functions. The name may be empty for
    /// anonymous grouping in programmatically built grammars.
    Variable { node: Box<Node>, name: String },

    /// Repetition. `max == None` means unbounded.
    Repeat {
        node: Box<Node>,
        min: u32,
        max: Option<u32>,
        greedy: bool,
    },
}

impl Node {
    /// A literal regex fragment.
    pub fn literal(pattern: impl Into<String>) -> Node {
        Node::Literal(pattern.into())
    }

    /// Wrap a grammar in a named variable.
    pub fn variable(node: Node, name: impl Into<String>) -> Node {
        Node::Variable {
            node: Box::new(node),
            name: name.into(),
        }
    }

    /// Negative lookahead assertion.
    pub fn negative_lookahead(node: Node) -> Node {
        Node::Lookahead {
            node: Box::new(node),
            negative: true,
        }
    }

    /// `node*` / `node+` / `node?` and friends.
    pub fn repeat(node: Node, min: u32, max: Option<u32>, greedy: bool) -> Node {
        Node::Repeat {
            node: Box::new(node),
            min,
            max,
            greedy,
        }
    }

    /// Concatenate two grammars. Extends `self` when it already is a
    /// `Sequence`, so chained composition stays flat.
    pub fn then(self, other: Node) -> Node {
        match self {
            Node::Sequence(mut children) => {
                children.push(other);
                Node::Sequence(children)
            }
            node => Node::Sequence(vec![node, other]),
        }
    }

    /// Union of two grammars. Extends `self` when it already is an
    /// `Alternation`.
    pub fn or(self, other: Node) -> Node {
        match self {
            Node::Alternation(mut children) => {
                children.push(other);
                Node::Alternation(children)
            }
            node => Node::Alternation(vec![node, other]),
        }
    }
}
