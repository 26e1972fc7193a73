//! Parser for grammar expressions
//!
//! Recursive descent over the token list, lowest precedence first:
//! alternation, then concatenation, then postfix repetition, then atoms
//! (literals, groups, lookahead). Plain `(` and `(?:` groups are pure
//! grouping; only `(?P<name>` produces a [`Node::Variable`].
//!
//! Unsupported constructs are split between here and the compiler: the
//! `{...}` token and unknown `(?...)` forms never become nodes, so they are
//! rejected while parsing; positive lookahead is structurally legal (the
//! node can be built programmatically) and is rejected when compiling.

use super::ast::Node;
use super::error::GrammarError;
use super::tokenizer::Token;

/// Parse a token list into a grammar tree.
pub fn parse(tokens: &[Token]) -> Result<Node, GrammarError> {
    let mut parser = Parser {
        tokens,
        position: 0,
    };
    let node = parser.alternation()?;

    if parser.peek().is_some() {
        // The only token `alternation` can stop on is a stray `)`.
        return Err(GrammarError::syntax("unmatched parentheses"));
    }

    Ok(node)
}

struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    /// `concat ('|' concat)*`
    fn alternation(&mut self) -> Result<Node, GrammarError> {
        let mut branches = vec![self.concatenation()?];

        while matches!(self.peek(), Some(Token::Pipe)) {
            self.advance();
            branches.push(self.concatenation()?);
        }

        Ok(if branches.len() == 1 {
            branches.remove(0)
        } else {
            Node::Alternation(branches)
        })
    }

    /// Zero or more repeated atoms. An empty concatenation (as in `a|`) is
    /// an empty sequence matching only the empty string.
    fn concatenation(&mut self) -> Result<Node, GrammarError> {
        let mut children = Vec::new();

        while !matches!(
            self.peek(),
            None | Some(Token::Pipe) | Some(Token::GroupClose)
        ) {
            children.push(self.repeated()?);
        }

        Ok(if children.len() == 1 {
            children.remove(0)
        } else {
            Node::Sequence(children)
        })
    }

    /// An atom followed by any number of postfix quantifiers.
    fn repeated(&mut self) -> Result<Node, GrammarError> {
        let mut node = self.atom()?;

        loop {
            let (min, max, greedy) = match self.peek() {
                Some(Token::Star) => (0, None, true),
                Some(Token::StarLazy) => (0, None, false),
                Some(Token::Plus) => (1, None, true),
                Some(Token::PlusLazy) => (1, None, false),
                Some(Token::Question) => (0, Some(1), true),
                Some(Token::QuestionLazy) => (0, Some(1), false),
                Some(Token::BraceRepeat(brace)) => {
                    return Err(GrammarError::unsupported(format!(
                        "{}-style repetition",
                        brace
                    )));
                }
                _ => break,
            };
            self.advance();
            node = Node::repeat(node, min, max, greedy);
        }

        Ok(node)
    }

    fn atom(&mut self) -> Result<Node, GrammarError> {
        let token = match self.next_token() {
            Some(token) => token,
            None => return Err(GrammarError::syntax("unexpected end of grammar")),
        };

        match token {
            Token::Literal(fragment) | Token::Escaped(fragment) | Token::CharClass(fragment) => {
                Ok(Node::Literal(fragment))
            }

            Token::GroupOpen | Token::NonCapturingGroupOpen => {
                let inner = self.alternation()?;
                self.expect_group_close()?;
                Ok(inner)
            }

            Token::NamedGroupOpen(name) => {
                let inner = self.alternation()?;
                self.expect_group_close()?;
                Ok(Node::variable(inner, name))
            }

            Token::NegativeLookaheadOpen => {
                let inner = self.alternation()?;
                self.expect_group_close()?;
                Ok(Node::Lookahead {
                    node: Box::new(inner),
                    negative: true,
                })
            }

            Token::LookaheadOpen => {
                let inner = self.alternation()?;
                self.expect_group_close()?;
                Ok(Node::Lookahead {
                    node: Box::new(inner),
                    negative: false,
                })
            }

            Token::UnknownGroupOpen => {
                Err(GrammarError::unsupported("unrecognized `(?...)` group form"))
            }

            Token::Star
            | Token::StarLazy
            | Token::Plus
            | Token::PlusLazy
            | Token::Question
            | Token::QuestionLazy => Err(GrammarError::syntax("nothing to repeat")),

            Token::BraceRepeat(brace) => Err(GrammarError::unsupported(format!(
                "{}-style repetition",
                brace
            ))),

            // `concatenation` never hands these to `atom`.
            Token::Pipe | Token::GroupClose => {
                Err(GrammarError::syntax("unexpected token in grammar"))
            }
        }
    }

    fn expect_group_close(&mut self) -> Result<(), GrammarError> {
        match self.peek() {
            Some(Token::GroupClose) => {
                self.advance();
                Ok(())
            }
            _ => Err(GrammarError::syntax("unclosed group")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tokenizer::tokenize;
    use super::*;

    fn parse_str(expression: &str) -> Result<Node, GrammarError> {
        parse(&tokenize(expression).unwrap())
    }

    #[test]
    fn single_characters_concatenate() {
        assert_eq!(
            parse_str("ab").unwrap(),
            Node::Sequence(vec![Node::literal("a"), Node::literal("b")])
        );
    }

    #[test]
    fn a_single_atom_is_not_wrapped() {
        assert_eq!(parse_str("a").unwrap(), Node::literal("a"));
    }

    #[test]
    fn alternation_has_lowest_precedence() {
        assert_eq!(
            parse_str("ab|c").unwrap(),
            Node::Alternation(vec![
                Node::Sequence(vec![Node::literal("a"), Node::literal("b")]),
                Node::literal("c"),
            ])
        );
    }

    #[test]
    fn parse_tree_shape() {
        let node = parse_str(r"cd \s+ (?P<dir>[^\s]+)").unwrap();
        insta::assert_json_snapshot!(node, @r###"
        {
          "Sequence": [
            {
              "Literal": "c"
            },
            {
              "Literal": "d"
            },
            {
              "Repeat": {
                "node": {
                  "Literal": "\\s"
                },
                "min": 1,
                "max": null,
                "greedy": true
              }
            },
            {
              "Variable": {
                "node": {
                  "Repeat": {
                    "node": {
                      "Literal": "[^\\s]"
                    },
                    "min": 1,
                    "max": null,
                    "greedy": true
                  }
                },
                "name": "dir"
              }
            }
          ]
        }
        "###);
    }

    #[test]
    fn plain_groups_do_not_capture() {
        assert_eq!(
            parse_str("(a|b)c").unwrap(),
            Node::Sequence(vec![
                Node::Alternation(vec![Node::literal("a"), Node::literal("b")]),
                Node::literal("c"),
            ])
        );
    }

    #[test]
    fn named_groups_become_variables() {
        assert_eq!(
            parse_str("(?P<word>a+)").unwrap(),
            Node::variable(Node::repeat(Node::literal("a"), 1, None, true), "word")
        );
    }

    #[test]
    fn lazy_quantifiers_clear_the_greedy_flag() {
        assert_eq!(
            parse_str("a*?").unwrap(),
            Node::repeat(Node::literal("a"), 0, None, false)
        );
    }

    #[test]
    fn question_mark_is_bounded_repetition() {
        assert_eq!(
            parse_str("a?").unwrap(),
            Node::repeat(Node::literal("a"), 0, Some(1), true)
        );
    }

    #[test]
    fn lookahead_parses_structurally() {
        assert_eq!(
            parse_str("(?!a)b").unwrap(),
            Node::Sequence(vec![
                Node::negative_lookahead(Node::literal("a")),
                Node::literal("b"),
            ])
        );
        // Positive lookahead parses too; the compiler rejects it later.
        assert!(parse_str("(?=a)b").is_ok());
    }

    #[test]
    fn empty_alternation_branch_is_an_empty_sequence() {
        assert_eq!(
            parse_str("a|").unwrap(),
            Node::Alternation(vec![Node::literal("a"), Node::Sequence(vec![])])
        );
    }

    #[test]
    fn stray_close_paren_is_unmatched_parentheses() {
        let err = parse_str("a)").unwrap_err();
        assert_eq!(err, GrammarError::syntax("unmatched parentheses"));
    }

    #[test]
    fn missing_close_paren_is_an_unclosed_group() {
        let err = parse_str("(a").unwrap_err();
        assert_eq!(err, GrammarError::syntax("unclosed group"));
        assert!(parse_str("(?P<x>a").unwrap_err().is_syntax());
    }

    #[test]
    fn leading_quantifier_has_nothing_to_repeat() {
        let err = parse_str("*a").unwrap_err();
        assert_eq!(err, GrammarError::syntax("nothing to repeat"));
        assert!(parse_str("a|?b").unwrap_err().is_syntax());
    }

    #[test]
    fn brace_repetition_is_unsupported_not_syntax() {
        let err = parse_str("a{2,3}").unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn unknown_group_forms_are_unsupported() {
        assert!(parse_str("(?<=a)b").unwrap_err().is_unsupported());
        assert!(parse_str("(?iab)").unwrap_err().is_unsupported());
    }
}
