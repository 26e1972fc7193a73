//! Compiler from grammar trees to matching automata
//!
//! Compilation walks the tree twice. The first walk produces one exact-match
//! pattern for the whole grammar. The second walk produces a family of
//! prefix patterns: regex engines stop at the first successful alternative,
//! but completion needs the bindings of *every* path the input could still
//! be on, so each variable endpoint gets its own pattern and all of them are
//! tried on every keystroke. A third family is derived from the second by
//! appending a lazy `.*?` tail in a reserved group, which classifies input
//! that stopped matching the grammar ("trailing input").
//!
//! Variables compile to named groups `n0`, `n1`, ... with a side table back
//! to user-facing names, so the same variable name may appear any number of
//! times in one grammar.
//!
//! Patterns are built in Oniguruma's default syntax: `\A`/`\z` anchors,
//! `(?<name>...)` groups, and `(?m)` to let `.` cross newlines.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use onig::Regex;

use super::ast::Node;
use super::error::GrammarError;
use super::matching::Match;
use super::parser::parse;
use super::tokenizer::tokenize;

/// Reserved group name capturing input after the last grammar-conforming
/// character.
pub(crate) const TRAILING_INPUT_GROUP: &str = "invalid_trailing";

/// Escape or unescape callback for a single variable.
pub type EscapeFunc = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Per-variable escape/unescape function tables.
pub type EscapeFuncMap = HashMap<String, EscapeFunc>;

/// Compile a grammar expression.
pub fn compile(expression: &str) -> Result<CompiledGrammar, GrammarError> {
    compile_with_funcs(expression, EscapeFuncMap::new(), EscapeFuncMap::new())
}

/// Compile a grammar expression with per-variable escape and unescape
/// functions. Variables missing from either map get the identity function.
pub fn compile_with_funcs(
    expression: &str,
    escape_funcs: EscapeFuncMap,
    unescape_funcs: EscapeFuncMap,
) -> Result<CompiledGrammar, GrammarError> {
    let root = parse(&tokenize(expression)?)?;
    CompiledGrammar::from_node(root, escape_funcs, unescape_funcs)
}

/// One synthesized regex plus its named-group table.
pub(crate) struct Automaton {
    pub(crate) pattern: String,
    regex: Regex,
    /// `(group name, capture index)` pairs, from `foreach_name`.
    groups: Vec<(String, usize)>,
}

fn build_automaton(pattern: String) -> Result<Automaton, GrammarError> {
    let regex = Regex::new(&pattern).map_err(|err| {
        GrammarError::syntax(format!("synthesized pattern `{}` is invalid: {}", pattern, err))
    })?;

    let mut groups = Vec::new();
    regex.foreach_name(|name, indices| {
        for &index in indices {
            groups.push((name.to_string(), index as usize));
        }
        true
    });

    Ok(Automaton {
        pattern,
        regex,
        groups,
    })
}

/// An immutable, compiled grammar. Cheap to match against, safe to share
/// between threads, intended to be built once and reused for every
/// keystroke.
pub struct CompiledGrammar {
    root: Node,
    exact: Automaton,
    prefix: Vec<Automaton>,
    prefix_with_trailing: Vec<Automaton>,
    /// Internal group name (`n0`, `n1`, ...) to user variable name.
    group_names_to_vars: HashMap<String, String>,
    escape_funcs: EscapeFuncMap,
    unescape_funcs: EscapeFuncMap,
}

impl CompiledGrammar {
    /// Compile a programmatically built grammar tree.
    pub fn from_node(
        root: Node,
        escape_funcs: EscapeFuncMap,
        unescape_funcs: EscapeFuncMap,
    ) -> Result<Self, GrammarError> {
        validate_tree(&root)?;

        let mut groups = GroupAllocator::default();
        let exact_body = transform(&root, &mut groups)?;
        let prefix_bodies = transform_prefix(&root, &mut groups)?;

        let exact = build_automaton(format!(r"(?m)\A{}\z", exact_body))?;

        let prefix = prefix_bodies
            .iter()
            .map(|body| build_automaton(format!(r"(?m)\A(?:{})\z", body)))
            .collect::<Result<Vec<_>, _>>()?;

        // Same patterns, but allowing arbitrary text after the match. The
        // tail is lazy so the grammar part claims as much as it can.
        let prefix_with_trailing = prefix_bodies
            .iter()
            .map(|body| {
                build_automaton(format!(
                    r"(?m)\A(?:{})(?<{}>.*?)\z",
                    body, TRAILING_INPUT_GROUP
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledGrammar {
            root,
            exact,
            prefix,
            prefix_with_trailing,
            group_names_to_vars: groups.names,
            escape_funcs,
            unescape_funcs,
        })
    }

    /// The grammar tree this was compiled from.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The synthesized exact-match pattern. Useful for diagnostics.
    pub fn pattern(&self) -> &str {
        &self.exact.pattern
    }

    /// The synthesized prefix patterns, in match order.
    pub fn prefix_patterns(&self) -> impl Iterator<Item = &str> {
        self.prefix.iter().map(|automaton| automaton.pattern.as_str())
    }

    /// Escape `value` so it can be inserted in the place of `varname` in an
    /// input string. Identity when the variable has no escape function.
    pub fn escape(&self, varname: &str, value: &str) -> String {
        match self.escape_funcs.get(varname) {
            Some(func) => func(value),
            None => value.to_string(),
        }
    }

    /// Inverse of [`escape`](Self::escape).
    pub fn unescape(&self, varname: &str, value: &str) -> String {
        match self.unescape_funcs.get(varname) {
            Some(func) => func(value),
            None => value.to_string(),
        }
    }

    /// Match the whole input against the grammar. `None` when the input
    /// does not match; a non-matching input is not an error.
    pub fn match_exact(&self, input: &str) -> Option<Match<'_>> {
        self.run_family(std::slice::from_ref(&self.exact), input)
    }

    /// Match the input as a prefix of the grammar. Every prefix automaton
    /// is tried and all bindings are aggregated, because an ambiguous
    /// grammar can keep several paths open at once. When no prefix
    /// automaton matches, the trailing-input family is tried instead, so
    /// text that stopped following the grammar still produces a match with
    /// a [`trailing_input`](Match::trailing_input) span. `None` means the
    /// input cannot be completed into a valid grammar string at all.
    pub fn match_prefix(&self, input: &str) -> Option<Match<'_>> {
        self.run_family(&self.prefix, input)
            .or_else(|| self.run_family(&self.prefix_with_trailing, input))
    }

    fn run_family<'g>(&'g self, automata: &'g [Automaton], input: &str) -> Option<Match<'g>> {
        let mut matched = false;
        let mut var_regs: Vec<(String, usize, usize)> = Vec::new();
        let mut trailing: Vec<(usize, usize)> = Vec::new();

        for automaton in automata {
            let captures = match automaton.regex.captures(input) {
                Some(captures) => captures,
                None => continue,
            };
            matched = true;

            for (group, index) in &automaton.groups {
                let (start, stop) = match captures.pos(*index) {
                    Some(span) => span,
                    None => continue,
                };
                if group == TRAILING_INPUT_GROUP {
                    trailing.push((start, stop));
                } else if let Some(varname) = self.group_names_to_vars.get(group) {
                    var_regs.push((varname.clone(), start, stop));
                }
            }
        }

        if matched {
            Some(Match::new(self, input.to_string(), var_regs, trailing))
        } else {
            None
        }
    }
}

impl fmt::Debug for CompiledGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledGrammar")
            .field("pattern", &self.exact.pattern)
            .field("prefix_patterns", &self.prefix.len())
            .finish()
    }
}

/// Hands out internal group names and remembers which variable each one
/// belongs to. A single variable node can receive several group names, one
/// per prefix pattern it ends up in.
#[derive(Default)]
struct GroupAllocator {
    counter: usize,
    names: HashMap<String, String>,
}

impl GroupAllocator {
    fn allocate(&mut self, varname: &str) -> String {
        let group = format!("n{}", self.counter);
        self.counter += 1;
        self.names.insert(group.clone(), varname.to_string());
        group
    }
}

/// Structural checks before synthesis. Every literal fragment must be a
/// valid pattern on its own; checking here gives an error pointing at the
/// fragment instead of at a huge synthesized pattern. An alternation must
/// have at least one branch: a branchless one (only constructible
/// programmatically) matches nothing and has no prefix patterns.
fn validate_tree(node: &Node) -> Result<(), GrammarError> {
    match node {
        Node::Literal(fragment) => {
            Regex::new(fragment).map_err(|err| {
                GrammarError::syntax(format!("invalid regex fragment `{}`: {}", fragment, err))
            })?;
        }
        Node::Sequence(children) => {
            for child in children {
                validate_tree(child)?;
            }
        }
        Node::Alternation(children) => {
            if children.is_empty() {
                return Err(GrammarError::syntax("alternation with no branches"));
            }
            for child in children {
                validate_tree(child)?;
            }
        }
        Node::Lookahead { node, .. } | Node::Variable { node, .. } | Node::Repeat { node, .. } => {
            validate_tree(node)?;
        }
    }
    Ok(())
}

fn contains_variable(node: &Node) -> bool {
    match node {
        Node::Literal(_) => false,
        Node::Variable { .. } => true,
        Node::Lookahead { node, .. } | Node::Repeat { node, .. } => contains_variable(node),
        Node::Sequence(children) | Node::Alternation(children) => {
            children.iter().any(contains_variable)
        }
    }
}

fn repeat_sign(min: u32, max: Option<u32>, greedy: bool) -> String {
    let mut sign = match (min, max) {
        (0, None) => String::from("*"),
        (1, None) => String::from("+"),
        (min, None) => format!("{{{},}}", min),
        (min, Some(max)) => format!("{{{},{}}}", min, max),
    };
    if !greedy {
        sign.push('?');
    }
    sign
}

/// Exact-match pattern for a subtree. Literal fragments are inserted as-is,
/// which is what makes whitespace-separated single characters concatenate
/// into plain text.
fn transform(node: &Node, groups: &mut GroupAllocator) -> Result<String, GrammarError> {
    Ok(match node {
        Node::Literal(fragment) => fragment.clone(),

        Node::Sequence(children) => {
            let mut out = String::new();
            for child in children {
                out.push_str(&transform(child, groups)?);
            }
            out
        }

        Node::Alternation(children) => {
            let parts = children
                .iter()
                .map(|child| transform(child, groups))
                .collect::<Result<Vec<_>, _>>()?;
            format!("(?:{})", parts.join("|"))
        }

        Node::Lookahead { node, negative } => {
            if !*negative {
                return Err(GrammarError::unsupported("positive lookahead"));
            }
            format!("(?!{})", transform(node, groups)?)
        }

        Node::Variable { node, name } => {
            let group = groups.allocate(name);
            format!("(?<{}>{})", group, transform(node, groups)?)
        }

        Node::Repeat {
            node,
            min,
            max,
            greedy,
        } => format!(
            "(?:{}){}",
            transform(node, groups)?,
            repeat_sign(*min, *max, *greedy)
        ),
    })
}

/// Prefix patterns for a subtree: every way the subtree can match a prefix
/// of the remaining input, one pattern per variable endpoint.
fn transform_prefix(node: &Node, groups: &mut GroupAllocator) -> Result<Vec<String>, GrammarError> {
    Ok(match node {
        // A fragment is either fully present or not started yet.
        Node::Literal(fragment) => vec![format!("(?:{})?", fragment)],

        Node::Sequence(children) => {
            if children.is_empty() {
                // The empty grammar has exactly one prefix.
                return Ok(vec![String::new()]);
            }

            let complete = children
                .iter()
                .map(|child| transform(child, groups))
                .collect::<Result<Vec<_>, _>>()?;
            let prefixes = children
                .iter()
                .map(|child| transform_prefix(child, groups))
                .collect::<Result<Vec<_>, _>>()?;
            let has_variable: Vec<bool> = children.iter().map(contains_variable).collect();

            let mut patterns = Vec::new();

            // One pattern per variable endpoint: everything before the
            // variable matched completely, the variable itself partially.
            for i in 0..children.len() {
                if has_variable[i] {
                    for child_pattern in &prefixes[i] {
                        patterns.push(format!("{}{}", complete[..i].concat(), child_pattern));
                    }
                }
            }

            // The variable-free endpoints nest into a single pattern:
            //   (?:c1 (?:c2 (?:c3 | p3) | p2) | p1)
            // skipping the `| p` arm for children already covered above.
            if !has_variable.iter().all(|&v| v) {
                let mut merged = String::new();
                for part in &complete {
                    merged.push_str("(?:");
                    merged.push_str(part);
                }
                for i in (0..children.len()).rev() {
                    if has_variable[i] {
                        merged.push(')');
                    } else {
                        merged.push_str("|(?:");
                        merged.push_str(&prefixes[i][0]);
                        merged.push_str("))");
                    }
                }
                patterns.push(merged);
            }

            patterns
        }

        Node::Alternation(children) => {
            // Branches holding a variable each keep their own pattern
            // family; branches without one are merged into a single
            // alternation, since nothing needs to be captured from them.
            let mut patterns = Vec::new();
            let mut variable_free = Vec::new();
            for child in children {
                if contains_variable(child) {
                    patterns.extend(transform_prefix(child, groups)?);
                } else {
                    variable_free.extend(transform_prefix(child, groups)?);
                }
            }
            if !variable_free.is_empty() {
                patterns.push(variable_free.join("|"));
            }
            patterns
        }

        Node::Lookahead { node, negative } => {
            if !*negative {
                return Err(GrammarError::unsupported("positive lookahead"));
            }
            // An assertion consumes nothing; it appears in full or the
            // pattern before it already ended.
            vec![format!("(?!{})", transform(node, groups)?)]
        }

        Node::Variable { node, name } => {
            // A fresh group for every child pattern: each prefix pattern is
            // a separate regex, but the numbering is global so the side
            // table stays unambiguous.
            let mut patterns = Vec::new();
            for child_pattern in transform_prefix(node, groups)? {
                let group = groups.allocate(name);
                patterns.push(format!("(?<{}>{})", group, child_pattern));
            }
            patterns
        }

        Node::Repeat {
            node,
            min: _,
            max,
            greedy,
        } => {
            if *max == Some(1) {
                transform_prefix(node, groups)?
            } else {
                // Some complete repetitions followed by one partial one.
                // The minimum is irrelevant for a prefix.
                let complete_child = transform(node, groups)?;
                let sign = match max {
                    Some(max) => format!("{{0,{}}}", max - 1),
                    None => String::from("*"),
                };
                let lazy = if *greedy { "" } else { "?" };

                let mut patterns = Vec::new();
                for child_pattern in transform_prefix(node, groups)? {
                    patterns.push(format!(
                        "(?:{}){}{}{}",
                        complete_child, sign, lazy, child_pattern
                    ));
                }
                patterns
            }
        }
    })
}
