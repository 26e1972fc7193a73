//! End-to-end tests for the completion, highlighting and validation
//! adapters on top of a shared grammar.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regline::{
    compile, compile_with_funcs, Completer, Completion, CompiledGrammar, Document, EscapeFunc,
    EscapeFuncMap, Fragment, GrammarCompleter, GrammarLexer, GrammarValidator, Lexer, SimpleLexer,
    ValidationError, Validator, TRAILING_INPUT_STYLE,
};

static SHELL: Lazy<Arc<CompiledGrammar>> =
    Lazy::new(|| Arc::new(compile(r"cd \s+ (?P<dir>[^\s]+)").unwrap()));

/// Completes directory names under a fixed root.
struct DirCompleter(Vec<&'static str>);

impl Completer for DirCompleter {
    fn get_completions(&self, document: &Document) -> Vec<Completion> {
        let prefix = document.text_before_cursor();
        let (_, stem) = prefix.rsplit_once('/').unwrap_or(("", prefix));

        self.0
            .iter()
            .filter(|name| name.starts_with(stem))
            .map(|name| Completion::new(*name, -(stem.chars().count() as isize)))
            .collect()
    }
}

fn shell_completer() -> GrammarCompleter {
    let mut completers: HashMap<String, Box<dyn Completer>> = HashMap::new();
    completers.insert(
        "dir".to_string(),
        Box::new(DirCompleter(vec!["home", "hosts", "tmp"])),
    );
    GrammarCompleter::new(SHELL.clone(), completers)
}

#[test]
fn completes_the_directory_under_the_cursor() {
    let completions = shell_completer().get_completions(&Document::at_end("cd /ho"));

    let proposals: Vec<(&str, isize)> = completions
        .iter()
        .map(|c| (c.text.as_str(), c.start_position))
        .collect();
    assert_eq!(proposals, vec![("home", -2), ("hosts", -2)]);
}

#[test]
fn only_the_text_before_the_cursor_counts() {
    let document = Document::new("cd /ho somewhere else", 6);
    let completions = shell_completer().get_completions(&document);
    assert_eq!(completions.len(), 2);
}

#[test]
fn no_completions_outside_any_variable() {
    // The cursor is still inside the literal `cd` part.
    let completions = shell_completer().get_completions(&Document::at_end("c"));
    assert!(completions.is_empty());
}

#[test]
fn completion_in_an_escaped_variable_replaces_the_raw_form() {
    // Spaces in directory names are written as `%20` in the input; the
    // completer itself only ever sees the unescaped value.
    let escape: EscapeFunc = Arc::new(|value: &str| value.replace(' ', "%20"));
    let unescape: EscapeFunc = Arc::new(|value: &str| value.replace("%20", " "));
    let mut escape_funcs = EscapeFuncMap::new();
    escape_funcs.insert("dir".to_string(), escape);
    let mut unescape_funcs = EscapeFuncMap::new();
    unescape_funcs.insert("dir".to_string(), unescape);

    let grammar = Arc::new(
        compile_with_funcs(r"cd \s+ (?P<dir>[^\s]+)", escape_funcs, unescape_funcs).unwrap(),
    );

    /// Replaces the whole value with a fixed directory name.
    struct FixedCompleter;
    impl Completer for FixedCompleter {
        fn get_completions(&self, document: &Document) -> Vec<Completion> {
            vec![Completion::new(
                "/my documents",
                -(document.text().chars().count() as isize),
            )]
        }
    }

    let mut completers: HashMap<String, Box<dyn Completer>> = HashMap::new();
    completers.insert("dir".to_string(), Box::new(FixedCompleter));
    let completer = GrammarCompleter::new(grammar, completers);

    // Raw value `/my%20docs` is 10 characters, unescaped `/my docs` is 8.
    let completions = completer.get_completions(&Document::at_end("cd /my%20docs"));

    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].text, "/my%20documents");
    assert_eq!(completions[0].start_position, -10);
}

#[test]
fn the_same_completion_from_both_branches_appears_once() {
    let grammar = Arc::new(compile(r"(?P<cmd>[a-z]+) | (?P<cmd>[a-z]+ !)").unwrap());

    struct Fixed;
    impl Completer for Fixed {
        fn get_completions(&self, document: &Document) -> Vec<Completion> {
            vec![Completion::new(
                "pwd",
                -(document.text().chars().count() as isize),
            )]
        }
    }

    let mut completers: HashMap<String, Box<dyn Completer>> = HashMap::new();
    completers.insert("cmd".to_string(), Box::new(Fixed));
    let completer = GrammarCompleter::new(grammar, completers);

    let completions = completer.get_completions(&Document::at_end("pw"));
    assert_eq!(completions.len(), 1);
}

#[test]
fn lexer_styles_variables_and_trailing_input() {
    let mut lexers: HashMap<String, Box<dyn Lexer>> = HashMap::new();
    lexers.insert("dir".to_string(), Box::new(SimpleLexer::new("class:dir")));
    let lexer = GrammarLexer::new(SHELL.clone(), lexers).with_default_style("class:command");

    let lexed = lexer.lex_document(&Document::at_end("cd /home oops"));

    assert_eq!(
        lexed.line(0),
        &[
            Fragment::new("class:command", "cd "),
            Fragment::new("class:dir", "/home"),
            Fragment::new(TRAILING_INPUT_STYLE, " oops"),
        ]
    );
}

#[test]
fn lexer_spans_multiline_variable_values() {
    let grammar = Arc::new(compile(r"say \s (?P<text>.+)").unwrap());
    let mut lexers: HashMap<String, Box<dyn Lexer>> = HashMap::new();
    lexers.insert("text".to_string(), Box::new(SimpleLexer::new("class:text")));
    let lexer = GrammarLexer::new(grammar, lexers);

    let lexed = lexer.lex_document(&Document::at_end("say ab\ncd"));

    assert_eq!(lexed.line_count(), 2);
    assert_eq!(
        lexed.line(0),
        &[
            Fragment::new("", "say "),
            Fragment::new("class:text", "ab"),
        ]
    );
    assert_eq!(lexed.line(1), &[Fragment::new("class:text", "cd")]);
}

#[test]
fn validator_accepts_exact_matches_only() {
    struct NoShouting;
    impl Validator for NoShouting {
        fn validate(&self, document: &Document) -> Result<(), ValidationError> {
            match document.text().chars().position(|c| c.is_uppercase()) {
                Some(position) => Err(ValidationError::new(position, "lowercase only")),
                None => Ok(()),
            }
        }
    }

    let mut validators: HashMap<String, Box<dyn Validator>> = HashMap::new();
    validators.insert("dir".to_string(), Box::new(NoShouting));
    let validator = GrammarValidator::new(SHELL.clone(), validators);

    assert!(validator.validate(&Document::at_end("cd /home")).is_ok());

    // Incomplete input fails at the end of the text.
    let err = validator.validate(&Document::at_end("cd ")).unwrap_err();
    assert_eq!(err.cursor_position, 3);

    // Inner validator errors point into the outer input.
    let err = validator.validate(&Document::at_end("cd /Home")).unwrap_err();
    assert_eq!(err.cursor_position, 4);
    assert_eq!(err.message, "lowercase only");
}
