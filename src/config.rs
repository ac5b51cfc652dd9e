// ABOUTME: Configuration and constants for the interpreter binary

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "cloje v0.3";
pub const WELCOME_SUBTITLE: &str = "A Clojure-flavored Lisp in Rust";
pub const WELCOME_FOOTER: &str = "Type (help) for the builtin index, (quit) to leave.";

pub const PROMPT: &str = "cloje> ";
pub const HISTORY_FILE: &str = ".cloje_history";

pub const HELP_TEXT: &str = r#"
# REPL commands

|command|effect|
|-|-|
|`(quit)` / `(exit)`|leave the REPL|
|`(clear)`|clear the screen|
|`(help)`|builtin index by category|
|`(doc 'name)`|documentation for one operation|

Everything else is read as an expression and evaluated; `=>` precedes the
printed result. Multi-line forms are fine, the editor waits for balanced
delimiters.
"#;
