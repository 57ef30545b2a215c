//! Language registry and highlight classification.
//!
//! This module plus [`highlight_line`] is the whole surface an alternative
//! front-end is allowed to touch; everything else in the crate is an
//! implementation detail of the terminal session.

mod engine;

pub use engine::{highlight_line, is_separator};

/// Per-character highlight classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightKind {
    Normal,
    NonPrint,
    Comment,
    BlockComment,
    KeywordPrimary,
    KeywordSecondary,
    String,
    Number,
    Match,
}

impl HighlightKind {
    /// ANSI SGR foreground color code for this class. Total mapping:
    /// adding a class means adding exactly one arm here.
    pub fn color(self) -> u8 {
        match self {
            HighlightKind::Comment | HighlightKind::BlockComment => 36,
            HighlightKind::KeywordPrimary => 33,
            HighlightKind::KeywordSecondary => 32,
            HighlightKind::String => 35,
            HighlightKind::Number => 31,
            HighlightKind::Match => 34,
            HighlightKind::Normal | HighlightKind::NonPrint => 37,
        }
    }
}

/// A static language definition.
///
/// Keywords keep their registry order; a trailing `|` marks a secondary
/// keyword (types and literals) and is not part of the matched text.
pub struct Language {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    pub keywords: &'static [&'static str],
    pub line_comment: Option<&'static str>,
    pub block_comment: Option<(&'static str, &'static str)>,
    pub highlight_strings: bool,
    pub highlight_numbers: bool,
}

const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "continue", "default", "do", "else", "enum",
    "extern", "for", "goto", "if", "register", "return", "sizeof", "static",
    "struct", "switch", "typedef", "union", "volatile", "while", "NULL",
    "alignas", "alignof", "and", "and_eq", "asm", "bitand", "bitor", "class",
    "compl", "constexpr", "const_cast", "deltype", "delete", "dynamic_cast",
    "explicit", "export", "false", "friend", "inline", "mutable", "namespace",
    "new", "noexcept", "not", "not_eq", "nullptr", "operator", "or", "or_eq",
    "private", "protected", "public", "reinterpret_cast", "static_assert",
    "static_cast", "template", "this", "thread_local", "throw", "true", "try",
    "typeid", "typename", "virtual", "xor", "xor_eq",
    "int|", "long|", "double|", "float|", "char|", "unsigned|", "signed|",
    "void|", "short|", "auto|", "const|", "bool|",
];

const CLIKE_KEYWORDS: &[&str] = &[
    "if", "else", "while", "for", "return", "print",
    "int|", "float|", "void|", "char|", "string|",
];

const JS_KEYWORDS: &[&str] = &[
    "function", "var", "let", "const", "if", "else", "switch", "case",
    "default", "for", "while", "do", "break", "continue", "return", "try",
    "catch", "throw", "new", "this", "typeof", "instanceof", "true", "false",
    "null", "undefined",
    "Number|", "String|", "Boolean|", "Object|", "Array|", "Function|",
];

const PY_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "finally", "for", "from", "global", "if", "import",
    "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
    "True|", "False|", "None|",
];

/// Registry order matters: `select_language` takes the first match.
pub static LANGUAGES: &[Language] = &[
    Language {
        name: "c",
        extensions: &[".c", ".h", ".cpp", ".hpp", ".cc"],
        keywords: C_KEYWORDS,
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        highlight_strings: true,
        highlight_numbers: true,
    },
    Language {
        name: "clike",
        extensions: &[".clike"],
        keywords: CLIKE_KEYWORDS,
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        highlight_strings: true,
        highlight_numbers: true,
    },
    Language {
        name: "javascript",
        extensions: &[".js"],
        keywords: JS_KEYWORDS,
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        highlight_strings: true,
        highlight_numbers: true,
    },
    Language {
        name: "python",
        extensions: &[".py"],
        keywords: PY_KEYWORDS,
        line_comment: Some("#"),
        block_comment: None,
        highlight_strings: true,
        highlight_numbers: true,
    },
];

/// Picks the language for a file name by case-sensitive suffix match,
/// first registry entry wins. `None` disables highlighting.
pub fn select_language(filename: &str) -> Option<&'static Language> {
    LANGUAGES
        .iter()
        .find(|lang| lang.extensions.iter().any(|ext| filename.ends_with(ext)))
}
