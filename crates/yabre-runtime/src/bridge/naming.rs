//! Slot naming and the function binding table
//!
//! Every check and action is installed as a script function. A source that
//! declares `fn name(...)` keeps its own name; anything else is wrapped in a
//! function named after its slot. Wrapped names never collide with each other,
//! with declared names, or with prelude and host functions: a taken name gets
//! a numeric suffix.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

const RHAI_KEYWORDS: &[&str] = &[
    "true", "false", "let", "const", "if", "else", "switch", "do", "while", "until", "loop",
    "for", "in", "continue", "break", "return", "throw", "try", "catch", "fn", "private",
    "import", "export", "as", "global", "Fn", "call", "curry", "this", "type_of", "print",
    "debug", "eval", "is_def_var", "is_def_fn", "is_shared", "is", "var", "static", "shared",
    "goto", "exit", "match", "case", "public", "protected", "new", "use", "with", "module",
    "package", "super", "thread", "spawn", "go", "await", "async", "sync", "yield", "default",
    "void", "null", "nil",
];

fn function_declaration() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\bfn\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").ok())
        .as_ref()
}

/// Name of the first function declared in `source`, if any
pub fn extract_function_name(source: &str) -> Option<&str> {
    function_declaration()?
        .captures(source)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str())
}

/// Turn a slot name into a valid script identifier
///
/// Characters outside `[A-Za-z0-9_]` become `_`; names without a letter get
/// a `slot_` prefix, names starting with a digit a `_` prefix, and keywords a
/// trailing `_`.
pub fn sanitize_identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if !ident.chars().any(|c| c.is_ascii_alphabetic()) {
        ident.insert_str(0, "slot_");
    } else if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }

    if RHAI_KEYWORDS.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

/// A slot's installed name and the script that installs it
#[derive(Debug, Clone, PartialEq)]
pub struct SlotScript {
    pub function: String,
    pub script: String,
}

/// Names already claimed in one environment
#[derive(Debug, Clone, Default)]
pub struct NameAllocator {
    taken: BTreeSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` as-is; claiming it twice is allowed
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Claim a fresh identifier derived from `slot`
    ///
    /// `go-left` becomes `go_left`, or `go_left_2` if that is taken.
    pub fn allocate(&mut self, slot: &str) -> String {
        let base = sanitize_identifier(slot);
        let mut name = base.clone();
        let mut suffix = 2;
        while self.taken.contains(&name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        self.taken.insert(name.clone());
        name
    }
}

/// Decide how a slot's source is installed
///
/// Declared names must already be reserved in `names` so that a wrapped slot
/// processed earlier cannot take them.
pub fn slot_script(slot: &str, source: &str, names: &mut NameAllocator) -> SlotScript {
    match extract_function_name(source) {
        Some(function) => SlotScript {
            function: function.to_string(),
            script: source.to_string(),
        },
        None => {
            let function = names.allocate(slot);
            SlotScript {
                script: format!("fn {}() {{\n{}\n}}", function, source),
                function,
            }
        }
    }
}

/// What a slot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotKind {
    /// A condition's check, keyed by the condition name
    Check,
    /// A decision's action, keyed by the decision name
    Action,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKind::Check => write!(f, "check"),
            SlotKind::Action => write!(f, "action"),
        }
    }
}

/// Run-scoped map from a slot to its installed function
///
/// Checks and actions are kept apart, so a condition named `approve_true`
/// and the action of `approve`'s true branch never share an entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionBindings {
    bindings: BTreeMap<(SlotKind, String), String>,
}

impl FunctionBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, kind: SlotKind, slot: impl Into<String>, function: impl Into<String>) {
        self.bindings.insert((kind, slot.into()), function.into());
    }

    /// Installed function name for a slot
    pub fn resolve(&self, kind: SlotKind, slot: &str) -> Option<&str> {
        self.bindings
            .get(&(kind, slot.to_string()))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotKind, &str, &str)> {
        self.bindings
            .iter()
            .map(|((kind, slot), function)| (*kind, slot.as_str(), function.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
