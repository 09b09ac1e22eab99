//! Statement guard - permission layer for query execution
//!
//! Classifies a query by its leading keyword and checks the three mutating
//! kinds (INSERT, UPDATE, DELETE) against the configured policy. Every other
//! kind, including garbage, is left to the database's own access control.

use std::fmt;

/// The leading token of a query, lower-cased
///
/// Not a validated SQL category: whatever precedes the first whitespace is
/// the kind, and an empty or blank query has an empty kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementKind(String);

impl StatementKind {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The mutating operation this kind names, if any
    pub fn mutation(&self) -> Option<Mutation> {
        match self.0.as_str() {
            "insert" => Some(Mutation::Insert),
            "update" => Some(Mutation::Update),
            "delete" => Some(Mutation::Delete),
            _ => None,
        }
    }

    /// Whether statements of this kind produce a result set even when empty
    pub fn returns_rows(&self) -> bool {
        matches!(
            self.0.as_str(),
            "select" | "show" | "with" | "explain" | "describe" | "desc" | "table" | "values"
        )
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classify a query string by its leading keyword
///
/// The query is trimmed and lower-cased, then cut at the first whitespace
/// character. A query with no whitespace is its own kind.
pub fn classify(sql: &str) -> StatementKind {
    let normalized = sql.trim().to_lowercase();
    let kind = normalized
        .split(char::is_whitespace)
        .next()
        .unwrap_or_default();
    StatementKind(kind.to_string())
}

/// Whether `sql` holds at most one statement
///
/// The connection negotiates multi-statement support, so anything after a
/// top-level `;` would run unchecked by the policy. Semicolons inside quoted
/// strings, identifiers and comments do not count, and a trailing `;` followed
/// only by whitespace or comments is fine. Quoted text is scanned both with
/// and without backslash escapes (the server's `NO_BACKSLASH_ESCAPES` mode is
/// unknown here) and both readings must agree on a single statement.
pub fn is_single_statement(sql: &str) -> bool {
    let chars: Vec<char> = sql.chars().collect();
    scan_single_statement(&chars, true) && scan_single_statement(&chars, false)
}

fn scan_single_statement(chars: &[char], backslash_escapes: bool) -> bool {
    let mut terminated = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        // `--` opens a comment only when followed by whitespace or the end
        let line_comment = c == '#'
            || (c == '-'
                && next == Some('-')
                && chars.get(i + 2).map_or(true, |c| c.is_whitespace()));
        // `/*!` and `/*+` bodies are executed or parsed by the server
        let block_comment = c == '/'
            && next == Some('*')
            && !matches!(chars.get(i + 2), Some('!') | Some('+'));

        if line_comment {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
        } else if block_comment {
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                i += 1;
            }
            i += 2;
            continue;
        } else if !c.is_whitespace() {
            if terminated {
                return false;
            }
            if c == ';' {
                terminated = true;
            } else if matches!(c, '\'' | '"' | '`') {
                i = skip_quoted(chars, i, backslash_escapes && c != '`');
                continue;
            }
        }
        i += 1;
    }

    true
}

/// Index just past the quoted run opening at `start`. A doubled quote is an
/// escaped quote; an unterminated run consumes the rest of the input.
fn skip_quoted(chars: &[char], start: usize, backslash_escapes: bool) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        if backslash_escapes && chars[i] == '\\' {
            i += 2;
        } else if chars[i] == quote {
            if chars.get(i + 1) == Some(&quote) {
                i += 2;
            } else {
                return i + 1;
            }
        } else {
            i += 1;
        }
    }
    chars.len()
}

/// Statement kinds that the permission policy gates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mutation::Insert => "INSERT",
            Mutation::Update => "UPDATE",
            Mutation::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Allow-list for the mutating statement kinds. Everything is denied by
/// default and the policy never changes after startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermissionPolicy {
    pub allow_insert: bool,
    pub allow_update: bool,
    pub allow_delete: bool,
}

impl PermissionPolicy {
    /// Policy with every mutating kind enabled
    pub fn allow_all() -> Self {
        Self {
            allow_insert: true,
            allow_update: true,
            allow_delete: true,
        }
    }

    /// Whether statements of `kind` may reach the database
    pub fn allows(&self, kind: &StatementKind) -> bool {
        match kind.mutation() {
            Some(mutation) => self.allows_mutation(mutation),
            None => true,
        }
    }

    pub fn allows_mutation(&self, mutation: Mutation) -> bool {
        match mutation {
            Mutation::Insert => self.allow_insert,
            Mutation::Update => self.allow_update,
            Mutation::Delete => self.allow_delete,
        }
    }

    /// Check a classified statement, returning the denied mutation on refusal
    pub fn check(&self, kind: &StatementKind) -> Result<(), Mutation> {
        match kind.mutation() {
            Some(mutation) if !self.allows_mutation(mutation) => Err(mutation),
            _ => Ok(()),
        }
    }

    /// Names of the enabled mutating kinds, for server instructions
    pub fn enabled(&self) -> Vec<Mutation> {
        [Mutation::Insert, Mutation::Update, Mutation::Delete]
            .into_iter()
            .filter(|m| self.allows_mutation(*m))
            .collect()
    }
}
