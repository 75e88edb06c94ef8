//! Column definitions parsed from `"name type-and-constraints"` strings.

use crate::error::{TableError, TableResult};

/// Words that end the type part of a column fragment.
const CONSTRAINT_KEYWORDS: &[&str] = &[
    "not",
    "null",
    "primary",
    "key",
    "default",
    "unique",
    "references",
    "check",
    "constraint",
    "collate",
    "generated",
    "auto_increment",
    "comment",
    "unsigned",
    "signed",
    "zerofill",
    "charset",
    "on",
];

/// One declared column: its name and the SQL fragment that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    name: String,
    definition: String,
}

impl ColumnDef {
    /// Parse `"age int not null"` into (`age`, `int not null`).
    ///
    /// Surrounding whitespace is trimmed and the string is split on its first
    /// whitespace character. A definition with no whitespace has no type part
    /// and is rejected.
    pub fn parse(def: &str) -> TableResult<Self> {
        let def = def.trim();
        let Some(idx) = def.find(char::is_whitespace) else {
            return Err(TableError::malformed(format!(
                "expected `name type`, got {def:?}"
            )));
        };
        let (name, rest) = def.split_at(idx);
        Ok(Self {
            name: name.to_string(),
            definition: rest.trim_start().to_string(),
        })
    }

    /// Column name as declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type and constraint fragment, e.g. `int not null`.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// DDL form: `name definition`.
    pub fn to_ddl(&self) -> String {
        format!("{} {}", self.name, self.definition)
    }

    /// The type part of the fragment without length/precision modifiers or
    /// constraints, used to cast bound text parameters.
    ///
    /// `varchar(50) not null` -> `varchar`, `timestamp(3) with time zone` ->
    /// `timestamp with time zone`. MySQL tails such as `unsigned` or
    /// `character set utf8` end the type too. Serial pseudo-types map to
    /// their integer type.
    pub fn sql_type(&self) -> Option<String> {
        let stripped = strip_parenthesized(&self.definition);
        let lowered: Vec<String> = stripped
            .split_whitespace()
            .map(str::to_ascii_lowercase)
            .collect();
        let end = lowered
            .iter()
            .enumerate()
            .position(|(i, w)| {
                CONSTRAINT_KEYWORDS.contains(&w.as_str())
                    || (w == "character" && lowered.get(i + 1).is_some_and(|n| n == "set"))
            })
            .unwrap_or(lowered.len());
        let words: Vec<&str> = stripped.split_whitespace().take(end).collect();
        if words.is_empty() {
            return None;
        }

        let ty = words.join(" ");
        let mapped = match ty.to_ascii_lowercase().as_str() {
            "serial" | "serial4" => "integer".to_string(),
            "bigserial" | "serial8" => "bigint".to_string(),
            "smallserial" | "serial2" => "smallint".to_string(),
            _ => ty,
        };
        Some(mapped)
    }
}

fn strip_parenthesized(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}
