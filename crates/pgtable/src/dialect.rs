//! SQL flavour used when rendering statements.

/// Rendering dialect.
///
/// `Postgres` matches the bundled `tokio-postgres` driver and is the default.
/// `MySql` reproduces the legacy text (`int(12) ... auto_increment`, back-tick
/// identifiers, `?` placeholders) for statements shipped to other drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    MySql,
    #[default]
    Postgres,
}

impl Dialect {
    /// Column injected by `create()` when no custom primary key was set.
    pub fn synthetic_id_column(self) -> &'static str {
        match self {
            Dialect::MySql => "id int(12) not null primary key auto_increment",
            Dialect::Postgres => "id bigserial not null primary key",
        }
    }

    /// Render a column name for an INSERT column list.
    ///
    /// CREATE writes names unquoted, so Postgres folds them to lower case.
    /// INSERT must refer to them the same way: quoting would keep the case
    /// and miss a `Title` column that was created as `title`. MySql column
    /// names are case-insensitive, so back-ticks are safe there.
    pub fn quote_ident(self, ident: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", ident.replace('`', "``")),
            Dialect::Postgres => ident.to_string(),
        }
    }

    /// Render a value as an inline string literal.
    ///
    /// MySql escapes backslashes before double quotes, so `\"` in a value
    /// cannot terminate the literal.
    pub fn string_literal(self, value: &str) -> String {
        match self {
            Dialect::MySql => {
                let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{escaped}\"")
            }
            Dialect::Postgres => format!("'{}'", value.replace('\'', "''")),
        }
    }

    /// Bind placeholder for the 1-based parameter `idx`.
    ///
    /// For Postgres the parameter is sent as text and cast to the column's
    /// declared type when one is known.
    pub fn placeholder(self, idx: usize, sql_type: Option<&str>) -> String {
        match self {
            Dialect::MySql => "?".to_string(),
            Dialect::Postgres => match sql_type {
                Some(ty) => format!("CAST(${idx}::text AS {ty})"),
                None => format!("${idx}"),
            },
        }
    }

    /// Maximum bind parameters a single statement may carry.
    pub fn max_params(self) -> usize {
        match self {
            Dialect::MySql | Dialect::Postgres => 65_535,
        }
    }
}
