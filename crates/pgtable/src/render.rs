//! SQL text rendering for the table builder.
//!
//! All functions here are pure: they only turn builder state into text, so the
//! exact statements can be checked without a database.

use crate::column::ColumnDef;
use crate::dialect::Dialect;
use crate::error::{TableError, TableResult};

/// `create table if not exists <table>(<id>,<col> <def>,...);`
pub fn create_table(
    dialect: Dialect,
    table: &str,
    columns: &[ColumnDef],
    custom_primary_key: bool,
) -> String {
    let mut parts = Vec::with_capacity(columns.len() + 1);
    if !custom_primary_key {
        parts.push(dialect.synthetic_id_column().to_string());
    }
    parts.extend(columns.iter().map(ColumnDef::to_ddl));
    format!("create table if not exists {}({});", table, parts.join(","))
}

/// `select * from <table>;`
pub fn select_all(table: &str) -> String {
    format!("select * from {table};")
}

/// Check that every row has the same width as the declared columns, or as
/// the first row when no columns were declared. Returns that width.
pub fn check_rows(columns: &[ColumnDef], rows: &[Vec<String>]) -> TableResult<usize> {
    let expected = if columns.is_empty() {
        rows.first().map_or(0, Vec::len)
    } else {
        columns.len()
    };
    for (row, values) in rows.iter().enumerate() {
        if values.len() != expected {
            return Err(TableError::RowArity {
                row,
                expected,
                got: values.len(),
            });
        }
    }
    Ok(expected)
}

/// Multi-row INSERT with values inlined as string literals.
///
/// ``insert into users(`name`,`age`)values("a","b"),("c","d");``
pub fn insert_inline(
    dialect: Dialect,
    table: &str,
    columns: &[ColumnDef],
    rows: &[Vec<String>],
) -> String {
    let tuples: Vec<String> = rows
        .iter()
        .map(|row| {
            let values: Vec<String> = row.iter().map(|v| dialect.string_literal(v)).collect();
            format!("({})", values.join(","))
        })
        .collect();
    format!("{}{};", insert_head(dialect, table, columns), tuples.join(","))
}

/// Whether every value can be bound with a typed placeholder.
///
/// Postgres receives bound values as text, so each one needs a column type
/// to cast to. Without declared columns, or with a column whose type cannot
/// be read from its definition, the values must be inlined instead.
pub fn bindable(dialect: Dialect, columns: &[ColumnDef]) -> bool {
    match dialect {
        Dialect::MySql => true,
        Dialect::Postgres => {
            !columns.is_empty() && columns.iter().all(|c| c.sql_type().is_some())
        }
    }
}

/// Multi-row INSERT with one bind placeholder per value.
///
/// Parameters are numbered row by row, left to right, matching the order of
/// `rows.iter().flatten()`. Fails with [`TableError::TooManyParameters`] when
/// the statement would exceed the dialect's limit.
pub fn insert_bound(
    dialect: Dialect,
    table: &str,
    columns: &[ColumnDef],
    rows: &[Vec<String>],
) -> TableResult<String> {
    let count: usize = rows.iter().map(Vec::len).sum();
    if count > dialect.max_params() {
        return Err(TableError::TooManyParameters {
            count,
            max: dialect.max_params(),
        });
    }

    let types: Vec<Option<String>> = columns.iter().map(ColumnDef::sql_type).collect();
    let mut idx = 0usize;
    let tuples: Vec<String> = rows
        .iter()
        .map(|row| {
            let values: Vec<String> = (0..row.len())
                .map(|col| {
                    idx += 1;
                    let ty = types.get(col).and_then(Option::as_deref);
                    dialect.placeholder(idx, ty)
                })
                .collect();
            format!("({})", values.join(","))
        })
        .collect();
    Ok(format!(
        "{}{};",
        insert_head(dialect, table, columns),
        tuples.join(",")
    ))
}

fn insert_head(dialect: Dialect, table: &str, columns: &[ColumnDef]) -> String {
    if columns.is_empty() {
        return format!("insert into {table} values");
    }
    let names: Vec<String> = columns
        .iter()
        .map(|c| dialect.quote_ident(c.name()))
        .collect();
    format!("insert into {}({})values", table, names.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(defs: &[&str]) -> Vec<ColumnDef> {
        defs.iter().map(|d| ColumnDef::parse(d).unwrap()).collect()
    }

    fn rows(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|v| v.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_create_with_synthetic_id() {
        let sql = create_table(
            Dialect::MySql,
            "users",
            &cols(&["name varchar(50)", "age int"]),
            false,
        );
        assert_eq!(
            sql,
            "create table if not exists users(id int(12) not null primary key auto_increment,name varchar(50),age int);"
        );
    }

    #[test]
    fn test_create_with_custom_primary_key() {
        let sql = create_table(
            Dialect::Postgres,
            "pages",
            &cols(&["url text primary key", "title text"]),
            true,
        );
        assert_eq!(
            sql,
            "create table if not exists pages(url text primary key,title text);"
        );
    }

    #[test]
    fn test_create_postgres_id() {
        let sql = create_table(Dialect::Postgres, "t", &cols(&["a int"]), false);
        assert_eq!(
            sql,
            "create table if not exists t(id bigserial not null primary key,a int);"
        );
    }

    #[test]
    fn test_insert_inline_mysql() {
        let sql = insert_inline(
            Dialect::MySql,
            "users",
            &cols(&["name varchar(50)", "age int"]),
            &rows(&[&["a", "b"], &["c", "d"]]),
        );
        assert_eq!(sql, "insert into users(`name`,`age`)values(\"a\",\"b\"),(\"c\",\"d\");");
    }

    #[test]
    fn test_insert_inline_escapes_double_quote() {
        let sql = insert_inline(
            Dialect::MySql,
            "quotes",
            &cols(&["body text"]),
            &rows(&[&["he said \"no\""]]),
        );
        assert_eq!(
            sql,
            "insert into quotes(`body`)values(\"he said \\\"no\\\"\");"
        );
    }

    #[test]
    fn test_insert_inline_postgres() {
        let sql = insert_inline(
            Dialect::Postgres,
            "users",
            &cols(&["name text"]),
            &rows(&[&["o'neil"]]),
        );
        assert_eq!(sql, "insert into users(name)values('o''neil');");
    }

    #[test]
    fn test_insert_without_columns_omits_list() {
        let sql = insert_inline(Dialect::MySql, "raw", &[], &rows(&[&["x"]]));
        assert_eq!(sql, "insert into raw values(\"x\");");
    }

    #[test]
    fn test_insert_bound_postgres_numbers_row_major() {
        let sql = insert_bound(
            Dialect::Postgres,
            "users",
            &cols(&["name varchar(50)", "age int not null"]),
            &rows(&[&["a", "1"], &["b", "2"]]),
        )
        .unwrap();
        assert_eq!(
            sql,
            "insert into users(name,age)values(CAST($1::text AS varchar),CAST($2::text AS int)),(CAST($3::text AS varchar),CAST($4::text AS int));"
        );
    }

    #[test]
    fn test_create_and_insert_name_columns_alike() {
        let columns = cols(&["Title text", "Url text"]);
        let create = create_table(Dialect::Postgres, "pages", &columns, false);
        let inline = insert_inline(Dialect::Postgres, "pages", &columns, &rows(&[&["a", "b"]]));
        let bound = insert_bound(Dialect::Postgres, "pages", &columns, &rows(&[&["a", "b"]]))
            .unwrap();

        assert_eq!(
            create,
            "create table if not exists pages(id bigserial not null primary key,Title text,Url text);"
        );
        assert!(inline.starts_with("insert into pages(Title,Url)values"), "{inline}");
        assert!(bound.starts_with("insert into pages(Title,Url)values"), "{bound}");
        for sql in [&create, &inline, &bound] {
            assert!(!sql.contains("\"Title\""), "{sql}");
        }
    }

    #[test]
    fn test_bindable() {
        assert!(bindable(Dialect::Postgres, &cols(&["a int", "b varchar(5)"])));
        assert!(!bindable(Dialect::Postgres, &[]));
        assert!(!bindable(Dialect::Postgres, &cols(&["a int", "pk PRIMARY KEY"])));
        assert!(bindable(Dialect::MySql, &[]));
    }

    #[test]
    fn test_insert_bound_mysql() {
        let sql = insert_bound(
            Dialect::MySql,
            "users",
            &cols(&["name varchar(50)", "age int"]),
            &rows(&[&["a", "b"], &["c", "d"]]),
        )
        .unwrap();
        assert_eq!(sql, "insert into users(`name`,`age`)values(?,?),(?,?);");
    }

    #[test]
    fn test_insert_bound_rejects_too_many_params() {
        let columns = cols(&["a text", "b text"]);
        let many = vec![vec!["x".to_string(), "y".to_string()]; 40_000];
        let err = insert_bound(Dialect::Postgres, "t", &columns, &many).unwrap_err();
        assert!(matches!(
            err,
            TableError::TooManyParameters {
                count: 80_000,
                max: 65_535
            }
        ));
    }

    #[test]
    fn test_check_rows() {
        let columns = cols(&["a text", "b text"]);
        assert_eq!(check_rows(&columns, &rows(&[&["1", "2"]])).unwrap(), 2);

        let err = check_rows(&columns, &rows(&[&["1", "2"], &["3"]])).unwrap_err();
        assert!(matches!(
            err,
            TableError::RowArity {
                row: 1,
                expected: 2,
                got: 1
            }
        ));

        // without declared columns the first row sets the width
        assert_eq!(check_rows(&[], &rows(&[&["1"], &["2"]])).unwrap(), 1);
        assert!(check_rows(&[], &rows(&[&["1"], &["2", "3"]])).is_err());
    }

    #[test]
    fn test_select_all() {
        assert_eq!(select_all("users"), "select * from users;");
    }
}
