//! StarRocks SQL dialect
//!
//! SQL generation for the one warehouse family this crate targets, using
//! sea-query for the insert path (MySQL syntax) and manual SQL for metadata
//! probes and DDL. The dialect never interpolates record data into SQL text;
//! the insert path is fully parameterized.

use sea_query::{Alias, Expr, IntoIden, MysqlQueryBuilder, Query, TableRef};
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::types::{ColumnSpec, ColumnType, TableIdent};

/// Pattern for identifiers (namespace, table and column names) that are safe
/// to quote into generated SQL.
static IDENTIFIER_PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,63}$").unwrap());

/// Escape a string literal for inclusion in single quotes
fn escape_string_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "''")
}

/// Validate that an identifier is safe for inclusion in generated SQL
pub fn validate_identifier(kind: &str, name: &str) -> Result<()> {
    if IDENTIFIER_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(Error::schema(format!(
            "invalid {} identifier '{}': must match [A-Za-z_][A-Za-z0-9_]*",
            kind, name
        )))
    }
}

fn sea_table_ref(ident: &TableIdent) -> TableRef {
    match ident.namespace.as_deref() {
        Some(ns) => TableRef::SchemaTable(
            Alias::new(ns).into_iden(),
            Alias::new(ident.table.as_str()).into_iden(),
        ),
        None => TableRef::Table(Alias::new(ident.table.as_str()).into_iden()),
    }
}

/// SQL dialect for the StarRocks frontend
#[derive(Debug, Clone, Copy, Default)]
pub struct StarrocksDialect;

impl StarrocksDialect {
    /// Get the dialect name
    pub fn name(&self) -> &'static str {
        "StarRocks"
    }

    /// Quote an identifier (table, column name)
    pub fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    /// Render a table reference, scoped to the ident's namespace when present.
    /// The catalog segment is never rendered; the connection is already
    /// scoped to `catalog.warehouse`.
    pub fn table_ref(&self, ident: &TableIdent) -> String {
        match ident.namespace.as_deref() {
            Some(ns) => format!(
                "{}.{}",
                self.quote_identifier(ns),
                self.quote_identifier(&ident.table)
            ),
            None => self.quote_identifier(&ident.table),
        }
    }

    /// Get the native type name for a column type
    pub fn native_type(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::Double => "DOUBLE".to_string(),
            ColumnType::Varchar(len) => format!("VARCHAR({})", len),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime => "DATETIME".to_string(),
        }
    }

    /// SQL for checking table existence via metadata introspection.
    ///
    /// External catalogs are not guaranteed to answer this reliably; the
    /// existence prober owns the recovery policy for the resulting error.
    pub fn table_exists_sql(&self, ident: &TableIdent) -> String {
        match ident.namespace.as_deref() {
            Some(ns) => format!(
                "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_schema = '{}' AND table_name = '{}')",
                escape_string_literal(ns),
                escape_string_literal(&ident.table)
            ),
            None => format!(
                "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_schema = DATABASE() AND table_name = '{}')",
                escape_string_literal(&ident.table)
            ),
        }
    }

    /// DDL creating the table when it is structurally absent.
    ///
    /// A plain columnar table: all columns nullable, no key or partition
    /// clauses. Idempotency under concurrent invocation is carried by
    /// `IF NOT EXISTS` at the catalog layer rather than by a pre-check here.
    pub fn create_table_sql(&self, ident: &TableIdent, columns: &[ColumnSpec]) -> String {
        let column_defs: Vec<String> = columns
            .iter()
            .map(|c| {
                format!(
                    "{} {} NULL",
                    self.quote_identifier(&c.name),
                    self.native_type(&c.column_type)
                )
            })
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.table_ref(ident),
            column_defs.join(", ")
        )
    }

    /// Parameterized multi-row insert statement
    pub fn insert_sql(&self, ident: &TableIdent, columns: &[&str], row_count: usize) -> String {
        let col_idens: Vec<_> = columns.iter().map(|c| Alias::new(*c).into_iden()).collect();

        let mut stmt = Query::insert();
        stmt.into_table(sea_table_ref(ident)).columns(col_idens);
        for _ in 0..row_count {
            let values: Vec<_> = columns.iter().map(|_| Expr::cust("?")).collect();
            stmt.values_panic(values);
        }

        stmt.to_string(MysqlQueryBuilder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        let dialect = StarrocksDialect;
        assert_eq!(dialect.quote_identifier("events"), "`events`");
        assert_eq!(dialect.quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("table", "events").is_ok());
        assert!(validate_identifier("table", "_private").is_ok());
        assert!(validate_identifier("table", "events_v2").is_ok());

        assert!(validate_identifier("table", "").is_err());
        assert!(validate_identifier("table", "1starts_with_digit").is_err());
        assert!(validate_identifier("table", "has space").is_err());
        assert!(validate_identifier("table", "Robert'; DROP TABLE--").is_err());
    }

    #[test]
    fn test_native_types() {
        let dialect = StarrocksDialect;
        assert_eq!(dialect.native_type(&ColumnType::Boolean), "BOOLEAN");
        assert_eq!(dialect.native_type(&ColumnType::BigInt), "BIGINT");
        assert_eq!(dialect.native_type(&ColumnType::Double), "DOUBLE");
        assert_eq!(
            dialect.native_type(&ColumnType::Varchar(65535)),
            "VARCHAR(65535)"
        );
        assert_eq!(dialect.native_type(&ColumnType::Date), "DATE");
        assert_eq!(dialect.native_type(&ColumnType::DateTime), "DATETIME");
    }

    #[test]
    fn test_table_exists_sql() {
        let dialect = StarrocksDialect;
        let sql = dialect.table_exists_sql(&TableIdent::new("warehouse1", "events"));
        assert!(sql.contains("information_schema.tables"));
        assert!(sql.contains("table_schema = 'warehouse1'"));
        assert!(sql.contains("table_name = 'events'"));

        let sql = dialect.table_exists_sql(&TableIdent::bare("events"));
        assert!(sql.contains("DATABASE()"));
    }

    #[test]
    fn test_table_exists_sql_escapes_literals() {
        let dialect = StarrocksDialect;
        let sql = dialect.table_exists_sql(&TableIdent::new("ns", "o'brien"));
        assert!(sql.contains("o''brien"));
    }

    #[test]
    fn test_create_table_sql() {
        let dialect = StarrocksDialect;
        let ident = TableIdent::new("warehouse1", "events");
        let columns = vec![
            ColumnSpec::new("id", ColumnType::BigInt),
            ColumnSpec::new("name", ColumnType::Varchar(65535)),
        ];
        let sql = dialect.create_table_sql(&ident, &columns);
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS `warehouse1`.`events` (`id` BIGINT NULL, `name` VARCHAR(65535) NULL)"
        );
    }

    #[test]
    fn test_create_table_sql_has_no_key_or_partition_clauses() {
        let dialect = StarrocksDialect;
        let sql = dialect.create_table_sql(
            &TableIdent::new("w", "t"),
            &[ColumnSpec::new("id", ColumnType::BigInt)],
        );
        assert!(!sql.contains("PRIMARY KEY"));
        assert!(!sql.contains("PARTITION"));
        assert!(!sql.contains("DISTRIBUTED"));
    }

    #[test]
    fn test_insert_sql() {
        let dialect = StarrocksDialect;
        let ident = TableIdent::new("warehouse1", "events");
        let sql = dialect.insert_sql(&ident, &["id", "name"], 2);
        assert!(sql.starts_with("INSERT INTO"));
        assert!(sql.contains("`warehouse1`.`events`"));
        assert!(sql.contains("`id`"));
        assert!(sql.contains("`name`"));
        assert!(sql.contains("(?, ?), (?, ?)"));
    }

    #[test]
    fn test_insert_sql_without_namespace() {
        let dialect = StarrocksDialect;
        let sql = dialect.insert_sql(&TableIdent::bare("events"), &["id"], 1);
        assert!(sql.contains("`events`"));
        assert!(sql.contains("(?)"));
    }
}
