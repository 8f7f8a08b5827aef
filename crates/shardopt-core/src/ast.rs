//! Typed statement surface handed to the optimizer by the parser.
//!
//! Only the shape the router needs is modelled: the statement kind and the
//! logical tables it touches. The original SQL text rides along so the
//! execution layer can forward it to the chosen shards.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of statement kinds the proxy recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    CreateTable,
    DropTable,
    Truncate,
    AlterTable,
    CreateIndex,
    DropIndex,
}

impl StatementKind {
    pub const ALL: [StatementKind; 10] = [
        StatementKind::Select,
        StatementKind::Insert,
        StatementKind::Update,
        StatementKind::Delete,
        StatementKind::CreateTable,
        StatementKind::DropTable,
        StatementKind::Truncate,
        StatementKind::AlterTable,
        StatementKind::CreateIndex,
        StatementKind::DropIndex,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::CreateTable => "CREATE TABLE",
            StatementKind::DropTable => "DROP TABLE",
            StatementKind::Truncate => "TRUNCATE",
            StatementKind::AlterTable => "ALTER TABLE",
            StatementKind::CreateIndex => "CREATE INDEX",
            StatementKind::DropIndex => "DROP INDEX",
        }
    }

    /// Schema-defining statements carry no row predicate to prune by.
    pub fn is_ddl(self) -> bool {
        !matches!(
            self,
            StatementKind::Select
                | StatementKind::Insert
                | StatementKind::Update
                | StatementKind::Delete
        )
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Possibly-qualified table identifier, e.g. `shop.orders`.
///
/// Routing keys on the last segment (`suffix`); any prefix names the
/// logical schema and is not part of the sharding lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableName(Vec<String>);

impl TableName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self(vec![schema.into(), name.into()])
    }

    /// Split on `.`; empty segments are dropped.
    pub fn parse(s: &str) -> Self {
        Self(
            s.split('.')
                .map(|p| p.trim().trim_matches('`'))
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn suffix(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or("")
    }

    pub fn prefix(&self) -> Option<&str> {
        if self.0.len() > 1 {
            self.0.first().map(String::as_str)
        } else {
            None
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl From<&str> for TableName {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTableStmt {
    pub table: TableName,
    #[serde(default)]
    pub if_not_exists: bool,
    pub sql: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTableStmt {
    pub tables: Vec<TableName>,
    #[serde(default)]
    pub if_exists: bool,
    pub sql: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncateStmt {
    pub table: TableName,
    pub sql: String,
}

/// Row-level statements are parsed but routed elsewhere; only the touched
/// tables are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectStmt {
    pub from: Vec<TableName>,
    pub sql: String,
}

/// One parsed SQL command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    CreateTable(CreateTableStmt),
    DropTable(DropTableStmt),
    Truncate(TruncateStmt),
    Select(SelectStmt),
}

impl Statement {
    pub fn create_table(table: impl Into<TableName>) -> Self {
        let table = table.into();
        let sql = format!("CREATE TABLE {table}");
        Statement::CreateTable(CreateTableStmt {
            table,
            if_not_exists: false,
            sql,
        })
    }

    pub fn drop_table<I, T>(tables: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TableName>,
    {
        let tables: Vec<TableName> = tables.into_iter().map(Into::into).collect();
        let names: Vec<String> = tables.iter().map(ToString::to_string).collect();
        let sql = format!("DROP TABLE {}", names.join(", "));
        Statement::DropTable(DropTableStmt {
            tables,
            if_exists: false,
            sql,
        })
    }

    pub fn truncate(table: impl Into<TableName>) -> Self {
        let table = table.into();
        let sql = format!("TRUNCATE TABLE {table}");
        Statement::Truncate(TruncateStmt { table, sql })
    }

    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::CreateTable(_) => StatementKind::CreateTable,
            Statement::DropTable(_) => StatementKind::DropTable,
            Statement::Truncate(_) => StatementKind::Truncate,
            Statement::Select(_) => StatementKind::Select,
        }
    }

    /// Original SQL text.
    pub fn sql(&self) -> &str {
        match self {
            Statement::CreateTable(s) => &s.sql,
            Statement::DropTable(s) => &s.sql,
            Statement::Truncate(s) => &s.sql,
            Statement::Select(s) => &s.sql,
        }
    }

    /// Logical tables referenced, in statement order.
    pub fn tables(&self) -> Vec<&TableName> {
        match self {
            Statement::CreateTable(s) => vec![&s.table],
            Statement::Truncate(s) => vec![&s.table],
            Statement::DropTable(s) => s.tables.iter().collect(),
            Statement::Select(s) => s.from.iter().collect(),
        }
    }

    pub fn as_create_table(&self) -> Option<&CreateTableStmt> {
        match self {
            Statement::CreateTable(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_drop_table(&self) -> Option<&DropTableStmt> {
        match self {
            Statement::DropTable(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_truncate(&self) -> Option<&TruncateStmt> {
        match self {
            Statement::Truncate(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_ignores_schema_prefix() {
        let t = TableName::parse("shop.`orders`");
        assert_eq!(t.suffix(), "orders");
        assert_eq!(t.prefix(), Some("shop"));
        assert_eq!(t.to_string(), "shop.orders");

        let bare = TableName::new("orders");
        assert_eq!(bare.suffix(), "orders");
        assert_eq!(bare.prefix(), None);
    }

    #[test]
    fn kind_tags_match_variants() {
        assert_eq!(Statement::create_table("t").kind(), StatementKind::CreateTable);
        assert_eq!(Statement::drop_table(["a", "b"]).kind(), StatementKind::DropTable);
        assert_eq!(Statement::truncate("t").kind(), StatementKind::Truncate);
        assert!(StatementKind::CreateTable.is_ddl());
        assert!(!StatementKind::Select.is_ddl());
    }

    #[test]
    fn drop_table_keeps_statement_order() {
        let stmt = Statement::drop_table(["b", "a"]);
        let names: Vec<&str> = stmt.tables().iter().map(|t| t.suffix()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(stmt.sql(), "DROP TABLE b, a");
    }
}
