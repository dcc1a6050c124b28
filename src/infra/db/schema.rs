//! Declarative table schemas.
//!
//! A [`TableSchema`] describes a table as data. It is validated before any
//! DDL is rendered, then turned into an idempotent `CREATE TABLE IF NOT EXISTS`
//! statement with sea-query.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::sea_query::{Alias, ColumnDef, Table, TableCreateStatement};

use crate::errors::{AppError, AppResult};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("invalid identifier regex"));

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Auto-incrementing integer identity
    Serial,
    Integer,
    BigInteger,
    Text,
    Boolean,
    TimestampTz,
}

/// One column of a [`TableSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
    pub nullable: bool,
    pub unique: bool,
    pub primary_key: bool,
}

impl ColumnSpec {
    /// A required (`NOT NULL`) column.
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            unique: false,
            primary_key: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
}

/// Declarative description of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Append a column.
    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    /// Check the schema is well formed.
    ///
    /// # Errors
    /// Returns [`AppError::Schema`] for bad identifiers, an empty column list,
    /// duplicate column names, more than one primary key, or a nullable
    /// primary key.
    pub fn validate(&self) -> AppResult<()> {
        if !IDENTIFIER.is_match(&self.name) {
            return Err(AppError::schema(format!("invalid table name {:?}", self.name)));
        }
        if self.columns.is_empty() {
            return Err(AppError::schema(format!("table {} declares no columns", self.name)));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !IDENTIFIER.is_match(&column.name) {
                return Err(AppError::schema(format!(
                    "invalid column name {:?} in table {}",
                    column.name, self.name
                )));
            }
            if !seen.insert(column.name.to_ascii_lowercase()) {
                return Err(AppError::schema(format!(
                    "duplicate column {} in table {}",
                    column.name, self.name
                )));
            }
            if column.primary_key && column.nullable {
                return Err(AppError::schema(format!(
                    "primary key {} in table {} cannot be nullable",
                    column.name, self.name
                )));
            }
        }

        let primary_keys = self.columns.iter().filter(|c| c.primary_key).count();
        if primary_keys > 1 {
            return Err(AppError::schema(format!(
                "table {} declares {} primary keys",
                self.name, primary_keys
            )));
        }

        Ok(())
    }

    /// Render the idempotent create statement. Call [`validate`](Self::validate) first.
    pub fn create_statement(&self) -> TableCreateStatement {
        let mut table = Table::create();
        table.table(Alias::new(&self.name)).if_not_exists();

        for column in &self.columns {
            let mut def = ColumnDef::new(Alias::new(&column.name));
            match column.kind {
                ColumnKind::Serial => def.integer().auto_increment(),
                ColumnKind::Integer => def.integer(),
                ColumnKind::BigInteger => def.big_integer(),
                ColumnKind::Text => def.text(),
                ColumnKind::Boolean => def.boolean(),
                ColumnKind::TimestampTz => def.timestamp_with_time_zone(),
            };
            if column.nullable {
                def.null();
            } else {
                def.not_null();
            }
            if column.primary_key {
                def.primary_key();
            } else if column.unique {
                def.unique_key();
            }
            table.col(&mut def);
        }

        table
    }
}
