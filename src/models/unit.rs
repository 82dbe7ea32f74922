//! SQLite mapping for units of measure
//!
//! Units are stored by their wire name ("kg", "mL", "fl oz", ...).

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::costing::UnitOfMeasure;
use crate::db::DbError;

impl ToSql for UnitOfMeasure {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for UnitOfMeasure {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        UnitOfMeasure::from_str(s).ok_or_else(|| {
            FromSqlError::Other(Box::new(DbError::Corrupt(format!("unknown unit '{}'", s))))
        })
    }
}
