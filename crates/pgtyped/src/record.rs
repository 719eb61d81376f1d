//! Row mapping for generated record types.

use crate::column::Field;
use crate::error::{OrmError, OrmResult};
use crate::param::Param;
use tokio_postgres::Row;

/// A struct holding one row of a table.
///
/// Generated per table. Scanning is driven by a statement's projection or
/// RETURNING list: for each listed column, in order, [`Record::scan_column`] is
/// called with that column's position in the result row.
///
/// # Example
///
/// ```ignore
/// impl Record for User {
///     fn scan_column(&mut self, column: &str, row: &Row, idx: usize) -> OrmResult<()> {
///         match column {
///             "id" => self.id = row.try_get_at(idx, column)?,
///             "email" => self.email = row.try_get_at(idx, column)?,
///             _ => return Err(OrmError::decode(column, "unknown column")),
///         }
///         Ok(())
///     }
///
///     fn column_value(&self, column: &str) -> Option<Param> {
///         match column {
///             "id" => Some(Param::new(self.id)),
///             "email" => Some(Param::new(self.email.clone())),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Record: Default + Send + Sync {
    /// Decode the value at `idx` of `row` into the field backing `column`.
    fn scan_column(&mut self, column: &str, row: &Row, idx: usize) -> OrmResult<()>;

    /// The current value of `column`, or `None` if the record has no such column.
    fn column_value(&self, column: &str) -> Option<Param>;

    /// Values of `fields`, in order, for bulk transfer.
    fn values<T>(&self, fields: &[Field<T>]) -> OrmResult<Vec<Param>> {
        fields
            .iter()
            .map(|f| {
                self.column_value(f.name())
                    .ok_or_else(|| OrmError::decode(f.name(), "record has no such column"))
            })
            .collect()
    }

    /// Build a record from a row whose columns are `columns`, in order.
    fn from_row(row: &Row, columns: &[&str]) -> OrmResult<Self> {
        let mut rec = Self::default();
        for (idx, column) in columns.iter().enumerate() {
            rec.scan_column(column, row, idx)?;
        }
        Ok(rec)
    }
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get the value at `idx`, reporting failures against `column`.
    fn try_get_at<T>(&self, idx: usize, column: &str) -> OrmResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_at<T>(&self, idx: usize, column: &str) -> OrmResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>,
    {
        self.try_get(idx)
            .map_err(|e| OrmError::decode(column, e.to_string()))
    }
}
