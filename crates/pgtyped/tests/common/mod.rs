//! Table modules in the shape `pgtyped gen` emits, written by hand.

#![allow(dead_code)]

use pgtyped::prelude::*;
use pgtyped::serde_json;
use pgtyped::tokio_postgres::Row;
use pgtyped::tokio_postgres::types::ToSql;
use std::sync::Mutex;

pub mod users {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    pub struct UsersTag;

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct UsersRecord {
        pub id: i64,
        pub email: String,
        pub nickname: Option<String>,
        pub age: Option<i32>,
        pub profile: serde_json::Value,
        pub tags: Vec<String>,
    }

    impl Record for UsersRecord {
        fn scan_column(&mut self, column: &str, row: &Row, idx: usize) -> OrmResult<()> {
            match column {
                "id" => self.id = row.try_get_at(idx, column)?,
                "email" => self.email = row.try_get_at(idx, column)?,
                "nickname" => self.nickname = row.try_get_at(idx, column)?,
                "age" => self.age = row.try_get_at(idx, column)?,
                "profile" => self.profile = row.try_get_at(idx, column)?,
                "tags" => self.tags = row.try_get_at(idx, column)?,
                _ => return Err(OrmError::decode(column, "unknown column")),
            }
            Ok(())
        }

        fn column_value(&self, column: &str) -> Option<Param> {
            match column {
                "id" => Some(Param::new(self.id)),
                "email" => Some(Param::new(self.email.clone())),
                "nickname" => Some(Param::new(self.nickname.clone())),
                "age" => Some(Param::new(self.age)),
                "profile" => Some(Param::new(self.profile.clone())),
                "tags" => Some(Param::new(self.tags.clone())),
                _ => None,
            }
        }
    }

    pub struct Users {
        pub table: TableDef<UsersTag>,
        pub id: Column<UsersTag, i64, Ordinal, NotNull>,
        pub email: Column<UsersTag, String, Text, NotNull>,
        pub nickname: Column<UsersTag, String, Text, Nullable>,
        pub age: Column<UsersTag, i32, Ordinal, Nullable>,
        pub profile: Column<UsersTag, serde_json::Value, Opaque, NotNull>,
        pub tags: Column<UsersTag, Vec<String>, Opaque, NotNull>,
    }

    impl Users {
        pub fn new() -> Self {
            Self {
                table: TableDef::new(
                    "users",
                    vec![
                        ColumnDescriptor::new("id", SqlType::BigInt),
                        ColumnDescriptor::new("email", SqlType::Text),
                        ColumnDescriptor::new("nickname", SqlType::Text).nullable(),
                        ColumnDescriptor::new("age", SqlType::Integer).nullable(),
                        ColumnDescriptor::new("profile", SqlType::Jsonb),
                        ColumnDescriptor::new("tags", SqlType::Text).array(),
                    ],
                ),
                id: Column::new("id"),
                email: Column::new("email"),
                nickname: Column::new("nickname"),
                age: Column::new("age"),
                profile: Column::new("profile"),
                tags: Column::new("tags"),
            }
        }

        pub fn repository(&self) -> Repository<UsersTag, UsersRecord> {
            Repository::new(self.table.clone())
        }
    }

    impl Default for Users {
        fn default() -> Self {
            Self::new()
        }
    }
}

pub mod orders {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    pub struct OrdersTag;

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct OrdersRecord {
        pub id: i64,
        pub user_id: i64,
        pub total: f64,
    }

    impl Record for OrdersRecord {
        fn scan_column(&mut self, column: &str, row: &Row, idx: usize) -> OrmResult<()> {
            match column {
                "id" => self.id = row.try_get_at(idx, column)?,
                "user_id" => self.user_id = row.try_get_at(idx, column)?,
                "total" => self.total = row.try_get_at(idx, column)?,
                _ => return Err(OrmError::decode(column, "unknown column")),
            }
            Ok(())
        }

        fn column_value(&self, column: &str) -> Option<Param> {
            match column {
                "id" => Some(Param::new(self.id)),
                "user_id" => Some(Param::new(self.user_id)),
                "total" => Some(Param::new(self.total)),
                _ => None,
            }
        }
    }

    pub struct Orders {
        pub table: TableDef<OrdersTag>,
        pub id: Column<OrdersTag, i64, Ordinal, NotNull>,
        pub user_id: Column<OrdersTag, i64, Ordinal, NotNull>,
        pub total: Column<OrdersTag, f64, Ordinal, NotNull>,
    }

    impl Orders {
        pub fn new() -> Self {
            Self {
                table: TableDef::new(
                    "orders",
                    vec![
                        ColumnDescriptor::new("id", SqlType::BigInt),
                        ColumnDescriptor::new("user_id", SqlType::BigInt),
                        ColumnDescriptor::new("total", SqlType::DoublePrecision),
                    ],
                ),
                id: Column::new("id"),
                user_id: Column::new("user_id"),
                total: Column::new("total"),
            }
        }
    }
}

/// Records every statement it is handed and answers with no rows.
#[derive(Default)]
pub struct RecordingClient {
    pub seen: Mutex<Vec<(String, usize)>>,
    pub affected: u64,
}

impl RecordingClient {
    pub fn affecting(affected: u64) -> Self {
        Self {
            affected,
            ..Default::default()
        }
    }

    pub fn statements(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }

    fn record(&self, sql: &str, n: usize) {
        self.seen.lock().unwrap().push((sql.to_string(), n));
    }
}

impl GenericClient for RecordingClient {
    async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> OrmResult<Vec<Row>> {
        self.record(sql, params.len());
        Ok(Vec::new())
    }

    async fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> OrmResult<u64> {
        self.record(sql, params.len());
        Ok(self.affected)
    }
}
