use super::driver::DatabaseDriver;
use crate::config::ConnectionSettings;
use crate::error::{BackupError, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::io::Write;
use tracing::{debug, info};
pub struct PostgresDriver {
    pool: PgPool,
    config: ConnectionSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
}

impl PostgresDriver {
    pub fn new(config: &ConnectionSettings) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database);

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_lazy_with(options);

        Ok(Self {
            pool,
            config: config.clone(),
        })
    }
    fn quote_ident(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
    fn escape_literal(s: &str) -> String {
        s.replace('\'', "''")
    }
    async fn get_tables(&self) -> Result<Vec<String>> {
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT tablename FROM pg_tables WHERE schemaname = 'public' ORDER BY tablename",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tables)
    }
    async fn get_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let rows = sqlx::query(
            "SELECT column_name, data_type, is_nullable, column_default \
             FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 \
             ORDER BY ordinal_position",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Err(BackupError::Export(format!(
                "table '{}' has no columns in information_schema",
                table
            )));
        }

        rows.iter()
            .map(|row| {
                Ok(ColumnInfo {
                    name: row.try_get("column_name")?,
                    data_type: row.try_get("data_type")?,
                    nullable: row.try_get::<String, _>("is_nullable")? == "YES",
                    default: row.try_get("column_default")?,
                })
            })
            .collect()
    }
    /// Rebuild a logical CREATE TABLE statement from information_schema
    /// column metadata.
    fn render_create_table(table: &str, columns: &[ColumnInfo]) -> String {
        let column_defs: Vec<String> = columns
            .iter()
            .map(|col| {
                let mut def = format!("    {} {}", Self::quote_ident(&col.name), col.data_type);
                if !col.nullable {
                    def.push_str(" NOT NULL");
                }
                if let Some(default) = &col.default {
                    def.push_str(&format!(" DEFAULT {}", default));
                }
                def
            })
            .collect();

        format!(
            "CREATE TABLE {} (\n{}\n);",
            Self::quote_ident(table),
            column_defs.join(",\n")
        )
    }
    async fn dump_table_data<W: Write + Send>(
        &self,
        table: &str,
        columns: &[ColumnInfo],
        writer: &mut W,
    ) -> Result<()> {
        // Every value is selected as text so row decoding stays uniform
        // across column types.
        let select_list = columns
            .iter()
            .map(|c| format!("{}::text", Self::quote_ident(&c.name)))
            .collect::<Vec<_>>()
            .join(", ");
        let select_query = format!(
            "SELECT {} FROM {}",
            select_list,
            Self::quote_ident(table)
        );
        let rows: Vec<PgRow> = sqlx::query(&select_query).fetch_all(&self.pool).await?;

        if rows.is_empty() {
            return Ok(());
        }

        let column_list = columns
            .iter()
            .map(|c| Self::quote_ident(&c.name))
            .collect::<Vec<_>>()
            .join(", ");

        let batch_size = 100;
        for chunk in rows.chunks(batch_size) {
            let mut insert = format!(
                "INSERT INTO {} ({}) VALUES\n",
                Self::quote_ident(table),
                column_list
            );

            let values: Vec<String> = chunk
                .iter()
                .map(|row| {
                    let vals: Vec<String> = (0..columns.len())
                        .map(|i| match row.try_get::<Option<String>, _>(i) {
                            Ok(Some(text)) => format!("'{}'", Self::escape_literal(&text)),
                            Ok(None) | Err(_) => "NULL".to_string(),
                        })
                        .collect();
                    format!("({})", vals.join(", "))
                })
                .collect();

            insert.push_str(&values.join(",\n"));
            insert.push_str(";\n\n");

            writer.write_all(insert.as_bytes())?;
        }

        Ok(())
    }
}

#[async_trait]
impl DatabaseDriver for PostgresDriver {
    async fn test_connection(&self) -> Result<()> {
        info!(
            "Testing Postgres connection to {}:{}",
            self.config.host, self.config.port
        );
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| BackupError::Connection(e.to_string()))?;
        info!("Postgres connection successful");
        Ok(())
    }

    async fn dump_database(&self, db_name: &str, mut writer: Box<dyn Write + Send>) -> Result<()> {
        info!("Starting dump of database: {}", db_name);
        let header = format!(
            "-- PostgreSQL dump generated by sql-drive-backup\n\
             -- Database: {}\n\
             -- Generated at: {}\n\n\
             SET client_encoding = 'UTF8';\n\
             SET standard_conforming_strings = on;\n\n",
            db_name,
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );
        writer.write_all(header.as_bytes())?;
        let tables = self.get_tables().await?;
        info!("Found {} tables in database {}", tables.len(), db_name);

        for table in &tables {
            debug!("Dumping table: {}", table);
            let table_header = format!(
                "\n-- Table: {}\n-- ----------------------------------------\n\n",
                table
            );
            writer.write_all(table_header.as_bytes())?;
            let drop_stmt = format!("DROP TABLE IF EXISTS {} CASCADE;\n\n", Self::quote_ident(table));
            writer.write_all(drop_stmt.as_bytes())?;
            let columns = self.get_columns(table).await?;
            writer.write_all(Self::render_create_table(table, &columns).as_bytes())?;
            writer.write_all(b"\n\n")?;
            self.dump_table_data(table, &columns, &mut writer).await?;
        }

        info!("Completed dump of database: {}", db_name);
        Ok(())
    }

    fn engine_name(&self) -> &'static str {
        "Postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_literal() {
        assert_eq!(
            PostgresDriver::escape_literal("it's a 'test'"),
            "it''s a ''test''"
        );
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(PostgresDriver::quote_ident("users"), "\"users\"");
        assert_eq!(PostgresDriver::quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_render_create_table() {
        let columns = vec![
            ColumnInfo {
                name: "id".into(),
                data_type: "integer".into(),
                nullable: false,
                default: Some("nextval('users_id_seq'::regclass)".into()),
            },
            ColumnInfo {
                name: "name".into(),
                data_type: "text".into(),
                nullable: true,
                default: None,
            },
        ];

        let stmt = PostgresDriver::render_create_table("users", &columns);
        assert_eq!(
            stmt,
            "CREATE TABLE \"users\" (\n    \"id\" integer NOT NULL DEFAULT nextval('users_id_seq'::regclass),\n    \"name\" text\n);"
        );
    }
}
