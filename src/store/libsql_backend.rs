//! libSQL backend: async `TicketStore` implementation.
//!
//! File-backed databases open a fresh connection per operation; the
//! connection is dropped when the call returns, on success or error.
//! In-memory databases share one connection, since every new connection
//! to `:memory:` would see an empty database.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{Ticket, TicketStatus, TicketStore};

/// Column list for full ticket reads, in `row_to_ticket` order.
const TICKET_COLUMNS: &str = "ticket_id, status, description, created_at";

enum ConnectionMode {
    PerOperation,
    Shared(Connection),
}

/// libSQL ticket store.
pub struct LibSqlBackend {
    db: LibSqlDatabase,
    mode: ConnectionMode,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatabaseError::Pool(format!("Failed to create database directory: {e}"))
                })?;
            }
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self {
            db,
            mode: ConnectionMode::PerOperation,
        };
        backend.init_schema().await?;
        info!(path = %path.display(), "Ticket database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db,
            mode: ConnectionMode::Shared(conn),
        };
        backend.init_schema().await?;
        Ok(backend)
    }

    /// Acquire a connection for one operation.
    fn conn(&self) -> Result<Connection, DatabaseError> {
        match &self.mode {
            ConnectionMode::Shared(conn) => Ok(conn.clone()),
            ConnectionMode::PerOperation => self
                .db
                .connect()
                .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}"))),
        }
    }

    async fn init_schema(&self) -> Result<(), DatabaseError> {
        let conn = self.conn()?;
        migrations::run_migrations(&conn).await
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Map a libsql Row to a Ticket. Column order matches `TICKET_COLUMNS`.
fn row_to_ticket(row: &libsql::Row) -> Result<Ticket, libsql::Error> {
    let ticket_id: String = row.get(0)?;
    let status: String = row.get::<String>(1).unwrap_or_else(|_| "Unresolved".into());
    let description: String = row.get::<String>(2).unwrap_or_default();
    let created_str: String = row.get::<String>(3).unwrap_or_default();

    Ok(Ticket {
        ticket_id,
        status: TicketStatus::from_db(&status),
        description,
        created_at: parse_datetime(&created_str),
    })
}

#[async_trait]
impl TicketStore for LibSqlBackend {
    async fn insert_ticket(
        &self,
        ticket_id: &str,
        status: &TicketStatus,
        description: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO support_tickets (ticket_id, status, description) VALUES (?1, ?2, ?3)",
            params![ticket_id, status.as_str(), description],
        )
        .await
        .map_err(|e| DatabaseError::from_libsql("insert_ticket", e))?;

        debug!(ticket_id = ticket_id, status = %status, "Ticket inserted into DB");
        Ok(())
    }

    async fn get_ticket_status(
        &self,
        ticket_id: &str,
    ) -> Result<Option<TicketStatus>, DatabaseError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT status FROM support_tickets WHERE ticket_id = ?1",
                params![ticket_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_ticket_status: {e}")))?;

        match rows.next().await {
            // A NULL status (legacy rows) reads as no record.
            Ok(Some(row)) => Ok(row
                .get::<String>(0)
                .ok()
                .map(|s| TicketStatus::from_db(&s))),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_ticket_status: {e}"))),
        }
    }

    async fn get_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>, DatabaseError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                &format!("SELECT {TICKET_COLUMNS} FROM support_tickets WHERE ticket_id = ?1"),
                params![ticket_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_ticket: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let ticket = row_to_ticket(&row)
                    .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
                Ok(Some(ticket))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_ticket: {e}"))),
        }
    }

    async fn count_tickets(&self) -> Result<usize, DatabaseError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query("SELECT COUNT(*) FROM support_tickets", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("count_tickets: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
                Ok(count.max(0) as usize)
            }
            Ok(None) => Ok(0),
            Err(e) => Err(DatabaseError::Query(format!("count_tickets: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> LibSqlBackend {
        LibSqlBackend::new_memory().await.unwrap()
    }

    #[tokio::test]
    async fn insert_and_get_status() {
        let db = test_db().await;
        db.insert_ticket("482913", &TicketStatus::Unresolved, "card declined twice")
            .await
            .unwrap();

        let status = db.get_ticket_status("482913").await.unwrap();
        assert_eq!(status, Some(TicketStatus::Unresolved));
    }

    #[tokio::test]
    async fn get_status_not_found() {
        let db = test_db().await;
        let status = db.get_ticket_status("111111").await.unwrap();
        assert!(status.is_none());
    }

    #[tokio::test]
    async fn duplicate_id_is_constraint_error() {
        let db = test_db().await;
        db.insert_ticket("123456", &TicketStatus::Unresolved, "first")
            .await
            .unwrap();

        let err = db
            .insert_ticket("123456", &TicketStatus::Unresolved, "second")
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Constraint(_)), "got {err:?}");

        let ticket = db.get_ticket("123456").await.unwrap().unwrap();
        assert_eq!(ticket.description, "first");
        assert_eq!(db.count_tickets().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn get_ticket_full_record() {
        let db = test_db().await;
        let before = Utc::now() - chrono::Duration::seconds(5);
        db.insert_ticket("654321", &TicketStatus::Unresolved, "app crashes on login")
            .await
            .unwrap();

        let ticket = db.get_ticket("654321").await.unwrap().unwrap();
        assert_eq!(ticket.ticket_id, "654321");
        assert_eq!(ticket.status, TicketStatus::Unresolved);
        assert_eq!(ticket.description, "app crashes on login");
        assert!(ticket.created_at >= before);
    }

    #[tokio::test]
    async fn operator_status_is_preserved() {
        let db = test_db().await;
        db.insert_ticket("777777", &TicketStatus::Other("Escalated".into()), "x")
            .await
            .unwrap();
        let status = db.get_ticket_status("777777").await.unwrap().unwrap();
        assert_eq!(status.to_string(), "Escalated");
    }

    #[tokio::test]
    async fn file_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("support.db");

        {
            let db = LibSqlBackend::new_local(&path).await.unwrap();
            db.insert_ticket("246810", &TicketStatus::Unresolved, "late transfer")
                .await
                .unwrap();
        }

        let reopened = LibSqlBackend::new_local(&path).await.unwrap();
        let status = reopened.get_ticket_status("246810").await.unwrap();
        assert_eq!(status, Some(TicketStatus::Unresolved));
        assert_eq!(reopened.count_tickets().await.unwrap(), 1);
    }

    #[test]
    fn parse_sqlite_datetime() {
        let dt = parse_datetime("2026-03-01 12:30:45");
        assert_eq!(dt.to_rfc3339(), "2026-03-01T12:30:45+00:00");
        assert_eq!(parse_datetime("garbage"), DateTime::<Utc>::MIN_UTC);
    }
}
