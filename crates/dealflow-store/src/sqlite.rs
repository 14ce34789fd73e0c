// SPDX-License-Identifier: Apache-2.0

use crate::schema::ensure_schema;
use crate::{Result, Store, StoreError, StoreSession};
use chrono::{DateTime, SecondsFormat, Utc};
use dealflow_model::{
    Deal, DealCreate, DealId, DealStage, EngineeringTicket, Requirement, RequirementCreate,
    RequirementId, TicketCreate, TicketPriority, TicketStatus,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const DEAL_COLUMNS: &str = "id, title, client_name, revenue_impact, currency, stage, \
    probability, forecast_date, created_at";

#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    pub path: PathBuf,
    pub busy_timeout: Duration,
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("dealflow.sqlite"),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// SQLite-backed store. Every session owns its own connection.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    cfg: SqliteStoreConfig,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file and ensures the schema.
    pub fn open(cfg: SqliteStoreConfig) -> Result<Self> {
        let store = Self { cfg };
        let conn = store.connect()?;
        ensure_schema(&conn)?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.cfg.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| StoreError::Unavailable(format!("{}: {e}", self.cfg.path.display())))?;
        conn.busy_timeout(self.cfg.busy_timeout)?;
        Ok(conn)
    }
}

impl Store for SqliteStore {
    fn backend_tag(&self) -> &'static str {
        "sqlite"
    }

    fn open_session(&self) -> Result<Box<dyn StoreSession>> {
        let conn = self.connect()?;
        debug!(path = %self.cfg.path.display(), "store session opened");
        Ok(Box::new(SqliteSession { conn }))
    }
}

pub(crate) struct SqliteSession {
    conn: Connection,
}

impl Drop for SqliteSession {
    fn drop(&mut self) {
        debug!("store session released");
    }
}

fn timestamp_text(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn decode_failure(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|text| {
        DateTime::parse_from_rfc3339(&text)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| decode_failure(idx, e))
    })
    .transpose()
}

fn deal_from_row(row: &Row<'_>) -> rusqlite::Result<Deal> {
    let stage: String = row.get(5)?;
    let created_at = timestamp_column(row, 8)?.ok_or(rusqlite::Error::InvalidColumnType(
        8,
        "created_at".to_string(),
        Type::Null,
    ))?;
    Ok(Deal {
        id: row.get(0)?,
        title: row.get(1)?,
        client_name: row.get(2)?,
        revenue_impact: row.get(3)?,
        currency: row.get(4)?,
        stage: DealStage::parse(&stage).map_err(|e| decode_failure(5, e))?,
        probability: row.get(6)?,
        forecast_date: timestamp_column(row, 7)?,
        created_at,
    })
}

fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<EngineeringTicket> {
    let priority: String = row.get(1)?;
    let status: String = row.get(2)?;
    Ok(EngineeringTicket {
        id: row.get(0)?,
        priority: TicketPriority::parse(&priority).map_err(|e| decode_failure(1, e))?,
        status: TicketStatus::parse(&status).map_err(|e| decode_failure(2, e))?,
        requirement_id: row.get(3)?,
    })
}

fn requirement_from_row(row: &Row<'_>) -> rusqlite::Result<Requirement> {
    Ok(Requirement {
        id: row.get(0)?,
        description: row.get(1)?,
        deal_id: row.get(2)?,
    })
}

impl StoreSession for SqliteSession {
    fn insert_deal(&mut self, create: &DealCreate) -> Result<Deal> {
        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO deals
             (title, client_name, revenue_impact, currency, stage, probability,
              forecast_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                create.title,
                create.client_name,
                create.revenue_impact,
                create.currency,
                create.stage.as_str(),
                create.probability,
                create.forecast_date.as_ref().map(timestamp_text),
                timestamp_text(&created_at),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        // Re-read so the returned value reflects what was persisted.
        self.deal(id)?.ok_or(StoreError::Decode {
            column: "id",
            message: format!("inserted deal {id} vanished"),
        })
    }

    fn insert_requirement(&mut self, create: &RequirementCreate) -> Result<Requirement> {
        self.conn.execute(
            "INSERT INTO requirements (description, deal_id) VALUES (?1, ?2)",
            params![create.description, create.deal_id],
        )?;
        Ok(Requirement {
            id: self.conn.last_insert_rowid(),
            description: create.description.clone(),
            deal_id: create.deal_id,
        })
    }

    fn insert_ticket(&mut self, create: &TicketCreate) -> Result<EngineeringTicket> {
        self.conn.execute(
            "INSERT INTO engineering_tickets (priority, status, requirement_id)
             VALUES (?1, ?2, ?3)",
            params![
                create.priority.as_str(),
                create.status.as_str(),
                create.requirement_id
            ],
        )?;
        Ok(EngineeringTicket {
            id: self.conn.last_insert_rowid(),
            priority: create.priority,
            status: create.status,
            requirement_id: create.requirement_id,
        })
    }

    fn deal(&self, id: DealId) -> Result<Option<Deal>> {
        let deal = self
            .conn
            .query_row(
                &format!("SELECT {DEAL_COLUMNS} FROM deals WHERE id = ?1"),
                params![id],
                deal_from_row,
            )
            .optional()?;
        Ok(deal)
    }

    fn deals_by_revenue(&self) -> Result<Vec<Deal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DEAL_COLUMNS} FROM deals ORDER BY revenue_impact DESC, id ASC"
        ))?;
        let rows = stmt.query_map([], deal_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn requirements_for_deal(&self, deal_id: DealId) -> Result<Vec<Requirement>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, description, deal_id FROM requirements WHERE deal_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![deal_id], requirement_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn tickets_for_requirement(
        &self,
        requirement_id: RequirementId,
    ) -> Result<Vec<EngineeringTicket>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, priority, status, requirement_id FROM engineering_tickets
             WHERE requirement_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![requirement_id], ticket_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
