// SPDX-License-Identifier: Apache-2.0

use crate::{Result, StoreError};
use rusqlite::Connection;

pub const SCHEMA_VERSION: i64 = 1;

pub const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS deals (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  title TEXT NOT NULL,
  client_name TEXT,
  revenue_impact REAL NOT NULL DEFAULT 0.0,
  currency TEXT NOT NULL DEFAULT 'GBP',
  stage TEXT NOT NULL DEFAULT 'Discovery',
  probability INTEGER NOT NULL DEFAULT 20,
  forecast_date TEXT,
  created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_deals_revenue_impact ON deals(revenue_impact DESC, id);
CREATE TABLE IF NOT EXISTS requirements (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  description TEXT NOT NULL,
  deal_id INTEGER NOT NULL REFERENCES deals(id)
);
CREATE INDEX IF NOT EXISTS idx_requirements_deal_id ON requirements(deal_id);
CREATE TABLE IF NOT EXISTS engineering_tickets (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  priority TEXT NOT NULL DEFAULT 'Medium',
  status TEXT NOT NULL DEFAULT 'Open',
  requirement_id INTEGER NOT NULL REFERENCES requirements(id)
);
CREATE INDEX IF NOT EXISTS idx_engineering_tickets_requirement_id
  ON engineering_tickets(requirement_id);
";

/// Creates the three entity tables if they are missing. There are no
/// migrations; an existing schema is left as is.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version == 0 {
        conn.execute_batch(&format!("PRAGMA user_version={SCHEMA_VERSION};"))?;
    } else if version != SCHEMA_VERSION {
        return Err(StoreError::Unavailable(format!(
            "unsupported schema version {version}, expected {SCHEMA_VERSION}"
        )));
    }
    Ok(())
}
