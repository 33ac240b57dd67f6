use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{Connection, Row, params};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::{InvestmentRecord, ResearchRecord, Store, StoredEntry, StoredRecord};
use crate::config::Settings;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE TABLE IF NOT EXISTS investment_opportunities (
        record_id INTEGER PRIMARY KEY REFERENCES records(id),
        company_name TEXT,
        sector TEXT,
        revenue_currency TEXT,
        risk_assessment TEXT,
        exit_strategy TEXT
    );
    CREATE TABLE IF NOT EXISTS research_records (
        record_id INTEGER PRIMARY KEY REFERENCES records(id),
        url TEXT NOT NULL,
        task TEXT,
        result TEXT
    );";

const INDEX_SCHEMA: &str = "CREATE VIRTUAL TABLE IF NOT EXISTS record_index USING fts5(body);";

const SELECT: &str = "SELECT r.id, r.kind, r.created_at,
        i.company_name, i.sector, i.revenue_currency, i.risk_assessment, i.exit_strategy,
        s.url, s.task, s.result
    FROM records r
    LEFT JOIN investment_opportunities i ON i.record_id = r.id
    LEFT JOIN research_records s ON s.record_id = r.id";

const SCAN_FILTER: &str = "WHERE i.company_name LIKE ?1 OR i.sector LIKE ?1
        OR i.revenue_currency LIKE ?1 OR i.risk_assessment LIKE ?1
        OR i.exit_strategy LIKE ?1 OR s.url LIKE ?1 OR s.task LIKE ?1 OR s.result LIKE ?1";

const INDEX_FILTER: &str =
    "WHERE r.id IN (SELECT rowid FROM record_index WHERE record_index MATCH ?1)";

/// SQLite-backed append-only result store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    indexed: bool,
}

impl SqliteStore {
    /// Open or create the result tables. The full-text index is only
    /// maintained when `settings.disable_vector_backend` is false.
    pub fn open(path: &str, settings: &Settings) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open result database")?;
        conn.execute_batch(SCHEMA)
            .context("failed to create result tables")?;

        let indexed = !settings.disable_vector_backend;
        if indexed {
            conn.execute_batch(INDEX_SCHEMA)
                .context("failed to create search index")?;
        }

        let store = Self {
            conn: Mutex::new(conn),
            indexed,
        };
        if indexed {
            store.index_missing()?;
        }
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:", &Settings::default())
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("result store connection poisoned"))
    }

    /// Index records written while the index was disabled.
    fn index_missing(&self) -> Result<()> {
        let conn = self.conn()?;
        let sql = format!(
            "{SELECT} WHERE r.id NOT IN (SELECT rowid FROM record_index) ORDER BY r.id ASC"
        );
        let missing = query(&conn, &sql, [])?;
        for entry in &missing {
            conn.execute(
                "INSERT INTO record_index (rowid, body) VALUES (?1, ?2)",
                params![entry.id, entry.record.text()],
            )?;
        }
        if !missing.is_empty() {
            debug!(count = missing.len(), "indexed existing records");
        }
        Ok(())
    }
}

fn query<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<StoredEntry>> {
    let mut stmt = conn.prepare(sql)?;
    let entries = stmt
        .query_map(params, entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<StoredEntry> {
    let kind: String = row.get(1)?;
    let record = match kind.as_str() {
        "investment" => StoredRecord::Investment(InvestmentRecord {
            company_name: row.get(3)?,
            sector: row.get(4)?,
            revenue_currency: row.get(5)?,
            risk_assessment: row.get(6)?,
            exit_strategy: row.get(7)?,
        }),
        "research" => StoredRecord::Research(ResearchRecord {
            url: row.get(8)?,
            task: row.get(9)?,
            result: row.get(10)?,
        }),
        other => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                1,
                Type::Text,
                format!("unknown record kind: {other}").into(),
            ));
        }
    };
    Ok(StoredEntry {
        id: row.get(0)?,
        created_at: row.get(2)?,
        record,
    })
}

/// Quote a user query as a single FTS5 phrase.
fn fts_phrase(query: &str) -> String {
    format!("\"{}\"", query.replace('"', "\"\""))
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert(&self, record: StoredRecord) -> Result<i64> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute("INSERT INTO records (kind) VALUES (?1)", [record.kind()])?;
        let id = tx.last_insert_rowid();

        match &record {
            StoredRecord::Investment(r) => {
                tx.execute(
                    "INSERT INTO investment_opportunities
                        (record_id, company_name, sector, revenue_currency, risk_assessment, exit_strategy)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        id,
                        r.company_name,
                        r.sector,
                        r.revenue_currency,
                        r.risk_assessment,
                        r.exit_strategy
                    ],
                )?;
            }
            StoredRecord::Research(r) => {
                tx.execute(
                    "INSERT INTO research_records (record_id, url, task, result)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![id, r.url, r.task, r.result],
                )?;
            }
        }

        if self.indexed {
            tx.execute(
                "INSERT INTO record_index (rowid, body) VALUES (?1, ?2)",
                params![id, record.text()],
            )?;
        }

        tx.commit().context("failed to commit record")?;
        debug!(id, kind = record.kind(), "record stored");
        Ok(id)
    }

    async fn all(&self) -> Result<Vec<StoredEntry>> {
        let conn = self.conn()?;
        query(&conn, &format!("{SELECT} ORDER BY r.id ASC"), [])
    }

    async fn search(&self, q: &str) -> Result<Vec<StoredEntry>> {
        let q = q.trim();
        if q.is_empty() {
            return self.all().await;
        }

        let conn = self.conn()?;
        if self.indexed {
            let sql = format!("{SELECT} {INDEX_FILTER} ORDER BY r.id ASC");
            query(&conn, &sql, [fts_phrase(q)])
        } else {
            let sql = format!("{SELECT} {SCAN_FILTER} ORDER BY r.id ASC");
            query(&conn, &sql, [format!("%{q}%")])
        }
    }
}
