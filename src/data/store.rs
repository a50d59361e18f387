use std::collections::BTreeSet;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::series::TickSeries;
use crate::types::{SeriesKey, Side, Tick, TimeKey};

use super::schema;

/// Abstraction over the tick snapshot.
pub trait TickStore {
    fn init(&self) -> Result<()>;
    fn insert_ticks(&self, key: &SeriesKey, side: Side, ticks: &[Tick]) -> Result<()>;
    /// Every (instrument, year) with at least one tick on either side, sorted.
    fn list_keys(&self) -> Result<Vec<SeriesKey>>;
    fn load_series(&self, key: &SeriesKey, side: Side) -> Result<TickSeries>;
    /// Tick count for one side, without loading the series.
    fn count_ticks(&self, key: &SeriesKey, side: Side) -> Result<usize>;
}

/// SQLite-backed implementation.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a file-backed database.
    pub fn open(path: &std::path::Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Ok(Self { conn })
    }

    /// Open an existing snapshot, failing if the file is missing.
    pub fn open_existing(path: &std::path::Path) -> Result<Self> {
        if !path.is_file() {
            anyhow::bail!("snapshot not found: {}", path.display());
        }
        Self::open(path)
    }

    /// Open an in-memory database (useful for tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl TickStore for SqliteStore {
    fn init(&self) -> Result<()> {
        self.conn.execute_batch(schema::CREATE_TICKS)?;
        self.conn.execute_batch(schema::CREATE_INDEXES)?;
        Ok(())
    }

    fn insert_ticks(&self, key: &SeriesKey, side: Side, ticks: &[Tick]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(schema::INSERT_TICK)?;
            for t in ticks {
                stmt.execute(rusqlite::params![
                    key.instrument,
                    key.year,
                    side.code(),
                    t.key.timestamp_ms,
                    t.key.seq,
                    t.price_millionths,
                    t.size_billionths,
                    t.qualifies,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<SeriesKey>> {
        let mut stmt = self.conn.prepare(schema::LIST_SERIES)?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut keys = BTreeSet::new();
        for r in rows {
            let (instrument, year, code) = r?;
            Side::try_from(code)
                .with_context(|| format!("bad side code in series {}/{}", instrument, year))?;
            keys.insert(SeriesKey { instrument, year });
        }
        Ok(keys.into_iter().collect())
    }

    fn load_series(&self, key: &SeriesKey, side: Side) -> Result<TickSeries> {
        let mut stmt = self.conn.prepare_cached(schema::LOAD_SERIES)?;
        let ticks = stmt
            .query_map(
                rusqlite::params![key.instrument, key.year, side.code()],
                |row| {
                    Ok(Tick {
                        key: TimeKey::new(row.get(0)?, row.get(1)?),
                        price_millionths: row.get(2)?,
                        size_billionths: row.get(3)?,
                        qualifies: row.get(4)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        TickSeries::new(ticks).with_context(|| format!("series {} {}", key, side))
    }

    fn count_ticks(&self, key: &SeriesKey, side: Side) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            schema::COUNT_TICKS,
            rusqlite::params![key.instrument, key.year, side.code()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count)?)
    }
}
