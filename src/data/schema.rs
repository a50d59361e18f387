/// DDL for the tick snapshot database.

pub const CREATE_TICKS: &str = "
CREATE TABLE IF NOT EXISTS pov_ticks (
    instrument       TEXT NOT NULL,
    year             TEXT NOT NULL,
    side             INTEGER NOT NULL,
    timestamp_ms     INTEGER NOT NULL,
    seq              INTEGER NOT NULL,
    price_millionths INTEGER NOT NULL,
    size_billionths  INTEGER NOT NULL,
    qualifies        INTEGER NOT NULL,
    PRIMARY KEY (instrument, year, side, timestamp_ms, seq)
);
";

pub const CREATE_INDEXES: &str = "
CREATE INDEX IF NOT EXISTS idx_pov_ticks_series ON pov_ticks(instrument, year);
";

pub const INSERT_TICK: &str = "
INSERT OR REPLACE INTO pov_ticks
    (instrument, year, side, timestamp_ms, seq, price_millionths, size_billionths, qualifies)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
";

/// Distinct (instrument, year, side) combinations present in the snapshot.
pub const LIST_SERIES: &str = "
SELECT DISTINCT instrument, year, side
FROM pov_ticks
ORDER BY instrument, year, side
";

/// Load one side of one series in key order.
pub const LOAD_SERIES: &str = "
SELECT timestamp_ms, seq, price_millionths, size_billionths, qualifies
FROM pov_ticks
WHERE instrument = ?1 AND year = ?2 AND side = ?3
ORDER BY timestamp_ms, seq
";

/// Number of ticks on one side of one series.
pub const COUNT_TICKS: &str = "
SELECT COUNT(*)
FROM pov_ticks
WHERE instrument = ?1 AND year = ?2 AND side = ?3
";
