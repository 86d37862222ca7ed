use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection};
use tracing::info;

use crate::error::PipelineError;
use crate::parser::clean::StadiumRecord;

pub fn connect(path: &Path) -> Result<Connection, PipelineError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<(), PipelineError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS stadiums (
            rank             TEXT,
            stadium          TEXT,
            seating_capacity TEXT,
            region           TEXT,
            country          TEXT,
            city             TEXT,
            image_link       TEXT,
            home_team        TEXT
        );
        ",
    )?;
    Ok(())
}

// ── Loading ──

const INSERT_COLUMNS: usize = 8;
/// SQLite's default host-parameter limit caps how many rows fit in one statement.
const MAX_BATCH_ROWS: usize = 32766 / INSERT_COLUMNS;

/// Replace the table contents with `records`, one multi-row INSERT per
/// `batch_size` rows. One transaction: a failed load leaves the previous
/// snapshot in place.
pub fn replace_stadiums(
    conn: &Connection,
    records: &[StadiumRecord],
    batch_size: usize,
) -> Result<usize, PipelineError> {
    let batch_size = batch_size.clamp(1, MAX_BATCH_ROWS);
    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} rows")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let tx = conn.unchecked_transaction()?;
    let cleared = tx.execute("DELETE FROM stadiums", [])?;
    if cleared > 0 {
        info!("Cleared {} rows from previous load", cleared);
    }

    let mut count = 0;
    let mut batches = 0;
    for batch in records.chunks(batch_size) {
        // Full batches share one cached statement; only the tail needs its own.
        let mut stmt = tx.prepare_cached(&insert_sql(batch.len()))?;
        count += stmt.execute(params_from_iter(batch.iter().flat_map(StadiumRecord::fields)))?;
        batches += 1;
        pb.inc(batch.len() as u64);
    }
    tx.commit()?;

    pb.finish_and_clear();
    info!("Loaded {} rows into stadiums in {} batches", count, batches);
    Ok(count)
}

fn insert_sql(rows: usize) -> String {
    let tuple = format!("({})", vec!["?"; INSERT_COLUMNS].join(", "));
    format!(
        "INSERT INTO stadiums
         (rank, stadium, seating_capacity, region, country, city, image_link, home_team)
         VALUES {}",
        vec![tuple.as_str(); rows].join(", ")
    )
}

// ── Queries ──

/// A query result set, every value rendered as text.
#[derive(Debug, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn run_query(conn: &Connection, sql: &str) -> Result<QueryResult, PipelineError> {
    let sql = sql.trim().trim_end_matches(';');
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();

    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|i| row.get_ref(i).map(render_value))
                .collect::<Result<Vec<_>, _>>()
        })?
        .collect::<Result<Vec<_>, _>>()?;

    info!("Query returned {} rows", rows.len());
    Ok(QueryResult { columns, rows })
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    }
}

// ── Stats ──

pub struct Stats {
    pub total: usize,
    pub countries: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats, PipelineError> {
    let total: usize = conn.query_row("SELECT COUNT(*) FROM stadiums", [], |r| r.get(0))?;
    let countries: usize = conn.query_row(
        "SELECT COUNT(DISTINCT country) FROM stadiums",
        [],
        |r| r.get(0),
    )?;
    Ok(Stats { total, countries })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rank: &str, stadium: &str, capacity: &str, country: &str) -> StadiumRecord {
        StadiumRecord {
            rank: rank.into(),
            stadium: stadium.into(),
            seating_capacity: capacity.into(),
            region: "Europe".into(),
            country: country.into(),
            city: "City".into(),
            image_link: "https://en.wikipedia.org/wiki/File:X.jpg".into(),
            home_team: "Team".into(),
        }
    }

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = memory_db();
        init_schema(&conn).unwrap();
    }

    #[test]
    fn load_in_small_batches() {
        let conn = memory_db();
        let records: Vec<_> = (1..=5)
            .map(|i| record(&i.to_string(), "S", "1,000", "Spain"))
            .collect();
        assert_eq!(replace_stadiums(&conn, &records, 2).unwrap(), 5);
        assert_eq!(get_stats(&conn).unwrap().total, 5);

        let ranks: Vec<String> = conn
            .prepare("SELECT rank FROM stadiums ORDER BY rowid")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(ranks, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn one_statement_per_batch() {
        let sql = insert_sql(3);
        assert_eq!(sql.matches("(?, ?, ?, ?, ?, ?, ?, ?)").count(), 3);
        assert_eq!(sql.matches('?').count(), 3 * INSERT_COLUMNS);
    }

    #[test]
    fn oversized_batch_is_capped() {
        let conn = memory_db();
        let records: Vec<_> = (0..MAX_BATCH_ROWS + 3)
            .map(|i| record(&i.to_string(), "S", "1", "Spain"))
            .collect();
        assert_eq!(replace_stadiums(&conn, &records, usize::MAX).unwrap(), records.len());
        assert_eq!(replace_stadiums(&conn, &records[..2], 0).unwrap(), 2);
    }

    #[test]
    fn reload_replaces_previous_snapshot() {
        let conn = memory_db();
        let first = vec![record("1", "A", "1", "Spain"), record("2", "B", "1", "Italy")];
        replace_stadiums(&conn, &first, 1000).unwrap();
        replace_stadiums(&conn, &first[..1], 1000).unwrap();

        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.countries, 1);
    }

    #[test]
    fn query_values_rendered_as_text() {
        let conn = memory_db();
        let records = vec![
            record("1", "Camp Nou", "99,354", "Spain"),
            record("2", "Wembley", "90,000", "England"),
        ];
        replace_stadiums(&conn, &records, 1000).unwrap();

        let result = run_query(
            &conn,
            "SELECT stadium, CAST(REPLACE(seating_capacity, ',', '') AS INTEGER), NULL
             FROM stadiums ORDER BY 2 DESC;\n",
        )
        .unwrap();
        assert_eq!(result.columns.len(), 3);
        assert_eq!(result.rows[0], vec!["Camp Nou", "99354", ""]);
        assert_eq!(result.rows[1][0], "Wembley");
    }

    #[test]
    fn bad_sql_is_an_error() {
        let conn = memory_db();
        assert!(matches!(
            run_query(&conn, "SELECT nope FROM nowhere"),
            Err(PipelineError::Database(_))
        ));
    }
}
