use anyhow::Result;
use rusqlite::Connection;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use stock_etl::pipeline::{extract, parse_cutoff, transform, RecordingObserver};
use stock_etl::{EtlConfig, EtlError, Pipeline, RunState, Value};
use tempfile::{tempdir, TempDir};

const FIVE_DAYS: &str = "\
Date,Symbol,Open,Close,Adj Close
2023-01-01,AAA,9.5,10.0,10.0
2023-01-02,AAA,10.0,10.5,10.5
2023-01-03,AAA,10.5,11.0,11.0
2023-01-04,AAA,11.0,11.5,11.5
2023-01-05,AAA,11.5,12.0,12.0
";

fn write_csv(dir: &TempDir, contents: &str) -> Result<PathBuf> {
    let path = dir.path().join("sp500.csv");
    fs::write(&path, contents)?;
    Ok(path)
}

fn config(csv_path: PathBuf, db_path: &Path) -> EtlConfig {
    EtlConfig {
        csv_path,
        database_uri: format!("sqlite:///{}", db_path.display()),
        default_cutoff: Some("2023-01-03".to_string()),
        table_name: "stocks".to_string(),
        log_dir: PathBuf::from("."),
    }
}

fn count_rows(db_path: &Path, table: &str) -> Result<i64> {
    let conn = Connection::open(db_path)?;
    Ok(conn.query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |r| r.get(0))?)
}

#[test]
fn test_cutoff_keeps_only_earlier_rows() -> Result<()> {
    let dir = tempdir()?;
    let csv_path = write_csv(&dir, FIVE_DAYS)?;
    let db_path = dir.path().join("etl.db");

    let report = Pipeline::new(config(csv_path, &db_path)).run("2023-01-03");
    assert!(report.is_success(), "run failed: {:?}", report.error());
    assert_eq!(report.rows_loaded(), 2);

    let conn = Connection::open(&db_path)?;
    let mut stmt = conn.prepare("SELECT date FROM stocks ORDER BY date")?;
    let dates: Vec<String> = stmt
        .query_map([], |r| r.get(0))?
        .collect::<rusqlite::Result<_>>()?;
    assert_eq!(dates, vec!["2023-01-01 00:00:00", "2023-01-02 00:00:00"]);
    Ok(())
}

#[test]
fn test_loaded_columns_are_normalized() -> Result<()> {
    let dir = tempdir()?;
    let csv_path = write_csv(&dir, FIVE_DAYS)?;
    let db_path = dir.path().join("etl.db");

    Pipeline::new(config(csv_path, &db_path)).run("2023-01-03");

    let conn = Connection::open(&db_path)?;
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('stocks')")?;
    let columns: Vec<String> = stmt
        .query_map([], |r| r.get(0))?
        .collect::<rusqlite::Result<_>>()?;
    assert_eq!(columns, vec!["date", "symbol", "open", "close", "adj_close"]);
    Ok(())
}

#[test]
fn test_duplicate_key_keeps_first_seen() -> Result<()> {
    let dir = tempdir()?;
    let csv_path = write_csv(
        &dir,
        "Date,Symbol,Close\n2023-01-01,AAA,10.0\n2023-01-01,AAA,20.0\n2023-01-01,BBB,30.0\n",
    )?;
    let db_path = dir.path().join("etl.db");

    let report = Pipeline::new(config(csv_path, &db_path)).run("2023-02-01");
    assert_eq!(report.rows_loaded(), 2);

    let conn = Connection::open(&db_path)?;
    let close: f64 = conn.query_row(
        "SELECT close FROM stocks WHERE symbol = 'AAA'",
        [],
        |r| r.get(0),
    )?;
    assert_eq!(close, 10.0);
    Ok(())
}

#[test]
fn test_row_missing_close_is_dropped() -> Result<()> {
    let dir = tempdir()?;
    let csv_path = write_csv(
        &dir,
        "Date,Symbol,Close\n2023-01-01,AAA,10.0\n2023-01-01,BBB,\n2023-01-02,CCC,12.0\n",
    )?;
    let db_path = dir.path().join("etl.db");

    let report = Pipeline::new(config(csv_path, &db_path)).run("2023-02-01");
    assert_eq!(report.rows_loaded(), 2);

    let conn = Connection::open(&db_path)?;
    let mut stmt = conn.prepare("SELECT symbol FROM stocks ORDER BY symbol")?;
    let symbols: Vec<String> = stmt
        .query_map([], |r| r.get(0))?
        .collect::<rusqlite::Result<_>>()?;
    assert_eq!(symbols, vec!["AAA", "CCC"]);
    Ok(())
}

#[test]
fn test_unreadable_source_never_reaches_later_stages() -> Result<()> {
    let dir = tempdir()?;
    let db_path = dir.path().join("etl.db");
    let mut pipeline = Pipeline::with_observer(
        config(dir.path().join("missing.csv"), &db_path),
        RecordingObserver::default(),
    );

    let report = pipeline.run("2023-01-03");

    assert!(matches!(report.error(), Some(EtlError::Extraction(_))));
    assert!(!report.states.contains(&RunState::Extracted));
    assert!(!report.states.contains(&RunState::Transformed));
    assert_eq!(report.states.last(), Some(&RunState::Finished));
    assert!(pipeline.observer().finished);
    assert!(!db_path.exists());
    Ok(())
}

#[test]
fn test_repeated_runs_append() -> Result<()> {
    let dir = tempdir()?;
    let csv_path = write_csv(&dir, FIVE_DAYS)?;
    let db_path = dir.path().join("etl.db");
    let mut pipeline = Pipeline::new(config(csv_path, &db_path));

    assert_eq!(pipeline.run("2023-01-04").rows_loaded(), 3);
    assert_eq!(count_rows(&db_path, "stocks")?, 3);

    assert_eq!(pipeline.run("2023-01-04").rows_loaded(), 3);
    assert_eq!(count_rows(&db_path, "stocks")?, 6);
    Ok(())
}

#[test]
fn test_custom_table_name() -> Result<()> {
    let dir = tempdir()?;
    let csv_path = write_csv(&dir, FIVE_DAYS)?;
    let db_path = dir.path().join("etl.db");
    let config = config(csv_path, &db_path).with_table_name("daily prices")?;

    let report = Pipeline::new(config).run("2023-01-06");
    assert_eq!(report.rows_loaded(), 5);
    assert_eq!(count_rows(&db_path, "daily prices")?, 5);
    Ok(())
}

#[test]
fn test_stage_invariants_hold() -> Result<()> {
    let dir = tempdir()?;
    let csv_path = write_csv(
        &dir,
        "\
Date, Symbol ,Close,Trade Count
2023-03-01,AAA,1.0,5
2023-03-01,AAA,1.1,6
2023-03-02,,1.2,7
2023-03-02,BBB,NA,8
2023-03-03,BBB,1.3,9
2023-03-04,CCC,1.4,10
2023-02-28 15:30:00,CCC,1.5,11
",
    )?;
    let cutoff = parse_cutoff("2023-03-04")?;
    let cutoff_ts = cutoff.and_hms_opt(0, 0, 0).unwrap();

    let extracted = extract(&csv_path, cutoff)?;
    assert!(extracted
        .column_values("Date")
        .unwrap()
        .all(|v| matches!(v, Value::Timestamp(ts) if *ts < cutoff_ts)));
    assert_eq!(extracted.len(), 6);

    let cleaned = transform(extracted)?;
    assert!(cleaned
        .column_names()
        .all(|n| !n.contains(' ') && n == n.to_lowercase()));
    for name in ["symbol", "date", "close"] {
        assert!(cleaned.column_values(name).unwrap().all(|v| !v.is_null()));
    }

    let keys: HashSet<(String, String)> = cleaned
        .rows
        .iter()
        .map(|r| (r[1].to_string(), r[0].to_string()))
        .collect();
    assert_eq!(keys.len(), cleaned.len());
    assert_eq!(cleaned.len(), 3);
    Ok(())
}
