//! Workload generator for the rowpatch update strategies.
//!
//! Seeds a target table with random records, applies a batch of updates
//! through each requested strategy, and reports insert/update throughput in
//! records per second. Table setup (DDL, optional secondary indexes) lives
//! here, not in the library: schema lifecycle is a harness concern.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rowpatch::{Record, StorageConfig, StrategyKind, TableSpec, UpdateService};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rowpatch-workload")]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(RunArgs),
}

#[derive(Parser, Debug, Clone)]
struct RunArgs {
    /// PostgreSQL connection string. Defaults to the `ROWPATCH_*`
    /// environment configuration when omitted.
    #[arg(long)]
    database_url: Option<String>,

    /// Target table name. Dropped and recreated per measurement.
    #[arg(long, default_value = "records")]
    table: String,

    /// Records seeded through the bulk insert path.
    #[arg(long, default_value_t = 200_000)]
    rows: usize,

    /// Records mutated per update call (a subset of --rows).
    #[arg(long, default_value_t = 50_000)]
    update_rows: usize,

    /// Comma-separated strategy identifiers (ONE_TRANSACTION,
    /// SEPARATE_TRANSACTION, BATCH_STATEMENT, TEMP_TABLE_JOIN).
    /// Defaults to all four.
    #[arg(long)]
    strategies: Option<String>,

    /// Repeat each measurement this many times.
    #[arg(long, default_value_t = 1)]
    runs: usize,

    /// Create secondary indexes on (data), (id, data), (data, id) for
    /// benchmark realism.
    #[arg(long, default_value_t = false)]
    with_indexes: bool,

    /// Ask the server to return generated values from the seeding insert
    /// (changes the insert statement's wire shape and cost).
    #[arg(long, default_value_t = false)]
    return_generated: bool,

    /// RNG seed for reproducible data sets.
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rowpatch=info,rowpatch_workload=info,warn")),
        )
        .init();

    let args = Args::parse();
    match args.cmd {
        Command::Run(run) => run_workload(run).await,
    }
}

struct Measurement {
    insert_rps: f64,
    update_rps: f64,
}

async fn run_workload(args: RunArgs) -> Result<()> {
    let update_rows = args.update_rows.min(args.rows);
    let strategies = parse_strategies(args.strategies.as_deref())?;

    for run in 1..=args.runs {
        let mut report = String::new();
        writeln!(report, "run={run}")?;
        writeln!(report, "total records={}", args.rows)?;
        writeln!(report, "updated records={update_rows}")?;

        for kind in &strategies {
            let measurement = measure_strategy(&args, *kind, update_rows, run as u64).await?;
            writeln!(report, "{kind}:")?;
            writeln!(report, "  insert={:.2} rps", measurement.insert_rps)?;
            writeln!(report, "  update={:.2} rps", measurement.update_rps)?;
        }
        print!("{report}");
    }
    Ok(())
}

async fn measure_strategy(
    args: &RunArgs,
    kind: StrategyKind,
    update_rows: usize,
    run: u64,
) -> Result<Measurement> {
    let client = connect(args).await?;
    setup_table(&client, &args.table, args.with_indexes).await?;

    // Re-seed per run so repeated runs see identical but fresh data.
    let mut rng = SmallRng::seed_from_u64(args.seed.wrapping_add(run));
    let records = random_records(&mut rng, args.rows);
    let updates: Vec<Record> = records[..update_rows]
        .iter()
        .map(|r| Record::new(r.key, random_value(&mut rng)))
        .collect();

    let table = TableSpec::new(args.table.clone()).context("target table name")?;
    let mut service = UpdateService::with_table(client, table);

    let insert_elapsed = {
        let started = Instant::now();
        service
            .insert_with(&records, args.return_generated)
            .await
            .with_context(|| format!("seed {} records", records.len()))?;
        started.elapsed()
    };

    let update_elapsed = {
        let started = Instant::now();
        service
            .update(kind, &updates)
            .await
            .with_context(|| format!("update via {kind}"))?;
        started.elapsed()
    };

    tracing::info!(
        strategy = %kind,
        rows = args.rows,
        update_rows,
        insert_ms = insert_elapsed.as_millis() as u64,
        update_ms = update_elapsed.as_millis() as u64,
        "measurement complete"
    );

    Ok(Measurement {
        insert_rps: rps(args.rows, insert_elapsed),
        update_rps: rps(update_rows, update_elapsed),
    })
}

async fn connect(args: &RunArgs) -> Result<tokio_postgres::Client> {
    let mut config = StorageConfig::from_env().context("resolve storage configuration")?;
    if args.database_url.is_some() {
        config.url = args.database_url.clone();
    }
    let (client, _driver) = config.connect().await.context("connect to database")?;
    Ok(client)
}

async fn setup_table(client: &tokio_postgres::Client, table: &str, with_indexes: bool) -> Result<()> {
    let mut ddl = format!(
        "DROP TABLE IF EXISTS {table}; \
         CREATE TABLE {table} (id BIGINT PRIMARY KEY, data TEXT NOT NULL);"
    );
    if with_indexes {
        write!(
            ddl,
            " CREATE INDEX {table}_data_idx ON {table} (data); \
             CREATE INDEX {table}_id_data_idx ON {table} (id, data); \
             CREATE INDEX {table}_data_id_idx ON {table} (data, id);"
        )?;
    }
    client
        .batch_execute(&ddl)
        .await
        .context("create target table")?;
    Ok(())
}

fn parse_strategies(raw: Option<&str>) -> Result<Vec<StrategyKind>> {
    let Some(raw) = raw else {
        return Ok(StrategyKind::ALL.to_vec());
    };
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<StrategyKind>()
                .with_context(|| format!("parse strategy {part:?}"))
        })
        .collect()
}

fn random_records(rng: &mut SmallRng, count: usize) -> Vec<Record> {
    let mut keys = HashSet::with_capacity(count);
    while keys.len() < count {
        keys.insert(rng.gen::<i64>());
    }
    keys.into_iter()
        .map(|key| Record::new(key, random_value(rng)))
        .collect()
}

fn random_value(rng: &mut SmallRng) -> String {
    format!("{:032x}", rng.gen::<u128>())
}

fn rps(count: usize, elapsed: Duration) -> f64 {
    count as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
}
