//! Scale scenario for the set-based strategy.
//!
//! Ignored by default: it needs a real database and a few hundred thousand
//! rows. Run explicitly with
//! `cargo test -p rowpatch --test throughput -- --ignored`.

mod common;

use std::collections::HashSet;
use std::time::Instant;

use anyhow::Result;
use common::TestContext;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rowpatch::{Record, StrategyKind};

fn env_count(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

/// Unique random keys paired with random hex values, the shape a real key
/// space has (no sequential locality).
fn random_records(rng: &mut SmallRng, count: usize) -> Vec<Record> {
    let mut keys = HashSet::with_capacity(count);
    while keys.len() < count {
        keys.insert(rng.gen::<i64>());
    }
    keys.into_iter()
        .map(|key| Record::new(key, format!("{:032x}", rng.gen::<u128>())))
        .collect()
}

#[tokio::test]
#[ignore = "throughput run against a real database; sizes via ROWPATCH_BENCH_ROWS / ROWPATCH_BENCH_UPDATE_ROWS"]
async fn temp_table_join_at_scale() -> Result<()> {
    let rows = env_count("ROWPATCH_BENCH_ROWS", 200_000);
    let update_rows = env_count("ROWPATCH_BENCH_UPDATE_ROWS", 50_000).min(rows);

    let Some(mut ctx) = TestContext::start("throughput_temp_table").await? else {
        return Ok(());
    };

    let mut rng = SmallRng::seed_from_u64(0x5eed);
    let records = random_records(&mut rng, rows);
    let updates: Vec<Record> = records[..update_rows]
        .iter()
        .map(|r| Record::new(r.key, format!("{:032x}", rng.gen::<u128>())))
        .collect();

    let started = Instant::now();
    ctx.service.insert(&records).await?;
    let insert_elapsed = started.elapsed();

    let started = Instant::now();
    ctx.service
        .update(StrategyKind::TempTableJoin, &updates)
        .await?;
    let update_elapsed = started.elapsed();

    println!(
        "rows={rows} update_rows={update_rows} insert={:.2} rps update={:.2} rps",
        rows as f64 / insert_elapsed.as_secs_f64(),
        update_rows as f64 / update_elapsed.as_secs_f64(),
    );

    // Full read-back: every updated key carries its new value, every other
    // key its seeded value.
    let state = ctx.read_all().await?;
    assert_eq!(state.len(), rows);
    for record in &updates {
        assert_eq!(state[&record.key], record.value);
    }
    for record in &records[update_rows..] {
        assert_eq!(state[&record.key], record.value);
    }
    Ok(())
}
