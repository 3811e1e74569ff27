use anyhow::Result;
use bridgelift_core::{
    Config, CycleOptions, JsonStore, LiftSource, RunLock, TowerBridgeSource, run_cycle,
};
use owo_colors::OwoColorize;

use super::create_spinner;
use crate::render::{ReconciliationRender, Render};

pub async fn run(config: &Config, dry_run: bool, verbose: bool) -> Result<()> {
    let data_path = config.data_path();
    let _lock = RunLock::acquire(&data_path)?;

    let store = JsonStore::new(&data_path);
    let fetch_timeout = config.fetch_timeout()?;
    let source = TowerBridgeSource::new(&config.source_url, fetch_timeout)?;
    let options = CycleOptions {
        fetch_timeout,
        dry_run,
    };
    let now = config.now()?;

    let spinner = create_spinner(format!("Fetching {}", source.name()));
    let result = run_cycle(&store, &source, now, &options).await;
    spinner.finish_and_clear();

    let (plan, summary) = result?;

    println!("🌉 {}", store.path().display());
    println!("{}", plan.reconciliation.render(verbose));

    if !plan.malformed.is_empty() {
        println!();
        println!("   {}", "Skipped rows:".yellow());
        for row in &plan.malformed {
            println!("{}", row.render());
        }
    }

    println!();
    if dry_run {
        println!("{} {}", "Dry run:".dimmed(), summary.render());
    } else {
        println!("{}", summary.render());
    }

    Ok(())
}
