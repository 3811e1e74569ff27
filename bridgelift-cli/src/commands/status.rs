use anyhow::Result;
use bridgelift_core::{
    Config, CycleOptions, JsonStore, LiftSource, LiftStore, TowerBridgeSource, plan_cycle,
};
use owo_colors::OwoColorize;

use super::create_spinner;
use crate::render::{ReconciliationRender, Render};

pub async fn run(config: &Config, verbose: bool) -> Result<()> {
    let store = JsonStore::new(config.data_path());
    let dataset = store.load()?;
    let now = config.now()?;

    println!("🌉 {}", store.path().display());
    println!(
        "   {} lifts stored, {} upcoming",
        dataset.len(),
        dataset.upcoming(now).len()
    );
    if let Some(next) = dataset.upcoming(now).first() {
        println!("   Next: {}", next.render());
    }
    println!();

    let fetch_timeout = config.fetch_timeout()?;
    let source = TowerBridgeSource::new(&config.source_url, fetch_timeout)?;
    let options = CycleOptions {
        fetch_timeout,
        dry_run: true,
    };

    let spinner = create_spinner(format!("Fetching {}", source.name()));
    let result = plan_cycle(&store, &source, now, &options).await;
    spinner.finish_and_clear();

    println!("{}", source.name());
    match result {
        Ok(plan) => {
            println!("{}", plan.reconciliation.render(verbose));
            for row in &plan.malformed {
                println!("{}", row.render());
            }
        }
        Err(e) => println!("   {}", e.to_string().red()),
    }

    Ok(())
}
