//! Scheme catalog CLI.
//!
//! Usage: pmsportal [--file=PATH] [--search=TEXT] [--filter=CATEGORY]
//!                  [--sort=returns|name] [--detail=N]
//!
//! Without `--file` the list is fetched from the portal's data endpoint
//! (`PORTAL_BASE_URL` / `PMS_DATA_URL`).

use anyhow::{anyhow, Result};
use serde_json::json;

use pmsportal::catalog::render::{highlights_text, modal_text, table_text};
use pmsportal::catalog::view::{SortMode, ViewState};
use pmsportal::config::Config;
use pmsportal::feed::{CatalogSource, FileCatalog, HttpCatalog};
use pmsportal::logging::{json_log, obj, v_str};
use pmsportal::viewer::{CatalogViewer, LoadOutcome};

#[derive(Debug, Default)]
struct Args {
    file: Option<String>,
    search: Option<String>,
    filter: Option<String>,
    sort: Option<SortMode>,
    detail: Option<usize>,
}

fn parse_args(raw: &[String]) -> Result<Args> {
    let mut args = Args::default();
    for arg in raw {
        if let Some(v) = arg.strip_prefix("--file=") {
            args.file = Some(v.to_string());
        } else if let Some(v) = arg.strip_prefix("--search=") {
            args.search = Some(v.to_string());
        } else if let Some(v) = arg.strip_prefix("--filter=") {
            args.filter = Some(v.to_string());
        } else if let Some(v) = arg.strip_prefix("--sort=") {
            args.sort = Some(SortMode::parse(v));
        } else if let Some(v) = arg.strip_prefix("--detail=") {
            let n: usize = v.parse().map_err(|_| anyhow!("--detail expects a row number, got {}", v))?;
            args.detail = Some(n);
        } else {
            return Err(anyhow!("unknown argument: {}", arg));
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&raw)?;
    let cfg = Config::from_env();

    let source: Box<dyn CatalogSource + Send + Sync> = match &args.file {
        Some(path) => Box::new(FileCatalog::new(path)),
        None => Box::new(HttpCatalog::from_config(&cfg)?),
    };
    json_log(
        "startup",
        obj(&[
            ("source", v_str(&source.describe())),
            ("retries", json!(cfg.catalog_retries)),
        ]),
    );

    let mut viewer = CatalogViewer::new(ViewState::new(cfg.highlight_count));
    let (outcome, initial) = viewer.load(source.as_ref()).await;

    let mut table = initial.table;
    if let Some(mode) = args.sort {
        table = viewer.set_sort(mode);
    }
    if let Some(category) = &args.filter {
        table = viewer.set_filter(category);
    }
    if let Some(text) = &args.search {
        table = viewer.search(text);
    }

    if !initial.highlights.is_empty() {
        println!("Most watched");
        println!("{}", highlights_text(&initial.highlights));
        println!();
    }
    println!("{}", table_text(&table));

    if let Some(n) = args.detail {
        // 1-based row number in the rendered table
        let index = n
            .checked_sub(1)
            .and_then(|i| table.indices().get(i).copied())
            .ok_or_else(|| anyhow!("no row {} in the current table", n))?;
        if let Some(modal) = viewer.open_detail_at(index) {
            println!();
            println!("{}", modal_text(modal));
        }
        viewer.close_detail();
    }

    match outcome {
        LoadOutcome::Loaded { .. } => Ok(()),
        LoadOutcome::Failed(err) => Err(anyhow!("could not load schemes: {}", err)),
    }
}
