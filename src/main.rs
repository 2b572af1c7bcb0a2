use std::path::PathBuf;

use flowribs::config::{Params, Preset};
use flowribs::error::RibError;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Params(#[from] RibError),
    #[error("unknown preset `{0}` (expected one of: clean-dunes, gallery-flow, carved-terrain)")]
    UnknownPreset(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let seed: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(12345);
    let rib_count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(30);
    let out_dir: PathBuf = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("artifacts"));
    let preset = match args.get(4) {
        Some(name) => Some(
            Preset::from_name(name).ok_or_else(|| CliError::UnknownPreset(name.clone()))?,
        ),
        None => None,
    };

    std::fs::create_dir_all(&out_dir)?;

    let mut params = Params {
        seed,
        rib_count,
        ..Params::default()
    };
    if let Some(preset) = preset {
        params = preset.apply(params);
    }
    if let Ok(centers) = std::env::var("FLOWRIBS_TAB_CENTERS") {
        params.tabs.centers = flowribs::config::parse_tab_centers(&centers)?;
    }

    info!(
        seed,
        rib_count,
        preset = preset.map(Preset::label),
        "generating ribs"
    );

    let run = flowribs::generate(&params)?;

    for t in &run.timings {
        info!("  {:20} {:8.1} ms", t.name, t.ms);
    }
    if !run.failures.is_empty() {
        warn!(
            "{} of {} ribs failed; see `failures` in the output",
            run.failures.len(),
            run.params.rib_count
        );
    }

    let path = out_dir.join("ribs.json");
    let file = std::fs::File::create(&path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &run)?;
    info!(
        "saved {} ribs ({} failed) to {}",
        run.ribs.len(),
        run.failures.len(),
        path.display()
    );

    Ok(())
}
