//! Validate command handler

use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use linguabase_core::{build_report, DocumentStore, ValidationReport};
use tracing::{info, instrument, warn};

/// Handle the validate command
#[instrument(skip_all, fields(detailed = args.detailed))]
pub async fn handle_validate(
    args: ValidateArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let mut store_config = config.data.clone();
    if let Some(dir) = args.data_dir {
        store_config.data_dir = dir;
    }
    output.info(&format!("Checking documents in {}", store_config.data_dir.display()))?;

    let report = run_report(DocumentStore::new(store_config)).await;
    output.report(&report, args.detailed)?;

    if report.is_healthy() {
        info!("all documents valid");
        Ok(())
    } else {
        let invalid = report.invalid_count();
        warn!(invalid, "validation report has invalid documents");
        Err(Error::Unhealthy { invalid })
    }
}

async fn run_report(store: DocumentStore) -> ValidationReport {
    let data_dir = store.config().data_dir.display().to_string();
    let _timer = Timer::with_details("validation_report", &data_dir);
    build_report(&store).await
}
