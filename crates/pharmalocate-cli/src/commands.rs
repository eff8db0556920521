//! Subcommand handlers.
//!
//! Each handler drives one orchestrator flow, then prints the resulting
//! snapshot. Messages the flow leaves in `state.error` become the command's
//! error in text mode; `--json` prints the snapshot as-is.

use std::path::Path;

use pharmalocate_core::SearchState;
use pharmalocate_search::{SearchOrchestrator, StaticGeoProvider};

use crate::render;

type Orchestrator = SearchOrchestrator<StaticGeoProvider>;

/// Run a search and print the results.
///
/// With `with_hours`, hours are looked up for every result concurrently
/// before printing.
pub(crate) async fn run_search(
    orchestrator: &Orchestrator,
    query: &str,
    with_hours: bool,
    json: bool,
) -> anyhow::Result<()> {
    orchestrator.set_query(query).await;
    orchestrator.search(None).await?;

    if with_hours {
        let ids: Vec<String> = orchestrator
            .snapshot()
            .await
            .results
            .into_iter()
            .map(|r| r.id)
            .collect();
        let lookups = ids.iter().map(|id| orchestrator.check_hours(id));
        for outcome in futures::future::join_all(lookups).await {
            outcome?;
        }
    }

    emit(&orchestrator.snapshot().await, json)
}

/// Search by the postal code of the configured device position.
pub(crate) async fn run_pincode(orchestrator: &Orchestrator, json: bool) -> anyhow::Result<()> {
    orchestrator.use_current_pincode().await?;
    emit(&orchestrator.snapshot().await, json)
}

/// Search for `pharmacy`, then assess `medicine` stock at the top result.
///
/// # Errors
///
/// Returns an error if the search fails or matches nothing.
pub(crate) async fn run_stock(
    orchestrator: &Orchestrator,
    pharmacy: &str,
    medicine: &str,
) -> anyhow::Result<()> {
    orchestrator.search(Some(pharmacy)).await?;
    let state = orchestrator.snapshot().await;
    fail_on_error(&state)?;

    let top = state
        .results
        .first()
        .ok_or_else(|| anyhow::anyhow!("no pharmacy matched '{pharmacy}'"))?;
    orchestrator.open_stock_check(&top.id).await?;
    let answer = orchestrator.check_stock(&top.id, medicine).await?;

    println!("{} ({})", top.name, top.maps_uri);
    println!("{}: {answer}", medicine.trim());
    Ok(())
}

/// Analyze a prescription image, optionally searching for stockists.
pub(crate) async fn run_scan(
    orchestrator: &Orchestrator,
    image: &Path,
    search: bool,
    json: bool,
) -> anyhow::Result<()> {
    orchestrator.analyze_image_file(image).await?;
    let state = orchestrator.snapshot().await;
    if let Some(err) = &state.prescription.error {
        anyhow::bail!("{err}");
    }

    if !search {
        if json {
            println!("{}", serde_json::to_string_pretty(&state.prescription)?);
        } else {
            println!("Detected: {}", state.prescription.medicines);
        }
        return Ok(());
    }

    if !json {
        println!("Detected: {}", state.prescription.medicines);
        println!();
    }
    orchestrator.search_prescription().await?;
    emit(&orchestrator.snapshot().await, json)
}

fn emit(state: &SearchState, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
        return Ok(());
    }
    fail_on_error(state)?;
    render::print_results(state);
    Ok(())
}

fn fail_on_error(state: &SearchState) -> anyhow::Result<()> {
    match &state.error {
        Some(err) => anyhow::bail!("{err}"),
        None => Ok(()),
    }
}
