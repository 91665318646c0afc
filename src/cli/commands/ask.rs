//! Ask command implementation.

use crate::cli::delivery::{Deliverables, Delivery, DeliveryOptions};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, QueryResult};
use crate::summarizer::AudienceTier;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Longest the CLI waits for a background video summary before exiting.
const ENRICHMENT_WAIT: Duration = Duration::from_secs(600);

#[derive(Serialize)]
struct AskOutput<'a> {
    #[serde(flatten)]
    result: &'a QueryResult,
    #[serde(flatten)]
    extras: &'a Deliverables,
}

/// Run the ask command.
pub async fn run_ask(
    query: &str,
    tier: &str,
    options: DeliveryOptions,
    json: bool,
    no_wait: bool,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'vett doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::from_settings(&settings)?;
    let delivery = Delivery::from_settings(&settings, &orchestrator.summarizer());
    let tier = AudienceTier::from_label(tier);

    let spinner = (!json).then(|| Output::spinner("Thinking..."));
    let answered = orchestrator.answer(query, tier).await;
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }

    let result = match answered {
        Ok(result) => result,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    let extras = delivery.deliver(&result.summary, &result.query, &options).await;

    if json {
        let out = AskOutput {
            result: &result,
            extras: &extras,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_answer(&result, &extras);
    }

    if !no_wait && orchestrator.tasks().in_flight() > 0 {
        let spinner = (!json).then(|| Output::spinner("Summarizing the suggested video..."));
        let finished = orchestrator.tasks().drain(ENRICHMENT_WAIT).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        if !json {
            let message = enrichment_report(finished, &settings.video_summary_dir());
            if finished {
                Output::success(&message);
            } else {
                Output::warning(&message);
            }
        }
    }

    Ok(())
}

/// The drain only says the tasks ended, not whether a summary was written.
fn enrichment_report(finished: bool, summary_dir: &Path) -> String {
    if finished {
        format!(
            "Background video processing finished. Video summaries are kept in {}",
            summary_dir.display()
        )
    } else {
        "Gave up waiting for background video processing.".to_string()
    }
}

fn print_answer(result: &QueryResult, extras: &Deliverables) {
    Output::query_result(result);

    if let Some(translated) = &extras.translated_summary {
        Output::header("Translation");
        println!("\n{}", translated);
    }

    if extras.audio_path.is_some() || extras.audio_error.is_some() || extras.summary_path.is_some()
    {
        println!();
    }
    if let Some(path) = &extras.audio_path {
        Output::success(&format!("Audio saved to {}", path.display()));
    }
    if let Some(err) = &extras.audio_error {
        Output::warning(err);
    }
    if let Some(path) = &extras.summary_path {
        Output::success(&format!("Summary saved to {}", path.display()));
    }
}
