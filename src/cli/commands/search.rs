//! Search command implementation.

use crate::cli::{format_seconds, Output};
use crate::config::Settings;
use crate::error::VidseekError;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, json: bool, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Searching...");
    let result = orchestrator.search(query).await;
    spinner.finish_and_clear();

    let result = match result {
        Ok(result) => result,
        Err(VidseekError::IndexEmpty(_)) => {
            Output::warning("Nothing is indexed yet. Run 'vidseek index --all' first.");
            return Ok(());
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let details = orchestrator.video_details(result.video_id, result.chapter_id)?;
    Output::search_result(
        &details.video.title,
        details.chapter.as_ref().map(|c| c.title.as_str()),
        &format_seconds(result.start_seconds),
        &result.chunk_text,
        &result.video_reference_url,
    );

    if !details.video.tags.is_empty() {
        Output::kv("Tags", &details.video.tags.join(", "));
    }
    if let Some(date) = &details.video.upload_date {
        Output::kv("Uploaded", date);
    }

    Ok(())
}
