//! Show command implementation.

use crate::cli::{format_seconds, Output};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the show command.
pub async fn run_show(video_id: u32, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let details = orchestrator.video_details(video_id, None)?;
    let video = details.video;

    Output::header(&video.title);
    Output::kv("Id", &video.id.to_string());
    Output::kv("URL", &video.url);
    if let Some(date) = &video.upload_date {
        Output::kv("Uploaded", date);
    }
    if let Some(duration) = video.duration_seconds {
        Output::kv("Duration", &format_seconds(duration));
    }
    if !video.tags.is_empty() {
        Output::kv("Tags", &video.tags.join(", "));
    }
    Output::kv("Transcript", if video.transcription.is_some() { "yes" } else { "no" });
    Output::kv("Indexed", if video.indexed { "yes" } else { "no" });
    Output::kv("Imported", &video.created_at.format("%Y-%m-%d %H:%M").to_string());

    let chapters = orchestrator.chapters(video_id).await?;
    if !chapters.is_empty() {
        Output::header("Chapters");
        for chapter in &chapters {
            Output::list_item(&format!("{} {}", chapter.timestamp, chapter.title));
        }
    }

    if let Some(summary) = video.summary.as_deref() {
        Output::header("Summary");
        println!("{}", summary.trim());
    }

    if let Some(description) = video.description.as_deref().filter(|d| !d.trim().is_empty()) {
        Output::header("Description");
        println!("{}", description.trim());
    }

    Ok(())
}
