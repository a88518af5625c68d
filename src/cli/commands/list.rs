//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let videos = orchestrator.list_videos()?;

    if videos.is_empty() {
        Output::info("No videos imported yet. Use 'vidseek import <url>' to add one.");
        return Ok(());
    }

    Output::header(&format!("Videos ({})", videos.len()));
    println!();

    for video in &videos {
        let status = match (video.indexed, video.has_transcript) {
            (true, _) => "indexed",
            (false, true) => "pending",
            (false, false) => "no transcript",
        };
        Output::video_row(video.id, &video.title, video.chunk_count, status);
    }

    let total_chunks: u32 = videos.iter().map(|v| v.chunk_count).sum();
    let pending = videos.iter().filter(|v| !v.indexed && v.has_transcript).count();
    println!();
    Output::kv("Total videos", &videos.len().to_string());
    Output::kv("Total chunks", &total_chunks.to_string());
    Output::kv("Pending", &pending.to_string());

    Ok(())
}
