//! CLI Scan Commands
//!
//! `analyze` scores a single still; `replay` drives a full scan session over
//! a directory of frames, standing in for the live camera.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use ticketscan_capture::{
    analyze_image, run_scan, CaptureWorkflow, DirectorySource, Frame, ScanEvent, ScanOptions,
    ScannerConfig, StopReason,
};
use ticketscan_core::parse_lookup_date;
use ticketscan_draws::{fetch_for_date, SazkaClient};

use crate::config::AppConfig;
use crate::extract_cmd::extract_ticket;
use crate::terminal_output::{
    format_analysis, format_draw, format_feedback, format_ticket, note_error, note_info,
    note_success, note_warn,
};

pub fn analyze(image: &Path) -> Result<()> {
    let analysis = analyze_image(image, &ScannerConfig::default())
        .with_context(|| format!("failed to analyse {}", image.display()))?;
    print!("{}", format_analysis(&analysis));
    Ok(())
}

pub struct ReplayArgs {
    pub dir: PathBuf,
    pub fps: u32,
    pub auto_capture: bool,
    pub save: Option<PathBuf>,
    pub extract: bool,
    pub lookup: bool,
}

pub fn frame_interval(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(fps.max(1)))
}

pub async fn replay(config: &AppConfig, args: ReplayArgs) -> Result<()> {
    let extract = args.extract || args.lookup;
    // Fail on a missing key before the scan starts, not after the capture.
    let vision = if extract { Some(config.vision()?) } else { None };

    let options = ScanOptions {
        config: ScannerConfig::default(),
        auto_capture: args.auto_capture,
        frame_interval: frame_interval(args.fps),
    };
    let source = DirectorySource::new(&args.dir);
    let (handle, mut events) = run_scan(source, options)
        .await
        .context("Unable to access camera")?;
    note_info(&format!("Scan session {} started", handle.session_id()));

    let captured = loop {
        match events.recv().await {
            Some(ScanEvent::Feedback(feedback)) => println!("{}", format_feedback(&feedback)),
            Some(ScanEvent::Captured { trigger, frame }) => break Some((trigger, frame)),
            Some(ScanEvent::Stopped(reason)) => {
                if reason == StopReason::SourceEnded {
                    note_warn("Frames ran out before a capture");
                } else {
                    note_warn(&format!("Scan stopped: {reason:?}"));
                }
                break None;
            }
            None => break None,
        }
    };
    handle.stop().await;

    let Some((trigger, frame)) = captured else {
        return Ok(());
    };
    note_success(&format!(
        "Captured ({trigger:?}) {}x{} frame",
        frame.width(),
        frame.height()
    ));

    if let Some(path) = &args.save {
        save_frame(&frame, path).await?;
        note_info(&format!("Saved capture to {}", path.display()));
    }

    let Some(vision) = vision else {
        return Ok(());
    };

    let mut workflow = CaptureWorkflow::new();
    let token = workflow.begin_upload();
    let png = frame.encode_png()?;
    let result = extract_ticket(&vision, &png, "image/png")
        .await
        .map_err(|e| format!("{e:#}"));
    workflow.apply_extraction(token, result);

    if let Some(err) = workflow.error() {
        note_error(err);
        return Ok(());
    }
    if let Some(ticket) = workflow.ticket() {
        print!("{}", format_ticket(ticket));
    }

    if !args.lookup {
        return Ok(());
    }
    let Some(request) = workflow.begin_lookup() else {
        return Ok(());
    };
    let client = SazkaClient::new(&config.draw_results_base_url);
    let result = match parse_lookup_date(&request.date) {
        Ok(date) => fetch_for_date(&client, date)
            .await
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    let draw_id = result.as_ref().ok().map(|(id, _)| id.clone());
    workflow.apply_lookup(request.token, result.map(|(_, draw)| draw));

    match (workflow.draw(), draw_id) {
        (Some(draw), Some(id)) => print!("{}", format_draw(&id, draw)),
        _ => {
            if let Some(err) = workflow.lookup_error() {
                note_error(err);
            }
        }
    }
    Ok(())
}

async fn save_frame(frame: &Frame, path: &Path) -> Result<()> {
    let png = frame.encode_png()?;
    tokio::fs::write(path, png)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}
