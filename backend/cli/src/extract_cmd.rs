//! CLI Extract Command
//!
//! Sends one ticket photo through the vision model and the normalizer.

use std::path::Path;

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use logging::{EventLogger, TicketEvent};
use ticketscan_core::{ExtractedTicket, VisionModel};
use ticketscan_understanding::{normalize, TICKET_PROMPT};

use crate::config::AppConfig;
use crate::mime_detect::{detect_mime_type, is_image};
use crate::terminal_output::{format_ticket, note_error};

/// Run the extraction pipeline on raw image bytes.
pub async fn extract_ticket(
    vision: &dyn VisionModel,
    image: &[u8],
    mime: &str,
) -> Result<ExtractedTicket> {
    let request_id = Uuid::new_v4().to_string();
    let raw = vision
        .extract_text(image, mime, TICKET_PROMPT)
        .await
        .context("Error processing image")?;

    match normalize(&raw) {
        Ok(ticket) => {
            EventLogger::log_event(
                &request_id,
                TicketEvent::ExtractionSucceeded {
                    provider: vision.name().to_string(),
                    rows: ticket.winning_rows.len(),
                },
            );
            Ok(ticket)
        }
        Err(e) => {
            EventLogger::log_event(
                &request_id,
                TicketEvent::ExtractionFailed {
                    provider: vision.name().to_string(),
                    reason: e.to_string(),
                    raw_response: raw.clone(),
                },
            );
            note_error(&format!("Could not parse data from AI. Raw response: {raw}"));
            Err(e.into())
        }
    }
}

pub async fn run(config: &AppConfig, image: &Path, mime: Option<String>, json: bool) -> Result<()> {
    let mime = mime.unwrap_or_else(|| detect_mime_type(image).to_string());
    if !is_image(&mime) {
        bail!("{mime} is not an image type");
    }
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("failed to read {}", image.display()))?;

    let vision = config.vision()?;
    let ticket = extract_ticket(&vision, &bytes, &mime).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ticket)?);
    } else {
        print!("{}", format_ticket(&ticket));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct Canned(&'static str);

    #[async_trait]
    impl VisionModel for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn extract_text(&self, _image: &[u8], _mime: &str, prompt: &str) -> Result<String> {
            assert_eq!(prompt, TICKET_PROMPT);
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn normalizes_model_reply() {
        let vision = Canned(r#"{"date":"01.02.2024","sanceNumber":"089229","winningNumbers":["05 21 32 36 38 46 NT"]}"#);
        let ticket = extract_ticket(&vision, b"img", "image/png").await.unwrap();
        assert_eq!(ticket.bonus_number, "089229");
    }

    #[tokio::test]
    async fn unparseable_reply_is_an_error() {
        let vision = Canned("no ticket in this picture");
        assert!(extract_ticket(&vision, b"img", "image/png").await.is_err());
    }
}
