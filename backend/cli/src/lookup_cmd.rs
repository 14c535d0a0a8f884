//! CLI Lookup Commands
//!
//! `draw-id` prints the identifier a date maps to; `lookup` fetches the
//! official results and optionally checks a saved ticket against them.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use uuid::Uuid;

use logging::{EventLogger, TicketEvent};
use ticketscan_core::{
    check_ticket, derive_draw_id, normalize_date, parse_draw_id, parse_lookup_date, ExtractedTicket,
};
use ticketscan_draws::{fetch_for_date, SazkaClient};

use crate::config::AppConfig;
use crate::terminal_output::{format_check, format_draw, note_warn};

/// Accepts anything the ticket may print (`1.2.2024`, ISO, RFC 3339).
pub fn parse_any_date(input: &str) -> Result<NaiveDate> {
    Ok(parse_lookup_date(&normalize_date(input))?)
}

pub fn draw_id(date: &str) -> Result<()> {
    let date = parse_any_date(date)?;
    let id = derive_draw_id(date);
    let parsed = parse_draw_id(&id)?;
    println!("{id}  (year {}, ISO week {}, day {})", parsed.year, parsed.week, parsed.weekday);
    Ok(())
}

pub async fn run(config: &AppConfig, date: &str, ticket: Option<&Path>, json: bool) -> Result<()> {
    let date = parse_any_date(date)?;
    let ticket: Option<ExtractedTicket> = match ticket {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            Some(serde_json::from_str(&text).context("ticket file is not an extracted ticket")?)
        }
        None => None,
    };

    let client = SazkaClient::new(&config.draw_results_base_url);
    let request_id = Uuid::new_v4().to_string();
    let (draw_id, draw) = match fetch_for_date(&client, date).await {
        Ok(found) => found,
        Err(e) => {
            EventLogger::log_event(
                &request_id,
                TicketEvent::LookupFailed {
                    draw_id: e.draw_id().to_string(),
                    error: e.to_string(),
                },
            );
            return Err(e).context("Failed to fetch winning numbers");
        }
    };
    EventLogger::log_event(&request_id, TicketEvent::LookupSucceeded { draw_id: draw_id.clone() });

    let check = ticket.as_ref().map(|t| check_ticket(t, &draw));

    if json {
        let out = serde_json::json!({ "drawId": draw_id, "result": draw, "check": check });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print!("{}", format_draw(&draw_id, &draw));
    if let (Some(ticket), Some(check)) = (ticket, check) {
        if normalize_date(&ticket.date) != date.format("%Y-%m-%d").to_string() {
            note_warn(&format!("ticket is dated {}, not {date}", ticket.date));
        }
        println!();
        print!("{}", format_check(&check));
    }
    Ok(())
}
