//! Compare an extracted ticket against official draw results.

use serde::Serialize;

use crate::types::{DrawResult, ExtractedTicket, MainGame};

/// Hits for one ticket row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowCheck {
    pub row: String,
    pub numbers: Vec<u32>,
    pub game1_hits: Vec<u32>,
    pub game2_hits: Vec<u32>,
}

/// Outcome of the bonus-number comparison.
///
/// The ticket keeps leading zeros but the feed publishes plain integers, so
/// an `addonNumbers` list that lost a leading `0` reports `Mismatch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BonusCheck {
    Match,
    Mismatch { official: String },
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketCheck {
    pub rows: Vec<RowCheck>,
    pub bonus: BonusCheck,
}

impl TicketCheck {
    pub fn best_row_hits(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.game1_hits.len().max(r.game2_hits.len()))
            .max()
            .unwrap_or(0)
    }
}

/// Numeric tokens of a ticket row; marker tokens such as `NT` are skipped.
pub fn row_numbers(row: &str) -> Vec<u32> {
    row.split_whitespace()
        .filter(|t| t.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|t| t.parse().ok())
        .collect()
}

pub fn check_ticket(ticket: &ExtractedTicket, draw: &DrawResult) -> TicketCheck {
    let game1 = draw.sorted_game(MainGame::First);
    let game2 = draw.sorted_game(MainGame::Second);

    let rows = ticket
        .winning_rows
        .iter()
        .map(|row| {
            let numbers = row_numbers(row);
            let hits = |game: &[u32]| -> Vec<u32> {
                numbers.iter().copied().filter(|n| game.binary_search(n).is_ok()).collect()
            };
            RowCheck {
                row: row.clone(),
                game1_hits: hits(&game1),
                game2_hits: hits(&game2),
                numbers,
            }
        })
        .collect();

    let bonus = match draw.addon_string() {
        None => BonusCheck::Unavailable,
        Some(official) if official == ticket.bonus_number.trim() => BonusCheck::Match,
        Some(official) => BonusCheck::Mismatch { official },
    };

    TicketCheck { rows, bonus }
}
