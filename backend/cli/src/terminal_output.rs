//! Terminal output: notes, tables and ticket/draw rendering.

use ticketscan_capture::{Analysis, ScanFeedback};
use ticketscan_core::{display_date, BonusCheck, DrawResult, ExtractedTicket, MainGame, TicketCheck};

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM").map(|t| t != "dumb").unwrap_or(false))
}

fn note(color: &str, symbol: &str, plain: &str, msg: &str) -> String {
    if supports_color() {
        format!("{color}{BOLD}{symbol}{RESET} {msg}")
    } else {
        format!("{plain}: {msg}")
    }
}

pub fn note_info(msg: &str) {
    println!("{}", note(CYAN, "ℹ", "INFO", msg));
}

pub fn note_warn(msg: &str) {
    println!("{}", note(YELLOW, "⚠", "WARN", msg));
}

pub fn note_error(msg: &str) {
    eprintln!("{}", note(RED, "✗", "ERROR", msg));
}

pub fn note_success(msg: &str) {
    println!("{}", note(GREEN, "✓", "OK", msg));
}

/// Left-aligned plain-text table.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect();
        format!("  {}\n", padded.join("  ").trim_end())
    };

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = line(headers.to_vec());
    out.push_str(&line(separator.iter().map(String::as_str).collect()));
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}

fn join_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(|n| format!("{n:02}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_ticket(ticket: &ExtractedTicket) -> String {
    let mut out = format!(
        "Date:  {}\nŠance: {}\nRows:\n",
        display_date(&ticket.date),
        ticket.bonus_number
    );
    for (i, row) in ticket.winning_rows.iter().enumerate() {
        out.push_str(&format!("  {:>2}. {row}\n", i + 1));
    }
    out
}

/// Official results as shown on the results sheet: main games sorted,
/// add-on digits joined.
pub fn format_draw(draw_id: &str, draw: &DrawResult) -> String {
    let extra = |e: Option<u32>| e.map(|n| format!(" + {n:02}")).unwrap_or_default();
    format!(
        "Draw {draw_id} ({})\n  Game 1: {}{}\n  Game 2: {}{}\n  Šance:  {}\n",
        display_date(&draw.draw_date),
        join_numbers(&draw.sorted_game(MainGame::First)),
        extra(draw.main_game1_extra),
        join_numbers(&draw.sorted_game(MainGame::Second)),
        extra(draw.main_game2_extra),
        draw.addon_string().unwrap_or_else(|| "-".into()),
    )
}

pub fn format_check(check: &TicketCheck) -> String {
    let rows: Vec<Vec<String>> = check
        .rows
        .iter()
        .map(|r| {
            vec![
                r.row.clone(),
                format!("{} ({})", r.game1_hits.len(), join_numbers(&r.game1_hits)),
                format!("{} ({})", r.game2_hits.len(), join_numbers(&r.game2_hits)),
            ]
        })
        .collect();
    let bonus = match &check.bonus {
        BonusCheck::Match => "Šance: match".to_string(),
        BonusCheck::Mismatch { official } => format!("Šance: no match (official {official})"),
        BonusCheck::Unavailable => "Šance: not published".to_string(),
    };
    format!("{}{bonus}\n", render_table(&["Row", "Game 1", "Game 2"], &rows))
}

pub fn format_feedback(feedback: &ScanFeedback) -> String {
    format!(
        "[{:>5.1}] {} {}",
        feedback.confidence,
        if feedback.is_positioned { "●" } else { "○" },
        feedback.message
    )
}

pub fn format_analysis(analysis: &Analysis) -> String {
    let m = &analysis.metrics;
    let rows = vec![
        vec!["sampled".into(), m.sampled.to_string()],
        vec!["contrast ratio".into(), format!("{:.4}", m.contrast_ratio)],
        vec!["edge density".into(), format!("{:.4}", m.edge_density)],
        vec!["confidence".into(), format!("{:.1}", analysis.feedback.confidence)],
        vec!["positioned".into(), analysis.feedback.is_positioned.to_string()],
    ];
    format!("{}{}\n", render_table(&["Metric", "Value"], &rows), analysis.feedback.message)
}

#[cfg(test)]
mod tests {
    use ticketscan_core::check_ticket;

    use super::*;

    fn draw() -> DrawResult {
        DrawResult {
            draw_date: "2024-02-01".into(),
            main_game1_numbers: vec![38, 5, 21, 46, 32, 36],
            main_game1_extra: Some(12),
            main_game2_numbers: vec![1, 2, 3, 4, 5, 6],
            main_game2_extra: None,
            addon_numbers: vec![0, 8, 9, 2, 2, 9],
        }
    }

    #[test]
    fn renders_table() {
        let table = render_table(&["Name", "Count"], &[vec!["Alice".into(), "42".into()]]);
        assert!(table.contains("Alice"));
        assert!(table.contains("-----"));
    }

    #[test]
    fn draw_is_sorted_and_dated() {
        let text = format_draw("2024054", &draw());
        assert!(text.contains("Draw 2024054 (01.02.2024)"));
        assert!(text.contains("Game 1: 05 21 32 36 38 46 + 12"));
        assert!(text.contains("Šance:  089229"));
    }

    #[test]
    fn check_lists_hits_and_bonus() {
        let ticket = ExtractedTicket {
            date: "01.02.2024".into(),
            bonus_number: "089229".into(),
            winning_rows: vec!["05 21 32 36 38 46 NT".into()],
        };
        let text = format_check(&check_ticket(&ticket, &draw()));
        assert!(text.contains("6 (05 21 32 36 38 46)"));
        assert!(text.contains("Šance: match"));
    }
}
