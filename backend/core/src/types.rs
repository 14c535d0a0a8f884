use serde::{Deserialize, Serialize};

/// Structured data read off a photographed ticket.
///
/// Serialized with the field names the web client already consumes
/// (`sanceNumber`, `winningNumbers`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTicket {
    /// Draw date as printed, e.g. `01.02.2024`.
    pub date: String,
    /// Bonus ("Šance") number. Leading zeros are significant.
    #[serde(rename = "sanceNumber", alias = "bonusNumber")]
    pub bonus_number: String,
    /// One entry per ticket row, e.g. `05 21 32 36 38 46 NT`. Never empty.
    #[serde(rename = "winningNumbers", alias = "winningRows")]
    pub winning_rows: Vec<String>,
}

/// Official results for one draw, reduced to the fields the client shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResult {
    pub draw_date: String,
    pub main_game1_numbers: Vec<u32>,
    pub main_game1_extra: Option<u32>,
    pub main_game2_numbers: Vec<u32>,
    pub main_game2_extra: Option<u32>,
    pub addon_numbers: Vec<u32>,
}

impl DrawResult {
    /// Main-game numbers in ascending order, as printed on the results sheet.
    pub fn sorted_game(&self, game: MainGame) -> Vec<u32> {
        let mut numbers = match game {
            MainGame::First => self.main_game1_numbers.clone(),
            MainGame::Second => self.main_game2_numbers.clone(),
        };
        numbers.sort_unstable();
        numbers
    }

    /// The add-on numbers joined without separators, the way the bonus
    /// number is printed on a ticket. `None` when the feed has no add-on.
    pub fn addon_string(&self) -> Option<String> {
        if self.addon_numbers.is_empty() {
            return None;
        }
        Some(self.addon_numbers.iter().map(u32::to_string).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainGame {
    First,
    Second,
}

/// Identity returned by a token verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedUser {
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_keeps_client_field_names() {
        let ticket = ExtractedTicket {
            date: "01.02.2024".into(),
            bonus_number: "089229".into(),
            winning_rows: vec!["05 21 32 36 38 46 NT".into()],
        };
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["sanceNumber"], "089229");
        assert_eq!(json["winningNumbers"][0], "05 21 32 36 38 46 NT");
    }

    #[test]
    fn draw_result_serializes_camel_case() {
        let draw = DrawResult {
            draw_date: "2024-02-01".into(),
            main_game1_numbers: vec![3, 1, 2],
            main_game1_extra: None,
            ..Default::default()
        };
        let json = serde_json::to_value(&draw).unwrap();
        assert_eq!(json["mainGame1Numbers"], serde_json::json!([3, 1, 2]));
        assert!(json["mainGame1Extra"].is_null());
        assert_eq!(draw.sorted_game(MainGame::First), vec![1, 2, 3]);
    }

    #[test]
    fn addon_string_drops_padding() {
        let draw = DrawResult {
            addon_numbers: vec![0, 8, 9, 2, 2, 9],
            ..Default::default()
        };
        assert_eq!(draw.addon_string().as_deref(), Some("089229"));
        assert_eq!(DrawResult::default().addon_string(), None);
    }
}
