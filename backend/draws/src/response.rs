//! Upstream payload shape and field selection.
//!
//! The official feed carries far more than the client shows. Only the typed
//! subset below is read; everything else is ignored and every level is
//! optional, so a sparse payload still yields a (mostly empty) result.

use serde::{Deserialize, Deserializer};

use ticketscan_core::DrawResult;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDraw {
    pub draw_date: Option<String>,
    pub numbers: Option<RawNumbers>,
}

/// An explicit `null` array reads the same as an absent one.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawNumbers {
    #[serde(deserialize_with = "null_as_empty")]
    pub main_game_numbers: Vec<RawMainGame>,
    #[serde(deserialize_with = "null_as_empty")]
    pub addon_numbers: Vec<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMainGame {
    /// Each drum is one drawn sequence; the first one is the game result.
    #[serde(deserialize_with = "null_as_empty")]
    pub drawing_drums: Vec<Vec<u32>>,
    pub extra_number: Option<u32>,
}

impl RawMainGame {
    fn first_drum(&self) -> Vec<u32> {
        self.drawing_drums.first().cloned().unwrap_or_default()
    }
}

/// Reduce an upstream payload to the displayed fields.
pub fn select_draw_result(raw: RawDraw) -> DrawResult {
    let numbers = raw.numbers.unwrap_or_default();
    let game = |i: usize| numbers.main_game_numbers.get(i);

    DrawResult {
        draw_date: raw.draw_date.unwrap_or_default(),
        main_game1_numbers: game(0).map(RawMainGame::first_drum).unwrap_or_default(),
        main_game1_extra: game(0).and_then(|g| g.extra_number),
        main_game2_numbers: game(1).map(RawMainGame::first_drum).unwrap_or_default(),
        main_game2_extra: game(1).and_then(|g| g.extra_number),
        addon_numbers: numbers.addon_numbers.clone(),
    }
}
