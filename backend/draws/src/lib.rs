//! Official draw-results lookup.

pub mod response;
pub mod sazka;

use chrono::NaiveDate;
use tracing::info;

use ticketscan_core::{derive_draw_id, DrawResult, DrawResultsSource, LookupError};

pub use response::{select_draw_result, RawDraw};
pub use sazka::{SazkaClient, DEFAULT_BASE_URL};

/// Results for the draw held on `date`, together with the derived draw id.
pub async fn fetch_for_date(
    source: &dyn DrawResultsSource,
    date: NaiveDate,
) -> Result<(String, DrawResult), LookupError> {
    let draw_id = derive_draw_id(date);
    info!(%date, draw_id = %draw_id, "Looking up official results");
    let result = source.fetch(&draw_id).await?;
    Ok((draw_id, result))
}
