//! Core types, error taxonomy and date logic shared by every TicketScan crate.

pub mod check;
pub mod dates;
pub mod draw_id;
pub mod error;
pub mod traits;
pub mod types;

pub use check::{check_ticket, row_numbers, BonusCheck, RowCheck, TicketCheck};
pub use dates::{display_date, normalize_date, parse_lookup_date};
pub use draw_id::{derive_draw_id, parse_draw_id, DrawId};
pub use error::{AuthError, CaptureError, DateError, ExtractionError, LookupError, ScanError};
pub use traits::{DrawResultsSource, TokenVerifier, VisionModel};
pub use types::{DrawResult, ExtractedTicket, MainGame, VerifiedUser};
