//! Capture → extract → lookup workflow state.
//!
//! Uploads and lookups are not cancellable once sent, so every request
//! carries the generation it was issued under. A result arriving after a
//! retake, logout or newer upload is stale and is dropped.

use tracing::debug;

use ticketscan_core::{normalize_date, DrawResult, ExtractedTicket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// A lookup ready to be sent: the token plus the ticket date normalized
/// to `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub token: RequestToken,
    pub date: String,
}

#[derive(Debug)]
pub struct CaptureWorkflow {
    generation: u64,
    show_camera: bool,
    uploading: bool,
    looking_up: bool,
    ticket: Option<ExtractedTicket>,
    draw: Option<DrawResult>,
    error: Option<String>,
    lookup_error: Option<String>,
}

impl Default for CaptureWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureWorkflow {
    pub fn new() -> Self {
        Self {
            generation: 0,
            show_camera: true,
            uploading: false,
            looking_up: false,
            ticket: None,
            draw: None,
            error: None,
            lookup_error: None,
        }
    }

    pub fn show_camera(&self) -> bool {
        self.show_camera
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn is_looking_up(&self) -> bool {
        self.looking_up
    }

    pub fn ticket(&self) -> Option<&ExtractedTicket> {
        self.ticket.as_ref()
    }

    pub fn draw(&self) -> Option<&DrawResult> {
        self.draw.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn lookup_error(&self) -> Option<&str> {
        self.lookup_error.as_deref()
    }

    /// A frame was captured and is about to be uploaded.
    pub fn begin_upload(&mut self) -> RequestToken {
        self.reset();
        self.show_camera = false;
        self.uploading = true;
        RequestToken(self.generation)
    }

    /// Apply an extraction result. Returns `false` if it was stale.
    pub fn apply_extraction(
        &mut self,
        token: RequestToken,
        result: Result<ExtractedTicket, String>,
    ) -> bool {
        if !self.is_current(token, "extraction") {
            return false;
        }
        self.uploading = false;
        match result {
            Ok(ticket) => self.ticket = Some(ticket),
            Err(e) => {
                self.error = Some(format!("Failed to extract data: {e}"));
                self.show_camera = true;
            }
        }
        true
    }

    /// Start a draw lookup for the current ticket, if there is one.
    pub fn begin_lookup(&mut self) -> Option<LookupRequest> {
        let date = normalize_date(&self.ticket.as_ref()?.date);
        self.looking_up = true;
        self.draw = None;
        self.lookup_error = None;
        Some(LookupRequest {
            token: RequestToken(self.generation),
            date,
        })
    }

    /// Apply a lookup result. Returns `false` if it was stale.
    pub fn apply_lookup(&mut self, token: RequestToken, result: Result<DrawResult, String>) -> bool {
        if !self.is_current(token, "lookup") {
            return false;
        }
        self.looking_up = false;
        match result {
            Ok(draw) => self.draw = Some(draw),
            Err(e) => self.lookup_error = Some(format!("Failed to fetch winning numbers: {e}")),
        }
        true
    }

    /// Discard the current ticket and go back to the camera.
    pub fn retake(&mut self) {
        self.reset();
        self.show_camera = true;
    }

    pub fn logout(&mut self) {
        self.retake();
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.uploading = false;
        self.looking_up = false;
        self.ticket = None;
        self.draw = None;
        self.error = None;
        self.lookup_error = None;
    }

    fn is_current(&self, token: RequestToken, kind: &str) -> bool {
        let current = token.0 == self.generation;
        if !current {
            debug!(kind, token = token.0, generation = self.generation, "Discarding stale result");
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket() -> ExtractedTicket {
        ExtractedTicket {
            date: "1.2.2024".into(),
            bonus_number: "089229".into(),
            winning_rows: vec!["05 21 32 36 38 46".into()],
        }
    }

    #[test]
    fn upload_then_lookup() {
        let mut wf = CaptureWorkflow::new();
        assert!(wf.show_camera());

        let token = wf.begin_upload();
        assert!(wf.is_uploading());
        assert!(!wf.show_camera());
        assert!(wf.apply_extraction(token, Ok(ticket())));
        assert_eq!(wf.ticket(), Some(&ticket()));

        let req = wf.begin_lookup().unwrap();
        assert_eq!(req.date, "2024-02-01");
        assert!(wf.apply_lookup(req.token, Ok(DrawResult::default())));
        assert!(wf.draw().is_some());
        assert!(!wf.is_looking_up());
    }

    #[test]
    fn extraction_failure_returns_to_camera() {
        let mut wf = CaptureWorkflow::new();
        let token = wf.begin_upload();
        assert!(wf.apply_extraction(token, Err("Error processing image.".into())));
        assert!(wf.show_camera());
        assert_eq!(wf.error(), Some("Failed to extract data: Error processing image."));
        assert!(wf.ticket().is_none());
    }

    #[test]
    fn late_extraction_after_retake_is_dropped() {
        let mut wf = CaptureWorkflow::new();
        let token = wf.begin_upload();
        wf.retake();
        assert!(!wf.apply_extraction(token, Ok(ticket())));
        assert!(wf.ticket().is_none());
        assert!(wf.show_camera());
    }

    #[test]
    fn superseded_upload_is_dropped() {
        let mut wf = CaptureWorkflow::new();
        let first = wf.begin_upload();
        let second = wf.begin_upload();
        assert!(!wf.apply_extraction(first, Err("old".into())));
        assert!(wf.error().is_none());
        assert!(wf.apply_extraction(second, Ok(ticket())));
    }

    #[test]
    fn late_lookup_after_logout_is_dropped() {
        let mut wf = CaptureWorkflow::new();
        let token = wf.begin_upload();
        wf.apply_extraction(token, Ok(ticket()));
        let req = wf.begin_lookup().unwrap();
        wf.logout();
        assert!(!wf.apply_lookup(req.token, Ok(DrawResult::default())));
        assert!(wf.draw().is_none());
    }

    #[test]
    fn lookup_needs_a_ticket() {
        let mut wf = CaptureWorkflow::new();
        assert!(wf.begin_lookup().is_none());
    }

    #[test]
    fn lookup_failure_keeps_ticket() {
        let mut wf = CaptureWorkflow::new();
        let token = wf.begin_upload();
        wf.apply_extraction(token, Ok(ticket()));
        let req = wf.begin_lookup().unwrap();
        assert!(wf.apply_lookup(req.token, Err("not found".into())));
        assert!(wf.ticket().is_some());
        assert_eq!(wf.lookup_error(), Some("Failed to fetch winning numbers: not found"));
    }
}
