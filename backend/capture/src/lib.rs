//! Live-frame positioning analysis and auto-capture.

pub mod analyzer;
pub mod driver;
pub mod frame;
pub mod session;
pub mod source;
pub mod workflow;

pub use analyzer::{
    analyze_frame, analyze_image, evaluate, measure, Analysis, FrameMetrics, ScanFeedback,
    ScanMessage, ScannerConfig,
};
pub use driver::{run_scan, ScanEvent, ScanHandle, ScanOptions, StopReason};
pub use frame::Frame;
pub use session::{CaptureTrigger, ScanSession, ScanState, TickReport};
pub use source::{DirectorySource, FrameSource};
pub use workflow::{CaptureWorkflow, LookupRequest, RequestToken};
