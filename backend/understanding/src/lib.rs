pub mod normalize;
pub mod vision;

pub use normalize::{extract_json_value, normalize, ticket_from_value};
pub use vision::{describe_image, VisionProvider, TICKET_PROMPT};
