pub mod agent;
pub mod classifier;
pub mod html;
pub mod locator;
pub mod scenario;
pub mod server;
pub mod utils;

// Re-export common items
pub use classifier::classify;
pub use html::Document;
pub use locator::{LocatorEngine, LocatorOutcome, LocatorRequest, LocatorResult};
pub use scenario::synthesize;
