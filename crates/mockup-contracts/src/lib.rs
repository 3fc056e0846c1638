//! Data model and pure logic for the mockup studio: option tiers, prompt
//! composition, wire parts, response resolution, and the history log.

pub mod chat;
pub mod content;
pub mod error;
pub mod events;
pub mod history;
pub mod media;
pub mod models;
pub mod prompt;
pub mod quality;
pub mod request;

pub use error::MockupError;
