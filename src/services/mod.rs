//! Maileon resource services.

mod ping;

pub use ping::PingService;
