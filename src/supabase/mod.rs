pub mod client;
pub mod error_log;
pub mod sessions;

pub use client::SupabaseClient;
pub use error_log::SupabaseErrorLog;
pub use sessions::SupabaseSessionVerifier;
