pub mod config;
pub mod cover;
pub mod registry;
pub mod reload;
pub mod script;
pub mod setup;

/// Integration domain identifier. Helper entities created by the setup flow
/// are registered under this platform name.
pub const DOMAIN: &str = "cover_manager";

pub use config::Config;
pub use config::ConfigError;
pub use config::LogLevel;
pub use cover::CoverConfigEntry;
pub use cover::CoverDocument;
pub use cover::CoverError;
pub use cover::generate;
pub use cover::normalize_id;
pub use registry::EntityRegistry;
pub use registry::StoredRegistry;
pub use setup::CoverManager;
pub use setup::SetupError;
