//! ============================================================================
//! TRAVEL-CORE: Admin backend for the booking dashboard
//! ============================================================================
//! This crate handles the backend pieces of the travel admin site:
//! - Loyalty reward configuration (defaults, validation, partial updates)
//! - Embedded redb storage for the configuration singleton
//! - Access gate redirecting between the admin dashboard and login page
//! - Gated HTTP endpoint for reading and patching the configuration
//! ============================================================================

pub mod access;
pub mod config;
pub mod db;
pub mod error;
pub mod rewards;
pub mod server;

// Re-export main types for convenience
pub use access::{AccessGate, GateConfig, GateDecision};
pub use config::AppConfig;
pub use db::AdminDb;
pub use error::AdminError;
pub use rewards::{
    PartialRewardConfiguration, RedemptionOption, RewardConfiguration, RewardError,
    RewardRepository, Tier, ValidationPolicy,
};
pub use server::{AdminRequest, AdminResponse, AdminServer};
