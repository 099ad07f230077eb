//! Runtime abstraction for the side effects of the client.
//!
//! The client touches the outside world in two places besides the network:
//! it reads environment variables once while resolving its configuration, and
//! it sleeps between retry attempts. Both go through [`Runtime`] so tests can
//! inject variables and observe backoff delays without waiting for them.
//!
//! # Structure
//!
//! - `env` - Environment variable lookups
//! - `clock` - Backoff sleeps

mod clock;
mod env;

use async_trait::async_trait;
use std::env as std_env;
use std::time::Duration;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    // Time
    /// Suspend the current call for `duration`.
    async fn sleep(&self, duration: Duration);
}

pub struct RealRuntime;

#[async_trait]
impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    async fn sleep(&self, duration: Duration) {
        self.sleep_impl(duration).await
    }
}
