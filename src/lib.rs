//! Client for the Nucleus Security vulnerability-management API.
//!
//! ```no_run
//! use nucleus_api::{ApiKey, Client, Context};
//!
//! # async fn run() -> nucleus_api::Result<()> {
//! let client = Client::new("acme", ApiKey::new("api-key")?)?;
//! let projects = client.projects().list(&Context::background()).await?;
//! for project in &projects.value {
//!     println!("{}", project.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod output;
pub mod response;
pub mod services;
pub mod transport;
pub mod util;

pub use client::Client;
pub use config::Config;
pub use context::{Cancellation, Context};
pub use error::{Error, Result};
pub use response::{ErrorResponse, RawResponse, Response};
pub use transport::{ApiKey, BasicClient, HttpClient};
