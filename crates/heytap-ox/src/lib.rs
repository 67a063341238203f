#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(clippy::pedantic, clippy::unwrap_used)]

//! OPPO Union (Heytap) advertising API client for Rust
//!
//! This crate covers the three operations a publisher runs against the Union
//! open API: creating ad slots in bulk from templates, checking the review
//! status of a media account, and pulling daily revenue reports. Every call
//! is authenticated with a cached client-credentials token and signed with
//! the platform's HMAC-SHA256 request signature.
//!
//! # Example
//!
//! ```rust,no_run
//! use heytap_ox::{BatchSpec, Heytap, PricePolicy, SlotTemplate};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Heytap::new("client-id", "client-secret", "30001");
//!
//!     let spec = BatchSpec::builder()
//!         .template(SlotTemplate::native_fixed())
//!         .app_name("MyApp")
//!         .base_name("Banner")
//!         .price(PricePolicy::Fixed(5))
//!         .count(10)
//!         .build();
//!
//!     let report = client.create_batch(&spec).await?;
//!     println!("created {}/{}", report.success_count, report.total());
//!
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod batch;
pub mod client;
pub mod error;
mod internal;
pub mod report;
pub mod response;
pub mod sign;
pub mod slot;
mod token;

// Re-export main types
pub use app::App;
pub use batch::{
    BatchCommand, BatchReport, BatchSession, BatchSpec, PricePolicy, SessionStep, SlotOutcome,
};
pub use client::Heytap;
pub use error::HeytapRequestError;
pub use report::{IncomeLine, IncomeSummary, MediaReport, MediaStatus};
pub use response::{ApiEnvelope, IncomeQuery, IncomeRow, MediaItem, MediaQuery};
pub use slot::{SlotConfig, SlotKind, SlotRequest, SlotTemplate};
