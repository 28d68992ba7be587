//! vpc-reaper teardown engine
//!
//! This crate tears down a cloud virtual network (VPC) and everything that
//! depends on it, in an order that respects the dependencies between
//! resources.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  vpc-reaper CLI                  │
//! │                (vpc-reaper delete)               │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               vpcreaper-cloud                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  Teardown (fixed step order)              │   │
//! │  └──────────────────┬───────────────────────┘   │
//! │  ┌──────────────────▼───────────────────────┐   │
//! │  │  Reapers (one per resource type)          │   │
//! │  └──────────────────┬───────────────────────┘   │
//! │  ┌──────────────────▼───────────────────────┐   │
//! │  │  Call executor + ErrorPolicy              │   │
//! │  └──────────────────┬───────────────────────┘   │
//! │  ┌──────────────────▼───────────────────────┐   │
//! │  │  trait NetworkProvider { ... }            │   │
//! │  └──────────────────────────────────────────┘   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │      aws      │
//!           │   provider    │
//!           └───────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vpcreaper_cloud::{Teardown, TeardownSettings};
//!
//! let teardown = Teardown::new(Arc::new(provider), TeardownSettings::default());
//! let report = teardown.run("vpc-0123456789abcdef0", false).await?;
//! println!("{}", report.summary());
//! ```

pub mod code;
pub mod context;
pub mod error;
pub mod executor;
pub mod policy;
pub mod provider;
pub mod reaper;
pub mod report;
pub mod resource;
pub mod settings;
pub mod teardown;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-exports
pub use code::ErrorCode;
pub use context::TeardownContext;
pub use error::{CloudError, ProviderError, Result};
pub use policy::{Disposition, ErrorPolicy};
pub use provider::{NetworkProvider, ProviderResult};
pub use report::{StepReport, TeardownReport, TeardownSummary};
pub use settings::TeardownSettings;
pub use teardown::{Step, Teardown};
