//! AWS network provider for vpc-reaper
//!
//! This crate implements the `NetworkProvider` trait on top of the AWS SDK,
//! covering the four services a VPC's contents are spread across.
//!
//! # Services
//!
//! - EC2: instances, interfaces, groups, gateways, subnets, routes, endpoints, addresses
//! - ELBv2: application and network load balancers
//! - ELB: classic load balancers
//! - EFS: shared filesystems and their mount targets
//!
//! # Requirements
//!
//! - Credentials are resolved through the standard AWS provider chain
//!   (environment, shared config/credentials files, instance profile)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vpcreaper_cloud::{Teardown, TeardownSettings};
//! use vpcreaper_cloud_aws::AwsProvider;
//!
//! let provider = AwsProvider::from_env(Some("eu-west-1".into())).await;
//! let teardown = Teardown::new(Arc::new(provider), TeardownSettings::default());
//! let report = teardown.run("vpc-0123456789abcdef0", true).await?;
//! ```

pub mod convert;
pub mod error;
pub mod provider;

pub use provider::AwsProvider;
