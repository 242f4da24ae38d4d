#![doc = "sitebucket-core: core logic library for sitebucket."]

//! This crate contains the deployment logic for sitebucket: bucket provisioning,
//! directory synchronisation and DNS alias records. It does not depend on any
//! cloud SDK; providers are reached through the traits in [`contract`].
//!
//! # Usage
//! Add this as a dependency wherever a deployment step needs to run, and hand it a
//! [`contract::StorageProvider`] / [`contract::DnsProvider`] implementation.

pub mod bucket;
pub mod config;
pub mod contract;
pub mod domain;
pub mod endpoint;
pub mod error;
pub mod site;
pub mod synchronise;
