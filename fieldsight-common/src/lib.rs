//! # FieldSight Common Library
//!
//! Shared code for the FieldSight KoBoCAT companion service:
//! - Database schema and row models
//! - XForm instance XML parsing
//! - Bootstrap configuration loading
//! - Media storage abstraction
//! - Operator error reporting

pub mod config;
pub mod db;
pub mod error;
pub mod instance_xml;
pub mod report;
pub mod storage;

pub use error::{Error, Result};
pub use instance_xml::{parse_xform_instance, ParsedInstance};
