#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for stackgc
//!
//! This crate provides the values that flow between the scanner, the
//! extractor and the reconciler: stacks and their templates, asset
//! references, the in-use index, stored objects and deletion records.

pub mod asset;
pub mod object;
pub mod policy;
pub mod reports;
pub mod stack;
pub mod template;

// Re-export commonly used types
pub use asset::{AssetReference, InUseIndex, InUseIndexBuilder};
pub use object::{DeletionRecord, ListingKind, ListingMode, StoredObject, VersioningStatus};
pub use policy::{AssetKind, AssetPolicy, RunMode};
pub use reports::{BucketReport, GcReport, REMOVABLE_SAMPLE_LIMIT};
pub use stack::{AccountContext, StackStatus, StackSummary};
pub use template::{Resource, Template};

use serde::{Deserialize, Serialize};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    #[default]
    Tty,
    Json,
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    #[default]
    Auto,
    Never,
}

// Implement clap::ValueEnum for ColorChoice
impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}
