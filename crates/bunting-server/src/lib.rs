// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authoring-side engine for Bunting feature configuration.
//!
//! # Overview
//!
//! - Compiles an [`AppSnapshot`](bunting_core::app::AppSnapshot) of stored
//!   entities into the versioned artifact schema, deterministically
//! - Validates compiled artifacts, collecting blocking errors and
//!   non-blocking warnings in one pass
//! - Publishes: allocates the next config version, stamps the publish
//!   timestamp, and signs the canonical JSON (embedded and detached JWS)
//! - Diffs two artifacts section by section for preview-before-publish
//!
//! Everything here is synchronous and pure over its inputs; persistence and
//! transport belong to the calling service.
//!
//! # Example
//!
//! ```
//! use bunting_core::app::{App, AppSnapshot};
//!
//! # fn main() -> Result<(), bunting_server::ServerError> {
//! let snapshot = AppSnapshot::new(App {
//!     identifier: "com.example.app".to_string(),
//!     name: "Example".to_string(),
//!     fetch_policy: Default::default(),
//! });
//!
//! let preview = bunting_server::preview(&snapshot)?;
//! assert!(preview.report.is_publishable());
//! assert!(!preview.artifact.is_published());
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod diff;
pub mod error;
pub mod publisher;
pub mod validator;

pub use compiler::{compile, CompileDefect, CompileError};
pub use diff::{diff, ArtifactDiff, SectionDiff};
pub use error::{Result, ServerError};
pub use publisher::{content_digest, preview, publish, Preview, PublishedArtifact};
pub use validator::{validate, ValidationError, ValidationReport, ValidationWarning};
