//! Shared application layer for schemflow.
//!
//! Ties the document model, command history and project storage together
//! behind an [`EditorSession`], and provides the presentation helpers the
//! frontends share.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod session;

pub use config::{AppConfig, CONFIG_FILE};
pub use diagnostics::{Diagnostic, DiagnosticCategory, diagnostics_for};
pub use error::{AppError, AppResult};
pub use session::{ComponentSummary, EditorSession, SessionStatus};
