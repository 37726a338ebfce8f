//! Campaign composition backend: wizard sessions, recipients, validation
//! approval, uploads and campaign persistence.
//!
//! Provides REST API endpoints for the composer UI.
//! Data stored in DashMap (development); swap to PostgreSQL for production.

pub mod approval;
pub mod evaluator;
pub mod handlers;
pub mod models;
pub mod recipients;
pub mod requests;
pub mod router;
pub mod store;
pub mod suggestions;
pub mod uploads;
pub mod wizard;

pub use approval::{approved_count, ValidationCategory, ValidationCounts, ValidationToggleSet};
pub use evaluator::{build_evaluator, EntryRulesEvaluator, MockEvaluator, RecipientPool, ValidationEvaluator};
pub use handlers::ManagementState;
pub use router::management_router;
pub use store::{CampaignRepository, ManagementStore};
pub use suggestions::{CampaignDirectory, NameSuggester};
pub use uploads::{FileStorage, InMemoryFileStorage, UploadOutcome, UploadTarget, UploadedFile};
pub use wizard::{NavigationOutcome, Redirect, WizardSession, WizardStep};
