// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod error;
pub mod ingestion;
pub mod alerts;
pub mod lifecycle;
pub mod repository_factory;

// Re-export use cases for convenience
pub use error::AlertServiceError;
pub use ingestion::{EventIngestionService, IngestionReceipt, StandardEventIngestionService};
pub use alerts::{AlertQueryService, StandardAlertQueryService};
pub use lifecycle::{AlertLifecycleService, StandardAlertLifecycleService, StatusPatch};
pub use repository_factory::{create_repositories, Repositories};
