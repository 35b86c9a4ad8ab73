pub mod batch;
pub mod clock;
pub mod config;
pub mod domain_utils;
pub mod engine;
pub mod ledger;
pub mod record;
pub mod similarity;
pub mod sources;
pub mod validators;

pub use batch::{process_record_set, run_batch, BatchOutcome, ValidationStats};
pub use clock::Clock;
pub use config::Config;
pub use engine::ValidatorEngine;
pub use ledger::{ManualReviewEntry, RejectionEntry, RejectionLedger};
pub use record::{
    ContactQuality, ContactStatus, EmailProvider, RawStudentRecord, ValidatedStudentRecord,
};
pub use similarity::{find_similar_profiles, ScoredProfile};
pub use sources::SourceRegistry;
pub use validators::RejectionReason;
