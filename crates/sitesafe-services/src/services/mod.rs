pub mod evidence;
pub mod repeat_offender;
pub mod submission;

pub use evidence::{EvidenceResolver, EvidenceUpload};
pub use repeat_offender::{OffenderStatus, RepeatOffenderAggregator};
pub use submission::{SubmissionReceipt, SubmissionService};
