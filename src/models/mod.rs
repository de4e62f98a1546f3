pub mod outcome;
pub mod source;
pub mod target;

pub use outcome::{TransferOutcome, TransferReport, TransferState};
pub use source::{SourceCollection, SourceItem, SourcePlaylistSummary};
pub use target::{TargetCollection, TargetSearchCandidate, TargetUser};
