//! Overlay of pending edits on a published family tree snapshot.

pub mod merge;
pub mod merged;
pub mod ops;
pub mod report;

pub use merge::{DraftMerger, MergeResult};
pub use merged::{DraftPerson, DraftRelationship, MergedGraph};
pub use ops::{DraftKind, DraftOp};
pub use report::{DraftOutcome, MergeReport, SkipReason};
