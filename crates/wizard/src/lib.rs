//! Wizard controller: the selection-and-commit workflow engine.
//!
//! Owns the phase state machine (browse → filter → configure → commit), the
//! selection set and its pill/grid projections, draft-edit merging, and the
//! all-or-nothing commit protocol with compensating deletes. Catalog mechanics
//! live in `lineup-catalog`; everything remote goes through the collaborator
//! traits in `lineup-gateway`.

pub mod commit;
pub mod controller;
pub mod selection;

pub use commit::CommitError;
pub use controller::{WizardController, WizardPhase};
pub use selection::{
    merge_drafts, required_fields_note, validate_for_commit, DraftEdit, Pill, SelectionEntry,
    PILL_ICON,
};
