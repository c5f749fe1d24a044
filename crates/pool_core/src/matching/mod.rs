pub mod compat;
pub mod groups;
pub mod slots;

pub use compat::CompatibilityEvaluator;
pub use groups::{form_groups, FormationOutcome};
pub use slots::{partition, SlotKey};
