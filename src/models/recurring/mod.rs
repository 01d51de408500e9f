pub mod entities;
pub mod requests;
pub mod responses;
pub mod rule;

pub use entities::{
    EditBehavior, NewRecurringAssignment, RecurringAssignment, RecurringChanges, RecurringDraft,
};
pub use responses::{RecurringAssignmentResponse, RecurringListResponse};
pub use rule::{EndCondition, EndType, RecurrenceRule, RecurrenceType};
