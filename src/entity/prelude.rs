//! 预导入模块，方便使用

pub use super::api_keys::{ActiveModel as ApiKeyActiveModel, Entity as ApiKeys, Model as ApiKeyModel};
pub use super::assignments::{
    ActiveModel as AssignmentActiveModel, Entity as Assignments, Model as AssignmentModel,
};
pub use super::recurring_assignments::{
    ActiveModel as RecurringAssignmentActiveModel, Entity as RecurringAssignments,
    Model as RecurringAssignmentModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
