pub mod admin;

pub mod assignments;

pub mod recurring;

pub mod statistics;

pub use admin::configure_admin_routes;
pub use assignments::configure_assignment_routes;
pub use recurring::configure_recurring_routes;
pub use statistics::configure_statistics_routes;
