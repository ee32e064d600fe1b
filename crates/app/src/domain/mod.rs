//! Haulpool Domain Concerns

pub mod notifications;
pub mod shipments;
pub mod users;
