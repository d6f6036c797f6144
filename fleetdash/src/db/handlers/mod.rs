//! Repositories over the record store, one per collection.

pub mod messages;
pub mod notifications;
pub mod trips;
pub mod users;
pub mod vehicles;

pub use messages::ContactMessages;
pub use notifications::Notifications;
pub use trips::Trips;
pub use users::Users;
pub use vehicles::Vehicles;
