//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod payment;
pub mod time_entry;
pub mod user;
pub mod work_object;

// Re-export specific types to avoid conflicts
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use time_entry::{Column as TimeEntryColumn, Entity as TimeEntry, Model as TimeEntryModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use work_object::{
    Column as WorkObjectColumn, Entity as WorkObject, Model as WorkObjectModel, ObjectStatus,
};
