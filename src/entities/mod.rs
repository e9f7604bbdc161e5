//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod course;
pub mod enrollment;
pub mod level;
pub mod payment;
pub mod user;

// Re-export specific types to avoid conflicts
pub use course::{Column as CourseColumn, Entity as Course, Model as CourseModel};
pub use enrollment::{
    Column as EnrollmentColumn, Entity as Enrollment, EnrollmentStatus, Model as EnrollmentModel,
};
pub use level::{Column as LevelColumn, Entity as Level, Model as LevelModel};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel, PaymentStatus};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
