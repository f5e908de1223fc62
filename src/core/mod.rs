pub mod engine;

pub use crate::domain::model::{Enrollment, GroupRef, IndividualRef, Period};
pub use crate::domain::ports::{EnrollmentStore, IdentityDirectory};
pub use crate::utils::error::Result;
