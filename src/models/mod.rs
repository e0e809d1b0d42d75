pub mod run;
pub mod user;

pub use run::{Run, RunForm, RunFormErrors, RunInput, RunTotals};
pub use user::User;
