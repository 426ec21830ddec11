pub mod todo;
pub mod user;

pub use todo::{Todo, TodoDraft};
pub use user::{NewUser, User};
