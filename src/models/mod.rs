pub mod account;
pub mod task;

pub use account::{Account, AccountUpdate, PublicAccount};
pub use task::{Task, TaskInput, TaskQuery, TaskUpdate};
