pub mod store;

pub use store::{ContestStore, SqliteContestStore};
