pub mod model;
pub mod solver;

pub use solver::score_participants;
