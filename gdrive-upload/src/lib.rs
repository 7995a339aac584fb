pub mod cli;
pub mod drive;
pub mod logging;

pub use cli::{run, Cli};
