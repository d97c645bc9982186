pub mod bringup;
pub mod cli;
pub mod run;

pub use bringup::*;
pub use cli::*;
pub use run::*;
