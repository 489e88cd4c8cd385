mod compare;
mod config;
mod files;
mod project;

pub use self::compare::*;
pub use self::config::*;
pub use self::files::*;
pub use self::project::*;
