pub mod args;
pub mod filter;
pub mod update;

pub use args::SqlArg;
pub use filter::{FilterError, QueryFilter};
pub use update::{Patch, UpdateBuilder};
