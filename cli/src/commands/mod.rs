//! Command implementations for the cdnfs CLI.

pub mod inspect;
pub mod remove;
pub mod transfer;

pub use inspect::{exit_status, run_exists, run_ls, run_stat, run_url};
pub use remove::{run_rm, run_rmdir};
pub use transfer::{run_cp, run_get, run_mv, run_put};
