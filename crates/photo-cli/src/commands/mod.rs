//! Command implementations for photo-cli

pub mod init;
pub mod list_albums;
pub mod push;
pub mod status;
pub mod sync;

pub use init::run_init;
pub use list_albums::run_list_albums;
pub use push::run_push;
pub use status::run_status;
pub use sync::{SyncArgs, run_sync};
