pub mod fs_atomic;
pub mod logging;

pub use fs_atomic::atomic_write_file;
pub use logging::{append_host_log_line, host_log_path};
