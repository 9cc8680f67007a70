//! fecftp-client — tokio transport driver and file sink around fecftp-core.

pub mod transfer;
