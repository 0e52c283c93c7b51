pub mod capture_delegate;
pub mod capture_host;
pub mod seekable_writer;
