pub mod lock;
pub mod store_io;
