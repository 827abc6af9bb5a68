pub mod atomic;
pub mod config_io;
pub mod kv_store;
pub mod ledger_io;
pub mod lock;
pub mod paths;
pub mod watcher;
