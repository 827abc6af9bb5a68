pub mod config;
pub mod todo;
pub mod tree;
pub mod view;

pub use config::*;
pub use todo::*;
pub use tree::*;
pub use view::*;
