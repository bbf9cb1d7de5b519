pub mod connection;
pub mod entities;
pub mod repositories;
pub mod seed;

pub use connection::*;
pub use repositories::*;
