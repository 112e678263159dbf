pub mod date;
pub mod path;
pub mod table;

pub use path::expand_tilde;
