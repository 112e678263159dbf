pub mod messages;
pub mod sink;

pub use sink::ConsoleSink;
