pub mod error;
pub mod oracle;
pub mod redstone;
pub mod widget;
