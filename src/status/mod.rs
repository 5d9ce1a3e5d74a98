pub mod parser;
pub mod view;

pub use parser::{LastSeen, LogRow, NOT_AVAILABLE, ServiceStatus, parse_rows};
pub use view::{ServiceBoard, ServiceCard, ServiceEntry, ServiceView};
