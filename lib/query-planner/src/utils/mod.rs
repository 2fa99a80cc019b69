pub mod cancellation;
pub mod operation_utils;
pub mod parsing;
pub mod pretty_display;
