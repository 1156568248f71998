pub mod bytes_formatter;
pub mod error_formatter;
pub mod time_formatter;
