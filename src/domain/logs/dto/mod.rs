pub mod file_descriptor;
pub mod log_lines_batch;
