pub mod line_assembler;
pub mod ndjson;
