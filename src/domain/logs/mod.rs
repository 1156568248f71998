pub mod dto;
pub mod service;
pub mod tail_state;
