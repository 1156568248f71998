pub mod job_resolver_service;
pub mod log_follower_service;
pub mod log_tailer_service;
pub mod route_lister_service;
