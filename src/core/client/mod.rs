// HTTP seam and its reqwest implementation
pub mod transport;
pub mod reqwest_transport;

// Bearer token + deployment root handling
pub mod token_store;
pub mod authenticated_fetch;

#[cfg(test)]
pub mod test_support;
