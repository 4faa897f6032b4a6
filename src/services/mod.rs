pub mod analytics;
pub mod community;
pub mod feedback;
pub mod recommendation;
pub mod store;
