pub mod error;
pub mod filter;
pub mod message;
pub mod plugin;
pub mod topic;
