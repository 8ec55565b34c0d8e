pub mod account;
pub mod document;
pub mod preferences;
pub mod stats;
