pub mod algorithm;
pub mod identity;
pub mod outcome;
pub mod policy;
pub mod user;
