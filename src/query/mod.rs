pub mod path;
pub mod builder;
pub mod predicate;
pub mod frozen;
pub mod compare;
pub mod cache;
