pub mod database;
pub mod predicate;
pub mod table;
pub(crate) mod validate;
