pub mod dispatcher;
pub mod invalidation;
