//! Command implementations.

pub mod build;
pub mod export;
pub mod lint;

pub use self::build::execute_build;
pub use self::export::execute_export;
pub use self::lint::execute_lint;
