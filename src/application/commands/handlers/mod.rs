//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod check_status_handlers;
mod credential_handlers;
mod credentials;
mod delete_handlers;
mod retrieval;
mod submit_handlers;

#[cfg(test)]
pub(crate) mod test_support;

pub use check_status_handlers::*;
pub use credential_handlers::*;
pub use credentials::*;
pub use delete_handlers::*;
pub use retrieval::*;
pub use submit_handlers::*;
