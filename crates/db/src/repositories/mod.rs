//! Database repositories.
//!
//! Repositories are the persistence boundary for the service layer: lookups,
//! inserts, and atomic single-`UPDATE` counter adjustments. Mutating methods
//! are generic over [`sea_orm::ConnectionTrait`] so the caller can run them
//! against the pooled connection or inside an open transaction.

mod comment;
mod interaction;
mod ledger;
mod notification;
mod post;
mod user;

pub use comment::CommentRepository;
pub use interaction::InteractionRepository;
pub use ledger::LedgerRepository;
pub use notification::NotificationRepository;
pub use post::PostRepository;
pub use user::UserRepository;
