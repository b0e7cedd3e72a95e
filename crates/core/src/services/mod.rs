//! Business logic services.

#![allow(missing_docs)]

pub mod engagement;
pub mod interaction;
pub mod ledger;
pub mod notification;
pub mod post;
pub mod user;

pub use engagement::{Engagement, EngagementService};
pub use interaction::{InteractionService, ToggleOutcome};
pub use ledger::{LedgerService, PointSchedule};
pub use notification::NotificationService;
pub use post::{CreatePostInput, PostService};
pub use user::UserService;
