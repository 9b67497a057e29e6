mod contact;
mod user;

pub use contact::{Contact, ContactUpdate};
pub use user::{PublicUser, Subscription, User, UserUpdate};
