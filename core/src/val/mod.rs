pub mod cell;
pub mod num;


pub use cell::{IdentityLookup, NoIdentities, ValueCell};
