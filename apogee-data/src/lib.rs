extern crate alloc;

mod abilities;
mod common;
mod conditions;
mod datastore;
mod items;
mod mons;
mod moves;

#[cfg(test)]
mod test_util;

pub use abilities::*;
pub use common::*;
pub use conditions::*;
pub use datastore::*;
pub use items::*;
pub use mons::*;
pub use moves::*;
