//! Document model and its JSON wire codec.
//!
//! Field names on the wire are fixed by the CRPT document API and are mapped
//! explicitly on every field; dates travel as `YYYY-MM-DD` strings.

mod codec;
mod date;
mod types;

pub use codec::{decode, encode};
pub use types::{Description, Document, Product};
