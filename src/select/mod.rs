//! Selector language and the tree walkers that apply it
//!
//! ## Modules
//!
//! - [`parser`]: turns a selector string into an address-indexed [`Selector`]
//! - [`subset`]: `[n]` / `[start:end]` array windows
//! - [`include`]: copies selected fields into fresh objects
//! - [`exclude`]: removes selected fields in place, or gathers copies of them
//! - [`cache`]: memoizes parsed selectors by their text
//!
//! ## Syntax
//!
//! ```text
//! firstName lastName            two fields
//! account{ username email }     fields of a child object
//! purchases.items.name          same as purchases{ items{ name } }
//! logins[2:4] vehicles[-1]      1-based, inclusive; negatives count from the end
//! ```

pub mod cache;
pub mod exclude;
pub mod include;
pub mod parser;
pub mod selector;
pub mod subset;

pub use cache::SelectorCache;
pub use parser::parse;
pub use selector::{resolve_address, Pick, PickKind, Selector};
pub use subset::{Subset, Window};
