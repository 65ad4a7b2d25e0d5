//! Filename-keyed texture table with background loading.
//!
//! `load` starts at most one fetch per filename as a task on the vault's
//! tokio runtime: the bytes are read asynchronously and decoded on the
//! blocking pool. The render thread drains finished fetches with
//! `TextureVault::poll`, which hands the decoded pixels to an upload
//! callback and stores the result. Entries are never evicted.

mod error;
mod source;
mod ticket;
mod vault;

pub use error::TextureError;
pub use source::{DirectorySource, ImageSource, DEFAULT_TEXTURE_ROOT};
pub use ticket::LoadTicket;
pub use vault::{TextureStatus, TextureVault, VaultConfig};
