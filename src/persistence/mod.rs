//! Loading and saving project state.
//!
//! A [`Backend`] knows how to store one project; a [`Context`] says where.
//! [`Store`] pairs the two so callers can just `load` and `save`.

mod backend;
mod error;
mod file;
mod fs;
mod memory;

pub use backend::{Backend, Context, Store};
pub use error::PersistError;
pub use file::{decode, encode, FileBackend, DEFAULT_STATE_PATH, STATE_FORMAT_VERSION};
pub use fs::{FileSystem, LocalFs, MemoryFs};
pub use memory::MemoryBackend;
