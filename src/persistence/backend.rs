//! The storage contract and the handle that binds it to a location.

use super::error::PersistError;
use super::file::FileBackend;
use super::fs::{FileSystem, LocalFs};
use crate::core::Project;
use std::path::PathBuf;
use std::sync::Arc;

/// Where a backend operates. Backends stay stateless and receive the
/// context on every call.
#[derive(Clone, Debug)]
pub struct Context {
    fs: Arc<dyn FileSystem>,
}

impl Context {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Context over the local disk rooted at `root`.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(LocalFs::new(root)))
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }
}

/// Load and save one project per context.
pub trait Backend {
    fn load(&self, ctx: &Context) -> Result<Project, PersistError>;

    fn save(&self, ctx: &Context, project: &Project) -> Result<(), PersistError>;

    fn exists(&self, ctx: &Context) -> Result<bool, PersistError>;

    fn delete(&self, ctx: &Context) -> Result<(), PersistError>;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn load(&self, ctx: &Context) -> Result<Project, PersistError> {
        (**self).load(ctx)
    }

    fn save(&self, ctx: &Context, project: &Project) -> Result<(), PersistError> {
        (**self).save(ctx, project)
    }

    fn exists(&self, ctx: &Context) -> Result<bool, PersistError> {
        (**self).exists(ctx)
    }

    fn delete(&self, ctx: &Context) -> Result<(), PersistError> {
        (**self).delete(ctx)
    }
}

/// A backend bound to a context.
#[derive(Clone, Debug)]
pub struct Store<B> {
    backend: B,
    context: Context,
}

impl Store<FileBackend> {
    /// File-backed store for the project rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(FileBackend::new(), Context::local(root))
    }
}

impl<B: Backend> Store<B> {
    pub fn new(backend: B, context: Context) -> Self {
        Self { backend, context }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn load(&self) -> Result<Project, PersistError> {
        self.backend.load(&self.context)
    }

    pub fn save(&self, project: &Project) -> Result<(), PersistError> {
        self.backend.save(&self.context, project)
    }

    pub fn exists(&self) -> Result<bool, PersistError> {
        self.backend.exists(&self.context)
    }

    pub fn delete(&self) -> Result<(), PersistError> {
        self.backend.delete(&self.context)
    }
}
