use std::{
    cell::RefCell,
    marker::PhantomData,
    sync::Arc,
};

use ahash::HashMap;
use anyhow::Result;
use apogee_data::{
    DataStore,
    Id,
};

use crate::error::{
    WrapOptionError,
    WrapResultError,
};

/// How a single kind of resource is read from a [`DataStore`].
pub trait ResourceLookup {
    type Data;

    /// Name of the resource kind, for errors.
    const KIND: &'static str;

    /// Looks up a resource by its canonical ID.
    fn lookup(data: &dyn DataStore, id: &Id) -> Result<Option<Self::Data>>;
}

/// A collection of resources of one kind, indexed by ID.
///
/// Aliases are resolved before lookup. Each resource is read from the data store at most once.
pub struct ResourceDex<'d, L>
where
    L: ResourceLookup,
{
    data: &'d dyn DataStore,
    cache: RefCell<HashMap<Id, Arc<L::Data>>>,
    _lookup: PhantomData<L>,
}

impl<'d, L> ResourceDex<'d, L>
where
    L: ResourceLookup,
{
    pub fn new(data: &'d dyn DataStore) -> Self {
        Self {
            data,
            cache: RefCell::new(HashMap::default()),
            _lookup: PhantomData,
        }
    }

    fn resolve_alias(&self, id: Id) -> Result<Id> {
        Ok(self
            .data
            .translate_alias(&id)
            .wrap_error_with_format(format_args!("failed to translate alias {id}"))?
            .unwrap_or(id))
    }

    /// Retrieves a resource by name or ID.
    pub fn get(&self, name: &str) -> Result<Arc<L::Data>> {
        self.get_by_id(&Id::from(name))
    }

    /// Retrieves a resource by ID.
    pub fn get_by_id(&self, id: &Id) -> Result<Arc<L::Data>> {
        if let Some(data) = self.cache.borrow().get(id) {
            return Ok(data.clone());
        }
        let real_id = self.resolve_alias(id.clone())?;
        let data = L::lookup(self.data, &real_id)
            .wrap_error_with_format(format_args!("failed to read {} {id}", L::KIND))?
            .wrap_not_found_error_with_format(format_args!("{} {id}", L::KIND))?;
        let data = Arc::new(data);
        self.cache.borrow_mut().insert(id.clone(), data.clone());
        Ok(data)
    }

    /// Checks if the resource exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }
}

impl<'d, L> Clone for ResourceDex<'d, L>
where
    L: ResourceLookup,
{
    fn clone(&self) -> Self {
        Self {
            data: self.data,
            cache: RefCell::new(self.cache.borrow().clone()),
            _lookup: PhantomData,
        }
    }
}
