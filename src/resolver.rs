//! Reference resolution.
//!
//! Turns a reference locator plus the referencing node's location into a
//! canonical store location, or `None` when no target exists. The trait is
//! fully pluggable: any implementation can replace [`StoreResolver`] without
//! touching the builder or the render strategies.

use crate::{
    paths::{dir_of, join_relative},
    properties::{NodeId, Reference},
    store::DocStore,
};

pub trait RefResolver {
    /// Resolve `reference` relative to the node it was found in.
    ///
    /// Pure apart from a read-through existence check against the store.
    fn resolve(&self, store: &dyn DocStore, reference: &Reference, from: &NodeId)
        -> Option<String>;
}

/// Default resolver: relative to the referencing node's own directory, with a
/// leading `/` anchoring the locator at the store root instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct StoreResolver;

impl RefResolver for StoreResolver {
    fn resolve(
        &self,
        store: &dyn DocStore,
        reference: &Reference,
        from: &NodeId,
    ) -> Option<String> {
        let candidate = join_relative(dir_of(from.as_str()), &reference.locator);
        if store.exists(&candidate) {
            Some(candidate)
        } else {
            tracing::debug!(
                "Reference '{}' from '{}' resolved to '{}', which does not exist",
                reference.locator,
                from,
                candidate
            );
            None
        }
    }
}
