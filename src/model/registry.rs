//! Process-wide mapping of classes to their models.
//!
//! The registry is pre-populated with the models of scalar classes.

use super::{builtins, ModelOptions, XmlModel};
use crate::errors::{Error, Result};
use crate::reflect::{Class, ReflectClass};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

static MODELS: LazyLock<RwLock<HashMap<TypeId, Arc<XmlModel>>>> = LazyLock::new(|| {
    let models = builtins::models()
        .into_iter()
        .map(|model| (model.class().id(), model))
        .collect();
    RwLock::new(models)
});

fn read() -> RwLockReadGuard<'static, HashMap<TypeId, Arc<XmlModel>>> {
    MODELS.read().unwrap_or_else(PoisonError::into_inner)
}

fn write() -> RwLockWriteGuard<'static, HashMap<TypeId, Arc<XmlModel>>> {
    MODELS.write().unwrap_or_else(PoisonError::into_inner)
}

/// Creates and registers the model of `T`.
///
/// Fails with [`Error::ModelExists`] if `T` already has a model.
pub fn create<T: ReflectClass>(options: ModelOptions<T>) -> Result<Arc<XmlModel>> {
    let mut models = write();
    if models.contains_key(&TypeId::of::<T>()) {
        return Err(Error::ModelExists(T::NAME));
    }
    let model = XmlModel::detached(options);
    debug!(class = T::NAME, tagname = model.tagname(), "created model");
    models.insert(TypeId::of::<T>(), Arc::clone(&model));
    Ok(model)
}

/// Registers a model built with [`XmlModel::detached`].
///
/// Fails with [`Error::ModelExists`] if its class already has a model.
pub fn register(model: Arc<XmlModel>) -> Result<()> {
    let class = model.class();
    let mut models = write();
    if models.contains_key(&class.id()) {
        return Err(Error::ModelExists(class.name()));
    }
    debug!(class = class.name(), tagname = model.tagname(), "registered model");
    models.insert(class.id(), model);
    Ok(())
}

/// Returns the model of `T`, creating it with `options` if `T` has no model
/// yet. Options are dropped if the model already exists.
pub fn model<T: ReflectClass>(options: ModelOptions<T>) -> Arc<XmlModel> {
    let mut models = write();
    let model = models.entry(TypeId::of::<T>()).or_insert_with(|| {
        let model = XmlModel::detached(options);
        debug!(class = T::NAME, tagname = model.tagname(), "created model");
        model
    });
    Arc::clone(model)
}

/// Returns the model of `T`, without falling back to parent classes.
pub fn find<T: ReflectClass>() -> Option<Arc<XmlModel>> {
    find_by_id(TypeId::of::<T>())
}

/// Returns the model of `T`, or fails with [`Error::ModelNotFound`].
pub fn get<T: ReflectClass>() -> Result<Arc<XmlModel>> {
    find::<T>().ok_or(Error::ModelNotFound(T::NAME))
}

/// Returns the model of a class, without falling back to parent classes.
pub fn find_class(class: &Class) -> Option<Arc<XmlModel>> {
    find_by_id(class.id())
}

/// Returns the model of a class, or fails with [`Error::ModelNotFound`].
pub fn get_class(class: &Class) -> Result<Arc<XmlModel>> {
    find_class(class).ok_or(Error::ModelNotFound(class.name()))
}

pub(crate) fn find_by_id(id: TypeId) -> Option<Arc<XmlModel>> {
    read().get(&id).cloned()
}

/// Returns the model of the closest ancestor of `class` which has one.
pub(crate) fn find_parent(class: &Class) -> Option<Arc<XmlModel>> {
    class.ancestors().find_map(|ancestor| find_class(&ancestor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect_class;

    struct Unregistered;
    reflect_class!(Unregistered {});

    struct Registered;
    reflect_class!(Registered {});

    #[test]
    fn scalars_are_registered() {
        assert!(find::<String>().is_some());
        assert!(find::<bool>().is_some());
        assert!(find::<f64>().is_some());
        assert!(find::<u16>().is_some());
    }

    #[test]
    fn lookup_failure() {
        assert!(find::<Unregistered>().is_none());
        assert!(matches!(
            get::<Unregistered>(),
            Err(Error::ModelNotFound("Unregistered"))
        ));
    }

    #[test]
    fn conflict() {
        let model = create::<Registered>(ModelOptions::new()).unwrap();
        assert!(Arc::ptr_eq(&model, &get::<Registered>().unwrap()));
        assert!(Arc::ptr_eq(&model, &super::model::<Registered>(ModelOptions::new())));

        assert!(matches!(
            create::<Registered>(ModelOptions::new()),
            Err(Error::ModelExists("Registered"))
        ));
        assert!(matches!(
            register(XmlModel::detached::<Registered>(ModelOptions::new())),
            Err(Error::ModelExists("Registered"))
        ));
    }
}
