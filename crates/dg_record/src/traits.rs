use alloc::format;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use dg_def::{ErasedShared, IndexRegistry, Shared};
use dg_schema::registry::FromType;

use crate::impls::populate_shared;
use crate::recordable::write_body;
use crate::xml::Element;
use crate::{ReadContext, Recordable, WriteContext};

/// Type-erased record operations of a registered type.
///
/// Readers only know a shared object's type from its document (a `Ref`
/// class or a def tag), so they go through this table to create, fill and
/// write it.
///
/// # Examples
///
/// ```
/// use dg_record::TypeTraitRecord;
/// use dg_record::__macro_exports::dg_schema::registry::TypeRegistry;
///
/// #[derive(dg_record::Recordable, Default)]
/// struct Node {
///     value: i32,
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Node>();
///
/// let record = registry
///     .get_type_trait::<TypeTraitRecord>(core::any::TypeId::of::<Node>())
///     .unwrap();
/// let stub = record.create_shared();
/// assert!(stub.is::<core::cell::RefCell<Node>>());
/// ```
#[derive(Clone, Copy)]
pub struct TypeTraitRecord {
    create_shared: fn() -> ErasedShared,
    populate: fn(&ErasedShared, &mut Element, &mut ReadContext<'_>),
    write: fn(&ErasedShared, &mut Element, &mut WriteContext<'_>),
    assign_indices: fn(&ErasedShared, &mut IndexRegistry),
}

impl TypeTraitRecord {
    /// A new default object behind an erased handle.
    #[inline]
    pub fn create_shared(&self) -> ErasedShared {
        (self.create_shared)()
    }

    /// Reads `node` into the object behind `handle`, then reports
    /// attributes nobody consumed.
    #[inline]
    pub fn populate(&self, handle: &ErasedShared, node: &mut Element, cx: &mut ReadContext<'_>) {
        (self.populate)(handle, node, cx);
    }

    /// Writes the content of the object behind `handle`.
    #[inline]
    pub fn write(&self, handle: &ErasedShared, node: &mut Element, cx: &mut WriteContext<'_>) {
        (self.write)(handle, node, cx);
    }

    #[inline]
    pub fn assign_indices(&self, handle: &ErasedShared, indices: &mut IndexRegistry) {
        (self.assign_indices)(handle, indices);
    }
}

impl fmt::Debug for TypeTraitRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeTraitRecord").finish_non_exhaustive()
    }
}

impl<T: Recordable> FromType<T> for TypeTraitRecord {
    fn from_type() -> Self {
        Self {
            create_shared: create_shared::<T>,
            populate: populate::<T>,
            write: write_shared::<T>,
            assign_indices: assign_indices::<T>,
        }
    }
}

// -----------------------------------------------------------------------------
// Erased operations

fn downcast<T: Recordable>(handle: &ErasedShared) -> Option<&RefCell<T>> {
    handle.downcast_ref::<RefCell<T>>()
}

fn create_shared<T: Recordable>() -> ErasedShared {
    let handle: Shared<T> = Rc::new(RefCell::new(T::create()));
    handle
}

fn populate<T: Recordable>(handle: &ErasedShared, node: &mut Element, cx: &mut ReadContext<'_>) {
    match Rc::downcast::<RefCell<T>>(handle.clone()) {
        Ok(handle) => populate_shared(&handle, node, cx),
        Err(_) => cx.error(node, format!("object is not a {}", T::type_name())),
    }
    cx.report_unused_attributes(node);
}

/// Writes the content of the object behind `handle`.
pub(crate) fn write_shared<T: Recordable>(
    handle: &ErasedShared,
    node: &mut Element,
    cx: &mut WriteContext<'_>,
) {
    let Some(cell) = downcast::<T>(handle) else {
        cx.error(format!("object is not a {}", T::type_name()));
        return;
    };
    match cell.try_borrow() {
        Ok(value) => write_body(&*value, node, cx),
        Err(_) => cx.error(format!("{} is mutably borrowed", T::type_name())),
    }
}

fn assign_indices<T: Recordable>(handle: &ErasedShared, indices: &mut IndexRegistry) {
    if let Some(cell) = downcast::<T>(handle)
        && let Ok(mut value) = cell.try_borrow_mut()
    {
        value.assign_indices(handle, indices);
    }
}
