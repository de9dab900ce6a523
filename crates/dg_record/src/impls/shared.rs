//! Shared handles: entity references, reference-table entries and inline
//! objects.

use alloc::format;
use alloc::rc::Rc;
use core::cell::RefCell;

use dg_def::{Shared, erase, ptr_key};
use dg_schema::Typed;
use dg_schema::info::CompositeInfo;

use crate::context::WriteMode;
use crate::recordable::{read_body, write_body};
use crate::traits::write_shared;
use crate::xml::Element;
use crate::{ReadContext, Recordable, WriteContext};

/// The composite schema of `T` if it is a def.
fn entity_info<T: Typed>() -> Option<&'static CompositeInfo> {
    T::schema().as_composite().ok().filter(|info| info.is_def())
}

/// Resolves the object a shared position refers to.
///
/// `current` is the object already in the slot; inline content is read into
/// it instead of a new one.
fn read_shared<T: Recordable>(
    current: Option<&Shared<T>>,
    node: &mut Element,
    cx: &mut ReadContext<'_>,
) -> Option<Shared<T>> {
    if let Some(info) = entity_info::<T>() {
        return read_entity::<T>(info, node, cx);
    }

    if let Some(refs) = cx.refs()
        && let Some(id) = node.take_attribute(cx.config().ref_attribute())
    {
        if node.has_children() || node.has_text() {
            cx.error(node, format!("reference `{id}` cannot have content; ignoring it"));
        }
        return match refs.get(&id) {
            Some((handle, type_name)) => match Rc::downcast::<RefCell<T>>(handle.clone()) {
                Ok(handle) => Some(handle),
                Err(_) => {
                    cx.error(
                        node,
                        format!("reference `{id}` is a {type_name}, expected {}", T::type_name()),
                    );
                    None
                }
            },
            None => {
                cx.error(node, format!("unknown reference `{id}`"));
                None
            }
        };
    }

    let handle = match current {
        Some(handle) => handle.clone(),
        None => Rc::new(RefCell::new(T::create())),
    };
    populate_shared(&handle, node, cx);
    Some(handle)
}

/// Looks up the entity named by the text of `node`. Blank text is null.
fn read_entity<T: Recordable>(
    info: &CompositeInfo,
    node: &mut Element,
    cx: &mut ReadContext<'_>,
) -> Option<Shared<T>> {
    if node.has_children() {
        cx.error(
            node,
            format!("a reference to {} is written as a name, not as elements", T::type_name()),
        );
        return None;
    }

    let name = node.text().map(str::trim).unwrap_or("");
    if name.is_empty() {
        return None;
    }

    let root = info.def_root()?;
    let Some(entry) = cx.database().get_erased(root, name) else {
        cx.error(node, format!("unknown {} `{name}`", T::type_name()));
        return None;
    };

    let found = entry.downcast::<T>();
    if found.is_none() {
        let actual = cx
            .registry()
            .get(entry.type_id())
            .map_or("another type", |meta| meta.type_name());
        cx.error(
            node,
            format!("`{name}` is a {actual}, expected {}", T::type_name()),
        );
    }
    found
}

/// Reads `node` into the object behind `handle`.
pub(crate) fn populate_shared<T: Recordable>(
    handle: &Shared<T>,
    node: &mut Element,
    cx: &mut ReadContext<'_>,
) {
    let erased = erase(handle);
    match handle.try_borrow_mut() {
        Ok(mut value) => {
            value.assign_indices(&erased, cx.indices());
            read_body(&mut *value, node, cx);
        }
        Err(_) => cx.error(
            node,
            format!("{} is already being read", T::type_name()),
        ),
    }
}

impl<T: Recordable> Recordable for Shared<T> {
    fn create() -> Self {
        Rc::new(RefCell::new(T::create()))
    }

    /// A failed lookup keeps the current handle.
    fn read(&mut self, node: &mut Element, cx: &mut ReadContext<'_>) {
        let current = self.clone();
        if let Some(handle) = read_shared(Some(&current), node, cx) {
            *self = handle;
        }
    }

    fn read_new(node: &mut Element, cx: &mut ReadContext<'_>) -> Option<Self> {
        read_shared(None, node, cx)
    }

    /// A failed lookup leaves the slot null.
    fn read_optional(slot: &mut Option<Self>, node: &mut Element, cx: &mut ReadContext<'_>) {
        let current = slot.take();
        *slot = read_shared(current.as_ref(), node, cx);
    }

    fn write(&self, node: &mut Element, cx: &mut WriteContext<'_>) {
        if entity_info::<T>().is_some() {
            match cx.database().name_of(self) {
                Some(name) => node.set_text(name),
                None => cx.error(format!("{} is not a registered def", T::type_name())),
            }
            return;
        }

        let ref_attribute = cx.config().ref_attribute();
        match cx.mode_mut() {
            WriteMode::Record(queue) => {
                let id = queue.reserve(erase(self), T::type_path(), write_shared::<T>);
                node.set_attribute(ref_attribute, id);
            }
            WriteMode::Compose { active } => {
                let key = ptr_key(self);
                if !active.insert(key) {
                    cx.error(format!(
                        "{} refers back to itself; inline output cannot hold cycles",
                        T::type_name()
                    ));
                    return;
                }
                match self.try_borrow() {
                    Ok(value) => write_body(&*value, node, cx),
                    Err(_) => cx.error(format!("{} is mutably borrowed", T::type_name())),
                }
                if let WriteMode::Compose { active } = cx.mode_mut() {
                    active.remove(&key);
                }
            }
        }
    }
}
