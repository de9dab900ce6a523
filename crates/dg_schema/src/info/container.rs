use core::any::TypeId;

use crate::info::{SchemaNode, Type, TypePath, Typed};

// -----------------------------------------------------------------------------
// SequenceInfo

/// Schema of a growable sequence such as `Vec<T>`.
#[derive(Debug, Clone)]
pub struct SequenceInfo {
    ty: Type,
    item_id: TypeId,
    item: fn() -> &'static SchemaNode,
}

impl SequenceInfo {
    #[inline]
    pub fn new<T: TypePath + ?Sized, Item: Typed>() -> Self {
        Self {
            ty: Type::of::<T>(),
            item_id: TypeId::of::<Item>(),
            item: Item::schema,
        }
    }

    #[inline(always)]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub const fn item_id(&self) -> TypeId {
        self.item_id
    }

    #[inline]
    pub fn item(&self) -> &'static SchemaNode {
        (self.item)()
    }
}

// -----------------------------------------------------------------------------
// ArrayInfo

/// Schema of a fixed array: `[T; N]` (`len` is `Some(N)`) or `Box<[T]>`.
#[derive(Debug, Clone)]
pub struct ArrayInfo {
    ty: Type,
    item_id: TypeId,
    item: fn() -> &'static SchemaNode,
    len: Option<usize>,
}

impl ArrayInfo {
    #[inline]
    pub fn new<T: TypePath + ?Sized, Item: Typed>(len: Option<usize>) -> Self {
        Self {
            ty: Type::of::<T>(),
            item_id: TypeId::of::<Item>(),
            item: Item::schema,
            len,
        }
    }

    #[inline(always)]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub const fn item_id(&self) -> TypeId {
        self.item_id
    }

    #[inline]
    pub fn item(&self) -> &'static SchemaNode {
        (self.item)()
    }

    #[inline]
    pub const fn len(&self) -> Option<usize> {
        self.len
    }
}

// -----------------------------------------------------------------------------
// MapInfo

/// Schema of a key/value map.
#[derive(Debug, Clone)]
pub struct MapInfo {
    ty: Type,
    key_id: TypeId,
    key: fn() -> &'static SchemaNode,
    value_id: TypeId,
    value: fn() -> &'static SchemaNode,
}

impl MapInfo {
    #[inline]
    pub fn new<T: TypePath + ?Sized, K: Typed, V: Typed>() -> Self {
        Self {
            ty: Type::of::<T>(),
            key_id: TypeId::of::<K>(),
            key: K::schema,
            value_id: TypeId::of::<V>(),
            value: V::schema,
        }
    }

    #[inline(always)]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub const fn key_id(&self) -> TypeId {
        self.key_id
    }

    #[inline]
    pub fn key(&self) -> &'static SchemaNode {
        (self.key)()
    }

    #[inline]
    pub const fn value_id(&self) -> TypeId {
        self.value_id
    }

    #[inline]
    pub fn value(&self) -> &'static SchemaNode {
        (self.value)()
    }
}

// -----------------------------------------------------------------------------
// OptionalInfo

/// Schema of a nullable position, `Option<T>`.
#[derive(Debug, Clone)]
pub struct OptionalInfo {
    ty: Type,
    inner_id: TypeId,
    inner: fn() -> &'static SchemaNode,
}

impl OptionalInfo {
    #[inline]
    pub fn new<T: TypePath + ?Sized, Inner: Typed>() -> Self {
        Self {
            ty: Type::of::<T>(),
            inner_id: TypeId::of::<Inner>(),
            inner: Inner::schema,
        }
    }

    #[inline(always)]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub const fn inner_id(&self) -> TypeId {
        self.inner_id
    }

    #[inline]
    pub fn inner(&self) -> &'static SchemaNode {
        (self.inner)()
    }
}
