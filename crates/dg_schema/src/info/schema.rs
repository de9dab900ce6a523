use core::fmt;

use thiserror::Error;

use crate::info::{ArrayInfo, CompositeInfo, LeafInfo, MapInfo};
use crate::info::{OptionalInfo, ReferenceInfo, SequenceInfo, Type};

// -----------------------------------------------------------------------------
// SchemaKind

/// Serialization category of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// Atomic value written as text.
    Leaf,
    /// Text; absent content reads as `""`.
    String,
    /// Named fields, possibly inherited from an embedded base.
    Composite,
    /// Variable length, uniform items.
    Sequence,
    /// Fixed-size or immutable-length items.
    FixedArray,
    /// Key/value pairs.
    Map,
    /// Shared handle to a named entity, written as the entity name.
    EntityReference,
    /// Shared handle whose identity is preserved through the reference table.
    ObjectReference,
    /// Nullable position.
    Optional,
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf => f.pad("Leaf"),
            Self::String => f.pad("String"),
            Self::Composite => f.pad("Composite"),
            Self::Sequence => f.pad("Sequence"),
            Self::FixedArray => f.pad("FixedArray"),
            Self::Map => f.pad("Map"),
            Self::EntityReference => f.pad("EntityReference"),
            Self::ObjectReference => f.pad("ObjectReference"),
            Self::Optional => f.pad("Optional"),
        }
    }
}

/// Returned by the `as_*` casts of [`SchemaNode`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("schema kind mismatch: expected {expected}, received {received}")]
pub struct SchemaKindError {
    pub expected: SchemaKind,
    pub received: SchemaKind,
}

// -----------------------------------------------------------------------------
// SchemaNode

/// Static description of how one type is serialized.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    Leaf(LeafInfo),
    String(LeafInfo),
    Composite(CompositeInfo),
    Sequence(SequenceInfo),
    FixedArray(ArrayInfo),
    Map(MapInfo),
    Reference(ReferenceInfo),
    Optional(OptionalInfo),
}

macro_rules! impl_cast_method {
    ($name:ident : $variant:ident => $kind:ident, $info:ident) => {
        pub fn $name(&self) -> Result<&$info, SchemaKindError> {
            match self {
                Self::$variant(info) => Ok(info),
                _ => Err(SchemaKindError {
                    expected: SchemaKind::$kind,
                    received: self.kind(),
                }),
            }
        }
    };
}

impl SchemaNode {
    impl_cast_method!(as_leaf: Leaf => Leaf, LeafInfo);
    impl_cast_method!(as_composite: Composite => Composite, CompositeInfo);
    impl_cast_method!(as_sequence: Sequence => Sequence, SequenceInfo);
    impl_cast_method!(as_array: FixedArray => FixedArray, ArrayInfo);
    impl_cast_method!(as_map: Map => Map, MapInfo);
    impl_cast_method!(as_optional: Optional => Optional, OptionalInfo);

    /// Returns the reference info for both reference kinds.
    pub fn as_reference(&self) -> Result<&ReferenceInfo, SchemaKindError> {
        match self {
            Self::Reference(info) => Ok(info),
            _ => Err(SchemaKindError {
                expected: SchemaKind::ObjectReference,
                received: self.kind(),
            }),
        }
    }

    pub const fn ty(&self) -> &Type {
        match self {
            Self::Leaf(info) | Self::String(info) => info.ty(),
            Self::Composite(info) => info.ty(),
            Self::Sequence(info) => info.ty(),
            Self::FixedArray(info) => info.ty(),
            Self::Map(info) => info.ty(),
            Self::Reference(info) => info.ty(),
            Self::Optional(info) => info.ty(),
        }
    }

    /// The category of this node.
    ///
    /// A reference is an entity reference when its target is a def type.
    pub fn kind(&self) -> SchemaKind {
        match self {
            Self::Leaf(_) => SchemaKind::Leaf,
            Self::String(_) => SchemaKind::String,
            Self::Composite(_) => SchemaKind::Composite,
            Self::Sequence(_) => SchemaKind::Sequence,
            Self::FixedArray(_) => SchemaKind::FixedArray,
            Self::Map(_) => SchemaKind::Map,
            Self::Reference(info) if info.is_entity() => SchemaKind::EntityReference,
            Self::Reference(_) => SchemaKind::ObjectReference,
            Self::Optional(_) => SchemaKind::Optional,
        }
    }

    /// Strips any number of [`Optional`](Self::Optional) layers.
    pub fn inner(&self) -> &SchemaNode {
        let mut node = self;
        while let Self::Optional(info) = node {
            node = info.inner();
        }
        node
    }

    /// `true` for categories that can hold shared identity in a reference table.
    #[inline]
    pub fn is_identity_bearing(&self) -> bool {
        matches!(self, Self::Composite(_))
    }
}
