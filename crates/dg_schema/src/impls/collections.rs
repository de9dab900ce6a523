use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::vec::Vec;
use std::collections::HashMap;

use crate::cell::{GenericSchemaCell, GenericTypePathCell};
use crate::concat;
use crate::info::{ArrayInfo, MapInfo, SchemaNode, SequenceInfo, TypePath, Typed};
use crate::registry::{GetTypeMeta, TypeMeta, TypeRegistry};

// -----------------------------------------------------------------------------
// Sequence

impl<T: TypePath> TypePath for Vec<T> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["alloc::vec::Vec<", T::type_path(), ">"]))
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["Vec<", T::type_name(), ">"]))
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn schema() -> &'static SchemaNode {
        static CELL: GenericSchemaCell = GenericSchemaCell::new();
        CELL.get_or_insert::<Self>(|| SchemaNode::Sequence(SequenceInfo::new::<Self, T>()))
    }
}

impl<T: GetTypeMeta> GetTypeMeta for Vec<T> {
    #[inline]
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>()
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

// -----------------------------------------------------------------------------
// Fixed arrays

impl<T: TypePath> TypePath for Box<[T]> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["alloc::boxed::Box<[", T::type_path(), "]>"]))
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["Box<[", T::type_name(), "]>"]))
    }
}

impl<T: Typed> Typed for Box<[T]> {
    fn schema() -> &'static SchemaNode {
        static CELL: GenericSchemaCell = GenericSchemaCell::new();
        CELL.get_or_insert::<Self>(|| SchemaNode::FixedArray(ArrayInfo::new::<Self, T>(None)))
    }
}

impl<T: GetTypeMeta> GetTypeMeta for Box<[T]> {
    #[inline]
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>()
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

impl<T: TypePath, const N: usize> TypePath for [T; N] {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| format!("[{}; {N}]", T::type_path()))
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| format!("[{}; {N}]", T::type_name()))
    }
}

impl<T: Typed, const N: usize> Typed for [T; N] {
    fn schema() -> &'static SchemaNode {
        static CELL: GenericSchemaCell = GenericSchemaCell::new();
        CELL.get_or_insert::<Self>(|| SchemaNode::FixedArray(ArrayInfo::new::<Self, T>(Some(N))))
    }
}

impl<T: GetTypeMeta, const N: usize> GetTypeMeta for [T; N] {
    #[inline]
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>()
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

// -----------------------------------------------------------------------------
// Maps

impl<K: TypePath, V: TypePath, S: 'static> TypePath for HashMap<K, V, S> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| {
            concat(&["std::collections::HashMap<", K::type_path(), ", ", V::type_path(), ">"])
        })
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["HashMap<", K::type_name(), ", ", V::type_name(), ">"]))
    }
}

impl<K: Typed, V: Typed, S: 'static> Typed for HashMap<K, V, S> {
    fn schema() -> &'static SchemaNode {
        static CELL: GenericSchemaCell = GenericSchemaCell::new();
        CELL.get_or_insert::<Self>(|| SchemaNode::Map(MapInfo::new::<Self, K, V>()))
    }
}

impl<K: GetTypeMeta, V: GetTypeMeta, S: 'static> GetTypeMeta for HashMap<K, V, S> {
    #[inline]
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>()
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<K>();
        registry.register::<V>();
    }
}

impl<K: TypePath, V: TypePath> TypePath for BTreeMap<K, V> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| {
            concat(&["alloc::collections::BTreeMap<", K::type_path(), ", ", V::type_path(), ">"])
        })
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["BTreeMap<", K::type_name(), ", ", V::type_name(), ">"]))
    }
}

impl<K: Typed, V: Typed> Typed for BTreeMap<K, V> {
    fn schema() -> &'static SchemaNode {
        static CELL: GenericSchemaCell = GenericSchemaCell::new();
        CELL.get_or_insert::<Self>(|| SchemaNode::Map(MapInfo::new::<Self, K, V>()))
    }
}

impl<K: GetTypeMeta, V: GetTypeMeta> GetTypeMeta for BTreeMap<K, V> {
    #[inline]
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>()
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<K>();
        registry.register::<V>();
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::any::TypeId;
    use std::collections::HashMap;

    use crate::{SchemaKind, TypePath, Typed};

    #[test]
    fn generic_names_per_instantiation() {
        assert_eq!(<Vec<i32>>::type_name(), "Vec<i32>");
        assert_eq!(<Vec<String>>::type_name(), "Vec<String>");
        assert_eq!(<Vec<Vec<u8>>>::type_path(), "alloc::vec::Vec<alloc::vec::Vec<u8>>");
        assert_eq!(<[u8; 4]>::type_name(), "[u8; 4]");
        assert_eq!(<HashMap<String, i32>>::type_name(), "HashMap<String, i32>");
    }

    #[test]
    fn collection_kinds() {
        assert_eq!(<Vec<u8>>::schema().kind(), SchemaKind::Sequence);
        assert_eq!(<Box<[u8]>>::schema().kind(), SchemaKind::FixedArray);
        assert_eq!(<[u8; 2]>::schema().as_array().unwrap().len(), Some(2));
        assert_eq!(<BTreeMap<i32, String>>::schema().kind(), SchemaKind::Map);

        let map = <HashMap<String, Vec<i32>>>::schema().as_map().unwrap();
        assert_eq!(map.key_id(), TypeId::of::<String>());
        assert_eq!(map.value().kind(), SchemaKind::Sequence);
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let err = <Vec<u8>>::schema().as_map().unwrap_err();
        assert_eq!(err.expected, SchemaKind::Map);
        assert_eq!(err.received, SchemaKind::Sequence);
    }
}
