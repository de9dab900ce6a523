use alloc::string::String;

use crate::cell::NonGenericSchemaCell;
use crate::info::{LeafInfo, SchemaNode, Type, TypePath, Typed};
use crate::registry::{GetTypeMeta, TypeMeta};

macro_rules! impl_leaf {
    ($($ty:ty),* $(,)?) => {$(
        impl TypePath for $ty {
            #[inline]
            fn type_path() -> &'static str {
                stringify!($ty)
            }

            #[inline]
            fn type_name() -> &'static str {
                stringify!($ty)
            }
        }

        impl Typed for $ty {
            fn schema() -> &'static SchemaNode {
                static CELL: NonGenericSchemaCell = NonGenericSchemaCell::new();
                CELL.get_or_init(|| SchemaNode::Leaf(LeafInfo::new::<Self>()))
            }
        }

        impl GetTypeMeta for $ty {
            #[inline]
            fn get_type_meta() -> TypeMeta {
                TypeMeta::of::<Self>()
            }
        }
    )*};
}

impl_leaf!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
);

impl TypePath for String {
    #[inline]
    fn type_path() -> &'static str {
        "alloc::string::String"
    }

    #[inline]
    fn type_name() -> &'static str {
        "String"
    }
}

impl Typed for String {
    fn schema() -> &'static SchemaNode {
        static CELL: NonGenericSchemaCell = NonGenericSchemaCell::new();
        CELL.get_or_init(|| SchemaNode::String(LeafInfo::new::<Self>()))
    }
}

impl GetTypeMeta for String {
    #[inline]
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>()
    }
}

// Names the "no type" value of `Type`; `()` itself is not serializable.
impl TypePath for () {
    #[inline]
    fn type_path() -> &'static str {
        "()"
    }

    #[inline]
    fn type_name() -> &'static str {
        "()"
    }
}

impl TypePath for Type {
    #[inline]
    fn type_path() -> &'static str {
        "dg_schema::Type"
    }

    #[inline]
    fn type_name() -> &'static str {
        "Type"
    }
}

impl Typed for Type {
    fn schema() -> &'static SchemaNode {
        static CELL: NonGenericSchemaCell = NonGenericSchemaCell::new();
        CELL.get_or_init(|| SchemaNode::Leaf(LeafInfo::new::<Self>()))
    }
}

impl GetTypeMeta for Type {
    #[inline]
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use crate::{SchemaKind, Type, TypePath, Typed};

    #[test]
    fn leaf_names() {
        assert_eq!(u64::type_path(), "u64");
        assert_eq!(f32::type_name(), "f32");
        assert_eq!(String::type_name(), "String");
        assert_eq!(Type::type_name(), "Type");
    }

    #[test]
    fn leaf_kinds() {
        assert_eq!(bool::schema().kind(), SchemaKind::Leaf);
        assert_eq!(String::schema().kind(), SchemaKind::String);
        assert_eq!(Type::schema().kind(), SchemaKind::Leaf);
        assert!(i8::schema().ty().is::<i8>());
    }
}
