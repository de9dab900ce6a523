use alloc::rc::Rc;
use core::cell::RefCell;

use crate::cell::{GenericSchemaCell, GenericTypePathCell};
use crate::info::{ReferenceInfo, SchemaNode, TypePath, Typed};
use crate::registry::{GetTypeMeta, TypeMeta, TypeRegistry};

// `Rc<RefCell<T>>` is the shared handle of the object graph. Its short name
// follows the `Shared<T>` alias exported by `dg_def`.

impl<T: TypePath> TypePath for Rc<RefCell<T>> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| {
            crate::concat(&["alloc::rc::Rc<core::cell::RefCell<", T::type_path(), ">>"])
        })
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| crate::concat(&["Shared<", T::type_name(), ">"]))
    }
}

impl<T: Typed> Typed for Rc<RefCell<T>> {
    fn schema() -> &'static SchemaNode {
        static CELL: GenericSchemaCell = GenericSchemaCell::new();
        CELL.get_or_insert::<Self>(|| SchemaNode::Reference(ReferenceInfo::new::<Self, T>()))
    }
}

impl<T: GetTypeMeta> GetTypeMeta for Rc<RefCell<T>> {
    #[inline]
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>()
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::any::TypeId;
    use core::cell::RefCell;

    use crate::cell::NonGenericSchemaCell;
    use crate::info::{CompositeInfo, FieldDescriptor};
    use crate::{SchemaKind, SchemaNode, TypePath, Typed};

    // A def type and a plain composite that reference each other.
    struct Item;
    struct Node;

    impl TypePath for Item {
        fn type_path() -> &'static str {
            "tests::Item"
        }
        fn type_name() -> &'static str {
            "Item"
        }
    }

    impl Typed for Item {
        fn schema() -> &'static SchemaNode {
            static CELL: NonGenericSchemaCell = NonGenericSchemaCell::new();
            CELL.get_or_init(|| {
                SchemaNode::Composite(
                    CompositeInfo::new::<Self>(&[FieldDescriptor::new::<Option<Rc<RefCell<Node>>>>(
                        "node",
                    )])
                    .with_def_root(TypeId::of::<Self>),
                )
            })
        }
    }

    impl TypePath for Node {
        fn type_path() -> &'static str {
            "tests::Node"
        }
        fn type_name() -> &'static str {
            "Node"
        }
    }

    impl Typed for Node {
        fn schema() -> &'static SchemaNode {
            static CELL: NonGenericSchemaCell = NonGenericSchemaCell::new();
            CELL.get_or_init(|| {
                SchemaNode::Composite(CompositeInfo::new::<Self>(&[
                    FieldDescriptor::new::<Option<Rc<RefCell<Node>>>>("next"),
                    FieldDescriptor::new::<Rc<RefCell<Item>>>("item"),
                ]))
            })
        }
    }

    #[test]
    fn reference_kinds() {
        assert_eq!(<Rc<RefCell<Item>>>::schema().kind(), SchemaKind::EntityReference);
        assert_eq!(<Rc<RefCell<Node>>>::schema().kind(), SchemaKind::ObjectReference);
        assert_eq!(<Rc<RefCell<Node>>>::type_name(), "Shared<Node>");
    }

    #[test]
    fn recursive_schema_is_lazy() {
        let node = Node::schema().as_composite().unwrap();
        let next = node.field("next").unwrap().schema();
        assert_eq!(next.kind(), SchemaKind::Optional);
        assert_eq!(next.inner().kind(), SchemaKind::ObjectReference);
        assert_eq!(node.field("item").unwrap().schema().kind(), SchemaKind::EntityReference);
        assert_eq!(node.field("item").unwrap().owner(), "Node");
    }
}
