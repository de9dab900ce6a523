use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::TypeId;

use crate::info::{SchemaNode, Type, TypePath, Typed};

// -----------------------------------------------------------------------------
// FieldDescriptor

/// One serialized field of a composite.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    name: &'static str,
    ty_id: TypeId,
    schema: fn() -> &'static SchemaNode,
    // Short name of the declaring type, filled by `CompositeInfo::new`.
    owner: &'static str,
}

impl FieldDescriptor {
    #[inline]
    pub fn new<T: Typed>(name: &'static str) -> Self {
        Self {
            name,
            ty_id: TypeId::of::<T>(),
            schema: T::schema,
            owner: "",
        }
    }

    /// Element label of the field.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn ty_id(&self) -> TypeId {
        self.ty_id
    }

    #[inline]
    pub fn type_is<T: 'static>(&self) -> bool {
        self.ty_id == TypeId::of::<T>()
    }

    #[inline]
    pub fn schema(&self) -> &'static SchemaNode {
        (self.schema)()
    }

    /// Short name of the type declaring this field.
    #[inline]
    pub const fn owner(&self) -> &'static str {
        self.owner
    }
}

// -----------------------------------------------------------------------------
// BaseInfo

/// The embedded base of a composite, whose fields are inherited.
#[derive(Clone, Debug)]
pub struct BaseInfo {
    field: &'static str,
    ty_id: TypeId,
    schema: fn() -> &'static SchemaNode,
}

impl BaseInfo {
    /// Rust field holding the base value. It never appears in documents.
    #[inline]
    pub const fn field(&self) -> &'static str {
        self.field
    }

    #[inline]
    pub const fn ty_id(&self) -> TypeId {
        self.ty_id
    }

    #[inline]
    pub fn schema(&self) -> &'static SchemaNode {
        (self.schema)()
    }

    /// `None` if the base is not a composite, which the derive rejects.
    #[inline]
    pub fn composite(&self) -> Option<&'static CompositeInfo> {
        self.schema().as_composite().ok()
    }
}

// -----------------------------------------------------------------------------
// FieldConflict

/// A field label declared both by a type and by one of its bases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldConflict {
    pub name: &'static str,
    /// The most-derived declaring type; its declaration wins.
    pub derived: &'static str,
    /// The shadowed declaration.
    pub base: &'static str,
}

// -----------------------------------------------------------------------------
// CompositeInfo

/// Schema of a composite type.
///
/// Own fields come first in declaration order; inherited fields are reached
/// through [`base`](Self::base).
///
/// # Examples
///
/// ```
/// use dg_schema::info::{CompositeInfo, FieldDescriptor};
///
/// struct Base;
/// # impl dg_schema::TypePath for Base {
/// #     fn type_path() -> &'static str { "demo::Base" }
/// #     fn type_name() -> &'static str { "Base" }
/// # }
///
/// let info = CompositeInfo::new::<Base>(&[FieldDescriptor::new::<i32>("value")]);
///
/// assert_eq!(info.field("value").unwrap().owner(), "Base");
/// assert!(info.conflicts().is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct CompositeInfo {
    ty: Type,
    fields: Box<[FieldDescriptor]>,
    base: Option<BaseInfo>,
    def_root: Option<fn() -> TypeId>,
    index_fields: Box<[&'static str]>,
}

impl CompositeInfo {
    pub fn new<T: TypePath + ?Sized>(fields: &[FieldDescriptor]) -> Self {
        let owner = T::type_name();
        let fields = fields
            .iter()
            .map(|field| FieldDescriptor {
                owner,
                ..field.clone()
            })
            .collect();

        Self {
            ty: Type::of::<T>(),
            fields,
            base: None,
            def_root: None,
            index_fields: Box::new([]),
        }
    }

    /// Declares `field` as an embedded base of type `B`.
    pub fn with_base<B: Typed>(mut self, field: &'static str) -> Self {
        self.base = Some(BaseInfo {
            field,
            ty_id: TypeId::of::<B>(),
            schema: B::schema,
        });
        self
    }

    /// Marks the type as a def. `root` names the database scope.
    pub fn with_def_root(mut self, root: fn() -> TypeId) -> Self {
        self.def_root = Some(root);
        self
    }

    /// Names the fields receiving this type's instance index.
    pub fn with_index_fields(mut self, names: &[&'static str]) -> Self {
        self.index_fields = names.into();
        self
    }

    #[inline(always)]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Fields declared by this type, excluding inherited ones.
    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[inline]
    pub fn base(&self) -> Option<&BaseInfo> {
        self.base.as_ref()
    }

    #[inline]
    pub fn is_def(&self) -> bool {
        self.def_root.is_some()
    }

    /// Database scope of a def type.
    #[inline]
    pub fn def_root(&self) -> Option<TypeId> {
        self.def_root.map(|root| root())
    }

    #[inline]
    pub fn index_fields(&self) -> &[&'static str] {
        &self.index_fields
    }

    /// This type followed by each base, most derived first.
    pub fn ancestors(&self) -> impl Iterator<Item = &CompositeInfo> {
        core::iter::successors(Some(self), |info| {
            info.base().and_then(BaseInfo::composite)
        })
    }

    /// Finds a field by label, preferring the most-derived declaration.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.ancestors()
            .find_map(|info| info.fields.iter().find(|field| field.name == name))
    }

    /// Every visible field, most derived first. Shadowed fields are omitted.
    pub fn all_fields(&self) -> Vec<&FieldDescriptor> {
        let mut fields: Vec<&FieldDescriptor> = Vec::new();
        for info in self.ancestors() {
            for field in info.fields.iter() {
                if !fields.iter().any(|seen| seen.name == field.name) {
                    fields.push(field);
                }
            }
        }
        fields
    }

    /// Labels declared more than once along the base chain.
    pub fn conflicts(&self) -> Vec<FieldConflict> {
        let mut seen: Vec<&FieldDescriptor> = Vec::new();
        let mut conflicts = Vec::new();
        for info in self.ancestors() {
            for field in info.fields.iter() {
                match seen.iter().find(|prev| prev.name == field.name) {
                    Some(prev) => conflicts.push(FieldConflict {
                        name: field.name,
                        derived: prev.owner,
                        base: field.owner,
                    }),
                    None => seen.push(field),
                }
            }
        }
        conflicts
    }
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;

    use crate::cell::NonGenericSchemaCell;
    use crate::info::{CompositeInfo, FieldConflict, FieldDescriptor};
    use crate::{SchemaNode, TypePath, Typed};

    macro_rules! composite {
        ($ty:ident, $name:literal, $build:expr) => {
            struct $ty;

            impl TypePath for $ty {
                fn type_path() -> &'static str {
                    concat!("tests::", $name)
                }
                fn type_name() -> &'static str {
                    $name
                }
            }

            impl Typed for $ty {
                fn schema() -> &'static SchemaNode {
                    static CELL: NonGenericSchemaCell = NonGenericSchemaCell::new();
                    CELL.get_or_init(|| SchemaNode::Composite($build))
                }
            }
        };
    }

    composite!(Root, "Root", {
        CompositeInfo::new::<Root>(&[
            FieldDescriptor::new::<i32>("value"),
            FieldDescriptor::new::<i32>("rootOnly"),
        ])
        .with_def_root(TypeId::of::<Root>)
    });

    composite!(Middle, "Middle", {
        CompositeInfo::new::<Middle>(&[FieldDescriptor::new::<i32>("middleOnly")])
            .with_base::<Root>("base")
            .with_def_root(TypeId::of::<Root>)
    });

    composite!(Leaf, "Leaf", {
        CompositeInfo::new::<Leaf>(&[FieldDescriptor::new::<i32>("value")])
            .with_base::<Middle>("base")
            .with_def_root(TypeId::of::<Root>)
    });

    #[test]
    fn deep_hierarchy_lookup() {
        let info = Leaf::schema().as_composite().unwrap();
        assert_eq!(info.ancestors().count(), 3);
        assert_eq!(info.field("rootOnly").unwrap().owner(), "Root");
        assert_eq!(info.field("middleOnly").unwrap().owner(), "Middle");
        assert_eq!(info.def_root(), Some(TypeId::of::<Root>()));
    }

    #[test]
    fn shadowed_field_prefers_derived() {
        let info = Leaf::schema().as_composite().unwrap();
        assert_eq!(info.field("value").unwrap().owner(), "Leaf");

        let names: Vec<_> = info.all_fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["value", "middleOnly", "rootOnly"]);

        assert_eq!(
            info.conflicts(),
            [FieldConflict {
                name: "value",
                derived: "Leaf",
                base: "Root",
            }]
        );
        assert!(Middle::schema().as_composite().unwrap().conflicts().is_empty());
    }
}
