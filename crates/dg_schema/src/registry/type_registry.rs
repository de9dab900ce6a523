use alloc::string::String;
use core::any::TypeId;

use dg_utils::TypeIdMap;
use dg_utils::hash::{HashMap, HashSet};

use crate::info::{SchemaNode, Type, Typed};
use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeTrait};

// -----------------------------------------------------------------------------
// TypeRegistry

/// Storage of [`TypeMeta`], indexed by [`TypeId`], full path and short name.
///
/// Short names are how documents spell types (`<SwordDef defName="..."/>`).
/// When two registered types share a short name the name becomes ambiguous
/// and only the full path resolves.
///
/// # Examples
///
/// ```
/// use dg_schema::registry::TypeRegistry;
///
/// let registry = TypeRegistry::new();
///
/// let meta = registry.get_with_type_name("i32").unwrap();
/// assert_eq!(meta.type_path(), "i32");
/// ```
pub struct TypeRegistry {
    type_meta_table: TypeIdMap<TypeMeta>,
    type_path_to_id: HashMap<&'static str, TypeId>,
    type_name_to_id: HashMap<&'static str, TypeId>,
    ambiguous_names: HashSet<&'static str>,
}

impl Default for TypeRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry without any type.
    #[inline]
    pub fn empty() -> Self {
        Self {
            type_meta_table: TypeIdMap::new(),
            type_path_to_id: HashMap::default(),
            type_name_to_id: HashMap::default(),
            ambiguous_names: HashSet::default(),
        }
    }

    /// Creates a registry holding the built-in leaf types.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register::<bool>();
        registry.register::<char>();
        registry.register::<u8>();
        registry.register::<u16>();
        registry.register::<u32>();
        registry.register::<u64>();
        registry.register::<u128>();
        registry.register::<usize>();
        registry.register::<i8>();
        registry.register::<i16>();
        registry.register::<i32>();
        registry.register::<i64>();
        registry.register::<i128>();
        registry.register::<isize>();
        registry.register::<f32>();
        registry.register::<f64>();
        registry.register::<String>();
        registry.register::<Type>();
        registry
    }

    // The type must not be registered yet.
    fn add_new_type_indices(
        type_meta: &TypeMeta,
        type_path_to_id: &mut HashMap<&'static str, TypeId>,
        type_name_to_id: &mut HashMap<&'static str, TypeId>,
        ambiguous_names: &mut HashSet<&'static str>,
    ) {
        let ty = type_meta.ty();
        let type_name = ty.name();

        if !ambiguous_names.contains(type_name) {
            if type_name_to_id.contains_key(type_name) {
                type_name_to_id.remove(type_name);
                ambiguous_names.insert(type_name);
            } else {
                type_name_to_id.insert(type_name, ty.id());
            }
        }

        type_path_to_id.insert(ty.path(), ty.id());
    }

    // Returns `true` if the type was not registered before.
    fn register_internal(
        &mut self,
        type_id: TypeId,
        get_type_meta: impl FnOnce() -> TypeMeta,
    ) -> bool {
        self.type_meta_table.try_insert(type_id, || {
            let meta = get_type_meta();
            Self::add_new_type_indices(
                &meta,
                &mut self.type_path_to_id,
                &mut self.type_name_to_id,
                &mut self.ambiguous_names,
            );
            meta
        })
    }

    /// Registers `T` and, the first time, everything it depends on.
    pub fn register<T: GetTypeMeta>(&mut self) {
        if self.register_internal(TypeId::of::<T>(), T::get_type_meta) {
            T::register_dependencies(self);
        }
    }

    /// Registers every type submitted with `#[record(auto_register)]`.
    ///
    /// Returns `false` if the feature is disabled or the platform does not
    /// support static collection.
    pub fn auto_register(&mut self) -> bool {
        crate::__macro_exports::auto_register::register_submitted(self)
    }

    /// Adds the capability `D` to the already registered type `T`.
    ///
    /// Returns `false` if `T` is not registered.
    pub fn register_type_trait<T: Typed, D: TypeTrait + FromType<T>>(&mut self) -> bool {
        match self.type_meta_table.get_mut(&TypeId::of::<T>()) {
            Some(type_meta) => {
                type_meta.insert_trait(D::from_type());
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.type_meta_table.contains(&type_id)
    }

    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&TypeMeta> {
        self.type_meta_table.get(&type_id)
    }

    pub fn get_with_type_path(&self, type_path: &str) -> Option<&TypeMeta> {
        match self.type_path_to_id.get(type_path) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Looks up a short name. Ambiguous names resolve to nothing.
    pub fn get_with_type_name(&self, type_name: &str) -> Option<&TypeMeta> {
        match self.type_name_to_id.get(type_name) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Looks up a full path first, then a short name.
    pub fn resolve(&self, name: &str) -> Option<&TypeMeta> {
        self.get_with_type_path(name)
            .or_else(|| self.get_with_type_name(name))
    }

    pub fn is_ambiguous(&self, type_name: &str) -> bool {
        self.ambiguous_names.contains(type_name)
    }

    pub fn get_type_trait<T: TypeTrait>(&self, type_id: TypeId) -> Option<&T> {
        match self.get(type_id) {
            Some(type_meta) => type_meta.get_trait::<T>(),
            None => None,
        }
    }

    pub fn get_schema(&self, type_id: TypeId) -> Option<&'static SchemaNode> {
        self.get(type_id).map(TypeMeta::schema)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.type_meta_table.len()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TypeMeta> {
        self.type_meta_table.values()
    }

    pub fn iter_with_trait<T: TypeTrait>(&self) -> impl Iterator<Item = (&TypeMeta, &T)> {
        self.type_meta_table
            .values()
            .filter_map(|item| item.get_trait::<T>().map(|t| (item, t)))
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::any::TypeId;

    use crate::registry::{FromType, TypeRegistry};
    use crate::{SchemaKind, Typed};

    #[derive(Clone)]
    struct Marker(&'static str);

    impl<T: Typed> FromType<T> for Marker {
        fn from_type() -> Self {
            Marker(T::type_name())
        }
    }

    #[test]
    fn builtin_leaves() {
        let registry = TypeRegistry::new();
        let meta = registry.get_with_type_name("f64").unwrap();
        assert_eq!(meta.schema().kind(), SchemaKind::Leaf);
        let meta = registry.get_with_type_path("alloc::string::String").unwrap();
        assert_eq!(meta.schema().kind(), SchemaKind::String);
        assert!(registry.resolve("String").is_some());
    }

    #[test]
    fn dependencies_registered_once() {
        let mut registry = TypeRegistry::empty();
        registry.register::<Vec<Vec<u8>>>();
        let before = registry.len();
        registry.register::<Vec<u8>>();
        assert_eq!(registry.len(), before);
        assert!(registry.contains(TypeId::of::<u8>()));
    }

    #[test]
    fn type_trait_attach() {
        let mut registry = TypeRegistry::new();
        assert!(registry.register_type_trait::<u8, Marker>());
        assert!(!registry.register_type_trait::<Vec<String>, Marker>());
        let marker = registry.get_type_trait::<Marker>(TypeId::of::<u8>()).unwrap();
        assert_eq!(marker.0, "u8");
        assert_eq!(registry.iter_with_trait::<Marker>().count(), 1);
    }
}
