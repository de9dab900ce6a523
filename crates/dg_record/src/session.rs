use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::TypeId;
use core::cell::RefCell;
use core::fmt;

use dg_def::{Database, Def, ErasedShared, IndexRegistry, Shared, erase};
use dg_schema::registry::{GetTypeMeta, TypeRegistry};
use dg_utils::hash::HashSet;

use crate::xml::Element;
use crate::{Config, Converter, ConverterRegistry, DiagnosticSink, Diagnostics, Location};
use crate::{ReadContext, Recordable, TypeTraitRecord};

// -----------------------------------------------------------------------------
// Phase

/// Where a session is in the def loading protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing was added since creation or the last reset.
    Uninitialized,
    /// Documents are being added.
    Accumulating,
    /// `finish` is populating the added defs.
    Processing,
    /// Every def is populated; no more documents may be added.
    Finished,
}

/// A def registered by `add_*`, populated by `finish`.
pub(crate) struct PendingDef {
    pub handle: ErasedShared,
    pub record: TypeTraitRecord,
    pub element: Element,
    pub source: Option<String>,
}

// -----------------------------------------------------------------------------
// Session

/// Owns everything needed to load, save and look up an object graph.
///
/// A session holds the type registry, the converters, the def database, the
/// index registry and the diagnostic channel. Problems in documents never
/// stop a load; they are reported to the diagnostics and the affected value
/// falls back to a documented default.
///
/// # Documents
///
/// Defs are loaded from documents rooted at `Defs`; each child is one def,
/// tagged with the short name of its type and named by `defName`:
///
/// ```xml
/// <Defs>
///   <ItemDef defName="Sword">
///     <damage>12</damage>
///   </ItemDef>
/// </Defs>
/// ```
///
/// A single value with shared objects is stored as a record:
///
/// ```xml
/// <Record>
///   <recordFormatVersion>1</recordFormatVersion>
///   <refs>
///     <Ref id="ref00" class="game::Node"><next ref="ref00"/></Ref>
///   </refs>
///   <data ref="ref00"/>
/// </Record>
/// ```
///
/// Every tag and attribute name can be changed through [`Config`].
pub struct Session {
    pub(crate) config: Config,
    pub(crate) registry: TypeRegistry,
    pub(crate) converters: ConverterRegistry,
    pub(crate) database: Database,
    pub(crate) indices: IndexRegistry,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) phase: Phase,
    pub(crate) pending: Vec<PendingDef>,
    checked: HashSet<TypeId>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.phase)
            .field("defs", &self.database.len())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a session with custom tag names.
    ///
    /// Types submitted with `#[record(auto_register)]` are registered right
    /// away when the `auto_register` feature is enabled.
    pub fn with_config(config: Config) -> Self {
        let mut registry = TypeRegistry::new();
        if registry.auto_register() {
            log::debug!("auto registration collected {} types", registry.len());
        }

        let mut session = Self {
            config,
            registry,
            converters: ConverterRegistry::new(),
            database: Database::new(),
            indices: IndexRegistry::new(),
            diagnostics: Diagnostics::new(),
            phase: Phase::Uninitialized,
            pending: Vec::new(),
            checked: HashSet::default(),
        };
        session.check_registered_types();
        session
    }

    /// Forgets every def, index and pending document.
    ///
    /// Registered types, converters, the sink and the diagnostic history are
    /// kept.
    pub fn reset(&mut self) {
        self.database.clear();
        self.indices.clear();
        self.pending.clear();
        self.phase = Phase::Uninitialized;
    }

    // -------------------------------------------------------------------------
    // Registration

    /// Registers `T` and the types it is built from.
    ///
    /// Field labels declared both by a composite and by one of its bases, and
    /// composites with more than one index field, are reported as errors.
    pub fn register<T: GetTypeMeta>(&mut self) {
        self.registry.register::<T>();
        self.check_registered_types();
    }

    pub(crate) fn ensure_registered<T: GetTypeMeta>(&mut self) {
        if !self.registry.contains(TypeId::of::<T>()) {
            self.register::<T>();
        }
    }

    // Reports schema problems of types not seen before.
    fn check_registered_types(&mut self) {
        for meta in self.registry.iter() {
            if !self.checked.insert(meta.type_id()) {
                continue;
            }
            let Ok(info) = meta.schema().as_composite() else {
                continue;
            };

            for conflict in info.conflicts() {
                self.diagnostics.error(
                    format!(
                        "field `{}` of {} shadows the one of {}",
                        conflict.name, conflict.derived, conflict.base
                    ),
                    Location::default(),
                );
            }
            if info.index_fields().len() > 1 {
                self.diagnostics.error(
                    format!(
                        "{} has {} index fields; all of them receive the same index",
                        meta.type_name(),
                        info.index_fields().len()
                    ),
                    Location::default(),
                );
            }
        }
    }

    /// Registers every claim of `converter`, reporting rejected ones.
    pub fn register_converter(&mut self, converter: Converter) {
        for error in self.converters.register(converter) {
            self.diagnostics.error(format!("{error}"), Location::default());
        }
    }

    // -------------------------------------------------------------------------
    // Accessors

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[inline]
    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    #[inline]
    pub fn database(&self) -> &Database {
        &self.database
    }

    #[inline]
    pub fn indices(&self) -> &IndexRegistry {
        &self.indices
    }

    #[inline]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    #[inline]
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn set_sink(&mut self, sink: impl DiagnosticSink + 'static) {
        self.diagnostics.set_sink(sink);
    }

    // -------------------------------------------------------------------------
    // Defs

    /// Creates and registers a default def named `name`.
    ///
    /// Returns `None` after reporting an invalid or taken name.
    pub fn create<T: Recordable + Def + GetTypeMeta>(&mut self, name: &str) -> Option<Shared<T>> {
        self.ensure_registered::<T>();

        let handle = Rc::new(RefCell::new(T::create()));
        if let Err(err) = self.database.insert(name, handle.clone()) {
            self.diagnostics.error(format!("{err}"), Location::default());
            return None;
        }
        handle
            .borrow_mut()
            .assign_indices(&erase(&handle), &mut self.indices);
        Some(handle)
    }

    /// Removes a def from the database. Its indices stay taken.
    ///
    /// Returns `false` after reporting a def that is not registered.
    pub fn delete<T: ?Sized>(&mut self, handle: &Rc<T>) -> bool {
        match self.database.delete(handle) {
            Ok(_) => true,
            Err(err) => {
                self.diagnostics.error(format!("{err}"), Location::default());
                false
            }
        }
    }

    /// Gives a def a new name.
    ///
    /// Returns `false` after reporting an invalid or taken name or a def that
    /// is not registered.
    pub fn rename<T: ?Sized>(&mut self, handle: &Rc<T>, name: &str) -> bool {
        match self.database.rename(handle, name) {
            Ok(()) => true,
            Err(err) => {
                self.diagnostics.error(format!("{err}"), Location::default());
                false
            }
        }
    }

    /// Builds a read context over the session. Document parsing and record
    /// reading go through this.
    pub(crate) fn read_context<'s>(
        &'s mut self,
        refs: Option<&'s crate::context::RefTable>,
        source: Option<&'s str>,
    ) -> ReadContext<'s> {
        ReadContext::new(
            &self.config,
            &self.registry,
            &self.converters,
            &self.database,
            &mut self.indices,
            &mut self.diagnostics,
            refs,
            source,
        )
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::RefCell;

    use crate::{Recordable, Session};

    #[derive(Recordable, Default)]
    #[record(def)]
    struct CreatureDef {
        health: i32,
        #[record(index)]
        index: usize,
    }

    #[test]
    fn creation() {
        let mut session = Session::new();
        let wolf = session.create::<CreatureDef>("Wolf").unwrap();
        wolf.borrow_mut().health = 30;

        let found = session.database().get::<CreatureDef>("Wolf").unwrap();
        assert!(Rc::ptr_eq(&wolf, &found));
        assert_eq!(found.borrow().health, 30);
        assert_eq!(wolf.borrow().index, 0);
    }

    #[test]
    fn multi_creation_assigns_dense_indices() {
        let mut session = Session::new();
        let first = session.create::<CreatureDef>("First").unwrap();
        let second = session.create::<CreatureDef>("Second").unwrap();
        assert_eq!(first.borrow().index, 0);
        assert_eq!(second.borrow().index, 1);
        assert!(Rc::ptr_eq(&session.indices().get::<CreatureDef>(1).unwrap(), &second));

        assert!(session.create::<CreatureDef>("First").is_none());
        assert!(session.create::<CreatureDef>("9lives").is_none());
        assert_eq!(session.diagnostics().error_count(), 2);
    }

    #[test]
    fn delete_and_rename() {
        let mut session = Session::new();
        let wolf = session.create::<CreatureDef>("Wolf").unwrap();

        assert!(session.rename(&wolf, "Warg"));
        assert!(session.database().get::<CreatureDef>("Wolf").is_none());
        assert!(session.database().get::<CreatureDef>("Warg").is_some());

        assert!(session.delete(&wolf));
        assert!(!session.delete(&wolf));
        assert!(!session.rename(&wolf, "Wolf"));
        assert_eq!(session.diagnostics().error_count(), 2);

        let again = session.create::<CreatureDef>("Warg").unwrap();
        assert_eq!(again.borrow().index, 1);
    }

    #[test]
    fn reset_keeps_registrations() {
        let mut session = Session::new();
        session.create::<CreatureDef>("Wolf").unwrap();
        session.reset();

        assert!(session.database().is_empty());
        assert_eq!(session.indices().count::<CreatureDef>(), 0);
        assert!(session.registry().get_with_type_name("CreatureDef").is_some());
        assert_eq!(session.phase(), crate::Phase::Uninitialized);
    }

    // -------------------------------------------------------------------------
    // Indices

    #[derive(Recordable, Default)]
    #[record(def)]
    struct IndexBaseDef {
        #[record(index)]
        index: usize,
        leaves: Vec<crate::Shared<IndexLeaf>>,
        stamps: Vec<Stamp>,
    }

    #[derive(Recordable, Default)]
    #[record(def)]
    struct IndexDerivedDef {
        #[record(base)]
        base: IndexBaseDef,
        #[record(index)]
        derived_index: usize,
    }

    #[derive(Recordable, Default)]
    struct IndexLeaf {
        #[record(index)]
        index: usize,
        value: i32,
    }

    #[derive(Recordable, Default, Clone)]
    #[record(clone)]
    struct Stamp {
        #[record(index)]
        index: usize,
        value: i32,
    }

    #[derive(Recordable, Default)]
    #[record(def)]
    struct ExcessiveDef {
        #[record(index)]
        first: usize,
        #[record(index)]
        second: usize,
    }

    #[test]
    fn index_derived_list() {
        let mut session = Session::new();
        session.register::<IndexBaseDef>();
        session.register::<IndexDerivedDef>();
        session.parse_from_string(
            r#"<Defs>
                <IndexBaseDef defName="A" />
                <IndexDerivedDef defName="B" />
                <IndexDerivedDef defName="C" />
                <IndexBaseDef defName="D" />
                <IndexDerivedDef defName="E" />
            </Defs>"#,
        );

        assert_eq!(session.indices().count::<IndexBaseDef>(), 5);
        assert_eq!(session.indices().count::<IndexDerivedDef>(), 3);

        let e = session.database().get::<IndexDerivedDef>("E").unwrap();
        assert_eq!(e.borrow().base.index, 4);
        assert_eq!(e.borrow().derived_index, 2);

        // The base table holds derived defs, reachable only untyped.
        let erased = session.indices().get_erased::<IndexBaseDef>(1).unwrap();
        assert!(erased.is::<RefCell<IndexDerivedDef>>());
        let d = session.indices().get::<IndexBaseDef>(3).unwrap();
        assert_eq!(d.borrow().index, 3);
        assert_eq!(session.diagnostics().error_count(), 0);
    }

    #[test]
    fn index_leaf_list() {
        let mut session = Session::new();
        session.register::<IndexBaseDef>();
        session.parse_from_string(
            r#"<Defs>
                <IndexBaseDef defName="A">
                    <leaves>
                        <li><value>10</value></li>
                        <li><value>11</value></li>
                        <li><value>12</value></li>
                    </leaves>
                </IndexBaseDef>
            </Defs>"#,
        );

        let a = session.database().get::<IndexBaseDef>("A").unwrap();
        let indices: Vec<_> = a.borrow().leaves.iter().map(|leaf| leaf.borrow().index).collect();
        assert_eq!(indices, [0, 1, 2]);
        let second = session.indices().get::<IndexLeaf>(1).unwrap();
        assert!(Rc::ptr_eq(&second, &a.borrow().leaves[1]));
    }

    #[test]
    fn independent_value_index() {
        let mut session = Session::new();
        session.register::<IndexBaseDef>();
        session.parse_from_string(
            r#"<Defs>
                <IndexBaseDef defName="A">
                    <leaves><li /><li /><li /><li /><li /></leaves>
                    <stamps>
                        <li><value>1</value></li>
                        <li><value>2</value></li>
                        <li><value>3</value></li>
                    </stamps>
                </IndexBaseDef>
            </Defs>"#,
        );

        assert_eq!(session.indices().count::<IndexLeaf>(), 5);
        assert_eq!(session.indices().count::<Stamp>(), 3);

        let a = session.database().get::<IndexBaseDef>("A").unwrap();
        assert_eq!(a.borrow().stamps[2].index, 2);
        let copy = session.indices().get::<Stamp>(2).unwrap();
        assert_eq!(copy.borrow().value, 3);
        assert_eq!(copy.borrow().index, 2);
    }

    #[derive(Recordable, Default)]
    #[record(def)]
    struct PrefilledDef {
        prefilled: crate::Shared<IndexLeaf>,
        unfilled: Option<crate::Shared<IndexLeaf>>,
    }

    #[test]
    fn unmentioned_prefilled_object_has_no_index() {
        let mut session = Session::new();
        session.register::<PrefilledDef>();
        session.parse_from_string(
            r#"<Defs>
                <PrefilledDef defName="A" />
                <PrefilledDef defName="B">
                    <prefilled><value>4</value></prefilled>
                    <unfilled><value>5</value></unfilled>
                </PrefilledDef>
            </Defs>"#,
        );

        assert_eq!(session.indices().count::<IndexLeaf>(), 2);
        let a = session.database().get::<PrefilledDef>("A").unwrap();
        let b = session.database().get::<PrefilledDef>("B").unwrap();
        assert!(a.borrow().unfilled.is_none());

        let first = session.indices().get::<IndexLeaf>(0).unwrap();
        assert!(Rc::ptr_eq(&first, &b.borrow().prefilled));
        assert!(!Rc::ptr_eq(&first, &a.borrow().prefilled));
        let second = session.indices().get::<IndexLeaf>(1).unwrap();
        assert!(Rc::ptr_eq(&second, b.borrow().unfilled.as_ref().unwrap()));
        assert_eq!(second.borrow().value, 5);
        assert_eq!(session.diagnostics().error_count(), 0);
    }

    #[test]
    fn excessive_indices() {
        let mut session = Session::new();
        session.register::<ExcessiveDef>();
        assert_eq!(session.diagnostics().error_count(), 1);

        session.create::<ExcessiveDef>("A").unwrap();
        let b = session.create::<ExcessiveDef>("B").unwrap();
        assert_eq!(b.borrow().first, 1);
        assert_eq!(b.borrow().second, 1);
    }
}
