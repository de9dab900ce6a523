use alloc::format;
use alloc::string::String;

use dg_utils::hash::HashSet;

use crate::context::WriteMode;
use crate::xml::{Element, write_document};
use crate::{Session, SessionError, TypeTraitRecord, WriteContext};

impl Session {
    /// Writes every def back as one `Defs` document, in creation order.
    ///
    /// Shared objects that are not defs are written inline at each position;
    /// an object that contains itself is reported and cut at the repetition.
    /// With `pretty`, the document is indented as configured.
    pub fn compose_xml(&mut self, pretty: bool) -> Result<String, SessionError> {
        let root = self.compose();
        let indent = if pretty { self.config.indent() } else { None };
        Ok(write_document(&root, indent)?)
    }

    /// Walks every def through the writer without producing a document,
    /// reporting what `compose_xml` would report.
    pub fn compose_null(&mut self) {
        let _ = self.compose();
    }

    fn compose(&mut self) -> Element {
        let config = &self.config;
        let mut root = Element::new(config.defs_root());
        let mut cx = WriteContext::new(
            config,
            &self.converters,
            &self.database,
            &mut self.diagnostics,
            WriteMode::Compose {
                active: HashSet::default(),
            },
        );

        for entry in self.database.iter() {
            let Some(meta) = self.registry.get(entry.type_id()) else {
                cx.error(format!("def `{}` has an unregistered type", entry.name()));
                continue;
            };
            let Some(record) = meta.get_trait::<TypeTraitRecord>() else {
                cx.error(format!("{} is not recordable", meta.type_name()));
                continue;
            };
            if self.registry.is_ambiguous(meta.type_name()) {
                cx.warning(format!(
                    "def `{}` is tagged {}, which names several types",
                    entry.name(),
                    meta.type_name()
                ));
            }

            let mut element = Element::new(meta.type_name())
                .with_attribute(config.def_name_attribute(), entry.name());
            record.write(entry.handle(), &mut element, &mut cx);
            root.push_child(element);
        }

        log::debug!("composed {} defs", root.children().len());
        root
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec::Vec;

    use crate::{Recordable, Session, Shared};

    #[derive(Recordable, Default)]
    #[record(def)]
    struct WeaponDef {
        damage: i32,
        label: String,
        upgrade: Option<Shared<WeaponDef>>,
        parts: Vec<Shared<Part>>,
    }

    #[derive(Recordable, Default)]
    struct Part {
        weight: f32,
        next: Option<Shared<Part>>,
    }

    /// Writes the database out and reads it back into a fresh state.
    fn rewritten(session: &mut Session) {
        let text = session.compose_xml(true).unwrap();
        session.reset();
        session.parse_from_string(&text);
    }

    #[test]
    fn references_survive_rewriting() {
        let mut session = Session::new();
        let basic = session.create::<WeaponDef>("Basic").unwrap();
        let better = session.create::<WeaponDef>("Better").unwrap();
        basic.borrow_mut().damage = 3;
        basic.borrow_mut().upgrade = Some(better.clone());
        better.borrow_mut().damage = 7;
        better.borrow_mut().label = String::from("shiny & sharp");

        rewritten(&mut session);

        let basic = session.database().get::<WeaponDef>("Basic").unwrap();
        let better = session.database().get::<WeaponDef>("Better").unwrap();
        assert_eq!(basic.borrow().damage, 3);
        assert_eq!(better.borrow().label, "shiny & sharp");
        let upgrade = basic.borrow().upgrade.clone().unwrap();
        assert!(Rc::ptr_eq(&upgrade, &better));
        assert_eq!(session.diagnostics().error_count(), 0);
    }

    #[test]
    fn deleted_reference_is_reported() {
        let mut session = Session::new();
        let basic = session.create::<WeaponDef>("Basic").unwrap();
        let gone = session.create::<WeaponDef>("Gone").unwrap();
        basic.borrow_mut().upgrade = Some(gone.clone());
        session.delete(&gone);

        session.compose_null();
        assert_eq!(session.diagnostics().error_count(), 1);
    }

    #[test]
    fn renamed_reference_follows() {
        let mut session = Session::new();
        let basic = session.create::<WeaponDef>("Basic").unwrap();
        let target = session.create::<WeaponDef>("Old").unwrap();
        basic.borrow_mut().upgrade = Some(target.clone());
        session.rename(&target, "Mid");
        session.rename(&target, "New");

        rewritten(&mut session);

        let basic = session.database().get::<WeaponDef>("Basic").unwrap();
        let new = session.database().get::<WeaponDef>("New").unwrap();
        assert!(Rc::ptr_eq(basic.borrow().upgrade.as_ref().unwrap(), &new));
        assert!(session.database().get::<WeaponDef>("Old").is_none());
        assert_eq!(session.diagnostics().error_count(), 0);
    }

    #[test]
    fn inline_objects_and_cycles() {
        let mut session = Session::new();
        let def = session.create::<WeaponDef>("Chain").unwrap();
        let first = Rc::new(core::cell::RefCell::new(Part {
            weight: 1.5,
            next: None,
        }));
        let second = Rc::new(core::cell::RefCell::new(Part {
            weight: 2.0,
            next: None,
        }));
        first.borrow_mut().next = Some(second.clone());
        def.borrow_mut().parts = alloc::vec![first.clone(), second.clone()];

        rewritten(&mut session);
        let def = session.database().get::<WeaponDef>("Chain").unwrap();
        let parts = def.borrow().parts.clone();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].borrow().weight, 1.5);
        assert_eq!(parts[0].borrow().next.as_ref().unwrap().borrow().weight, 2.0);
        // Inline output does not keep sharing.
        assert!(!Rc::ptr_eq(parts[0].borrow().next.as_ref().unwrap(), &parts[1]));
        assert_eq!(session.diagnostics().error_count(), 0);

        let looped = session.create::<WeaponDef>("Loop").unwrap();
        let part = Rc::new(core::cell::RefCell::new(Part::default()));
        part.borrow_mut().next = Some(part.clone());
        looped.borrow_mut().parts.push(part.clone());
        session.compose_null();
        assert_eq!(session.diagnostics().error_count(), 1);
        part.borrow_mut().next = None;
    }
}
