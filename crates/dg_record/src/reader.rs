use alloc::format;
use alloc::vec::Vec;

use dg_def::ErasedShared;
use dg_schema::registry::GetTypeMeta;

use crate::context::RefTable;
use crate::writer::{DATA_TAG, REFS_TAG, VERSION_TAG};
use crate::xml::{Element, parse_document};
use crate::{Location, Recordable, Session, TypeTraitRecord, read_value};

fn at(node: &Element) -> Location {
    Location {
        line: (node.line() > 0).then_some(node.line()),
        ..Location::default()
    }
}

impl Session {
    /// Reads a record document written by [`write_record`](Self::write_record).
    ///
    /// Every entry of the `refs` table becomes an empty object before any of
    /// them is read, so references may point forward and form cycles. A
    /// document that cannot be used at all yields `T::create()`.
    pub fn read_record<T: Recordable + GetTypeMeta>(&mut self, text: &str) -> T {
        self.ensure_registered::<T>();

        let mut root = match parse_document(text) {
            Ok(root) => root,
            Err(err) => {
                self.diagnostics.error(format!("{err}"), Location::default());
                return T::create();
            }
        };

        if root.name() != self.config.record_root() {
            self.diagnostics.warning(
                format!(
                    "root is <{}>, expected <{}>",
                    root.name(),
                    self.config.record_root()
                ),
                at(&root),
            );
        }

        if !self.check_version(&root) {
            return T::create();
        }

        let mut refs = None;
        let mut data = None;
        for child in root.take_children() {
            if child.name() == VERSION_TAG {
                continue;
            }
            if child.name() == REFS_TAG && refs.is_none() {
                refs = Some(child);
            } else if child.name() == DATA_TAG && data.is_none() {
                data = Some(child);
            } else {
                self.diagnostics.error(
                    format!("unexpected <{}> in a record", child.name()),
                    at(&child),
                );
            }
        }

        let (table, stubs) = match refs {
            Some(mut refs) => self.create_stubs(&mut refs),
            None => (RefTable::default(), Vec::new()),
        };
        log::trace!("record declares {} shared objects", table.len());

        let Some(mut data) = data else {
            self.diagnostics
                .error(format!("record has no <{DATA_TAG}>"), at(&root));
            return T::create();
        };

        let mut cx = self.read_context(Some(&table), None);
        for (handle, record, mut element) in stubs {
            record.populate(&handle, &mut element, &mut cx);
        }

        let mut value = T::create();
        read_value(&mut value, &mut data, &mut cx);
        value
    }

    // `false` if the record must be abandoned.
    fn check_version(&mut self, root: &Element) -> bool {
        let expected = self.config.format_version();
        let Some(version) = root.child(VERSION_TAG) else {
            self.diagnostics.error(
                format!("record has no <{VERSION_TAG}>; assuming version {expected}"),
                at(root),
            );
            return true;
        };
        for extra in root
            .children()
            .iter()
            .filter(|child| child.name() == VERSION_TAG)
            .skip(1)
        {
            self.diagnostics.warning(
                format!("repeated <{VERSION_TAG}> is ignored"),
                at(extra),
            );
        }

        let text = version.text().map(str::trim).unwrap_or("");
        match text.parse::<u32>() {
            Ok(found) if found == expected => true,
            _ => {
                self.diagnostics.error(
                    format!("unsupported record version \"{text}\", expected {expected}"),
                    at(version),
                );
                false
            }
        }
    }

    // Phase one: an empty object for every usable entry of `refs`.
    fn create_stubs(
        &mut self,
        refs: &mut Element,
    ) -> (RefTable, Vec<(ErasedShared, TypeTraitRecord, Element)>) {
        let config = &self.config;
        let mut table = RefTable::default();
        let mut stubs = Vec::new();

        for mut entry in refs.take_children() {
            if entry.name() != config.ref_tag() {
                self.diagnostics.warning(
                    format!("expected <{}>, found <{}>", config.ref_tag(), entry.name()),
                    at(&entry),
                );
            }

            let id = entry.take_attribute(config.ref_id_attribute());
            let class = entry.take_attribute(config.ref_class_attribute());
            let (Some(id), Some(class)) = (id, class) else {
                self.diagnostics.error(
                    format!(
                        "reference entry needs both `{}` and `{}`; skipping it",
                        config.ref_id_attribute(),
                        config.ref_class_attribute()
                    ),
                    at(&entry),
                );
                continue;
            };

            let Some(meta) = self.registry.resolve(&class) else {
                self.diagnostics
                    .error(format!("unknown class `{class}`"), at(&entry));
                continue;
            };
            if !meta.schema().is_identity_bearing() {
                self.diagnostics.error(
                    format!("`{class}` is a value type and cannot be shared"),
                    at(&entry),
                );
                continue;
            }
            let Some(record) = meta.get_trait::<TypeTraitRecord>().copied() else {
                self.diagnostics
                    .error(format!("`{class}` is not recordable"), at(&entry));
                continue;
            };

            let handle = record.create_shared();
            if !table.insert(id.clone(), handle.clone(), meta.type_name()) {
                self.diagnostics
                    .error(format!("duplicate reference id `{id}`"), at(&entry));
                continue;
            }
            record.assign_indices(&handle, &mut self.indices);
            stubs.push((handle, record, entry));
        }

        (table, stubs)
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use std::collections::HashMap;

    use crate::{Recordable, Session, Shared};

    #[derive(Recordable, Default)]
    #[record(def)]
    struct ColorDef {
        red: f32,
    }

    #[derive(Recordable, Default)]
    struct Node {
        label: String,
        next: Option<Shared<Node>>,
    }

    #[derive(Recordable, Default)]
    struct Scene {
        color: Option<Shared<ColorDef>>,
        first: Option<Shared<Node>>,
        second: Option<Shared<Node>>,
        nested: Vec<Vec<i32>>,
        gaps: Vec<Option<i32>>,
        named: HashMap<String, Shared<Node>>,
    }

    fn node(label: &str) -> Shared<Node> {
        Rc::new(RefCell::new(Node {
            label: label.into(),
            next: None,
        }))
    }

    #[test]
    fn defs_are_written_by_name() {
        let mut session = Session::new();
        let red = session.create::<ColorDef>("Red").unwrap();
        let scene = Scene {
            color: Some(red.clone()),
            ..Scene::default()
        };

        let text = session.write_record(&scene).unwrap();
        assert!(text.contains("<color>Red</color>"));

        let read: Scene = session.read_record(&text);
        assert!(Rc::ptr_eq(read.color.as_ref().unwrap(), &red));
        assert_eq!(session.diagnostics().error_count(), 0);
    }

    #[test]
    fn shared_objects_keep_identity() {
        let mut session = Session::new();
        let shared = node("shared");
        let scene = Scene {
            first: Some(shared.clone()),
            second: Some(shared.clone()),
            named: HashMap::from([(String::from("again"), shared.clone())]),
            ..Scene::default()
        };

        let text = session.write_record(&scene).unwrap();
        assert!(text.contains(r#"<Ref id="ref00""#));
        assert!(!text.contains("ref01"));

        let read: Scene = session.read_record(&text);
        let first = read.first.unwrap();
        assert_eq!(first.borrow().label, "shared");
        assert!(Rc::ptr_eq(&first, read.second.as_ref().unwrap()));
        assert!(Rc::ptr_eq(&first, &read.named["again"]));
        assert_eq!(session.diagnostics().error_count(), 0);
    }

    #[test]
    fn containers_round_trip() {
        let mut session = Session::new();
        let scene = Scene {
            nested: vec![vec![1, 2], vec![], vec![3]],
            gaps: vec![Some(1), None, Some(3)],
            ..Scene::default()
        };

        let text = session.write_record(&scene).unwrap();
        let read: Scene = session.read_record(&text);
        assert_eq!(read.nested, scene.nested);
        assert_eq!(read.gaps, scene.gaps);
        assert!(read.first.is_none());
        assert_eq!(session.diagnostics().error_count(), 0);
    }

    #[test]
    fn cycles_are_restored() {
        let mut session = Session::new();
        let a = node("a");
        let b = node("b");
        a.borrow_mut().next = Some(b.clone());
        b.borrow_mut().next = Some(a.clone());

        let text = session.write_record(&a).unwrap();
        let read: Shared<Node> = session.read_record(&text);
        let back = read.borrow().next.clone().unwrap();
        assert_eq!(back.borrow().label, "b");
        assert!(Rc::ptr_eq(back.borrow().next.as_ref().unwrap(), &read));
        assert_eq!(session.diagnostics().error_count(), 0);

        a.borrow_mut().next = None;
        read.borrow_mut().next = None;
    }

    #[test]
    fn wrong_version_yields_default() {
        let mut session = Session::new();
        let read: Scene = session.read_record(
            r#"<Record><recordFormatVersion>2</recordFormatVersion><refs /><data><nested><li><li>1</li></li></nested></data></Record>"#,
        );
        assert!(read.nested.is_empty());
        assert_eq!(session.diagnostics().error_count(), 1);
    }

    #[test]
    fn missing_version_still_reads() {
        let mut session = Session::new();
        let read: Scene = session.read_record(
            r#"<Record><refs /><data><gaps><li>4</li></gaps></data></Record>"#,
        );
        assert_eq!(read.gaps, [Some(4)]);
        assert_eq!(session.diagnostics().error_count(), 1);
    }

    #[test]
    fn repeated_version_is_ignored() {
        let mut session = Session::new();
        let read: Scene = session.read_record(
            r#"<Record>
                <recordFormatVersion>1</recordFormatVersion>
                <recordFormatVersion>7</recordFormatVersion>
                <data><gaps><li>2</li></gaps></data>
            </Record>"#,
        );
        assert_eq!(read.gaps, [Some(2)]);
        assert_eq!(session.diagnostics().warning_count(), 1);
        assert_eq!(session.diagnostics().error_count(), 0);
    }

    #[test]
    fn broken_ref_table() {
        let mut session = Session::new();
        session.register::<Node>();
        let read: Scene = session.read_record(
            r#"<Record>
                <recordFormatVersion>1</recordFormatVersion>
                <refs>
                    <Ref id="ref00" class="Node"><label>kept</label></Ref>
                    <Ref id="ref01" class="Unknown" />
                    <Ref id="ref02" class="i32" />
                    <Ref class="Node" />
                    <Ref id="ref00" class="Node" />
                </refs>
                <data>
                    <first ref="ref00" />
                    <second ref="ref01" />
                </data>
            </Record>"#,
        );

        assert_eq!(read.first.unwrap().borrow().label, "kept");
        assert!(read.second.is_none());
        // Unknown class, value class, missing id, duplicate id, unknown ref.
        assert_eq!(session.diagnostics().error_count(), 5);
    }

    #[test]
    fn not_a_document() {
        let mut session = Session::new();
        let read: Scene = session.read_record("<Record>");
        assert!(read.first.is_none());
        assert_eq!(session.diagnostics().error_count(), 1);
    }
}
