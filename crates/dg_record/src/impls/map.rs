use alloc::collections::BTreeMap;
use alloc::format;
use core::hash::{BuildHasher, Hash};
use std::collections::HashMap;

use crate::recordable::{read_item, write_value};
use crate::xml::Element;
use crate::{ReadContext, Recordable, WriteContext};

/// Reads the entries of a map element.
///
/// Two entry forms are accepted and may be mixed: an item element holding a
/// key and a value child, or an element whose tag is the key text. Returns
/// `false` without touching the map when the node carries text.
fn read_entries<K, V>(
    node: &mut Element,
    cx: &mut ReadContext<'_>,
    mut insert: impl FnMut(K, V) -> bool,
) -> bool
where
    K: Recordable,
    V: Recordable,
{
    if node.has_text() {
        cx.error(node, "a map cannot contain text; keeping the existing value");
        return false;
    }

    let config = cx.config();
    for (index, child) in node.children_mut().iter_mut().enumerate() {
        cx.push_item(index);
        let entry = if child.name() == config.item_tag() {
            read_item_entry::<K, V>(child, cx)
        } else {
            let mut key_node = Element::new(config.key_tag())
                .with_line(child.line())
                .with_text(child.name());
            let key = read_item::<K>(&mut key_node, cx);
            let value = read_item::<V>(child, cx);
            key.zip(value)
        };

        if let Some((key, value)) = entry
            && insert(key, value)
        {
            cx.error(child, "duplicate key; keeping the later entry");
        }
        cx.pop_path();
    }
    true
}

fn read_item_entry<K, V>(entry: &mut Element, cx: &mut ReadContext<'_>) -> Option<(K, V)>
where
    K: Recordable,
    V: Recordable,
{
    let config = cx.config();
    let mut key = None;
    let mut value = None;
    for part in entry.take_children() {
        let slot = if part.name() == config.key_tag() {
            &mut key
        } else if part.name() == config.value_tag() {
            &mut value
        } else {
            cx.error(&part, format!("unexpected <{}> in a map entry", part.name()));
            continue;
        };
        if slot.is_some() {
            cx.error(&part, format!("duplicate <{}> in a map entry", part.name()));
        }
        *slot = Some(part);
    }

    if entry.has_text() {
        cx.error(entry, "a map entry cannot contain text");
    }

    let (Some(mut key), Some(mut value)) = (key, value) else {
        cx.error(entry, "a map entry needs both a key and a value; skipping it");
        return None;
    };

    let key = read_item::<K>(&mut key, cx)?;
    let value = read_item::<V>(&mut value, cx)?;
    Some((key, value))
}

fn write_entries<'m, K, V>(
    entries: impl IntoIterator<Item = (&'m K, &'m V)>,
    node: &mut Element,
    cx: &mut WriteContext<'_>,
) where
    K: Recordable + 'm,
    V: Recordable + 'm,
{
    let config = cx.config();
    for (index, (key, value)) in entries.into_iter().enumerate() {
        cx.push_item(index);
        let mut key_node = Element::new(config.key_tag());
        write_value(key, &mut key_node, cx);
        let mut value_node = Element::new(config.value_tag());
        write_value(value, &mut value_node, cx);
        cx.pop_path();

        node.push_child(
            Element::new(config.item_tag())
                .with_child(key_node)
                .with_child(value_node),
        );
    }
}

impl<K, V, S> Recordable for HashMap<K, V, S>
where
    K: Recordable + Eq + Hash,
    V: Recordable,
    S: BuildHasher + Default + 'static,
{
    fn create() -> Self {
        HashMap::default()
    }

    /// Replaces the whole map. Duplicate keys are reported and the later
    /// entry wins.
    fn read(&mut self, node: &mut Element, cx: &mut ReadContext<'_>) {
        let mut map = HashMap::default();
        if read_entries(node, cx, |key, value| map.insert(key, value).is_some()) {
            *self = map;
        }
    }

    fn write(&self, node: &mut Element, cx: &mut WriteContext<'_>) {
        write_entries(self, node, cx);
    }
}

impl<K, V> Recordable for BTreeMap<K, V>
where
    K: Recordable + Ord,
    V: Recordable,
{
    fn create() -> Self {
        BTreeMap::new()
    }

    fn read(&mut self, node: &mut Element, cx: &mut ReadContext<'_>) {
        let mut map = BTreeMap::new();
        if read_entries(node, cx, |key, value| map.insert(key, value).is_some()) {
            *self = map;
        }
    }

    fn write(&self, node: &mut Element, cx: &mut WriteContext<'_>) {
        write_entries(self, node, cx);
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::format;
    use alloc::string::String;
    use std::collections::HashMap;

    use crate::{Recordable, Session};

    fn record(data: &str) -> String {
        format!("<Record><recordFormatVersion>1</recordFormatVersion><data>{data}</data></Record>")
    }

    #[derive(Recordable, Default)]
    struct Tables {
        counts: HashMap<String, i32>,
        ordered: BTreeMap<i32, String>,
    }

    #[test]
    fn both_entry_forms() {
        let mut session = Session::new();
        let tables = session.read_record::<Tables>(&record(
            "<counts>\
               <li><key>alpha</key><value>1</value></li>\
               <beta>2</beta>\
             </counts>",
        ));
        assert_eq!(tables.counts.len(), 2);
        assert_eq!(tables.counts["alpha"], 1);
        assert_eq!(tables.counts["beta"], 2);
        assert_eq!(session.diagnostics().error_count(), 0);
    }

    #[test]
    fn duplicate_key_keeps_later() {
        let mut session = Session::new();
        let tables = session.read_record::<Tables>(&record(
            "<counts><a>1</a><li><key>a</key><value>5</value></li></counts>",
        ));
        assert_eq!(tables.counts["a"], 5);
        assert_eq!(session.diagnostics().error_count(), 1);
    }

    #[test]
    fn incomplete_entry_is_skipped() {
        let mut session = Session::new();
        let tables = session.read_record::<Tables>(&record(
            "<ordered><li><key>1</key></li><li><key>2</key><value>two</value></li></ordered>",
        ));
        assert_eq!(tables.ordered.len(), 1);
        assert_eq!(tables.ordered[&2], "two");
        assert_eq!(session.diagnostics().error_count(), 1);
    }

    #[test]
    fn written_in_item_form() {
        let mut session = Session::new();
        let mut tables = Tables::default();
        tables.ordered.insert(3, String::from("three"));
        tables.ordered.insert(1, String::from("one"));
        tables.counts.insert(String::from("x"), 9);

        let text = session.write_record(&tables).unwrap();
        assert!(text.contains("<key>1</key>"), "{text}");

        let back = session.read_record::<Tables>(&text);
        assert_eq!(back.ordered, tables.ordered);
        assert_eq!(back.counts, tables.counts);
        assert_eq!(session.diagnostics().error_count(), 0);
    }
}
