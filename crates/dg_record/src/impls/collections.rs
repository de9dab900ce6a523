use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;

use crate::recordable::{read_item, write_value};
use crate::xml::Element;
use crate::{ReadContext, Recordable, WriteContext};

/// Reads every child of `node` as an item.
///
/// Returns `None`, keeping the existing value, when the node carries text.
/// Children with a tag other than the item tag are reported and still read
/// in position.
pub(super) fn read_items<T: Recordable>(
    node: &mut Element,
    cx: &mut ReadContext<'_>,
) -> Option<Vec<Option<T>>> {
    if node.has_text() {
        cx.error(node, "a collection cannot contain text; keeping the existing value");
        return None;
    }

    let item_tag = cx.config().item_tag();
    let mut items = Vec::with_capacity(node.children().len());
    for (index, child) in node.children_mut().iter_mut().enumerate() {
        if child.name() != item_tag {
            cx.error(child, format!("expected <{item_tag}>, found <{}>", child.name()));
        }
        cx.push_item(index);
        items.push(read_item::<T>(child, cx));
        cx.pop_path();
    }
    Some(items)
}

/// Writes `items` as item children of `node`.
pub(super) fn write_items<'i, T: Recordable + 'i>(
    items: impl IntoIterator<Item = &'i T>,
    node: &mut Element,
    cx: &mut WriteContext<'_>,
) {
    let item_tag = cx.config().item_tag();
    for (index, item) in items.into_iter().enumerate() {
        let mut child = Element::new(item_tag);
        cx.push_item(index);
        write_value(item, &mut child, cx);
        cx.pop_path();
        node.push_child(child);
    }
}

// -----------------------------------------------------------------------------
// Sequences

impl<T: Recordable> Recordable for Vec<T> {
    #[inline]
    fn create() -> Self {
        Vec::new()
    }

    /// Replaces the whole vector. Items that could not be produced are
    /// dropped.
    fn read(&mut self, node: &mut Element, cx: &mut ReadContext<'_>) {
        if let Some(items) = read_items::<T>(node, cx) {
            *self = items.into_iter().flatten().collect();
        }
    }

    fn write(&self, node: &mut Element, cx: &mut WriteContext<'_>) {
        write_items(self, node, cx);
    }
}

impl<T: Recordable> Recordable for Box<[T]> {
    #[inline]
    fn create() -> Self {
        Box::new([])
    }

    fn read(&mut self, node: &mut Element, cx: &mut ReadContext<'_>) {
        if let Some(items) = read_items::<T>(node, cx) {
            *self = items.into_iter().flatten().collect();
        }
    }

    fn write(&self, node: &mut Element, cx: &mut WriteContext<'_>) {
        write_items(self.iter(), node, cx);
    }
}

impl<T: Recordable, const N: usize> Recordable for [T; N] {
    fn create() -> Self {
        core::array::from_fn(|_| T::create())
    }

    /// Missing positions get fresh values and extra items are dropped, both
    /// reported.
    fn read(&mut self, node: &mut Element, cx: &mut ReadContext<'_>) {
        let Some(items) = read_items::<T>(node, cx) else {
            return;
        };

        if items.len() != N {
            cx.error(
                node,
                format!("expected {N} items, found {}", items.len()),
            );
        }

        let mut items = items.into_iter();
        *self = core::array::from_fn(|_| items.next().flatten().unwrap_or_else(T::create));
    }

    fn write(&self, node: &mut Element, cx: &mut WriteContext<'_>) {
        write_items(self, node, cx);
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::{Recordable, Session};

    fn record(data: &str) -> String {
        alloc::format!("<Record><recordFormatVersion>1</recordFormatVersion><data>{data}</data></Record>")
    }

    #[derive(Recordable, Default)]
    struct Holder {
        numbers: Vec<i32>,
        fixed: [i32; 3],
        frozen: Box<[String]>,
        maybe: Option<Vec<i32>>,
    }

    #[derive(Recordable)]
    struct Prefilled {
        numbers: Vec<i32>,
    }

    impl Default for Prefilled {
        fn default() -> Self {
            Self {
                numbers: vec![3, 4],
            }
        }
    }

    #[test]
    fn absent_tag_keeps_value() {
        let mut session = Session::new();
        assert_eq!(session.read_record::<Prefilled>(&record("")).numbers, [3, 4]);

        let holder = session.read_record::<Holder>(&record("<fixed><li>4</li><li>5</li><li>6</li></fixed>"));
        assert!(holder.numbers.is_empty());
        assert_eq!(holder.fixed, [4, 5, 6]);
        assert_eq!(session.diagnostics().error_count(), 0);
    }

    #[test]
    fn present_tag_replaces_everything() {
        let mut session = Session::new();
        let holder = session.read_record::<Holder>(&record("<numbers><li>7</li></numbers><frozen><li>a</li><li/></frozen>"));
        assert_eq!(holder.numbers, [7]);
        assert_eq!(&*holder.frozen, ["a", ""]);

        let holder = session.read_record::<Holder>(&record("<numbers/>"));
        assert!(holder.numbers.is_empty());
        assert_eq!(session.diagnostics().error_count(), 0);
    }

    #[test]
    fn text_in_collection_keeps_existing() {
        let mut session = Session::new();
        let prefilled = session.read_record::<Prefilled>(&record("<numbers>5</numbers>"));
        assert_eq!(prefilled.numbers, [3, 4]);
        assert_eq!(session.diagnostics().error_count(), 1);

        let prefilled = session.read_record::<Prefilled>(&record("<numbers/>"));
        assert!(prefilled.numbers.is_empty());
    }

    #[test]
    fn fixed_array_count_mismatch() {
        let mut session = Session::new();
        let holder = session.read_record::<Holder>(&record("<fixed><li>1</li></fixed>"));
        assert_eq!(holder.fixed, [1, 0, 0]);
        assert_eq!(session.diagnostics().error_count(), 1);

        let holder = session.read_record::<Holder>(&record("<fixed><li>1</li><li>2</li><li>3</li><li>4</li></fixed>"));
        assert_eq!(holder.fixed, [1, 2, 3]);
        assert_eq!(session.diagnostics().error_count(), 2);
    }

    #[test]
    fn wrong_item_tag_is_read_in_position() {
        let mut session = Session::new();
        let holder = session.read_record::<Holder>(&record("<numbers><li>1</li><item>2</item></numbers>"));
        assert_eq!(holder.numbers, [1, 2]);
        assert_eq!(session.diagnostics().error_count(), 1);
    }

    #[test]
    fn element_misparse_is_zero() {
        let mut session = Session::new();
        let holder = session.read_record::<Holder>(&record("<fixed><li>1</li><li>dog</li><li>3</li></fixed>"));
        assert_eq!(holder.fixed, [1, 0, 3]);
        assert_eq!(session.diagnostics().error_count(), 1);
    }

    #[test]
    fn nullable_collection() {
        let mut session = Session::new();
        let holder = Holder {
            maybe: Some(vec![9]),
            ..Holder::default()
        };
        let text = session.write_record(&holder).unwrap();
        assert_eq!(session.read_record::<Holder>(&text).maybe, Some(vec![9]));

        let text = session.write_record(&Holder::default()).unwrap();
        assert!(text.contains(r#"<maybe null="true"/>"#), "{text}");
        assert_eq!(session.read_record::<Holder>(&text).maybe, None);

        let holder = session.read_record::<Holder>(&record(r#"<numbers null="true"/>"#));
        assert!(holder.numbers.is_empty());
        assert_eq!(session.diagnostics().error_count(), 1);

        let empty: Vec<i32> = Vec::new();
        assert_eq!(session.read_record::<Holder>(&record("<maybe/>")).maybe, Some(empty));
    }
}
