use crate::converter::read_converted;
use crate::recordable::write_body;
use crate::xml::Element;
use crate::{ReadContext, Recordable, WriteContext};

impl<T: Recordable> Recordable for Option<T> {
    #[inline]
    fn create() -> Self {
        None
    }

    /// Reads into the existing value if there is one. A converter of `T` may
    /// produce null here.
    fn read(&mut self, node: &mut Element, cx: &mut ReadContext<'_>) {
        match cx.converters().lookup::<T>() {
            Some((name, caps)) => *self = read_converted(name, caps, self.take(), true, node, cx),
            None => T::read_optional(self, node, cx),
        }
    }

    fn write(&self, node: &mut Element, cx: &mut WriteContext<'_>) {
        if let Some(value) = self {
            write_body(value, node, cx);
        }
    }

    #[inline]
    fn null() -> Option<Self> {
        Some(None)
    }

    #[inline]
    fn set_null(&mut self) -> bool {
        *self = None;
        true
    }

    #[inline]
    fn is_null(&self) -> bool {
        self.is_none()
    }

    fn index_value(&mut self, cx: &mut ReadContext<'_>) {
        if let Some(value) = self {
            value.index_value(cx);
        }
    }
}
