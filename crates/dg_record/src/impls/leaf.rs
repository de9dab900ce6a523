use alloc::format;
use alloc::string::{String, ToString};
use core::fmt::Display;
use core::str::FromStr;

use dg_schema::{Type, TypePath};

use crate::xml::Element;
use crate::{ReadContext, Recordable, WriteContext};

/// Parses the trimmed text of `node`.
///
/// Elements inside a leaf are reported and the value is kept. Empty or
/// unparsable text is reported and the value becomes the default.
fn read_parsed<T>(slot: &mut T, node: &Element, cx: &mut ReadContext<'_>)
where
    T: FromStr + Default + TypePath,
    T::Err: Display,
{
    if node.has_children() {
        cx.error(node, format!("{} cannot contain elements", T::type_name()));
        return;
    }

    let text = node.text().map(str::trim).unwrap_or("");
    if text.is_empty() {
        cx.error(node, format!("empty text for {}", T::type_name()));
        *slot = T::default();
        return;
    }

    match text.parse() {
        Ok(value) => *slot = value,
        Err(err) => {
            cx.error(node, format!("\"{text}\" is not a valid {}: {err}", T::type_name()));
            *slot = T::default();
        }
    }
}

macro_rules! impl_leaf_recordable {
    ($($ty:ty),* $(,)?) => {$(
        impl Recordable for $ty {
            #[inline]
            fn create() -> Self {
                <$ty>::default()
            }

            fn read(&mut self, node: &mut Element, cx: &mut ReadContext<'_>) {
                read_parsed(self, node, cx);
            }

            fn write(&self, node: &mut Element, _cx: &mut WriteContext<'_>) {
                node.set_text(self.to_string());
            }
        }
    )*};
}

impl_leaf_recordable!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
);

impl Recordable for String {
    #[inline]
    fn create() -> Self {
        String::new()
    }

    /// Takes the text verbatim; an empty element reads as `""`.
    fn read(&mut self, node: &mut Element, cx: &mut ReadContext<'_>) {
        if node.has_children() {
            cx.error(node, "String cannot contain elements");
            return;
        }
        *self = node.text().unwrap_or("").to_string();
    }

    fn write(&self, node: &mut Element, _cx: &mut WriteContext<'_>) {
        node.set_text(self.as_str());
    }
}

impl Recordable for Type {
    /// The unit type, standing for "no type".
    #[inline]
    fn create() -> Self {
        Type::of::<()>()
    }

    /// Resolves the text by full path, then by unambiguous short name.
    fn read(&mut self, node: &mut Element, cx: &mut ReadContext<'_>) {
        if node.has_children() {
            cx.error(node, "Type cannot contain elements");
            return;
        }

        let text = node.text().map(str::trim).unwrap_or("");
        let registry = cx.registry();
        match registry.resolve(text) {
            Some(meta) => *self = *meta.ty(),
            None if registry.is_ambiguous(text) => {
                cx.error(node, format!("type name `{text}` is ambiguous, use the full path"));
            }
            None => cx.error(node, format!("unknown type `{text}`")),
        }
    }

    fn write(&self, node: &mut Element, _cx: &mut WriteContext<'_>) {
        node.set_text(self.path());
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use dg_schema::Type;

    use crate::Session;

    #[test]
    fn leaf_round_trip() {
        let mut session = Session::new();
        let text = session.write_record(&-17_i64).unwrap();
        assert_eq!(session.read_record::<i64>(&text), -17);

        let text = session.write_record(&2.5_f32).unwrap();
        assert_eq!(session.read_record::<f32>(&text), 2.5);

        let text = session.write_record(&true).unwrap();
        assert!(session.read_record::<bool>(&text));
        assert_eq!(session.diagnostics().error_count(), 0);
    }

    #[test]
    fn leaf_text_is_trimmed() {
        let mut session = Session::new();
        let text = "<Record><recordFormatVersion>1</recordFormatVersion><data>\n  42 \n</data></Record>";
        assert_eq!(session.read_record::<u32>(text), 42);
        assert_eq!(session.diagnostics().error_count(), 0);
    }

    #[test]
    fn misparse_falls_back_to_default() {
        let mut session = Session::new();
        let text = "<Record><recordFormatVersion>1</recordFormatVersion><data>dog</data></Record>";
        assert_eq!(session.read_record::<i32>(text), 0);
        assert_eq!(session.diagnostics().error_count(), 1);

        let text = "<Record><recordFormatVersion>1</recordFormatVersion><data/></Record>";
        assert_eq!(session.read_record::<i32>(text), 0);
        assert_eq!(session.diagnostics().error_count(), 2);
    }

    #[test]
    fn strings_keep_markup_characters() {
        let mut session = Session::new();
        let value = String::from("<one> & \"two\"");
        let text = session.write_record(&value).unwrap();
        assert_eq!(session.read_record::<String>(&text), value);

        let text = session.write_record(&String::new()).unwrap();
        assert_eq!(session.read_record::<String>(&text), "");
        assert_eq!(session.diagnostics().error_count(), 0);
    }

    #[test]
    fn type_handles() {
        let mut session = Session::new();
        let text = session.write_record(&Type::of::<u16>()).unwrap();
        assert!(session.read_record::<Type>(&text).is::<u16>());

        let by_name = "<Record><recordFormatVersion>1</recordFormatVersion><data>String</data></Record>";
        assert!(session.read_record::<Type>(by_name).is::<String>());

        let unknown = "<Record><recordFormatVersion>1</recordFormatVersion><data>Nope</data></Record>";
        assert!(session.read_record::<Type>(unknown).is::<()>());
        assert_eq!(session.diagnostics().error_count(), 1);
    }
}
