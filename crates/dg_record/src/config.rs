use alloc::string::String;

/// Tag and attribute names of the document formats.
///
/// The defaults describe the formats documented on [`Session`](crate::Session).
///
/// ```
/// use dg_record::Config;
///
/// let config = Config::default().with_item_tag("item").with_indent(None);
/// assert_eq!(config.item_tag(), "item");
/// assert_eq!(config.key_tag(), "key");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    item_tag: String,
    key_tag: String,
    value_tag: String,
    null_attribute: String,
    ref_attribute: String,
    def_name_attribute: String,
    defs_root: String,
    record_root: String,
    ref_tag: String,
    ref_id_attribute: String,
    ref_class_attribute: String,
    format_version: u32,
    indent: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            item_tag: "li".into(),
            key_tag: "key".into(),
            value_tag: "value".into(),
            null_attribute: "null".into(),
            ref_attribute: "ref".into(),
            def_name_attribute: "defName".into(),
            defs_root: "Defs".into(),
            record_root: "Record".into(),
            ref_tag: "Ref".into(),
            ref_id_attribute: "id".into(),
            ref_class_attribute: "class".into(),
            format_version: 1,
            indent: Some(2),
        }
    }
}

macro_rules! impl_str_option {
    ($($(#[$doc:meta])* $field:ident, $setter:ident;)*) => {$(
        $(#[$doc])*
        #[inline]
        pub fn $field(&self) -> &str {
            &self.$field
        }

        #[inline]
        pub fn $setter(mut self, value: impl Into<String>) -> Self {
            self.$field = value.into();
            self
        }
    )*};
}

impl Config {
    impl_str_option! {
        /// Tag of sequence items and of map entries. Default `li`.
        item_tag, with_item_tag;
        /// Key child of a map entry. Default `key`.
        key_tag, with_key_tag;
        /// Value child of a map entry. Default `value`.
        value_tag, with_value_tag;
        /// Attribute marking a null value, set to `true`. Default `null`.
        null_attribute, with_null_attribute;
        /// Attribute citing an entry of the `refs` table. Default `ref`.
        ref_attribute, with_ref_attribute;
        /// Attribute naming a def. Default `defName`.
        def_name_attribute, with_def_name_attribute;
        /// Root of def documents. Default `Defs`.
        defs_root, with_defs_root;
        /// Root of record documents. Default `Record`.
        record_root, with_record_root;
        /// Tag of `refs` entries. Default `Ref`.
        ref_tag, with_ref_tag;
        /// Attribute holding the id of a `refs` entry. Default `id`.
        ref_id_attribute, with_ref_id_attribute;
        /// Attribute holding the type path of a `refs` entry. Default `class`.
        ref_class_attribute, with_ref_class_attribute;
    }

    /// Value written to and expected in `recordFormatVersion`.
    #[inline]
    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    #[inline]
    pub fn with_format_version(mut self, version: u32) -> Self {
        self.format_version = version;
        self
    }

    /// Spaces per level of written documents; `None` writes one line.
    #[inline]
    pub fn indent(&self) -> Option<usize> {
        self.indent
    }

    #[inline]
    pub fn with_indent(mut self, indent: Option<usize>) -> Self {
        self.indent = indent;
        self
    }
}
