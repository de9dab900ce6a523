use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::RecordStruct;

/// Implementations for structs with named fields.
pub(crate) fn impl_struct(info: &RecordStruct) -> TokenStream {
    let meta = &info.meta;

    let type_path_tokens = super::impl_trait_type_path(meta);
    let typed_tokens = super::impl_trait_typed(meta, schema_tokens(info));
    let get_type_meta_tokens =
        super::impl_trait_get_type_meta(meta, register_deps_tokens(info), true);
    let recordable_tokens = impl_recordable(info);
    let record_fields_tokens = impl_record_fields(info);
    let def_tokens = impl_def(info);
    let auto_register_tokens = super::get_auto_register_impl(meta);

    quote! {
        #type_path_tokens

        #typed_tokens

        #get_type_meta_tokens

        #recordable_tokens

        #record_fields_tokens

        #def_tokens

        #auto_register_tokens
    }
}

/// ```ignore
/// SchemaNode::Composite(
///     CompositeInfo::new::<Self>(&[FieldDescriptor::new::<A>("a"), ..])
///         .with_base::<B>("b")
///         .with_def_root(<Self as Def>::def_root)
///         .with_index_fields(&["index"])
/// )
/// ```
fn schema_tokens(info: &RecordStruct) -> TokenStream {
    let dg_record_path = info.meta.dg_record_path();
    let schema_node_ = crate::path::schema_node_(dg_record_path);
    let composite_info_ = crate::path::composite_info_(dg_record_path);
    let field_descriptor_ = crate::path::field_descriptor_(dg_record_path);

    let fields = info.serialized_fields().map(|field| {
        let ty = field.ty();
        let label = field.label();
        quote! {
            #field_descriptor_::new::<#ty>(#label)
        }
    });

    let with_base = info.base().map(|base| {
        let ty = base.ty();
        let name = base.ident.to_string();
        quote! { .with_base::<#ty>(#name) }
    });

    let with_def_root = info.meta.attrs().def.map(|_| {
        let def_ = crate::path::def_(dg_record_path);
        quote! { .with_def_root(<Self as #def_>::def_root) }
    });

    let with_index_fields = info.has_index().then(|| {
        let names = info.index_fields().map(|field| field.ident.to_string());
        quote! { .with_index_fields(&[#(#names),*]) }
    });

    quote! {
        #schema_node_::Composite(
            #composite_info_::new::<Self>(&[#(#fields),*])
                #with_base
                #with_def_root
                #with_index_fields
        )
    }
}

fn register_deps_tokens(info: &RecordStruct) -> TokenStream {
    let type_registry_ = crate::path::type_registry_(info.meta.dg_record_path());

    let types = info
        .serialized_fields()
        .chain(info.base())
        .map(|field| field.ty());

    quote! {
        fn register_dependencies(registry: &mut #type_registry_) {
            #(registry.register::<#types>();)*
        }
    }
}

fn impl_recordable(info: &RecordStruct) -> TokenStream {
    let dg_record_path = info.meta.dg_record_path();
    let recordable_ = crate::path::recordable_(dg_record_path);
    let record_fields_ = crate::path::record_fields_(dg_record_path);
    let type_path_ = crate::path::type_path_(dg_record_path);
    let field_reader_ = crate::path::field_reader_(dg_record_path);
    let field_writer_ = crate::path::field_writer_(dg_record_path);
    let read_context_ = crate::path::read_context_(dg_record_path);
    let write_context_ = crate::path::write_context_(dg_record_path);
    let element_ = crate::path::element_(dg_record_path);
    let default_ = crate::path::default_(dg_record_path);

    let ident = info.meta.ident();
    let assign_indices = assign_indices_tokens(info);
    let index_value = index_value_tokens(info);

    quote! {
        impl #recordable_ for #ident {
            #[inline]
            fn create() -> Self {
                <Self as #default_>::default()
            }

            fn read(&mut self, node: &mut #element_, cx: &mut #read_context_<'_>) {
                let mut reader = #field_reader_::new(node, cx, <Self as #type_path_>::type_name());
                <Self as #record_fields_>::read_fields(self, &mut reader);
                reader.finish();
            }

            fn write(&self, node: &mut #element_, cx: &mut #write_context_<'_>) {
                let mut writer = #field_writer_::new(node, cx);
                <Self as #record_fields_>::write_fields(self, &mut writer);
            }

            #assign_indices

            #index_value
        }
    }
}

/// Shared objects: one index per table, the own table first, then the
/// base's.
fn assign_indices_tokens(info: &RecordStruct) -> TokenStream {
    if !info.has_index() && info.base().is_none() {
        return crate::utils::empty();
    }

    let dg_record_path = info.meta.dg_record_path();
    let recordable_ = crate::path::recordable_(dg_record_path);
    let erased_shared_ = crate::path::erased_shared_(dg_record_path);
    let index_registry_ = crate::path::index_registry_(dg_record_path);
    let type_id_ = crate::path::type_id_(dg_record_path);

    let own = info.has_index().then(|| {
        let idents = info.index_fields().map(|field| field.ident);
        quote! {
            if let ::core::option::Option::Some(index) =
                indices.assign_erased(#type_id_::of::<Self>(), handle)
            {
                #(self.#idents = index;)*
            }
        }
    });

    let base = info.base().map(|base| {
        let ident = base.ident;
        let ty = base.ty();
        quote! {
            <#ty as #recordable_>::assign_indices(&mut self.#ident, handle, indices);
        }
    });

    quote! {
        fn assign_indices(&mut self, handle: &#erased_shared_, indices: &mut #index_registry_) {
            #own
            #base
        }
    }
}

/// Values of `#[record(clone)]` types: a fresh index and a stored copy on
/// every read.
fn index_value_tokens(info: &RecordStruct) -> TokenStream {
    if info.meta.attrs().clone.is_none() {
        return crate::utils::empty();
    }

    let dg_record_path = info.meta.dg_record_path();
    let recordable_ = crate::path::recordable_(dg_record_path);
    let read_context_ = crate::path::read_context_(dg_record_path);

    let base = info.base().map(|base| {
        let ident = base.ident;
        let ty = base.ty();
        quote! {
            <#ty as #recordable_>::index_value(&mut self.#ident, cx);
        }
    });

    let idents = info.index_fields().map(|field| field.ident);

    quote! {
        fn index_value(&mut self, cx: &mut #read_context_<'_>) {
            #base
            let index = cx.indices().reserve::<Self>();
            #(self.#idents = index;)*
            cx.indices().fill::<Self>(index, ::core::clone::Clone::clone(self));
        }
    }
}

fn impl_record_fields(info: &RecordStruct) -> TokenStream {
    let dg_record_path = info.meta.dg_record_path();
    let record_fields_ = crate::path::record_fields_(dg_record_path);
    let field_reader_ = crate::path::field_reader_(dg_record_path);
    let field_writer_ = crate::path::field_writer_(dg_record_path);

    let ident = info.meta.ident();

    let reads = info.serialized_fields().map(|field| {
        let ident = field.ident;
        let label = field.label();
        quote! { reader.read(&mut self.#ident, #label); }
    });
    let writes = info.serialized_fields().map(|field| {
        let ident = field.ident;
        let label = field.label();
        quote! { writer.write(&self.#ident, #label); }
    });

    let (read_base, write_base) = match info.base() {
        Some(base) => {
            let ident = base.ident;
            let ty = base.ty();
            (
                quote! { <#ty as #record_fields_>::read_fields(&mut self.#ident, reader); },
                quote! { <#ty as #record_fields_>::write_fields(&self.#ident, writer); },
            )
        }
        None => (crate::utils::empty(), crate::utils::empty()),
    };

    quote! {
        impl #record_fields_ for #ident {
            fn read_fields(&mut self, reader: &mut #field_reader_<'_, '_>) {
                #(#reads)*
                #read_base
            }

            fn write_fields(&self, writer: &mut #field_writer_<'_, '_>) {
                #(#writes)*
                #write_base
            }
        }
    }
}

fn impl_def(info: &RecordStruct) -> TokenStream {
    if info.meta.attrs().def.is_none() {
        return crate::utils::empty();
    }

    let dg_record_path = info.meta.dg_record_path();
    let def_ = crate::path::def_(dg_record_path);
    let type_id_ = crate::path::type_id_(dg_record_path);

    let ident = info.meta.ident();
    let root = match info.base() {
        Some(base) => {
            let ty = base.ty();
            quote! { <#ty as #def_>::def_root() }
        }
        None => quote! { #type_id_::of::<Self>() },
    };

    quote! {
        impl #def_ for #ident {
            #[inline]
            fn def_root() -> #type_id_ {
                #root
            }
        }
    }
}
