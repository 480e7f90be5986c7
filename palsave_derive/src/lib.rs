use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, parse_quote, DeriveInput, GenericParam};

/// Generates a fixed-order `palsave::Archive` implementation for a struct with
/// named fields.
///
/// ```
/// use palsave::{Archive, ArchiveReader, ArchiveWriter, Guid};
///
/// #[derive(Archive, Debug, PartialEq)]
/// pub struct Member {
///     id: Guid,
///     level: i32,
///     name: String,
/// }
///
/// let member = Member {
///     id: Guid::from_bytes([7; 16]),
///     level: 12,
///     name: String::from("Zoe"),
/// };
///
/// let mut writer = ArchiveWriter::new();
/// member.write(&mut writer);
/// let data = writer.into_inner();
///
/// let mut reader = ArchiveReader::new(&data);
/// assert_eq!(Member::read(&mut reader).unwrap(), member);
/// assert!(reader.is_empty());
/// ```
///
/// ## The What
///
/// Fields are read and written in declaration order, each through its own
/// `Archive` implementation. Nothing else is emitted: no length prefix, no
/// field tags, no padding. The struct layout *is* the wire layout.
///
/// ## The Why
///
/// Raw data blobs in a save file are serialized by the game with a plain
/// sequence of `<<` operators. Their decoders and encoders must visit the same
/// fields in the same order, and writing both halves by hand invites the two
/// drifting apart. Deriving both halves from a single field list removes that
/// class of bug for every record that has no variant-dependent fields.
///
/// Records whose layout depends on a discriminator (group and work records)
/// compose derived building blocks by hand.
#[proc_macro_derive(Archive)]
pub fn derive(input: TokenStream) -> TokenStream {
    let dinput = parse_macro_input!(input as DeriveInput);
    let struct_ident = dinput.ident;

    let syn_struct = match dinput.data {
        syn::Data::Struct(x) => x,
        _ => panic!("Expected struct"),
    };

    let named_fields = match syn_struct.fields {
        syn::Fields::Named(x) => x,
        _ => panic!("Expected named fields"),
    };

    let mut generics = dinput.generics;
    for param in &mut generics.params {
        if let GenericParam::Type(ref mut type_param) = *param {
            type_param.bounds.push(parse_quote!(::palsave::Archive));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let reads = named_fields.named.iter().map(|f| {
        let name = &f.ident;
        let ty = &f.ty;
        quote! { #name: <#ty as ::palsave::Archive>::read(reader)? }
    });

    let writes = named_fields.named.iter().map(|f| {
        let name = &f.ident;
        quote! { ::palsave::Archive::write(&self.#name, writer); }
    });

    let output = quote! {
        impl #impl_generics ::palsave::Archive for #struct_ident #ty_generics #where_clause {
            fn read(
                reader: &mut ::palsave::ArchiveReader<'_>,
            ) -> ::std::result::Result<Self, ::palsave::Error> {
                ::std::result::Result::Ok(#struct_ident {
                    #(#reads),*
                })
            }

            fn write(&self, writer: &mut ::palsave::ArchiveWriter) {
                #(#writes)*
            }
        }
    };

    output.into()
}
