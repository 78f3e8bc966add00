//! `#[derive(Mold)]` for structs with named fields.
//!
//! The derive generates the `Mold` and `StructTarget` implementations the
//! decode engine works through. Field annotations are written as raw tag
//! strings and embedded untouched; the engine parses them at decode time so
//! the tag namespace and option spellings stay runtime-configurable:
//!
//! ```ignore
//! #[derive(Default, Mold)]
//! struct Endpoint {
//!     #[remold("addr")]
//!     address: String,
//!     #[remold(",omitempty", json = "port")]
//!     port: Option<u16>,
//! }
//! ```
//!
//! A bare string literal targets the default `remold` namespace; `name =
//! "..."` targets an alternate namespace selected via the decoder's
//! `tag_name`.

use proc_macro::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr, Token};

/// One argument of a `#[remold(...)]` attribute.
enum TagArg {
    /// `"alias,opt"` — the default namespace.
    Default(LitStr),

    /// `namespace = "alias,opt"`.
    Namespaced(syn::Ident, LitStr),
}

impl Parse for TagArg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            Ok(TagArg::Default(input.parse()?))
        } else {
            let namespace: syn::Ident = input.parse()?;
            let _: Token![=] = input.parse()?;
            let value: LitStr = input.parse()?;
            Ok(TagArg::Namespaced(namespace, value))
        }
    }
}

#[proc_macro_derive(Mold, attributes(remold))]
pub fn derive_mold(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

fn expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Mold can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Mold requires a struct with named fields",
        ));
    };

    let name = &input.ident;
    let label = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut field_idents = Vec::new();
    let mut field_names = Vec::new();
    let mut field_tags = Vec::new();
    for field in &fields.named {
        let ident = field.ident.clone().expect("named field");
        let tags = field_tag_strings(&field.attrs)?;
        let pairs = tags.iter().map(|(namespace, raw)| quote! { (#namespace, #raw) });
        field_tags.push(quote! { &[ #( #pairs ),* ] });
        field_names.push(ident.to_string());
        field_idents.push(ident);
    }

    Ok(quote! {
        impl #impl_generics ::remold::Mold for #name #ty_generics #where_clause {
            fn kind() -> ::remold::Kind {
                ::remold::Kind::Struct
            }

            fn label() -> &'static str {
                #label
            }

            fn shape(&self) -> ::remold::Kind {
                ::remold::Kind::Struct
            }

            fn type_label(&self) -> &'static str {
                #label
            }

            fn as_target(&mut self) -> ::remold::Target<'_> {
                ::remold::Target::Struct(self)
            }

            fn to_value(&self) -> ::remold::Value {
                ::remold::Value::Record(::remold::Record {
                    type_name: #label,
                    fields: ::std::vec![ #(
                        ::remold::RecordField {
                            name: #field_names,
                            tags: #field_tags,
                            value: ::remold::Mold::to_value(&self.#field_idents),
                            zero: ::remold::Mold::is_zero(&self.#field_idents),
                        }
                    ),* ],
                })
            }

            fn is_zero(&self) -> bool {
                true #( && ::remold::Mold::is_zero(&self.#field_idents) )*
            }
        }

        impl #impl_generics ::remold::StructTarget for #name #ty_generics #where_clause {
            fn type_name(&self) -> &'static str {
                #label
            }

            fn fields(&mut self) -> ::std::vec::Vec<::remold::FieldSlot<'_>> {
                let Self { #( #field_idents ),* } = self;
                ::std::vec![ #(
                    ::remold::FieldSlot {
                        name: #field_names,
                        tags: #field_tags,
                        value: #field_idents,
                    }
                ),* ]
            }
        }
    })
}

/// Collect every `(namespace, raw tag)` pair declared on a field.
fn field_tag_strings(attrs: &[syn::Attribute]) -> syn::Result<Vec<(String, String)>> {
    let mut tags = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("remold") {
            continue;
        }
        let args = attr.parse_args_with(Punctuated::<TagArg, Token![,]>::parse_terminated)?;
        for arg in args {
            match arg {
                TagArg::Default(value) => tags.push(("remold".to_string(), value.value())),
                TagArg::Namespaced(namespace, value) => {
                    tags.push((namespace.to_string(), value.value()));
                }
            }
        }
    }
    Ok(tags)
}
