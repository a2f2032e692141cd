extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;

#[proc_macro_derive(Decode)]
pub fn decode_derive(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    impl_decode(&ast)
}

fn impl_decode(ast: &syn::DeriveInput) -> TokenStream {
    let decode_trait = quote! { ::bbuf::conv::Decode };
    let parser_trait = quote! { ::bbuf::parse::Parser };
    let parse_result_type = quote! { ::bbuf::parse::ParseResult };

    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let gen = match &ast.data {
        syn::Data::Enum(_) => {
            return syn::Error::new_spanned(name, "derive macro `Decode` is not implemented for enums")
                .to_compile_error()
                .into()
        }
        syn::Data::Union(_) => {
            return syn::Error::new_spanned(name, "derive macro `Decode` is not implemented for unions")
                .to_compile_error()
                .into()
        }
        syn::Data::Struct(syn::DataStruct { fields, .. }) => match fields {
            syn::Fields::Unit => {
                quote! {
                    impl #impl_generics #decode_trait for #name #ty_generics #where_clause {
                        fn parse<P: #parser_trait + ?Sized>(_: &mut P) -> #parse_result_type<Self> {
                            Ok(Self)
                        }
                    }
                }
            }
            syn::Fields::Unnamed(syn::FieldsUnnamed { unnamed, .. }) => {
                let ty = unnamed.iter().map(|x| &x.ty);
                quote! {
                    impl #impl_generics #decode_trait for #name #ty_generics #where_clause {
                        fn parse<P: #parser_trait + ?Sized>(p: &mut P) -> #parse_result_type<Self> {
                            Ok(Self(#( <#ty as #decode_trait>::parse(p)? ),*))
                        }
                    }
                }
            }
            syn::Fields::Named(syn::FieldsNamed { named, .. }) => {
                let (fname, ty): (Vec<&syn::Ident>, Vec<&syn::Type>) = named
                    .iter()
                    .filter_map(|x| x.ident.as_ref().map(|ident| (ident, &x.ty)))
                    .unzip();
                // Struct-literal fields are evaluated in source order, which is
                // the declared wire order.
                quote! {
                    impl #impl_generics #decode_trait for #name #ty_generics #where_clause {
                        fn parse<P: #parser_trait + ?Sized>(p: &mut P) -> #parse_result_type<Self> {
                            Ok(Self { #( #fname: <#ty as #decode_trait>::parse(p)? ),* })
                        }
                    }
                }
            }
        },
    };
    gen.into()
}
