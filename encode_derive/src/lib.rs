extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;

#[proc_macro_derive(Encode)]
pub fn encode_derive(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    impl_encode(&ast)
}

fn impl_encode(ast: &syn::DeriveInput) -> TokenStream {
    let encode_trait = quote! { ::bbuf::conv::Encode };
    let target_trait = quote! { ::bbuf::conv::target::Target };
    let write_all_to = quote! { ::bbuf::write_all_to! };

    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let body = match &ast.data {
        syn::Data::Enum(_) => {
            return syn::Error::new_spanned(name, "derive macro `Encode` is not implemented for enums")
                .to_compile_error()
                .into()
        }
        syn::Data::Union(_) => {
            return syn::Error::new_spanned(name, "derive macro `Encode` is not implemented for unions")
                .to_compile_error()
                .into()
        }
        syn::Data::Struct(syn::DataStruct { fields, .. }) => match fields {
            syn::Fields::Unit => quote! { #write_all_to(=> buf) },
            syn::Fields::Unnamed(syn::FieldsUnnamed { unnamed, .. }) => {
                let i = (0..unnamed.len()).map(syn::Index::from);
                quote! { #write_all_to(#( self.#i ),* => buf) }
            }
            syn::Fields::Named(syn::FieldsNamed { named, .. }) => {
                let ident = named.iter().filter_map(|field| field.ident.as_ref());
                quote! { #write_all_to(#( self.#ident ),* => buf) }
            }
        },
    };

    let gen = quote! {
        impl #impl_generics #encode_trait for #name #ty_generics #where_clause {
            fn write_to<U: #target_trait + ?Sized>(&self, buf: &mut U) -> usize {
                #[allow(unused_imports)]
                use #encode_trait as _;

                #body
            }
        }
    };
    gen.into()
}
