use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Field};

/// Derives `portfolio_di::Build` for a struct by building each of its fields.
///
/// Fields marked with `#[state]` are initialized with `Default::default()`
/// instead. The built value is stored in the provider's cache, so all
/// dependents share the same instance (and therefore the same state).
#[proc_macro_derive(Build, attributes(state))]
pub fn derive_build(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let ident = input.ident;

    let generics = input
        .generics
        .type_params()
        .map(|x| &x.ident)
        .collect::<Vec<_>>();

    let syn::Data::Struct(data) = input.data else {
        return quote! { ::core::compile_error!("Build can only be derived for structs"); }.into();
    };

    fn is_state(field: &Field) -> bool {
        field
            .attrs
            .iter()
            .any(|x| x.path().get_ident().is_some_and(|x| x == "state"))
    }

    let bounds = data
        .fields
        .iter()
        .filter(|x| !is_state(x))
        .map(|Field { ty, .. }| quote! { #ty: ::portfolio_di::Build<__Provider> })
        .collect::<Vec<_>>();

    let build_expr = match data.fields {
        syn::Fields::Named(fields) => {
            let fields = fields
                .named
                .iter()
                .map(|f @ Field { ident, .. }| {
                    if is_state(f) {
                        quote! { #ident: ::core::default::Default::default() }
                    } else {
                        quote! { #ident: ::portfolio_di::Build::build(provider) }
                    }
                })
                .collect::<Vec<_>>();
            quote! { Self { #(#fields),* } }
        }
        syn::Fields::Unnamed(fields) => {
            let fields = fields
                .unnamed
                .iter()
                .map(|f| {
                    if is_state(f) {
                        quote! { ::core::default::Default::default() }
                    } else {
                        quote! { ::portfolio_di::Build::build(provider) }
                    }
                })
                .collect::<Vec<_>>();
            quote! { Self( #(#fields),* ) }
        }
        syn::Fields::Unit => quote! { Self },
    };

    quote! {
        impl<__Provider, #(#generics),*> ::portfolio_di::Build<__Provider> for #ident<#(#generics),*>
        where
            Self: ::core::clone::Clone + 'static,
            __Provider: ::portfolio_di::Provider,
            #(#bounds),*
        {
            fn build(provider: &mut __Provider) -> Self {
                if let ::core::option::Option::Some(cached) =
                    ::portfolio_di::Provider::cache(provider).get::<Self>()
                {
                    return ::core::clone::Clone::clone(cached);
                }

                let built: Self = #build_expr;
                ::portfolio_di::Provider::cache(provider)
                    .insert(::core::clone::Clone::clone(&built));
                built
            }
        }
    }
    .into()
}
