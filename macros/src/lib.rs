use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use syn::{
    parse_macro_input, parse_quote, Data, DeriveInput, GenericParam, LitStr, Path,
};

/// Derive `like_toggle::data::Data` for a struct or enum.
///
/// Every type parameter gets a `Data` bound.
/// Inside `like-toggle` itself, use `#[like_toggle(path = "crate")]`.
#[proc_macro_derive(Data, attributes(like_toggle))]
pub fn derive_data(input: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(input as DeriveInput);

    if let Data::Union(_) = input.data {
        return quote! {
            compile_error!("`Data` cannot be derived for unions.");
        }
        .into();
    }

    let mut krate: Path = parse_quote!(like_toggle);
    for attr in input
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("like_toggle"))
    {
        let result = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("path") {
                let value: LitStr = meta.value()?.parse()?;
                krate = value.parse()?;
                Ok(())
            } else {
                Err(meta.error("expected `path = \"...\"`"))
            }
        });

        if let Err(error) = result {
            return error.to_compile_error().into();
        }
    }

    for param in input.generics.params.iter_mut() {
        if let GenericParam::Type(type_param) = param {
            type_param.bounds.push(parse_quote!(#krate::data::Data));
        }
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let krate = krate.to_token_stream();

    quote! {
        #[doc(hidden)]
        impl #impl_generics #krate::data::Data for #ident #ty_generics #where_clause {}
    }
    .into()
}
