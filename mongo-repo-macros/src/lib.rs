#[warn(clippy::pedantic)]
#[allow(clippy::too_many_lines)]
mod derive_item;
mod func_construct_patch;
mod func_construct_query;
mod prelude;
mod utils;

fn expand<F: FnOnce(proc_macro2::TokenStream) -> syn::Result<proc_macro2::TokenStream>>(
    fun: F,
    input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    fun(input.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[proc_macro_derive(Item, attributes(item))]
pub fn item(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    expand(derive_item::derive_item, input)
}

#[proc_macro]
pub fn construct_query(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    expand(func_construct_query::func_construct_query, input)
}

#[proc_macro]
pub fn construct_patch(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    expand(func_construct_patch::func_construct_patch, input)
}
