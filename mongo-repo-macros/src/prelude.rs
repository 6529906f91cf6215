pub(crate) use crate::utils::{bson, extract, krate, variant_ident};
pub use darling::{FromAttributes, FromMeta, ast::NestedMeta};
pub use heck::{ToSnakeCase, ToUpperCamelCase};
pub use itertools::Itertools;
pub use proc_macro2::{Span, TokenStream};
pub use quote::quote;
pub use syn::{
    Data, DeriveInput, Error, Expr, Field, Fields, FieldsNamed, Ident, LitStr, Meta, Result, Token,
    Visibility, parse::Parse, parse2, punctuated::Punctuated, spanned::Spanned,
};
