use crate::prelude::*;
use proc_macro_crate::{FoundCrate, crate_name};

macro_rules! extract {
    ($val:expr, $pat:pat, $error_message: expr) => {
        let $pat = $val else {
            return Err(Error::new_spanned($val, $error_message));
        };
    };
}

pub(crate) use extract;

pub fn extract_named_fields(span: Span, data: Data) -> Result<FieldsNamed> {
    let Data::Struct(data_struct) = data else {
        return Err(Error::new(span, "expected struct"));
    };

    extract!(
        data_struct.fields,
        Fields::Named(named_fields),
        "expected named fields"
    );

    Ok(named_fields)
}

/// Reads `#[serde(rename = "..")]`, skipping the other serde keys.
pub fn extract_serde_rename(field: &Field) -> Result<Option<String>> {
    let mut rename = None;

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        let Meta::List(list) = &attr.meta else {
            continue;
        };

        for item in NestedMeta::parse_meta_list(list.tokens.clone())? {
            if let NestedMeta::Meta(meta @ Meta::NameValue(name_value)) = &item {
                if name_value.path.is_ident("rename") {
                    rename = Some(String::from_meta(meta)?);
                }
            }
        }
    }

    Ok(rename)
}

/// Name a field is stored under: its serde rename, or the field ident.
pub fn stored_name(ident: &Ident, rename: Option<&str>) -> String {
    rename.map_or_else(|| ident.to_string(), str::to_owned)
}

pub fn variant_ident(ident: &Ident) -> Ident {
    Ident::new(&ident.to_string().to_upper_camel_case(), ident.span())
}

pub fn build_fields_enum<'a>(
    field_idents: impl Iterator<Item = &'a Ident>,
    field_lits: impl Iterator<Item = &'a LitStr>,
) -> TokenStream {
    let variants = field_idents.map(variant_ident).collect_vec();

    quote! {
        #[derive(::std::fmt::Debug, ::std::clone::Clone, ::std::marker::Copy, ::std::cmp::PartialEq, ::std::cmp::Eq)]
        pub enum Fields {
            #( #variants ),*
        }

        impl Fields {
            pub fn as_str(self) -> &'static str {
                match self {
                    #(
                        Self::#variants => #field_lits
                    ),*
                }
            }
        }

        impl ::std::fmt::Display for Fields {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Formatter::write_str(f, self.as_str())
            }
        }

        impl ::std::convert::From<Fields> for ::std::string::String {
            fn from(value: Fields) -> Self {
                ::std::string::ToString::to_string(&value)
            }
        }
    }
}

pub fn krate() -> TokenStream {
    match crate_name("mongo-repo") {
        Ok(FoundCrate::Itself) => quote! { crate },
        Ok(FoundCrate::Name(name)) => {
            let name = Ident::new(&name, Span::call_site());
            quote! { ::#name }
        }
        Err(_) => quote! { ::mongo_repo },
    }
}

pub fn bson() -> TokenStream {
    let krate = krate();
    quote! { #krate::mongodb::bson }
}
