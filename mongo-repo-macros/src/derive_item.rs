use crate::{
    prelude::*,
    utils::{build_fields_enum, extract_named_fields, extract_serde_rename, stored_name},
};

#[derive(FromAttributes)]
#[darling(attributes(item))]
struct Attributes {
    #[darling(default)]
    table: Option<String>,
    #[darling(default)]
    pk: Option<String>,
    #[darling(default)]
    id_as: Option<String>,
}

struct FieldConfig {
    ident: Ident,
    stored: LitStr,
}

pub fn derive_item(item: TokenStream) -> Result<TokenStream> {
    let input = parse2::<DeriveInput>(item)?;

    let attributes = Attributes::from_attributes(&input.attrs)?;

    let fields_named = extract_named_fields(input.span(), input.data)?;
    let fields_span = fields_named.span();

    let fields = fields_named
        .named
        .iter()
        .map(|field| {
            let rename = extract_serde_rename(field)?;
            extract!(&field.ident, Some(ident), "expected named field");

            Ok(FieldConfig {
                ident: ident.clone(),
                stored: LitStr::new(&stored_name(ident, rename.as_deref()), ident.span()),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let pk = attributes.pk.unwrap_or_else(|| "_id".to_owned());

    if pk != "_id" && !fields.iter().any(|field| field.stored.value() == pk) {
        return Err(Error::new(
            fields_span,
            format!("pk `{pk}` does not name a stored field"),
        ));
    }

    let id_as = attributes.id_as.filter(|alias| !alias.is_empty());

    Ok(build(
        &input.vis,
        &input.ident,
        attributes.table.as_deref(),
        &pk,
        id_as.as_deref(),
        &fields,
    ))
}

fn build(
    vis: &Visibility,
    ident: &Ident,
    table: Option<&str>,
    pk: &str,
    id_as: Option<&str>,
    fields: &[FieldConfig],
) -> TokenStream {
    let krate = krate();

    let snake_item = ident.to_string().to_snake_case();

    let mod_ident = Ident::new(&snake_item, Span::call_site());

    let table_name =
        table.unwrap_or_else(|| snake_item.strip_suffix("_item").unwrap_or(&snake_item));
    let table_lit = LitStr::new(table_name, Span::call_site());

    let pk_lit = LitStr::new(pk, Span::call_site());

    let id_as = match id_as {
        Some(alias) => {
            let alias = LitStr::new(alias, Span::call_site());
            quote! { ::std::option::Option::Some(#alias) }
        }
        None => quote! { ::std::option::Option::None },
    };

    let fields_enum = build_fields_enum(
        fields.iter().map(|field| &field.ident),
        fields.iter().map(|field| &field.stored),
    );

    quote! {
        #vis mod #mod_ident {
            use super::*;

            impl #krate::Item for #ident {
                type Fields = Fields;

                const TABLE_NAME: &'static str = #table_lit;

                const PK: &'static str = #pk_lit;

                const ID_AS: ::std::option::Option<&'static str> = #id_as;
            }

            #fields_enum

            #[allow(unused_macros)]
            macro_rules! query {
                ($( $input: tt )*) => {
                    #krate::construct_query!(#mod_ident, $( $input )*)
                };
            }

            #[allow(unused_imports)]
            pub(crate) use query;

            #[allow(unused_macros)]
            macro_rules! patch {
                ($( $input: tt )*) => {
                    #krate::construct_patch!(#mod_ident, $( $input )*)
                };
            }

            #[allow(unused_imports)]
            pub(crate) use patch;
        }
    }
}
