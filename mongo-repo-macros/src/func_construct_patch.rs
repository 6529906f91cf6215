use crate::prelude::*;

struct Input {
    module: Ident,
    fields: Punctuated<Field, Token![,]>,
}

impl Parse for Input {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let module = input.parse()?;
        input.parse::<Token![,]>()?;
        let fields = Punctuated::parse_terminated(input)?;
        Ok(Self { module, fields })
    }
}

struct Field {
    ident: Ident,
    value: Expr,
}

impl Parse for Field {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let ident = input.parse()?;
        input.parse::<Token![:]>()?;
        let value = input.parse()?;

        Ok(Self { ident, value })
    }
}

pub fn func_construct_patch(input: TokenStream) -> Result<TokenStream> {
    let input = parse2::<Input>(input)?;

    let output = build(&input);

    Ok(output)
}

fn build(input: &Input) -> TokenStream {
    let bson = bson();
    let module = &input.module;

    let inserts = input.fields.iter().map(|field| {
        let variant = variant_ident(&field.ident);
        let value = &field.value;

        quote! {
            #bson::Document::insert(
                &mut document,
                #module::Fields::#variant.as_str(),
                #bson::bson!(#value),
            );
        }
    });

    quote! {
        {
            let mut document = #bson::Document::new();
            #( #inserts )*
            document
        }
    }
}
