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
    any_of: bool,
    value: Expr,
}

impl Parse for Field {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let ident = input.parse()?;
        input.parse::<Token![:]>()?;

        let value = input.parse::<Expr>()?;

        if let Expr::Call(expr_call) = &value {
            if let Expr::Path(expr_path) = expr_call.func.as_ref() {
                if expr_path.path.is_ident("AnyOf") && expr_call.args.len() == 1 {
                    return Ok(Self {
                        ident,
                        any_of: true,
                        value: expr_call.args[0].clone(),
                    });
                }
            }
        }

        Ok(Self {
            ident,
            any_of: false,
            value,
        })
    }
}

pub fn func_construct_query(input: TokenStream) -> Result<TokenStream> {
    let input = parse2::<Input>(input)?;

    let output = build(&input);

    Ok(output)
}

fn build(input: &Input) -> TokenStream {
    let krate = krate();
    let bson = bson();
    let module = &input.module;

    let entries = input.fields.iter().map(|field| {
        let variant = variant_ident(&field.ident);
        let value = &field.value;

        if field.any_of {
            quote! {
                .any_of(#module::Fields::#variant, #value)
            }
        } else {
            quote! {
                .with(#module::Fields::#variant, #bson::bson!(#value))
            }
        }
    });

    quote! {
        #krate::Query::new()
            #( #entries )*
    }
}
