use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitStr, Variant, parse_macro_input};

use crate::utils;

/// One unit variant and every spelling that selects it.
struct Spelling {
    ident: Ident,
    canonical: LitStr,
    aliases: Vec<LitStr>,
}

pub fn derive_cli_value_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "CliValue can only be derived for enums",
        ));
    };

    let option_lit = option_name(&input)?;
    let spellings = data_enum
        .variants
        .iter()
        .map(spelling_of)
        .collect::<syn::Result<Vec<_>>>()?;

    let enum_ident = &input.ident;
    let canonical: Vec<&LitStr> = spellings.iter().map(|s| &s.canonical).collect();
    let parse_arms = spellings.iter().map(|s| {
        let ident = &s.ident;
        let canonical = &s.canonical;
        let aliases = &s.aliases;
        quote! { #canonical #(| #aliases)* => Ok(Self::#ident), }
    });
    let name_arms = spellings.iter().map(|s| {
        let ident = &s.ident;
        let canonical = &s.canonical;
        quote! { Self::#ident => #canonical, }
    });

    Ok(quote! {
        impl #enum_ident {
            /// Canonical command line spellings, in declaration order.
            pub const VARIANTS: &'static [&'static str] = &[#(#canonical),*];

            pub fn parse(raw: &str) -> crate::Result<Self> {
                match raw.trim().to_ascii_lowercase().as_str() {
                    #(#parse_arms)*
                    _ => Err(crate::Error::invalid_input(format!(
                        "Invalid value for --{}: {} (expected {})",
                        #option_lit,
                        raw,
                        Self::VARIANTS.join("|")
                    ))),
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }
        }

        impl std::str::FromStr for #enum_ident {
            type Err = crate::Error;

            fn from_str(raw: &str) -> crate::Result<Self> {
                Self::parse(raw)
            }
        }

        impl std::fmt::Display for #enum_ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    })
}

/// Option name used in error messages: `#[cli_value(option = "...")]` or the
/// kebab-cased enum name.
fn option_name(input: &DeriveInput) -> syn::Result<LitStr> {
    let mut name = utils::to_kebab_case(&input.ident.to_string());
    for attr in cli_attrs(&input.attrs, "cli_value") {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("option") {
                name = meta.value()?.parse::<LitStr>()?.value();
                Ok(())
            } else {
                Err(meta.error("unsupported cli_value attribute; expected option = \"...\""))
            }
        })?;
    }
    Ok(LitStr::new(&name, Span::call_site()))
}

fn spelling_of(variant: &Variant) -> syn::Result<Spelling> {
    if !matches!(variant.fields, Fields::Unit) {
        return Err(syn::Error::new_spanned(
            variant,
            "CliValue only supports enums with unit variants",
        ));
    }

    let mut canonical = utils::to_kebab_case(&variant.ident.to_string());
    let mut aliases = Vec::new();
    for attr in cli_attrs(&variant.attrs, "cli") {
        attr.parse_nested_meta(|meta| {
            let value = meta.value()?.parse::<LitStr>()?.value();
            if meta.path.is_ident("name") {
                canonical = value;
            } else if meta.path.is_ident("alias") {
                aliases.push(LitStr::new(&value, Span::call_site()));
            } else {
                return Err(meta.error("unsupported cli attribute; expected name/alias"));
            }
            Ok(())
        })?;
    }

    Ok(Spelling {
        ident: variant.ident.clone(),
        canonical: LitStr::new(&canonical, Span::call_site()),
        aliases,
    })
}

fn cli_attrs<'a>(attrs: &'a [Attribute], name: &'a str) -> impl Iterator<Item = &'a Attribute> {
    attrs.iter().filter(move |attr| attr.path().is_ident(name))
}
