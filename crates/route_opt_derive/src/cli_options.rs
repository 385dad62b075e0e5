use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Path, parse_macro_input, spanned::Spanned};

use crate::utils;

struct CliField {
    long: String,
    parse_with: Option<Path>,
    choices: Option<Path>,
    flag: bool,
}

pub fn derive_cli_options_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    let struct_ident = input.ident.clone();

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new(input.span(), "CliOptions can only be derived for structs")
            .to_compile_error()
            .into();
    };

    let Fields::Named(fields) = &data_struct.fields else {
        return syn::Error::new(input.span(), "CliOptions requires named fields")
            .to_compile_error()
            .into();
    };

    let mut arms = Vec::new();
    let mut flag_names = Vec::new();
    let mut usage_lines = Vec::new();

    for field in &fields.named {
        let Some(field_ident) = &field.ident else {
            continue;
        };

        let mut cli: Option<CliField> = None;
        for attr in &field.attrs {
            if !attr.path().is_ident("cli") {
                continue;
            }
            let entry = cli.get_or_insert_with(|| CliField {
                long: utils::to_kebab_case(&field_ident.to_string()),
                parse_with: None,
                choices: None,
                flag: false,
            });
            let parse_result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("long") {
                    let lit: LitStr = meta.value()?.parse()?;
                    entry.long = lit.value();
                    return Ok(());
                }
                if meta.path.is_ident("parse_with") {
                    let lit: LitStr = meta.value()?.parse()?;
                    entry.parse_with = Some(syn::parse_str(&lit.value())?);
                    return Ok(());
                }
                if meta.path.is_ident("choices") {
                    let lit: LitStr = meta.value()?.parse()?;
                    entry.choices = Some(syn::parse_str(&lit.value())?);
                    return Ok(());
                }
                if meta.path.is_ident("flag") {
                    entry.flag = true;
                    return Ok(());
                }
                Err(meta.error("unsupported cli attribute; expected long/parse_with/choices/flag"))
            });
            if let Err(err) = parse_result {
                return err.to_compile_error().into();
            }
        }

        let Some(cli) = cli else {
            continue;
        };

        if cli.flag && !utils::is_bool(&field.ty) {
            return syn::Error::new(field.span(), "cli(flag) requires a bool field")
                .to_compile_error()
                .into();
        }

        let long_lit = LitStr::new(&cli.long, Span::call_site());
        if cli.flag {
            let negated = format!("no-{}", cli.long);
            let negated_lit = LitStr::new(&negated, Span::call_site());
            arms.push(quote! {
                #long_lit => {
                    self.#field_ident = match value {
                        Some(raw) => Self::parse_flag_value(name, &raw)?,
                        None => true,
                    };
                    Ok(true)
                }
            });
            arms.push(quote! {
                #negated_lit => {
                    if value.is_some() {
                        return Err(crate::Error::invalid_input(format!(
                            "Flag --{name} does not take a value"
                        )));
                    }
                    self.#field_ident = false;
                    Ok(true)
                }
            });
            flag_names.push(long_lit.clone());
            flag_names.push(negated_lit.clone());
            usage_lines.push(quote! { format!("  --{}[=<bool>]", #long_lit) });
            usage_lines.push(quote! { format!("  --{}", #negated_lit) });
            continue;
        }

        let parse_expr = utils::build_cli_parse_expr(&field.ty, cli.parse_with.as_ref());
        arms.push(quote! {
            #long_lit => {
                let raw = value.ok_or_else(|| {
                    crate::Error::invalid_input(format!("Missing value for --{name}"))
                })?;
                self.#field_ident = #parse_expr;
                Ok(true)
            }
        });

        match &cli.choices {
            Some(choices) => usage_lines.push(quote! {
                format!("  --{} <{}>", #long_lit, #choices.join("|"))
            }),
            None => {
                let hint = LitStr::new(&utils::value_hint(&field.ty), Span::call_site());
                usage_lines.push(quote! { format!("  --{} {}", #long_lit, #hint) });
            }
        }
    }

    let flag_match = if flag_names.is_empty() {
        quote! { false }
    } else {
        quote! { matches!(name, #(#flag_names)|*) }
    };

    let expanded = quote! {
        impl #struct_ident {
            fn is_cli_flag(name: &str) -> bool {
                #flag_match
            }

            fn split_arg(
                raw_name: &str,
                args: &mut std::iter::Peekable<impl Iterator<Item = String>>,
            ) -> (String, Option<String>) {
                if let Some((k, v)) = raw_name.split_once('=') {
                    return (k.to_string(), Some(v.to_string()));
                }
                if Self::is_cli_flag(raw_name) {
                    return (raw_name.to_string(), None);
                }

                let value = match args.peek() {
                    Some(next) if !next.starts_with("--") => args.next(),
                    _ => None,
                };

                (raw_name.to_string(), value)
            }

            fn parse_flag_value(name: &str, raw: &str) -> crate::Result<bool> {
                match raw {
                    "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "on" | "ON" => Ok(true),
                    "0" | "false" | "FALSE" | "False" | "no" | "NO" | "off" | "OFF" => Ok(false),
                    _ => Err(crate::Error::invalid_input(format!(
                        "Invalid boolean for --{name}: {raw} (expected true/false)"
                    ))),
                }
            }

            fn apply_cli_option(
                &mut self,
                name: &str,
                value: Option<String>,
            ) -> crate::Result<bool> {
                match name {
                    #(#arms,)*
                    _ => Ok(false),
                }
            }

            fn cli_usage_lines() -> Vec<String> {
                vec![#(#usage_lines),*]
            }
        }
    };

    TokenStream::from(expanded)
}
