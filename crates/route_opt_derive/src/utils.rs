use quote::quote;
use syn::{AngleBracketedGenericArguments, GenericArgument, Path, PathArguments, Type, TypePath};

pub fn inner_of_option(ty: &Type) -> Option<&Type> {
    let Type::Path(TypePath { path, .. }) = ty else {
        return None;
    };
    let is_option = match path.segments.len() {
        1 => path.segments[0].ident == "Option",
        3 => {
            (path.segments[0].ident == "std" || path.segments[0].ident == "core")
                && path.segments[1].ident == "option"
                && path.segments[2].ident == "Option"
        }
        _ => false,
    };
    if !is_option {
        return None;
    }

    if let Some(seg) = path.segments.last()
        && let PathArguments::AngleBracketed(AngleBracketedGenericArguments { args, .. }) =
            &seg.arguments
        && let Some(GenericArgument::Type(t)) = args.first()
    {
        return Some(t);
    }
    None
}

pub fn is_bool(ty: &Type) -> bool {
    matches!(ty, Type::Path(TypePath { path, .. }) if path.is_ident("bool"))
}

/// Expression turning `raw: String` into the field value, using `?` on failure.
pub fn build_cli_parse_expr(ty: &Type, parse_with: Option<&Path>) -> proc_macro2::TokenStream {
    if let Some(parse_with) = parse_with {
        return quote! { #parse_with(&raw)? };
    }

    if let Some(inner) = inner_of_option(ty) {
        return quote! {
            match raw.trim() {
                "" | "none" | "NONE" | "None" => None,
                trimmed => Some(trimmed.parse::<#inner>().map_err(|e| {
                    crate::Error::invalid_input(format!(
                        "Invalid value for --{name}: {raw} ({e})"
                    ))
                })?),
            }
        };
    }

    quote! {
        raw.parse::<#ty>()
            .map_err(|e| crate::Error::invalid_input(format!(
                "Invalid value for --{name}: {raw} ({e})"
            )))?
    }
}

/// Placeholder shown in usage text for a value of type `ty`.
pub fn value_hint(ty: &Type) -> String {
    let ty = inner_of_option(ty).unwrap_or(ty);
    match ty {
        Type::Path(TypePath { path, .. }) => match path.segments.last() {
            Some(seg) if seg.ident == "String" || seg.ident == "PathBuf" => "<path>".to_string(),
            Some(seg) => format!("<{}>", seg.ident),
            None => "<value>".to_string(),
        },
        _ => "<value>".to_string(),
    }
}

pub fn to_kebab_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (idx, ch) in s.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if idx != 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else if ch == '_' {
            out.push('-');
        } else {
            out.push(ch);
        }
    }
    out
}
