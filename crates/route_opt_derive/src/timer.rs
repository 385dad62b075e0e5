use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{ItemFn, LitStr, parse_macro_input};

pub fn timer_inner(attr: TokenStream, item: TokenStream) -> TokenStream {
    let func = parse_macro_input!(item as ItemFn);

    let label = if attr.is_empty() {
        LitStr::new(&func.sig.ident.to_string(), Span::call_site())
    } else {
        parse_macro_input!(attr as LitStr)
    };

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = func;
    let stmts = &block.stmts;

    // The guard is the first local, so it drops after the body's tail value is produced.
    let expanded = quote! {
        #(#attrs)*
        #vis #sig {
            struct __TimerGuard(std::time::Instant);

            impl Drop for __TimerGuard {
                fn drop(&mut self) {
                    log::debug!(
                        "{}: elapsed_ms={:.3}",
                        #label,
                        self.0.elapsed().as_secs_f64() * 1_000.0
                    );
                }
            }

            let __timer_guard = __TimerGuard(std::time::Instant::now());
            #(#stmts)*
        }
    };

    TokenStream::from(expanded)
}
