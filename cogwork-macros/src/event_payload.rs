use crate::utils::apply_derives;
use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Item, LitStr, Result, Token, parse::Parse, parse::ParseStream, parse_macro_input};

/// #[event_payload] 宏实现
/// - 支持结构体（具名/tuple/unit）与枚举
/// - 事件类型：`event_type = "..."`，缺省为类型名
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as EventPayloadAttrConfig);
    let mut input = parse_macro_input!(item as Item);

    let required: Vec<syn::Path> = vec![
        syn::parse_quote!(Debug),
        syn::parse_quote!(Clone),
        syn::parse_quote!(PartialEq),
        syn::parse_quote!(serde::Serialize),
        syn::parse_quote!(serde::Deserialize),
    ];

    let (ident, generics) = match &mut input {
        Item::Struct(st) => {
            apply_derives(&mut st.attrs, required);
            (st.ident.clone(), st.generics.clone())
        }
        Item::Enum(en) => {
            apply_derives(&mut en.attrs, required);
            (en.ident.clone(), en.generics.clone())
        }
        other => {
            return syn::Error::new(other.span(), "#[event_payload] only supports struct or enum")
                .to_compile_error()
                .into();
        }
    };

    let event_type = cfg
        .event_type
        .unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let out = quote! {
        #input

        impl #impl_generics ::cogwork_domain::domain_event::EventPayload for #ident #ty_generics #where_clause {
            const EVENT_TYPE: &'static str = #event_type;
        }
    };

    TokenStream::from(out)
}

// -------- parsing --------

struct EventPayloadAttrConfig {
    event_type: Option<LitStr>,
}

impl Parse for EventPayloadAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut event_type: Option<LitStr> = None;
        if input.is_empty() {
            return Ok(Self { event_type });
        }

        let pairs: Punctuated<EventPayloadAttrElem, Token![,]> =
            Punctuated::parse_terminated(input)?;
        for elem in pairs {
            match elem {
                EventPayloadAttrElem::EventType(lit) => {
                    if event_type.is_some() {
                        return Err(syn::Error::new(
                            lit.span(),
                            "duplicate key 'event_type' in attribute",
                        ));
                    }
                    if lit.value().trim().is_empty() {
                        return Err(syn::Error::new(lit.span(), "'event_type' must not be empty"));
                    }
                    event_type = Some(lit);
                }
            }
        }
        Ok(Self { event_type })
    }
}

enum EventPayloadAttrElem {
    EventType(LitStr),
}

impl Parse for EventPayloadAttrElem {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: syn::Ident = input.parse()?;
        if key == "event_type" {
            let _eq: Token![=] = input.parse()?;
            let expr: syn::Expr = input.parse()?;
            match expr {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(lit),
                    ..
                }) => Ok(Self::EventType(lit)),
                other => Err(syn::Error::new(
                    other.span(),
                    "expected string literal for 'event_type'",
                )),
            }
        } else {
            Err(syn::Error::new(
                key.span(),
                "unknown key in attribute; expected 'event_type'",
            ))
        }
    }
}
