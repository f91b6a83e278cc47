use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod fragment;

#[proc_macro_derive(Fragment, attributes(fragment, fragment_attrs))]
pub fn derive_fragment(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    fragment::derive(input).into()
}
