//! Procedural macros for hybridsim model development
//!
//! This crate provides a derive macro that generates the explicit port table of a model:
//! which inputs it reads, which outputs it publishes, and the accessors used by the
//! scheduler to move values between models without any reflection.
//!
//! # Overview
//!
//! The `ModelIO` derive macro generates:
//! - `generated_inputs()` listing fields marked with `#[input]`
//! - `generated_outputs()` listing fields marked with `#[output]`
//! - `generated_output(&self, name)` returning the current value of an output
//! - `generated_read_inputs(&mut self, input_state)` copying every input from the
//!   resolved input state into its field
//!
//! # Example
//!
//! ```ignore
//! use hybridsim_core::ModelIO;
//!
//! #[derive(ModelIO)]
//! pub struct Gain {
//!     #[input(name = "signal")]
//!     signal: f64,
//!
//!     #[output(name = "y")]
//!     y: f64,
//!
//!     // Parameters (not marked as input/output)
//!     pub gain: f64,
//! }
//! ```
//!
//! A field may carry both attributes. This is how a dynamic model publishes the value
//! it holds for the duration of an integration interval.
//!
//! The generated code refers to `PortValue`, `InputState` and `SimResult` unqualified,
//! so they must be in scope where the derive is used.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr};

/// A field taking part in the port table
struct PortField {
    rust_name: Ident,
    port_name: String,
}

/// Parse a #[input(...)] or #[output(...)] attribute using syn 2.0 API
///
/// A bare `#[input]` uses the field name as the port name.
fn parse_port_attribute(attr: &Attribute, rust_name: &Ident) -> syn::Result<String> {
    let mut name = None;

    if matches!(attr.meta, syn::Meta::List(_)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported port attribute, expected `name`"))
            }
        })?;
    }

    Ok(name.unwrap_or_else(|| rust_name.to_string()))
}

/// Extract input/output fields from the struct
fn extract_port_fields(fields: &Fields) -> syn::Result<(Vec<PortField>, Vec<PortField>)> {
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();

    if let Fields::Named(named) = fields {
        for field in &named.named {
            let Some(rust_name) = field.ident.clone() else {
                continue;
            };

            for attr in &field.attrs {
                if attr.path().is_ident("input") {
                    inputs.push(PortField {
                        port_name: parse_port_attribute(attr, &rust_name)?,
                        rust_name: rust_name.clone(),
                    });
                } else if attr.path().is_ident("output") {
                    outputs.push(PortField {
                        port_name: parse_port_attribute(attr, &rust_name)?,
                        rust_name: rust_name.clone(),
                    });
                }
            }
        }
    }

    Ok((inputs, outputs))
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "ModelIO can only be derived for structs",
            ))
        }
    };

    let (input_fields, output_fields) = extract_port_fields(fields)?;

    let input_names: Vec<&String> = input_fields.iter().map(|f| &f.port_name).collect();
    let output_names: Vec<&String> = output_fields.iter().map(|f| &f.port_name).collect();

    // Each output arm clones the field so the published value is detached from the model
    let output_arms: Vec<TokenStream2> = output_fields
        .iter()
        .map(|f| {
            let field = &f.rust_name;
            let name = &f.port_name;
            quote! {
                #name => Some(PortValue::from(self.#field.clone())),
            }
        })
        .collect();

    let input_reads: Vec<TokenStream2> = input_fields
        .iter()
        .map(|f| {
            let field = &f.rust_name;
            let name = &f.port_name;
            quote! {
                self.#field = input_state.read(#name)?;
            }
        })
        .collect();

    Ok(quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            /// Names of the inputs declared on this model
            pub fn generated_inputs() -> Vec<&'static str> {
                vec![#(#input_names,)*]
            }

            /// Names of the outputs published by this model
            pub fn generated_outputs() -> Vec<&'static str> {
                vec![#(#output_names,)*]
            }

            /// Current value of a published output
            pub fn generated_output(&self, name: &str) -> Option<PortValue> {
                match name {
                    #(#output_arms)*
                    _ => None,
                }
            }

            /// Copy every declared input out of the resolved input state
            #[allow(unused_variables)]
            pub fn generated_read_inputs(&mut self, input_state: &InputState) -> SimResult<()> {
                #(#input_reads)*
                Ok(())
            }
        }
    })
}

/// Derive macro for generating the port table of a model
///
/// # Attributes
///
/// ## Field attributes
/// - `#[input]` or `#[input(name = "...")]` - Field receives the bound input of that name
/// - `#[output]` or `#[output(name = "...")]` - Field is published under that name
///
/// Input fields must implement `FromPortValue`, output fields must convert into `PortValue`.
#[proc_macro_derive(ModelIO, attributes(input, output))]
pub fn derive_model_io(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}
