use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Attribute, Data, DeriveInput, Fields, parse_macro_input};

#[proc_macro_derive(FormModel, attributes(form))]
pub fn derive_form_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            input.ident,
            "FormModel derive currently supports only non-generic structs",
        )
        .to_compile_error()
        .into();
    }

    let vis = input.vis;
    let model_ident = input.ident;
    let fields_struct_ident = format_ident!("{model_ident}Fields");

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return syn::Error::new(
                    Span::call_site(),
                    "FormModel derive requires a struct with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new(
                Span::call_site(),
                "FormModel derive is only supported on structs",
            )
            .to_compile_error()
            .into();
        }
    };

    let morfi = morfi_path();
    let form = quote!(#morfi::form);
    let mut lens_defs = Vec::new();
    let mut fields_methods = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        let nested = match is_nested(&field.attrs) {
            Ok(nested) => nested,
            Err(error) => return error.to_compile_error().into(),
        };
        let field_ty = field.ty;
        let field_name = field_ident.unraw().to_string();
        let lens_ident = format_ident!("{model_ident}{}Lens", to_pascal_case(&field_name));

        lens_defs.push(quote! {
            #[derive(Clone, Copy, Debug, Default)]
            #vis struct #lens_ident;

            impl #form::HasFieldPath for #lens_ident {
                fn path(&self) -> #form::FieldPath {
                    #form::FieldPath::from_static(#field_name)
                }
            }

            impl #form::FieldLens<#model_ident> for #lens_ident {
                type Value = #field_ty;

                fn get<'a>(&self, model: &'a #model_ident) -> &'a Self::Value {
                    &model.#field_ident
                }

                fn get_mut<'a>(&self, model: &'a mut #model_ident) -> &'a mut Self::Value {
                    &mut model.#field_ident
                }
            }
        });

        if nested {
            fields_methods.push(quote! {
                pub fn #field_ident(
                    &self,
                ) -> <#field_ty as #form::FormModel>::Fields<#form::Then<P, #lens_ident>> {
                    <#field_ty as #form::FormModel>::fields_at(#form::Then::new(
                        self.0.clone(),
                        #lens_ident,
                    ))
                }
            });
        } else {
            fields_methods.push(quote! {
                pub fn #field_ident(&self) -> #form::Then<P, #lens_ident> {
                    #form::Then::new(self.0.clone(), #lens_ident)
                }
            });
        }
    }

    quote! {
        #[derive(Clone, Copy, Debug, Default)]
        #vis struct #fields_struct_ident<P = #form::Root>(P);

        impl<P> #fields_struct_ident<P>
        where
            P: #form::HasFieldPath + Clone,
        {
            #(#fields_methods)*
        }

        impl<P> #form::HasFieldPath for #fields_struct_ident<P>
        where
            P: #form::HasFieldPath,
        {
            fn path(&self) -> #form::FieldPath {
                self.0.path()
            }
        }

        impl<R, P> #form::FieldLens<R> for #fields_struct_ident<P>
        where
            P: #form::FieldLens<R, Value = #model_ident>,
        {
            type Value = #model_ident;

            fn get<'a>(&self, model: &'a R) -> &'a Self::Value {
                self.0.get(model)
            }

            fn get_mut<'a>(&self, model: &'a mut R) -> &'a mut Self::Value {
                self.0.get_mut(model)
            }
        }

        impl #form::FormModel for #model_ident {
            type Fields<P> = #fields_struct_ident<P>;

            fn fields_at<P>(parent: P) -> Self::Fields<P>
            where
                P: #form::HasFieldPath + Clone,
            {
                #fields_struct_ident(parent)
            }
        }

        #(#lens_defs)*
    }
    .into()
}

fn is_nested(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut nested = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("form")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("nested") {
                nested = true;
                Ok(())
            } else {
                Err(meta.error("unsupported form attribute, expected `nested`"))
            }
        })?;
    }
    Ok(nested)
}

fn morfi_path() -> TokenStream2 {
    match crate_name("morfi") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) => quote!(crate),
        Err(_) => quote!(::morfi),
    }
}

fn to_pascal_case(input: &str) -> String {
    let mut out = String::new();
    for segment in input.split('_') {
        if segment.is_empty() {
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
