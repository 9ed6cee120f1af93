use std::collections::{BTreeMap, HashMap};
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote, ToTokens};
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{
    Attribute, Expr, Field, Fields, GenericParam, Generics, Ident, Item, ItemEnum, ItemStruct,
    Lit, MetaNameValue, PathArguments, Token, Type, TypeParam,
};

/// Generate a `map` function for a given type that maps across all its type parameters.
/// i.e.
/// ```ignore
/// #[derive(...)]
/// // optional: naming the closure arguments, doesn't affect the structure
/// // of the data in any way, just the variable names.
/// #[derive_functor(B = second)]
/// // A different map name, the default being `map`. Nested fields without a
/// // `map_with` are mapped through their own method of the same name.
/// // #[derive_functor(map_name = different_map)]
/// // A fallible twin returning the first `Err` it meets:
/// // #[derive_functor(impl_try_map = true)]
/// struct Data<A, B> {
///     a: A,
///     // The map_with argument is an arbitrary expression, optionally followed
///     // by a second one used by `try_map`.
///     #[map_with(Option::map)]
///     b: Option<B>
/// }
/// ```
///
/// Will generate a mapping function of the form:
/// `Data::map(self, map_a: impl Fn(A) -> A2, map_second: impl Fn(B) -> B2) -> Data<A2, B2>`.
///
/// The closures are `FnOnce` when every type parameter is held directly, at most
/// once, by each variant. Anything else (repeated fields, nested types,
/// `map_with`) needs `Fn` because the closure is used more than once or lent out.
///
/// Caveats:
/// - Lifetime and const parameters are rejected.
/// - Tuples holding a type parameter need a `map_with`, there is no destructuring of them.
#[proc_macro_attribute]
pub fn derive_functor(args: TokenStream, item: TokenStream) -> TokenStream {
    expand(args.into(), item.into()).into()
}

fn expand(args: TokenStream2, item: TokenStream2) -> TokenStream2 {
    let mut input = match syn::parse2::<Item>(item) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };
    let output = generate(args, &input).unwrap_or_else(syn::Error::into_compile_error);
    // stripped even on error, otherwise rustc adds an unknown attribute error on top.
    FieldArg::remove_from_item(&mut input);
    quote! {
        #input
        #output
    }
}

fn generate(args: TokenStream2, input: &Item) -> syn::Result<TokenStream2> {
    let args_span = args.span();
    let args = Args::from_token_stream(args)?;
    match input {
        Item::Enum(item_enum) => FunctorFactory::from_item_enum(args, item_enum),
        Item::Struct(item_struct) => FunctorFactory::from_item_struct(args, item_struct),
        _ => Err(syn::Error::new(
            args_span,
            "Could not derive a functor for this, it is neither an enum or struct.",
        )),
    }
}

struct Args {
    pub parameter_names: BTreeMap<Ident, Ident>,
    pub map_name: Ident,
    pub try_map_name: Ident,
    pub impl_try_map: bool,
}

impl Args {
    fn from_token_stream(stream: TokenStream2) -> syn::Result<Self> {
        let parsed_attrs: Punctuated<MetaNameValue, Token![,]> =
            Parser::parse2(Punctuated::parse_terminated, stream)?;
        Args::from_iter(parsed_attrs)
    }

    fn from_iter(input: impl IntoIterator<Item = MetaNameValue>) -> syn::Result<Self> {
        let mut args = Args {
            parameter_names: BTreeMap::new(),
            map_name: Ident::new("map", Span::call_site()),
            try_map_name: Ident::new("try_map", Span::call_site()),
            impl_try_map: false,
        };
        for name_val in input {
            let key = name_val.path.get_ident().ok_or_else(|| {
                syn::Error::new_spanned(&name_val.path, "expected a single identifier")
            })?;
            match key.to_string().as_str() {
                "map_name" => args.map_name = expect_ident(&name_val.value)?,
                "try_map_name" => args.try_map_name = expect_ident(&name_val.value)?,
                "impl_try_map" => args.impl_try_map = expect_bool(&name_val.value)?,
                // anything else renames the closure for a type parameter.
                _ => {
                    args.parameter_names
                        .insert(key.clone(), expect_ident(&name_val.value)?);
                }
            }
        }
        Ok(args)
    }

    fn get_suffix_for(&self, ident: &Ident) -> String {
        self.parameter_names
            .get(ident)
            .map(Ident::to_string)
            .unwrap_or_else(|| ident.to_string().to_lowercase())
    }

    // mixed-site so a field binding of the same name can't shadow the closure.
    fn get_closure_name(&self, mode: Mode, ident: &Ident) -> Ident {
        let suffix = self.get_suffix_for(ident);
        match mode {
            Mode::Map => format_ident!("map_{}", suffix, span = Span::mixed_site()),
            Mode::TryMap => format_ident!("try_map_{}", suffix, span = Span::mixed_site()),
        }
    }

    fn get_method_name(&self, mode: Mode) -> &Ident {
        match mode {
            Mode::Map => &self.map_name,
            Mode::TryMap => &self.try_map_name,
        }
    }
}

fn expect_ident(expr: &Expr) -> syn::Result<Ident> {
    match expr {
        Expr::Path(path) => path
            .path
            .get_ident()
            .cloned()
            .ok_or_else(|| syn::Error::new_spanned(path, "expected a plain identifier")),
        other => Err(syn::Error::new_spanned(other, "expected an identifier")),
    }
}

fn expect_bool(expr: &Expr) -> syn::Result<bool> {
    match expr {
        Expr::Lit(syn::ExprLit {
            lit: Lit::Bool(value),
            ..
        }) => Ok(value.value),
        other => Err(syn::Error::new_spanned(other, "expected `true` or `false`")),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Map,
    TryMap,
}

enum FieldMapping {
    Trivial(Ident),
    SubMapForArgs(Vec<Ident>),
}

impl FieldMapping {
    fn into_params(self) -> Vec<Ident> {
        match self {
            FieldMapping::Trivial(ident) => vec![ident],
            FieldMapping::SubMapForArgs(params) => params,
        }
    }
}

type FieldNameMapping = Option<Vec<Ident>>;

struct FunctorFactory {
    pub args: Args,
    // this is a vec for reasons of preserving order of type parameters.
    pub type_maps_to_type: Vec<(Ident, Ident)>,
    pub type_name: Ident,
    pub error_param: Ident,
}

impl FunctorFactory {
    fn from_generics(args: Args, generics: &Generics, type_name: Ident) -> syn::Result<Self> {
        let mut type_maps_to_type = vec![];
        for generic in &generics.params {
            match generic {
                GenericParam::Type(ty) => type_maps_to_type.push((
                    ty.ident.clone(),
                    format_ident!("{}2", ty.ident),
                )),
                GenericParam::Lifetime(lifetime) => {
                    return Err(syn::Error::new_spanned(
                        lifetime,
                        "derive_functor does not support lifetime parameters",
                    ))
                }
                GenericParam::Const(constant) => {
                    return Err(syn::Error::new_spanned(
                        constant,
                        "derive_functor does not support const parameters",
                    ))
                }
            }
        }
        if let Some(unknown) = args
            .parameter_names
            .keys()
            .find(|key| !type_maps_to_type.iter().any(|(gen, _)| gen == *key))
        {
            return Err(syn::Error::new_spanned(
                unknown,
                format!("`{unknown}` is not a type parameter of `{type_name}`"),
            ));
        }
        // the error parameter of `try_map` must not shadow one of ours.
        let mut error_param = Ident::new("E", Span::call_site());
        while type_maps_to_type
            .iter()
            .any(|(from, to)| *from == error_param || *to == error_param)
        {
            error_param = format_ident!("{}_", error_param);
        }
        Ok(FunctorFactory {
            args,
            type_maps_to_type,
            type_name,
            error_param,
        })
    }

    fn from_item_enum(args: Args, source: &ItemEnum) -> syn::Result<TokenStream2> {
        let factory = Self::from_generics(args, &source.generics, source.ident.clone())?;
        let bound = factory.closure_bound(source.variants.iter().map(|variant| &variant.fields));
        let mut methods = vec![factory.make_enum_method(Mode::Map, source, &bound)?];
        if factory.args.impl_try_map {
            methods.push(factory.make_enum_method(Mode::TryMap, source, &bound)?);
        }
        Ok(factory.wrap_impl(&source.generics, methods))
    }

    fn from_item_struct(args: Args, source: &ItemStruct) -> syn::Result<TokenStream2> {
        let factory = Self::from_generics(args, &source.generics, source.ident.clone())?;
        let bound = factory.closure_bound(std::iter::once(&source.fields));
        let mut methods = vec![factory.make_struct_method(Mode::Map, source, &bound)?];
        if factory.args.impl_try_map {
            methods.push(factory.make_struct_method(Mode::TryMap, source, &bound)?);
        }
        Ok(factory.wrap_impl(&source.generics, methods))
    }

    fn wrap_impl(&self, generics: &Generics, methods: Vec<TokenStream2>) -> TokenStream2 {
        let name = &self.type_name;
        let (impl_gen, type_gen, where_clause) = generics.split_for_impl();
        quote! {
            impl #impl_gen #name #type_gen #where_clause {
                #(#methods)*
            }
        }
    }

    fn mapped_params(&self) -> Punctuated<TypeParam, Token![,]> {
        self.type_maps_to_type
            .iter()
            .map(|(_, to)| TypeParam::from(to.clone()))
            .collect()
    }

    fn signature(&self, mode: Mode, bound: &TokenStream2) -> TokenStream2 {
        let name = &self.type_name;
        let method = self.args.get_method_name(mode);
        let mapped_params = self.mapped_params();
        let mapped_type = Self::angle_bracketed(&mapped_params);
        let fn_args = self.make_fn_arguments(mode, bound);
        match mode {
            Mode::Map => quote! {
                /// Apply one closure per type parameter, keeping the shape of the value.
                pub fn #method #mapped_type(self, #fn_args) -> #name #mapped_type
            },
            Mode::TryMap => {
                let error = &self.error_param;
                let mut method_params = mapped_params.clone();
                method_params.push(TypeParam::from(error.clone()));
                let method_params = Self::angle_bracketed(&method_params);
                quote! {
                    /// Apply one fallible closure per type parameter, returning the first `Err` unchanged.
                    pub fn #method #method_params(self, #fn_args)
                        -> ::core::result::Result<#name #mapped_type, #error>
                }
            }
        }
    }

    // unit structs and the like get no `<>` at all.
    fn angle_bracketed(params: &Punctuated<TypeParam, Token![,]>) -> TokenStream2 {
        if params.is_empty() {
            quote! {}
        } else {
            quote! { <#params> }
        }
    }

    fn make_enum_method(
        &self,
        mode: Mode,
        source: &ItemEnum,
        bound: &TokenStream2,
    ) -> syn::Result<TokenStream2> {
        let signature = self.signature(mode, bound);
        let arms = source
            .variants
            .iter()
            .map(|variant| self.implement_body_for_variant(mode, &variant.ident, &variant.fields))
            .collect::<syn::Result<Punctuated<TokenStream2, Token![,]>>>()?;
        Ok(quote! {
            #signature {
                match self {
                    #arms
                }
            }
        })
    }

    fn make_struct_method(
        &self,
        mode: Mode,
        source: &ItemStruct,
        bound: &TokenStream2,
    ) -> syn::Result<TokenStream2> {
        let name = &source.ident;
        let signature = self.signature(mode, bound);
        let (fields, names_for_unnamed) = Self::unpack_fields(&source.fields);
        let expanded = match source.fields {
            Fields::Named(_) => quote! {#name {#fields}},
            Fields::Unnamed(_) => quote! {#name(#fields)},
            Fields::Unit => quote! {#name},
        };
        let implemented =
            self.apply_mapping_to_fields(mode, &source.fields, name, names_for_unnamed)?;
        let implemented = Self::wrap_ok(mode, implemented);
        Ok(quote! {
            #signature {
                let #expanded = self;
                #implemented
            }
        })
    }

    fn wrap_ok(mode: Mode, tokens: TokenStream2) -> TokenStream2 {
        match mode {
            Mode::Map => tokens,
            Mode::TryMap => quote! { ::core::result::Result::Ok(#tokens) },
        }
    }

    fn implement_body_for_variant(
        &self,
        mode: Mode,
        name: &Ident,
        fields: &Fields,
    ) -> syn::Result<TokenStream2> {
        let type_name = &self.type_name;
        let (unpacked, name_mapping) = Self::unpack_fields(fields);
        let pattern = match fields {
            Fields::Named(_) => quote! { #type_name::#name{#unpacked} },
            Fields::Unnamed(_) => quote! { #type_name::#name(#unpacked) },
            Fields::Unit => quote! { #type_name::#name },
        };
        let implemented = self.apply_mapping_to_fields(mode, fields, name, name_mapping)?;
        let rebuilt = Self::wrap_ok(mode, quote! { #type_name::#implemented });
        Ok(quote! {
            #pattern => #rebuilt
        })
    }

    /// `FnOnce` is enough when no variant touches a parameter twice and nothing
    /// borrows the closure for a nested map.
    fn closure_bound<'a>(&self, all_fields: impl Iterator<Item = &'a Fields>) -> TokenStream2 {
        let fn_once = quote! { FnOnce };
        let fn_many = quote! { Fn };
        for fields in all_fields {
            let mut uses: HashMap<Ident, usize> = HashMap::new();
            for field in fields.iter() {
                let has_map_with = field
                    .attrs
                    .iter()
                    .any(|attribute| attribute.path().is_ident(FieldArg::ATTRIBUTE));
                match self.get_mappable_generics_of_type(&field.ty) {
                    None => {}
                    Some(FieldMapping::Trivial(ident)) if !has_map_with => {
                        let count = uses.entry(ident).or_default();
                        *count += 1;
                        if *count > 1 {
                            return fn_many;
                        }
                    }
                    Some(_) => return fn_many,
                }
            }
        }
        fn_once
    }

    /// The behaviour for this is such that the order of generics for the container type is followed best as possible.
    fn get_mappable_generics_of_type(&self, ty: &Type) -> Option<FieldMapping> {
        if let Type::Path(path) = ty {
            if let Some(ident) = path.path.get_ident() {
                if self.type_maps_to_type.iter().any(|(gen, _)| gen == ident) {
                    return Some(FieldMapping::Trivial(ident.clone()));
                }
            }
        }
        let mut buffer = Vec::new();
        self.recursive_get_generics_of_type_to_buffer(ty, &mut buffer);
        (!buffer.is_empty()).then_some(FieldMapping::SubMapForArgs(buffer))
    }

    // takes a vector so the order type parameters are found in is kept for the nested map call.
    fn recursive_get_generics_of_type_to_buffer(&self, ty: &Type, buffer: &mut Vec<Ident>) {
        match ty {
            Type::Array(array) => {
                self.recursive_get_generics_of_type_to_buffer(&array.elem, buffer)
            }
            Type::Paren(paren) => {
                self.recursive_get_generics_of_type_to_buffer(&paren.elem, buffer)
            }
            Type::Group(group) => {
                self.recursive_get_generics_of_type_to_buffer(&group.elem, buffer)
            }
            Type::Path(path) => {
                if let Some(segment) = path.path.segments.last() {
                    if self
                        .type_maps_to_type
                        .iter()
                        .any(|(gen, _)| segment.ident == *gen)
                        && !buffer.contains(&segment.ident)
                    {
                        buffer.push(segment.ident.clone());
                    }
                    if let PathArguments::AngleBracketed(generics) = &segment.arguments {
                        for generic in &generics.args {
                            if let syn::GenericArgument::Type(ty) = generic {
                                self.recursive_get_generics_of_type_to_buffer(ty, buffer)
                            }
                        }
                    }
                }
            }
            Type::Tuple(tuple) => {
                for ty in &tuple.elems {
                    self.recursive_get_generics_of_type_to_buffer(ty, buffer)
                }
            }
            _ => {}
        }
    }

    fn unpack_fields(fields: &Fields) -> (TokenStream2, FieldNameMapping) {
        match fields {
            Fields::Named(named) => {
                let names: Punctuated<&Ident, Token![,]> = named
                    .named
                    .iter()
                    .filter_map(|field| field.ident.as_ref())
                    .collect();
                (names.to_token_stream(), None)
            }
            Fields::Unnamed(unnamed) => {
                let faux_names: Punctuated<Ident, Token![,]> = (0..unnamed.unnamed.len())
                    .map(|num| format_ident!("field_{}", num, span = Span::mixed_site()))
                    .collect();
                let tokens = faux_names.to_token_stream();
                (tokens, Some(faux_names.into_iter().collect()))
            }
            Fields::Unit => (quote! {}, None),
        }
    }

    fn apply_mapping_to_fields(
        &self,
        mode: Mode,
        fields: &Fields,
        name: &Ident,
        names_for_unnamed: FieldNameMapping,
    ) -> syn::Result<TokenStream2> {
        match fields {
            Fields::Named(named) => {
                let mapped = named
                    .named
                    .iter()
                    .filter_map(|field| field.ident.as_ref().map(|ident| (ident, field)))
                    .map(|(field_name, field)| {
                        let new_field_content =
                            self.apply_mapping_to_field_ref(mode, field, quote! {#field_name})?;
                        Ok(quote! {
                            #field_name: #new_field_content
                        })
                    })
                    .collect::<syn::Result<Punctuated<TokenStream2, Token![,]>>>()?;
                Ok(quote! {
                    #name {
                        #mapped
                    }
                })
            }
            Fields::Unnamed(unnamed) => {
                let names = names_for_unnamed.unwrap_or_default();
                let mapped = unnamed
                    .unnamed
                    .iter()
                    .zip(&names)
                    .map(|(field, name_of_field)| {
                        self.apply_mapping_to_field_ref(mode, field, quote! {#name_of_field})
                    })
                    .collect::<syn::Result<Punctuated<TokenStream2, Token![,]>>>()?;
                Ok(quote! {
                    #name(#mapped)
                })
            }
            Fields::Unit => Ok(quote! {#name}),
        }
    }

    fn apply_mapping_to_field_ref(
        &self,
        mode: Mode,
        field: &Field,
        field_ref: TokenStream2,
    ) -> syn::Result<TokenStream2> {
        let field_arg = FieldArg::find_in_attributes(&field.attrs)?;
        let Some(mapping) = self.get_mappable_generics_of_type(&field.ty) else {
            if let Some(arg) = field_arg {
                return Err(syn::Error::new(
                    arg.span,
                    "map_with on a field whose type mentions no type parameter",
                ));
            }
            // There's no need to map, so we just move.
            return Ok(field_ref);
        };
        let call = match (field_arg, mapping) {
            (Some(arg), mapping) => {
                let alt_function = arg.for_mode(mode)?;
                let all_fns = self.borrowed_closures(mode, &mapping.into_params());
                quote! {
                    (#alt_function)(#field_ref, #all_fns)
                }
            }
            (None, FieldMapping::Trivial(ident)) => {
                let closure = self.args.get_closure_name(mode, &ident);
                quote! {
                    #closure(#field_ref)
                }
            }
            // attempt recursion on the type.
            (None, FieldMapping::SubMapForArgs(params)) => {
                let method = self.args.get_method_name(mode);
                let all_fns = self.borrowed_closures(mode, &params);
                quote! {
                    #field_ref.#method(#all_fns)
                }
            }
        };
        Ok(match mode {
            Mode::Map => call,
            Mode::TryMap => quote! { #call? },
        })
    }

    fn borrowed_closures(&self, mode: Mode, params: &[Ident]) -> Punctuated<TokenStream2, Token![,]> {
        params
            .iter()
            .map(|ident| {
                let closure = self.args.get_closure_name(mode, ident);
                quote! {&#closure}
            })
            .collect()
    }

    fn make_fn_arguments(&self, mode: Mode, bound: &TokenStream2) -> TokenStream2 {
        let error = &self.error_param;
        let mapped: Punctuated<TokenStream2, Token![,]> = self
            .type_maps_to_type
            .iter()
            .map(|(from, to)| {
                let fn_name = self.args.get_closure_name(mode, from);
                match mode {
                    Mode::Map => quote! {
                        #fn_name: impl #bound(#from) -> #to
                    },
                    Mode::TryMap => quote! {
                        #fn_name: impl #bound(#from) -> ::core::result::Result<#to, #error>
                    },
                }
            })
            .collect();
        mapped.into_token_stream()
    }
}

struct FieldArg {
    pub map: Expr,
    pub try_map: Option<Expr>,
    pub span: Span,
}

impl FieldArg {
    const ATTRIBUTE: &'static str = "map_with";

    fn remove_from_item(item: &mut Item) {
        match item {
            Item::Enum(item_enum) => {
                for variant in item_enum.variants.iter_mut() {
                    Self::remove_from_fields(&mut variant.fields);
                }
            }
            Item::Struct(item_struct) => Self::remove_from_fields(&mut item_struct.fields),
            _ => {}
        }
    }

    fn remove_from_fields(fields: &mut Fields) {
        for field in fields.iter_mut() {
            field
                .attrs
                .retain(|attribute| !attribute.path().is_ident(Self::ATTRIBUTE));
        }
    }

    fn find_in_attributes(attributes: &[Attribute]) -> syn::Result<Option<Self>> {
        let Some(attribute) = attributes
            .iter()
            .find(|attribute| attribute.path().is_ident(Self::ATTRIBUTE))
        else {
            return Ok(None);
        };
        let mut exprs = attribute
            .parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated)?
            .into_iter();
        let map = exprs.next().ok_or_else(|| {
            syn::Error::new_spanned(attribute, "map_with needs at least a mapping expression")
        })?;
        let try_map = exprs.next();
        if let Some(extra) = exprs.next() {
            return Err(syn::Error::new_spanned(
                extra,
                "map_with takes at most two expressions: one for map and one for try_map",
            ));
        }
        Ok(Some(Self {
            map,
            try_map,
            span: attribute.span(),
        }))
    }

    fn for_mode(&self, mode: Mode) -> syn::Result<&Expr> {
        match mode {
            Mode::Map => Ok(&self.map),
            Mode::TryMap => self.try_map.as_ref().ok_or_else(|| {
                syn::Error::new(
                    self.span,
                    "impl_try_map needs a second map_with expression for this field",
                )
            }),
        }
    }
}
