//! 服务注册宏实现

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, punctuated::Punctuated, Expr, Ident,
    ItemStruct, Lit, Meta, Result, Token, Type,
};

/// 服务注册参数
pub struct ServiceArgs {
    /// 生命周期类型
    pub lifetime: ServiceLifetime,
    /// trait 对象服务键覆盖
    pub provides: Option<Type>,
    /// 自定义服务名称
    pub name: Option<String>,
}

/// 服务生命周期类型
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceLifetime {
    Singleton,
    Scoped,
    Transient,
}

impl Default for ServiceArgs {
    fn default() -> Self {
        Self {
            lifetime: ServiceLifetime::Transient,
            provides: None,
            name: None,
        }
    }
}

impl Parse for ServiceArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut args = ServiceArgs::default();

        let parsed = Punctuated::<Meta, Token![,]>::parse_terminated(input)?;

        for meta in parsed {
            match meta {
                Meta::Path(path) => {
                    if path.is_ident("singleton") {
                        args.lifetime = ServiceLifetime::Singleton;
                    } else if path.is_ident("scoped") {
                        args.lifetime = ServiceLifetime::Scoped;
                    } else if path.is_ident("transient") {
                        args.lifetime = ServiceLifetime::Transient;
                    } else {
                        return Err(syn::Error::new_spanned(path, "未知的服务参数"));
                    }
                }
                Meta::List(list) => {
                    if list.path.is_ident("provides") {
                        args.provides = Some(list.parse_args::<Type>()?);
                    } else {
                        return Err(syn::Error::new_spanned(list, "未知的服务参数"));
                    }
                }
                Meta::NameValue(nv) => {
                    if nv.path.is_ident("name") {
                        if let Expr::Lit(expr_lit) = nv.value {
                            if let Lit::Str(lit_str) = expr_lit.lit {
                                args.name = Some(lit_str.value());
                            }
                        }
                    } else {
                        return Err(syn::Error::new_spanned(nv, "未知的服务参数"));
                    }
                }
            }
        }

        Ok(args)
    }
}

/// 实现 #[service] 宏
pub fn service_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    let service_args = if args.is_empty() {
        ServiceArgs::default()
    } else {
        match syn::parse::<ServiceArgs>(args) {
            Ok(args) => args,
            Err(e) => return e.to_compile_error().into(),
        }
    };

    let input_struct = parse_macro_input!(input as ItemStruct);

    let struct_name = &input_struct.ident;
    let struct_name_string = struct_name.to_string();
    let service_name = service_args.name.as_deref().unwrap_or(&struct_name_string);

    let lifetime_variant = match service_args.lifetime {
        ServiceLifetime::Singleton => quote! { host_common::Lifetime::Singleton },
        ServiceLifetime::Scoped => quote! { host_common::Lifetime::Scoped },
        ServiceLifetime::Transient => quote! { host_common::Lifetime::Transient },
    };

    // 生成 ServiceInfo trait 实现
    let info_impl = quote! {
        impl host_common::ServiceInfo for #struct_name {
            fn service_name() -> &'static str {
                #service_name
            }

            fn lifetime() -> host_common::Lifetime {
                #lifetime_variant
            }
        }
    };

    let registration_code = generate_registration_code(
        struct_name,
        &lifetime_variant,
        service_args.provides.as_ref(),
    );

    let expanded = quote! {
        #input_struct

        #info_impl

        #registration_code
    };

    TokenStream::from(expanded)
}

/// 生成服务自动登记代码
///
/// `provides` 覆盖时在声明处单态化收尾函数：把具体实例转换为
/// 装箱的 `Arc<dyn Trait>` 后交给注册表保存。trait 对象到
/// `Any` 的这步强转无法在运行时泛型化表达，只能在这里生成。
fn generate_registration_code(
    struct_name: &Ident,
    lifetime: &proc_macro2::TokenStream,
    provides: Option<&Type>,
) -> proc_macro2::TokenStream {
    // 保留原始大小写，仅大小写不同的类型名不会相互碰撞
    let registration_fn_name = Ident::new(
        &format!("__register_service_{struct_name}"),
        Span::call_site(),
    );

    let descriptor = match provides {
        Some(service_type) => {
            let key_type = as_trait_object(service_type);
            quote! {
                {
                    fn __finish(
                        boxed: std::boxed::Box<dyn std::any::Any + Send + Sync>,
                    ) -> std::result::Result<
                        std::sync::Arc<dyn std::any::Any + Send + Sync>,
                        host_common::DependencyError,
                    > {
                        boxed
                            .downcast::<#struct_name>()
                            .map(|value| {
                                let shared: std::sync::Arc<#key_type> =
                                    std::sync::Arc::new(*value);
                                std::sync::Arc::new(shared)
                                    as std::sync::Arc<dyn std::any::Any + Send + Sync>
                            })
                            .map_err(|_| host_common::DependencyError::TypeMismatch {
                                type_name: std::any::type_name::<#struct_name>().to_string(),
                            })
                    }

                    host_common::ServiceDescriptor::keyed::<#struct_name>(
                        #lifetime,
                        module_path!(),
                        host_common::ServiceKey::of::<#key_type>(),
                        __finish,
                    )
                }
            }
        }
        None => quote! {
            host_common::ServiceDescriptor::of::<#struct_name>(#lifetime, module_path!())
        },
    };

    quote! {
        // 使用 ctor 在程序启动时向模块注册表登记服务描述符
        #[ctor::ctor]
        fn #registration_fn_name() {
            host_common::module_registry().register_service(#descriptor);
        }
    }
}

/// 把 `provides(Trait)` 的裸路径规整为 trait 对象类型
fn as_trait_object(service_type: &Type) -> proc_macro2::TokenStream {
    match service_type {
        Type::TraitObject(trait_object) => quote! { #trait_object },
        other => quote! { dyn #other },
    }
}
