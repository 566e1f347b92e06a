//! 属性注入派生宏实现

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, GenericArgument, Ident, PathArguments, Type};

/// 注入字段描述
struct InjectField<'a> {
    ident: &'a Ident,
    /// `Option<Arc<..>>` 中最内层的依赖类型
    dependency: &'a Type,
    optional: bool,
}

/// 实现 #[derive(Inject)] 宏
pub fn derive_inject_impl(input: DeriveInput) -> TokenStream {
    let struct_name = &input.ident;

    let fields = match collect_inject_fields(&input) {
        Ok(fields) => fields,
        Err(e) => return e.to_compile_error().into(),
    };

    let assignments = fields.iter().map(|field| {
        let ident = field.ident;
        let property = ident.to_string();
        let resolve = resolve_expr(field.dependency);

        if field.optional {
            quote! {
                self.#ident = #resolve.ok();
            }
        } else {
            quote! {
                self.#ident = Some(#resolve.map_err(|source| {
                    host_common::DependencyError::missing_required(
                        std::any::type_name::<Self>(),
                        #property,
                        source,
                    )
                })?);
            }
        }
    });

    let inject_impl = quote! {
        impl host_common::InjectServices for #struct_name {
            fn inject_services(
                &mut self,
                resolver: &dyn host_common::ServiceResolver,
            ) -> std::result::Result<(), host_common::DependencyError> {
                #(#assignments)*
                Ok(())
            }
        }
    };

    let registration_code = generate_injector_registration(struct_name);

    let expanded = quote! {
        #inject_impl

        #registration_code
    };

    TokenStream::from(expanded)
}

/// 生成注入钩子登记代码
///
/// 钩子按实例的运行时 `TypeId` 查表调用，包装解析器在每次
/// 解析产出实例后执行它。
fn generate_injector_registration(struct_name: &Ident) -> proc_macro2::TokenStream {
    // 保留原始大小写，仅大小写不同的类型名不会相互碰撞
    let registration_fn_name = Ident::new(
        &format!("__register_injector_{struct_name}"),
        Span::call_site(),
    );

    quote! {
        // 使用 ctor 在程序启动时向模块注册表登记注入钩子
        #[ctor::ctor]
        fn #registration_fn_name() {
            host_common::module_registry().register_injector(
                std::any::TypeId::of::<#struct_name>(),
                |instance, resolver| match instance.downcast_mut::<#struct_name>() {
                    Some(target) => {
                        host_common::InjectServices::inject_services(target, resolver)
                    }
                    None => Ok(()),
                },
            );
        }
    }
}

/// 按依赖类型选择解析方式：trait 对象走装箱 `Arc<dyn Trait>` 取出，
/// 具体类型直接向下转型
fn resolve_expr(dependency: &Type) -> proc_macro2::TokenStream {
    match dependency {
        Type::TraitObject(trait_object) => quote! {
            host_common::resolve_trait_object::<#trait_object, _>(resolver)
        },
        other => quote! {
            host_common::resolve_concrete::<#other, _>(resolver)
        },
    }
}

/// 收集被 #[inject] 标记的字段
fn collect_inject_fields(input: &DeriveInput) -> syn::Result<Vec<InjectField<'_>>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "#[derive(Inject)] 只支持具名字段的结构体",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "#[derive(Inject)] 只支持结构体",
            ))
        }
    };

    let mut collected = Vec::new();
    for field in fields {
        let Some(optional) = inject_marker(field)? else {
            continue;
        };
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "注入字段必须具名"))?;
        let dependency = dependency_type(&field.ty).ok_or_else(|| {
            syn::Error::new_spanned(
                &field.ty,
                "注入字段类型必须是 Option<Arc<T>> 或 Option<Arc<dyn Trait>>",
            )
        })?;
        collected.push(InjectField {
            ident,
            dependency,
            optional,
        });
    }
    Ok(collected)
}

/// 读取字段上的 #[inject] 标记；返回 `Some(是否可选)`
fn inject_marker(field: &Field) -> syn::Result<Option<bool>> {
    for attr in &field.attrs {
        if !attr.path().is_ident("inject") {
            continue;
        }
        let mut optional = false;
        if !matches!(attr.meta, syn::Meta::Path(_)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("optional") {
                    optional = true;
                    Ok(())
                } else {
                    Err(meta.error("未知的注入参数"))
                }
            })?;
        }
        return Ok(Some(optional));
    }
    Ok(None)
}

/// 解开 `Option<Arc<T>>`，返回最内层的依赖类型
fn dependency_type(ty: &Type) -> Option<&Type> {
    let arc = generic_argument(ty, "Option")?;
    generic_argument(arc, "Arc")
}

/// 取出 `Wrapper<T>` 形式类型的单个泛型参数
fn generic_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    match arguments.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
