//! 启动初始化标记宏实现

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, Ident, ItemStruct};

/// 实现 #[initialize_on_startup] 宏
///
/// 标记不带参数，类型自身需要实现 `InitializeOnStartup`；
/// 初始化逻辑由编排器显式触发，标记只负责登记。
pub fn initialize_on_startup_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        return syn::Error::new(Span::call_site(), "#[initialize_on_startup] 不接受参数")
            .to_compile_error()
            .into();
    }

    let input_struct = parse_macro_input!(input as ItemStruct);
    let struct_name = &input_struct.ident;

    // 保留原始大小写，仅大小写不同的类型名不会相互碰撞
    let registration_fn_name = Ident::new(
        &format!("__register_initializer_{struct_name}"),
        Span::call_site(),
    );

    let expanded = quote! {
        #input_struct

        // 使用 ctor 在程序启动时向模块注册表登记初始化记录
        #[ctor::ctor]
        fn #registration_fn_name() {
            host_common::module_registry().register_initializer(
                host_common::StartupInitializer::new::<#struct_name>(module_path!()),
            );
        }
    };

    TokenStream::from(expanded)
}
