// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 控制器工厂：把“命名空间 + 裸名”交给解析器，再调用解析到的构造函数。

use log::{debug, error};

use crate::{
    controller::{PageController, Services},
    exception::Exception,
    param::DEFAULT_NAMESPACE,
    resolver::Resolver,
};

/// 控制器构造函数。所有控制器都以同一签名构造，只从 [`Services`] 取协作者。
pub type Constructor = fn(&Services) -> Result<Box<dyn PageController>, Exception>;

pub type ControllerResolver = Resolver<Constructor>;

pub struct ControllerFactory<'a> {
    resolver: &'a ControllerResolver,
}

impl<'a> ControllerFactory<'a> {
    pub fn new(resolver: &'a ControllerResolver) -> Self {
        Self { resolver }
    }

    /// 创建控制器。`namespace` 为空时使用默认命名空间。
    ///
    /// 解析失败原样返回（`NotRegistered`/`ComponentNotFound`）；
    /// 构造函数报告的任何错误都归为 `ConstructionError`。
    pub fn create_controller(
        &self,
        name: &str,
        namespace: Option<&str>,
        is_admin: bool,
        services: &Services,
    ) -> Result<Box<dyn PageController>, Exception> {
        let logical_name = format!("{}{}", namespace.unwrap_or(DEFAULT_NAMESPACE), name);
        let constructor = self.resolver.resolve(&logical_name, is_admin)?;
        debug!("构造控制器{}", logical_name);

        constructor(services).map_err(|e| {
            error!("控制器{}构造失败：{}", logical_name, e);
            match e {
                Exception::ConstructionError(_) => e,
                other => Exception::ConstructionError(format!("{}: {}", logical_name, other)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        context::RequestContext,
        controller::Outcome,
        database::MemoryDatabase,
        resolver::{NamespaceTable, Tier},
    };
    use std::sync::Arc;

    struct Dummy;

    impl PageController for Dummy {
        fn handle_get(self: Box<Self>, _ctx: &RequestContext, output: &mut String) -> Option<Outcome> {
            output.push_str("dummy");
            None
        }

        fn handle_post(self: Box<Self>, _ctx: &RequestContext, _output: &mut String) -> Outcome {
            Outcome::Reset
        }
    }

    fn build_dummy(_services: &Services) -> Result<Box<dyn PageController>, Exception> {
        Ok(Box::new(Dummy))
    }

    fn build_broken(_services: &Services) -> Result<Box<dyn PageController>, Exception> {
        Err(Exception::DatabaseError("offline".into()))
    }

    fn services() -> Services {
        Services {
            config: Arc::new(Config::new()),
            database: Arc::new(MemoryDatabase::new()),
            session: None,
        }
    }

    fn resolver() -> ControllerResolver {
        let mut namespaces = NamespaceTable::new();
        namespaces.register(DEFAULT_NAMESPACE, "src/controllers/");
        namespaces.register("plugin::", "plugins/");
        let mut resolver = ControllerResolver::new(namespaces, "admin/");
        resolver
            .install(Tier::Public, &format!("{}Dummy", DEFAULT_NAMESPACE), build_dummy)
            .unwrap();
        resolver
            .install(Tier::Admin, "plugin::Dummy", build_dummy)
            .unwrap();
        resolver
            .install(Tier::Public, "plugin::Broken", build_broken)
            .unwrap();
        resolver
    }

    #[test]
    fn test_default_namespace() {
        let resolver = resolver();
        let factory = ControllerFactory::new(&resolver);
        let controller = factory.create_controller("Dummy", None, false, &services()).unwrap();

        let ctx = RequestContext::new(1, crate::param::HttpRequestMethod::Get, "/", "admin/", Default::default());
        let mut output = String::new();
        assert_eq!(controller.handle_get(&ctx, &mut output), None);
        assert_eq!(output, "dummy");
    }

    #[test]
    fn test_explicit_namespace_respects_tier() {
        let resolver = resolver();
        let factory = ControllerFactory::new(&resolver);
        assert!(matches!(
            factory.create_controller("Dummy", Some("plugin::"), false, &services()),
            Err(Exception::ComponentNotFound(_))
        ));
        assert!(factory
            .create_controller("Dummy", Some("plugin::"), true, &services())
            .is_ok());
    }

    #[test]
    fn test_constructor_failure_is_construction_error() {
        let resolver = resolver();
        let factory = ControllerFactory::new(&resolver);
        assert!(matches!(
            factory.create_controller("Broken", Some("plugin::"), false, &services()),
            Err(Exception::ConstructionError(_))
        ));
    }

    #[test]
    fn test_unknown_namespace() {
        let resolver = resolver();
        let factory = ControllerFactory::new(&resolver);
        assert!(matches!(
            factory.create_controller("Dummy", Some("nowhere::"), true, &services()),
            Err(Exception::NotRegistered(_))
        ));
    }
}
