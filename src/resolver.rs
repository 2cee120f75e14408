// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 组件解析器
//!
//! 根据逻辑名（命名空间前缀 + 裸名）定位组件。组件在启动时登记到注册表，
//! 登记位置与查找位置使用同一套计算规则：
//!
//! ```text
//! 公共层：  <根路径><相对路径>.rs
//! 管理层：  <根路径><管理员目录><相对路径>.rs
//! ```
//!
//! 其中相对路径 = 逻辑名去掉匹配的前缀，再把 `::` 与 `\` 换成 `/`。
//!
//! 查找时总是先试公共层；只有当前请求是管理员请求时才会继续尝试管理层。
//! 这是一条安全边界：非管理员请求即便知道逻辑名，也拿不到管理层组件。

use std::collections::HashMap;

use log::{debug, warn};

use crate::{config::NamespaceEntry, exception::Exception, param::COMPONENT_EXT};

/// 组件所在的层级。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Public,
    Admin,
}

/// 有序的“命名空间前缀 → 根路径”表。启动时填充，之后只读。
#[derive(Debug, Clone, Default)]
pub struct NamespaceTable {
    entries: Vec<(String, String)>,
}

impl NamespaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: &[NamespaceEntry]) -> Self {
        let mut table = Self::new();
        for entry in entries {
            table.register(&entry.prefix, &entry.path);
        }
        table
    }

    /// 登记一个前缀。重复登记同一前缀时更新其路径，但保留原来的顺序位置。
    pub fn register(&mut self, prefix: &str, path: &str) {
        match self.entries.iter_mut().find(|(p, _)| p == prefix) {
            Some(entry) => entry.1 = path.to_string(),
            None => self.entries.push((prefix.to_string(), path.to_string())),
        }
    }

    /// 返回 (根路径, 相对路径)。多个前缀都匹配时，登记顺序中最后一个胜出。
    pub fn locate(&self, logical_name: &str) -> Result<(&str, String), Exception> {
        let (prefix, base) = self
            .entries
            .iter()
            .filter(|(prefix, _)| logical_name.starts_with(prefix.as_str()))
            .last()
            .ok_or_else(|| Exception::NotRegistered(logical_name.to_string()))?;

        let relative = logical_name[prefix.len()..]
            .replace("::", "/")
            .replace('\\', "/");
        Ok((base.as_str(), format!("{}{}", relative, COMPONENT_EXT)))
    }
}

/// 以位置为键的组件注册表。`H` 是组件句柄（例如构造函数）。
pub struct Resolver<H> {
    namespaces: NamespaceTable,
    admin_folder: String,
    components: HashMap<String, H>,
}

impl<H: Clone> Resolver<H> {
    pub fn new(namespaces: NamespaceTable, admin_folder: &str) -> Self {
        Self {
            namespaces,
            admin_folder: admin_folder.to_string(),
            components: HashMap::new(),
        }
    }

    fn location(&self, logical_name: &str, tier: Tier) -> Result<String, Exception> {
        let (base, relative) = self.namespaces.locate(logical_name)?;
        Ok(match tier {
            Tier::Public => format!("{}{}", base, relative),
            Tier::Admin => format!("{}{}{}", base, self.admin_folder, relative),
        })
    }

    /// 在指定层级登记组件。逻辑名没有可匹配的前缀时返回 `NotRegistered`。
    pub fn install(&mut self, tier: Tier, logical_name: &str, handle: H) -> Result<(), Exception> {
        let location = self.location(logical_name, tier)?;
        debug!("登记组件{}（{:?}）于{}", logical_name, tier, location);
        if self.components.insert(location, handle).is_some() {
            warn!("组件{}（{:?}）被重复登记，旧的登记已被覆盖", logical_name, tier);
        }
        Ok(())
    }

    /// 解析逻辑名：先公共层，再（仅管理员请求）管理层。
    pub fn resolve(&self, logical_name: &str, is_admin: bool) -> Result<H, Exception> {
        let public = self.location(logical_name, Tier::Public)?;
        if let Some(handle) = self.components.get(&public) {
            debug!("组件{}解析自公共层：{}", logical_name, public);
            return Ok(handle.clone());
        }

        if is_admin {
            let admin = self.location(logical_name, Tier::Admin)?;
            if let Some(handle) = self.components.get(&admin) {
                debug!("组件{}解析自管理层：{}", logical_name, admin);
                return Ok(handle.clone());
            }
        }

        Err(Exception::ComponentNotFound(logical_name.to_string()))
    }

    /// 只检查逻辑名是否有可匹配的前缀，用于启动时校验页面配置。
    pub fn check_registered(&self, logical_name: &str) -> Result<(), Exception> {
        self.namespaces.locate(logical_name).map(|_| ())
    }
}
