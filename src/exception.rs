// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了请求分发管线在生命周期中可能抛出的各类异常情况。
//!
//! ## 设计意图
//! - **错误分类**：涵盖协议解析错误、组件解析错误、模板错误以及外部协作者（数据库、口令哈希）错误。
//! - **语义映射**：每个变体都对应一个固定的 HTTP 状态码，见 [`Exception::status_code`]。
//! - **不泄露内部细节**：`Display` 输出只包含类别与逻辑名，绝不包含文件系统路径。

use std::fmt;

/// 分发管线处理请求过程中发生的异常类型。
#[derive(Debug, Clone, PartialEq)]
pub enum Exception {
    /// 客户端发送的请求字节流无法解析为合法的 UTF-8 字符串。
    RequestIsNotUtf8,
    /// 请求行格式错误，或使用了服务器无法解析的 HTTP 方法。
    UnSupportedRequestMethod,
    /// 客户端使用了服务器不支持的 HTTP 协议版本。
    UnsupportedHttpVersion,
    /// 请求体超过配置的 `max_body_size`。
    PayloadTooLarge,
    /// 逻辑名没有匹配到任何已注册的命名空间前缀。属于进程配置错误。
    NotRegistered(String),
    /// 两个层级（public / admin）都找不到该组件。
    ComponentNotFound(String),
    /// 内容模板或外壳模板不存在。
    TemplateNotFound(String),
    /// 组件已找到，但无法用现有的协作者构造出实例。
    ConstructionError(String),
    /// POST 字段缺失或不合法、凭据不匹配等。携带面向用户的提示语。
    ValidationFailure(String),
    /// 持久化协作者执行查询失败。
    DatabaseError(String),
    /// 口令哈希计算或哈希串解析失败。
    HashingFailed,
}

use Exception::*;

impl Exception {
    /// 该异常在 HTTP 边界上对应的状态码。
    ///
    /// 组件解析失败一律按 400 返回，避免向客户端暴露内部布局；
    /// 模板缺失与配置类错误对该请求是致命的，按 500 返回。
    pub fn status_code(&self) -> u16 {
        match self {
            RequestIsNotUtf8
            | UnSupportedRequestMethod
            | UnsupportedHttpVersion
            | ComponentNotFound(_)
            | ConstructionError(_)
            | ValidationFailure(_) => 400,
            PayloadTooLarge => 413,
            NotRegistered(_) | TemplateNotFound(_) | DatabaseError(_) | HashingFailed => 500,
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestIsNotUtf8 => write!(f, "Request bytes can't be parsed in UTF-8"),
            UnSupportedRequestMethod => write!(f, "Unsupported request method"),
            UnsupportedHttpVersion => write!(f, "Unsupported HTTP version"),
            PayloadTooLarge => write!(f, "Request body too large"),
            NotRegistered(name) => write!(f, "Namespace prefix for {} not registered", name),
            ComponentNotFound(name) => write!(f, "Component {} not found", name),
            TemplateNotFound(name) => write!(f, "Template file {} not found", name),
            ConstructionError(name) => write!(f, "Component {} could not be constructed", name),
            ValidationFailure(msg) => write!(f, "Validation failed: {}", msg),
            DatabaseError(msg) => write!(f, "Database error: {}", msg),
            HashingFailed => write!(f, "Password hashing failed"),
        }
    }
}

impl std::error::Error for Exception {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_failures_are_client_errors() {
        assert_eq!(ComponentNotFound("x".into()).status_code(), 400);
        assert_eq!(ConstructionError("x".into()).status_code(), 400);
        assert_eq!(ValidationFailure("x".into()).status_code(), 400);
    }

    #[test]
    fn test_fatal_failures_are_server_errors() {
        assert_eq!(TemplateNotFound("page.tpl".into()).status_code(), 500);
        assert_eq!(NotRegistered("x".into()).status_code(), 500);
    }

    #[test]
    fn test_display_carries_logical_name_only() {
        let msg = ComponentNotFound("app::controllers::Secret".into()).to_string();
        assert_eq!(msg, "Component app::controllers::Secret not found");
    }
}
