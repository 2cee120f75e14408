// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 该模块定义了框架遵循的 HTTP 协议相关常量以及模板文件的标签契约，包括：
//! - 分发管线会用到的 HTTP 状态码及其原因短语（Reason Phrase）。
//! - 模板标签（与模板文件之间的“线上协议”，必须逐字保留）。
//! - HTTP 方法、版本及编码格式的强类型枚举。

use lazy_static::lazy_static;
use std::collections::HashMap;

/// 服务器名称标识，用于 HTTP 响应头的 `Server` 字段
pub const SERVER_NAME: &str = "tagpage";

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 外壳模板文件名
pub const PAGE_TEMPLATE: &str = "page.tpl";

/// 模板文件扩展名
pub const TEMPLATE_EXT: &str = ".tpl";

/// 组件在注册表中使用的“源文件”扩展名
pub const COMPONENT_EXT: &str = ".rs";

/// 默认的控制器命名空间
pub const DEFAULT_NAMESPACE: &str = "tagpage::controllers::";

/// 选择 POST 动作的表单字段
pub const MODE_FIELD: &str = "mode";

/// 未匹配任何页面时使用的内容模板
pub const NOT_FOUND_TEMPLATE: &str = "404";

/// 未匹配任何页面时使用的标题
pub const NOT_FOUND_TITLE: &str = "Page Not Found";

// --- 模板标签 ---
pub const TAG_BASEURL: &str = "{BASEURL}";
pub const TAG_THISYEAR: &str = "{THISYEAR}";
pub const TAG_ADMINFOLDER: &str = "{ADMINFOLDER}";
pub const TAG_PAGE: &str = "{PAGE}";
pub const TAG_TITLE: &str = "{TITLE}";
pub const TAG_USERNAME: &str = "{USERNAME}";
pub const TAG_EXTRASTYLESHEETS: &str = "{EXTRASTYLESHEETS}";
pub const TAG_EXTRASTYLESHEETS_END: &str = "{/EXTRASTYLESHEETS}";
pub const TAG_ADMINSTYLESHEET: &str = "{ADMINSTYLESHEET}";
pub const TAG_ADMINSTYLESHEET_END: &str = "{/ADMINSTYLESHEET}";

lazy_static! {
    /// 服务器允许处理的 HTTP 方法列表。
    ///
    /// 其余方法由服务器直接以 405 响应，不进入分发管线。
    pub static ref ALLOWED_METHODS: Vec<HttpRequestMethod> = {
        vec![
            HttpRequestMethod::Get,
            HttpRequestMethod::Post,
        ]
    };
}

lazy_static! {
    /// HTTP 状态码与其对应的标准原因短语映射表。
    ///
    /// 只收录框架实际会发出的状态码。
    /// 参考标准：[RFC 9110: HTTP Semantics](https://www.rfc-editor.org/rfc/rfc9110.html)。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> = {
        let mut map = HashMap::new();
        map.insert(200, "OK");
        map.insert(204, "No Content");
        map.insert(205, "Reset Content");
        map.insert(206, "Partial Content");
        map.insert(400, "Bad Request");
        map.insert(403, "Forbidden");
        map.insert(405, "Method Not Allowed");
        map.insert(413, "Content Too Large");
        map.insert(500, "Internal Server Error");
        map
    };
}

/// 支持的 HTTP 协议版本
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpVersion {
    /// HTTP/1.0 版本（部分命令行工具仍在使用）
    V1_0,
    /// HTTP/1.1 版本
    V1_1,
}

/// 可解析的 HTTP 请求方法
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpRequestMethod {
    /// 获取页面
    Get,
    /// 获取页面元数据
    Head,
    /// 查询服务器支持的选项
    Options,
    /// 提交表单，触发 POST 动作
    Post,
}

/// 支持的内容编码（压缩）格式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpEncoding {
    /// GNU zip 压缩
    Gzip,
    /// zlib 压缩
    Deflate,
    /// Brotli 压缩
    Br,
}

use std::fmt;

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpVersion::V1_0 => write!(f, "1.0"),
            HttpVersion::V1_1 => write!(f, "1.1"),
        }
    }
}

impl fmt::Display for HttpRequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpRequestMethod::Get => write!(f, "GET"),
            HttpRequestMethod::Head => write!(f, "HEAD"),
            HttpRequestMethod::Options => write!(f, "OPTIONS"),
            HttpRequestMethod::Post => write!(f, "POST"),
        }
    }
}

impl fmt::Display for HttpEncoding {
    /// 将枚举格式化为 `Content-Encoding` 头所使用的标识符
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpEncoding::Gzip => write!(f, "gzip"),
            HttpEncoding::Deflate => write!(f, "deflate"),
            HttpEncoding::Br => write!(f, "br"),
        }
    }
}
