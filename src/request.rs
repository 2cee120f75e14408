// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 负责将 TCP 流中读取的原始字节解析为强类型的 `Request` 结构体。它涵盖了：
//! 1. 请求行（Request-Line）的解析（方法、路径、版本）。
//! 2. 常用 HTTP 标头（Headers）的提取，包括 `Cookie` 与 `Content-Length`。
//! 3. `application/x-www-form-urlencoded` 请求体的解码，供 POST 动作读取字段。
//! 4. 内容协商（Content Negotiation）相关的编码解析。

use std::collections::HashMap;

use crate::{exception::Exception, param::*};
use log::{error, warn};

const HEADER_END: &[u8] = b"\r\n\r\n";

/// 表示一个完整的 HTTP 请求。
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP 请求方法（GET, POST 等）
    method: HttpRequestMethod,
    /// 请求的资源路径（包含查询字符串）
    path: String,
    /// HTTP 协议版本
    version: HttpVersion,
    /// 客户端标识字符串
    user_agent: String,
    /// 客户端支持的压缩编码列表（按解析顺序排列）
    accept_encoding: Vec<HttpEncoding>,
    /// 请求携带的 Cookie，同名时后出现者覆盖前者
    cookies: HashMap<String, String>,
    /// 表单字段，仅在 urlencoded 请求体中解析
    form: HashMap<String, String>,
}

impl Request {
    /// 从原始字节缓冲区尝试构建 `Request` 实例。
    ///
    /// # 逻辑步骤
    /// 1. 验证编码：确保请求数据是合法的 UTF-8 字符串。
    /// 2. 解析请求行：提取方法、路径和协议版本。
    /// 3. 迭代解析标头：识别 `User-Agent`, `Cookie`, `Content-Type` 等字段。
    /// 4. 解析编码：专门处理 `Accept-Encoding` 以支持后续的压缩传输。
    /// 5. 解析请求体：表单类型的请求体被解码为字段表。
    ///
    /// # 参数
    /// * `buffer` - 从网络 Socket 读取的原始数据。
    /// * `id` - 全局请求 ID，用于在多线程环境下追踪日志。
    pub fn try_from(buffer: &[u8], id: u128) -> Result<Self, Exception> {
        // 1. 将字节流转换为字符串，失败则判定为非法的 HTTP 请求
        let request_string = match std::str::from_utf8(buffer) {
            Ok(string) => string,
            Err(_) => {
                error!("[ID{}]无法解析HTTP请求", id);
                return Err(Exception::RequestIsNotUtf8);
            }
        };

        let (head, body) = match request_string.split_once("\r\n\r\n") {
            Some((head, body)) => (head, body),
            None => (request_string, ""),
        };
        let request_lines: Vec<&str> = head.split(CRLF).collect();

        // 2. 解析请求行 (e.g., "POST /admin/login HTTP/1.1")
        let first_line_parts: Vec<&str> = request_lines[0].split(' ').collect();

        if first_line_parts.len() < 3 {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, request_lines[0]);
            return Err(Exception::UnSupportedRequestMethod);
        }

        // 解析方法名
        let method_str = first_line_parts[0].to_uppercase();
        let method = match method_str.as_str() {
            "GET" => HttpRequestMethod::Get,
            "HEAD" => HttpRequestMethod::Head,
            "OPTIONS" => HttpRequestMethod::Options,
            "POST" => HttpRequestMethod::Post,
            _ => {
                error!("[ID{}]不支持的HTTP请求方法：{}", id, &method_str);
                return Err(Exception::UnSupportedRequestMethod);
            }
        };

        // 解析协议版本
        let version_str = first_line_parts[first_line_parts.len() - 1].to_uppercase();
        let version = match version_str.as_str() {
            "HTTP/1.1" => HttpVersion::V1_1,
            "HTTP/1.0" => HttpVersion::V1_0,
            _ => {
                error!("[ID{}]不支持的HTTP协议版本：{}", id, &version_str);
                return Err(Exception::UnsupportedHttpVersion);
            }
        };

        // 解析路径（路径中可能包含未编码的空格，通过 join 尝试恢复）
        let path = if first_line_parts.len() == 3 {
            first_line_parts[1].to_string()
        } else {
            first_line_parts[1..first_line_parts.len() - 1].join(" ")
        };

        // 3. 迭代各行解析 Headers
        let mut user_agent = "".to_string();
        let mut accept_encoding = vec![];
        let mut cookies = HashMap::new();
        let mut is_form = false;
        for line in request_lines.iter().skip(1) {
            let (name, value) = match line.split_once(':') {
                Some((name, value)) => (name.trim().to_lowercase(), value.trim()),
                None => continue,
            };
            match name.as_str() {
                "user-agent" => user_agent = value.to_string(),
                "cookie" => {
                    for pair in value.split(';') {
                        if let Some((k, v)) = pair.split_once('=') {
                            cookies.insert(k.trim().to_string(), v.trim().to_string());
                        }
                    }
                }
                "content-type" => {
                    is_form = value
                        .to_lowercase()
                        .starts_with("application/x-www-form-urlencoded");
                }
                // 4. 解析 Accept-Encoding，只要包含关键词即视为支持
                "accept-encoding" if accept_encoding.is_empty() => {
                    if value.contains("gzip") {
                        accept_encoding.push(HttpEncoding::Gzip);
                    }
                    if value.contains("deflate") {
                        accept_encoding.push(HttpEncoding::Deflate);
                    }
                    if value.contains("br") {
                        accept_encoding.push(HttpEncoding::Br);
                    }
                }
                _ => {}
            }
        }

        // 5. 解析表单
        let form = if method == HttpRequestMethod::Post && is_form {
            parse_form(body, id)?
        } else {
            HashMap::new()
        };

        Ok(Self {
            method,
            path,
            version,
            user_agent,
            accept_encoding,
            cookies,
            form,
        })
    }
}

/// 解码 urlencoded 表单。`+` 视为空格；同名字段后出现者覆盖前者。
pub fn parse_form(body: &str, id: u128) -> Result<HashMap<String, String>, Exception> {
    let mut form = HashMap::new();
    for pair in body.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key, id)?;
        let value = decode_component(value, id)?;
        form.insert(key, value);
    }
    Ok(form)
}

fn decode_component(raw: &str, id: u128) -> Result<String, Exception> {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Ok(decoded.into_owned()),
        Err(e) => {
            warn!("[ID{}]表单字段解码失败：{}", id, e);
            Err(Exception::ValidationFailure("malformed form field".to_string()))
        }
    }
}

/// 已读完的标头长度与其声明的请求体长度（未声明时为 0）。标头未读完时返回 `None`。
pub fn frame_length(buffer: &[u8]) -> Option<(usize, usize)> {
    let header_end = buffer
        .windows(HEADER_END.len())
        .position(|window| window == HEADER_END)?
        + HEADER_END.len();

    let head = String::from_utf8_lossy(&buffer[..header_end]);
    let content_length = head
        .split(CRLF)
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    Some((header_end, content_length))
}

/// 根据已读取的字节判断请求是否完整。
///
/// 返回 `None` 表示标头尚未读完；否则返回整个请求（标头 + 请求体）应有的字节数。
pub fn expected_length(buffer: &[u8]) -> Option<usize> {
    frame_length(buffer).map(|(header_end, content_length)| header_end + content_length)
}

/// 在解析之前检查请求大小。
///
/// 声明的请求体超过 `max_body_size`，或标头尚未结束就已超过 `max_body_size`，
/// 都返回 `PayloadTooLarge`。其余情况同 [`expected_length`]。
pub fn check_length(buffer: &[u8], max_body_size: usize) -> Result<Option<usize>, Exception> {
    match frame_length(buffer) {
        Some((_, content_length)) if content_length > max_body_size => {
            Err(Exception::PayloadTooLarge)
        }
        Some((header_end, content_length)) => Ok(Some(header_end + content_length)),
        None if buffer.len() > max_body_size => Err(Exception::PayloadTooLarge),
        None => Ok(None),
    }
}

// --- Getter 访问器实现 ---

impl Request {
    /// 获取 HTTP 协议版本
    pub fn version(&self) -> &HttpVersion {
        &self.version
    }

    /// 获取请求路径（含查询参数）
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 获取不含查询参数的路径，用于页面路由
    pub fn route_path(&self) -> &str {
        self.path.split('?').next().unwrap_or(&self.path)
    }

    /// 获取请求方法
    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    /// 获取用户代理字符串
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// 获取客户端支持的压缩算法列表
    pub fn accept_encoding(&self) -> &Vec<HttpEncoding> {
        &self.accept_encoding
    }

    /// 获取指定名称的 Cookie
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// 获取解码后的表单字段
    pub fn form(&self) -> &HashMap<String, String> {
        &self.form
    }
}
