use crate::{param::*, util::HtmlBuilder};

use brotli::enc::{self, backward_references::BrotliEncoderParams};
use bytes::Bytes;
use chrono::prelude::*;
use flate2::{
    write::{DeflateEncoder, GzEncoder},
    Compression,
};
use log::{debug, error};

use std::io::{self, Write};

#[derive(Debug, Clone)]
pub struct Response {
    version: HttpVersion,
    status_code: u16,
    information: String,
    content_type: Option<String>,
    content_length: u64,
    date: DateTime<Utc>,
    content_encoding: Option<HttpEncoding>,
    server_name: String,
    allow: Option<Vec<HttpRequestMethod>>,
    set_cookie: Option<String>,
    content: Option<Bytes>,
}

impl Response {
    pub fn new() -> Self {
        Self {
            version: HttpVersion::V1_1,
            status_code: 200,
            information: "OK".to_string(),
            content_type: None,
            content_length: 0,
            date: Utc::now(),
            content_encoding: None,
            server_name: SERVER_NAME.to_string(),
            allow: None,
            set_cookie: None,
            content: None,
        }
    }

    /// 服务器自带的状态页。405 附带 `Allow`；204/205 不带响应体。
    pub fn from_status_code(code: u16, accept_encoding: &[HttpEncoding], id: u128) -> Self {
        let mut response = Self::new();
        if code == 204 || code == 205 {
            response.set_code(code);
            return response;
        }
        if code == 405 {
            response.allow = Some(ALLOWED_METHODS.to_vec());
        }
        let content = match code {
            405 => HtmlBuilder::from_status_code(405, Some(
                r"<h2>噢！</h2><p>本站点只接受GET和POST请求。</p>"
            )),
            413 => HtmlBuilder::from_status_code(413, Some(
                r"<h2>噢！</h2><p>提交的内容过大。</p>"
            )),
            500 => HtmlBuilder::from_status_code(500, Some(
                r"<h2>噢！</h2><p>服务器出现了一个内部错误。</p>"
            )),
            _ => HtmlBuilder::from_status_code(code, None),
        }
        .build();
        response.set_html(&content, accept_encoding, id);
        response.set_code(code);
        response
    }

    /// 页面编排产生的 HTML。205 按协议不带响应体。
    pub fn from_html(code: u16, html: &str, accept_encoding: &[HttpEncoding], id: u128) -> Self {
        let mut response = Self::new();
        response.set_code(code);
        if code == 205 {
            return response;
        }
        response.set_html(html, accept_encoding, id);
        response
    }

    fn set_html(&mut self, html: &str, accept_encoding: &[HttpEncoding], id: u128) {
        self.content_encoding = decide_encoding(accept_encoding);
        match self.content_encoding {
            Some(HttpEncoding::Gzip) => debug!("[ID{}]使用Gzip压缩编码", id),
            Some(HttpEncoding::Br) => debug!("[ID{}]使用Brotli压缩编码", id),
            Some(HttpEncoding::Deflate) => debug!("[ID{}]使用Deflate压缩编码", id),
            None => debug!("[ID{}]不进行压缩", id),
        };
        let content_compressed = match compress(Vec::from(html), self.content_encoding) {
            Ok(c) => c,
            Err(e) => {
                error!("[ID{}]压缩HTML失败: {}，返回未压缩内容", id, e);
                self.content_encoding = None;
                Vec::from(html)
            }
        };
        self.content_length = content_compressed.len() as u64;
        self.content_type = Some("text/html;charset=utf-8".to_string());
        self.content = Some(Bytes::from(content_compressed));
    }

    pub fn set_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.information = match STATUS_CODES.get(&code) {
            Some(&info) => info.to_string(),
            None => {
                error!("非法的状态码：{}。这条错误说明代码编写出现了错误。", code);
                self.status_code = 500;
                "Internal Server Error".to_string()
            }
        };
        self
    }

    pub fn set_version(&mut self, version: HttpVersion) -> &mut Self {
        self.version = version;
        self
    }

    pub fn set_cookie(&mut self, cookie: &str) -> &mut Self {
        self.set_cookie = Some(cookie.to_string());
        self
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let version: &str = match self.version {
            HttpVersion::V1_0 => "HTTP/1.0",
            HttpVersion::V1_1 => "HTTP/1.1",
        };
        let status_code: &str = &self.status_code.to_string();
        let information: &str = &self.information;
        let content_length: &str = &self.content_length.to_string();
        let date: &str = &format_date(&self.date);
        let server: &str = &self.server_name;

        let header = [
            version,
            " ",
            status_code,
            " ",
            information,
            CRLF,
            match &self.content_type {
                Some(t) => ["Content-Type: ", t, CRLF].concat(),
                None => "".to_string(),
            }
            .as_str(),
            match self.content_encoding {
                Some(e) => ["Content-Encoding: ", &e.to_string(), CRLF].concat(),
                None => "".to_string(),
            }
            .as_str(),
            "Content-Length: ",
            content_length,
            CRLF,
            "Date: ",
            date,
            CRLF,
            "Server: ",
            server,
            CRLF,
            match &self.allow {
                Some(a) => {
                    let methods: Vec<String> = a.iter().map(|m| m.to_string()).collect();
                    ["Allow: ", &methods.join(", "), CRLF].concat()
                }
                None => "".to_string(),
            }
            .as_str(),
            match &self.set_cookie {
                Some(c) => ["Set-Cookie: ", c, CRLF].concat(),
                None => "".to_string(),
            }
            .as_str(),
            CRLF,
        ]
        .concat();
        let body: &[u8] = match &self.content {
            Some(c) => c,
            None => b"",
        };
        [header.as_bytes(), body].concat()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    pub fn content(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }

    pub fn content_encoding(&self) -> Option<HttpEncoding> {
        self.content_encoding
    }

    pub fn cookie(&self) -> Option<&str> {
        self.set_cookie.as_deref()
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc2822()
}

fn compress(data: Vec<u8>, mode: Option<HttpEncoding>) -> io::Result<Vec<u8>> {
    let original_size = data.len();
    let result = match mode {
        Some(HttpEncoding::Gzip) => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&data)?;
            encoder.finish()
        }
        Some(HttpEncoding::Deflate) => {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&data)?;
            encoder.finish()
        }
        Some(HttpEncoding::Br) => {
            let params = BrotliEncoderParams::default();
            let mut output = Vec::new();
            enc::BrotliCompress(&mut io::Cursor::new(data), &mut output, &params)?;
            Ok(output)
        }
        None => Ok(data),
    };

    if let Ok(ref compressed) = result {
        debug!(
            "压缩完成: {:?}, 原始大小: {} bytes, 压缩后: {} bytes",
            mode,
            original_size,
            compressed.len()
        );
    }

    result
}

/// gzip 优先，其次 deflate；客户端只接受 br 时才用 brotli。
fn decide_encoding(accept_encoding: &[HttpEncoding]) -> Option<HttpEncoding> {
    if accept_encoding.contains(&HttpEncoding::Gzip) {
        Some(HttpEncoding::Gzip)
    } else if accept_encoding.contains(&HttpEncoding::Deflate) {
        Some(HttpEncoding::Deflate)
    } else if accept_encoding.contains(&HttpEncoding::Br) {
        Some(HttpEncoding::Br)
    } else {
        None
    }
}
