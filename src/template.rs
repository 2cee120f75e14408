// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 标签模板引擎
//!
//! 纯字符串替换工具，不做任何 I/O。所有操作都就地改写同一个页面缓冲区，
//! 管线中的每个阶段共享这一个 `String`。
//!
//! ## 支持的操作
//! - 单标签替换 / 批量标签替换 / 删除残留标签
//! - 逻辑区域（由一对分隔标签包围的片段）的提取与删除
//!
//! 逻辑区域只处理**第一次出现**的起始标签以及其后第一次出现的结束标签，
//! 不支持同名区域的嵌套或重复。

use std::{
    collections::HashMap,
    num::NonZeroUsize,
    sync::Mutex,
};

use lazy_static::lazy_static;
use log::{debug, error};
use lru::LruCache;
use regex::{Captures, Regex};

/// 已编译匹配器的缓存容量。每个页面只用到少数几组固定的标签集合。
const MATCHER_CACHE_SIZE: usize = 64;

lazy_static! {
    /// 标签集合（转义并按优先级拼接后的模式串）→ 已编译的匹配器。
    static ref MATCHERS: Mutex<LruCache<String, Regex>> = Mutex::new(LruCache::new(
        NonZeroUsize::new(MATCHER_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN)
    ));
}

/// 取出模式串对应的匹配器，没有时编译并缓存。`Regex` 的克隆只增加引用计数。
fn matcher(pattern: &str) -> Result<Regex, regex::Error> {
    let mut cache = match MATCHERS.lock() {
        Ok(lock) => lock,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(re) = cache.get(pattern) {
        return Ok(re.clone());
    }
    debug!("编译标签匹配器：{}", pattern);
    let re = Regex::new(pattern)?;
    cache.put(pattern.to_string(), re.clone());
    Ok(re)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateEngine;

impl TemplateEngine {
    pub fn new() -> Self {
        Self
    }

    /// 将 `output` 中出现的每一个 `tag` 替换为 `value`。`tag` 不存在时不做任何事。
    pub fn replace_tag(&self, tag: &str, value: &str, output: &mut String) {
        if tag.is_empty() || !output.contains(tag) {
            return;
        }
        *output = output.replace(tag, value);
    }

    /// 批量替换标签。
    ///
    /// 替换是“同时”进行的：一次扫描匹配所有标签，某个标签替换出来的值
    /// 不会被再次扫描。同一位置上多个标签都能匹配时，较长的标签优先。
    /// 列表中重复出现的标签以最后一项为准。
    pub fn parse_tags(&self, tags: &[(&str, &str)], output: &mut String) {
        let table: HashMap<&str, &str> = tags
            .iter()
            .filter(|(tag, _)| !tag.is_empty())
            .map(|(tag, value)| (*tag, *value))
            .collect();
        if table.is_empty() {
            return;
        }

        let mut needles: Vec<&str> = table.keys().copied().collect();
        needles.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let pattern = needles
            .iter()
            .map(|tag| regex::escape(tag))
            .collect::<Vec<_>>()
            .join("|");

        let re = match matcher(&pattern) {
            Ok(re) => re,
            Err(e) => {
                error!("无法为标签集合构建匹配器：{}", e);
                return;
            }
        };
        let replaced = re
            .replace_all(output.as_str(), |caps: &Captures| {
                let matched = &caps[0];
                table.get(matched).copied().unwrap_or(matched).to_string()
            })
            .into_owned();
        *output = replaced;
    }

    /// 删除残留的标签（替换为空字符串）。
    pub fn remove_tags(&self, tags: &[&str], output: &mut String) {
        let blanks: Vec<(&str, &str)> = tags.iter().map(|tag| (*tag, "")).collect();
        self.parse_tags(&blanks, output);
    }

    /// 返回第一个 `start` 与其后第一个 `end` 之间的内容。
    ///
    /// 找不到 `start`，或 `start` 之后没有 `end` 时返回空字符串。
    pub fn logic_tag(&self, start: &str, end: &str, content: &str) -> String {
        match find_region(start, end, content) {
            Some((open, close)) => content[open + start.len()..close].to_string(),
            None => String::new(),
        }
    }

    /// 删除从第一个 `start` 到其后第一个 `end` 的整段内容（包含两个分隔标签）。
    ///
    /// 任一分隔标签缺失时缓冲区保持不变。
    pub fn remove_logic_tag(&self, start: &str, end: &str, content: &mut String) {
        if let Some((open, close)) = find_region(start, end, content) {
            content.replace_range(open..close + end.len(), "");
        }
    }
}

/// 定位逻辑区域，返回 (起始标签位置, 结束标签位置)。
fn find_region(start: &str, end: &str, content: &str) -> Option<(usize, usize)> {
    if start.is_empty() || end.is_empty() {
        return None;
    }
    let open = content.find(start)?;
    let body_from = open + start.len();
    let close = content[body_from..].find(end)? + body_from;
    Some((open, close))
}
