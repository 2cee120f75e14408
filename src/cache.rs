use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::SystemTime;

use lru::LruCache;

#[derive(Clone)]
struct CacheEntry {
    content: Arc<str>,
    modified_time: SystemTime,
}

/// 模板缓存，以文件路径为键，修改时间变化即失效。
pub struct TemplateCache {
    cache: LruCache<String, CacheEntry>,
}

impl TemplateCache {
    // 根据容量构造
    pub fn from_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
        }
    }
    // 放入
    pub fn push(&mut self, path: &str, content: Arc<str>, modified_time: SystemTime) {
        let entry = CacheEntry {
            content,
            modified_time,
        };
        self.cache.put(path.to_string(), entry);
    }
    // 查询有效缓存
    pub fn find(&mut self, path: &str, current_modified_time: SystemTime) -> Option<Arc<str>> {
        match self.cache.get(path) {
            Some(entry) if entry.modified_time == current_modified_time => {
                Some(Arc::clone(&entry.content))
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}
