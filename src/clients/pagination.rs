//! 续页令牌分页

use std::collections::HashSet;
use std::future::Future;

use tracing::{debug, warn};

use crate::error::CatalogError;

/// 一页数据
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 下一页令牌，最后一页为 `None`
    pub next_token: Option<String>,
}

/// 反复调用 `fetch_page`，把上一页返回的令牌传给下一次请求，直到没有令牌为止
///
/// 任何一页失败都会中止整个获取过程。出现已经发送过的令牌时停止翻页。
pub async fn fetch_all_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, CatalogError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, CatalogError>>,
{
    let mut all_items = Vec::new();
    let mut token: Option<String> = None;
    let mut sent: HashSet<String> = HashSet::new();
    let mut pages = 0usize;

    loop {
        let page = fetch_page(token.clone()).await?;
        pages += 1;

        let next = page.next_token.filter(|t| !t.is_empty());
        debug!("第 {} 页: {} 条, 下一页令牌: {:?}", pages, page.items.len(), next);
        all_items.extend(page.items);

        match next {
            None => break,
            Some(next) if sent.contains(&next) => {
                warn!("⚠️ 续页令牌重复 ({})，停止翻页", next);
                break;
            }
            Some(next) => {
                sent.insert(next.clone());
                token = Some(next);
            }
        }
    }

    Ok(all_items)
}
