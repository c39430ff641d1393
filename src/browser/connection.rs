use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{AppError, AppResult};

/// 连接到正在运行的浏览器并选出练习页面
///
/// # 参数
/// - `port`: 浏览器远程调试端口
/// - `target_url`: 页面 URL 片段；优先附加到 URL 包含它的已打开页面，找不到时新开该地址
///
/// # 返回
/// 未指定 `target_url` 时返回第一个已打开的页面（没有则新建空白页）
pub async fn connect_to_browser_and_page(
    port: u16,
    target_url: Option<&str>,
) -> AppResult<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("🔌 正在连接到浏览器: {}", browser_url);
    debug!("目标 URL: {:?}", target_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    match target_url {
        Some(url) => {
            for page in pages.iter() {
                if let Ok(Some(page_url)) = page.url().await {
                    debug!("检查页面: {}", page_url);
                    if page_url.contains(url) {
                        info!("✓ 附加到已打开的页面: {}", page_url);
                        return Ok((browser, page.clone()));
                    }
                }
            }

            debug!("未找到匹配的页面，新建页面并导航到: {}", url);
            let page = browser.new_page(url).await.map_err(|e| {
                error!("打开 {} 失败: {}", url, e);
                e
            })?;
            info!("✓ 已打开: {}", url);
            Ok((browser, page))
        }
        None => {
            if let Some(page) = pages.into_iter().next() {
                info!("✓ 附加到第一个已打开的页面");
                return Ok((browser, page));
            }
            debug!("浏览器没有打开的页面，创建空白页面");
            let page = browser.new_page("about:blank").await?;
            Ok((browser, page))
        }
    }
}
