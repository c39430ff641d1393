//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"以及页面读写的能力

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::dom::{NodeId, Snapshot};
use crate::error::{AppError, AppResult};
use crate::models::PageAction;

/// 把 `document.body` 压平成先序节点数组，同时给每个元素打上 `data-wl-id`
const CAPTURE_SNAPSHOT_JS: &str = r#"
(() => {
    const SKIP = new Set(['SCRIPT', 'STYLE', 'NOSCRIPT', 'TEMPLATE']);
    const nodes = [];
    const active = document.activeElement;
    const visit = (el) => {
        const id = nodes.length;
        el.setAttribute('data-wl-id', String(id));
        const rect = el.getBoundingClientRect();
        const style = window.getComputedStyle(el);
        const hidden = style.display === 'none' || style.visibility === 'hidden';
        const attrs = {};
        for (const attr of el.attributes) {
            if (attr.name !== 'data-wl-id') attrs[attr.name] = attr.value;
        }
        let text = '';
        for (const child of el.childNodes) {
            if (child.nodeType === Node.TEXT_NODE) text += child.textContent;
        }
        const isField = el.tagName === 'INPUT' || el.tagName === 'TEXTAREA';
        const node = {
            tag: el.tagName.toLowerCase(),
            attrs,
            text: text.trim(),
            children: [],
            bounds: hidden
                ? { x: 0, y: 0, width: 0, height: 0 }
                : { x: rect.x, y: rect.y, width: rect.width, height: rect.height },
            fontSize: parseFloat(style.fontSize) || 16,
            value: isField ? String(el.value) : (el.isContentEditable ? el.innerText : null),
            focused: el === active,
        };
        nodes.push(node);
        for (const child of el.children) {
            if (SKIP.has(child.tagName) || child.hasAttribute('data-wl-panel')) continue;
            node.children.push(visit(child));
        }
        return id;
    };
    if (document.body) visit(document.body);
    return { viewportHeight: window.innerHeight, nodes };
})()
"#;

const VISIBLE_TEXT_LEN_JS: &str = "(document.body ? document.body.innerText.length : 0)";

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力
/// - 执行 `PageAction` 描述的写操作
/// - 不认识题目 / 词库
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    ///
    /// # 参数
    /// - `js_code`: 要执行的 JavaScript 代码（必须有返回值）
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 抓取当前页面快照
    pub async fn capture_snapshot(&self) -> AppResult<Snapshot> {
        let value = self.eval(CAPTURE_SNAPSHOT_JS).await?;
        let snapshot = Snapshot::from_json(value)?;
        debug!("抓取快照: {} 个节点", snapshot.len());
        Ok(snapshot)
    }

    /// 页面可见文本长度（轮询变化用，开销很小）
    pub async fn visible_text_len(&self) -> AppResult<usize> {
        self.eval_as(VISIBLE_TEXT_LEN_JS).await
    }

    /// 高亮节点
    pub async fn highlight(&self, node: NodeId) -> AppResult<bool> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector('[data-wl-id="{node}"]');
                if (!el) return false;
                el.style.outline = '3px solid #22c55e';
                el.style.outlineOffset = '2px';
                return true;
            }})()"#
        );
        self.eval_as(js).await
    }

    /// 向输入框写入文本并派发 input 事件
    pub async fn set_input_value(&self, node: NodeId, text: &str) -> AppResult<bool> {
        let literal = serde_json::to_string(text)?;
        let js = format!(
            r#"(() => {{
                const el = document.querySelector('[data-wl-id="{node}"]');
                if (!el) return false;
                const text = {literal};
                if (el.isContentEditable) {{
                    el.innerText = text;
                }} else {{
                    const proto = el.tagName === 'TEXTAREA'
                        ? HTMLTextAreaElement.prototype
                        : HTMLInputElement.prototype;
                    const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
                    setter.call(el, text);
                }}
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                return true;
            }})()"#
        );
        self.eval_as(js).await
    }

    /// 执行一个写操作；节点已不存在时返回 false
    pub async fn apply(&self, action: &PageAction) -> AppResult<bool> {
        match action {
            PageAction::Highlight { node } => self.highlight(*node).await,
            PageAction::SetInputValue { node, text } => self.set_input_value(*node, text).await,
        }
    }

    /// 在页面右下角显示提示（面板带 `data-wl-panel`，抓取快照时跳过）
    pub async fn show_hint(&self, hint: &str) -> AppResult<()> {
        let literal = serde_json::to_string(hint)?;
        let js = format!(
            r#"(() => {{
                let panel = document.querySelector('[data-wl-panel]');
                if (!panel) {{
                    panel = document.createElement('div');
                    panel.setAttribute('data-wl-panel', 'hint');
                    panel.style.cssText = 'position:fixed;right:16px;bottom:16px;z-index:2147483647;'
                        + 'padding:8px 12px;border-radius:6px;background:#1f2937;color:#f9fafb;'
                        + 'font:14px sans-serif;pointer-events:none;';
                    document.body.appendChild(panel);
                }}
                panel.textContent = {literal};
                return true;
            }})()"#
        );
        let shown: bool = self.eval_as(js).await?;
        if shown {
            Ok(())
        } else {
            Err(AppError::Script("提示面板创建失败".to_string()))
        }
    }
}
