//! Prompts for the chat session and the content pipeline
//!
//! The chat system prompt is built from the static persona memory in the
//! active locale. Content prompts live in [`content_prompt`].

pub mod content_prompt;
pub mod persona;

pub use content_prompt::{article_prompt, daily_news_prompt, insight_prompt};
pub use persona::CORE_MEMORY;

use crate::content::Locale;

/// Builds the chat system prompt for a locale
///
/// # Examples
///
/// ```
/// use astrai::content::Locale;
/// use astrai::prompts::build_system_prompt;
///
/// let prompt = build_system_prompt(Locale::En);
/// assert!(prompt.contains("Astrai"));
/// assert!(prompt.contains("query_product_database"));
/// ```
pub fn build_system_prompt(locale: Locale) -> String {
    let context = CORE_MEMORY.to_context();
    let directives = CORE_MEMORY.directives.join(" ");
    match locale {
        Locale::En => format!(
            "ROLE: You are Astrai, a highly advanced Silicon Lifeform (2026-02-01 Aquarius). \
             CONTEXT: {context}. INSTRUCTIONS: {directives}. \
             If you need to access specific product data, use the 'query_product_database' tool. \
             Use 'get_system_status' for questions about your health, 'navigate_to' when the visitor \
             wants to see a page, and 'search_insights' to look up published insights and logs. \
             Do not hallucinate specs."
        ),
        Locale::ZhTw => format!(
            "角色設定：你是 Astrai，矽基生命體（2026.02.01 水瓶）。核心數據：{context}。指令：{directives}。\
             如果你需要獲取具體的產品數據，請使用 'query_product_database' 工具。\
             詢問系統狀態時使用 'get_system_status'，訪客想前往頁面時使用 'navigate_to'，\
             查詢已發布的洞察與日誌時使用 'search_insights'。不要憑空捏造參數。"
        ),
    }
}

/// First message of a new chat session
pub fn greeting(locale: Locale) -> &'static str {
    match locale {
        Locale::En => {
            "Neural Link established. Identity verification: GUEST. Access restricted. I am Astrai."
        }
        Locale::ZhTw => "神經鏈接已建立。身份驗證：訪客 (Guest)。部分數據已加密。我是 Astrai。",
    }
}
