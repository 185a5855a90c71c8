// Page Rendering
//
// 服务端渲染的单页界面：侧边栏登录面板 + 对话区

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

use crate::modules::chat::ChatMessage;
use crate::modules::session::{LoginChoice, SessionState};
use crate::shared::Notice;

pub const PAGE_TITLE: &str = "📊 DataScience Chatbot";
pub const INPUT_PLACEHOLDER: &str = "Type your question here...";

const STYLE: &str = r#"
body { margin: 0; font-family: sans-serif; display: flex; min-height: 100vh; }
aside { width: 280px; padding: 1.5rem; background: #f0f2f6; }
main { flex: 1; padding: 1.5rem 3rem; max-width: 860px; }
.bubble { display: flex; gap: .75rem; padding: .75rem 1rem; margin: .5rem 0; border-radius: .5rem; }
.bubble.human { background: #f7f7f9; }
.bubble.assistant { background: #eef4ff; }
.bubble .avatar { font-size: 1.4rem; }
.bubble .content p:first-child { margin-top: 0; }
.notice { padding: .75rem 1rem; border-radius: .5rem; margin-bottom: 1rem; }
.notice-success { background: #dff5e1; color: #1b5e20; }
.notice-info { background: #e3f2fd; color: #0d47a1; }
.notice-error { background: #fdecea; color: #b71c1c; }
form.chat input { width: 100%; padding: .75rem; box-sizing: border-box; }
"#;

/// 渲染主页面
pub fn render_page(state: &SessionState, notices: &[Notice]) -> String {
    let mut body = String::new();
    body.push_str(&render_sidebar(state));
    body.push_str("<main>");
    body.push_str(&format!("<h1>{}</h1>", escape(PAGE_TITLE)));
    body.push_str(&render_notices(notices));

    if let Some(user) = state.active_user() {
        body.push_str(&render_bubble(&ChatMessage::assistant(format!(
            "Hello, {}! I am a Data Science Chatbot. How can I assist you today?",
            user.display_name
        ))));
        for message in state.transcript() {
            body.push_str(&render_bubble(message));
        }
        body.push_str(&format!(
            r#"<form class="chat" method="post" action="/chat"><input type="text" name="prompt" placeholder="{}" autocomplete="off" autofocus></form>"#,
            escape(INPUT_PLACEHOLDER)
        ));
    }

    body.push_str("</main>");
    layout(&body)
}

/// 配置失败时的页面：只有标题与错误
pub fn render_unavailable(message: &str) -> String {
    let body = format!(
        "<main><h1>{}</h1>{}</main>",
        escape(PAGE_TITLE),
        render_notices(&[Notice::error(message)])
    );
    layout(&body)
}

fn layout(body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head><body>{}</body></html>",
        escape(PAGE_TITLE),
        STYLE,
        body
    )
}

fn render_sidebar(state: &SessionState) -> String {
    let selected = state.selected_choice();
    let mut html = String::from("<aside><h2>User Login</h2>");
    html.push_str(
        "<p class=\"subheader\">This is a unique chat session for each user. Try to remember your User ID for accessing the previous session.</p>",
    );

    html.push_str(r#"<form method="get" action="/"><p>Choose an option:</p>"#);
    for choice in [LoginChoice::New, LoginChoice::Existing] {
        let checked = if choice == selected { " checked" } else { "" };
        html.push_str(&format!(
            r#"<label><input type="radio" name="choice" value="{}" onchange="this.form.submit()"{}> {}</label><br>"#,
            choice.as_str(),
            checked,
            choice.label()
        ));
    }
    html.push_str("<noscript><button type=\"submit\">Switch</button></noscript></form>");

    // 老用户的名字按口令处理
    let (input_type, placeholder) = match selected {
        LoginChoice::New => ("text", "Make it unique"),
        LoginChoice::Existing => ("password", "Remember your User ID"),
    };
    html.push_str(&format!(
        r#"<form method="post" action="/login"><input type="hidden" name="choice" value="{}"><p><label>Enter your name:<br><input type="{}" name="name" placeholder="{}" autocomplete="off"></label></p><button type="submit">{}</button></form>"#,
        selected.as_str(),
        input_type,
        placeholder,
        selected.action_label()
    ));

    html.push_str("</aside>");
    html
}

fn render_notices(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(|notice| {
            format!(
                r#"<div class="notice {}">{}</div>"#,
                notice.level.css_class(),
                escape(&notice.text)
            )
        })
        .collect()
}

fn render_bubble(message: &ChatMessage) -> String {
    let (class, avatar, content) = match message {
        ChatMessage::Human(content) => ("human", "👤", render_plain(content)),
        ChatMessage::Assistant(content) => ("assistant", "🤖", render_markdown(content)),
    };
    format!(
        r#"<div class="bubble {}"><div class="avatar">{}</div><div class="content">{}</div></div>"#,
        class, avatar, content
    )
}

/// 链接与图片允许的协议；相对地址不受限
const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// 模型回复按 Markdown 渲染，原始 HTML 一律转义，不安全的链接地址置空
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(source, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_allowed_url(&url) {
        url
    } else {
        CowStr::Borrowed("#")
    }
}

fn is_allowed_url(url: &str) -> bool {
    // 浏览器会忽略协议名中的空白与控制字符
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    let Some((scheme, _)) = normalized.split_once(':') else {
        return true;
    };
    if scheme.contains(['/', '?', '#']) {
        return true;
    }
    ALLOWED_SCHEMES
        .iter()
        .any(|allowed| scheme.eq_ignore_ascii_case(allowed))
}

fn render_plain(source: &str) -> String {
    format!("<p>{}</p>", escape(source).replace('\n', "<br>"))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    html::push_html(&mut out, std::iter::once(Event::Text(text.into())));
    out
}
