use chrono::NaiveDateTime;
use leptos::*;
use pulldown_cmark_escape::escape_html;

use crate::state::{Message, MessageBody, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageRenderMode {
    #[default]
    Markdown,
    Plain,
}

pub fn render_body_html(mode: MessageRenderMode, text: &str) -> String {
    match mode {
        MessageRenderMode::Markdown => {
            let parser = pulldown_cmark::Parser::new(text);
            let mut html = String::new();
            pulldown_cmark::html::push_html(&mut html, parser);
            html
        }
        MessageRenderMode::Plain => {
            let mut escaped = String::new();
            let _ = escape_html(&mut escaped, text);
            format!("<p>{escaped}</p>")
        }
    }
}

fn stamp(at: NaiveDateTime) -> String {
    format!("{}", at.format("%H:%M"))
}

#[component]
pub fn MessageView(message: Message, mode: MessageRenderMode) -> impl IntoView {
    let is_user = message.role == Role::User;
    let at = stamp(message.at);
    let (text, attachment) = match message.body {
        MessageBody::Text(text) => (text, None),
        MessageBody::TextWithAttachment { text, attachment } => (text, Some(attachment)),
    };
    let rendered = render_body_html(mode, &text);
    let bubble = if is_user {
        "flex flex-col gap-1 rounded-lg px-4 py-2 max-w-[80%] text-sm text-gray-900 dark:text-white bg-blue-100 dark:bg-blue-900"
    } else {
        "flex flex-col gap-1 rounded-lg px-4 py-2 max-w-[80%] text-sm text-gray-900 dark:text-white bg-gray-100 dark:bg-gray-700"
    };
    view! {
        <div class="mb-4 mx-5 flex" class:justify-end=move || is_user class:justify-start=move || !is_user>
            <div class=bubble>
                {attachment
                    .map(|attachment| {
                        view! {
                            <div
                                class="flex items-center gap-2 text-xs text-gray-500 dark:text-gray-300 border border-gray-300 dark:border-gray-600 rounded px-2 py-1"
                                title=attachment.mime_type.clone()
                            >
                                <svg class="w-4 h-4" aria-hidden="true" xmlns="http://www.w3.org/2000/svg" fill="none" viewBox="0 0 20 20">
                                    <path
                                        stroke="currentColor"
                                        stroke-linecap="round"
                                        stroke-linejoin="round"
                                        stroke-width="2"
                                        d="M5 8V4.5A2.5 2.5 0 0 1 7.5 2H14l4 4v11.5a2.5 2.5 0 0 1-2.5 2.5h-8A2.5 2.5 0 0 1 5 17.5V16"
                                    />
                                </svg>
                                <span>{attachment.filename}</span>
                            </div>
                        }
                    })}
                <div inner_html=rendered />
                <span class="text-xs font-normal text-gray-500 dark:text-gray-400 self-end">
                    {at}
                </span>
            </div>
        </div>
    }
}

#[component]
pub fn TypingIndicator() -> impl IntoView {
    view! {
        <div class="mb-4 mx-5 flex justify-start">
            <div class="rounded-lg px-4 py-3 bg-gray-100 dark:bg-gray-700">
                <div class="flex space-x-2">
                    <div class="w-2 h-2 bg-gray-500 rounded-full animate-bounce [animation-delay:-0.3s]"></div>
                    <div class="w-2 h-2 bg-gray-500 rounded-full animate-bounce [animation-delay:-0.15s]"></div>
                    <div class="w-2 h-2 bg-gray-500 rounded-full animate-bounce"></div>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_renders_paragraphs_and_code_fences() {
        let html = render_body_html(MessageRenderMode::Markdown, "hello world");
        assert_eq!(html, "<p>hello world</p>\n");

        let html = render_body_html(
            MessageRenderMode::Markdown,
            "Compile it:\n\n```bash\nrustc main.rs\n```",
        );
        assert!(html.contains("<pre><code"));
        assert!(html.contains("rustc main.rs"));
    }

    #[test]
    fn plain_mode_escapes_markup() {
        let html = render_body_html(MessageRenderMode::Plain, "<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn stamps_use_hours_and_minutes() {
        let at = chrono::DateTime::from_timestamp(60 * 60 * 13 + 60 * 7, 0)
            .unwrap()
            .naive_utc();
        assert_eq!(stamp(at), "13:07");
    }
}
