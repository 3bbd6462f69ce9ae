use leptos::leptos_dom::ev::SubmitEvent;
use leptos::*;

use crate::message::{MessageRenderMode, MessageView, TypingIndicator};
use crate::session::{ChatStore, ConnectionStatus};
use crate::upload::AttachmentPicker;

#[component]
pub fn ChatPanel(mode: MessageRenderMode) -> impl IntoView {
    let store = expect_context::<ChatStore>();
    let (draft, set_draft) = create_signal(String::new());

    let can_send = move || store.session.with(|s| s.can_send());
    let disconnected = move || {
        store
            .session
            .with(|s| s.status() == ConnectionStatus::Disconnected && s.current().is_some())
    };
    let awaiting = move || store.session.with(|s| s.awaiting_reply());

    let update_draft = move |ev| {
        set_draft.set(event_target_value(&ev));
    };
    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if store.send(&draft.get_untracked()) {
            set_draft.set(String::new());
        }
    };
    let reconnect = move |_| store.retry_current();

    view! {
        <div class="grow flex flex-col overflow-hidden max-h-dvh">
            <main class="grow flex flex-col-reverse overflow-auto">
                {move || awaiting().then(|| view! { <TypingIndicator /> })}
                {move || {
                    store
                        .transcript
                        .with(|transcript| {
                            if transcript.is_empty() {
                                view! {
                                    <div class="h-full flex items-center justify-center text-gray-500 dark:text-gray-400">
                                        <div class="text-center space-y-2 p-8">
                                            <h2 class="text-2xl font-semibold">
                                                "How can I help you today?"
                                            </h2>
                                            <p>"Start a conversation by typing a message below."</p>
                                        </div>
                                    </div>
                                }
                                    .into_view()
                            } else {
                                transcript
                                    .messages()
                                    .iter()
                                    .rev()
                                    .cloned()
                                    .map(|message| {
                                        view! { <MessageView message=message mode=mode /> }
                                    })
                                    .collect::<Vec<_>>()
                                    .into_view()
                            }
                        })
                }}
            </main>
            {move || {
                disconnected()
                    .then(|| {
                        view! {
                            <div class="flex items-center justify-center gap-3 px-3 py-2 text-sm text-gray-500 dark:text-gray-400 bg-gray-50 dark:bg-gray-800">
                                <span>"Connection lost."</span>
                                <button
                                    type="button"
                                    class="text-blue-600 dark:text-blue-500 hover:underline"
                                    on:click=reconnect
                                >
                                    Reconnect
                                </button>
                            </div>
                        }
                    })
            }}
            <form class="w-full" on:submit=submit>
                <label for="chat" class="sr-only">
                    Your message
                </label>
                <div class="flex items-center gap-2 px-3 py-2 bg-gray-50 dark:bg-gray-700">
                    <AttachmentPicker />
                    <input
                        id="chat"
                        class="block p-2.5 w-full text-sm text-gray-900 bg-white rounded-lg border border-gray-300 focus:ring-blue-500 focus:border-blue-500 dark:bg-gray-800 dark:border-gray-600 dark:placeholder-gray-400 dark:text-white dark:focus:ring-blue-500 dark:focus:border-blue-500 resize-none"
                        placeholder="Send a message..."
                        on:input=update_draft
                        prop:value=draft
                        disabled=move || !can_send()
                    />
                    <button
                        type="submit"
                        class="inline-flex justify-center p-2 text-blue-600 rounded-full cursor-pointer hover:bg-blue-100 dark:text-blue-500 dark:hover:bg-gray-600 disabled:text-gray-400 disabled:cursor-not-allowed"
                        disabled=move || !can_send()
                    >
                        <svg
                            class="w-5 h-5 rotate-90 rtl:-rotate-90"
                            aria-hidden="true"
                            xmlns="http://www.w3.org/2000/svg"
                            fill="currentColor"
                            viewBox="0 0 18 20"
                        >
                            <path d="m17.914 18.594-8-18a1 1 0 0 0-1.828 0l-8 18a1 1 0 0 0 1.157 1.376L8 18.281V9a1 1 0 0 1 2 0v9.281l6.758 1.689a1 1 0 0 0 1.156-1.376Z" />
                        </svg>
                        <span class="sr-only">Send message</span>
                    </button>
                </div>
            </form>
        </div>
    }
}
