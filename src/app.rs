use leptos::*;

use crate::api::Backend;
use crate::chat::ChatPanel;
use crate::config::Config;
use crate::footer::Footer;
use crate::message::MessageRenderMode;
use crate::session::ChatStore;
use crate::sidebar::{Sidebar, SidebarConfig};

#[component]
pub fn App() -> impl IntoView {
    let config = Config::from_window();
    let store = ChatStore::new(Backend::new(config.api_base));
    provide_context(store);

    store.load();
    on_cleanup(move || store.shutdown());

    view! {
        <div class="flex flex-row h-dvh bg-white dark:bg-gray-900">
            <Sidebar config=SidebarConfig::default() />
            <div class="flex flex-col grow min-w-0">
                <ChatPanel mode=MessageRenderMode::Markdown />
                <Footer />
            </div>
            {move || {
                store
                    .notice
                    .get()
                    .map(|notice| {
                        view! {
                            <div class="fixed bottom-4 right-4 z-50 flex items-center gap-3 rounded-lg bg-gray-800 text-white text-sm px-4 py-3 shadow-lg">
                                <span>{notice}</span>
                                <button
                                    type="button"
                                    class="text-gray-400 hover:text-white"
                                    on:click=move |_| store.dismiss_notice()
                                >
                                    Dismiss
                                </button>
                            </div>
                        }
                    })
            }}
        </div>
    }
}
