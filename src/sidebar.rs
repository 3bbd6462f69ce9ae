use leptos::ev::MouseEvent;
use leptos::*;

use crate::loading::Loading;
use crate::session::ChatStore;

/// One sidebar serves every screen variant; the differences ride in here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidebarConfig {
    pub allow_delete: bool,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        SidebarConfig { allow_delete: true }
    }
}

#[component]
pub fn Sidebar(config: SidebarConfig) -> impl IntoView {
    let store = expect_context::<ChatStore>();
    let (show, set_show) = create_signal(true);

    let new_conversation = move |_| store.create();

    view! {
        {move || {
            if show.get() {
                view! { <div /> }
            } else {
                view! {
                    <div
                        class="lg:hidden text-gray-500 dark:text-gray-400 p-5 absolute top-0 left-0"
                        on:click=move |_| {
                            set_show.update(|s| *s = !*s);
                        }
                    >
                        <svg viewBox="0 0 10 8" width="20">
                            <path
                                d="M1 1h8M1 4h 8M1 7h8"
                                stroke="currentColor"
                                fill="currentColor"
                                stroke-width="2"
                                stroke-linecap="round"
                            />
                        </svg>
                    </div>
                }
            }
        }}
        <div
            class="lg:w-1/5 w-full lg:flex border-e-2 dark:border-gray-800 min-h-dvh max-h-dvh overflow-y-auto dark:text-white"
            class:hidden=move || !show.get()
        >
            <div class="text-center w-full flex flex-col">
                <div
                    class="lg:hidden text-gray-500 dark:text-gray-400 p-5"
                    on:click=move |_| {
                        set_show.update(|s| *s = !*s);
                    }
                >
                    <svg viewBox="0 0 10 10" width="20">
                        <path
                            d="M1 1L9 9M1 9L9 1"
                            stroke="currentColor"
                            fill="currentColor"
                            stroke-width="2"
                            stroke-linecap="round"
                        />
                    </svg>
                </div>
                <h5 class="text-base py-2.5 m-4 font-semibold text-gray-500 uppercase dark:text-gray-400">
                    Chat with Qwen-Coder
                </h5>
                <div class="px-4 pb-2">
                    <button
                        type="button"
                        class="text-white bg-gray-800 hover:bg-gray-900 focus:outline-none focus:ring-4 focus:ring-gray-300 font-medium rounded-lg text-sm px-5 py-2.5 w-full dark:bg-gray-800 dark:hover:bg-gray-700 dark:focus:ring-gray-700 dark:border-gray-700"
                        on:click=new_conversation
                    >
                        + New Chat
                    </button>
                </div>
                <div class="py-4 overflow-y-auto grow">
                    <ul class="space-y-2 font-medium px-2">
                        {move || {
                            let rows = store
                                .session
                                .with(|s| {
                                    s.conversations()
                                        .iter()
                                        .map(|conv| (conv.clone(), s.is_current(&conv.id)))
                                        .collect::<Vec<_>>()
                                });
                            if rows.is_empty() {
                                return view! { <Loading /> }.into_view();
                            }
                            rows.into_iter()
                                .map(|(conv, active)| {
                                    let select_id = conv.id.clone();
                                    let delete_id = conv.id.clone();
                                    let stamp = format!("{}", conv.updated_at.format("%b %d"));
                                    let onclick = move |ev: MouseEvent| {
                                        ev.prevent_default();
                                        set_show.set(false);
                                        store.select(select_id.clone());
                                    };
                                    let ondelete = move |ev: MouseEvent| {
                                        ev.stop_propagation();
                                        store.delete(delete_id.clone());
                                    };
                                    view! {
                                        <li on:click=onclick>
                                            <a
                                                href="#"
                                                class="flex items-center p-2 text-gray-900 rounded-lg dark:text-white hover:bg-gray-100 dark:hover:bg-gray-700 group"
                                                class:bg-gray-100=move || active
                                                class=("dark:bg-gray-700", move || active)
                                            >
                                                <span class="ms-3 truncate grow text-left">{conv.title.clone()}</span>
                                                <span class="text-xs text-gray-500 dark:text-gray-400 px-2">
                                                    {stamp}
                                                </span>
                                                {config
                                                    .allow_delete
                                                    .then(|| {
                                                        view! {
                                                            <button
                                                                type="button"
                                                                class="invisible group-hover:visible text-gray-500 hover:text-gray-900 dark:hover:text-white px-1"
                                                                on:click=ondelete
                                                            >
                                                                <svg viewBox="0 0 10 10" width="10">
                                                                    <path
                                                                        d="M1 1L9 9M1 9L9 1"
                                                                        stroke="currentColor"
                                                                        fill="currentColor"
                                                                        stroke-width="2"
                                                                        stroke-linecap="round"
                                                                    />
                                                                </svg>
                                                            </button>
                                                        }
                                                    })}
                                            </a>
                                        </li>
                                    }
                                })
                                .collect::<Vec<_>>()
                                .into_view()
                        }}
                    </ul>
                </div>
            </div>
        </div>
    }
}
