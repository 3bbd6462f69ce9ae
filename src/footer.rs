use leptos::*;

#[component]
pub fn Footer() -> impl IntoView {
    let (privacy_open, set_privacy_open) = create_signal(false);
    let (terms_open, set_terms_open) = create_signal(false);

    view! {
        <footer class="border-t dark:border-gray-800 p-2">
            <div class="max-w-3xl mx-auto flex justify-center gap-4 text-sm text-gray-500 dark:text-gray-400">
                <button
                    class="hover:text-gray-900 dark:hover:text-gray-200 transition-colors"
                    on:click=move |_| set_privacy_open.set(true)
                >
                    "Privacy Policy"
                </button>
                <span>"•"</span>
                <button
                    class="hover:text-gray-900 dark:hover:text-gray-200 transition-colors"
                    on:click=move |_| set_terms_open.set(true)
                >
                    "Terms of Service"
                </button>
            </div>
        </footer>
        {move || {
            privacy_open
                .get()
                .then(|| {
                    view! {
                        <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/50">
                            <div class="max-h-[80vh] w-full max-w-lg overflow-y-auto rounded-lg bg-white dark:bg-gray-800 p-6 m-4 text-sm text-gray-700 dark:text-gray-300">
                                <div class="flex items-center justify-between pb-4">
                                    <h3 class="text-lg font-semibold text-gray-900 dark:text-white">
                                        "Privacy Policy"
                                    </h3>
                                    <button
                                        type="button"
                                        class="text-gray-500 hover:text-gray-900 dark:hover:text-white"
                                        on:click=move |_| set_privacy_open.set(false)
                                    >
                                        "Close"
                                    </button>
                                </div>
                                <div class="space-y-3">
                                    <h4 class="font-semibold">"Introduction"</h4>
                                    <p>
                                        "This Privacy Policy describes how Chat with Qwen-Coder \
                                        collects, uses, and shares your information. Conversations \
                                        and uploaded files are stored by the backend you connect \
                                        to; this client keeps no data of its own."
                                    </p>
                                    <h4 class="font-semibold">"What we store"</h4>
                                    <p>
                                        "Messages you send, replies you receive, and the decoded \
                                        content of files you attach are kept with the conversation \
                                        they belong to, and removed when you delete it."
                                    </p>
                                </div>
                            </div>
                        </div>
                    }
                })
        }}
        {move || {
            terms_open
                .get()
                .then(|| {
                    view! {
                        <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/50">
                            <div class="max-h-[80vh] w-full max-w-lg overflow-y-auto rounded-lg bg-white dark:bg-gray-800 p-6 m-4 text-sm text-gray-700 dark:text-gray-300">
                                <div class="flex items-center justify-between pb-4">
                                    <h3 class="text-lg font-semibold text-gray-900 dark:text-white">
                                        "Terms of Service"
                                    </h3>
                                    <button
                                        type="button"
                                        class="text-gray-500 hover:text-gray-900 dark:hover:text-white"
                                        on:click=move |_| set_terms_open.set(false)
                                    >
                                        "Close"
                                    </button>
                                </div>
                                <div class="space-y-3">
                                    <h4 class="font-semibold">"Agreement to Terms"</h4>
                                    <p>
                                        "By accessing and using Chat with Qwen-Coder, you agree to \
                                        these Terms of Service. Replies are generated by a language \
                                        model and may be wrong; review anything important before \
                                        relying on it."
                                    </p>
                                    <h4 class="font-semibold">"Acceptable use"</h4>
                                    <p>
                                        "Do not upload files you have no right to share, and do not \
                                        use the service to produce or distribute harmful content."
                                    </p>
                                </div>
                            </div>
                        </div>
                    }
                })
        }}
    }
}
