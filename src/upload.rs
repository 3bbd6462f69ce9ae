use leptos::html::Input;
use leptos::*;
use wasm_bindgen_futures::JsFuture;

use crate::session::ChatStore;

async fn read_file_bytes(file: &web_sys::File) -> Result<Vec<u8>, String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|err| format!("{err:?}"))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Picks a file, uploads it, and parks the decoded result as the pending
/// attachment for the next send. A failed upload leaves nothing pending.
#[component]
pub fn AttachmentPicker() -> impl IntoView {
    let store = expect_context::<ChatStore>();
    let input_ref = create_node_ref::<Input>();
    let (uploading, set_uploading) = create_signal(false);

    let pick = move |_| {
        if let Some(input) = input_ref.get() {
            input.click();
        }
    };

    let on_change = move |_| {
        let Some(input) = input_ref.get() else {
            return;
        };
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        // Reset so re-picking the same file fires another change event.
        input.set_value("");
        set_uploading.set(true);
        spawn_local(async move {
            let filename = file.name();
            let mime_type = match file.type_() {
                t if t.is_empty() => "text/plain".to_string(),
                t => t,
            };
            let outcome = match read_file_bytes(&file).await {
                Ok(bytes) => store
                    .backend()
                    .upload(&filename, &mime_type, bytes)
                    .await
                    .map_err(|err| err.to_string()),
                Err(err) => Err(err),
            };
            set_uploading.set(false);
            match outcome {
                Ok(attachment) => store.pending_attachment.set(Some(attachment)),
                Err(err) => {
                    store.pending_attachment.set(None);
                    store.report(format!("Upload of {filename} failed: {err}"));
                }
            }
        });
    };

    let clear = move |_| store.pending_attachment.set(None);

    view! {
        <input type="file" class="hidden" node_ref=input_ref on:change=on_change />
        <button
            type="button"
            class="inline-flex justify-center p-2 text-gray-500 rounded-lg cursor-pointer hover:text-gray-900 hover:bg-gray-100 dark:text-gray-400 dark:hover:text-white dark:hover:bg-gray-600"
            disabled=move || uploading.get()
            on:click=pick
        >
            {move || {
                if uploading.get() {
                    view! {
                        <svg
                            aria-hidden="true"
                            class="w-5 h-5 animate-spin"
                            xmlns="http://www.w3.org/2000/svg"
                            fill="none"
                            viewBox="0 0 100 101"
                        >
                            <path
                                d="M100 50.5908C100 78.2051 77.6142 100.591 50 100.591C22.3858 100.591 0 78.2051 0 50.5908C0 22.9766 22.3858 0.59082 50 0.59082C77.6142 0.59082 100 22.9766 100 50.5908ZM9.08144 50.5908C9.08144 73.1895 27.4013 91.5094 50 91.5094C72.5987 91.5094 90.9186 73.1895 90.9186 50.5908C90.9186 27.9921 72.5987 9.67226 50 9.67226C27.4013 9.67226 9.08144 27.9921 9.08144 50.5908Z"
                                fill="#E5E7EB"
                            />
                            <path
                                d="M93.9676 39.0409C96.393 38.4038 97.8624 35.9116 97.0079 33.5539C95.2932 28.8227 92.871 24.3692 89.8167 20.348C85.8452 15.1192 80.8826 10.7238 75.2124 7.41289C69.5422 4.10194 63.2754 1.94025 56.7698 1.05124C51.7666 0.367541 46.6976 0.446843 41.7345 1.27873C39.2613 1.69328 37.813 4.19778 38.4501 6.62326C39.0873 9.04874 41.5694 10.4717 44.0505 10.1071C47.8511 9.54855 51.7191 9.52689 55.5402 10.0491C60.8642 10.7766 65.9928 12.5457 70.6331 15.2552C75.2735 17.9648 79.3347 21.5619 82.5849 25.841C84.9175 28.9121 86.7997 32.2913 88.1811 35.8758C89.083 38.2158 91.5421 39.6781 93.9676 39.0409Z"
                                fill="currentColor"
                            />
                        </svg>
                    }
                } else {
                    view! {
                        <svg
                            class="w-5 h-5"
                            aria-hidden="true"
                            xmlns="http://www.w3.org/2000/svg"
                            fill="none"
                            viewBox="0 0 20 18"
                        >
                            <path
                                stroke="currentColor"
                                stroke-linecap="round"
                                stroke-linejoin="round"
                                stroke-width="2"
                                d="M18 1H2a1 1 0 0 0-1 1v14a1 1 0 0 0 1 1h16a1 1 0 0 0 1-1V2a1 1 0 0 0-1-1Z"
                            />
                            <path
                                stroke="currentColor"
                                stroke-linecap="round"
                                stroke-linejoin="round"
                                stroke-width="2"
                                d="M13 5.5a.5.5 0 1 1-1 0 .5.5 0 0 1 1 0ZM7.565 7.423 4.5 14h11.518l-2.516-3.71L11 13 7.565 7.423Z"
                            />
                        </svg>
                    }
                }
            }}
            <span class="sr-only">Attach a file</span>
        </button>
        {move || {
            store
                .pending_attachment
                .get()
                .map(|attachment| {
                    view! {
                        <span class="flex items-center gap-1 text-xs text-gray-600 dark:text-gray-300 bg-gray-100 dark:bg-gray-600 rounded px-2 py-1 max-w-40">
                            <span class="truncate">{attachment.filename}</span>
                            <button
                                type="button"
                                class="px-1 hover:text-gray-900 dark:hover:text-white"
                                on:click=clear
                            >
                                <svg viewBox="0 0 10 10" width="8">
                                    <path
                                        d="M1 1L9 9M1 9L9 1"
                                        stroke="currentColor"
                                        fill="currentColor"
                                        stroke-width="2"
                                        stroke-linecap="round"
                                    />
                                </svg>
                            </button>
                        </span>
                    }
                })
        }}
    }
}
