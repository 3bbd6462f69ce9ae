mod api;
mod app;
mod chat;
mod composer;
mod config;
mod footer;
mod loading;
mod message;
mod session;
mod sidebar;
mod socket;
mod state;
mod upload;

use app::*;
use leptos::*;

fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(|| {
        view! { <App /> }
    })
}
