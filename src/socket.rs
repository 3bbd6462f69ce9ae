use std::cell::Cell;
use std::rc::Rc;

use leptos::logging::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use crate::state::StreamEvent;

/// Sentinel frame the backend sends after the last fragment of a turn.
pub const TURN_END_MARKER: &str = "[END]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Opened,
    Stream(StreamEvent),
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Could not open a socket to {0}")]
    Open(String),
    #[error("Send failed: {0}")]
    Send(String),
}

pub fn decode_frame(text: &str) -> StreamEvent {
    if text == TURN_END_MARKER {
        StreamEvent::Terminal
    } else {
        StreamEvent::Fragment(text.to_string())
    }
}

/// The one streaming channel, bound to a single conversation. Dropping it
/// releases the socket on every exit path: handlers are detached, the
/// liveness flag flips, and callbacks still in flight become no-ops, so a
/// superseded channel can never write into the wrong conversation.
pub struct Channel {
    socket: WebSocket,
    live: Rc<Cell<bool>>,
    _on_open: Closure<dyn FnMut()>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(web_sys::Event)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

impl Channel {
    pub fn open(
        url: &str,
        notify: impl Fn(ChannelEvent) + 'static,
    ) -> Result<Channel, ChannelError> {
        let socket =
            WebSocket::new(url).map_err(|err| ChannelError::Open(format!("{url}: {err:?}")))?;
        let live = Rc::new(Cell::new(true));
        let notify = Rc::new(notify);

        let on_open = {
            let live = live.clone();
            let notify = notify.clone();
            Closure::wrap(Box::new(move || {
                if live.get() {
                    notify(ChannelEvent::Opened);
                }
            }) as Box<dyn FnMut()>)
        };
        let on_message = {
            let live = live.clone();
            let notify = notify.clone();
            Closure::wrap(Box::new(move |event: MessageEvent| {
                if !live.get() {
                    return;
                }
                if let Some(text) = event.data().as_string() {
                    notify(ChannelEvent::Stream(decode_frame(&text)));
                }
            }) as Box<dyn FnMut(MessageEvent)>)
        };
        let on_error = {
            let live = live.clone();
            Closure::wrap(Box::new(move |_event: web_sys::Event| {
                // The close event that follows carries the state change.
                if live.get() {
                    warn!("chat channel transport error");
                }
            }) as Box<dyn FnMut(web_sys::Event)>)
        };
        let on_close = {
            let live = live.clone();
            let notify = notify.clone();
            Closure::wrap(Box::new(move |_event: CloseEvent| {
                if live.get() {
                    notify(ChannelEvent::Closed);
                }
            }) as Box<dyn FnMut(CloseEvent)>)
        };

        socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        Ok(Channel {
            socket,
            live,
            _on_open: on_open,
            _on_message: on_message,
            _on_error: on_error,
            _on_close: on_close,
        })
    }

    pub fn send(&self, text: &str) -> Result<(), ChannelError> {
        self.socket
            .send_with_str(text)
            .map_err(|err| ChannelError::Send(format!("{err:?}")))
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.live.set(false);
        self.socket.set_onopen(None);
        self.socket.set_onmessage(None);
        self.socket.set_onerror(None);
        self.socket.set_onclose(None);
        let _ = self.socket.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_marker_decodes_to_terminal() {
        assert_eq!(decode_frame("[END]"), StreamEvent::Terminal);
    }

    #[test]
    fn anything_else_is_a_fragment() {
        assert_eq!(
            decode_frame("let x = 1;\n"),
            StreamEvent::Fragment("let x = 1;\n".to_string())
        );
        // Only the exact sentinel terminates the turn.
        assert_eq!(
            decode_frame("[END] "),
            StreamEvent::Fragment("[END] ".to_string())
        );
        assert_eq!(decode_frame(""), StreamEvent::Fragment(String::new()));
    }
}
