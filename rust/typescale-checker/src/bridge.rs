//! Messaging between the extension panel and the content script.
//!
//! The panel calls [`send_to_active_tab`]; the content script registers a
//! handler with [`on_message`]. Messages travel inside the envelope
//! described in [`crate::message`], and the content script replies
//! synchronously.

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use wasm_bindgen_futures::JsFuture;

use crate::{
    TypeScaleError,
    message::{ENVELOPE_MARKER, ENVELOPE_PAYLOAD, Message},
};

fn messaging_error(error: JsValue) -> TypeScaleError {
    TypeScaleError::Messaging(format!("{error:?}"))
}

fn get(target: &JsValue, key: &str) -> Result<JsValue, TypeScaleError> {
    let value = Reflect::get(target, &key.into()).map_err(messaging_error)?;
    if value.is_undefined() || value.is_null() {
        return Err(TypeScaleError::Messaging(format!("'{key}' is not available")));
    }
    Ok(value)
}

fn chrome(namespace: &str) -> Result<JsValue, TypeScaleError> {
    let chrome = get(&js_sys::global(), "chrome")?;
    get(&chrome, namespace)
}

/// Wrap `message` as `{ __typeChecker: true, payload }`.
pub fn envelope(message: &Message) -> Result<JsValue, TypeScaleError> {
    let wrapped = reply(message)?;
    Reflect::set(&wrapped, &ENVELOPE_MARKER.into(), &JsValue::TRUE).map_err(messaging_error)?;
    Ok(wrapped)
}

/// Wrap `message` as `{ payload }`.
pub fn reply(message: &Message) -> Result<JsValue, TypeScaleError> {
    let wrapped = Object::new();
    Reflect::set(
        &wrapped,
        &ENVELOPE_PAYLOAD.into(),
        &JsValue::from_str(&message.to_json()?),
    )
    .map_err(messaging_error)?;
    Ok(wrapped.into())
}

/// Unwrap an incoming envelope. Returns `None` for messages that are not
/// ours.
pub fn open_envelope(value: &JsValue) -> Result<Option<Message>, TypeScaleError> {
    let ours = Reflect::get(value, &ENVELOPE_MARKER.into())
        .ok()
        .and_then(|marker| marker.as_bool())
        .unwrap_or(false);
    if !ours {
        return Ok(None);
    }
    open_reply(value)
}

/// Unwrap a `{ payload }` reply. Returns `None` when there was no reply.
pub fn open_reply(value: &JsValue) -> Result<Option<Message>, TypeScaleError> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    let payload = get(value, ENVELOPE_PAYLOAD)?
        .as_string()
        .ok_or_else(|| TypeScaleError::MalformedMessage("Payload is not a string".into()))?;
    Message::from_json(&payload).map(Some)
}

/// Send `message` to the content script of the active tab and wait for its
/// reply. A failed send is reported, not retried.
pub async fn send_to_active_tab(message: &Message) -> Result<Option<Message>, TypeScaleError> {
    let tabs = chrome("tabs")?;

    let query = Object::new();
    Reflect::set(&query, &"active".into(), &JsValue::TRUE).map_err(messaging_error)?;
    Reflect::set(&query, &"currentWindow".into(), &JsValue::TRUE).map_err(messaging_error)?;
    let query_fn: Function = get(&tabs, "query")?.unchecked_into();
    let queried: js_sys::Promise = query_fn
        .call1(&tabs, &query)
        .map_err(messaging_error)?
        .unchecked_into();
    let found = JsFuture::from(queried).await.map_err(messaging_error)?;

    let tab = js_sys::Array::from(&found).get(0);
    let tab_id = get(&tab, "id")?;

    let send_fn: Function = get(&tabs, "sendMessage")?.unchecked_into();
    let sent: js_sys::Promise = send_fn
        .call2(&tabs, &tab_id, &envelope(message)?)
        .map_err(messaging_error)?
        .unchecked_into();
    let response = JsFuture::from(sent).await.map_err(messaging_error)?;

    open_reply(&response)
}

/// Answer envelopes arriving through `chrome.runtime.onMessage` with
/// `handler`. The listener stays registered for the life of the page.
pub fn on_message<F>(mut handler: F) -> Result<(), TypeScaleError>
where
    F: FnMut(Message) -> Result<Option<Message>, TypeScaleError> + 'static,
{
    let on_message = get(&chrome("runtime")?, "onMessage")?;
    let add_listener: Function = get(&on_message, "addListener")?.unchecked_into();

    let callback = Closure::wrap(Box::new(
        move |incoming: JsValue, _sender: JsValue, send_response: Function| -> JsValue {
            let message = match open_envelope(&incoming) {
                Ok(Some(message)) => message,
                Ok(None) => return JsValue::FALSE,
                Err(error) => {
                    tracing::warn!(%error, "Dropping malformed message");
                    return JsValue::FALSE;
                }
            };

            let answer = handler(message).and_then(|answer| answer.map(|m| reply(&m)).transpose());
            match answer {
                Ok(Some(answer)) => {
                    if let Err(error) = send_response.call1(&JsValue::UNDEFINED, &answer) {
                        tracing::warn!(?error, "Could not send reply");
                    }
                }
                Ok(None) => {}
                Err(error) => tracing::warn!(%error, "Failed to handle message"),
            }

            // Replies are sent before returning, so the channel can close.
            JsValue::FALSE
        },
    )
        as Box<dyn FnMut(JsValue, JsValue, Function) -> JsValue>);

    add_listener
        .call1(&on_message, callback.as_ref())
        .map_err(messaging_error)?;
    callback.forget();
    Ok(())
}

#[cfg(test)]
mod tests {
    use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

    use super::*;
    use crate::message::NodeRef;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn it_opens_its_own_envelopes_only() {
        let message = Message::HighlightNode(NodeRef::new("intro"));
        let wrapped = envelope(&message).expect("envelope");
        let replied = reply(&message).expect("reply");

        assert_eq!(open_envelope(&wrapped), Ok(Some(message)));
        assert_eq!(open_envelope(&replied), Ok(None));
        assert_eq!(open_reply(&JsValue::UNDEFINED), Ok(None));
    }
}
