//! Delegation to the request builder capability.

use serde_json::Value;
use shared::{domain::FieldId, error::error_field};

use crate::{error::CallError, types::FormValues};

/// Positional builder contract: instance id, API token, method, message
/// chat id, message text, file chat id, file URL. Returns the request to
/// send or an object with an `error` field.
pub trait RequestBuilder: Send + Sync {
    fn build_request(&self, args: &[&str]) -> Value;
}

impl<F> RequestBuilder for F
where
    F: Fn(&[&str]) -> Value + Send + Sync,
{
    fn build_request(&self, args: &[&str]) -> Value {
        self(args)
    }
}

pub fn builder_args<'a>(method: &'a str, form: &'a FormValues) -> [&'a str; 7] {
    [
        form.get(FieldId::IdInstance),
        form.get(FieldId::ApiTokenInstance),
        method,
        form.get(FieldId::SendMessageChatId),
        form.get(FieldId::SendMessageText),
        form.get(FieldId::SendFileChatId),
        form.get(FieldId::SendFileUrl),
    ]
}

/// Runs the builder and checks the shape of its answer. The returned
/// object is passed on untouched.
pub fn build_via(
    builder: Option<&dyn RequestBuilder>,
    method: &str,
    form: &FormValues,
) -> Result<Value, CallError> {
    let builder = builder.ok_or_else(CallError::builder_unavailable)?;

    let request = builder.build_request(&builder_args(method, form));
    if !request.is_object() {
        return Err(CallError::Format);
    }
    if let Some(message) = error_field(&request) {
        return Err(CallError::Builder(message));
    }

    Ok(request)
}
