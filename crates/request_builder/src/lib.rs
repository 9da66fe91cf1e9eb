//! Turns raw form input into a [`CallRequest`] for the backend.
//!
//! The positional entry point [`build_request`] is the capability the
//! client loads at startup: seven strings in, either the request object or
//! `{ "error": "..." }` out.

use serde_json::{json, Map, Value};
use shared::{
    domain::{ChatId, Method},
    protocol::CallRequest,
};
use thiserror::Error;
use tracing::debug;

/// Number of positional arguments [`build_request`] expects.
pub const ARITY: usize = 7;

const FILE_NAME: &str = "file";
const FILE_CAPTION: &str = "File by URL";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("invalid arguments for request builder")]
    InvalidArguments,
    #[error("fill in idInstance and ApiTokenInstance")]
    MissingCredentials,
    #[error("fill in chatId and text for sendMessage")]
    MissingMessageFields,
    #[error("fill in chatId and file URL for sendFileByUrl")]
    MissingFileFields,
    #[error("invalid chatId for {0}")]
    InvalidChatId(Method),
    #[error("unknown method: {0}")]
    UnknownMethod(String),
}

/// Builder input in positional order: instance id, API token, method,
/// message chat id, message text, file chat id, file URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildArgs<'a> {
    pub id_instance: &'a str,
    pub api_token_instance: &'a str,
    pub method: &'a str,
    pub send_message_chat_id: &'a str,
    pub send_message_text: &'a str,
    pub send_file_chat_id: &'a str,
    pub send_file_url: &'a str,
}

impl<'a> BuildArgs<'a> {
    /// Extra trailing arguments are ignored.
    pub fn from_positional(args: &[&'a str]) -> Result<Self, BuildError> {
        let [id_instance, api_token_instance, method, send_message_chat_id, send_message_text, send_file_chat_id, send_file_url, ..] =
            *args
        else {
            return Err(BuildError::InvalidArguments);
        };

        Ok(Self {
            id_instance: id_instance.trim(),
            api_token_instance: api_token_instance.trim(),
            method: method.trim(),
            send_message_chat_id: send_message_chat_id.trim(),
            send_message_text: send_message_text.trim(),
            send_file_chat_id: send_file_chat_id.trim(),
            send_file_url: send_file_url.trim(),
        })
    }
}

pub fn build(args: &BuildArgs<'_>) -> Result<CallRequest, BuildError> {
    if args.id_instance.is_empty() || args.api_token_instance.is_empty() {
        return Err(BuildError::MissingCredentials);
    }

    let method: Method = args
        .method
        .parse()
        .map_err(|_| BuildError::UnknownMethod(args.method.to_string()))?;

    let payload = match method {
        Method::GetSettings | Method::GetStateInstance => Map::new(),
        Method::SendMessage => {
            if args.send_message_chat_id.is_empty() || args.send_message_text.is_empty() {
                return Err(BuildError::MissingMessageFields);
            }
            let chat_id = ChatId::normalize(args.send_message_chat_id)
                .ok_or(BuildError::InvalidChatId(method))?;

            let mut payload = Map::new();
            payload.insert("chatId".into(), json!(chat_id));
            payload.insert("message".into(), json!(args.send_message_text));
            payload
        }
        Method::SendFileByUrl => {
            if args.send_file_chat_id.is_empty() || args.send_file_url.is_empty() {
                return Err(BuildError::MissingFileFields);
            }
            let chat_id = ChatId::normalize(args.send_file_chat_id)
                .ok_or(BuildError::InvalidChatId(method))?;

            let mut payload = Map::new();
            payload.insert("chatId".into(), json!(chat_id));
            payload.insert("urlFile".into(), json!(args.send_file_url));
            payload.insert("fileName".into(), json!(FILE_NAME));
            payload.insert("caption".into(), json!(FILE_CAPTION));
            payload
        }
    };

    Ok(CallRequest {
        id_instance: args.id_instance.to_string(),
        api_token_instance: args.api_token_instance.to_string(),
        method,
        payload,
    })
}

/// Positional builder capability. Never fails: errors are reported in the
/// returned object's `error` field.
pub fn build_request(args: &[&str]) -> Value {
    let built = BuildArgs::from_positional(args).and_then(|args| build(&args));
    match built {
        Ok(request) => match serde_json::to_value(&request) {
            Ok(value) => value,
            Err(err) => json!({ "error": err.to_string() }),
        },
        Err(err) => {
            debug!(error = %err, "request builder rejected input");
            json!({ "error": err.to_string() })
        }
    }
}
