use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// GREEN-API operations exposed through the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Method {
    GetSettings,
    GetStateInstance,
    SendMessage,
    SendFileByUrl,
}

impl Method {
    pub const ALL: [Method; 4] = [
        Method::GetSettings,
        Method::GetStateInstance,
        Method::SendMessage,
        Method::SendFileByUrl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::GetSettings => "getSettings",
            Method::GetStateInstance => "getStateInstance",
            Method::SendMessage => "sendMessage",
            Method::SendFileByUrl => "sendFileByUrl",
        }
    }

    /// Whether the upstream call carries a JSON body.
    pub fn has_body(self) -> bool {
        matches!(self, Method::SendMessage | Method::SendFileByUrl)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported method {0:?}")]
pub struct UnsupportedMethod(pub String);

impl FromStr for Method {
    type Err = UnsupportedMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|method| method.as_str() == value)
            .ok_or_else(|| UnsupportedMethod(value.to_string()))
    }
}

/// WhatsApp chat address in GREEN-API form (`<digits>@c.us`, `<id>@g.us`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    const PERSONAL_SUFFIX: &'static str = "@c.us";

    /// Accepts a fully qualified address verbatim, otherwise keeps the
    /// ASCII digits of a phone number and appends the personal suffix.
    pub fn normalize(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.contains('@') {
            return Some(Self(raw.to_string()));
        }

        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return None;
        }

        Some(Self(format!("{digits}{}", Self::PERSONAL_SUFFIX)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Form fields read by the client, in the order they are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    IdInstance,
    ApiTokenInstance,
    SendMessageChatId,
    SendMessageText,
    SendFileChatId,
    SendFileUrl,
}

impl FieldId {
    pub const ALL: [FieldId; 6] = [
        FieldId::IdInstance,
        FieldId::ApiTokenInstance,
        FieldId::SendMessageChatId,
        FieldId::SendMessageText,
        FieldId::SendFileChatId,
        FieldId::SendFileUrl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldId::IdInstance => "idInstance",
            FieldId::ApiTokenInstance => "apiTokenInstance",
            FieldId::SendMessageChatId => "sendMessageChatId",
            FieldId::SendMessageText => "sendMessageText",
            FieldId::SendFileChatId => "sendFileChatId",
            FieldId::SendFileUrl => "sendFileUrl",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_phone_numbers_to_personal_chat() {
        let chat = ChatId::normalize(" +7 (900) 123-45-67 ").expect("chat id");
        assert_eq!(chat.as_str(), "79001234567@c.us");
    }

    #[test]
    fn keeps_qualified_chat_ids() {
        let chat = ChatId::normalize("120363043968066561@g.us").expect("chat id");
        assert_eq!(chat.as_str(), "120363043968066561@g.us");
    }

    #[test]
    fn rejects_chat_ids_without_digits() {
        assert_eq!(ChatId::normalize("abc"), None);
        assert_eq!(ChatId::normalize("   "), None);
    }

    #[test]
    fn method_names_round_trip_through_from_str() {
        for method in Method::ALL {
            assert_eq!(method.as_str().parse::<Method>(), Ok(method));
        }
        let err = "deleteAccount".parse::<Method>().expect_err("unknown");
        assert_eq!(err.to_string(), "unsupported method \"deleteAccount\"");
    }
}
