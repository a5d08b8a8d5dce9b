//! Validating parser for control-group commands.
//!
//! Parsing happens in two steps. [`parse_request`] turns the text into a JSON
//! object and resolves its method. [`Request::into_command`] then checks the
//! method's fields against the current contact count and yields a [`Command`].
//! Failures come back in the order the fields are checked.

use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::{error::CommandError, help::HelpTopic};

/// A recognised command method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    ListContacts,
    ContactDetail,
    Send,
    Help,
}

impl Method {
    fn from_normalized(method: &str) -> Option<Self> {
        match method {
            "listcontacts" => Some(Self::ListContacts),
            "contactdetail" => Some(Self::ContactDetail),
            "send" => Some(Self::Send),
            "help" => Some(Self::Help),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListContacts => "listcontacts",
            Self::ContactDetail => "contactdetail",
            Self::Send => "send",
            Self::Help => "help",
        }
    }
}

/// Lower-case `raw` and drop every whitespace character.
pub fn normalize_method(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// A command object whose method is known but whose fields are unchecked.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Method,
    fields: Map<String, Value>,
}

/// Parse command text into a [`Request`].
///
/// A `help` key selects [`Method::Help`] when `method` is absent or names
/// nothing else.
pub fn parse_request(text: &str) -> Result<Request, CommandError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| CommandError::NotJson(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(CommandError::NotObject);
    };
    let help_key = fields.contains_key("help");

    let method = match fields.get("method") {
        None if help_key => Method::Help,
        None => return Err(CommandError::MissingMethod),
        Some(Value::String(raw)) => {
            let normalized = normalize_method(raw);
            match Method::from_normalized(&normalized) {
                Some(method) => method,
                None if help_key => Method::Help,
                None => return Err(CommandError::InvalidMethod(normalized)),
            }
        },
        Some(_) if help_key => Method::Help,
        Some(_) => return Err(CommandError::MethodType),
    };

    Ok(Request { method, fields })
}

impl Request {
    pub fn method(&self) -> Method {
        self.method
    }

    /// Whether executing this request reads the contact list.
    pub fn needs_contacts(&self) -> bool {
        !matches!(self.method, Method::Help)
    }

    /// Check the method's fields and build the command.
    ///
    /// `contact_count` is the length of the account's contact list; a
    /// `contactid` must be below it.
    pub fn into_command(self, contact_count: usize) -> Result<Command, CommandError> {
        let fields = &self.fields;
        match self.method {
            Method::ListContacts => Ok(Command::ListContacts),
            Method::ContactDetail => Ok(Command::ContactDetail {
                contact_id: contact_id(fields, contact_count)?,
            }),
            Method::Send => {
                let contact_id = contact_id(fields, contact_count)?;
                let message = match fields.get("message") {
                    None => return Err(CommandError::MissingMessage),
                    Some(Value::String(message)) => message.clone(),
                    Some(_) => return Err(CommandError::MessageType),
                };
                let attachment = match fields.get("attachment") {
                    None => None,
                    Some(Value::String(path)) => Some(PathBuf::from(path)),
                    Some(_) => return Err(CommandError::AttachmentType),
                };
                Ok(Command::Send {
                    contact_id,
                    message,
                    attachment,
                })
            },
            Method::Help => {
                let topic = match fields.get("param") {
                    None => HelpTopic::Overview,
                    Some(Value::String(param)) => HelpTopic::parse(param),
                    Some(_) => return Err(CommandError::ParamType),
                };
                Ok(Command::Help(topic))
            },
        }
    }
}

fn contact_id(fields: &Map<String, Value>, contact_count: usize) -> Result<usize, CommandError> {
    let Some(value) = fields.get("contactid") else {
        return Err(CommandError::MissingContactId);
    };
    let Value::Number(number) = value else {
        return Err(CommandError::ContactIdType);
    };
    if let Some(index) = number.as_u64() {
        return usize::try_from(index)
            .ok()
            .filter(|index| *index < contact_count)
            .ok_or(CommandError::ContactIdRange);
    }
    if number.is_i64() {
        // Negative integers are integers, just never valid indices.
        return Err(CommandError::ContactIdRange);
    }
    Err(CommandError::ContactIdType)
}

/// A fully validated command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ListContacts,
    ContactDetail {
        contact_id: usize,
    },
    Send {
        contact_id: usize,
        message: String,
        attachment: Option<PathBuf>,
    },
    Help(HelpTopic),
}

impl Command {
    pub fn method(&self) -> Method {
        match self {
            Self::ListContacts => Method::ListContacts,
            Self::ContactDetail { .. } => Method::ContactDetail,
            Self::Send { .. } => Method::Send,
            Self::Help(_) => Method::Help,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn command(text: &str, contacts: usize) -> Result<Command, CommandError> {
        parse_request(text)?.into_command(contacts)
    }

    #[rstest]
    #[case("listcontacts", "listcontacts")]
    #[case(" List Contacts ", "listcontacts")]
    #[case("LIST\tCONTACTS\r\n", "listcontacts")]
    #[case("contact\u{00a0}Detail", "contactdetail")]
    fn method_normalization(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_method(raw), expected);
    }

    #[test]
    fn invalid_json_reports_parser_error() {
        let err = parse_request("{method: send").unwrap_err();
        match err {
            CommandError::NotJson(reason) => assert!(reason.contains("line 1")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    #[case("[1, 2]")]
    #[case("\"listcontacts\"")]
    #[case("7")]
    fn non_object_is_rejected(#[case] text: &str) {
        assert_eq!(parse_request(text).unwrap_err(), CommandError::NotObject);
    }

    #[test]
    fn missing_method_is_unquoted() {
        let err = parse_request(r#"{"contactid": 1}"#).unwrap_err();
        assert_eq!(err, CommandError::MissingMethod);
        assert!(!err.quoted());
        assert_eq!(err.to_string(), "Invalid command, method not defined.");
    }

    #[test]
    fn non_string_method_is_a_type_error() {
        assert_eq!(
            parse_request(r#"{"method": 3}"#).unwrap_err(),
            CommandError::MethodType
        );
    }

    #[test]
    fn unknown_method_reports_normalized_name() {
        let err = parse_request(r#"{"method": "Do It"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid method: doit");
        assert!(err.quoted());
    }

    #[test]
    fn uppercase_list_contacts() {
        assert_eq!(
            command(r#"{"method": "LISTCONTACTS"}"#, 0).unwrap(),
            Command::ListContacts
        );
    }

    #[rstest]
    #[case(r#"{"method": "contactdetail"}"#, CommandError::MissingContactId)]
    #[case(r#"{"method": "contactdetail", "contactid": "0"}"#, CommandError::ContactIdType)]
    #[case(r#"{"method": "contactdetail", "contactid": 0.0}"#, CommandError::ContactIdType)]
    #[case(r#"{"method": "contactdetail", "contactid": true}"#, CommandError::ContactIdType)]
    #[case(r#"{"method": "contactdetail", "contactid": -1}"#, CommandError::ContactIdRange)]
    #[case(r#"{"method": "contactdetail", "contactid": 1}"#, CommandError::ContactIdRange)]
    fn contact_detail_failures(#[case] text: &str, #[case] expected: CommandError) {
        assert_eq!(command(text, 1).unwrap_err(), expected);
    }

    #[test]
    fn contact_detail_last_valid_index() {
        assert_eq!(
            command(r#"{"method": "contactdetail", "contactid": 0}"#, 1).unwrap(),
            Command::ContactDetail { contact_id: 0 }
        );
    }

    #[test]
    fn index_equal_to_length_is_out_of_range() {
        // The contact list has 3 entries, so 3 is one past the end.
        assert_eq!(
            command(r#"{"method": "contactdetail", "contactid": 3}"#, 3).unwrap_err(),
            CommandError::ContactIdRange
        );
    }

    #[test]
    fn send_checks_contact_before_message() {
        assert_eq!(
            command(r#"{"method": "send", "contactid": 5}"#, 1).unwrap_err(),
            CommandError::ContactIdRange
        );
        assert_eq!(
            command(r#"{"method": "send", "contactid": 0}"#, 1).unwrap_err(),
            CommandError::MissingMessage
        );
        assert_eq!(
            command(r#"{"method": "send", "contactid": 0, "message": 1}"#, 1).unwrap_err(),
            CommandError::MessageType
        );
        assert_eq!(
            command(
                r#"{"method": "send", "contactid": 0, "message": "hi", "attachment": 1}"#,
                1
            )
            .unwrap_err(),
            CommandError::AttachmentType
        );
    }

    #[test]
    fn send_with_attachment() {
        let cmd = command(
            r#"{"method": " Send ", "contactid": 0, "message": "hi", "attachment": "/tmp/a.png"}"#,
            2,
        )
        .unwrap();
        assert_eq!(cmd, Command::Send {
            contact_id: 0,
            message: "hi".into(),
            attachment: Some(PathBuf::from("/tmp/a.png")),
        });
        assert_eq!(cmd.method(), Method::Send);
    }

    #[rstest]
    #[case(r#"{"help": true, "param": "send"}"#, HelpTopic::Send)]
    #[case(r#"{"help": true}"#, HelpTopic::Overview)]
    #[case(r#"{"method": "help"}"#, HelpTopic::Overview)]
    #[case(r#"{"method": "HELP", "param": "ContactDetail"}"#, HelpTopic::ContactDetail)]
    #[case(r#"{"method": "nope", "help": 1, "param": "listcontacts"}"#, HelpTopic::ListContacts)]
    #[case(r#"{"method": 4, "help": 1}"#, HelpTopic::Overview)]
    #[case(r#"{"help": true, "param": "bogus"}"#, HelpTopic::Invalid("bogus".into()))]
    fn help_selection(#[case] text: &str, #[case] topic: HelpTopic) {
        let request = parse_request(text).unwrap();
        assert_eq!(request.method(), Method::Help);
        assert!(!request.needs_contacts());
        assert_eq!(request.into_command(0).unwrap(), Command::Help(topic));
    }

    #[test]
    fn recognised_method_wins_over_help_key() {
        let request = parse_request(r#"{"method": "listcontacts", "help": true}"#).unwrap();
        assert_eq!(request.method(), Method::ListContacts);
    }

    #[test]
    fn help_param_must_be_a_string() {
        assert_eq!(
            command(r#"{"help": true, "param": null}"#, 0).unwrap_err(),
            CommandError::ParamType
        );
    }
}
