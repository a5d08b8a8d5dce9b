/// Which help block to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpTopic {
    Overview,
    ListContacts,
    ContactDetail,
    Send,
    /// An unrecognised `param`, kept verbatim for the reply.
    Invalid(String),
}

impl HelpTopic {
    /// Case-insensitive; `none` and `help` both select the overview.
    pub fn parse(param: &str) -> Self {
        match param.trim().to_lowercase().as_str() {
            "none" | "help" => Self::Overview,
            "listcontacts" => Self::ListContacts,
            "contactdetail" => Self::ContactDetail,
            "send" => Self::Send,
            _ => Self::Invalid(param.to_string()),
        }
    }

    pub fn text(&self) -> String {
        match self {
            Self::Overview => "Help:\n\
                 Methods: listContacts, contactDetail, send, help\n\
                 Note: all method names are case insensitive.\n\
                 Enter key 'param':'methodName' for detailed help."
                .to_string(),
            Self::ListContacts => "Help listContacts:\n\
                 List all contacts.\n\
                 Params: None."
                .to_string(),
            Self::ContactDetail => "Help contactDetail:\n\
                 Display details of a contact.\n\
                 Params: contactid(int), required, contact id given by listContacts."
                .to_string(),
            Self::Send => "Help send:\n\
                 Send a message to a contact.\n\
                 Params: contactid(int), required, contact id given by listContacts.\n\
                 \x20       message(str), required, message body to send.\n\
                 \x20       attachment(str), optional, path to a file on the chatbot server."
                .to_string(),
            Self::Invalid(param) => format!("Help: Invalid parameter: {param}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("none", HelpTopic::Overview)]
    #[case("HELP", HelpTopic::Overview)]
    #[case("listContacts", HelpTopic::ListContacts)]
    #[case("contactdetail", HelpTopic::ContactDetail)]
    #[case(" Send ", HelpTopic::Send)]
    #[case("groups", HelpTopic::Invalid("groups".into()))]
    fn parse_param(#[case] param: &str, #[case] expected: HelpTopic) {
        assert_eq!(HelpTopic::parse(param), expected);
    }

    #[test]
    fn overview_lists_every_method() {
        let text = HelpTopic::Overview.text();
        for method in ["listContacts", "contactDetail", "send", "help"] {
            assert!(text.contains(method), "missing {method} in {text}");
        }
    }

    #[test]
    fn send_help_describes_params() {
        let text = HelpTopic::Send.text();
        assert!(text.starts_with("Help send:\n"));
        assert!(text.contains("\n        message(str), required"));
        assert!(text.contains("attachment(str), optional"));
    }

    #[test]
    fn invalid_param_is_echoed() {
        assert_eq!(
            HelpTopic::Invalid("Groups".into()).text(),
            "Help: Invalid parameter: Groups"
        );
    }
}
