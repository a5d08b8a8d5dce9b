//! Text blocks posted back into the control group.

use {chrono::DateTime, sigrelay_common::types::Contact};

const NONE: &str = "None";

/// One entry of the `listcontacts` output.
pub fn contact_summary(index: usize, contact: &Contact) -> String {
    format!(
        "ContactId: {index}\nName: {}\nId: {}\n",
        contact.display_name(),
        contact.id()
    )
}

/// The `contactdetail` block.
pub fn contact_detail(contact: &Contact) -> String {
    let mut body = format!(
        "Name: {}\nNumber: {}\nUUID: {}\n",
        contact.display_name(),
        contact.number.as_deref().unwrap_or(NONE),
        contact.uuid.as_deref().unwrap_or(NONE),
    );

    let Some(profile) = &contact.profile else {
        body.push_str("Profile: None\n");
        return body;
    };

    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| NONE.to_string());
    body.push_str("Profile: \n");
    body.push_str(&format!("    Given Name: {}\n", field(&profile.given_name)));
    body.push_str(&format!("    Family Name: {}\n", field(&profile.family_name)));
    body.push_str(&format!("    Emoji: {}\n", field(&profile.emoji)));
    body.push_str(&format!("    About: {}\n", field(&profile.about)));
    body.push_str(&format!(
        "    Coin Address: {}\n",
        abbreviate_address(profile.coin_address.as_deref())
    ));
    match profile.last_update_ms.and_then(DateTime::from_timestamp_millis) {
        Some(updated) => body.push_str(&format!(
            "    Last Update: {}\n",
            updated.format("%Y-%m-%d %H:%M:%S UTC")
        )),
        None => body.push_str("    Last Update: UNKNOWN\n"),
    }
    body
}

/// First and last eight characters of a wallet address.
fn abbreviate_address(address: Option<&str>) -> String {
    let Some(address) = address.filter(|a| !a.is_empty()) else {
        return NONE.to_string();
    };
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 16 {
        return address.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 8..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use {super::*, sigrelay_common::types::Profile};

    fn alice() -> Contact {
        Contact {
            number: Some("+15550001".into()),
            uuid: None,
            name: "Alice".into(),
            profile: None,
        }
    }

    #[test]
    fn summary_has_index_name_and_id() {
        assert_eq!(
            contact_summary(3, &alice()),
            "ContactId: 3\nName: Alice\nId: +15550001\n"
        );
    }

    #[test]
    fn detail_without_profile() {
        assert_eq!(
            contact_detail(&alice()),
            "Name: Alice\nNumber: +15550001\nUUID: None\nProfile: None\n"
        );
    }

    #[test]
    fn detail_with_profile() {
        let mut contact = alice();
        contact.profile = Some(Profile {
            given_name: Some("Alice".into()),
            family_name: None,
            emoji: Some("🦊".into()),
            about: Some("hi".into()),
            coin_address: Some("ABCDEFGH0123456789IJKLMNOP".into()),
            last_update_ms: Some(0),
            has_avatar: false,
        });
        let detail = contact_detail(&contact);
        assert!(detail.contains("Profile: \n"));
        assert!(detail.contains("    Given Name: Alice\n"));
        assert!(detail.contains("    Family Name: None\n"));
        assert!(detail.contains("    Emoji: 🦊\n"));
        assert!(detail.contains("    Coin Address: ABCDEFGH...IJKLMNOP\n"));
        assert!(detail.ends_with("    Last Update: 1970-01-01 00:00:00 UTC\n"));
    }

    #[test]
    fn unknown_update_and_missing_address() {
        let mut contact = alice();
        contact.profile = Some(Profile::default());
        let detail = contact_detail(&contact);
        assert!(detail.contains("    Coin Address: None\n"));
        assert!(detail.ends_with("    Last Update: UNKNOWN\n"));
    }

    #[test]
    fn short_address_is_not_abbreviated() {
        assert_eq!(abbreviate_address(Some("short")), "short");
        assert_eq!(abbreviate_address(Some("")), "None");
    }
}
