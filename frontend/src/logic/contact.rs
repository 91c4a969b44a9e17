//! 联系客户的外部链接（拨号、WhatsApp、邮件）

use crmdesk_shared::Client;

const EMAIL_SUBJECT: &str = "Follow-up";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContactError {
    #[error("Client phone number not found")]
    MissingPhone,
    #[error("Client email not found")]
    MissingEmail,
}

/// 按邮箱域名选择网页邮箱
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailProvider {
    Gmail,
    Outlook,
    Yahoo,
    /// 系统默认邮件客户端
    Mailto,
}

impl EmailProvider {
    pub fn detect(email: &str) -> Self {
        let email = email.to_lowercase();
        if email.contains("@gmail.com") {
            EmailProvider::Gmail
        } else if ["@outlook.com", "@hotmail.com", "@live.com"]
            .iter()
            .any(|domain| email.contains(domain))
        {
            EmailProvider::Outlook
        } else if email.contains("@yahoo.com") {
            EmailProvider::Yahoo
        } else {
            EmailProvider::Mailto
        }
    }

    /// 网页邮箱在新标签页打开，`mailto:` 在当前页触发
    pub fn opens_new_tab(&self) -> bool {
        !matches!(self, EmailProvider::Mailto)
    }
}

fn digits(phone: &str) -> Result<String, ContactError> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        Err(ContactError::MissingPhone)
    } else {
        Ok(digits)
    }
}

/// 按 `encodeURIComponent` 的方式编码查询串（空格为 `%20`）
fn encode_query(pairs: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(pairs)
        .unwrap_or_default()
        .replace('+', "%20")
}

fn follow_up_message(first_name: &str) -> String {
    format!(
        "Hi {first_name}, I hope you're doing well. I wanted to follow up on our previous conversation."
    )
}

fn email_body(first_name: &str) -> String {
    format!(
        "Hi {first_name},\n\nI hope you're doing well. I wanted to follow up on our previous conversation.\n\nBest regards,\nYour Team"
    )
}

pub fn dial_link(client: &Client) -> Result<String, ContactError> {
    Ok(format!("tel:{}", digits(&client.phone)?))
}

pub fn whatsapp_link(client: &Client) -> Result<String, ContactError> {
    let number = digits(&client.phone)?;
    let message = follow_up_message(&client.first_name);
    Ok(format!(
        "https://wa.me/{number}?{}",
        encode_query(&[("text", &message)])
    ))
}

pub fn email_compose_link(client: &Client) -> Result<(EmailProvider, String), ContactError> {
    let email = client.email.trim();
    if email.is_empty() {
        return Err(ContactError::MissingEmail);
    }

    let body = email_body(&client.first_name);
    let provider = EmailProvider::detect(email);
    let url = match provider {
        EmailProvider::Gmail => format!(
            "https://mail.google.com/mail/?view=cm&fs=1&{}",
            encode_query(&[("to", email), ("su", EMAIL_SUBJECT), ("body", &body)])
        ),
        EmailProvider::Outlook => format!(
            "https://outlook.live.com/mail/0/deeplink/compose?{}",
            encode_query(&[("to", email), ("subject", EMAIL_SUBJECT), ("body", &body)])
        ),
        EmailProvider::Yahoo => format!(
            "https://compose.mail.yahoo.com/?{}",
            encode_query(&[("to", email), ("subject", EMAIL_SUBJECT), ("body", &body)])
        ),
        EmailProvider::Mailto => format!(
            "mailto:{email}?{}",
            encode_query(&[("subject", EMAIL_SUBJECT), ("body", &body)])
        ),
    };
    Ok((provider, url))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(phone: &str, email: &str) -> Client {
        Client {
            id: "c1".into(),
            first_name: "Maria".into(),
            last_name: "Lopez".into(),
            phone: phone.into(),
            email: email.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_dial_link_keeps_digits_only() {
        let link = dial_link(&client("+1 (555) 123-4567", "")).unwrap();
        assert_eq!(link, "tel:15551234567");
        assert_eq!(dial_link(&client("", "")), Err(ContactError::MissingPhone));
        assert_eq!(
            dial_link(&client("n/a", "")).unwrap_err().to_string(),
            "Client phone number not found"
        );
    }

    #[test]
    fn test_whatsapp_link_carries_message() {
        let link = whatsapp_link(&client("+44 20 7123 4567", "")).unwrap();
        assert!(link.starts_with("https://wa.me/442071234567?text=Hi%20Maria%2C%20I%20hope"));
        assert!(!link.contains('+'));
    }

    #[test]
    fn test_email_provider_detection() {
        assert_eq!(EmailProvider::detect("a@gmail.com"), EmailProvider::Gmail);
        assert_eq!(EmailProvider::detect("a@Hotmail.com"), EmailProvider::Outlook);
        assert_eq!(EmailProvider::detect("a@live.com"), EmailProvider::Outlook);
        assert_eq!(EmailProvider::detect("a@yahoo.com"), EmailProvider::Yahoo);
        assert_eq!(EmailProvider::detect("a@corp.io"), EmailProvider::Mailto);
    }

    #[test]
    fn test_compose_links() {
        let (provider, url) = email_compose_link(&client("", "maria@gmail.com")).unwrap();
        assert_eq!(provider, EmailProvider::Gmail);
        assert!(url.starts_with("https://mail.google.com/mail/?view=cm&fs=1&to=maria%40gmail.com&su=Follow-up&body=Hi%20Maria%2C%0A%0A"));

        let (provider, url) = email_compose_link(&client("", "maria@corp.io")).unwrap();
        assert!(!provider.opens_new_tab());
        assert!(url.starts_with("mailto:maria@corp.io?subject=Follow-up&body="));

        assert_eq!(
            email_compose_link(&client("", "  ")).unwrap_err().to_string(),
            "Client email not found"
        );
    }
}
