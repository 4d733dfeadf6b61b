use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::DigestItem;

pub const ENV_SMTP_HOST: &str = "SMTP_HOST";
pub const ENV_SMTP_USER: &str = "SMTP_USER";
pub const ENV_SMTP_PASS: &str = "SMTP_PASS";
pub const ENV_EMAIL_FROM: &str = "DIGEST_EMAIL_FROM";

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailSender {
    /// Build from SMTP env vars (STARTTLS relay). Fails when any of
    /// SMTP_HOST / SMTP_USER / SMTP_PASS / DIGEST_EMAIL_FROM is missing or
    /// malformed.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var(ENV_SMTP_HOST).context("SMTP_HOST missing")?;
        let user = std::env::var(ENV_SMTP_USER).context("SMTP_USER missing")?;
        let pass = std::env::var(ENV_SMTP_PASS).context("SMTP_PASS missing")?;
        let from_addr = std::env::var(ENV_EMAIL_FROM).context("DIGEST_EMAIL_FROM missing")?;

        let creds = Credentials::new(user, pass);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
            .context("invalid SMTP_HOST")?
            .credentials(creds)
            .build();
        let from: Mailbox = from_addr.parse().context("invalid DIGEST_EMAIL_FROM")?;

        Ok(Self { mailer, from })
    }

    /// Send one digest message to all recipients. Invalid recipient
    /// addresses are skipped with a warning; no valid recipient means no
    /// send, not an error.
    pub async fn send_digest(
        &self,
        items: &[DigestItem],
        topic: &str,
        recipients: &[String],
    ) -> Result<()> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(format!("Top {} {} articles", items.len(), topic));

        let mut valid = 0usize;
        for addr in recipients {
            match addr.parse::<Mailbox>() {
                Ok(mb) => {
                    builder = builder.to(mb);
                    valid += 1;
                }
                Err(e) => {
                    tracing::warn!(target: "notify", error = ?e, addr = %addr, "skipping bad recipient")
                }
            }
        }
        if valid == 0 {
            tracing::warn!(target: "notify", "no valid recipients, skipping email");
            return Ok(());
        }

        let msg = builder
            .header(header::ContentType::TEXT_HTML)
            .body(render_html(items, topic))
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        tracing::info!(target: "notify", recipients = valid, items = items.len(), "digest sent");
        Ok(())
    }
}

/// Minimal self-contained HTML digest: header, one card per article, footer
/// timestamp. All article fields are escaped.
pub fn render_html(items: &[DigestItem], topic: &str) -> String {
    use std::fmt::Write as _;

    let mut body = String::new();
    let _ = write!(
        body,
        "<!DOCTYPE html>\n<html>\n<body style=\"font-family:sans-serif;max-width:680px;margin:0 auto\">\n\
         <h1>Top {} {} articles</h1>\n",
        items.len(),
        html_escape::encode_text(topic)
    );

    for item in items {
        let _ = write!(
            body,
            "<div style=\"border:1px solid #ddd;border-radius:8px;padding:16px;margin-bottom:16px\">\n"
        );
        if let Some(img) = &item.image_url {
            let _ = write!(
                body,
                "<img src=\"{}\" alt=\"\" style=\"max-width:100%\">\n",
                html_escape::encode_double_quoted_attribute(img)
            );
        }
        let _ = write!(
            body,
            "<h2><a href=\"{}\">{}</a></h2>\n<p>{}</p>\n<p><small>{} &middot; {}</small></p>\n</div>\n",
            html_escape::encode_double_quoted_attribute(&item.link),
            html_escape::encode_text(&item.title),
            html_escape::encode_text(&item.summary),
            html_escape::encode_text(&item.source),
            html_escape::encode_text(&item.score_info),
        );
    }

    let _ = write!(
        body,
        "<p><small>Sent on {}</small></p>\n</body>\n</html>\n",
        chrono::Utc::now().format("%B %d, %Y at %H:%M UTC")
    );
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> DigestItem {
        DigestItem {
            title: "[80/100] Results & rankings out".to_string(),
            link: "https://example.com/a?x=1&y=2".to_string(),
            summary: "Short <summary>".to_string(),
            source: "RSS Feed - example.com".to_string(),
            image_url: Some("https://cdn.example.com/a.jpg".to_string()),
            score_info: "Relevance Score: 80/100".to_string(),
        }
    }

    #[test]
    fn html_escapes_fields_and_links_articles() {
        let html = render_html(&[item()], "education");
        assert!(html.contains("Top 1 education articles"));
        assert!(html.contains("[80/100] Results &amp; rankings out"));
        assert!(html.contains("href=\"https://example.com/a?x=1&amp;y=2\""));
        assert!(html.contains("Short &lt;summary&gt;"));
        assert!(html.contains("<img src=\"https://cdn.example.com/a.jpg\""));
        assert!(html.contains("Sent on "));
    }
}
