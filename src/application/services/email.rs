//! Transactional email templates

use std::sync::Arc;

use crate::infrastructure::email::{EmailMessage, EmailSender};
use crate::shared::errors::InfraResult;

/// Format minor units as `12.34 USD`.
pub fn format_money(cents: i64, currency: &str) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    format!("{}{}.{:02} {}", sign, abs / 100, abs % 100, currency)
}

pub fn enrollment_confirmation(to: &str, username: &str, course_title: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("You are enrolled in {}", course_title),
        text: format!(
            "Hi {},\n\nYour enrollment in \"{}\" is confirmed. You can start learning right away.\n",
            username, course_title
        ),
    }
}

pub fn payment_receipt(to: &str, username: &str, item: &str, final_cents: i64, currency: &str, payment_id: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("Receipt for {}", item),
        text: format!(
            "Hi {},\n\nWe received your payment of {} for \"{}\".\nPayment reference: {}\n",
            username,
            format_money(final_cents, currency),
            item,
            payment_id
        ),
    }
}

pub fn certificate_issued(to: &str, username: &str, course_title: &str, verification_code: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("Your certificate for {}", course_title),
        text: format!(
            "Congratulations {}!\n\nYou completed \"{}\". Your certificate can be verified with code {}.\n",
            username, course_title, verification_code
        ),
    }
}

pub fn waitlist_seat_available(to: &str, username: &str, course_title: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("A seat opened in {}", course_title),
        text: format!(
            "Hi {},\n\nA seat is now available in \"{}\". Enroll soon, seats are given first come first served.\n",
            username, course_title
        ),
    }
}

pub fn lesson_purchase_receipt(to: &str, username: &str, lesson_title: &str, final_cents: i64, currency: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("Lesson unlocked: {}", lesson_title),
        text: format!(
            "Hi {},\n\nYou purchased the lesson \"{}\" for {}. It is now available in your library.\n",
            username,
            lesson_title,
            format_money(final_cents, currency)
        ),
    }
}

pub struct EmailService {
    sender: Arc<dyn EmailSender>,
}

impl EmailService {
    pub fn new(sender: Arc<dyn EmailSender>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, message: EmailMessage) -> InfraResult<()> {
        self.sender.send(&message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Outbox(Mutex<Vec<EmailMessage>>);

    #[async_trait]
    impl EmailSender for Outbox {
        async fn send(&self, message: &EmailMessage) -> InfraResult<()> {
            self.0.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    #[test]
    fn money_formatting() {
        assert_eq!(format_money(1999, "USD"), "19.99 USD");
        assert_eq!(format_money(5, "EUR"), "0.05 EUR");
        assert_eq!(format_money(-250, "USD"), "-2.50 USD");
    }

    #[test]
    fn receipt_mentions_amount_and_reference() {
        let msg = payment_receipt("a@b.c", "ana", "Rust 101", 4900, "USD", "pay-1");
        assert_eq!(msg.subject, "Receipt for Rust 101");
        assert!(msg.text.contains("49.00 USD"));
        assert!(msg.text.contains("pay-1"));
    }

    #[tokio::test]
    async fn delivers_through_sender() {
        let outbox = Arc::new(Outbox::default());
        let service = EmailService::new(outbox.clone());
        service
            .send(certificate_issued("a@b.c", "ana", "Rust 101", "ABCDEF0123456789"))
            .await
            .unwrap();
        let sent = outbox.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("ABCDEF0123456789"));
    }
}
