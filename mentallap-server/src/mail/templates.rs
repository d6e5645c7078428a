//! Email bodies for the contact form and the admin test message

use crate::db::NewContactMessage;
use crate::models::ContactKind;
use crate::views::escape;

use super::EmailMessage;

pub const CONTACT_FORM_SENDER: &str = "The Mental Lap Contact Form";
pub const SITE_SENDER: &str = "The Mental Lap";

/// Where contact notifications go
#[derive(Debug, Clone, PartialEq)]
pub struct ContactRouting {
    pub support: String,
    pub partnerships: String,
    pub site_url: String,
}

impl Default for ContactRouting {
    fn default() -> Self {
        Self {
            support: "support@thementallap.com".into(),
            partnerships: "partners@thementallap.com".into(),
            site_url: "https://thementallap.com".into(),
        }
    }
}

impl ContactRouting {
    pub fn recipient(&self, kind: ContactKind) -> &str {
        match kind {
            ContactKind::Partnership => &self.partnerships,
            ContactKind::General => &self.support,
        }
    }
}

fn kind_heading(kind: ContactKind) -> &'static str {
    match kind {
        ContactKind::Partnership => "Partnership Opportunity",
        ContactKind::General => "General Inquiry",
    }
}

/// Notification for the team; replies go straight to the submitter.
pub fn contact_notification(msg: &NewContactMessage<'_>, routing: &ContactRouting) -> EmailMessage {
    let subject = match msg.subject {
        Some(s) => s.to_owned(),
        None => format!("Contact Form: {} from {}", msg.kind.label(), msg.name),
    };
    let subject_line = msg
        .subject
        .map(|s| format!("Subject: {s}\n"))
        .unwrap_or_default();
    let subject_html = msg
        .subject
        .map(|s| format!("<p><strong>Subject:</strong> {}</p>", escape(s)))
        .unwrap_or_default();

    let text = format!(
        "New Contact Form Submission\n\n\
         Type: {kind}\nName: {name}\nEmail: {email}\n{subject_line}\n\
         Message:\n{message}\n\n---\n\
         You can reply directly to this email to respond to {name} at {email}\n",
        kind = kind_heading(msg.kind),
        name = msg.name,
        email = msg.email,
        message = msg.message,
    );
    let html = format!(
        "<h2>New Contact Form Submission</h2>\
         <p><strong>Type:</strong> {kind}</p>\
         <p><strong>Name:</strong> {name}</p>\
         <p><strong>Email:</strong> {email}</p>\
         {subject_html}\
         <h3>Message:</h3><p style=\"white-space: pre-wrap;\">{message}</p>\
         <p><small>You can reply directly to this email to respond to {name} at {email}</small></p>",
        kind = kind_heading(msg.kind),
        name = escape(msg.name),
        email = escape(msg.email),
        message = escape(msg.message),
    );

    EmailMessage {
        from_name: CONTACT_FORM_SENDER.into(),
        to: routing.recipient(msg.kind).to_owned(),
        reply_to: Some(msg.email.to_owned()),
        subject,
        text,
        html,
    }
}

/// Acknowledgement sent back to the person who wrote in.
pub fn contact_confirmation(msg: &NewContactMessage<'_>, routing: &ContactRouting) -> EmailMessage {
    let site = routing.site_url.trim_end_matches('/');
    let text = format!(
        "Thank you for reaching out!\n\nHi {name},\n\n\
         We've received your message and will get back to you within 24 hours.\n\n\
         Your Message:\n{message}\n\n\
         In the meantime, feel free to explore our resources at {site}\n\n\
         Best regards,\nThe Mental Lap Team\n",
        name = msg.name,
        message = msg.message,
    );
    let html = format!(
        "<h2>Thank you for reaching out!</h2>\
         <p>Hi {name},</p>\
         <p>We've received your message and will get back to you within 24 hours.</p>\
         <h3>Your Message:</h3><p style=\"white-space: pre-wrap;\">{message}</p>\
         <p>In the meantime, feel free to explore our resources:</p>\
         <ul><li><a href=\"{site}/workshops\">Upcoming Workshops</a></li>\
         <li><a href=\"{site}/library\">Mental Skills Library</a></li>\
         <li><a href=\"{site}/recruiting-tips\">Recruiting Tips</a></li></ul>\
         <p>Best regards,<br>The Mental Lap Team</p>",
        name = escape(msg.name),
        message = escape(msg.message),
        site = escape(site),
    );

    EmailMessage {
        from_name: SITE_SENDER.into(),
        to: msg.email.to_owned(),
        reply_to: None,
        subject: "Thank you for contacting The Mental Lap".into(),
        text,
        html,
    }
}

/// Admin-triggered delivery check.
pub fn test_email(to: &str, transport: &str) -> EmailMessage {
    EmailMessage {
        from_name: SITE_SENDER.into(),
        to: to.to_owned(),
        reply_to: None,
        subject: "Test Email from The Mental Lap".into(),
        text: format!(
            "This is a test email from The Mental Lap.\n\nTransport: {transport}\n\
             If you received this, email delivery is working.\n"
        ),
        html: format!(
            "<h2>Test Email</h2><p>This is a test email from The Mental Lap.</p>\
             <p>Transport: {}</p><p>If you received this, email delivery is working.</p>",
            escape(transport)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(kind: ContactKind, subject: Option<&'static str>) -> NewContactMessage<'static> {
        NewContactMessage {
            name: "Jordan <Lee>",
            email: "jordan@example.com",
            subject,
            message: "Interested in a team workshop.",
            kind,
        }
    }

    #[test]
    fn notification_routes_by_kind() {
        let routing = ContactRouting::default();

        let general = contact_notification(&submission(ContactKind::General, None), &routing);
        assert_eq!(general.to, "support@thementallap.com");
        assert_eq!(general.reply_to.as_deref(), Some("jordan@example.com"));
        assert_eq!(general.subject, "Contact Form: General Inquiry from Jordan <Lee>");

        let partner = contact_notification(&submission(ContactKind::Partnership, None), &routing);
        assert_eq!(partner.to, "partners@thementallap.com");
        assert!(partner.text.contains("Type: Partnership Opportunity"));
    }

    #[test]
    fn notification_keeps_explicit_subject_and_escapes_html() {
        let routing = ContactRouting::default();
        let msg = contact_notification(
            &submission(ContactKind::General, Some("Team pricing")),
            &routing,
        );
        assert_eq!(msg.subject, "Team pricing");
        assert!(msg.html.contains("Jordan &lt;Lee&gt;"));
        assert!(!msg.html.contains("<Lee>"));
    }

    #[test]
    fn confirmation_goes_to_submitter() {
        let msg = contact_confirmation(
            &submission(ContactKind::General, None),
            &ContactRouting::default(),
        );
        assert_eq!(msg.to, "jordan@example.com");
        assert!(msg.html.contains("https://thementallap.com/workshops"));
        assert!(msg.text.contains("within 24 hours"));
    }
}
