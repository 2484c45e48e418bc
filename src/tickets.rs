//! Support ticket lifecycle.
//!
//! A ticket is either open or closed. Every real transition leaves a trace
//! in the thread as a message from the admin; setting the current status
//! again changes nothing.

use crate::models::{new_id, Message, Sender, Ticket, TicketStatus};
use chrono::{DateTime, Utc};

/// Thread entry appended when an open ticket is closed
pub const CLOSED_MESSAGE: &str = "Ticket closed by admin.";

/// Thread entry appended when a closed ticket is reopened
pub const REOPENED_MESSAGE: &str = "Ticket reopened by admin.";

impl Ticket {
    /// New open ticket with an empty thread
    pub fn open(email: String, password: String, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            email,
            password,
            created: now,
            status: TicketStatus::Open,
            messages: Vec::new(),
        }
    }

    /// Move to `status`, appending a system message if the status changed.
    ///
    /// Returns whether a transition happened.
    pub fn set_status(&mut self, status: TicketStatus, now: DateTime<Utc>) -> bool {
        let text = match (self.status, status) {
            (TicketStatus::Open, TicketStatus::Closed) => CLOSED_MESSAGE,
            (TicketStatus::Closed, TicketStatus::Open) => REOPENED_MESSAGE,
            _ => return false,
        };

        self.status = status;
        self.messages.push(Message {
            sender: Sender::Admin,
            text: Some(text.to_string()),
            attachment: None,
            time: now,
        });
        true
    }

    /// Append a message to the thread
    pub fn push_message(
        &mut self,
        sender: Sender,
        text: Option<String>,
        attachment: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.messages.push(Message {
            sender,
            text,
            attachment,
            time: now,
        });
    }
}

/// Most recently created ticket matching both credentials.
///
/// Among equal creation times the one stored last wins.
pub fn find_latest_by_credentials<'a>(
    tickets: &'a [Ticket],
    email: &str,
    password: &str,
) -> Option<&'a Ticket> {
    tickets
        .iter()
        .filter(|t| t.email == email && t.password == password)
        .max_by_key(|t| t.created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn ticket(email: &str, password: &str, created: i64) -> Ticket {
        Ticket::open(email.into(), password.into(), at(created))
    }

    #[test]
    fn closing_appends_one_admin_message() {
        let mut t = ticket("a@b.c", "pw", 0);

        assert!(t.set_status(TicketStatus::Closed, at(10)));
        assert_eq!(t.status, TicketStatus::Closed);
        assert_eq!(t.messages.len(), 1);
        assert_eq!(t.messages[0].sender, Sender::Admin);
        assert_eq!(t.messages[0].text.as_deref(), Some(CLOSED_MESSAGE));
    }

    #[test]
    fn closing_twice_appends_nothing() {
        let mut t = ticket("a@b.c", "pw", 0);
        t.set_status(TicketStatus::Closed, at(10));

        assert!(!t.set_status(TicketStatus::Closed, at(20)));
        assert_eq!(t.messages.len(), 1);
    }

    #[test]
    fn reopening_uses_different_text() {
        let mut t = ticket("a@b.c", "pw", 0);
        t.set_status(TicketStatus::Closed, at(10));

        assert!(t.set_status(TicketStatus::Open, at(20)));
        assert_eq!(t.status, TicketStatus::Open);
        assert_eq!(t.messages.len(), 2);
        assert_eq!(t.messages[1].text.as_deref(), Some(REOPENED_MESSAGE));
        assert_ne!(CLOSED_MESSAGE, REOPENED_MESSAGE);
    }

    #[test]
    fn opening_an_open_ticket_is_a_no_op() {
        let mut t = ticket("a@b.c", "pw", 0);
        assert!(!t.set_status(TicketStatus::Open, at(5)));
        assert!(t.messages.is_empty());
    }

    #[test]
    fn lookup_returns_latest_match() {
        let tickets = vec![
            ticket("a@b.c", "pw", 100),
            ticket("a@b.c", "pw", 300),
            ticket("a@b.c", "other", 500),
            ticket("x@y.z", "pw", 900),
            ticket("a@b.c", "pw", 200),
        ];

        let found = find_latest_by_credentials(&tickets, "a@b.c", "pw").unwrap();
        assert_eq!(found.created, at(300));
    }

    #[test]
    fn lookup_ties_prefer_later_stored() {
        let tickets = vec![ticket("a@b.c", "pw", 100), ticket("a@b.c", "pw", 100)];

        let found = find_latest_by_credentials(&tickets, "a@b.c", "pw").unwrap();
        assert_eq!(found.id, tickets[1].id);
    }

    #[test]
    fn lookup_without_match_is_none() {
        let tickets = vec![ticket("a@b.c", "pw", 0)];
        assert!(find_latest_by_credentials(&tickets, "a@b.c", "nope").is_none());
        assert!(find_latest_by_credentials(&[], "a@b.c", "pw").is_none());
    }

    #[test]
    fn push_message_keeps_order() {
        let mut t = ticket("a@b.c", "pw", 0);
        t.push_message(Sender::Client, Some("hi".into()), None, at(1));
        t.push_message(Sender::Admin, None, Some("/uploads/x.png".into()), at(1) + Duration::seconds(5));

        assert_eq!(t.messages.len(), 2);
        assert_eq!(t.messages[0].sender, Sender::Client);
        assert_eq!(t.messages[1].attachment.as_deref(), Some("/uploads/x.png"));
    }
}
