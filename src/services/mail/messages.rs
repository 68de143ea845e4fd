//! Message content for outgoing mail.

use crate::models::{Lesson, User};

use super::Email;

pub fn reminder_email(from: &str, user: &User, lesson: &Lesson) -> Email {
    let when = lesson.date.format("%Y-%m-%d %H:%M UTC");
    Email {
        from: from.to_string(),
        to: vec![user.email.clone()],
        subject: format!("Reminder: {} starts soon", lesson.name),
        body: format!(
            "Hi {},\n\nThis is a reminder that the lesson \"{}\" starts at {}.\n\nSee you there!\n",
            user.username, lesson.name, when
        ),
    }
}

/// `site` is the scheme and authority the request came in on, e.g.
/// `http://localhost:3000`.
pub fn verification_email(from: &str, site: &str, user: &User, token: &str) -> Email {
    let link = format!("{}/api/verify/?token={}", site.trim_end_matches('/'), token);
    Email {
        from: from.to_string(),
        to: vec![user.email.clone()],
        subject: "Confirm your email address".to_string(),
        body: format!(
            "Hi {},\n\nThanks for registering. Please confirm your email address by opening:\n\n{}\n",
            user.username, link
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn user() -> User {
        User {
            id: 1,
            username: "koala".to_string(),
            email: "koala@example.com".to_string(),
            password: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_reminder_mentions_lesson_and_user() {
        let lesson = Lesson {
            id: 7,
            name: "L1".to_string(),
            date: Utc.with_ymd_and_hms(2018, 6, 11, 21, 30, 0).unwrap(),
            course_id: 1,
            lecturer_id: 1,
        };
        let email = reminder_email("school@example.com", &user(), &lesson);

        assert_eq!(email.to, vec!["koala@example.com"]);
        assert!(email.subject.contains("L1"));
        assert!(email.body.contains("L1"));
        assert!(email.body.contains("koala"));
        assert!(email.body.contains("2018-06-11 21:30 UTC"));
    }

    #[test]
    fn test_verification_link_uses_site() {
        let email = verification_email("school@example.com", "http://testserver/", &user(), "abc");
        assert_eq!(email.to, vec!["koala@example.com"]);
        assert!(email.body.contains("koala"));
        assert!(email.body.contains("http://testserver/api/verify/?token=abc"));
    }
}
