use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReminderError {
    /// The job store could not be reached or refused the operation
    #[error("Reminder job store unavailable")]
    SchedulerUnavailable {
        #[source]
        source: anyhow::Error,
    },

    /// A stored job description is not a `{"user": int, "lesson": int}` object
    #[error("Malformed job description {payload:?}: {reason}")]
    MalformedPayload { payload: String, reason: String },

    /// The lesson date minus the lead time is not a representable instant
    #[error("Reminder fire time for lesson {lesson_id} is out of range")]
    FireTimeOutOfRange { lesson_id: i32 },
}

impl ReminderError {
    pub fn unavailable(source: impl Into<anyhow::Error>) -> Self {
        ReminderError::SchedulerUnavailable {
            source: source.into(),
        }
    }
}
