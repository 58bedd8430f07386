//! Goal model.

use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Goal {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub author_email: String,
}

/// Fields of a goal that may change after creation.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalChanges {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl GoalChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }

    /// Apply the changes on top of an existing goal.
    pub fn apply(self, mut goal: Goal) -> Goal {
        if let Some(title) = self.title {
            goal.title = title;
        }
        if let Some(completed) = self.completed {
            goal.completed = completed;
        }
        goal
    }
}
