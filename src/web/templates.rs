// Askama template definitions

use askama::Template;

use crate::db::Goal;

// Landing page with login and registration forms
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub flashes: Vec<String>,
    pub version: String,
}

// Goals dashboard
#[derive(Template)]
#[template(path = "goals.html")]
pub struct GoalsTemplate {
    pub email: String,
    pub goals: Vec<Goal>,
    pub completed: usize,
    pub flashes: Vec<String>,
}

impl GoalsTemplate {
    pub fn new(email: String, goals: Vec<Goal>, flashes: Vec<String>) -> Self {
        let completed = goals.iter().filter(|g| g.completed).count();
        Self {
            email,
            goals,
            completed,
            flashes,
        }
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub message: String,
}
