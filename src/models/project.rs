//! Project model.
//!
//! A project is the unit of work the core places into a (classroom,
//! timeslot) cell. Every project has exactly one responsible instructor
//! (I2/I5 pivot around this id).

use serde::{Deserialize, Serialize};

/// Defense type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectType {
    Interim,
    Final,
}

/// A project to be defended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub title: String,
    pub project_type: ProjectType,
    pub responsible_instructor_id: u64,
    pub is_makeup: bool,
}

impl Project {
    pub fn new(id: u64, responsible_instructor_id: u64) -> Self {
        Self {
            id,
            title: String::new(),
            project_type: ProjectType::Final,
            responsible_instructor_id,
            is_makeup: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_type(mut self, project_type: ProjectType) -> Self {
        self.project_type = project_type;
        self
    }

    pub fn with_makeup(mut self, is_makeup: bool) -> Self {
        self.is_makeup = is_makeup;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_builder() {
        let p = Project::new(1, 10)
            .with_title("Thesis A")
            .with_type(ProjectType::Interim)
            .with_makeup(true);
        assert_eq!(p.id, 1);
        assert_eq!(p.responsible_instructor_id, 10);
        assert_eq!(p.project_type, ProjectType::Interim);
        assert!(p.is_makeup);
    }
}
