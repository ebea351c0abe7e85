//! Fatal input validation (§4.1).
//!
//! Checks structural integrity of the input bundle before any strategy
//! runs. These are the *fatal* checks — unlike the soft invariants in
//! [`crate::invariants`], a failure here aborts the run with
//! `CoreError::InvalidInput` before a single cell is placed.

use std::collections::HashSet;

use crate::models::InputBundle;

/// Fatal validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A fatal validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
}

/// Categories of fatal validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of the same type share an id.
    DuplicateId,
    /// A collection that must be non-empty is empty.
    EmptyCollection,
    /// A project references a responsible instructor that doesn't exist.
    DanglingResponsibleInstructor,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates an input bundle.
///
/// Checks:
/// 1. Projects, instructors, classrooms, and timeslots are each non-empty.
/// 2. No duplicate ids within any of the four collections.
/// 3. Every project's `responsible_instructor_id` resolves to a known
///    instructor.
pub fn validate_input(bundle: &InputBundle) -> ValidationResult {
    let mut errors = Vec::new();

    if bundle.projects.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyCollection,
            "no projects supplied",
        ));
    }
    if bundle.instructors.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyCollection,
            "no instructors supplied",
        ));
    }
    if bundle.classrooms.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyCollection,
            "no classrooms supplied",
        ));
    }
    if bundle.timeslots.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyCollection,
            "no timeslots supplied",
        ));
    }

    check_duplicates(&bundle.projects.iter().map(|p| p.id).collect::<Vec<_>>(), "project", &mut errors);
    check_duplicates(
        &bundle.instructors.iter().map(|i| i.id).collect::<Vec<_>>(),
        "instructor",
        &mut errors,
    );
    check_duplicates(&bundle.classrooms.iter().map(|c| c.id).collect::<Vec<_>>(), "classroom", &mut errors);
    check_duplicates(&bundle.timeslots.iter().map(|t| t.id).collect::<Vec<_>>(), "timeslot", &mut errors);

    let instructor_ids: HashSet<u64> = bundle.instructors.iter().map(|i| i.id).collect();
    for project in &bundle.projects {
        if !instructor_ids.contains(&project.responsible_instructor_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DanglingResponsibleInstructor,
                format!(
                    "project {} references unknown responsible instructor {}",
                    project.id, project.responsible_instructor_id
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_duplicates(ids: &[u64], entity: &str, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for &id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("duplicate {entity} id: {id}"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classroom, Instructor, Project, Rank, Timeslot};

    fn sample_bundle() -> InputBundle {
        InputBundle::new(
            vec![Project::new(1, 10), Project::new(2, 11)],
            vec![
                Instructor::new(10, "A", Rank::Full),
                Instructor::new(11, "B", Rank::Associate),
            ],
            vec![Classroom::new(100, "C1")],
            vec![Timeslot::new(1000, 0, 9, 10), Timeslot::new(1001, 1, 10, 11)],
        )
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_bundle()).is_ok());
    }

    #[test]
    fn test_empty_collections() {
        let bundle = InputBundle::default();
        let errors = validate_input(&bundle).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::EmptyCollection)
                .count(),
            4
        );
    }

    #[test]
    fn test_duplicate_project_id() {
        let mut bundle = sample_bundle();
        bundle.projects.push(Project::new(1, 10));
        let errors = validate_input(&bundle).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("project")));
    }

    #[test]
    fn test_dangling_responsible_instructor() {
        let mut bundle = sample_bundle();
        bundle.projects.push(Project::new(3, 999));
        let errors = validate_input(&bundle).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DanglingResponsibleInstructor));
    }

    #[test]
    fn test_multiple_errors_accumulate() {
        let bundle = InputBundle::new(vec![Project::new(1, 999)], vec![], vec![], vec![]);
        let errors = validate_input(&bundle).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
