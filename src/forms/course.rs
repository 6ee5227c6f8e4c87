use crate::models::{Course, NewCourse, UpdateCourse};

use super::{Draft, non_blank};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseDraft {
    pub name: String,
    pub course_code: String,
    pub professor: String,
    pub semester: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoursePayload {
    /// Set when editing an existing course.
    pub id: Option<String>,
    pub name: String,
    pub course_code: Option<String>,
    pub professor: Option<String>,
    pub semester: Option<String>,
    pub notes: Option<String>,
}

impl Draft for CourseDraft {
    type Initial = Course;
    type Payload = CoursePayload;

    fn from_initial(course: &Course) -> Self {
        Self {
            name: course.name.clone(),
            course_code: course.course_code.clone().unwrap_or_default(),
            professor: course.professor.clone().unwrap_or_default(),
            semester: course.semester.clone().unwrap_or_default(),
            notes: course.notes.clone().unwrap_or_default(),
        }
    }

    fn initial_id(course: &Course) -> String {
        course.id.clone()
    }

    fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
    }

    fn to_payload(&self, id: Option<String>) -> Option<CoursePayload> {
        if !self.is_complete() {
            return None;
        }
        Some(CoursePayload {
            id,
            name: self.name.trim().to_string(),
            course_code: non_blank(&self.course_code),
            professor: non_blank(&self.professor),
            semester: non_blank(&self.semester),
            notes: non_blank(&self.notes),
        })
    }
}

impl From<CoursePayload> for NewCourse {
    fn from(p: CoursePayload) -> Self {
        NewCourse {
            name: p.name,
            course_code: p.course_code,
            professor: p.professor,
            semester: p.semester,
            notes: p.notes,
        }
    }
}

/// Writes every field, clearing the optional ones left blank.
impl From<CoursePayload> for UpdateCourse {
    fn from(p: CoursePayload) -> Self {
        UpdateCourse {
            name: Some(p.name),
            course_code: Some(p.course_code),
            professor: Some(p.professor),
            semester: Some(p.semester),
            notes: Some(p.notes),
        }
    }
}
