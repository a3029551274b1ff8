//! Canvas stream declarations

use super::types::{ConfigFilter, RecordExtraction, StreamDefinition};
use crate::partition::ParentLink;
use crate::schema::{Field, StreamSchema};

/// Children of `courses` receive `course_id` from each course's `id`
pub const COURSE_PARENT: ParentLink = ParentLink::new("courses", "id", "course_id");

// ============================================================================
// terms
// ============================================================================

const TERM_FIELDS: &[Field] = &[
    Field::integer("id").describe("Enrollment Term ID"),
    Field::string("name").describe("Name of the Term"),
    Field::timestamp("start_at"),
    Field::timestamp("end_at"),
    Field::timestamp("created_at"),
    Field::string("workflow_state"),
    Field::string("sis_term_id"),
    Field::integer("grading_period_group_id"),
];

/// Enrollment terms of the configured account
pub const TERMS: StreamDefinition = StreamDefinition::new(
    "terms",
    "/accounts/{{ config.account_id }}/terms",
    StreamSchema::new(TERM_FIELDS),
)
.extraction(RecordExtraction::JsonPath("$.enrollment_terms[*]"));

// ============================================================================
// courses
// ============================================================================

const COURSE_FIELDS: &[Field] = &[
    Field::integer("id"),
    Field::string("name"),
    Field::string("course_code"),
    Field::string("uuid"),
    Field::integer("account_id"),
    Field::integer("root_account_id"),
    Field::integer("enrollment_term_id"),
    Field::string("sis_course_id"),
    Field::string("workflow_state"),
    Field::string("default_view"),
    Field::string("time_zone"),
    Field::boolean("is_public"),
    Field::boolean("blueprint"),
    Field::timestamp("created_at"),
    Field::timestamp("start_at"),
    Field::timestamp("end_at"),
];

/// Courses of the configured account
pub const COURSES: StreamDefinition = StreamDefinition::new(
    "courses",
    "/accounts/{{ config.account_id }}/courses",
    StreamSchema::new(COURSE_FIELDS),
)
.order_by("id")
.filters(&[ConfigFilter::CourseEndsAfter, ConfigFilter::WithEnrollments]);

// ============================================================================
// users
// ============================================================================

const USER_FIELDS: &[Field] = &[
    Field::integer("id"),
    Field::string("name"),
    Field::string("sortable_name"),
    Field::string("short_name"),
    Field::string("sis_user_id"),
    Field::string("login_id"),
    Field::string("email"),
    Field::timestamp("created_at"),
];

/// Users of the configured account
pub const USERS: StreamDefinition = StreamDefinition::new(
    "users",
    "/accounts/{{ config.account_id }}/users",
    StreamSchema::new(USER_FIELDS),
)
.order_by("id");

// ============================================================================
// outcomes
// ============================================================================

const OUTCOME_FIELDS: &[Field] = &[
    Field::integer("id"),
    Field::string("title"),
    Field::string("display_name"),
    Field::string("description"),
    Field::integer("context_id"),
    Field::string("context_type"),
    Field::number("points_possible"),
    Field::number("mastery_points"),
    Field::string("calculation_method"),
    Field::integer("calculation_int"),
    Field::string("url"),
];

/// Learning outcomes linked into the account's outcome groups
pub const OUTCOMES: StreamDefinition = StreamDefinition::new(
    "outcomes",
    "/accounts/{{ config.account_id }}/outcome_group_links",
    StreamSchema::new(OUTCOME_FIELDS),
)
.extraction(RecordExtraction::JsonPath("$[*].outcome"));

// ============================================================================
// enrollments
// ============================================================================

const ENROLLMENT_GRADE_FIELDS: &[Field] = &[
    Field::number("current_score"),
    Field::number("final_score"),
    Field::string("current_grade"),
    Field::string("final_grade"),
];

const ENROLLMENT_USER_FIELDS: &[Field] = &[
    Field::integer("id"),
    Field::string("name"),
    Field::string("sortable_name"),
    Field::string("login_id"),
    Field::string("sis_user_id"),
];

const ENROLLMENT_FIELDS: &[Field] = &[
    Field::integer("id"),
    Field::integer("course_id"),
    Field::integer("course_section_id"),
    Field::integer("user_id"),
    Field::string("type"),
    Field::string("role"),
    Field::integer("role_id"),
    Field::string("enrollment_state"),
    Field::timestamp("created_at"),
    Field::timestamp("updated_at"),
    Field::timestamp("last_activity_at"),
    Field::integer("total_activity_time"),
    Field::object("grades", ENROLLMENT_GRADE_FIELDS),
    Field::object("user", ENROLLMENT_USER_FIELDS),
];

/// Enrollments of each course
pub const ENROLLMENTS: StreamDefinition = StreamDefinition::new(
    "enrollments",
    "/courses/{{ context.course_id }}/enrollments",
    StreamSchema::new(ENROLLMENT_FIELDS),
)
.child_of(COURSE_PARENT);

// ============================================================================
// sections
// ============================================================================

const SECTION_FIELDS: &[Field] = &[
    Field::integer("id"),
    Field::integer("course_id"),
    Field::string("name"),
    Field::string("sis_section_id"),
    Field::integer("nonxlist_course_id"),
    Field::timestamp("start_at"),
    Field::timestamp("end_at"),
    Field::integer("total_students"),
];

/// Sections of each course
pub const SECTIONS: StreamDefinition = StreamDefinition::new(
    "sections",
    "/courses/{{ context.course_id }}/sections",
    StreamSchema::new(SECTION_FIELDS),
)
.child_of(COURSE_PARENT);

// ============================================================================
// assignments
// ============================================================================

const ASSIGNMENT_FIELDS: &[Field] = &[
    Field::integer("id"),
    Field::integer("course_id"),
    Field::integer("assignment_group_id"),
    Field::string("name"),
    Field::string("description"),
    Field::number("points_possible"),
    Field::string("grading_type"),
    Field::integer("position"),
    Field::boolean("published"),
    Field::timestamp("due_at"),
    Field::timestamp("unlock_at"),
    Field::timestamp("lock_at"),
    Field::timestamp("created_at"),
    Field::timestamp("updated_at"),
];

/// Assignments of each course
pub const ASSIGNMENTS: StreamDefinition = StreamDefinition::new(
    "assignments",
    "/courses/{{ context.course_id }}/assignments",
    StreamSchema::new(ASSIGNMENT_FIELDS),
)
.child_of(COURSE_PARENT);

// ============================================================================
// outcome_results
// ============================================================================

const OUTCOME_RESULT_LINK_FIELDS: &[Field] = &[
    Field::string("user"),
    Field::string("learning_outcome"),
    Field::string("alignment"),
];

const OUTCOME_RESULT_FIELDS: &[Field] = &[
    Field::integer("id"),
    Field::integer("course_id"),
    Field::number("score"),
    Field::number("possible"),
    Field::number("percent"),
    Field::boolean("mastery"),
    Field::boolean("hidden"),
    Field::boolean("hide_points"),
    Field::timestamp("submitted_or_assessed_at"),
    Field::object("links", OUTCOME_RESULT_LINK_FIELDS),
    Field::integer("outcome_id").describe("Id of the linked learning outcome"),
    Field::string("outcome_title"),
    Field::string("outcome_display_name"),
    Field::string("alignment_id").describe("Id of the linked alignment, as a string"),
    Field::string("alignment_name"),
];

/// Outcome results of each course, joined with linked outcomes and
/// alignments
pub const OUTCOME_RESULTS: StreamDefinition = StreamDefinition::new(
    "outcome_results",
    "/courses/{{ context.course_id }}/outcome_results",
    StreamSchema::new(OUTCOME_RESULT_FIELDS),
)
.child_of(COURSE_PARENT)
.extra_params(&[("include[]", "outcomes"), ("include[]", "alignments")])
.extraction(RecordExtraction::OutcomeResults);

/// All Canvas streams in run order
pub fn all() -> Vec<StreamDefinition> {
    vec![
        TERMS,
        COURSES,
        USERS,
        OUTCOMES,
        ENROLLMENTS,
        SECTIONS,
        ASSIGNMENTS,
        OUTCOME_RESULTS,
    ]
}
