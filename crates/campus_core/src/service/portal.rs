//! Portal facade owning every entity repository.
//!
//! # Responsibility
//! - Hold the single in-memory source of truth for all entity lists.
//! - Enforce rules that span lists (task → course references).
//! - Expose dashboard counters.
//!
//! # Invariants
//! - A course referenced by any task cannot be deleted.
//! - A task always references a course that existed when it was written.

use crate::clock::Clock;
use crate::model::cafeteria_order::CafeteriaOrder;
use crate::model::community_event::CommunityEvent;
use crate::model::course::Course;
use crate::model::entity::Entity;
use crate::model::event::Event;
use crate::model::forum_post::ForumPost;
use crate::model::help_ticket::HelpTicket;
use crate::model::lost_found::LostFoundReport;
use crate::model::marketplace::MarketplaceListing;
use crate::model::service_request::ServiceRequest;
use crate::model::student::Student;
use crate::model::task::Task;
use crate::repo::entity_repo::{EntityRepository, LoadOutcome, RepoError, RepoOptions, RepoResult};
use crate::service::dashboard::{summarize, DashboardSummary};
use crate::session::SessionContext;
use crate::store::KeyValueStore;
use crate::sync::change_bus::ChangeBus;
use crate::validation::{FormInput, ValidationCode, ValidationError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type PortalResult<T> = Result<T, PortalError>;

/// Errors from portal operations that span entity lists.
#[derive(Debug)]
pub enum PortalError {
    Repo(RepoError),
    /// Course deletion blocked by tasks that still reference it.
    CourseInUse {
        course_id: String,
        task_ids: Vec<String>,
    },
}

impl PortalError {
    /// Text suitable for showing to the person who triggered the operation.
    pub fn user_message(&self) -> String {
        match self {
            Self::Repo(err) => err.user_message(),
            Self::CourseInUse {
                course_id,
                task_ids,
            } => format!(
                "Course {course_id} cannot be deleted while {} task(s) still reference it.",
                task_ids.len()
            ),
        }
    }
}

impl Display for PortalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::CourseInUse {
                course_id,
                task_ids,
            } => write!(
                f,
                "course `{course_id}` is referenced by tasks: {}",
                task_ids.join(", ")
            ),
        }
    }
}

impl Error for PortalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::CourseInUse { .. } => None,
        }
    }
}

impl From<RepoError> for PortalError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ValidationError> for PortalError {
    fn from(value: ValidationError) -> Self {
        Self::Repo(RepoError::Validation(value))
    }
}

macro_rules! repo_accessors {
    ($($field:ident, $field_mut:ident: $entity:ty;)+) => {
        $(
            pub fn $field(&self) -> &EntityRepository<'s, $entity> {
                &self.$field
            }

            pub fn $field_mut(&mut self) -> &mut EntityRepository<'s, $entity> {
                &mut self.$field
            }
        )+
    };
}

/// All entity repositories of one portal, sharing a store, bus and clock.
pub struct CampusPortal<'s> {
    bus: Arc<ChangeBus>,
    clock: Arc<dyn Clock>,
    events: EntityRepository<'s, Event>,
    lost_found: EntityRepository<'s, LostFoundReport>,
    marketplace: EntityRepository<'s, MarketplaceListing>,
    service_requests: EntityRepository<'s, ServiceRequest>,
    forum_posts: EntityRepository<'s, ForumPost>,
    cafeteria_orders: EntityRepository<'s, CafeteriaOrder>,
    community_events: EntityRepository<'s, CommunityEvent>,
    help_tickets: EntityRepository<'s, HelpTicket>,
    students: EntityRepository<'s, Student>,
    courses: EntityRepository<'s, Course>,
    tasks: EntityRepository<'s, Task>,
}

impl<'s> CampusPortal<'s> {
    pub fn new(store: &'s dyn KeyValueStore, clock: Arc<dyn Clock>, options: RepoOptions) -> Self {
        Self::with_bus(store, clock, options, Arc::new(ChangeBus::new()))
    }

    /// Builds a portal publishing on an existing bus.
    pub fn with_bus(
        store: &'s dyn KeyValueStore,
        clock: Arc<dyn Clock>,
        options: RepoOptions,
        bus: Arc<ChangeBus>,
    ) -> Self {
        let b = &bus;
        let c = &clock;
        Self {
            events: EntityRepository::new(store, Arc::clone(b), Arc::clone(c), options),
            lost_found: EntityRepository::new(store, Arc::clone(b), Arc::clone(c), options),
            marketplace: EntityRepository::new(store, Arc::clone(b), Arc::clone(c), options),
            service_requests: EntityRepository::new(store, Arc::clone(b), Arc::clone(c), options),
            forum_posts: EntityRepository::new(store, Arc::clone(b), Arc::clone(c), options),
            cafeteria_orders: EntityRepository::new(store, Arc::clone(b), Arc::clone(c), options),
            community_events: EntityRepository::new(store, Arc::clone(b), Arc::clone(c), options),
            help_tickets: EntityRepository::new(store, Arc::clone(b), Arc::clone(c), options),
            students: EntityRepository::new(store, Arc::clone(b), Arc::clone(c), options),
            courses: EntityRepository::new(store, Arc::clone(b), Arc::clone(c), options),
            tasks: EntityRepository::new(store, Arc::clone(b), Arc::clone(c), options),
            bus,
            clock,
        }
    }

    pub fn bus(&self) -> &Arc<ChangeBus> {
        &self.bus
    }

    repo_accessors! {
        events, events_mut: Event;
        lost_found, lost_found_mut: LostFoundReport;
        marketplace, marketplace_mut: MarketplaceListing;
        service_requests, service_requests_mut: ServiceRequest;
        forum_posts, forum_posts_mut: ForumPost;
        cafeteria_orders, cafeteria_orders_mut: CafeteriaOrder;
        community_events, community_events_mut: CommunityEvent;
        help_tickets, help_tickets_mut: HelpTicket;
        students, students_mut: Student;
        courses, courses_mut: Course;
        tasks, tasks_mut: Task;
    }

    /// Loads every entity list once. A failing list does not stop the others.
    pub fn load_all(&mut self) -> Vec<(&'static str, RepoResult<LoadOutcome>)> {
        let outcomes = vec![
            (Event::STORAGE_KEY, self.events.load()),
            (LostFoundReport::STORAGE_KEY, self.lost_found.load()),
            (MarketplaceListing::STORAGE_KEY, self.marketplace.load()),
            (ServiceRequest::STORAGE_KEY, self.service_requests.load()),
            (ForumPost::STORAGE_KEY, self.forum_posts.load()),
            (CafeteriaOrder::STORAGE_KEY, self.cafeteria_orders.load()),
            (CommunityEvent::STORAGE_KEY, self.community_events.load()),
            (HelpTicket::STORAGE_KEY, self.help_tickets.load()),
            (Student::STORAGE_KEY, self.students.load()),
            (Course::STORAGE_KEY, self.courses.load()),
            (Task::STORAGE_KEY, self.tasks.load()),
        ];

        let failed = outcomes.iter().filter(|(_, result)| result.is_err()).count();
        if failed > 0 {
            warn!(
                "event=portal_load module=service status=partial lists={} failed={}",
                outcomes.len(),
                failed
            );
        } else {
            info!(
                "event=portal_load module=service status=ok lists={}",
                outcomes.len()
            );
        }
        outcomes
    }

    /// Creates a task after checking its course exists.
    pub fn create_task(
        &mut self,
        form: &FormInput,
        session: &SessionContext,
    ) -> PortalResult<Task> {
        Task::rules().validate(form, self.clock.today())?;
        self.require_course(&form.text("course_id"))?;
        Ok(self.tasks.create(form, session)?)
    }

    /// Updates a task, re-checking the course when the patch re-points it.
    pub fn update_task(&mut self, id: &str, patch: &FormInput) -> PortalResult<Task> {
        Task::rules().validate_patch(patch, self.clock.today())?;
        if patch.contains("course_id") {
            self.require_course(&patch.text("course_id"))?;
        }
        Ok(self.tasks.update(id, patch)?)
    }

    /// Deletes a course unless a task still references it.
    pub fn delete_course(&mut self, id: &str) -> PortalResult<Course> {
        self.courses.ensure_loaded()?;
        self.tasks.ensure_loaded()?;

        let task_ids: Vec<String> = self
            .tasks
            .all()
            .iter()
            .filter(|task| task.course_id == id)
            .map(|task| task.id.clone())
            .collect();
        if !task_ids.is_empty() {
            warn!(
                "event=course_delete module=service status=rejected id={} referencing_tasks={}",
                id,
                task_ids.len()
            );
            return Err(PortalError::CourseInUse {
                course_id: id.to_string(),
                task_ids,
            });
        }

        Ok(self.courses.delete(id)?)
    }

    /// Adds one like to a forum post.
    pub fn like_post(&mut self, id: &str) -> PortalResult<ForumPost> {
        self.forum_posts.ensure_loaded()?;
        let mut post = self
            .forum_posts
            .get(id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound {
                key: ForumPost::STORAGE_KEY,
                id: id.to_string(),
            })?;
        post.like();
        Ok(self.forum_posts.replace(post)?)
    }

    /// Totals and per-status counters for every entity list.
    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary {
            entities: vec![
                summarize(&self.events),
                summarize(&self.lost_found),
                summarize(&self.marketplace),
                summarize(&self.service_requests),
                summarize(&self.forum_posts),
                summarize(&self.cafeteria_orders),
                summarize(&self.community_events),
                summarize(&self.help_tickets),
                summarize(&self.students),
                summarize(&self.courses),
                summarize(&self.tasks),
            ],
        }
    }

    fn require_course(&mut self, course_id: &str) -> PortalResult<()> {
        self.courses.ensure_loaded()?;
        if self.courses.contains(course_id) {
            return Ok(());
        }
        Err(ValidationError::new(
            "course_id",
            ValidationCode::UnknownReference,
            format!("Course {course_id} does not exist"),
        )
        .into())
    }
}
