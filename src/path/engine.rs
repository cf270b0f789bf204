use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use super::{
    model::{ExpandedStep, Module, ModuleStatus, StepRef},
    session::{SessionRecord, SESSION_KEY},
};
use crate::{
    content::{GeneratedContent, LessonRequest},
    generator::{ContentGenerator, GenerationError},
    level::Level,
    points::{ActivityType, BadgeUnlocked, PointsLedger},
    store::{load_or_heal, save_json, KeyValueStore, StoreError},
    syllabus,
};

pub(crate) const PROGRESS_KEY: &str = "learning_path_progress";

fn modules_key(level: Level) -> String {
    format!("learning_path_modules_{}", level.key())
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("failed to persist learning path: {0}")]
    Store(#[from] StoreError),
}

/// Whether an operation changed anything. Invalid transitions are ignored,
/// never reported as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// A lesson generation that has been started and must be finished with
/// [`LearningPathEngine::finish_lesson`].
#[derive(Debug, Clone, PartialEq)]
pub struct LessonTicket {
    pub level: Level,
    pub step: StepRef,
    pub title: String,
    pub request: LessonRequest,
    pub force_refresh: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleTicket {
    pub level: Level,
    pub existing_titles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepSelection {
    Ignored,
    /// the step was already open and has been closed
    Collapsed,
    /// cached content is now shown, nothing to fetch
    Cached,
    Fetch(LessonTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonOutcome {
    Applied,
    /// the step no longer exists where the ticket points
    Stale,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Ignored,
    Collapsed,
    Cached,
    Fetched(LessonOutcome),
}

/// Read-only view of the engine for a presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct PathSnapshot {
    pub active_level: Option<Level>,
    pub modules: Vec<Module>,
    pub progress: usize,
    pub viewed_module_index: usize,
    pub expanded: Option<ExpandedStep>,
    pub show_archived: bool,
    pub generating: bool,
    pub last_error: Option<String>,
    pub points: u64,
    pub badges: u32,
}

/// Owns module lists, progress cursors and the open-step view for every level.
pub struct LearningPathEngine<S> {
    store: S,
    points: PointsLedger<S>,
    paths: BTreeMap<Level, Vec<Module>>,
    progress: BTreeMap<Level, usize>,
    active_level: Option<Level>,
    viewed_module_index: usize,
    expanded: Option<ExpandedStep>,
    show_archived: bool,
    generating: Option<Level>,
    last_error: Option<String>,
    badge_notice: Option<BadgeUnlocked>,
    restored: bool,
    last_session: Option<SessionRecord>,
}

impl<S: KeyValueStore + Clone> LearningPathEngine<S> {
    pub fn new(store: S) -> Result<Self, PathError> {
        let progress =
            load_or_heal::<BTreeMap<Level, usize>, _>(&store, PROGRESS_KEY)?.unwrap_or_default();
        let points = PointsLedger::load(store.clone())?;

        Ok(Self {
            store,
            points,
            paths: BTreeMap::new(),
            progress,
            active_level: None,
            viewed_module_index: 0,
            expanded: None,
            show_archived: false,
            generating: None,
            last_error: None,
            badge_notice: None,
            restored: false,
            last_session: None,
        })
    }

    // ---- read-only state ----

    pub fn active_level(&self) -> Option<Level> {
        self.active_level
    }

    /// Module list of the active level, empty when no level is active.
    pub fn modules(&self) -> &[Module] {
        self.active_level
            .and_then(|level| self.paths.get(&level))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn progress(&self, level: Level) -> usize {
        self.progress.get(&level).copied().unwrap_or(0)
    }

    /// Progress cursor of the active level.
    pub fn cursor(&self) -> usize {
        self.active_level.map_or(0, |level| self.progress(level))
    }

    pub fn viewed_module_index(&self) -> usize {
        self.viewed_module_index
    }

    pub fn viewed_module(&self) -> Option<&Module> {
        self.modules().get(self.viewed_module_index)
    }

    pub fn expanded(&self) -> Option<&ExpandedStep> {
        self.expanded.as_ref()
    }

    pub fn show_archived(&self) -> bool {
        self.show_archived
    }

    pub fn is_generating(&self) -> bool {
        self.generating.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn points(&self) -> &PointsLedger<S> {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut PointsLedger<S> {
        &mut self.points
    }

    pub fn take_badge_notice(&mut self) -> Option<BadgeUnlocked> {
        self.badge_notice.take()
    }

    pub fn module_status(&self, module_index: usize) -> ModuleStatus {
        ModuleStatus::for_index(module_index, self.cursor())
    }

    /// Modules to list in history views. Completed generated modules are
    /// archived and only listed while `show_archived` is on.
    pub fn visible_modules(&self) -> Vec<(usize, &Module)> {
        let Some(level) = self.active_level else {
            return Vec::new();
        };
        let standard = syllabus::standard_len(level);
        let cursor = self.progress(level);

        self.modules()
            .iter()
            .enumerate()
            .filter(|(index, _)| self.show_archived || *index < standard || *index >= cursor)
            .collect()
    }

    pub fn snapshot(&self) -> PathSnapshot {
        PathSnapshot {
            active_level: self.active_level,
            modules: self.modules().to_vec(),
            progress: self.cursor(),
            viewed_module_index: self.viewed_module_index,
            expanded: self.expanded.clone(),
            show_archived: self.show_archived,
            generating: self.is_generating(),
            last_error: self.last_error.clone(),
            points: self.points.points(),
            badges: self.points.badges(),
        }
    }

    // ---- level lifecycle ----

    pub fn select_level(&mut self, level: Level) -> Result<(), PathError> {
        let modules = match self.load_modules(level)? {
            Some(modules) if !modules.is_empty() => modules,
            _ => {
                let seeded = syllabus::seed_modules(level);
                tracing::info!(%level, modules = seeded.len(), "seeding learning path");
                save_json(&self.store, &modules_key(level), &seeded)?;
                self.progress.insert(level, 0);
                self.save_progress()?;
                seeded
            }
        };

        let cursor = self.progress(level).min(modules.len());
        if self.progress.get(&level) != Some(&cursor) {
            self.progress.insert(level, cursor);
            self.save_progress()?;
        }

        self.viewed_module_index = cursor.min(modules.len().saturating_sub(1));
        self.paths.insert(level, modules);
        self.active_level = Some(level);
        self.expanded = None;
        self.persist_session()
    }

    /// Leaves the active level and forgets where the learner was.
    pub fn switch_level(&mut self) -> Result<(), PathError> {
        self.active_level = None;
        self.viewed_module_index = 0;
        self.expanded = None;
        self.show_archived = false;
        self.last_error = None;
        self.store.remove(SESSION_KEY)?;
        self.last_session = None;
        Ok(())
    }

    /// Erases every level's path and cursor. Nothing happens unless `confirm`
    /// returns true.
    pub fn reset_all_paths(
        &mut self,
        confirm: impl FnOnce() -> bool,
    ) -> Result<Transition, PathError> {
        if !confirm() {
            return Ok(Transition::Ignored);
        }

        for level in Level::ALL {
            self.store.remove(&modules_key(level))?;
        }
        self.store.remove(PROGRESS_KEY)?;
        self.store.remove(SESSION_KEY)?;

        self.paths.clear();
        self.progress.clear();
        self.active_level = None;
        self.viewed_module_index = 0;
        self.expanded = None;
        self.show_archived = false;
        self.generating = None;
        self.last_error = None;
        self.last_session = None;
        tracing::info!("all learning paths reset");
        Ok(Transition::Applied)
    }

    /// Puts the view back where the last session left it. Only the first call
    /// does anything; session writes are suppressed until it has run.
    pub fn restore_session(&mut self) -> Result<Transition, PathError> {
        if self.restored {
            return Ok(Transition::Ignored);
        }
        self.restored = true;

        let Some(record) = load_or_heal::<SessionRecord, _>(&self.store, SESSION_KEY)? else {
            return Ok(Transition::Ignored);
        };
        let level = record.active_path_level;
        let Some(modules) = self.load_modules(level)?.filter(|m| !m.is_empty()) else {
            tracing::debug!(%level, "session refers to a level without a path");
            return Ok(Transition::Ignored);
        };

        let cursor = self.progress(level).min(modules.len());
        self.progress.insert(level, cursor);
        self.viewed_module_index = record
            .viewed_module_index
            .min(cursor)
            .min(modules.len() - 1);
        self.expanded = record.expanded_step.and_then(|step| {
            step.resolve(&modules).map(|s| ExpandedStep {
                step,
                content: s.content.clone(),
                loading: false,
            })
        });
        self.paths.insert(level, modules);
        self.active_level = Some(level);
        self.last_session = Some(record);

        tracing::info!(%level, viewed = self.viewed_module_index, "session restored");
        self.persist_session()?;
        Ok(Transition::Applied)
    }

    // ---- step content ----

    /// First half of selecting a step: updates the open-step view and, when
    /// content is needed, returns a ticket describing the generation to run.
    pub fn begin_select_step(
        &mut self,
        module_index: usize,
        step_index: usize,
        force_refresh: bool,
    ) -> Result<StepSelection, PathError> {
        let Some(level) = self.active_level else {
            return Ok(StepSelection::Ignored);
        };
        let target = StepRef::new(module_index, step_index);
        let Some(step) = self.paths.get(&level).and_then(|m| target.resolve(m)) else {
            return Ok(StepSelection::Ignored);
        };

        let already_open = self.expanded.as_ref().is_some_and(|e| e.step == target);
        let selection = if already_open && !force_refresh {
            self.expanded = None;
            StepSelection::Collapsed
        } else if step.content.is_none() || force_refresh {
            let ticket = LessonTicket {
                level,
                step: target,
                title: step.title.clone(),
                request: LessonRequest::for_step(step),
                force_refresh,
            };
            self.expanded = Some(ExpandedStep {
                step: target,
                content: None,
                loading: true,
            });
            self.last_error = None;
            StepSelection::Fetch(ticket)
        } else {
            tracing::debug!(?target, "using cached step content");
            self.expanded = Some(ExpandedStep {
                step: target,
                content: step.content.clone(),
                loading: false,
            });
            StepSelection::Cached
        };

        self.persist_session()?;
        Ok(selection)
    }

    /// Second half of selecting a step: stores a generation result.
    pub fn finish_lesson(
        &mut self,
        ticket: LessonTicket,
        result: Result<GeneratedContent, GenerationError>,
    ) -> Result<LessonOutcome, PathError> {
        let content = match result {
            Ok(content) => content,
            Err(e) => return self.fail_lesson(&ticket, &e.to_string()),
        };

        let mut modules = self.latest_modules(ticket.level)?;
        let Some(step) = ticket
            .step
            .resolve_mut(&mut modules)
            .filter(|s| s.title == ticket.title)
        else {
            tracing::warn!(
                step = ?ticket.step,
                title = %ticket.title,
                "generated content for a step that no longer exists"
            );
            if self.is_loading(&ticket) {
                self.expanded = None;
                self.persist_session()?;
            }
            return Ok(LessonOutcome::Stale);
        };

        if !content.fits(step.step_type) {
            let reason = format!("expected {} content", step.step_type.as_str());
            return self.fail_lesson(&ticket, &reason);
        }

        step.content = Some(content.clone());
        save_json(&self.store, &modules_key(ticket.level), &modules)?;
        self.paths.insert(ticket.level, modules);
        tracing::info!(
            title = %ticket.title,
            refresh = ticket.force_refresh,
            "step content generated"
        );

        if self.is_targeted(&ticket) {
            self.expanded = Some(ExpandedStep {
                step: ticket.step,
                content: Some(content),
                loading: false,
            });
        }

        if !ticket.force_refresh {
            self.award(ActivityType::LessonStep)?;
        }
        Ok(LessonOutcome::Applied)
    }

    /// Selects a step and, when needed, runs the generation to completion.
    pub fn select_step<G: ContentGenerator + ?Sized>(
        &mut self,
        generator: &G,
        module_index: usize,
        step_index: usize,
        force_refresh: bool,
    ) -> Result<SelectOutcome, PathError> {
        let outcome = match self.begin_select_step(module_index, step_index, force_refresh)? {
            StepSelection::Ignored => SelectOutcome::Ignored,
            StepSelection::Collapsed => SelectOutcome::Collapsed,
            StepSelection::Cached => SelectOutcome::Cached,
            StepSelection::Fetch(ticket) => {
                let result = generator.generate_lesson(&ticket.request);
                SelectOutcome::Fetched(self.finish_lesson(ticket, result)?)
            }
        };
        Ok(outcome)
    }

    /// Forced refresh, only allowed on steps of generated modules.
    pub fn begin_regenerate_step(
        &mut self,
        module_index: usize,
        step_index: usize,
    ) -> Result<StepSelection, PathError> {
        match self.active_level {
            Some(level) if module_index >= syllabus::standard_len(level) => {
                self.begin_select_step(module_index, step_index, true)
            }
            _ => Ok(StepSelection::Ignored),
        }
    }

    pub fn regenerate_step<G: ContentGenerator + ?Sized>(
        &mut self,
        generator: &G,
        module_index: usize,
        step_index: usize,
    ) -> Result<SelectOutcome, PathError> {
        match self.begin_regenerate_step(module_index, step_index)? {
            StepSelection::Fetch(ticket) => {
                let result = generator.generate_lesson(&ticket.request);
                Ok(SelectOutcome::Fetched(self.finish_lesson(ticket, result)?))
            }
            _ => Ok(SelectOutcome::Ignored),
        }
    }

    // ---- progress ----

    pub fn complete_current_module(&mut self) -> Result<Transition, PathError> {
        let Some(level) = self.active_level else {
            return Ok(Transition::Ignored);
        };
        let count = self.modules().len();
        let cursor = self.progress(level);
        if cursor >= count || self.viewed_module_index != cursor {
            tracing::debug!(
                cursor,
                viewed = self.viewed_module_index,
                "ignoring completion of non-current module"
            );
            return Ok(Transition::Ignored);
        }

        self.progress.insert(level, cursor + 1);
        self.save_progress()?;
        self.expanded = None;
        tracing::info!(%level, completed = cursor + 1, of = count, "module completed");

        self.award(ActivityType::ModuleComplete)?;
        self.persist_session()?;
        Ok(Transition::Applied)
    }

    pub fn navigate_module(&mut self, direction: Direction) -> Result<Transition, PathError> {
        if self.active_level.is_none() {
            return Ok(Transition::Ignored);
        }
        self.expanded = None;

        let ceiling = self.cursor().min(self.modules().len().saturating_sub(1));
        let moved = match direction {
            Direction::Previous if self.viewed_module_index > 0 => {
                self.viewed_module_index -= 1;
                Transition::Applied
            }
            Direction::Next if self.viewed_module_index < ceiling => {
                self.viewed_module_index += 1;
                Transition::Applied
            }
            _ => Transition::Ignored,
        };

        self.persist_session()?;
        Ok(moved)
    }

    pub fn toggle_archived_visibility(&mut self) -> bool {
        self.show_archived = !self.show_archived;
        self.show_archived
    }

    // ---- path growth ----

    /// Starts generating more modules once every module is complete. Returns
    /// `None` if not allowed or if a generation is already running.
    pub fn begin_generate_more(&mut self) -> Option<ModuleTicket> {
        let level = self.active_level?;
        if self.generating.is_some() || self.progress(level) < self.modules().len() {
            return None;
        }

        self.generating = Some(level);
        self.last_error = None;
        Some(ModuleTicket {
            level,
            existing_titles: self
                .modules()
                .iter()
                .map(|m| m.module_title.clone())
                .collect(),
        })
    }

    pub fn finish_generate_more(
        &mut self,
        ticket: ModuleTicket,
        result: Result<Vec<Module>, GenerationError>,
    ) -> Result<Transition, PathError> {
        if self.generating == Some(ticket.level) {
            self.generating = None;
        }

        let stored = load_or_heal::<Vec<Module>, _>(&self.store, &modules_key(ticket.level))?;
        let Some(mut modules) = stored.filter(|modules| {
            modules
                .iter()
                .map(|m| &m.module_title)
                .eq(ticket.existing_titles.iter())
        }) else {
            tracing::warn!(
                level = %ticket.level,
                "discarding modules generated for a path that changed"
            );
            return Ok(Transition::Ignored);
        };

        let new_modules: Vec<Module> = match result {
            Ok(modules) => modules
                .into_iter()
                .filter(|m| !m.steps.is_empty())
                .map(|mut m| {
                    for step in &mut m.steps {
                        step.level = ticket.level;
                        step.content = None;
                    }
                    m
                })
                .collect(),
            Err(e) => {
                tracing::warn!(level = %ticket.level, error = %e, "module generation failed");
                self.last_error = Some(
                    "Could not create new modules because the server failed. Please try again."
                        .to_string(),
                );
                return Ok(Transition::Ignored);
            }
        };

        if new_modules.is_empty() {
            tracing::info!(level = %ticket.level, "generator has no more topics");
            self.last_error = Some(format!(
                "No more {} topics are available right now.",
                ticket.level
            ));
            return Ok(Transition::Ignored);
        }

        let first_new = modules.len();
        let added = new_modules.len();
        modules.extend(new_modules);
        save_json(&self.store, &modules_key(ticket.level), &modules)?;
        self.paths.insert(ticket.level, modules);
        tracing::info!(level = %ticket.level, added, "generated modules appended");

        self.show_archived = false;
        if self.active_level == Some(ticket.level) {
            self.viewed_module_index = first_new;
            self.expanded = None;
            self.persist_session()?;
        }
        Ok(Transition::Applied)
    }

    pub fn generate_more_modules<G: ContentGenerator + ?Sized>(
        &mut self,
        generator: &G,
    ) -> Result<Transition, PathError> {
        let Some(ticket) = self.begin_generate_more() else {
            return Ok(Transition::Ignored);
        };
        let result = generator.generate_modules(ticket.level, &ticket.existing_titles);
        self.finish_generate_more(ticket, result)
    }

    // ---- internals ----

    fn load_modules(&self, level: Level) -> Result<Option<Vec<Module>>, PathError> {
        if let Some(modules) = self.paths.get(&level) {
            return Ok(Some(modules.clone()));
        }
        Ok(load_or_heal(&self.store, &modules_key(level))?)
    }

    /// The stored list is the source of truth for read-modify-write, so
    /// overlapping generations never drop each other's content.
    fn latest_modules(&self, level: Level) -> Result<Vec<Module>, PathError> {
        match load_or_heal::<Vec<Module>, _>(&self.store, &modules_key(level))? {
            Some(modules) => Ok(modules),
            None => Ok(self.paths.get(&level).cloned().unwrap_or_default()),
        }
    }

    fn save_progress(&self) -> Result<(), PathError> {
        save_json(&self.store, PROGRESS_KEY, &self.progress).map_err(|e| {
            tracing::error!(error = %e, "failed to persist progress");
            PathError::from(e)
        })
    }

    fn is_targeted(&self, ticket: &LessonTicket) -> bool {
        self.active_level == Some(ticket.level)
            && self.expanded.as_ref().is_some_and(|e| e.step == ticket.step)
    }

    fn is_loading(&self, ticket: &LessonTicket) -> bool {
        self.is_targeted(ticket) && self.expanded.as_ref().is_some_and(|e| e.loading)
    }

    fn fail_lesson(
        &mut self,
        ticket: &LessonTicket,
        reason: &str,
    ) -> Result<LessonOutcome, PathError> {
        tracing::warn!(title = %ticket.title, reason, "step content generation failed");
        self.last_error = Some(format!(
            "Could not load \"{}\". Please try again.",
            ticket.title
        ));
        if self.is_loading(ticket) {
            self.expanded = None;
            self.persist_session()?;
        }
        Ok(LessonOutcome::Failed)
    }

    fn award(&mut self, activity: ActivityType) -> Result<(), PathError> {
        if let Some(notice) = self.points.award(activity)? {
            self.badge_notice = Some(notice);
        }
        Ok(())
    }

    fn persist_session(&mut self) -> Result<(), PathError> {
        if !self.restored {
            return Ok(());
        }

        let record = self.active_level.map(|level| SessionRecord {
            active_path_level: level,
            viewed_module_index: self.viewed_module_index,
            expanded_step: self.expanded.as_ref().map(|e| e.step),
        });
        if record == self.last_session {
            return Ok(());
        }

        match &record {
            Some(record) => save_json(&self.store, SESSION_KEY, record)?,
            None => self.store.remove(SESSION_KEY)?,
        }
        self.last_session = record;
        Ok(())
    }
}
