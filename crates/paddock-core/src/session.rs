//! Viewing session
//!
//! The session is the single owner of navigation state, the generation
//! counter, the measured extent, the camera pose and the attached
//! presentation instance with its spin task. It is driven from one thread:
//! transitions return a `PipelineRequest` for the caller to run, and the
//! caller feeds the outcome back through `complete`.
//!
//! Ordering on every transition: bump generation, cancel the spin task,
//! detach the old instance, clear extent, fall back the camera. A new
//! instance is only attached by `complete` for the current generation, so at
//! most one instance is ever attached.

use std::sync::Arc;

use glam::Quat;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::animator::{SpinTask, DEFAULT_SPIN_STEP};
use crate::catalogue::{CarDescriptor, Catalogue, Team};
use crate::framing::{frame, CameraPose, DEFAULT_FOV_DEGREES};
use crate::navigation::{Generation, NavigationState};
use crate::normalizer::Extent;
use crate::pipeline::{PipelineError, PipelineOutcome, PipelineRequest};
use crate::stage::{InstanceId, PresentationInstance, Stage};

const MIN_FOV_DEGREES: f32 = 1.0;
const MAX_FOV_DEGREES: f32 = 179.0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unknown team: {0}")]
    UnknownTeam(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub fov_degrees: f32,
    /// Yaw per tick in radians
    pub spin_step: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            fov_degrees: DEFAULT_FOV_DEGREES,
            spin_step: DEFAULT_SPIN_STEP,
        }
    }
}

impl SessionSettings {
    fn sanitized(self) -> Self {
        let mut settings = self;
        if !(MIN_FOV_DEGREES..=MAX_FOV_DEGREES).contains(&settings.fov_degrees) {
            let clamped = if settings.fov_degrees.is_finite() {
                settings.fov_degrees.clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES)
            } else {
                DEFAULT_FOV_DEGREES
            };
            warn!(fov = settings.fov_degrees, clamped, "Field of view out of range");
            settings.fov_degrees = clamped;
        }
        if !settings.spin_step.is_finite() {
            warn!("Spin step is not finite, using default");
            settings.spin_step = DEFAULT_SPIN_STEP;
        }
        settings
    }
}

/// What the overlay should currently show
#[derive(Debug, Clone)]
pub enum ViewStatus {
    Idle,
    Loading {
        generation: Generation,
        path: String,
    },
    Ready {
        generation: Generation,
        instance: InstanceId,
    },
    Failed {
        generation: Generation,
        path: String,
        error: PipelineError,
    },
}

impl ViewStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewStatus::Loading { .. })
    }
}

/// Result of feeding a pipeline outcome back into the session
#[derive(Debug, Clone)]
pub enum Completion {
    Applied(InstanceId),
    Discarded {
        stale: Generation,
        current: Generation,
    },
    Failed(PipelineError),
}

struct ActiveView {
    instance: PresentationInstance,
    spin: SpinTask,
}

pub struct ViewingSession {
    catalogue: Arc<Catalogue>,
    settings: SessionSettings,
    navigation: NavigationState,
    generation: Generation,
    extent: Option<Extent>,
    camera: CameraPose,
    active: Option<ActiveView>,
    status: ViewStatus,
}

impl ViewingSession {
    pub fn new(catalogue: Arc<Catalogue>, settings: SessionSettings) -> Self {
        let settings = settings.sanitized();
        Self {
            navigation: NavigationState::initial(&catalogue),
            catalogue,
            settings,
            generation: Generation::default(),
            extent: None,
            camera: CameraPose::fallback(settings.fov_degrees),
            active: None,
            status: ViewStatus::Idle,
        }
    }

    /// Request the first car of the first team
    pub fn start(&mut self, stage: &mut dyn Stage) -> PipelineRequest {
        info!(team = self.navigation.team_key(), "Starting viewing session");
        self.begin_transition(stage)
    }

    pub fn select_team(
        &mut self,
        key: &str,
        stage: &mut dyn Stage,
    ) -> Result<PipelineRequest, SessionError> {
        if !self.navigation.select_team(&self.catalogue, key) {
            return Err(SessionError::UnknownTeam(key.to_string()));
        }
        info!(team = key, "Selected team");
        Ok(self.begin_transition(stage))
    }

    pub fn next(&mut self, stage: &mut dyn Stage) -> PipelineRequest {
        self.navigation.next(&self.catalogue);
        self.begin_transition(stage)
    }

    pub fn previous(&mut self, stage: &mut dyn Stage) -> PipelineRequest {
        self.navigation.previous(&self.catalogue);
        self.begin_transition(stage)
    }

    pub fn toggle_info(&mut self) {
        self.navigation.toggle_info();
    }

    fn begin_transition(&mut self, stage: &mut dyn Stage) -> PipelineRequest {
        self.generation = self.generation.next();
        self.retire(stage);
        self.extent = None;
        self.camera = CameraPose::fallback(self.settings.fov_degrees);

        let path = self.navigation.car(&self.catalogue).path.clone();
        info!(
            generation = %self.generation,
            team = self.navigation.team_key(),
            car = self.navigation.car_index(),
            path = %path,
            "Transition started"
        );
        self.status = ViewStatus::Loading {
            generation: self.generation,
            path: path.clone(),
        };
        PipelineRequest {
            generation: self.generation,
            path,
        }
    }

    /// Cancel the spin task and detach the current instance, if any
    fn retire(&mut self, stage: &mut dyn Stage) {
        if let Some(mut active) = self.active.take() {
            active.spin.cancel();
            stage.detach(active.instance.id());
            debug!(instance = %active.instance.id(), "Detached presentation instance");
        }
    }

    /// Apply a finished pipeline run.
    ///
    /// Outcomes from an older generation are dropped without touching the
    /// stage. A failure leaves nothing attached and navigation usable.
    pub fn complete(&mut self, outcome: PipelineOutcome, stage: &mut dyn Stage) -> Completion {
        let PipelineOutcome { request, result } = outcome;
        if request.generation != self.generation {
            warn!(
                stale = %request.generation,
                current = %self.generation,
                path = %request.path,
                "Discarding stale pipeline result"
            );
            return Completion::Discarded {
                stale: request.generation,
                current: self.generation,
            };
        }

        match result {
            Ok(model) => {
                self.retire(stage);
                let instance = PresentationInstance::new(request.path, model);
                let extent = instance.extent();
                let id = instance.id();

                self.extent = Some(extent);
                self.camera = frame(extent, self.settings.fov_degrees);
                stage.attach(&instance);
                info!(
                    instance = %id,
                    path = instance.path(),
                    extent = extent.value(),
                    "Attached presentation instance"
                );

                self.active = Some(ActiveView {
                    spin: SpinTask::start(id, self.settings.spin_step),
                    instance,
                });
                self.status = ViewStatus::Ready {
                    generation: self.generation,
                    instance: id,
                };
                Completion::Applied(id)
            }
            Err(error) => {
                warn!(path = %request.path, error = %error, "Failed to present model");
                self.status = ViewStatus::Failed {
                    generation: self.generation,
                    path: request.path,
                    error: error.clone(),
                };
                Completion::Failed(error)
            }
        }
    }

    /// Advance the spin of the attached instance by one step
    pub fn tick(&mut self) -> Option<(InstanceId, Quat)> {
        let active = self.active.as_mut()?;
        let rotation = active.spin.tick()?;
        active.instance.set_orientation(rotation);
        Some((active.instance.id(), rotation))
    }

    /// Detach everything and cancel the spin task.
    ///
    /// Requests still in flight become stale and are discarded on completion.
    pub fn teardown(&mut self, stage: &mut dyn Stage) {
        self.generation = self.generation.next();
        self.retire(stage);
        self.extent = None;
        self.camera = CameraPose::fallback(self.settings.fov_degrees);
        self.status = ViewStatus::Idle;
        info!("Viewing session torn down");
    }

    pub fn catalogue(&self) -> &Arc<Catalogue> {
        &self.catalogue
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn extent(&self) -> Option<Extent> {
        self.extent
    }

    pub fn camera(&self) -> &CameraPose {
        &self.camera
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn instance(&self) -> Option<&PresentationInstance> {
        self.active.as_ref().map(|active| &active.instance)
    }

    pub fn current_team(&self) -> &Team {
        self.navigation.team(&self.catalogue)
    }

    pub fn current_car(&self) -> &CarDescriptor {
        self.navigation.car(&self.catalogue)
    }

    pub fn info_visible(&self) -> bool {
        self.navigation.info_visible()
    }
}
