use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use redlilium_runtime::{
    CommandBus, EventBus, Runtime, ServiceError, ServiceResult, Subscription, SystemService,
};

use super::mesh::{FailedDependencies, MeshPlan};
use super::model::ModelPlan;
use super::plan::{MeshLayout, ModelLayout};
use super::queue::BuildQueue;
use super::{HydrationTarget, ResourceClass};
use crate::catalog::{EffectMaterialQuery, TextureQuery};
use crate::config::HydrationConfig;
use crate::constitutor::MeshConstitutor;
use crate::descriptor::Descriptor;
use crate::error::HydrationError;
use crate::id::PrimitiveId;
use crate::messages::{
    BuildModelAnimator, BuildModelAnimatorFailed, BuildRenderBuffer, BuildRenderBufferFailed,
    ConstituteMesh, EffectMaterialHydrated, HydrateEffectMaterialFailed, HydrateMesh, HydrateModel,
    HydrateTextureFailed, MeshHydrated, MeshHydrationFailed, ModelAnimatorBuilt, ModelHydrated,
    ModelHydrationFailed, RenderBufferBuilt, TextureHydrated,
};
use crate::primitive::{MeshPrimitive, ModelPrimitive};
use crate::readiness::Readiness;

/// Builds mesh and model primitives from descriptors.
///
/// # Flow
///
/// 1. [`request_hydration`](Self::request_hydration) validates the
///    descriptor, queues a plan and marks the target `Queued`.
/// 2. On its next tick the pipeline makes the head plan of each class
///    current, marks it `Loading` and posts [`BuildRenderBuffer`] (meshes)
///    or queues one child mesh plan per mesh node (models).
/// 3. Completion events are matched against the current plan only.
///    When the render buffer arrives, effects and textures that are
///    already loaded are resolved through the catalog queries; the others
///    are waited for.
/// 4. Once every declared sub-resource is available the target is
///    finalized, marked `Ready` and [`MeshHydrated`] / [`ModelHydrated`] is
///    posted. The next tick starts the following plan.
/// 5. The first failure posts [`MeshHydrationFailed`] /
///    [`ModelHydrationFailed`] and discards the plan; the target keeps its
///    previous contents and records the error. Effect and texture failures
///    are remembered until the matching completion event, so a plan that
///    declares one fails as soon as it is promoted.
///
/// At most one plan per [`ResourceClass`] is current at any time. A model
/// finishes its children before requesting its animator.
///
/// The pipeline subscribes to its events and commands when the scheduler
/// initializes it and unsubscribes when it terminates. Plans still queued
/// or in progress at that point fail with [`HydrationError::Stopped`].
///
/// Custom mesh kinds are added with
/// [`register_mesh_kind`](Self::register_mesh_kind) and share the mesh
/// queue.
///
/// # Example
///
/// ```ignore
/// let pipeline = Arc::new(HydrationPipeline::for_runtime(
///     &runtime,
///     effect_library.clone(),
///     texture_library.clone(),
///     HydrationConfig::default(),
/// ));
/// runtime.register_service(pipeline.clone());
///
/// let mesh = Arc::new(MeshPrimitive::new("crate"));
/// pipeline.request_hydration("crate", mesh.clone(), &descriptor)?;
/// ```
pub struct HydrationPipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    events: Arc<EventBus>,
    commands: Arc<CommandBus>,
    effects: Arc<dyn EffectMaterialQuery>,
    textures: Arc<dyn TextureQuery>,
    config: HydrationConfig,
    kinds: Mutex<HashMap<String, Arc<dyn MeshConstitutor>>>,
    state: Mutex<PipelineState>,
    subscriptions: Mutex<Subscriptions>,
}

struct PipelineState {
    meshes: BuildQueue<MeshPlan>,
    models: BuildQueue<ModelPlan>,
    mesh_cache: HashMap<PrimitiveId, Arc<MeshPrimitive>>,
    model_cache: HashMap<PrimitiveId, Arc<ModelPrimitive>>,
    failed: FailedDependencies,
}

#[derive(Default)]
struct Subscriptions {
    events: Vec<Subscription>,
    commands: Vec<Subscription>,
}

impl HydrationPipeline {
    pub fn new(
        events: Arc<EventBus>,
        commands: Arc<CommandBus>,
        effects: Arc<dyn EffectMaterialQuery>,
        textures: Arc<dyn TextureQuery>,
        config: HydrationConfig,
    ) -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                events,
                commands,
                effects,
                textures,
                config,
                kinds: Mutex::new(HashMap::new()),
                state: Mutex::new(PipelineState {
                    meshes: BuildQueue::new(),
                    models: BuildQueue::new(),
                    mesh_cache: HashMap::new(),
                    model_cache: HashMap::new(),
                    failed: FailedDependencies::default(),
                }),
                subscriptions: Mutex::new(Subscriptions::default()),
            }),
        }
    }

    /// Creates a pipeline wired to the buses of `runtime`.
    pub fn for_runtime(
        runtime: &Runtime,
        effects: Arc<dyn EffectMaterialQuery>,
        textures: Arc<dyn TextureQuery>,
        config: HydrationConfig,
    ) -> Self {
        Self::new(
            runtime.events().clone(),
            runtime.commands().clone(),
            effects,
            textures,
            config,
        )
    }

    /// Queues the hydration of `target` from `descriptor`.
    ///
    /// - An id already hydrated and cached completes on the next event
    ///   drain without rebuilding; `target` receives the cached contents.
    /// - An id already queued or in progress is not queued twice; `target`
    ///   is populated by the build in flight.
    /// - A descriptor missing a required key, or holding one of the wrong
    ///   shape, is rejected here and nothing is queued.
    ///
    /// `id` must be the target's own id.
    pub fn request_hydration(
        &self,
        id: impl Into<PrimitiveId>,
        target: impl Into<HydrationTarget>,
        descriptor: &Descriptor,
    ) -> Result<(), HydrationError> {
        let id = id.into();
        let target = target.into();
        log::trace!("{} `{id}` hydration requested", target.class());
        match target {
            HydrationTarget::Mesh(mesh) => self.inner.request_mesh(id, mesh, descriptor),
            HydrationTarget::Model(model) => self.inner.request_model(id, model, descriptor),
        }
    }

    /// Registers the mesh kind `kind`, replacing an earlier registration.
    pub fn register_mesh_kind(
        &self,
        kind: impl Into<String>,
        constitutor: impl MeshConstitutor + 'static,
    ) {
        let kind = kind.into();
        let previous = self
            .inner
            .kinds
            .lock()
            .insert(kind.clone(), Arc::new(constitutor));
        if previous.is_some() {
            log::warn!("mesh kind `{kind}` registered again; the new constitutor wins");
        } else {
            log::debug!("mesh kind `{kind}` registered");
        }
    }

    pub fn has_mesh_kind(&self, kind: &str) -> bool {
        self.inner.kinds.lock().contains_key(kind)
    }

    /// Creates a mesh of the registered kind `kind` and queues its hydration.
    ///
    /// The kind's constitutor turns `descriptor` into a mesh descriptor,
    /// which is then handled like [`request_hydration`](Self::request_hydration).
    pub fn constitute_mesh(
        &self,
        kind: &str,
        id: impl Into<PrimitiveId>,
        descriptor: &Descriptor,
    ) -> Result<Arc<MeshPrimitive>, HydrationError> {
        self.inner.constitute_mesh(kind, id.into(), descriptor)
    }

    /// Number of plans of `class` waiting behind the current one.
    pub fn queued_len(&self, class: ResourceClass) -> usize {
        let state = self.inner.state.lock();
        match class {
            ResourceClass::Mesh => state.meshes.queued_len(),
            ResourceClass::Model => state.models.queued_len(),
        }
    }

    /// Id of the plan of `class` in progress.
    pub fn current(&self, class: ResourceClass) -> Option<PrimitiveId> {
        let state = self.inner.state.lock();
        match class {
            ResourceClass::Mesh => state.meshes.current().map(|p| p.id.clone()),
            ResourceClass::Model => state.models.current().map(|p| p.id.clone()),
        }
    }

    pub fn cached_mesh(&self, id: &PrimitiveId) -> Option<Arc<MeshPrimitive>> {
        self.inner.state.lock().mesh_cache.get(id).cloned()
    }

    pub fn cached_model(&self, id: &PrimitiveId) -> Option<Arc<ModelPrimitive>> {
        self.inner.state.lock().model_cache.get(id).cloned()
    }

    /// Forgets the cached primitive `id`, so the next request rebuilds it.
    pub fn evict(&self, id: &PrimitiveId) -> bool {
        let mut state = self.inner.state.lock();
        let mesh = state.mesh_cache.remove(id).is_some();
        let model = state.model_cache.remove(id).is_some();
        mesh || model
    }
}

impl SystemService for HydrationPipeline {
    fn name(&self) -> &'static str {
        "HydrationPipeline"
    }

    fn on_init(&self) -> Result<ServiceResult, ServiceError> {
        self.inner.subscribe_all();
        Ok(ServiceResult::Complete)
    }

    fn needs_tick(&self) -> bool {
        let state = self.inner.state.lock();
        state.meshes.has_pending() || state.models.has_pending()
    }

    fn on_tick(&self) -> ServiceResult {
        self.inner.tick();
        ServiceResult::Pending
    }

    fn on_term(&self) {
        self.inner.unsubscribe_all();
        self.inner.stop();
    }
}

/// Wraps a pipeline method into a bus handler that holds the pipeline weakly.
fn handler<M: 'static>(
    inner: Weak<PipelineInner>,
    f: fn(&PipelineInner, &M),
) -> impl Fn(&M) + Send + Sync + 'static {
    move |message: &M| {
        if let Some(inner) = inner.upgrade() {
            f(&inner, message);
        }
    }
}

impl PipelineInner {
    fn subscribe_all(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let events = &self.events;
        let commands = &self.commands;

        let mut subscriptions = self.subscriptions.lock();
        subscriptions.events.extend([
            events.subscribe(handler(weak.clone(), Self::on_render_buffer_built)),
            events.subscribe(handler(weak.clone(), Self::on_render_buffer_failed)),
            events.subscribe(handler(weak.clone(), Self::on_effect_hydrated)),
            events.subscribe(handler(weak.clone(), Self::on_effect_failed)),
            events.subscribe(handler(weak.clone(), Self::on_texture_hydrated)),
            events.subscribe(handler(weak.clone(), Self::on_texture_failed)),
            events.subscribe(handler(weak.clone(), Self::on_mesh_hydrated)),
            events.subscribe(handler(weak.clone(), Self::on_mesh_failed)),
            events.subscribe(handler(weak.clone(), Self::on_animator_built)),
            events.subscribe(handler(weak.clone(), Self::on_animator_failed)),
        ]);
        subscriptions.commands.extend([
            commands.subscribe(handler(weak.clone(), Self::on_hydrate_mesh)),
            commands.subscribe(handler(weak.clone(), Self::on_hydrate_model)),
            commands.subscribe(handler(weak, Self::on_constitute_mesh)),
        ]);
    }

    fn unsubscribe_all(&self) {
        let mut subscriptions = self.subscriptions.lock();
        for subscription in subscriptions.events.drain(..) {
            self.events.unsubscribe(&subscription);
        }
        for subscription in subscriptions.commands.drain(..) {
            self.commands.unsubscribe(&subscription);
        }
    }

    /// Fails every unfinished plan, current ones first.
    fn stop(&self) {
        let mut state = self.state.lock();
        let models = state.models.take_all();
        let meshes = state.meshes.take_all();
        drop(state);

        let dropped = models.len() + meshes.len();
        if dropped > 0 {
            log::warn!("hydration pipeline stopped with {dropped} unfinished plan(s)");
        }
        for plan in models {
            for target in plan.targets() {
                target.record_failure(HydrationError::Stopped);
            }
            self.events.post(ModelHydrationFailed {
                id: plan.id,
                error: HydrationError::Stopped,
            });
        }
        for plan in meshes {
            for target in plan.targets() {
                target.record_failure(HydrationError::Stopped);
            }
            self.events.post(MeshHydrationFailed {
                id: plan.id,
                error: HydrationError::Stopped,
            });
        }
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    fn request_mesh(
        &self,
        id: PrimitiveId,
        target: Arc<MeshPrimitive>,
        descriptor: &Descriptor,
    ) -> Result<(), HydrationError> {
        debug_assert_eq!(target.id(), &id, "hydration target does not match the id");
        let layout = MeshLayout::parse(&id, descriptor).map_err(|err| {
            log::error!("mesh `{id}` rejected: {err}");
            HydrationError::from(err)
        })?;
        let mut state = self.state.lock();
        self.submit_mesh(&mut state, id, target, layout);
        Ok(())
    }

    fn request_model(
        &self,
        id: PrimitiveId,
        target: Arc<ModelPrimitive>,
        descriptor: &Descriptor,
    ) -> Result<(), HydrationError> {
        debug_assert_eq!(target.id(), &id, "hydration target does not match the id");
        let layout = ModelLayout::parse(&id, descriptor).map_err(|err| {
            log::error!("model `{id}` rejected: {err}");
            HydrationError::from(err)
        })?;

        let mut state = self.state.lock();
        if let Some(cached) = state.model_cache.get(&id).cloned() {
            if !Arc::ptr_eq(&cached, &target) {
                target.adopt(&cached);
            }
            log::debug!("model `{id}` served from cache");
            self.events.post(ModelHydrated { id, model: target });
            return Ok(());
        }
        if let Some(plan) = state.models.find_mut(&id) {
            if !Arc::ptr_eq(&plan.target, &target) {
                target.set_readiness(plan.target.readiness());
                plan.add_waiter(target);
            }
            log::debug!("model `{id}` already in flight; request coalesced");
            return Ok(());
        }

        target.set_readiness(Readiness::Queued);
        state.models.push(ModelPlan::new(id.clone(), target, layout));
        log::debug!(
            "model `{id}` queued ({} waiting)",
            state.models.queued_len()
        );
        Ok(())
    }

    /// Serves `id` from the cache, joins it to the plan in flight, or queues
    /// a new plan.
    fn submit_mesh(
        &self,
        state: &mut PipelineState,
        id: PrimitiveId,
        target: Arc<MeshPrimitive>,
        layout: MeshLayout,
    ) {
        if let Some(cached) = state.mesh_cache.get(&id).cloned() {
            if !Arc::ptr_eq(&cached, &target) {
                target.adopt(&cached);
            }
            log::debug!("mesh `{id}` served from cache");
            self.events.post(MeshHydrated { id, mesh: target });
            return;
        }
        if let Some(plan) = state.meshes.find_mut(&id) {
            if !Arc::ptr_eq(&plan.target, &target) {
                target.set_readiness(plan.target.readiness());
                plan.add_waiter(target);
            }
            log::debug!("mesh `{id}` already in flight; request coalesced");
            return;
        }

        target.set_readiness(Readiness::Queued);
        state.meshes.push(MeshPlan::new(id.clone(), target, layout));
        log::debug!("mesh `{id}` queued ({} waiting)", state.meshes.queued_len());
    }

    fn constitute_mesh(
        &self,
        kind: &str,
        id: PrimitiveId,
        descriptor: &Descriptor,
    ) -> Result<Arc<MeshPrimitive>, HydrationError> {
        let Some(constitutor) = self.kinds.lock().get(kind).cloned() else {
            log::error!("mesh `{id}` rejected: unknown mesh kind `{kind}`");
            return Err(HydrationError::UnknownMeshKind {
                kind: kind.to_owned(),
            });
        };
        let descriptor = constitutor.constitute(&id, descriptor).map_err(|err| {
            log::error!("{kind} `{id}` rejected: {err}");
            HydrationError::from(err)
        })?;

        let target = Arc::new(MeshPrimitive::with_kind(id.clone(), kind));
        self.request_mesh(id, target.clone(), &descriptor)?;
        Ok(target)
    }

    fn on_constitute_mesh(&self, command: &ConstituteMesh) {
        let result = self.constitute_mesh(&command.kind, command.id.clone(), &command.descriptor);
        if let Err(error) = result {
            self.events.post(MeshHydrationFailed {
                id: command.id.clone(),
                error,
            });
        }
    }

    fn on_hydrate_mesh(&self, command: &HydrateMesh) {
        let result =
            self.request_mesh(command.id.clone(), command.target.clone(), &command.descriptor);
        if let Err(error) = result {
            command.target.record_failure(error.clone());
            self.events.post(MeshHydrationFailed {
                id: command.id.clone(),
                error,
            });
        }
    }

    fn on_hydrate_model(&self, command: &HydrateModel) {
        let result =
            self.request_model(command.id.clone(), command.target.clone(), &command.descriptor);
        if let Err(error) = result {
            command.target.record_failure(error.clone());
            self.events.post(ModelHydrationFailed {
                id: command.id.clone(),
                error,
            });
        }
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Starts the next plan of every idle class. Models go first so their
    /// child meshes can start in the same tick.
    fn tick(&self) {
        let mut state = self.state.lock();
        self.start_next_model(&mut state);
        self.start_next_mesh(&mut state);
    }

    fn start_next_model(&self, state: &mut PipelineState) {
        let Some(plan) = state.models.promote() else {
            return;
        };
        for target in plan.targets() {
            target.set_readiness(Readiness::Loading);
        }
        let children = plan.start();
        log::debug!(
            "model `{}` started with {} child mesh(es)",
            plan.id,
            children.len()
        );

        for child in children {
            self.submit_mesh(state, child.id, child.target, child.layout);
        }
        self.advance_model(state);
    }

    /// Promotes the next mesh plan. Plans declaring a sub-resource that is
    /// known to have failed fail right away and the following one is tried.
    fn start_next_mesh(&self, state: &mut PipelineState) {
        while let Some(plan) = state.meshes.promote() {
            if let Some(error) = state.failed.first_failure(&plan.layout) {
                self.fail_mesh(state, error);
                continue;
            }
            self.start_mesh(plan);
            return;
        }
    }

    fn start_mesh(&self, plan: &MeshPlan) {
        for target in plan.targets() {
            target.set_readiness(Readiness::Loading);
        }
        log::debug!(
            "mesh `{}` started; building render buffer `{}`",
            plan.id,
            plan.layout.signature.name
        );
        self.commands.post(BuildRenderBuffer {
            signature: plan.layout.signature.clone(),
        });
    }

    // -----------------------------------------------------------------------
    // Mesh completions
    // -----------------------------------------------------------------------

    fn on_render_buffer_built(&self, event: &RenderBufferBuilt) {
        let mut state = self.state.lock();
        let Some(plan) = state.meshes.current_mut() else {
            return;
        };
        if plan.layout.signature.name != event.name || plan.join.buffer().is_some() {
            return;
        }

        plan.join.link_buffer(event.handle);
        for target in plan.targets() {
            target.link_render_buffer(event.handle);
        }
        plan.join
            .resolve_loaded(self.effects.as_ref(), self.textures.as_ref());
        log::debug!(
            "mesh `{}` linked render buffer `{}`; {} sub-resource(s) outstanding",
            plan.id,
            event.name,
            plan.join.outstanding()
        );
        self.try_complete_mesh(&mut state);
    }

    fn on_render_buffer_failed(&self, event: &BuildRenderBufferFailed) {
        let mut state = self.state.lock();
        let matches = state
            .meshes
            .current()
            .is_some_and(|p| p.layout.signature.name == event.name);
        if matches {
            self.fail_mesh(
                &mut state,
                HydrationError::RenderBuffer {
                    name: event.name.clone(),
                    message: event.error.clone(),
                },
            );
        }
    }

    fn on_effect_hydrated(&self, event: &EffectMaterialHydrated) {
        let mut state = self.state.lock();
        state.failed.effect_recovered(&event.id);
        if let Some(plan) = state.meshes.current_mut() {
            if plan.join.effect_ready(&event.id) {
                self.try_complete_mesh(&mut state);
            }
        }
    }

    fn on_effect_failed(&self, event: &HydrateEffectMaterialFailed) {
        let mut state = self.state.lock();
        state.failed.effect_failed(&event.id, &event.error);
        let matches = state
            .meshes
            .current()
            .is_some_and(|p| p.join.waits_on_effect(&event.id));
        if matches {
            self.fail_mesh(
                &mut state,
                HydrationError::EffectMaterial {
                    id: event.id.clone(),
                    message: event.error.clone(),
                },
            );
        }
    }

    fn on_texture_hydrated(&self, event: &TextureHydrated) {
        let mut state = self.state.lock();
        state.failed.texture_recovered(&event.id);
        if let Some(plan) = state.meshes.current_mut() {
            if plan.join.texture_ready(&event.id) {
                self.try_complete_mesh(&mut state);
            }
        }
    }

    fn on_texture_failed(&self, event: &HydrateTextureFailed) {
        let mut state = self.state.lock();
        state.failed.texture_failed(&event.id, &event.error);
        let matches = state
            .meshes
            .current()
            .is_some_and(|p| p.join.waits_on_texture(&event.id));
        if matches {
            self.fail_mesh(
                &mut state,
                HydrationError::Texture {
                    id: event.id.clone(),
                    message: event.error.clone(),
                },
            );
        }
    }

    fn try_complete_mesh(&self, state: &mut PipelineState) {
        let Some(contents) = state
            .meshes
            .current()
            .filter(|p| p.join.is_complete())
            .and_then(MeshPlan::contents)
        else {
            return;
        };
        let Some(plan) = state.meshes.take_current() else {
            return;
        };

        for target in plan.targets() {
            target.finalize(contents.clone());
        }
        if self.config.cache_hydrated {
            state.mesh_cache.insert(plan.id.clone(), plan.target.clone());
        }
        log::info!("mesh `{}` hydrated", plan.id);
        self.events.post(MeshHydrated {
            id: plan.id,
            mesh: plan.target,
        });
    }

    fn fail_mesh(&self, state: &mut PipelineState, error: HydrationError) {
        let Some(plan) = state.meshes.take_current() else {
            return;
        };
        log::error!("mesh `{}` hydration failed: {error}", plan.id);
        for target in plan.targets() {
            target.record_failure(error.clone());
        }
        self.events.post(MeshHydrationFailed { id: plan.id, error });
    }

    // -----------------------------------------------------------------------
    // Model completions
    // -----------------------------------------------------------------------

    fn on_mesh_hydrated(&self, event: &MeshHydrated) {
        let mut state = self.state.lock();
        if let Some(plan) = state.models.current_mut() {
            if plan.child_ready(&event.id) {
                self.advance_model(&mut state);
            }
        }
    }

    fn on_mesh_failed(&self, event: &MeshHydrationFailed) {
        let mut state = self.state.lock();
        let matches = state
            .models
            .current()
            .is_some_and(|p| p.waits_on_child(&event.id));
        if matches {
            self.fail_model(
                &mut state,
                HydrationError::ChildMesh {
                    id: event.id.clone(),
                    source: Box::new(event.error.clone()),
                },
            );
        }
    }

    fn on_animator_built(&self, event: &ModelAnimatorBuilt) {
        let mut state = self.state.lock();
        if let Some(plan) = state.models.current_mut() {
            if plan.waits_on_animator(&event.name) {
                plan.link_animator(event.handle);
                self.advance_model(&mut state);
            }
        }
    }

    fn on_animator_failed(&self, event: &BuildModelAnimatorFailed) {
        let mut state = self.state.lock();
        let matches = state
            .models
            .current()
            .is_some_and(|p| p.waits_on_animator(&event.name));
        if matches {
            self.fail_model(
                &mut state,
                HydrationError::ModelAnimator {
                    name: event.name.clone(),
                    message: event.error.clone(),
                },
            );
        }
    }

    /// Requests the animator once the children are ready, or finalizes the
    /// model once everything is.
    fn advance_model(&self, state: &mut PipelineState) {
        let Some(plan) = state.models.current_mut() else {
            return;
        };
        if let Some(name) = plan.animator_to_request() {
            let command = BuildModelAnimator {
                name: name.to_owned(),
                model: plan.id.clone(),
            };
            plan.mark_animator_requested();
            log::debug!("model `{}` building animator `{}`", plan.id, command.name);
            self.commands.post(command);
            return;
        }
        if !plan.is_complete() {
            return;
        }
        let Some(plan) = state.models.take_current() else {
            return;
        };

        let contents = plan.contents();
        for target in plan.targets() {
            target.finalize(contents.clone());
        }
        if self.config.cache_hydrated {
            state.model_cache.insert(plan.id.clone(), plan.target.clone());
        }
        log::info!("model `{}` hydrated", plan.id);
        self.events.post(ModelHydrated {
            id: plan.id,
            model: plan.target,
        });
    }

    fn fail_model(&self, state: &mut PipelineState, error: HydrationError) {
        let Some(plan) = state.models.take_current() else {
            return;
        };
        log::error!("model `{}` hydration failed: {error}", plan.id);
        for target in plan.targets() {
            target.record_failure(error.clone());
        }
        self.events.post(ModelHydrationFailed { id: plan.id, error });
    }
}
