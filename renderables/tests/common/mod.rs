//! Shared test infrastructure for hydration integration tests.
//!
//! Provides mock collaborators standing in for the render device, the
//! animator factory and the effect/texture libraries, plus a harness that
//! wires them to a runtime and records every pipeline outcome.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use redlilium_renderables::{
    AnimatorHandle, BuildModelAnimator, BuildModelAnimatorFailed, BuildRenderBuffer,
    BuildRenderBufferFailed, Descriptor, EffectMaterialId, EffectMaterialQuery, HydrationConfig,
    HydrationError, HydrationPipeline, MeshHydrated, MeshHydrationFailed, ModelAnimatorBuilt,
    ModelHydrated, ModelHydrationFailed, PrimitiveId, RenderBufferBuilt, RenderBufferHandle,
    TextureId, TextureQuery, Value,
};
use redlilium_runtime::{EventBus, Runtime};

pub fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

// ============================================================================
// Mock collaborators
// ============================================================================

/// How a mock collaborator answers the commands it receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Post a success event right away.
    Succeed,
    /// Post a failure event right away.
    Fail,
    /// Record the command only; the test completes it by hand.
    Manual,
}

/// Answers `BuildRenderBuffer` commands.
pub struct MockRenderDevice {
    events: Arc<EventBus>,
    mode: Mutex<Mode>,
    requests: Mutex<Vec<String>>,
    next_handle: AtomicU64,
}

impl MockRenderDevice {
    pub fn install(runtime: &Runtime, mode: Mode) -> Arc<Self> {
        let device = Arc::new(Self {
            events: runtime.events().clone(),
            mode: Mutex::new(mode),
            requests: Mutex::new(Vec::new()),
            next_handle: AtomicU64::new(1),
        });
        let weak = Arc::downgrade(&device);
        runtime.commands().subscribe(move |command: &BuildRenderBuffer| {
            if let Some(device) = weak.upgrade() {
                device.on_build(command);
            }
        });
        device
    }

    fn on_build(&self, command: &BuildRenderBuffer) {
        let name = command.signature.name.clone();
        self.requests.lock().push(name.clone());
        match *self.mode.lock() {
            Mode::Succeed => self.complete(&name),
            Mode::Fail => self.fail(&name, "out of device memory"),
            Mode::Manual => {}
        }
    }

    pub fn set_mode(&self, mode: Mode) {
        *self.mode.lock() = mode;
    }

    /// Names of every render buffer requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn complete(&self, name: &str) {
        let handle = RenderBufferHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.events.post(RenderBufferBuilt {
            name: name.to_owned(),
            handle,
        });
    }

    pub fn fail(&self, name: &str, error: &str) {
        self.events.post(BuildRenderBufferFailed {
            name: name.to_owned(),
            error: error.to_owned(),
        });
    }
}

/// Answers `BuildModelAnimator` commands.
pub struct MockAnimatorFactory {
    events: Arc<EventBus>,
    mode: Mutex<Mode>,
    requests: Mutex<Vec<(String, PrimitiveId)>>,
}

impl MockAnimatorFactory {
    pub fn install(runtime: &Runtime, mode: Mode) -> Arc<Self> {
        let factory = Arc::new(Self {
            events: runtime.events().clone(),
            mode: Mutex::new(mode),
            requests: Mutex::new(Vec::new()),
        });
        let weak = Arc::downgrade(&factory);
        runtime.commands().subscribe(move |command: &BuildModelAnimator| {
            if let Some(factory) = weak.upgrade() {
                factory.on_build(command);
            }
        });
        factory
    }

    fn on_build(&self, command: &BuildModelAnimator) {
        self.requests
            .lock()
            .push((command.name.clone(), command.model.clone()));
        match *self.mode.lock() {
            Mode::Succeed => self.events.post(ModelAnimatorBuilt {
                name: command.name.clone(),
                handle: AnimatorHandle(7),
            }),
            Mode::Fail => self.events.post(BuildModelAnimatorFailed {
                name: command.name.clone(),
                error: "missing skeleton".to_owned(),
            }),
            Mode::Manual => {}
        }
    }

    pub fn set_mode(&self, mode: Mode) {
        *self.mode.lock() = mode;
    }

    pub fn requests(&self) -> Vec<(String, PrimitiveId)> {
        self.requests.lock().clone()
    }
}

/// Effect material and texture libraries: a set of already-loaded ids.
#[derive(Default)]
pub struct Catalog {
    effects: Mutex<HashSet<String>>,
    textures: Mutex<HashSet<String>>,
}

impl Catalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn mark_effect_ready(&self, id: &str) {
        self.effects.lock().insert(id.to_owned());
    }

    pub fn mark_texture_ready(&self, id: &str) {
        self.textures.lock().insert(id.to_owned());
    }

    pub fn effect_query(self: &Arc<Self>) -> Arc<dyn EffectMaterialQuery> {
        let catalog = self.clone();
        Arc::new(move |id: &EffectMaterialId| catalog.effects.lock().contains(id.as_str()))
    }

    pub fn texture_query(self: &Arc<Self>) -> Arc<dyn TextureQuery> {
        let catalog = self.clone();
        Arc::new(move |id: &TextureId| catalog.textures.lock().contains(id.as_str()))
    }
}

// ============================================================================
// Harness
// ============================================================================

/// What the pipeline published, in publication order.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    MeshHydrated(PrimitiveId),
    MeshFailed(PrimitiveId, HydrationError),
    ModelHydrated(PrimitiveId),
    ModelFailed(PrimitiveId, HydrationError),
}

pub struct Harness {
    pub runtime: Runtime,
    pub pipeline: Arc<HydrationPipeline>,
    pub device: Arc<MockRenderDevice>,
    pub animators: Arc<MockAnimatorFactory>,
    pub catalog: Arc<Catalog>,
    outcomes: Arc<Mutex<Vec<Outcome>>>,
}

impl Harness {
    pub fn new(mode: Mode) -> Self {
        Self::with_config(mode, HydrationConfig::default())
    }

    pub fn with_config(mode: Mode, config: HydrationConfig) -> Self {
        init_logging();
        let mut runtime = Runtime::new();
        let catalog = Catalog::new();
        let device = MockRenderDevice::install(&runtime, mode);
        let animators = MockAnimatorFactory::install(&runtime, Mode::Succeed);
        let pipeline = Arc::new(HydrationPipeline::for_runtime(
            &runtime,
            catalog.effect_query(),
            catalog.texture_query(),
            config,
        ));
        runtime.register_service(pipeline.clone());

        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let events = runtime.events().clone();
        let o = outcomes.clone();
        events.subscribe(move |e: &MeshHydrated| o.lock().push(Outcome::MeshHydrated(e.id.clone())));
        let o = outcomes.clone();
        events.subscribe(move |e: &MeshHydrationFailed| {
            o.lock()
                .push(Outcome::MeshFailed(e.id.clone(), e.error.clone()))
        });
        let o = outcomes.clone();
        events.subscribe(move |e: &ModelHydrated| {
            o.lock().push(Outcome::ModelHydrated(e.id.clone()))
        });
        let o = outcomes.clone();
        events.subscribe(move |e: &ModelHydrationFailed| {
            o.lock()
                .push(Outcome::ModelFailed(e.id.clone(), e.error.clone()))
        });

        Self {
            runtime,
            pipeline,
            device,
            animators,
            catalog,
            outcomes,
        }
    }

    pub fn tick(&mut self) {
        self.runtime.run_once();
    }

    pub fn ticks(&mut self, count: usize) {
        for _ in 0..count {
            self.tick();
        }
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.lock().clone()
    }

    /// Ticks until `done` holds for the recorded outcomes. Returns the number
    /// of ticks it took; panics after `max_ticks`.
    pub fn run_until(&mut self, max_ticks: usize, done: impl Fn(&[Outcome]) -> bool) -> usize {
        for tick in 1..=max_ticks {
            self.tick();
            if done(&self.outcomes.lock()) {
                return tick;
            }
        }
        panic!(
            "condition not reached after {max_ticks} ticks; outcomes: {:?}",
            self.outcomes()
        );
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// A mesh descriptor. `buffer_name` `None` leaves `Geometry.Name` out, so
/// the buffer is named after the primitive id.
pub fn mesh_descriptor(
    buffer_name: Option<&str>,
    effects: &[&str],
    textures: &[&str],
) -> Descriptor {
    let mut geometry = Descriptor::new()
        .with("VertexFormat", "xyz_nor_tex1")
        .with("VertexSize", 32)
        .with("VertexCapacity", 24)
        .with("IndexCapacity", 36);
    if let Some(name) = buffer_name {
        geometry.insert("Name", name);
    }

    let mut descriptor = Descriptor::new()
        .with("Geometry", geometry)
        .with("Effects", effects.to_vec());
    if !textures.is_empty() {
        let slots: Vec<Value> = textures
            .iter()
            .map(|texture| {
                Descriptor::new()
                    .with("Semantic", "DiffuseMap")
                    .with("TextureId", *texture)
                    .into()
            })
            .collect();
        descriptor.insert("TextureMaps", Value::List(vec![Value::List(slots)]));
    }
    descriptor
}

/// A model descriptor: a transform-only root plus one mesh node per entry
/// of `meshes` (`(node name, effects, textures)`), each parented to the root.
pub fn model_descriptor(meshes: &[(&str, &[&str], &[&str])], animator: Option<&str>) -> Descriptor {
    let mut nodes = vec![Value::from(Descriptor::new().with("Name", "root"))];
    for (name, effects, textures) in meshes {
        nodes.push(
            Descriptor::new()
                .with("Name", *name)
                .with("Parent", 0)
                .with("Mesh", mesh_descriptor(None, effects, textures))
                .into(),
        );
    }
    let mut descriptor = Descriptor::new().with("MeshNodes", nodes);
    if let Some(name) = animator {
        descriptor.insert("Animator", Descriptor::new().with("Name", name));
    }
    descriptor
}
