//! LAGIM Simulation Core
//!
//! Headless ECS-симуляция combat/quest логики (strategic layer) на Bevy 0.16.
//!
//! Архитектура:
//! - ECS = strategic layer (health, AI FSM, damage rules, quest state)
//! - Presentation host = tactical layer (rendering, animation, audio playback,
//!   input polling, scene loading) — общается с ядром только через events

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod actors;
pub mod ai;
pub mod combat;
pub mod components;
pub mod fx;
pub mod logger;
pub mod quest;

// Re-export базовых типов для удобства
pub use actors::{ActorPlugin, KeyDrop, MonsterSpawner, RespawnPoint, RespawnTimer};
pub use ai::{AiPlugin, BehaviorConfig, BehaviorState};
pub use combat::{
    AttackIntent, AttackProfile, CombatPlugin, Damaged, Dead, DespawnAfter, EntityDied,
    HurtConfig, PendingDamage,
};
pub use components::*;
pub use fx::{AudioCue, CueKind, FxKind, FxPlugin, FxTrigger, ScheduledCues};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use quest::{
    KeyPickup, Portal, PortalActivated, PortalDenied, PortalLock, Quest, QuestLog, QuestPlugin,
    SceneTransitionRequest,
};

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            // Детерминистичный RNG; init, не insert — seed от
            // create_headless_app не перетираем
            .init_resource::<DeterministicRng>()
            // Подсистемы (strategic layer)
            .add_plugins((CombatPlugin, AiPlugin, ActorPlugin, QuestPlugin, FxPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Единственный источник случайности ядра: damage variance, crit rolls,
/// patrol directions, idle timers. Один seed ⇒ один прогон.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42) // Seed по умолчанию
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время шагает вручную: один app.update() == ровно один FixedUpdate тик.
/// Wall-clock в headless прогоне дал бы недетерминированное число шагов.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)) // 60Hz FixedUpdate
        .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
            // Чуть больше 1/60s, чтобы каждый update гарантированно делал шаг
            std::time::Duration::from_micros(16_667),
        ));

    app
}

/// Snapshot мира для сравнения детерминизма
///
/// Собирает компоненты типа T в детерминированный byte-формат
/// (сортировка по Entity ID, сериализация через Debug).
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
