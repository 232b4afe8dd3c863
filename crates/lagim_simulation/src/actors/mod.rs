//! Архетипы акторов + capability компоненты
//!
//! Один generic combat core, per-архетипные различия — конфигурация
//! (AttackProfile, BehaviorConfig, HurtConfig) плюс capability компоненты
//! через композицию, не наследование:
//! - KeyDrop (Ghost, Sulyap): дроп ключа при смерти
//! - MonsterSpawner (Kamatayan): периодический спавн миньонов пока жив
//! - RespawnPoint (Player): respawn вместо despawn
//!
//! Spawn-функции — constructor injection: entity собирается сразу со всеми
//! компонентами, никакого runtime-поиска зависимостей.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::BehaviorConfig;
use crate::combat::{AttackProfile, Dead, HurtConfig, PendingDamage};
use crate::components::{
    Actor, Health, HomePosition, MovementSpeed, PlayerControlled, HOSTILE_FACTION, PLAYER_FACTION,
};
use crate::fx::{FxKind, FxTrigger, ScheduledCues};
use crate::DeterministicRng;

/// Сколько труп врага лежит до despawn (fade-out на стороне presentation)
pub const CORPSE_LINGER: f32 = 2.0;

/// Задержка respawn игрока после смерти (секунды)
pub const PLAYER_RESPAWN_DELAY: f32 = 2.0;

/// Интервал спавна миньонов Kamatayan (секунды)
const MINION_SPAWN_INTERVAL: f32 = 4.0;

/// Capability: дроп ключа при смерти владельца
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct KeyDrop {
    /// Смещение точки дропа от позиции трупа
    pub offset: Vec3,
}

impl Default for KeyDrop {
    fn default() -> Self {
        Self { offset: Vec3::ZERO }
    }
}

/// Capability: периодический спавн миньонов (Kamatayan)
///
/// Тикает только пока владелец жив; смерть останавливает спавн навсегда.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct MonsterSpawner {
    /// Интервал между спавнами (секунды)
    pub interval: f32,
    /// Оставшееся время до следующего спавна
    pub timer: f32,
    /// Смещение точки спавна от владельца
    pub spawn_offset: Vec3,
}

impl MonsterSpawner {
    pub fn new(interval: f32, spawn_offset: Vec3) -> Self {
        assert!(interval > 0.0, "MonsterSpawner: interval должен быть > 0");
        Self {
            interval,
            // Первый миньон сразу (как исходный spawn-цикл)
            timer: 0.0,
            spawn_offset,
        }
    }
}

impl Default for MonsterSpawner {
    fn default() -> Self {
        Self::new(MINION_SPAWN_INTERVAL, Vec3::new(2.0, 0.0, 0.0))
    }
}

/// Capability: точка respawn игрока (захватывается при спавне)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct RespawnPoint(pub Vec3);

/// Отсчёт до respawn игрока после смерти
#[derive(Component, Debug)]
pub struct RespawnTimer {
    /// Оставшееся время (секунды)
    pub timer: f32,
}

impl RespawnTimer {
    pub fn new(delay: f32) -> Self {
        Self { timer: delay }
    }
}

/// Spawn: Ghost — базовый враг, дропает ключ
pub fn spawn_ghost<R: Rng>(commands: &mut Commands, rng: &mut R, position: Vec3) -> Entity {
    let config = BehaviorConfig::ghost();
    let state = config.initial_idle(rng);

    commands
        .spawn((
            Transform::from_translation(position),
            Actor {
                faction_id: HOSTILE_FACTION,
            },
            Health::new(100),
            AttackProfile::ghost_claw(),
            HurtConfig::enemy(),
            PendingDamage::default(),
            ScheduledCues::default(),
            config,
            state,
            HomePosition(position),
            MovementSpeed { speed: 3.0 },
            KeyDrop::default(),
        ))
        .id()
}

/// Spawn: миньон (спавнится Kamatayan'ом) — Ghost без дропа ключа
pub fn spawn_minion<R: Rng>(commands: &mut Commands, rng: &mut R, position: Vec3) -> Entity {
    let config = BehaviorConfig::ghost();
    let state = config.initial_idle(rng);

    commands
        .spawn((
            Transform::from_translation(position),
            Actor {
                faction_id: HOSTILE_FACTION,
            },
            Health::new(100),
            AttackProfile::ghost_claw(),
            HurtConfig::enemy(),
            PendingDamage::default(),
            ScheduledCues::default(),
            config,
            state,
            HomePosition(position),
            MovementSpeed { speed: 3.0 },
        ))
        .id()
}

/// Spawn: Kamatayan — спавнит миньонов пока жив
pub fn spawn_kamatayan<R: Rng>(commands: &mut Commands, rng: &mut R, position: Vec3) -> Entity {
    let config = BehaviorConfig::kamatayan();
    let state = config.initial_idle(rng);

    commands
        .spawn((
            Transform::from_translation(position),
            Actor {
                faction_id: HOSTILE_FACTION,
            },
            Health::new(100),
            AttackProfile::kamatayan_scythe(),
            HurtConfig::enemy(),
            PendingDamage::default(),
            ScheduledCues::default(),
            config,
            state,
            HomePosition(position),
            MovementSpeed { speed: 3.0 },
            MonsterSpawner::default(),
        ))
        .id()
}

/// Spawn: Sulyap — variance + crit урон, дропает ключ
pub fn spawn_sulyap<R: Rng>(commands: &mut Commands, rng: &mut R, position: Vec3) -> Entity {
    let config = BehaviorConfig::sulyap();
    let state = config.initial_idle(rng);

    commands
        .spawn((
            Transform::from_translation(position),
            Actor {
                faction_id: HOSTILE_FACTION,
            },
            Health::new(100),
            AttackProfile::sulyap_claw(),
            HurtConfig::enemy(),
            PendingDamage::default(),
            ScheduledCues::default(),
            config,
            state,
            HomePosition(position),
            MovementSpeed { speed: 3.0 },
            KeyDrop::default(),
        ))
        .id()
}

/// Spawn: игрок — движение/атаки из внешнего input layer, respawn при смерти
pub fn spawn_player(commands: &mut Commands, position: Vec3) -> Entity {
    commands
        .spawn((
            Transform::from_translation(position),
            PlayerControlled,
            Actor {
                faction_id: PLAYER_FACTION,
            },
            Health::new(100),
            AttackProfile::player_sword(),
            HurtConfig::player(),
            PendingDamage::default(),
            ScheduledCues::default(),
            MovementSpeed { speed: 5.0 },
            RespawnPoint(position),
        ))
        .id()
}

/// Система: интеграция MoveIntent → Transform (headless режим)
///
/// Physics collaborator на host'е делает это сам; в headless симуляции
/// двигаем Transform напрямую: position += direction × speed × dt.
pub fn apply_move_intents(
    mut query: Query<
        (&crate::components::MoveIntent, &MovementSpeed, &mut Transform),
        Without<Dead>,
    >,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (intent, speed, mut transform) in query.iter_mut() {
        transform.translation += intent.direction * speed.speed * delta;
    }
}

/// Система: tick спавнеров миньонов
///
/// Without<Dead> — смерть владельца останавливает спавн навсегда.
pub fn tick_monster_spawners(
    mut commands: Commands,
    mut spawners: Query<(Entity, &mut MonsterSpawner, &Transform), Without<Dead>>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut spawner, transform) in spawners.iter_mut() {
        spawner.timer -= delta;
        if spawner.timer <= 0.0 {
            spawner.timer = spawner.interval;

            let spawn_position = transform.translation + spawner.spawn_offset;
            let minion = spawn_minion(&mut commands, &mut rng.rng, spawn_position);
            crate::log(&format!(
                "{:?} spawned a minion {:?} at {:?}",
                entity, minion, spawn_position
            ));
        }
    }
}

/// Система: respawn игрока
///
/// По истечении таймера: позиция → RespawnPoint, health → max,
/// invulnerability window, снимаем Dead (единственная санкционированная
/// отмена смерти).
pub fn respawn_players(
    mut commands: Commands,
    mut query: Query<(
        Entity,
        &mut RespawnTimer,
        &mut Health,
        &mut Transform,
        &RespawnPoint,
        &HurtConfig,
    )>,
    time: Res<Time<Fixed>>,
    mut fx: EventWriter<FxTrigger>,
) {
    let delta = time.delta_secs();

    for (entity, mut respawn, mut health, mut transform, point, cfg) in query.iter_mut() {
        respawn.timer -= delta;
        if respawn.timer > 0.0 {
            continue;
        }

        transform.translation = point.0;
        health.restore_full();
        health.grant_invulnerability(cfg.invuln_window);

        commands.entity(entity).remove::<(RespawnTimer, Dead)>();

        fx.write(FxTrigger {
            entity,
            kind: FxKind::Respawn,
        });
        crate::log_info(&format!("{:?} has respawned at the respawn point", entity));
    }
}

/// Actor Plugin — движение, спавнеры, respawn
pub struct ActorPlugin;

impl Plugin for ActorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (apply_move_intents, tick_monster_spawners, respawn_players).chain(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawner_interval_logic() {
        let mut spawner = MonsterSpawner::new(4.0, Vec3::ZERO);
        assert_eq!(spawner.timer, 0.0); // Первый спавн сразу

        // После спавна таймер взводится на interval
        spawner.timer = spawner.interval;

        let delta = 1.0;
        for _ in 0..3 {
            spawner.timer -= delta;
        }
        assert!(spawner.timer > 0.0);

        spawner.timer -= delta;
        assert!(spawner.timer <= 0.0); // Готов спавнить
    }

    #[test]
    fn test_respawn_timer_logic() {
        let mut respawn = RespawnTimer::new(PLAYER_RESPAWN_DELAY);
        let delta = 0.5;

        respawn.timer -= delta;
        respawn.timer -= delta;
        respawn.timer -= delta;
        assert!(respawn.timer > 0.0);

        respawn.timer -= delta;
        assert!(respawn.timer <= 0.0); // Respawn на 2.0s
    }

    #[test]
    #[should_panic]
    fn test_zero_spawn_interval_rejected() {
        let _ = MonsterSpawner::new(0.0, Vec3::ZERO);
    }
}
