//! FSM AI для враждебных акторов
//!
//! Конечный автомат: Idle → Patrolling → Chasing → Attacking → Returning
//!
//! - Idle: ждём случайное время [min_idle, max_idle], потом патруль
//! - Patrolling: случайное направление, пока не ушли за deaggro от дома
//! - Chasing: цель в aggro_range, идём к ней
//! - Attacking: transient — попытка атаки (cooldown-gated отдельно)
//!   и безусловный возврат в Chasing тем же тиком
//! - Returning: идём домой, у дома сбрасываем idle timer
//!
//! Смерть останавливает автомат навсегда: death pipeline снимает
//! BehaviorState, все системы здесь фильтруют Without<Dead>.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{AttackIntent, AttackProfile, Dead};
use crate::components::{Actor, Facing, Health, HomePosition, MoveIntent};
use crate::DeterministicRng;

/// Дистанция до дома, на которой Returning завершается
const RETURN_EPSILON: f32 = 0.1;

/// Минимальная дистанция преследования (не налезаем на цель)
const MIN_CHASE_DISTANCE: f32 = 0.5;

/// AI FSM состояния
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub enum BehaviorState {
    /// Idle — стоим, ждём истечения таймера
    Idle {
        /// Оставшееся время до начала патруля (секунды)
        timer: f32,
    },

    /// Patrolling — случайное направление по горизонтальной плоскости
    Patrolling { direction: Vec3 },

    /// Chasing — преследуем цель
    Chasing,

    /// Attacking — transient: попытка атаки, сразу обратно в Chasing
    Attacking,

    /// Returning — возвращаемся к HomePosition
    Returning,
}

/// Параметры AI (aggro радиусы, idle тайминги)
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct BehaviorConfig {
    /// Минимальное время idle (секунды)
    pub min_idle: f32,
    /// Максимальное время idle (секунды)
    pub max_idle: f32,
    /// Радиус агрессии (метры)
    pub aggro_range: f32,
    /// Радиус прекращения преследования (метры), строго > aggro_range
    pub deaggro_range: f32,
}

impl BehaviorConfig {
    pub fn new(min_idle: f32, max_idle: f32, aggro_range: f32, deaggro_range: f32) -> Self {
        assert!(min_idle > 0.0, "BehaviorConfig: min_idle должен быть > 0");
        assert!(
            max_idle >= min_idle,
            "BehaviorConfig: max_idle должен быть ≥ min_idle"
        );
        assert!(aggro_range >= 0.0, "BehaviorConfig: aggro_range должен быть ≥ 0");
        assert!(
            deaggro_range > aggro_range,
            "BehaviorConfig: deaggro_range должен быть > aggro_range"
        );
        Self {
            min_idle,
            max_idle,
            aggro_range,
            deaggro_range,
        }
    }

    /// Ghost: базовый rank-and-file враг
    pub fn ghost() -> Self {
        Self::new(2.0, 5.0, 5.0, 8.0)
    }

    /// Kamatayan: видит дальше и дольше не отпускает
    pub fn kamatayan() -> Self {
        Self::new(2.0, 5.0, 6.0, 10.0)
    }

    /// Sulyap: те же дистанции что и Ghost
    pub fn sulyap() -> Self {
        Self::new(2.0, 5.0, 5.0, 8.0)
    }

    /// Начальное состояние: Idle со случайным таймером в [min_idle, max_idle]
    pub fn initial_idle<R: Rng>(&self, rng: &mut R) -> BehaviorState {
        BehaviorState::Idle {
            timer: rng.gen_range(self.min_idle..=self.max_idle),
        }
    }
}

/// Чистая функция facing-флипа
///
/// Возвращает (новый facing_right, случился ли flip).
/// horizontal == 0 — facing не меняется.
pub fn flip_facing(facing_right: bool, horizontal: f32) -> (bool, bool) {
    if horizontal == 0.0 {
        return (facing_right, false);
    }

    let should_flip = (horizontal < 0.0 && facing_right) || (horizontal > 0.0 && !facing_right);
    if should_flip {
        (!facing_right, true)
    } else {
        (facing_right, false)
    }
}

/// Случайное направление патруля на горизонтальной плоскости (unit vector)
pub fn random_patrol_direction<R: Rng>(rng: &mut R) -> Vec3 {
    let angle = rng.gen::<f32>() * std::f32::consts::TAU;
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

/// Система: AI FSM transitions
///
/// Оценивает переходы один раз за logic tick. Attacking эмитит AttackIntent
/// (исполнение и cooldown — забота combat::execute_attacks) и безусловно
/// возвращается в Chasing: частота ударов задаётся cooldown'ом, не
/// временем пребывания в состоянии.
pub fn behavior_transitions(
    mut ai_query: Query<
        (
            Entity,
            &Actor,
            &Transform,
            &HomePosition,
            &mut BehaviorState,
            &BehaviorConfig,
            &AttackProfile,
        ),
        Without<Dead>,
    >,
    targets: Query<(Entity, &Actor, &Transform, &Health)>,
    mut rng: ResMut<DeterministicRng>,
    mut intents: EventWriter<AttackIntent>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, actor, transform, home, mut state, config, profile) in ai_query.iter_mut() {
        let position = transform.translation;
        let home_distance = position.distance(home.0);

        // Дистанция до ближайшего живого врага (нет врага — считаем бесконечной)
        let target_distance = nearest_hostile(entity, actor.faction_id, position, &targets)
            .map(|(_, _, distance)| distance)
            .unwrap_or(f32::INFINITY);

        let new_state = match state.as_ref() {
            BehaviorState::Idle { timer } => {
                let remaining = timer - delta;
                if remaining <= 0.0 {
                    crate::log(&format!("AI: {:?} Idle → Patrolling", entity));
                    BehaviorState::Patrolling {
                        direction: random_patrol_direction(&mut rng.rng),
                    }
                } else if target_distance <= config.aggro_range {
                    crate::log(&format!("AI: {:?} Idle → Chasing", entity));
                    BehaviorState::Chasing
                } else {
                    BehaviorState::Idle { timer: remaining }
                }
            }

            BehaviorState::Patrolling { direction } => {
                if target_distance <= config.aggro_range {
                    crate::log(&format!("AI: {:?} Patrolling → Chasing", entity));
                    BehaviorState::Chasing
                } else if home_distance > config.deaggro_range {
                    crate::log(&format!("AI: {:?} Patrolling → Returning", entity));
                    BehaviorState::Returning
                } else {
                    BehaviorState::Patrolling {
                        direction: *direction,
                    }
                }
            }

            BehaviorState::Chasing => {
                if target_distance <= profile.attack_range {
                    BehaviorState::Attacking
                } else if target_distance > config.deaggro_range {
                    crate::log(&format!("AI: {:?} Chasing → Returning", entity));
                    BehaviorState::Returning
                } else {
                    BehaviorState::Chasing
                }
            }

            BehaviorState::Attacking => {
                // Попытка атаки; cooldown gate в execute_attacks
                intents.write(AttackIntent { attacker: entity });
                // Transient: безусловно обратно в Chasing тем же тиком
                BehaviorState::Chasing
            }

            BehaviorState::Returning => {
                if home_distance < RETURN_EPSILON {
                    crate::log(&format!("AI: {:?} Returning → Idle", entity));
                    config.initial_idle(&mut rng.rng)
                } else {
                    BehaviorState::Returning
                }
            }
        };

        if *state != new_state {
            *state = new_state;
        }
    }
}

/// Система: AI movement от FSM state
///
/// Конвертирует BehaviorState в MoveIntent. Вертикальная компонента
/// направления всегда обнуляется (движение по горизонтальной плоскости).
pub fn movement_from_state(
    mut ai_query: Query<
        (
            Entity,
            &Actor,
            &Transform,
            &HomePosition,
            &BehaviorState,
            &mut MoveIntent,
        ),
        Without<Dead>,
    >,
    targets: Query<(Entity, &Actor, &Transform, &Health)>,
) {
    for (entity, actor, transform, home, state, mut intent) in ai_query.iter_mut() {
        let position = transform.translation;

        intent.direction = match state {
            BehaviorState::Idle { .. } => Vec3::ZERO,

            BehaviorState::Patrolling { direction } => *direction,

            // Attacking — transient продолжение погони, двигаемся к цели
            BehaviorState::Chasing | BehaviorState::Attacking => {
                match nearest_hostile(entity, actor.faction_id, position, &targets) {
                    // Вплотную не налезаем — стоим на дистанции удара
                    Some((_, _, distance)) if distance <= MIN_CHASE_DISTANCE => Vec3::ZERO,
                    Some((_, target_position, _)) => {
                        horizontal_direction(position, target_position)
                    }
                    None => Vec3::ZERO,
                }
            }

            BehaviorState::Returning => horizontal_direction(position, home.0),
        };
    }
}

/// Система: facing flip от горизонтального интента движения
pub fn apply_facing(mut query: Query<(&MoveIntent, &mut Facing)>) {
    for (intent, mut facing) in query.iter_mut() {
        let (new_right, flipped) = flip_facing(facing.right, intent.direction.x);
        if flipped {
            facing.right = new_right;
        }
    }
}

/// Helper: направление к точке по горизонтальной плоскости (y = 0)
fn horizontal_direction(from: Vec3, to: Vec3) -> Vec3 {
    let mut direction = to - from;
    direction.y = 0.0;
    direction.normalize_or_zero()
}

/// Helper: ближайший живой враг (другая фракция) и дистанция до него
fn nearest_hostile(
    self_entity: Entity,
    self_faction: u64,
    self_position: Vec3,
    targets: &Query<(Entity, &Actor, &Transform, &Health)>,
) -> Option<(Entity, Vec3, f32)> {
    let mut nearest: Option<(Entity, Vec3, f32)> = None;

    for (target_entity, target_actor, target_transform, target_health) in targets.iter() {
        if target_entity == self_entity {
            continue;
        }

        // Только враги (другая фракция)
        if target_actor.faction_id == self_faction {
            continue;
        }

        // Только живые targets
        if !target_health.is_alive() {
            continue;
        }

        let distance = self_position.distance(target_transform.translation);

        match nearest {
            Some((_, _, best_distance)) if distance >= best_distance => {}
            _ => nearest = Some((target_entity, target_transform.translation, distance)),
        }
    }

    nearest
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_flip_facing_cases() {
        // Движение влево при взгляде вправо — flip
        assert_eq!(flip_facing(true, -1.0), (false, true));
        // Движение вправо при взгляде влево — flip
        assert_eq!(flip_facing(false, 1.0), (true, true));
        // Совпадающее направление — без изменений
        assert_eq!(flip_facing(true, 1.0), (true, false));
        assert_eq!(flip_facing(false, -1.0), (false, false));
        // Нет горизонтального движения — без изменений
        assert_eq!(flip_facing(true, 0.0), (true, false));
        assert_eq!(flip_facing(false, 0.0), (false, false));
    }

    #[test]
    fn test_patrol_direction_is_horizontal_unit() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        for _ in 0..100 {
            let direction = random_patrol_direction(&mut rng);
            assert_eq!(direction.y, 0.0);
            assert!((direction.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_initial_idle_in_configured_range() {
        let config = BehaviorConfig::ghost();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for _ in 0..100 {
            let BehaviorState::Idle { timer } = config.initial_idle(&mut rng) else {
                panic!("initial state должен быть Idle");
            };
            assert!(timer >= config.min_idle && timer <= config.max_idle);
        }
    }

    #[test]
    fn test_horizontal_direction_zeroes_y() {
        let from = Vec3::new(0.0, 1.0, 0.0);
        let to = Vec3::new(3.0, 5.0, 4.0);

        let direction = horizontal_direction(from, to);
        assert_eq!(direction.y, 0.0);
        assert!((direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    #[should_panic]
    fn test_deaggro_must_exceed_aggro() {
        let _ = BehaviorConfig::new(2.0, 5.0, 8.0, 8.0);
    }
}
