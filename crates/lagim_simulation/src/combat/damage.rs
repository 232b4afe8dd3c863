//! Delayed damage application + death pipeline
//!
//! Контракт hit intake (take damage):
//! 1. Отказ (silent no-op) если target мёртв или invulnerable — проверка
//!    в момент ДЕТЕКЦИИ удара
//! 2. Иначе удар встаёт в PendingDamage очередь на hurt_delay секунд
//!    (окно для hurt-анимации до мутации health)
//! 3. По истечении: health уменьшается (saturating), invulnerability window
//!    взводится, эмитятся Damaged + hurt presentation triggers
//! 4. current == 0 ⇒ death transition (однократный, маркер Dead)
//!
//! Отложенный удар отменяется только смертью/деспавном владельца —
//! invulnerability в момент применения НЕ перепроверяется (поведение
//! соответствует исходным coroutine-цепочкам).

use bevy::prelude::*;

use crate::actors::{KeyDrop, RespawnPoint, RespawnTimer, CORPSE_LINGER, PLAYER_RESPAWN_DELAY};
use crate::ai::BehaviorState;
use crate::combat::HurtConfig;
use crate::components::{Actor, Health, MoveIntent};
use crate::fx::{AudioCue, CueKind, FxKind, FxTrigger, ScheduledCues};
use crate::quest::KeyPickup;

/// Событие: урон применён к health
///
/// Используется для UI (health bar, floating text).
#[derive(Event, Debug, Clone)]
pub struct Damaged {
    pub entity: Entity,
    pub amount: u32,
    pub remaining: u32,
}

/// Событие: entity умер (health == 0)
///
/// Это kill-шина ядра: quest tracker подписан на неё.
/// Явный per-App канал Events<EntityDied> вместо глобального static.
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub faction_id: u64,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: entity мертв
///
/// Монотонный: ставится один раз, снимается только respawn-операцией игрока.
/// Пока стоит — health заморожен, AI и движение остановлены.
#[derive(Component, Debug)]
pub struct Dead;

/// Отложенный despawn (fade-out трупа на стороне presentation)
#[derive(Component, Debug)]
pub struct DespawnAfter {
    /// Оставшееся время до despawn (секунды)
    pub timer: f32,
}

/// Один отложенный удар
#[derive(Debug, Clone, Copy, Reflect)]
pub struct PendingHit {
    /// Оставшаяся задержка применения (секунды)
    pub timer: f32,
    pub amount: u32,
    /// Кто ударил (для killer в EntityDied)
    pub source: Option<Entity>,
}

/// Очередь отложенных ударов entity
///
/// Живёт на самом entity ⇒ despawn отменяет незавершённые удары.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct PendingDamage {
    pub hits: Vec<PendingHit>,
}

impl PendingDamage {
    /// Hit intake: ставит удар в очередь если target жив и уязвим
    ///
    /// Возвращает false (silent no-op) для мёртвых/invulnerable целей.
    pub fn enqueue(
        &mut self,
        health: &Health,
        cfg: &HurtConfig,
        amount: u32,
        source: Option<Entity>,
    ) -> bool {
        if !health.is_alive() || health.is_invulnerable() {
            return false;
        }

        self.hits.push(PendingHit {
            timer: cfg.hurt_delay,
            amount,
            source,
        });
        true
    }
}

/// Система: tick invulnerability таймеров
///
/// На пересечении нуля эмитит InvulnEnded (сброс hurt-tint у presentation).
pub fn tick_invulnerability(
    mut query: Query<(Entity, &mut Health)>,
    time: Res<Time<Fixed>>,
    mut fx: EventWriter<FxTrigger>,
) {
    let delta = time.delta_secs();

    for (entity, mut health) in query.iter_mut() {
        if health.invuln_timer > 0.0 {
            health.invuln_timer -= delta;

            if health.invuln_timer <= 0.0 {
                health.invuln_timer = 0.0;
                fx.write(FxTrigger {
                    entity,
                    kind: FxKind::InvulnEnded,
                });
            }
        }
    }
}

/// Система: применение отложенных ударов
///
/// 1. Тикаем таймеры PendingDamage
/// 2. Истёкший удар: мутация health + invuln window + Damaged событие
/// 3. current == 0 ⇒ маркер Dead + EntityDied (ровно один раз)
///
/// Удары по уже мёртвому entity отбрасываются (health заморожен).
pub fn apply_pending_damage(
    mut commands: Commands,
    mut query: Query<(
        Entity,
        &Actor,
        &mut Health,
        &HurtConfig,
        &mut PendingDamage,
        &mut ScheduledCues,
        Option<&Dead>,
    )>,
    time: Res<Time<Fixed>>,
    mut damaged_events: EventWriter<Damaged>,
    mut died_events: EventWriter<EntityDied>,
    mut fx: EventWriter<FxTrigger>,
) {
    let delta = time.delta_secs();

    for (entity, actor, mut health, cfg, mut pending, mut cues, dead) in query.iter_mut() {
        if pending.hits.is_empty() {
            continue;
        }

        for hit in pending.hits.iter_mut() {
            hit.timer -= delta;
        }

        let expired: Vec<PendingHit> = pending
            .hits
            .iter()
            .copied()
            .filter(|h| h.timer <= 0.0)
            .collect();
        pending.hits.retain(|h| h.timer > 0.0);

        for hit in expired {
            // Смерть/despawn отменяет отложенные удары
            if dead.is_some() || !health.is_alive() {
                continue;
            }

            health.apply_damage(hit.amount);
            health.grant_invulnerability(cfg.invuln_window);

            damaged_events.write(Damaged {
                entity,
                amount: hit.amount,
                remaining: health.current,
            });
            fx.write(FxTrigger {
                entity,
                kind: FxKind::TakeDamage,
            });
            cues.schedule(cfg.hurt_sound_delay, CueKind::Hurt, 1.0);

            crate::log(&format!(
                "{:?} took {} damage. Current health: {}",
                entity, hit.amount, health.current
            ));

            if !health.is_alive() {
                commands.entity(entity).insert(Dead);
                died_events.write(EntityDied {
                    entity,
                    faction_id: actor.faction_id,
                    killer: hit.source,
                });
                crate::log_info(&format!("{:?} has died", entity));
            }
        }
    }
}

/// Система: death pipeline (side effects смерти)
///
/// Для каждого EntityDied:
/// - останавливает движение и снимает BehaviorState (FSM halt, terminal)
/// - эмитит die-триггер + death sound
/// - KeyDrop capability: спавнит key pickup у трупа
/// - RespawnPoint (игрок): взводит RespawnTimer; иначе DespawnAfter
pub fn handle_deaths(
    mut commands: Commands,
    mut died_events: EventReader<EntityDied>,
    mut query: Query<(&Transform, &mut MoveIntent, Option<&KeyDrop>, Option<&RespawnPoint>)>,
    mut fx: EventWriter<FxTrigger>,
    mut cues: EventWriter<AudioCue>,
) {
    for event in died_events.read() {
        let Ok((transform, mut intent, key_drop, respawn)) = query.get_mut(event.entity) else {
            // Entity уже despawned — side effects пропускаем
            continue;
        };

        intent.direction = Vec3::ZERO;
        commands.entity(event.entity).remove::<BehaviorState>();

        fx.write(FxTrigger {
            entity: event.entity,
            kind: FxKind::Die,
        });
        cues.write(AudioCue {
            kind: CueKind::Death,
            volume: 1.0,
        });

        if let Some(drop) = key_drop {
            let drop_position = transform.translation + drop.offset;
            commands.spawn((
                KeyPickup::default(),
                Transform::from_translation(drop_position),
            ));
            crate::log(&format!("Key dropped at position: {:?}", drop_position));
        }

        if respawn.is_some() {
            commands
                .entity(event.entity)
                .insert(RespawnTimer::new(PLAYER_RESPAWN_DELAY));
        } else {
            commands.entity(event.entity).insert(DespawnAfter {
                timer: CORPSE_LINGER,
            });
        }
    }
}

/// Система: despawn entities с истёкшим DespawnAfter таймером
pub fn despawn_after_timeout(
    mut commands: Commands,
    mut query: Query<(Entity, &mut DespawnAfter)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut despawn_after) in query.iter_mut() {
        despawn_after.timer -= delta;
        if despawn_after.timer <= 0.0 {
            crate::log(&format!("⚰️ Despawning entity {:?} (timeout)", entity));
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_rejected_when_invulnerable() {
        let mut health = Health::new(100);
        health.grant_invulnerability(1.0);
        let mut pending = PendingDamage::default();

        assert!(!pending.enqueue(&health, &HurtConfig::enemy(), 10, None));
        assert!(pending.hits.is_empty());
    }

    #[test]
    fn test_enqueue_rejected_when_dead() {
        let mut health = Health::new(100);
        health.apply_damage(100);
        let mut pending = PendingDamage::default();

        assert!(!pending.enqueue(&health, &HurtConfig::enemy(), 10, None));
        assert!(pending.hits.is_empty());
    }

    #[test]
    fn test_enqueue_uses_hurt_delay() {
        let health = Health::new(100);
        let mut pending = PendingDamage::default();

        assert!(pending.enqueue(&health, &HurtConfig::enemy(), 10, None));
        assert_eq!(pending.hits.len(), 1);
        assert_eq!(pending.hits[0].timer, 0.5);
        assert_eq!(pending.hits[0].amount, 10);
    }

    #[test]
    fn test_pending_hit_timer_logic() {
        let mut timer = 0.5;
        let delta = 1.0 / 60.0;

        for _ in 0..29 {
            timer -= delta;
        }
        assert!(timer > 0.0); // Ещё не применён

        timer -= delta;
        assert!(timer <= 0.0); // Применяется на 30-м тике
    }
}
