//! Attack execution: overlap scan + damage roll + hit intake
//!
//! AttackIntent события приходят из двух источников:
//! - AI FSM (Attacking state, каждый тик пребывания в нём)
//! - input layer игрока (attack button edge, внешний collaborator)
//!
//! Cooldown gate живёт здесь (не в FSM): попытка атаки на cooldown —
//! silent no-op, успешная попытка сбрасывает cooldown НЕЗАВИСИМО от того,
//! попал ли overlap scan хоть по кому-то.

use bevy::prelude::*;

use crate::combat::{AttackProfile, Dead, HurtConfig, PendingDamage};
use crate::components::{Actor, Facing, Health};
use crate::fx::{AudioCue, CueKind, FxKind, FxTrigger};
use crate::DeterministicRng;

/// Событие: актор хочет атаковать
#[derive(Event, Debug, Clone)]
pub struct AttackIntent {
    pub attacker: Entity,
}

/// Система: исполнение атак
///
/// 1. Cooldown gate (elapsed ⇒ проходим, сбрасываем cooldown)
/// 2. Overlap scan: entities противоположной фракции в attack_radius
///    от attack point (позиция + facing-forward offset)
/// 3. Для каждой живой уязвимой цели: damage roll → hit intake
/// 4. Attack presentation triggers; hit sound если хоть кто-то задет
pub fn execute_attacks(
    mut intents: EventReader<AttackIntent>,
    mut attackers: Query<(&mut AttackProfile, &Transform, &Facing, &Actor, &Health), Without<Dead>>,
    mut targets: Query<(Entity, &Actor, &Transform, &Health, &HurtConfig, &mut PendingDamage)>,
    mut rng: ResMut<DeterministicRng>,
    mut fx: EventWriter<FxTrigger>,
    mut cues: EventWriter<AudioCue>,
) {
    for intent in intents.read() {
        let Ok((mut profile, transform, facing, actor, health)) =
            attackers.get_mut(intent.attacker)
        else {
            crate::log_warning(&format!(
                "AttackIntent: attacker {:?} not found or dead, skipping",
                intent.attacker
            ));
            continue;
        };

        // Смерть могла случиться в этом же тике, до command flush
        if !health.is_alive() {
            continue;
        }

        if !profile.can_attack() {
            continue;
        }
        // Сбрасываем независимо от результата overlap scan
        profile.start_cooldown();

        let forward = if facing.right { Vec3::X } else { -Vec3::X };
        let attack_point = transform.translation + forward * profile.attack_point_offset;

        let mut hit_any = false;

        for (target, target_actor, target_transform, target_health, hurt_cfg, mut pending) in
            targets.iter_mut()
        {
            // Не бьем себя и союзников
            if target == intent.attacker || target_actor.faction_id == actor.faction_id {
                continue;
            }

            if attack_point.distance(target_transform.translation) > profile.attack_radius {
                continue;
            }

            // Мёртвые/invulnerable цели — silent no-op
            if !target_health.is_alive() || target_health.is_invulnerable() {
                continue;
            }

            let amount = profile.roll_damage(&mut rng.rng);
            if pending.enqueue(target_health, hurt_cfg, amount, Some(intent.attacker)) {
                hit_any = true;
                crate::log(&format!(
                    "{:?} attacked {:?} for {} damage",
                    intent.attacker, target, amount
                ));
            }
        }

        fx.write(FxTrigger {
            entity: intent.attacker,
            kind: FxKind::Attack,
        });
        cues.write(AudioCue {
            kind: CueKind::Attack,
            volume: 0.5,
        });
        if hit_any {
            cues.write(AudioCue {
                kind: CueKind::Hit,
                volume: 0.5,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_point_offset_follows_facing() {
        let position = Vec3::new(2.0, 0.0, 0.0);
        let offset = 1.0;

        let right_point = position + Vec3::X * offset;
        let left_point = position + (-Vec3::X) * offset;

        assert_eq!(right_point, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(left_point, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_overlap_radius_check() {
        let attack_point = Vec3::ZERO;
        let radius = 0.5;

        let near = Vec3::new(0.3, 0.0, 0.0);
        let far = Vec3::new(0.8, 0.0, 0.0);

        assert!(attack_point.distance(near) <= radius);
        assert!(attack_point.distance(far) > radius);
    }
}
