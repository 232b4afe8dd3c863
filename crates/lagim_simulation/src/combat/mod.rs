//! Combat system module
//!
//! ECS ответственность:
//! - Game state: Health, AttackProfile, PendingDamage
//! - Combat rules: damage rolls (variance + crit), delayed application,
//!   invulnerability windows, death pipeline
//! - Events: AttackIntent, Damaged, EntityDied
//!
//! Tactical layer ответственность (внешние collaborators):
//! - Animation timing, рендер hurt-tint/fade-out
//! - Audio playback (консюмит AudioCue)
//! - Физическое движение тел

use bevy::prelude::*;

pub mod attack;
pub mod damage;
pub mod profile;

// Re-export основных типов
pub use attack::{execute_attacks, AttackIntent};
pub use damage::{
    apply_pending_damage, despawn_after_timeout, handle_deaths, tick_invulnerability, Damaged,
    Dead, DespawnAfter, EntityDied, PendingDamage, PendingHit,
};
pub use profile::{tick_attack_cooldowns, AttackProfile, HurtConfig};

/// Combat Plugin
///
/// Регистрирует combat системы в FixedUpdate (60Hz).
///
/// Порядок выполнения:
/// 1. tick_attack_cooldowns / tick_invulnerability — таймеры
/// 2. execute_attacks — AttackIntent → overlap scan → hit intake
/// 3. apply_pending_damage — истёкшие удары → health mutation → смерть
/// 4. handle_deaths — side effects смерти (loot, respawn timer, halt AI)
/// 5. despawn_after_timeout — уборка трупов
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<AttackIntent>()
            .add_event::<Damaged>()
            .add_event::<EntityDied>();

        // Регистрация систем в FixedUpdate
        app.add_systems(
            FixedUpdate,
            (
                tick_attack_cooldowns,
                tick_invulnerability,
                execute_attacks,
                apply_pending_damage,
                handle_deaths,
                despawn_after_timeout,
            )
                .chain(), // Последовательное выполнение
        );
    }
}
