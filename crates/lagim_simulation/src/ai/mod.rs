//! AI decision-making module
//!
//! Один generic FSM (Idle/Patrolling/Chasing/Attacking/Returning) для всех
//! враждебных архетипов; per-архетипные различия — в BehaviorConfig.

use bevy::prelude::*;

pub mod fsm;

// Re-export основных типов
pub use fsm::{
    apply_facing, behavior_transitions, flip_facing, movement_from_state, BehaviorConfig,
    BehaviorState,
};

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. behavior_transitions — обновление FSM state (+ AttackIntent из Attacking)
/// 2. movement_from_state — конвертация state → MoveIntent
/// 3. apply_facing — facing flip от горизонтального интента
pub struct AiPlugin;

impl Plugin for AiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (behavior_transitions, movement_from_state, apply_facing).chain(), // Последовательное выполнение для детерминизма
        );
    }
}
