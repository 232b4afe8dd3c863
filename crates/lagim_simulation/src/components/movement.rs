//! Movement компоненты: интент движения, скорость, точка спавна

use bevy::prelude::*;

/// Направление движения актора (intent, не velocity)
///
/// Архитектура:
/// - AI FSM (или input layer для игрока) пишет MoveIntent
/// - Physics collaborator применяет движение; в headless режиме это делает
///   система apply_move_intents (crate::actors)
///
/// Для горизонтального движения y всегда 0.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct MoveIntent {
    /// Направление движения (normalized или ZERO)
    pub direction: Vec3,
}

/// Скорость движения актора (метры/сек)
#[derive(Component, Clone, Copy, Debug, Reflect)]
#[reflect(Component)]
pub struct MovementSpeed {
    pub speed: f32,
}

impl Default for MovementSpeed {
    fn default() -> Self {
        Self { speed: 3.0 } // 3 m/s — базовая скорость врага
    }
}

/// Позиция спавна (origin) — захватывается один раз, дальше immutable
///
/// AI использует для deaggro check и Returning state.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HomePosition(pub Vec3);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_intent_default_is_zero() {
        let intent = MoveIntent::default();
        assert_eq!(intent.direction, Vec3::ZERO);
    }
}
