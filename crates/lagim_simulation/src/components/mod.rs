//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики (faction, health, facing)
//! - movement: перемещение (MoveIntent, MovementSpeed, HomePosition)
//!
//! Combat-специфичные компоненты (AttackProfile, PendingDamage) живут
//! в crate::combat, AI компоненты (BehaviorState) — в crate::ai.

pub mod actor;
pub mod movement;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
