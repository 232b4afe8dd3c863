//! Базовые компоненты акторов: Actor, Health, Facing

use bevy::prelude::*;

/// Фракция игрока
pub const PLAYER_FACTION: u64 = 0;
/// Фракция врагов (Ghost, Kamatayan, Sulyap и их миньоны)
pub const HOSTILE_FACTION: u64 = 1;

/// Актор (игрок, враг) — базовый компонент для живых существ
///
/// Автоматически добавляет Health, Facing, MoveIntent через Required Components.
/// Combat-компоненты (PendingDamage, ScheduledCues) добавляются архетипными
/// spawn-функциями в crate::actors.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Health, Facing, crate::components::MoveIntent)]
pub struct Actor {
    /// Stable ID фракции (фильтр "свой/чужой" при атаках и kill-событиях)
    pub faction_id: u64,
}

/// Здоровье актора + invulnerability window
///
/// Инварианты:
/// - 0 ≤ current ≤ max, max > 0
/// - invuln_timer ≥ 0
/// - current == 0 ⇒ entity получает маркер Dead (death pipeline)
///
/// Урон проходит через PendingDamage (delayed application), никогда напрямую.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
    /// Окно неуязвимости после полученного удара (секунды, тикает до 0)
    pub invuln_timer: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        assert!(max > 0, "Health: max должен быть > 0");
        Self {
            current: max,
            max,
            invuln_timer: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invuln_timer > 0.0
    }

    /// Доля здоровья для UI, всегда в [0, 1]
    pub fn fraction(&self) -> f32 {
        self.current as f32 / self.max as f32
    }

    /// Применить урон (saturating: current не уходит ниже нуля)
    pub fn apply_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn grant_invulnerability(&mut self, window: f32) {
        self.invuln_timer = window;
    }

    pub fn restore_full(&mut self) {
        self.current = self.max;
    }
}

/// Маркер: актор под управлением игрока
///
/// Движение и атаки приходят из внешнего input layer, не из AI FSM.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PlayerControlled;

/// Куда смотрит актор (горизонтальный mirror для presentation)
///
/// Чистый continuous signal: ядро обновляет, tactical layer читает.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Facing {
    pub right: bool,
}

impl Default for Facing {
    fn default() -> Self {
        Self { right: true }
    }
}
