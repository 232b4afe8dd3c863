//! Quest/objective tracking
//!
//! Process-wide состояние квеста (QuestLog resource), мутируется kill-шиной
//! (Events<EntityDied>) и key pickup системой, читается порталом.
//!
//! Все флаги завершения монотонные: единожды true — навсегда true.
//! Kill counter клампится на required_kills; уведомления после завершения —
//! no-op (ни ошибок, ни переполнения).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod portal;

// Re-export основных типов
pub use portal::{
    activate_portals, tick_transitions, Portal, PortalActivated, PortalDenied, PortalLock,
    SceneTransitionRequest, TransitionCountdown,
};

use crate::combat::{DespawnAfter, EntityDied};
use crate::components::{PlayerControlled, HOSTILE_FACTION};
use crate::fx::{AudioCue, CueKind};

/// Задержка despawn ключа после подбора (секунды)
const KEY_DESPAWN_DELAY: f32 = 0.5;

/// Квест с kill-счётчиком и key-объективом
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    pub name: String,
    pub required_kills: u32,
    pub kills: u32,
    pub accepted: bool,
    pub key_collected: bool,
    pub kills_complete: bool,
    pub portal_opened: bool,
}

impl Quest {
    pub fn new(name: impl Into<String>, required_kills: u32) -> Self {
        assert!(required_kills > 0, "Quest: required_kills должен быть > 0");
        Self {
            name: name.into(),
            required_kills,
            kills: 0,
            accepted: false,
            key_collected: false,
            kills_complete: false,
            portal_opened: false,
        }
    }

    /// Принять квест (монотонно)
    pub fn accept(&mut self) {
        self.accepted = true;
    }

    /// Kill-уведомление: инкремент счётчика пока квест принят и не завершён
    ///
    /// Возвращает true если kill-объектив завершился ИМЕННО этим уведомлением.
    pub fn record_kill(&mut self) -> bool {
        if !self.accepted || self.kills >= self.required_kills {
            return false;
        }

        self.kills += 1;
        if self.kills >= self.required_kills && !self.kills_complete {
            self.kills_complete = true;
            return true;
        }
        false
    }

    /// Подбор ключа (монотонно). true — впервые.
    pub fn collect_key(&mut self) -> bool {
        if self.key_collected {
            return false;
        }
        self.key_collected = true;
        true
    }

    /// Конъюнкция объективов для portal gate
    pub fn objectives_met(&self) -> bool {
        self.kills_complete && self.key_collected
    }

    /// Отметить портал открытым (монотонно)
    pub fn mark_portal_opened(&mut self) {
        self.portal_opened = true;
    }
}

/// Квестовое состояние сессии (создаётся при старте уровня)
#[derive(Resource, Debug, Clone)]
pub struct QuestLog {
    pub quest: Quest,
}

impl Default for QuestLog {
    fn default() -> Self {
        Self {
            quest: Quest::new("Defeat the Enemies", 2),
        }
    }
}

/// Ключ, лежащий в мире (дроп с убитого врага)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct KeyPickup {
    /// Дистанция подбора (метры)
    pub pickup_range: f32,
}

impl Default for KeyPickup {
    fn default() -> Self {
        Self { pickup_range: 2.0 }
    }
}

/// Система: kill-шина → quest counter
///
/// Подписчик Events<EntityDied>. Считаем только врагов и только пока
/// квест принят; после порога — no-op.
pub fn track_kills(mut died_events: EventReader<EntityDied>, mut quest_log: ResMut<QuestLog>) {
    for event in died_events.read() {
        if event.faction_id != HOSTILE_FACTION {
            continue;
        }

        let newly_complete = quest_log.quest.record_kill();
        if quest_log.quest.accepted {
            crate::log(&format!(
                "Quest: mobs killed {}/{}",
                quest_log.quest.kills, quest_log.quest.required_kills
            ));
        }
        if newly_complete {
            crate::log_info("Quest: kill objective complete");
        }
    }
}

/// Система: подбор ключей игроком
///
/// Игрок в pickup_range от ключа ⇒ key_collected (монотонно),
/// pickup sound, despawn ключа с задержкой.
pub fn collect_keys(
    mut commands: Commands,
    keys: Query<(Entity, &KeyPickup, &Transform), Without<DespawnAfter>>,
    players: Query<&Transform, With<PlayerControlled>>,
    mut quest_log: ResMut<QuestLog>,
    mut cues: EventWriter<AudioCue>,
) {
    for (key_entity, key, key_transform) in keys.iter() {
        let picked_up = players.iter().any(|player_transform| {
            player_transform
                .translation
                .distance(key_transform.translation)
                <= key.pickup_range
        });

        if picked_up {
            quest_log.quest.collect_key();
            cues.write(AudioCue {
                kind: CueKind::Pickup,
                volume: 1.0,
            });
            commands.entity(key_entity).insert(DespawnAfter {
                timer: KEY_DESPAWN_DELAY,
            });
            crate::log_info("Key has been picked up!");
        }
    }
}

/// Quest Plugin
///
/// Порядок выполнения:
/// 1. track_kills — kill-шина → счётчик
/// 2. collect_keys — подбор ключей
/// 3. activate_portals — PortalActivated → gate check
/// 4. tick_transitions — отложенный one-shot scene transition
pub struct QuestPlugin;

impl Plugin for QuestPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<QuestLog>();

        app.add_event::<PortalActivated>()
            .add_event::<PortalDenied>()
            .add_event::<SceneTransitionRequest>();

        app.add_systems(
            FixedUpdate,
            (track_kills, collect_keys, activate_portals, tick_transitions).chain(),
        );
    }
}
