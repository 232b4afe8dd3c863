//! Portal gate + отложенный scene transition
//!
//! Gate читает конъюнкцию "key collected" AND "kill objective complete".
//! Отказ — сигнал для UI prompt (PortalDenied), не ошибка.
//! Открытие one-shot: взводит TransitionCountdown, по истечении эмитится
//! ровно один SceneTransitionRequest (scene loader — внешний collaborator).

use bevy::prelude::*;

use crate::quest::{Quest, QuestLog};

/// Причина отказа портала (для UI prompt)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalLock {
    /// "You need a key to open this."
    NeedKey,
    /// Kill-объектив не завершён
    NeedKills,
}

/// Портал в boss room
#[derive(Component, Debug, Clone)]
pub struct Portal {
    /// Имя destination-сцены
    pub destination: String,
    /// Задержка от открытия до transition запроса (секунды)
    pub transition_delay: f32,
    /// Открыт ли портал (монотонно)
    pub open: bool,
}

impl Portal {
    pub fn new(destination: impl Into<String>, transition_delay: f32) -> Self {
        assert!(
            transition_delay >= 0.0,
            "Portal: transition_delay должен быть ≥ 0"
        );
        Self {
            destination: destination.into(),
            transition_delay,
            open: false,
        }
    }

    /// Gate check: Ok(true) — портал открылся именно сейчас,
    /// Ok(false) — уже был открыт, Err — причина отказа.
    ///
    /// Порядок проверок как в исходном prompt: сначала ключ, потом kills.
    pub fn try_open(&mut self, quest: &Quest) -> Result<bool, PortalLock> {
        if self.open {
            return Ok(false);
        }
        if !quest.key_collected {
            return Err(PortalLock::NeedKey);
        }
        if !quest.kills_complete {
            return Err(PortalLock::NeedKills);
        }

        self.open = true;
        Ok(true)
    }
}

impl Default for Portal {
    fn default() -> Self {
        Self::new("BossRoom", 1.5)
    }
}

/// Событие: игрок активировал портал (interact key, внешний input layer)
#[derive(Event, Debug, Clone)]
pub struct PortalActivated {
    pub portal: Entity,
}

/// Событие: портал отказал (сигнал для UI prompt)
#[derive(Event, Debug, Clone)]
pub struct PortalDenied {
    pub portal: Entity,
    pub lock: PortalLock,
}

/// Событие: запрос сцены destination (scene loader — внешний collaborator)
#[derive(Event, Debug, Clone)]
pub struct SceneTransitionRequest {
    pub destination: String,
}

/// Отсчёт до scene transition после открытия портала
#[derive(Component, Debug)]
pub struct TransitionCountdown {
    /// Оставшееся время (секунды)
    pub timer: f32,
    pub destination: String,
}

/// Система: обработка активаций портала
pub fn activate_portals(
    mut commands: Commands,
    mut activations: EventReader<PortalActivated>,
    mut portals: Query<&mut Portal>,
    mut quest_log: ResMut<QuestLog>,
    mut denied: EventWriter<PortalDenied>,
) {
    for activation in activations.read() {
        let Ok(mut portal) = portals.get_mut(activation.portal) else {
            crate::log_warning(&format!(
                "PortalActivated: portal {:?} not found, skipping",
                activation.portal
            ));
            continue;
        };

        match portal.try_open(&quest_log.quest) {
            Ok(true) => {
                quest_log.quest.mark_portal_opened();
                commands.entity(activation.portal).insert(TransitionCountdown {
                    timer: portal.transition_delay,
                    destination: portal.destination.clone(),
                });
                crate::log_info("Portal opened!");
            }
            Ok(false) => {
                // Уже открыт, transition уже запланирован
            }
            Err(lock) => {
                match lock {
                    PortalLock::NeedKey => crate::log("You need a key to open this."),
                    PortalLock::NeedKills => crate::log("Portal: kill objective not complete."),
                }
                denied.write(PortalDenied {
                    portal: activation.portal,
                    lock,
                });
            }
        }
    }
}

/// Система: tick transition отсчёта, one-shot запрос сцены
pub fn tick_transitions(
    mut commands: Commands,
    mut countdowns: Query<(Entity, &mut TransitionCountdown)>,
    time: Res<Time<Fixed>>,
    mut transitions: EventWriter<SceneTransitionRequest>,
) {
    let delta = time.delta_secs();

    for (entity, mut countdown) in countdowns.iter_mut() {
        countdown.timer -= delta;
        if countdown.timer <= 0.0 {
            transitions.write(SceneTransitionRequest {
                destination: countdown.destination.clone(),
            });
            commands.entity(entity).remove::<TransitionCountdown>();
            crate::log_info(&format!("Scene transition: {}", countdown.destination));
        }
    }
}
