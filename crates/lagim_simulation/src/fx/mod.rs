//! Presentation события (fire-and-forget)
//!
//! Ядро ничего не рендерит и не проигрывает: оно публикует триггеры,
//! tactical layer (animator/audio host) подписывается и потребляет.
//! Обратной связи нет — события одностороние.

use bevy::prelude::*;

/// Именованный анимационный триггер (consumed by Animator host)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum FxKind {
    TakeDamage,
    Die,
    Respawn,
    Attack,
    /// Окно неуязвимости закончилось (сброс hurt-tint)
    InvulnEnded,
}

/// Событие: presentation trigger для конкретного entity
#[derive(Event, Debug, Clone)]
pub struct FxTrigger {
    pub entity: Entity,
    pub kind: FxKind,
}

/// Звуковой cue (consumed by audio host, без acknowledgement)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum CueKind {
    Hurt,
    Death,
    Attack,
    Hit,
    Pickup,
}

/// Событие: "play clip" запрос
#[derive(Event, Debug, Clone)]
pub struct AudioCue {
    pub kind: CueKind,
    pub volume: f32,
}

/// Отложенный звуковой cue (scheduled continuation)
#[derive(Debug, Clone, Copy, Reflect)]
pub struct ScheduledCue {
    /// Оставшаяся задержка (секунды)
    pub timer: f32,
    pub kind: CueKind,
    pub volume: f32,
}

/// Очередь отложенных cues конкретного entity
///
/// Компонент умирает вместе с entity ⇒ despawn отменяет
/// все незавершённые cues (cancellation guarantee).
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct ScheduledCues {
    pub cues: Vec<ScheduledCue>,
}

impl ScheduledCues {
    pub fn schedule(&mut self, delay: f32, kind: CueKind, volume: f32) {
        self.cues.push(ScheduledCue {
            timer: delay,
            kind,
            volume,
        });
    }
}

/// Система: tick отложенных cues, эмит AudioCue по истечении задержки
pub fn flush_scheduled_cues(
    mut query: Query<&mut ScheduledCues>,
    time: Res<Time<Fixed>>,
    mut cues_out: EventWriter<AudioCue>,
) {
    let delta = time.delta_secs();

    for mut scheduled in query.iter_mut() {
        for cue in scheduled.cues.iter_mut() {
            cue.timer -= delta;
        }

        // Эмитим истёкшие, остальные остаются в очереди
        for cue in scheduled.cues.iter().filter(|c| c.timer <= 0.0) {
            cues_out.write(AudioCue {
                kind: cue.kind,
                volume: cue.volume,
            });
        }
        scheduled.cues.retain(|c| c.timer > 0.0);
    }
}

/// Fx Plugin — регистрация presentation событий
pub struct FxPlugin;

impl Plugin for FxPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<FxTrigger>()
            .add_event::<AudioCue>()
            .add_systems(FixedUpdate, flush_scheduled_cues);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_and_tick() {
        let mut scheduled = ScheduledCues::default();
        scheduled.schedule(0.3, CueKind::Hurt, 1.0);
        assert_eq!(scheduled.cues.len(), 1);

        // Симулируем тики вручную
        let delta = 0.1;
        for cue in scheduled.cues.iter_mut() {
            cue.timer -= delta;
        }
        assert!(scheduled.cues[0].timer > 0.0);

        for cue in scheduled.cues.iter_mut() {
            cue.timer -= 0.25;
        }
        assert!(scheduled.cues[0].timer <= 0.0); // Готов к эмиту
    }
}
