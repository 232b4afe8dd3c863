//! Attack profile — конфигурация атаки архетипа + damage resolver
//!
//! Единый компонент для всех архетипов (Ghost, Kamatayan, Sulyap, Player):
//! per-архетипные различия — только значения полей, не код.
//!
//! Damage formula:
//! - variance factor uniform в [-variance, +variance]
//! - raw = base_damage × (1 + v)
//! - crit roll uniform [0,1) < crit_chance ⇒ raw × crit_multiplier
//! - результат round(raw), минимум 0
//!
//! crit_multiplier = 2.0 точно воспроизводит "double damage" крит
//! baseline-архетипов (Ghost claw, Player sword).

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Профиль атаки актора (immutable config + cooldown timer)
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct AttackProfile {
    /// Базовый урон (до variance/crit)
    pub base_damage: u32,

    /// Разброс урона, доля от базы в [0, 1)
    pub variance: f32,

    /// Шанс критического удара в [0, 1]
    pub crit_chance: f32,

    /// Множитель критического удара (≥ 1)
    pub crit_multiplier: f32,

    /// Дистанция с которой AI может атаковать (метры)
    pub attack_range: f32,

    /// Радиус overlap-сферы hit detection (метры)
    pub attack_radius: f32,

    /// Смещение центра сферы вперёд по facing (метры)
    pub attack_point_offset: f32,

    /// Cooldown между атаками (секунды)
    pub cooldown: f32,

    /// Текущий cooldown timer (уменьшается до 0)
    pub cooldown_timer: f32,
}

impl AttackProfile {
    /// Создать профиль с валидацией конфигурации
    ///
    /// Паникует на невалидных значениях: конфигурация — ошибка программиста,
    /// ловим при конструировании, не в frame loop.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        base_damage: u32,
        variance: f32,
        crit_chance: f32,
        crit_multiplier: f32,
        attack_range: f32,
        attack_radius: f32,
        attack_point_offset: f32,
        cooldown: f32,
    ) -> Self {
        assert!(
            (0.0..1.0).contains(&variance),
            "AttackProfile: variance должен быть в [0, 1)"
        );
        assert!(
            (0.0..=1.0).contains(&crit_chance),
            "AttackProfile: crit_chance должен быть в [0, 1]"
        );
        assert!(
            crit_multiplier >= 1.0,
            "AttackProfile: crit_multiplier должен быть ≥ 1"
        );
        assert!(attack_range > 0.0, "AttackProfile: attack_range должен быть > 0");
        assert!(attack_radius > 0.0, "AttackProfile: attack_radius должен быть > 0");
        assert!(cooldown > 0.0, "AttackProfile: cooldown должен быть > 0");

        Self {
            base_damage,
            variance,
            crit_chance,
            crit_multiplier,
            attack_range,
            attack_radius,
            attack_point_offset,
            cooldown,
            cooldown_timer: 0.0,
        }
    }

    /// Ghost: плоский урон без крита (crit_chance 0)
    pub fn ghost_claw() -> Self {
        Self::new(10, 0.0, 0.0, 1.0, 3.0, 0.5, 0.5, 1.0)
    }

    /// Kamatayan: бьёт больнее, тот же плоский resolver
    pub fn kamatayan_scythe() -> Self {
        Self::new(15, 0.0, 0.0, 1.0, 3.0, 0.5, 0.5, 1.0)
    }

    /// Sulyap: 20% variance, 10% крит ×1.5
    pub fn sulyap_claw() -> Self {
        Self::new(10, 0.2, 0.1, 1.5, 3.0, 0.5, 0.5, 1.5)
    }

    /// Player: 20% шанс double damage (multiplier 2 == flat doubling)
    pub fn player_sword() -> Self {
        Self::new(20, 0.0, 0.2, 2.0, 1.5, 1.5, 0.5, 1.0)
    }

    /// Может ли атаковать (cooldown == 0)
    pub fn can_attack(&self) -> bool {
        self.cooldown_timer <= 0.0
    }

    /// Начать cooldown после попытки атаки
    pub fn start_cooldown(&mut self) {
        self.cooldown_timer = self.cooldown;
    }

    /// Damage resolver: чистая функция конфига + RNG
    ///
    /// Инжектируемый rng делает бросок детерминированным в тестах
    /// (seeded ChaCha8Rng) и в симуляции (DeterministicRng resource).
    pub fn roll_damage<R: Rng>(&self, rng: &mut R) -> u32 {
        let mut raw = self.base_damage as f32;

        if self.variance > 0.0 {
            let v = rng.gen_range(-self.variance..self.variance);
            raw *= 1.0 + v;
        }

        if rng.gen::<f32>() < self.crit_chance {
            raw *= self.crit_multiplier;
        }

        raw.round().max(0.0) as u32
    }
}

/// Per-архетипная конфигурация damage timing
///
/// hurt_delay — application delay между детекцией удара и мутацией health
/// (окно для hurt-анимации). У врагов 0.5s, у игрока 0 (применяется сразу).
#[derive(Component, Debug, Clone, Copy, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct HurtConfig {
    /// Задержка применения урона (секунды)
    pub hurt_delay: f32,
    /// Окно неуязвимости после применённого удара (секунды)
    pub invuln_window: f32,
    /// Задержка hurt-звука после применённого удара (секунды)
    pub hurt_sound_delay: f32,
}

impl HurtConfig {
    pub fn new(hurt_delay: f32, invuln_window: f32, hurt_sound_delay: f32) -> Self {
        assert!(hurt_delay >= 0.0, "HurtConfig: hurt_delay должен быть ≥ 0");
        assert!(invuln_window > 0.0, "HurtConfig: invuln_window должен быть > 0");
        assert!(
            hurt_sound_delay >= 0.0,
            "HurtConfig: hurt_sound_delay должен быть ≥ 0"
        );
        Self {
            hurt_delay,
            invuln_window,
            hurt_sound_delay,
        }
    }

    /// Тайминги врагов: 0.5s wind-up, 1s invuln, 0.3s hurt sound
    pub fn enemy() -> Self {
        Self::new(0.5, 1.0, 0.3)
    }

    /// Игрок: урон сразу, 2s invuln (совпадает с respawn invuln window)
    pub fn player() -> Self {
        Self::new(0.0, 2.0, 0.0)
    }
}

impl Default for HurtConfig {
    fn default() -> Self {
        Self::enemy()
    }
}

/// Система: tick attack cooldown таймеров
pub fn tick_attack_cooldowns(mut query: Query<&mut AttackProfile>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for mut profile in query.iter_mut() {
        if profile.cooldown_timer > 0.0 {
            profile.cooldown_timer = (profile.cooldown_timer - delta).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_flat_profile_rolls_exact_base() {
        let profile = AttackProfile::new(10, 0.0, 0.0, 1.0, 3.0, 0.5, 1.0, 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..100 {
            assert_eq!(profile.roll_damage(&mut rng), 10);
        }
    }

    #[test]
    fn test_guaranteed_crit_multiplies() {
        let profile = AttackProfile::new(20, 0.0, 1.0, 2.0, 1.5, 1.5, 0.5, 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        // crit_chance = 1 ⇒ всегда round(base × multiplier)
        for _ in 0..100 {
            assert_eq!(profile.roll_damage(&mut rng), 40);
        }
    }

    #[test]
    fn test_variance_stays_in_bounds() {
        let profile = AttackProfile::sulyap_claw();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        // base 10, variance 0.2, crit ×1.5 ⇒ максимум round(12 × 1.5) = 18
        for _ in 0..1000 {
            let damage = profile.roll_damage(&mut rng);
            assert!((8..=18).contains(&damage), "damage = {}", damage);
        }
    }

    #[test]
    fn test_roll_is_deterministic_under_seed() {
        let profile = AttackProfile::sulyap_claw();

        let rolls_a: Vec<u32> = {
            let mut rng = ChaCha8Rng::seed_from_u64(123);
            (0..50).map(|_| profile.roll_damage(&mut rng)).collect()
        };
        let rolls_b: Vec<u32> = {
            let mut rng = ChaCha8Rng::seed_from_u64(123);
            (0..50).map(|_| profile.roll_damage(&mut rng)).collect()
        };

        assert_eq!(rolls_a, rolls_b);
    }

    #[test]
    fn test_cooldown_gate() {
        let mut profile = AttackProfile::ghost_claw();
        assert!(profile.can_attack());

        profile.start_cooldown();
        assert!(!profile.can_attack());
        assert_eq!(profile.cooldown_timer, 1.0);

        // Simulate tick
        profile.cooldown_timer -= 0.5;
        assert!(!profile.can_attack());

        profile.cooldown_timer -= 0.5;
        assert!(profile.can_attack());
    }

    #[test]
    #[should_panic]
    fn test_zero_cooldown_rejected() {
        let _ = AttackProfile::new(10, 0.0, 0.0, 1.0, 3.0, 0.5, 1.0, 0.0);
    }

    #[test]
    #[should_panic]
    fn test_full_variance_rejected() {
        let _ = AttackProfile::new(10, 1.0, 0.0, 1.0, 3.0, 0.5, 1.0, 1.0);
    }
}
