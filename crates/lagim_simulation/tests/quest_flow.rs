//! Quest/portal flow integration tests
//!
//! End-to-end цепочка: урон → смерть → kill-шина → quest counter →
//! key drop/pickup → portal gate → one-shot scene transition.
//! Плюс respawn игрока и спецификация delayed damage sequence.

use bevy::prelude::*;

use lagim_simulation::actors::spawn_player;
use lagim_simulation::*;

fn create_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    app
}

fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.update();
    }
}

/// Helper: неподвижная цель без AI (чистая мишень для damage pipeline)
fn spawn_dummy_target(app: &mut App, position: Vec3, with_key: bool) -> Entity {
    let world = app.world_mut();
    let mut commands = world.commands();

    let mut entity = commands.spawn((
        Transform::from_translation(position),
        Actor {
            faction_id: HOSTILE_FACTION,
        },
        Health::new(100),
        HurtConfig::enemy(),
        PendingDamage::default(),
        ScheduledCues::default(),
    ));
    if with_key {
        entity.insert(KeyDrop::default());
    }
    entity.id()
}

/// Helper: атакующий с детерминированным профилем (no crit, no variance)
fn spawn_flat_attacker(app: &mut App, position: Vec3) -> Entity {
    let world = app.world_mut();
    let mut commands = world.commands();

    commands
        .spawn((
            Transform::from_translation(position),
            Actor {
                faction_id: PLAYER_FACTION,
            },
            Health::new(100),
            // base 20, без variance и крита, cooldown 1.5s > invuln window цели
            AttackProfile::new(20, 0.0, 0.0, 1.0, 3.0, 1.5, 0.5, 1.5),
            HurtConfig::player(),
            PendingDamage::default(),
            ScheduledCues::default(),
        ))
        .id()
}

fn inflict_lethal(app: &mut App, entity: Entity) {
    let mut pending = app.world_mut().get_mut::<PendingDamage>(entity).unwrap();
    pending.hits.push(combat::PendingHit {
        timer: 0.0,
        amount: 9999,
        source: None,
    });
}

fn count_keys(app: &mut App) -> usize {
    let world = app.world_mut();
    let mut query = world.query::<&KeyPickup>();
    query.iter(world).count()
}

/// Test: спецификационная последовательность урона
///
/// maxHealth=100, три удара по 20 (интервал > invuln window) → fraction 0.40;
/// четвёртый удар 40 → ровно одна смерть и ровно один key drop.
#[test]
fn test_end_to_end_damage_sequence() {
    let mut app = create_app(42);

    let attacker = spawn_flat_attacker(&mut app, Vec3::ZERO);
    let target = spawn_dummy_target(&mut app, Vec3::new(1.0, 0.0, 0.0), true);
    app.update();

    app.world_mut().resource_mut::<QuestLog>().quest.accept();

    // 4 секунды непрерывных AttackIntent: cooldown 1.5s и hurt delay 0.5s
    // дают применения на ~0.5s, ~2.0s, ~3.5s
    for _ in 0..240 {
        app.world_mut().send_event(AttackIntent { attacker });
        app.update();
    }

    let health = app.world().get::<Health>(target).unwrap();
    assert_eq!(health.current, 40, "после трёх ударов по 20: 100 → 40");
    assert!((health.fraction() - 0.4).abs() < f32::EPSILON);

    // Четвёртый удар на 40 добивает
    app.world_mut()
        .get_mut::<AttackProfile>(attacker)
        .unwrap()
        .base_damage = 40;

    for _ in 0..120 {
        app.world_mut().send_event(AttackIntent { attacker });
        app.update();
    }

    assert!(
        app.world().get::<Dead>(target).is_some(),
        "цель должна умереть от четвёртого удара"
    );
    assert_eq!(
        app.world().resource::<QuestLog>().quest.kills,
        1,
        "ровно одно kill-уведомление"
    );
    assert_eq!(count_keys(&mut app), 1, "ровно один key drop");

    // Добивание трупа — no-op: смерть идемпотентна
    for _ in 0..30 {
        app.world_mut().send_event(AttackIntent { attacker });
        app.update();
    }
    assert_eq!(app.world().resource::<QuestLog>().quest.kills, 1);
}

/// Test: полный квестовый цикл до открытия портала + one-shot transition
#[test]
fn test_portal_gate_and_one_shot_transition() {
    let mut app = create_app(42);

    let (player, portal) = {
        let world = app.world_mut();
        let mut commands = world.commands();
        let player = spawn_player(&mut commands, Vec3::ZERO);
        let portal = commands.spawn(Portal::default()).id();
        (player, portal)
    };
    let mob_with_key = spawn_dummy_target(&mut app, Vec3::new(1.0, 0.0, 0.0), true);
    let mob_plain = spawn_dummy_target(&mut app, Vec3::new(2.0, 0.0, 0.0), false);
    app.update();

    app.world_mut().resource_mut::<QuestLog>().quest.accept();

    // Активация до выполнения объективов — отказ
    app.world_mut().send_event(PortalActivated { portal });
    app.update();
    assert!(!app.world().get::<Portal>(portal).unwrap().open);

    // Убиваем первого моба: kill 1/2, дроп ключа рядом с игроком → подбор
    inflict_lethal(&mut app, mob_with_key);
    run_ticks(&mut app, 10);
    {
        let quest = &app.world().resource::<QuestLog>().quest;
        assert_eq!(quest.kills, 1);
        assert!(quest.key_collected, "ключ в pickup range игрока");
        assert!(!quest.kills_complete);
    }

    // Ключ есть, kills 1/2 — всё ещё отказ
    app.world_mut().send_event(PortalActivated { portal });
    app.update();
    assert!(!app.world().get::<Portal>(portal).unwrap().open);

    // Второй kill завершает объектив
    inflict_lethal(&mut app, mob_plain);
    run_ticks(&mut app, 5);
    assert!(app.world().resource::<QuestLog>().quest.kills_complete);

    // Теперь конъюнкция выполнена — портал открывается
    app.world_mut().send_event(PortalActivated { portal });
    app.update();
    assert!(app.world().get::<Portal>(portal).unwrap().open);
    assert!(app.world().resource::<QuestLog>().quest.portal_opened);

    // Transition по отсчёту: ровно один SceneTransitionRequest
    let mut cursor = app
        .world()
        .resource::<Events<SceneTransitionRequest>>()
        .get_cursor();
    run_ticks(&mut app, 92); // transition_delay 1.5s + запас

    let events = app.world().resource::<Events<SceneTransitionRequest>>();
    let fired: Vec<_> = cursor.read(events).collect();
    assert_eq!(fired.len(), 1, "ровно один scene transition запрос");
    assert_eq!(fired[0].destination, "BossRoom");

    // Повторная активация открытого портала — без второго transition
    app.world_mut().send_event(PortalActivated { portal });
    run_ticks(&mut app, 120);
    let events = app.world().resource::<Events<SceneTransitionRequest>>();
    assert_eq!(cursor.read(events).count(), 0, "transition one-shot");

    let _ = player; // Игрок нужен только для key pickup
}

/// Test: смерть игрока → respawn на точке с полным health и invuln window
#[test]
fn test_player_respawn() {
    let mut app = create_app(42);

    let player = {
        let world = app.world_mut();
        let mut commands = world.commands();
        spawn_player(&mut commands, Vec3::new(3.0, 0.0, 0.0))
    };
    app.update();

    inflict_lethal(&mut app, player);
    run_ticks(&mut app, 5);

    assert!(app.world().get::<Dead>(player).is_some());
    assert!(
        app.world().get::<RespawnTimer>(player).is_some(),
        "игрок ждёт respawn, не despawn"
    );

    // Труп куда-то отнесло (проверяем телепорт на respawn point)
    app.world_mut()
        .get_mut::<Transform>(player)
        .unwrap()
        .translation = Vec3::new(9.0, 0.0, 9.0);

    run_ticks(&mut app, 130); // respawn delay 2s + запас

    assert!(
        app.world().get::<Dead>(player).is_none(),
        "respawn — единственная санкционированная отмена Dead"
    );
    let health = app.world().get::<Health>(player).unwrap();
    assert_eq!(health.current, health.max, "health восстановлен полностью");
    assert!(health.is_invulnerable(), "respawn даёт invuln window");

    let position = app.world().get::<Transform>(player).unwrap().translation;
    assert_eq!(position, Vec3::new(3.0, 0.0, 0.0), "позиция — respawn point");
}

/// Test: прямой подбор ключа игроком + despawn ключа
#[test]
fn test_key_pickup_direct() {
    let mut app = create_app(42);

    {
        let world = app.world_mut();
        let mut commands = world.commands();
        spawn_player(&mut commands, Vec3::ZERO);
        commands.spawn((
            KeyPickup::default(),
            Transform::from_translation(Vec3::new(1.5, 0.0, 0.0)),
        ));
    }
    app.update();

    run_ticks(&mut app, 5);
    assert!(
        app.world().resource::<QuestLog>().quest.key_collected,
        "игрок в pickup range — ключ подобран"
    );

    // Ключ despawn'ится с задержкой 0.5s
    run_ticks(&mut app, 40);
    assert_eq!(count_keys(&mut app), 0, "подобранный ключ исчез из мира");
}
