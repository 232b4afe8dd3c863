//! Headless симуляция LAGIM
//!
//! Запускает Bevy App без presentation layer: игрок, враги трёх архетипов,
//! квест. Для smoke-прогонов и проверки детерминизма.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use lagim_simulation::actors::{spawn_ghost, spawn_kamatayan, spawn_player, spawn_sulyap};
use lagim_simulation::{create_headless_app, QuestLog, SimulationPlugin};

fn main() {
    let seed = 42;
    println!("Starting LAGIM headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);

    // Spawn сцены: игрок + по одному врагу каждого архетипа
    let mut spawn_rng = ChaCha8Rng::seed_from_u64(seed);
    {
        let world = app.world_mut();
        let mut commands = world.commands();

        spawn_player(&mut commands, Vec3::ZERO);
        spawn_ghost(&mut commands, &mut spawn_rng, Vec3::new(6.0, 0.0, 0.0));
        spawn_sulyap(&mut commands, &mut spawn_rng, Vec3::new(-6.0, 0.0, 4.0));
        spawn_kamatayan(&mut commands, &mut spawn_rng, Vec3::new(0.0, 0.0, 10.0));
    }

    app.world_mut()
        .resource_mut::<QuestLog>()
        .quest
        .accept();

    // Запускаем 1000 тиков симуляции
    for tick in 0..1000 {
        app.update();

        if tick % 100 == 0 {
            let entity_count = app.world().entities().len();
            let quest = &app.world().resource::<QuestLog>().quest;
            println!(
                "Tick {}: {} entities, kills {}/{}",
                tick, entity_count, quest.kills, quest.required_kills
            );
        }
    }

    println!("Simulation complete!");
}
