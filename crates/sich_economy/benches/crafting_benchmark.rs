//! Benchmark for crafting, search and sale throughput.
//!
//! Run with: cargo bench --package sich_economy --bench crafting_benchmark

use std::sync::Arc;

use alloy_primitives::Address;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sich_economy::{
    Asset, Economy, EconomyConfig, ManualClock, RngEntropy, Role, SaltedEntropy, YieldTable,
};
use sich_shared::{ItemKind, DIAMOND, GOLD, IRON, LEATHER, WOOD};

const ADMIN: Address = Address::repeat_byte(0x01);
const PLAYER: Address = Address::repeat_byte(0x02);

fn create_economy(cooldown: u64) -> (Economy, Arc<ManualClock>) {
    let mut config = EconomyConfig::with_admin(ADMIN);
    config.search_cooldown_secs = cooldown;
    let clock = Arc::new(ManualClock::new(0));
    let economy = Economy::bootstrap(
        &config,
        clock.clone(),
        Box::new(RngEntropy::new(ChaCha8Rng::seed_from_u64(42))),
    )
    .unwrap();
    economy
        .grant_role(ADMIN, Asset::Resources, Role::Minter, ADMIN)
        .unwrap();
    (economy, clock)
}

fn fund(economy: &Economy, quantity: u64) {
    let mut resources = economy.resources().lock();
    resources
        .mint_batch(
            ADMIN,
            PLAYER,
            &[WOOD, IRON, GOLD, LEATHER, DIAMOND],
            &[quantity; 5],
        )
        .unwrap();
}

fn benchmark_craft(c: &mut Criterion) {
    let (economy, _clock) = create_economy(0);
    fund(&economy, u64::MAX / 8);

    c.bench_function("craft_cossack_sabre", |b| {
        b.iter(|| black_box(economy.craft(PLAYER, ItemKind::CossackSabre)));
    });
}

fn benchmark_can_craft(c: &mut Criterion) {
    let (economy, _clock) = create_economy(0);
    fund(&economy, 10);

    c.bench_function("can_craft_check", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 1) % ItemKind::ALL.len();
            black_box(economy.engine().lock().can_craft(PLAYER, ItemKind::ALL[i]))
        });
    });
}

fn benchmark_failed_craft(c: &mut Criterion) {
    let (economy, _clock) = create_economy(0);

    c.bench_function("craft_rejected_insufficient", |b| {
        b.iter(|| black_box(economy.craft(PLAYER, ItemKind::BattleBracelet)));
    });
}

fn benchmark_search(c: &mut Criterion) {
    let (economy, _clock) = create_economy(0);

    c.bench_function("search_uniform_table", |b| {
        b.iter(|| black_box(economy.search(PLAYER)));
    });
}

fn benchmark_craft_and_sell(c: &mut Criterion) {
    let (economy, _clock) = create_economy(0);
    fund(&economy, u64::MAX / 8);

    c.bench_function("craft_then_sell", |b| {
        b.iter(|| {
            let receipt = economy.craft(PLAYER, ItemKind::CossackSabre).unwrap();
            black_box(economy.sell(PLAYER, ItemKind::CossackSabre, receipt.token_id))
        });
    });
}

fn benchmark_yield_roll(c: &mut Criterion) {
    let table = YieldTable::uniform();
    let mut entropy = SaltedEntropy::new(&[7u8; 32]);

    c.bench_function("yield_roll_salted", |b| {
        let mut t = 0u64;
        b.iter(|| {
            t += 1;
            black_box(table.roll(&mut entropy, PLAYER, t))
        });
    });
}

criterion_group!(
    benches,
    benchmark_craft,
    benchmark_can_craft,
    benchmark_failed_craft,
    benchmark_search,
    benchmark_craft_and_sell,
    benchmark_yield_roll,
);
criterion_main!(benches);
